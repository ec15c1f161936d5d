//! Service configuration.

use corelib::DEFAULT_TTL_SECS;

/// Defaults applied by the group service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Lease TTL in seconds for groups that do not set `ttl` (or set 0).
    pub default_ttl: u64,
    /// Lease TTL in seconds for groups that do not set `max_ttl` (or set 0).
    pub default_max_ttl: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TTL_SECS,
            default_max_ttl: DEFAULT_TTL_SECS,
        }
    }
}

impl ServiceConfig {
    pub fn with_default_ttl(mut self, secs: u64) -> Self {
        self.default_ttl = secs;
        self
    }

    pub fn with_default_max_ttl(mut self, secs: u64) -> Self {
        self.default_max_ttl = secs;
        self
    }
}
