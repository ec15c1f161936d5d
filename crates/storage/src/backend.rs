//! The key-value storage seam.
//!
//! Engines offer get/put/delete and a one-level listing under a prefix. There
//! are no cross-key transactions; callers must tolerate partial writes.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::error::Result;

/// Key-value engine used for group and peer records.
///
/// # Listing
///
/// `list(prefix)` returns the immediate children of `prefix` in ascending
/// byte order. A child that has further entries below it is reported with a
/// trailing `/` (a key can appear both ways: `g` and `g/`).
#[async_trait]
pub trait Storage: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    async fn list(&self, prefix: &str) -> Result<Vec<String>>;

    /// Engine name (for logging/debugging).
    fn name(&self) -> &'static str;
}

/// Compute the one-level listing of `prefix` over a sorted key set.
pub(crate) fn list_children<'a, I>(keys: I, prefix: &str) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut children = BTreeSet::new();
    for key in keys {
        let Some(rest) = key.strip_prefix(prefix) else {
            continue;
        };
        if rest.is_empty() {
            continue;
        }
        match rest.find('/') {
            Some(idx) => children.insert(rest[..=idx].to_string()),
            None => children.insert(rest.to_string()),
        };
    }
    children.into_iter().collect()
}
