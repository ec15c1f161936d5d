//! Group service: orchestration of keys, allocation, storage and rendering.
//!
//! # Write Path
//!
//! 1. Validate the typed request and normalize names
//! 2. Take the group's lock
//! 3. Load the affected records and persist the raw record
//! 4. Reload every peer of the group, re-run the allocator and write the
//!    group back with its fresh peer view
//!
//! There is no rollback. If step 4 fails after step 3 succeeded, the view is
//! stale until the next successful mutation of the group.
//!
//! # Read Path
//!
//! Reads take no lock and never allocate; they serve the last materialized
//! view, which may be mid-update while a mutation runs.

use std::collections::HashMap;
use std::sync::Arc;

use corelib::allocator::check_capacity;
use corelib::block::parse_prefix;
use corelib::{
    AddressAllocator, AddressBlock, ConfigRenderer, Group, KeyManager, PeerRecord,
    SequentialAllocator, WgQuickRenderer, X25519KeyManager,
};
use metrics::counter;
use storage::{GroupStore, Storage};
use tracing::{debug, info, instrument};

use crate::config::ServiceConfig;
use crate::error::{Result, ServiceError};
use crate::locks::GroupLocks;
use crate::request::{non_empty, normalize_name, GroupWriteRequest, PeerWriteRequest};
use crate::response::{
    config_response, group_response, peer_response, ConfigResponse, GroupResponse, PeerResponse,
};

pub struct GroupService {
    store: GroupStore,
    keys: Arc<dyn KeyManager>,
    allocator: Arc<dyn AddressAllocator>,
    renderer: Arc<dyn ConfigRenderer>,
    locks: GroupLocks,
    config: ServiceConfig,
}

impl std::fmt::Debug for GroupService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupService")
            .field("store", &self.store)
            .field("keys", &self.keys.name())
            .field("allocator", &self.allocator.name())
            .field("config", &self.config)
            .finish()
    }
}

impl GroupService {
    /// Service over `storage` with X25519 keys, sequential allocation and
    /// `wg-quick` rendering.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            store: GroupStore::new(storage),
            keys: Arc::new(X25519KeyManager::new()),
            allocator: Arc::new(SequentialAllocator::new()),
            renderer: Arc::new(WgQuickRenderer::new()),
            locks: GroupLocks::new(),
            config: ServiceConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_key_manager(mut self, keys: Arc<dyn KeyManager>) -> Self {
        self.keys = keys;
        self
    }

    pub fn with_allocator(mut self, allocator: Arc<dyn AddressAllocator>) -> Self {
        self.allocator = allocator;
        self
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn ConfigRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    // ------------------------------------------------------------------
    // Groups
    // ------------------------------------------------------------------

    pub async fn list_groups(&self) -> Result<Vec<String>> {
        Ok(self.store.list_groups().await?)
    }

    pub async fn read_group(&self, name: &str) -> Result<Option<GroupResponse>> {
        let name = normalize_name("group", name)?;
        Ok(self.store.get_group(&name).await?.as_ref().map(group_response))
    }

    /// Create or update a group, then rebuild its peer view.
    ///
    /// `network` is required when the group does not exist yet. A new network
    /// too small for the group's current peers is rejected and nothing is
    /// written.
    #[instrument(skip(self, request), err)]
    pub async fn write_group(&self, name: &str, request: GroupWriteRequest) -> Result<()> {
        let name = normalize_name("group", name)?;
        let network = non_empty(&request.network)
            .map(str::parse::<AddressBlock>)
            .transpose()?;

        let _guard = self.locks.lock(&name).await;

        let mut group = match (self.store.get_group(&name).await?, network) {
            (Some(mut group), Some(network)) => {
                group.network = network;
                group
            }
            (Some(group), None) => group,
            (None, Some(network)) => Group::new(name.as_str(), network),
            (None, None) => return Err(ServiceError::validation("missing network field")),
        };

        group.ttl = request
            .ttl
            .filter(|ttl| *ttl != 0)
            .unwrap_or(self.config.default_ttl);
        group.max_ttl = request
            .max_ttl
            .filter(|ttl| *ttl != 0)
            .unwrap_or(self.config.default_max_ttl);
        if let Some(keepalive) = request.persistent_keepalive {
            group.persistent_keepalive = keepalive;
        }

        // The group record is the raw record here, so one write covers both.
        let group = self.recompute(group).await?;

        counter!("wg_groups_mutations_total", "op" => "write_group").increment(1);
        info!(
            group = %group.name,
            network = %group.network,
            peers = group.peers.len(),
            "group written"
        );
        Ok(())
    }

    /// Delete a group and every peer stored under it.
    #[instrument(skip(self), err)]
    pub async fn delete_group(&self, name: &str) -> Result<()> {
        let name = normalize_name("group", name)?;
        let _guard = self.locks.lock(&name).await;

        let peers = self.store.delete_group(&name).await?;

        counter!("wg_groups_mutations_total", "op" => "delete_group").increment(1);
        info!(group = %name, peers, "group deleted");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Peers
    // ------------------------------------------------------------------

    pub async fn list_peers(&self, group: &str) -> Result<Vec<String>> {
        let group = normalize_name("group", group)?;
        Ok(self.store.list_peers(&group).await?)
    }

    pub async fn read_peer(&self, group: &str, name: &str) -> Result<Option<PeerResponse>> {
        let group = normalize_name("group", group)?;
        let name = normalize_name("peer", name)?;
        Ok(self.store.get_peer(&group, &name).await?.as_ref().map(peer_response))
    }

    /// Create or update a peer, then rebuild the group's peer view.
    ///
    /// Fields that are not supplied keep their stored value on update. A new
    /// peer that would not fit in the group's network is rejected before
    /// anything is written.
    #[instrument(skip(self, request), err)]
    pub async fn write_peer(
        &self,
        group: &str,
        name: &str,
        request: PeerWriteRequest,
    ) -> Result<()> {
        let group_name = normalize_name("group", group)?;
        let name = normalize_name("peer", name)?;
        let allowed_ips = request
            .allowed_ips
            .as_ref()
            .map(|prefixes| {
                prefixes
                    .iter()
                    .map(|prefix| parse_prefix(prefix).map(|net| net.to_string()))
                    .collect::<corelib::Result<Vec<_>>>()
            })
            .transpose()?;

        let _guard = self.locks.lock(&group_name).await;

        let group = self
            .store
            .get_group(&group_name)
            .await?
            .ok_or_else(|| ServiceError::GroupNotFound(group_name.clone()))?;

        let existing = self.store.get_peer(&group_name, &name).await?;
        if existing.is_none() {
            let count = self.store.list_peers(&group_name).await?.len();
            check_capacity(&group.network, count + 1)?;
        }

        let mut record = existing.clone().unwrap_or_else(|| PeerRecord::new(name.as_str()));
        record.name = name.clone();
        if let Some(allowed_ips) = allowed_ips {
            record.allowed_ips = allowed_ips;
        }
        if let Some(hostname) = non_empty(&request.hostname) {
            record.hostname = hostname.to_lowercase();
        } else if record.hostname.is_empty() {
            record.hostname = name.clone();
        }
        if let Some(port) = request.port {
            record.port = port;
        }

        let current_keys = existing.as_ref().map(PeerRecord::keys);
        let keys = self.keys.resolve_keys(
            non_empty(&request.private_key),
            non_empty(&request.public_key),
            current_keys.as_ref(),
        )?;
        let record = record.with_keys(keys);

        self.store.put_peer(&group_name, &record).await?;
        self.recompute(group).await?;

        counter!("wg_groups_mutations_total", "op" => "write_peer").increment(1);
        info!(group = %group_name, peer = %name, created = existing.is_none(), "peer written");
        Ok(())
    }

    /// Delete a peer, then rebuild the group's peer view.
    #[instrument(skip(self), err)]
    pub async fn delete_peer(&self, group: &str, name: &str) -> Result<()> {
        let group_name = normalize_name("group", group)?;
        let name = normalize_name("peer", name)?;

        let _guard = self.locks.lock(&group_name).await;

        let group = self
            .store
            .get_group(&group_name)
            .await?
            .ok_or_else(|| ServiceError::GroupNotFound(group_name.clone()))?;

        self.store.delete_peer(&group_name, &name).await?;
        self.recompute(group).await?;

        counter!("wg_groups_mutations_total", "op" => "delete_peer").increment(1);
        info!(group = %group_name, peer = %name, "peer deleted");
        Ok(())
    }

    /// Render the `wg-quick` config of one peer from the materialized view.
    pub async fn render_config(&self, group: &str, name: &str) -> Result<ConfigResponse> {
        let group_name = normalize_name("group", group)?;
        let name = normalize_name("peer", name)?;

        let group = self
            .store
            .get_group(&group_name)
            .await?
            .ok_or_else(|| ServiceError::GroupNotFound(group_name.clone()))?;

        let config = self.renderer.render(&group, &name)?;
        Ok(config_response(&group, config))
    }

    // ------------------------------------------------------------------
    // Recompute
    // ------------------------------------------------------------------

    /// Rebuild `group`'s peer view from every stored peer and persist it.
    ///
    /// Callers must hold the group's lock.
    async fn recompute(&self, mut group: Group) -> Result<Group> {
        let names = self.store.list_peers(&group.name).await?;

        let mut records = HashMap::with_capacity(names.len());
        for name in &names {
            let record = self.store.get_peer(&group.name, name).await?.ok_or_else(|| {
                ServiceError::Internal(format!(
                    "peer {name} listed in group {} but not stored",
                    group.name
                ))
            })?;
            records.insert(name.clone(), record);
        }

        group.peers = self.allocator.allocate(
            &group.network,
            group.persistent_keepalive,
            &names,
            &records,
        )?;
        self.store.put_group(&group).await?;

        counter!("wg_groups_recomputes_total").increment(1);
        debug!(
            group = %group.name,
            allocator = self.allocator.name(),
            peers = group.peers.len(),
            "recomputed peer view"
        );
        Ok(group)
    }
}
