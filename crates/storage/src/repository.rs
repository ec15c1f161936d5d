//! Group and peer persistence over a [`Storage`] engine.
//!
//! # Key Layout
//!
//! | Key | Body |
//! |---|---|
//! | `groups/<name>` | [`Group`] including its materialized peer view |
//! | `groups/<name>/<peer>` | raw [`PeerRecord`] |
//!
//! Groups and peers are independent entries: nothing here is transactional.

use std::sync::Arc;

use corelib::{Group, PeerRecord};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::backend::Storage;
use crate::error::{Result, StorageError};

pub const GROUPS_PREFIX: &str = "groups/";

pub fn group_key(group: &str) -> String {
    format!("{GROUPS_PREFIX}{group}")
}

pub fn peer_prefix(group: &str) -> String {
    format!("{GROUPS_PREFIX}{group}/")
}

pub fn peer_key(group: &str, peer: &str) -> String {
    format!("{GROUPS_PREFIX}{group}/{peer}")
}

/// Typed access to group and peer records.
#[derive(Clone)]
pub struct GroupStore {
    storage: Arc<dyn Storage>,
}

impl std::fmt::Debug for GroupStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupStore")
            .field("storage", &self.storage.name())
            .finish()
    }
}

impl GroupStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(bytes) = self.storage.get(key).await? else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| StorageError::Decode {
                key: key.to_string(),
                source,
            })
    }

    async fn put_json<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value).map_err(|source| StorageError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.storage.put(key, bytes).await
    }

    // ------------------------------------------------------------------
    // Groups
    // ------------------------------------------------------------------

    pub async fn get_group(&self, name: &str) -> Result<Option<Group>> {
        self.get_json(&group_key(name)).await
    }

    pub async fn put_group(&self, group: &Group) -> Result<()> {
        self.put_json(&group_key(&group.name), group).await
    }

    /// Group names, without the `<name>/` peer directory markers.
    pub async fn list_groups(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self
            .storage
            .list(GROUPS_PREFIX)
            .await?
            .into_iter()
            .filter(|entry| !entry.ends_with('/'))
            .collect();
        names.sort_unstable();
        Ok(names)
    }

    /// Delete a group record and every peer stored under it.
    ///
    /// The group record goes first so that a failure part way leaves orphaned
    /// peers rather than a group pointing at missing peers.
    pub async fn delete_group(&self, name: &str) -> Result<usize> {
        self.storage.delete(&group_key(name)).await?;

        let peers = self.list_peers(name).await?;
        for peer in &peers {
            self.storage.delete(&peer_key(name, peer)).await?;
        }

        debug!(group = name, peers = peers.len(), "deleted group");
        Ok(peers.len())
    }

    // ------------------------------------------------------------------
    // Peers
    // ------------------------------------------------------------------

    pub async fn get_peer(&self, group: &str, name: &str) -> Result<Option<PeerRecord>> {
        self.get_json(&peer_key(group, name)).await
    }

    pub async fn put_peer(&self, group: &str, peer: &PeerRecord) -> Result<()> {
        self.put_json(&peer_key(group, &peer.name), peer).await
    }

    pub async fn delete_peer(&self, group: &str, name: &str) -> Result<()> {
        self.storage.delete(&peer_key(group, name)).await
    }

    /// Peer names in ascending order.
    pub async fn list_peers(&self, group: &str) -> Result<Vec<String>> {
        let mut names: Vec<String> = self
            .storage
            .list(&peer_prefix(group))
            .await?
            .into_iter()
            .filter(|entry| !entry.ends_with('/'))
            .collect();
        names.sort_unstable();
        Ok(names)
    }
}
