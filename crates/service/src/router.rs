//! Path based dispatch onto the group service.
//!
//! | Operation | Path | Handler |
//! |---|---|---|
//! | list | `groups` | list groups |
//! | read, create, update, delete | `groups/<name>` | group CRUD |
//! | list | `groups/<name>` | list peers |
//! | read, create, update, delete | `groups/<name>/<peer>` | peer CRUD |
//! | read | `groups/<name>/<peer>/config` | rendered config |
//!
//! Writes and deletes answer with no response. Reads of a missing record
//! answer with no response as well.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use storage::Storage;
use tracing::debug;

use crate::error::{Result, ServiceError};
use crate::request::{GroupWriteRequest, PeerWriteRequest};
use crate::response::ListResponse;
use crate::service::GroupService;

/// Config path suffixes; `wg-quick` is kept as an alias.
const CONFIG_SUFFIXES: [&str; 2] = ["config", "wg-quick"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Read,
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::List => "list",
            Operation::Read => "read",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct Request {
    pub operation: Operation,
    pub path: String,
    /// Request fields; `Null` when there are none.
    pub data: Value,
}

impl Request {
    pub fn new(operation: Operation, path: impl Into<String>) -> Self {
        Self {
            operation,
            path: path.into(),
            data: Value::Null,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub data: Value,
}

impl Response {
    fn from_serialize<T: Serialize>(body: &T) -> Result<Self> {
        serde_json::to_value(body)
            .map(|data| Response { data })
            .map_err(|e| ServiceError::Internal(format!("error encoding response: {e}")))
    }
}

/// Parsed request path.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Route<'a> {
    Groups,
    Group(&'a str),
    Peer(&'a str, &'a str),
    Config(&'a str, &'a str),
}

fn route(path: &str) -> Option<Route<'_>> {
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    match segments.as_slice() {
        ["groups"] => Some(Route::Groups),
        ["groups", group] if !group.is_empty() => Some(Route::Group(*group)),
        ["groups", group, peer] if !group.is_empty() && !peer.is_empty() => {
            Some(Route::Peer(*group, *peer))
        }
        ["groups", group, peer, suffix] if CONFIG_SUFFIXES.contains(suffix) => {
            Some(Route::Config(*group, *peer))
        }
        _ => None,
    }
}

/// Request handler exposing the operation surface of a [`GroupService`].
#[derive(Debug, Clone)]
pub struct Backend {
    service: Arc<GroupService>,
}

impl Backend {
    pub fn new(service: Arc<GroupService>) -> Self {
        Self { service }
    }

    /// Backend with default service settings over `storage`.
    pub fn with_storage(storage: Arc<dyn Storage>) -> Self {
        Self::new(Arc::new(GroupService::new(storage)))
    }

    pub async fn handle_request(&self, request: Request) -> Result<Option<Response>> {
        debug!(operation = %request.operation, path = %request.path, "handling request");

        let unsupported = || ServiceError::Unsupported {
            operation: request.operation.to_string(),
            path: request.path.clone(),
        };
        let route = route(&request.path).ok_or_else(unsupported)?;
        let service = &self.service;

        match (request.operation, route) {
            (Operation::List, Route::Groups) => {
                let keys = service.list_groups().await?;
                Response::from_serialize(&ListResponse { keys }).map(Some)
            }

            (Operation::List, Route::Group(group)) => {
                let keys = service.list_peers(group).await?;
                Response::from_serialize(&ListResponse { keys }).map(Some)
            }
            (Operation::Read, Route::Group(group)) => match service.read_group(group).await? {
                Some(body) => Response::from_serialize(&body).map(Some),
                None => Ok(None),
            },
            (Operation::Create | Operation::Update, Route::Group(group)) => {
                let body = GroupWriteRequest::from_data(request.data.clone())?;
                service.write_group(group, body).await?;
                Ok(None)
            }
            (Operation::Delete, Route::Group(group)) => {
                service.delete_group(group).await?;
                Ok(None)
            }

            (Operation::Read, Route::Peer(group, peer)) => {
                match service.read_peer(group, peer).await? {
                    Some(body) => Response::from_serialize(&body).map(Some),
                    None => Ok(None),
                }
            }
            (Operation::Create | Operation::Update, Route::Peer(group, peer)) => {
                let body = PeerWriteRequest::from_data(request.data.clone())?;
                service.write_peer(group, peer, body).await?;
                Ok(None)
            }
            (Operation::Delete, Route::Peer(group, peer)) => {
                service.delete_peer(group, peer).await?;
                Ok(None)
            }

            (Operation::Read, Route::Config(group, peer)) => {
                let body = service.render_config(group, peer).await?;
                Response::from_serialize(&body).map(Some)
            }

            _ => Err(unsupported()),
        }
    }
}
