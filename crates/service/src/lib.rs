//! Group service for WireGuard peer groups.
//!
//! This crate provides:
//! - `GroupService`, which runs every mutation under a per-group lock and
//!   rebuilds the group's peer view afterwards
//! - Typed request structs and explicit response serializers
//! - `Backend`, a path router exposing the full operation surface

pub mod config;
pub mod error;
pub mod locks;
pub mod request;
pub mod response;
pub mod router;
pub mod service;

pub use config::ServiceConfig;
pub use error::{Result, ServiceError};
pub use request::{GroupWriteRequest, PeerWriteRequest};
pub use response::{ConfigResponse, GroupResponse, ListResponse, PeerResponse};
pub use router::{Backend, Operation, Request, Response};
pub use service::GroupService;
