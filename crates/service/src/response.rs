//! Response payloads.
//!
//! Every read has an explicit response type built from the stored record by a
//! dedicated function, so what is exposed is decided here and not by the
//! record layout. In particular a group read never includes the materialized
//! peer view.

use corelib::{Group, PeerRecord};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupResponse {
    pub name: String,
    pub network: String,
    pub persistent_keepalive: u32,
    pub ttl: u64,
    pub max_ttl: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeerResponse {
    pub name: String,
    pub hostname: String,
    pub port: u16,
    pub allowed_ips: Vec<String>,
    pub private_key: String,
    pub public_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigResponse {
    pub config: String,
    pub ttl: u64,
    pub max_ttl: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListResponse {
    pub keys: Vec<String>,
}

pub fn group_response(group: &Group) -> GroupResponse {
    GroupResponse {
        name: group.name.clone(),
        network: group.network.to_string(),
        persistent_keepalive: group.persistent_keepalive,
        ttl: group.ttl,
        max_ttl: group.max_ttl,
    }
}

pub fn peer_response(peer: &PeerRecord) -> PeerResponse {
    PeerResponse {
        name: peer.name.clone(),
        hostname: peer.hostname.clone(),
        port: peer.port,
        allowed_ips: peer.allowed_ips.clone(),
        private_key: peer.private_key.clone(),
        public_key: peer.public_key.clone(),
    }
}

pub fn config_response(group: &Group, config: String) -> ConfigResponse {
    ConfigResponse {
        config,
        ttl: group.ttl,
        max_ttl: group.max_ttl,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corelib::{AddressBlock, PeerView};
    use serde_json::json;

    #[test]
    fn test_group_response_omits_peers() {
        let network = "10.1.0.0/24".parse::<AddressBlock>().unwrap();
        let mut group = Group::new("g", network).with_keepalive(45);
        group.peers.push(PeerView {
            name: "p".into(),
            ip: "10.1.0.1/24".into(),
            hostname: "p".into(),
            persistent_keepalive: 45,
            port: 0,
            private_key: String::new(),
            public_key: String::new(),
            allowed_ips: "10.1.0.1/32".into(),
        });

        let value = serde_json::to_value(group_response(&group)).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "g",
                "network": "10.1.0.0/24",
                "persistent_keepalive": 45,
                "ttl": 60,
                "max_ttl": 60
            })
        );
    }

    #[test]
    fn test_peer_response_fields() {
        let peer = PeerRecord::new("p").with_port(51820);
        let value = serde_json::to_value(peer_response(&peer)).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "p",
                "hostname": "p",
                "port": 51820,
                "allowed_ips": [],
                "private_key": "",
                "public_key": ""
            })
        );
    }
}
