//! `wg-quick` configuration rendering.
//!
//! Rendering only reads the group's materialized peer view; it never
//! allocates. Stanzas follow the view order, the target peer contributing its
//! `[Interface]` stanza at its own position and every other peer a `[Peer]`
//! stanza. Stanzas are separated by one blank line.

use crate::error::{Error, Result};
use crate::group::{Group, PeerView};

/// Renders per-peer configuration documents.
pub trait ConfigRenderer: Send + Sync + 'static {
    /// Render the configuration for `peer` in `group`.
    fn render(&self, group: &Group, peer: &str) -> Result<String>;
}

/// Renderer producing files understood by `wg-quick`.
///
/// Stanzas, the header included, are separated by exactly one blank line.
/// This holds wherever the target sorts: when it is not the first peer, the
/// header is still followed by a single blank line and `[Interface]` is
/// preceded by one, like every other stanza.
#[derive(Debug, Clone, Copy, Default)]
pub struct WgQuickRenderer;

impl WgQuickRenderer {
    pub fn new() -> Self {
        Self
    }

    fn interface_stanza(peer: &PeerView) -> Vec<String> {
        let mut lines = vec![
            "[Interface]".to_string(),
            format!("Address={}", peer.ip),
            format!("PrivateKey={}", peer.private_key),
        ];
        if peer.port != 0 {
            lines.push(format!("ListenPort={}", peer.port));
        }
        lines
    }

    fn peer_stanza(peer: &PeerView) -> Vec<String> {
        let mut lines = vec![
            format!("# {}", peer.name),
            "[Peer]".to_string(),
            format!("PublicKey={}", peer.public_key),
            format!("AllowedIPs={}", peer.allowed_ips),
        ];
        if let Some(endpoint) = peer.endpoint() {
            lines.push(format!("Endpoint={endpoint}"));
        } else if peer.persistent_keepalive != 0 {
            lines.push(format!("PersistentKeepalive={}", peer.persistent_keepalive));
        }
        lines
    }
}

impl ConfigRenderer for WgQuickRenderer {
    fn render(&self, group: &Group, peer: &str) -> Result<String> {
        if group.peer(peer).is_none() {
            return Err(Error::PeerNotFound {
                group: group.name.clone(),
                peer: peer.to_string(),
            });
        }

        let mut stanzas = Vec::with_capacity(group.peers.len() + 1);
        stanzas.push(vec![format!("# {}/{}", group.name, peer)]);
        for view in &group.peers {
            if view.name == peer {
                stanzas.push(Self::interface_stanza(view));
            } else {
                stanzas.push(Self::peer_stanza(view));
            }
        }

        let mut config = stanzas
            .iter()
            .map(|lines| lines.join("\n"))
            .collect::<Vec<_>>()
            .join("\n\n");
        config.push('\n');
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::AddressBlock;

    fn view(name: &str, ip: &str, port: u16, keepalive: u32) -> PeerView {
        PeerView {
            name: name.to_string(),
            ip: format!("{ip}/24"),
            hostname: format!("{name}.example"),
            persistent_keepalive: keepalive,
            port,
            private_key: format!("{name}-private"),
            public_key: format!("{name}-public"),
            allowed_ips: format!("{ip}/32"),
        }
    }

    fn group() -> Group {
        let mut group = Group::new("g", "10.0.0.0/24".parse::<AddressBlock>().unwrap());
        group.peers = vec![
            view("a", "10.0.0.1", 0, 25),
            view("b", "10.0.0.2", 51820, 0),
            view("c", "10.0.0.3", 0, 0),
        ];
        group
    }

    #[test]
    fn test_render_middle_peer() {
        let config = WgQuickRenderer.render(&group(), "b").unwrap();
        assert_eq!(
            config,
            "# g/b\n\
             \n\
             # a\n\
             [Peer]\n\
             PublicKey=a-public\n\
             AllowedIPs=10.0.0.1/32\n\
             PersistentKeepalive=25\n\
             \n\
             [Interface]\n\
             Address=10.0.0.2/24\n\
             PrivateKey=b-private\n\
             ListenPort=51820\n\
             \n\
             # c\n\
             [Peer]\n\
             PublicKey=c-public\n\
             AllowedIPs=10.0.0.3/32\n"
        );
    }

    #[test]
    fn test_render_endpoint_wins_over_keepalive() {
        let mut group = group();
        group.peers[1].persistent_keepalive = 30;
        let config = WgQuickRenderer.render(&group, "a").unwrap();
        assert!(config.contains("Endpoint=b.example:51820\n"));
        assert!(!config.contains("PersistentKeepalive=30"));
    }

    #[test]
    fn test_render_lonely_peer() {
        let mut group = group();
        group.peers.truncate(1);
        let config = WgQuickRenderer.render(&group, "a").unwrap();
        assert_eq!(
            config,
            "# g/a\n\n[Interface]\nAddress=10.0.0.1/24\nPrivateKey=a-private\n"
        );
    }

    #[test]
    fn test_render_unknown_peer() {
        let err = WgQuickRenderer.render(&group(), "zed").unwrap_err();
        assert_eq!(
            err,
            Error::PeerNotFound {
                group: "g".to_string(),
                peer: "zed".to_string()
            }
        );
    }
}
