//! Subcommands and their mapping onto backend requests.

use std::fmt;

use anyhow::bail;
use clap::{Args, Subcommand};
use serde_json::{json, Map, Value};
use service::{Backend, Operation, Request};

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List every group
    Groups,

    /// Read, write or delete a group
    #[command(subcommand)]
    Group(GroupCommand),

    /// List the peers of a group
    Peers { group: String },

    /// Read, write or delete a peer
    #[command(subcommand)]
    Peer(PeerCommand),

    /// Print the wg-quick config of a peer
    Config { group: String, peer: String },
}

#[derive(Debug, Subcommand)]
pub enum GroupCommand {
    Read {
        name: String,
    },
    /// Create a group or update an existing one
    Write {
        name: String,
        #[command(flatten)]
        fields: GroupFields,
    },
    /// Delete a group and all of its peers
    Delete {
        name: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum PeerCommand {
    Read {
        group: String,
        name: String,
    },
    /// Create a peer or update an existing one
    Write {
        group: String,
        name: String,
        #[command(flatten)]
        fields: PeerFields,
    },
    Delete {
        group: String,
        name: String,
    },
}

#[derive(Debug, Default, Args)]
pub struct GroupFields {
    /// Address block in CIDR notation, e.g. 10.0.0.0/24
    #[arg(long)]
    pub network: Option<String>,

    /// Keepalive in seconds for peers without an endpoint
    #[arg(long)]
    pub persistent_keepalive: Option<u32>,

    /// Seconds, or a duration such as 15m
    #[arg(long)]
    pub ttl: Option<String>,

    #[arg(long)]
    pub max_ttl: Option<String>,
}

#[derive(Debug, Default, Args)]
pub struct PeerFields {
    /// Extra routes, comma separated
    #[arg(long, value_delimiter = ',')]
    pub allowed_ips: Option<Vec<String>>,

    #[arg(long)]
    pub hostname: Option<String>,

    /// Listen port; 0 means the peer is not an endpoint
    #[arg(long)]
    pub port: Option<u16>,

    #[arg(long)]
    pub private_key: Option<String>,

    #[arg(long)]
    pub public_key: Option<String>,
}

/// Outcome of one command, printed to stdout.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    Json(Value),
    Text(String),
    Done,
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandResult::Json(value) => {
                let pretty = serde_json::to_string_pretty(value).map_err(|_| fmt::Error)?;
                writeln!(f, "{pretty}")
            }
            CommandResult::Text(text) => f.write_str(text),
            CommandResult::Done => Ok(()),
        }
    }
}

impl Command {
    /// The backend request this command stands for.
    pub fn to_request(&self) -> Request {
        match self {
            Command::Groups => Request::new(Operation::List, "groups"),
            Command::Peers { group } => Request::new(Operation::List, format!("groups/{group}")),
            Command::Config { group, peer } => {
                Request::new(Operation::Read, format!("groups/{group}/{peer}/config"))
            }

            Command::Group(GroupCommand::Read { name }) => {
                Request::new(Operation::Read, format!("groups/{name}"))
            }
            Command::Group(GroupCommand::Write { name, fields }) => {
                Request::new(Operation::Update, format!("groups/{name}"))
                    .with_data(fields.to_data())
            }
            Command::Group(GroupCommand::Delete { name }) => {
                Request::new(Operation::Delete, format!("groups/{name}"))
            }

            Command::Peer(PeerCommand::Read { group, name }) => {
                Request::new(Operation::Read, format!("groups/{group}/{name}"))
            }
            Command::Peer(PeerCommand::Write { group, name, fields }) => {
                Request::new(Operation::Update, format!("groups/{group}/{name}"))
                    .with_data(fields.to_data())
            }
            Command::Peer(PeerCommand::Delete { group, name }) => {
                Request::new(Operation::Delete, format!("groups/{group}/{name}"))
            }
        }
    }

    pub async fn execute(self, backend: &Backend) -> anyhow::Result<CommandResult> {
        let request = self.to_request();
        let path = request.path.clone();
        let response = backend.handle_request(request).await?;

        let result = match (&self, response) {
            (Command::Config { .. }, Some(response)) => match response.data.get("config") {
                Some(Value::String(config)) => CommandResult::Text(config.clone()),
                _ => bail!("malformed config response for {path}"),
            },
            (Command::Groups | Command::Peers { .. }, Some(response)) => {
                CommandResult::Json(response.data.get("keys").cloned().unwrap_or_else(|| json!([])))
            }
            (_, Some(response)) => CommandResult::Json(response.data),
            (
                Command::Group(GroupCommand::Read { .. }) | Command::Peer(PeerCommand::Read { .. }),
                None,
            ) => bail!("{path} not found"),
            (_, None) => CommandResult::Done,
        };
        Ok(result)
    }
}

impl GroupFields {
    fn to_data(&self) -> Value {
        let mut data = Map::new();
        insert(&mut data, "network", self.network.as_ref().map(|v| json!(v)));
        insert(&mut data, "persistent_keepalive", self.persistent_keepalive.map(|v| json!(v)));
        insert(&mut data, "ttl", self.ttl.as_ref().map(|v| json!(v)));
        insert(&mut data, "max_ttl", self.max_ttl.as_ref().map(|v| json!(v)));
        Value::Object(data)
    }
}

impl PeerFields {
    fn to_data(&self) -> Value {
        let mut data = Map::new();
        insert(&mut data, "allowed_ips", self.allowed_ips.as_ref().map(|v| json!(v)));
        insert(&mut data, "hostname", self.hostname.as_ref().map(|v| json!(v)));
        insert(&mut data, "port", self.port.map(|v| json!(v)));
        insert(&mut data, "private_key", self.private_key.as_ref().map(|v| json!(v)));
        insert(&mut data, "public_key", self.public_key.as_ref().map(|v| json!(v)));
        Value::Object(data)
    }
}

fn insert(data: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(value) = value {
        data.insert(key.to_string(), value);
    }
}
