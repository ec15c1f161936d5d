//! Global CLI options and process bootstrap.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use service::Backend;
use storage::JsonFileStorage;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::commands::Command;

#[derive(Debug, Parser)]
#[command(name = "wg-groups", version, about = "Manage WireGuard peer groups", long_about = None)]
pub struct CliConfig {
    /// JSON file holding every group and peer record
    #[arg(long, global = true, default_value = "wg-groups.json")]
    pub store: PathBuf,

    /// Log filter (`warn`, `debug`, `service=trace`, ...); `RUST_LOG` wins when set
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    /// Set up logging, open the store and run the selected command.
    pub fn run(self) -> anyhow::Result<()> {
        init_logging(&self.log_level)?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to start async runtime")?;

        runtime.block_on(self.execute())
    }

    async fn execute(self) -> anyhow::Result<()> {
        let storage = JsonFileStorage::open(self.store.clone())
            .await
            .with_context(|| format!("failed to open store {}", self.store.display()))?;
        debug!(store = %self.store.display(), "store opened");

        let backend = Backend::with_storage(Arc::new(storage));
        let result = self.command.execute(&backend).await?;
        print!("{result}");
        Ok(())
    }
}

/// Log to stderr so command output on stdout stays machine readable.
fn init_logging(level: &str) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("invalid log level {level:?}"))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))
}
