//! CLI for the RFM remote file mirror.

mod commands;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use rfm_core::config::{self, RfmConfig};
use rfm_core::digest::{Algorithm, Encoding};
use rfm_core::retry::RetryPolicy;
use rfm_core::state_db::StateDb;
use rfm_core::Reconciler;
use std::path::PathBuf;
use std::sync::Arc;

use commands::{run_apply, run_completions, run_destroy, run_digest, run_man, run_refresh, run_status};

/// Top-level CLI for the RFM remote file mirror.
#[derive(Debug, Parser)]
#[command(name = "rfm")]
#[command(about = "RFM: keep local files mirrored from remote URLs", long_about = None)]
pub struct Cli {
    /// State database path (overrides `state_db` in config.toml).
    #[arg(long, global = true, value_name = "PATH")]
    pub state_db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Create the file if missing, recreate it if it drifted, otherwise do nothing.
    Apply {
        /// Direct HTTP/HTTPS source URL.
        url: String,
        /// Local destination file.
        destination: PathBuf,
        /// Refuse content whose base64 SHA-256 differs from this value.
        #[arg(long, value_name = "BASE64")]
        sha256: Option<String>,
    },

    /// Check managed files for drift without downloading replacements.
    Refresh {
        /// Resource identifier (all resources if omitted).
        id: Option<i64>,
    },

    /// Delete a managed file and forget its record.
    Destroy {
        /// Resource identifier.
        id: i64,
        /// Keep the record (desired state) and only clear its actual state.
        #[arg(long)]
        keep_record: bool,
    },

    /// Show all managed resources.
    Status {
        /// Print records as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Compute a digest of a local file.
    Digest {
        /// Path to the file.
        path: PathBuf,
        #[arg(long, default_value = "sha256", value_name = "ALGORITHM")]
        algorithm: Algorithm,
        #[arg(long, default_value = "base64", value_name = "ENCODING")]
        encoding: Encoding,
    },

    /// Print shell completions.
    Completions {
        shell: clap_complete::Shell,
    },

    /// Print a man page.
    Man,
}

/// Everything commands that reconcile need: state DB, core, retry policy.
pub struct Host {
    pub db: StateDb,
    pub reconciler: Arc<Reconciler>,
    pub retry: RetryPolicy,
}

impl Host {
    pub async fn open(cfg: &RfmConfig, state_db: Option<PathBuf>) -> Result<Self> {
        let db = match state_db.or_else(|| cfg.state_db.clone()) {
            Some(path) => StateDb::open_at(path).await?,
            None => StateDb::open_default().await?,
        };
        let retry = cfg
            .retry
            .as_ref()
            .map(RetryPolicy::from_config)
            .unwrap_or_default();
        Ok(Host {
            db,
            reconciler: Arc::new(Reconciler::from_config(cfg)),
            retry,
        })
    }
}

impl Cli {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        // Commands that need neither config nor state.
        match &cli.command {
            CliCommand::Digest {
                path,
                algorithm,
                encoding,
            } => return run_digest(path, *algorithm, *encoding),
            CliCommand::Completions { shell } => return run_completions(*shell, &mut Cli::command()),
            CliCommand::Man => return run_man(Cli::command()),
            _ => {}
        }

        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let host = Host::open(&cfg, cli.state_db).await?;

        match cli.command {
            CliCommand::Apply {
                url,
                destination,
                sha256,
            } => run_apply(&host, &url, &destination, sha256).await?,
            CliCommand::Refresh { id } => run_refresh(&host, id).await?,
            CliCommand::Destroy { id, keep_record } => run_destroy(&host, id, keep_record).await?,
            CliCommand::Status { json } => run_status(&host.db, json).await?,
            CliCommand::Digest { .. } | CliCommand::Completions { .. } | CliCommand::Man => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
