//! SoundGraph CLI: normalize proof files and exercise the verification flow
//! offline.

mod config;
mod render;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use serde::Serialize;
use soundgraph_nullables::NullProvider;
use soundgraph_proof::{DisplayModel, ProfileSnapshot, ProofNormalizer};
use soundgraph_session::SessionOrchestrator;
use soundgraph_types::{RawProof, VerificationConfig};
use soundgraph_utils::LogFormat;

use crate::config::CliConfig;
use crate::render::View;

#[derive(Parser)]
#[command(name = "soundgraph", about = "Verified listening-profile tooling")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "SOUNDGRAPH_CONFIG")]
    config: Option<PathBuf>,

    /// Application identifier registered with the proof provider.
    #[arg(long, env = "SOUNDGRAPH_APPLICATION_ID")]
    application_id: Option<String>,

    /// Application secret. Never read from the config file.
    #[arg(long, env = "SOUNDGRAPH_APP_SECRET", hide_env_values = true)]
    app_secret: Option<String>,

    /// Provider template to request a proof from.
    #[arg(long, env = "SOUNDGRAPH_PROVIDER_ID")]
    provider_id: Option<String>,

    /// Public share page URL.
    #[arg(long, env = "SOUNDGRAPH_SHARE_PAGE_URL")]
    share_page_url: Option<String>,

    /// Request the provider's embedded flow.
    #[arg(long, env = "SOUNDGRAPH_EMBEDDED_FLOW")]
    embedded_flow: bool,

    /// Log output format: "human" or "json".
    #[arg(long, env = "SOUNDGRAPH_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "SOUNDGRAPH_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Normalize a proof file and print a derived view.
    Normalize {
        /// JSON file holding an array of proofs or a single proof object.
        #[arg(long)]
        proofs: PathBuf,

        #[arg(long, value_enum, default_value_t = View::Overview)]
        view: View,

        /// Print the snapshot and display model as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Run a full session against the in-process provider.
    Simulate {
        /// Proofs the provider delivers on success.
        #[arg(long)]
        proofs: PathBuf,

        /// Make the provider report this failure instead.
        #[arg(long)]
        fail: Option<String>,
    },

    /// Configuration utilities.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Subcommand)]
enum ConfigAction {
    /// Load and validate configuration, printing it with the secret redacted.
    Check,
}

#[derive(Serialize)]
struct NormalizedOutput<'a> {
    snapshot: &'a ProfileSnapshot,
    display: &'a DisplayModel,
}

impl Cli {
    /// File settings (or defaults) with command line overrides applied.
    fn resolve_config(&self) -> anyhow::Result<CliConfig> {
        let mut config = match &self.config {
            Some(path) => CliConfig::from_toml_file(path)?,
            None => CliConfig::default(),
        };
        if let Some(id) = &self.application_id {
            config.application_id = id.clone();
        }
        if let Some(id) = &self.provider_id {
            config.provider_id = id.clone();
        }
        if let Some(url) = &self.share_page_url {
            config.share_page_url = url.clone();
        }
        if self.embedded_flow {
            config.use_embedded_flow = true;
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        Ok(config)
    }

    fn verification_config(&self, config: &CliConfig) -> anyhow::Result<VerificationConfig> {
        let Some(secret) = self.app_secret.as_deref() else {
            bail!("application secret missing: pass --app-secret or set SOUNDGRAPH_APP_SECRET");
        };
        config
            .verification_config(secret)
            .context("invalid verification configuration")
    }
}

fn read_proofs(path: &Path) -> anyhow::Result<Vec<RawProof>> {
    let body = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read proofs from {}", path.display()))?;
    RawProof::parse_many(&body).with_context(|| format!("{} is not valid JSON", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    soundgraph_utils::init_logging(config.log_format, &config.log_level);
    if let Some(path) = &cli.config {
        tracing::debug!("loaded config from {}", path.display());
    }

    match &cli.command {
        Command::Normalize { proofs, view, json } => {
            let proofs = read_proofs(proofs)?;
            let snapshot = ProofNormalizer::new().normalize(proofs);
            let model = DisplayModel::derive(&snapshot);
            if *json {
                let output = NormalizedOutput {
                    snapshot: &snapshot,
                    display: &model,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print!("{}", render::render(*view, &snapshot, &model));
            }
        }

        Command::Simulate { proofs, fail } => {
            let verification = cli.verification_config(&config)?;
            let proofs = read_proofs(proofs)?;

            let provider = NullProvider::new();
            let orchestrator = SessionOrchestrator::new(Arc::new(provider.clone()));
            orchestrator.on_progress(|event| println!("[{}] {}", event.status, event.message));
            tracing::info!(
                provider = orchestrator.provider_name(),
                "simulating verification session"
            );

            let mut handle = orchestrator.begin(&verification).await?;
            if let Some(url) = handle.request_url() {
                println!("verification URL: {url}");
            }

            let delivered = match fail {
                Some(reason) => provider.emit_failure(reason),
                None => provider.emit_success(proofs),
            };
            tracing::debug!(delivered, "simulated provider outcome");

            match handle.outcome().await?.into_proofs() {
                Ok(proofs) => {
                    let snapshot = ProofNormalizer::new().normalize(proofs);
                    let model = DisplayModel::derive(&snapshot);
                    print!("{}", render::overview(&snapshot, &model));
                }
                Err(reason) => bail!("verification failed: {reason}"),
            }
        }

        Command::Config { action } => match action {
            ConfigAction::Check => {
                let verification = cli.verification_config(&config)?;
                print!("{}", config.to_toml_string()?);
                println!("# application secret: {:?}", verification.application_secret());
                tracing::info!(
                    application_id = %verification.application_id(),
                    provider_id = %verification.provider_id(),
                    "configuration is valid"
                );
            }
        },
    }

    Ok(())
}
