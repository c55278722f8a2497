//! # Alerting Provisioner
//!
//! Applies declared Grafana alerting contact points and mute timings.
//!
//! ## Usage
//!
//! ```bash
//! # Create or update a contact point; pass the last returned state to update
//! alerting-provisioner contact-point apply -f ops.yaml --state ops.state.json
//!
//! # Adopt an existing contact point
//! alerting-provisioner contact-point import 1:ops
//!
//! # Remove a mute timing
//! alerting-provisioner mute-timing delete 2:weekends
//!
//! # Show the notifier kinds and their settings
//! alerting-provisioner notifiers
//! ```
//!
//! Connection settings come from `GRAFANA_URL`, `GRAFANA_AUTH` and
//! `GRAFANA_ORG_ID`; `--url` and `--org-id` override them.

use alerting_provisioner::observability::{self, metrics};
use alerting_provisioner::{
    ContactPointConfig, GrafanaRestClient, MuteTimingConfig, NotifierRegistry, ProvisionerConfig,
    ReadOutcome, ReconcileSettings, Reconciler,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Grafana alerting provisioner
#[derive(Parser)]
#[command(name = "alerting-provisioner")]
#[command(about = "Grafana alerting provisioner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Grafana base URL (defaults to GRAFANA_URL)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Organization used when a resource does not name one (defaults to GRAFANA_ORG_ID)
    #[arg(long, global = true)]
    org_id: Option<i64>,

    /// Print Prometheus metrics to stderr before exiting
    #[arg(long, global = true)]
    dump_metrics: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage contact points
    #[command(name = "contact-point", subcommand)]
    ContactPoint(ContactPointCommand),
    /// Manage mute timings
    #[command(name = "mute-timing", subcommand)]
    MuteTiming(MuteTimingCommand),
    /// Print the settings accepted by every notifier kind
    Notifiers,
}

#[derive(Subcommand)]
enum ContactPointCommand {
    /// Create the declared contact point, or update it when a prior state is given
    Apply {
        /// Declared contact point (YAML or JSON)
        #[arg(short, long, value_name = "FILE")]
        file: PathBuf,
        /// State returned by the previous apply
        #[arg(long, value_name = "FILE")]
        state: Option<PathBuf>,
    },
    /// Read the current state of a contact point
    Read {
        /// `org:name`, or a legacy `uid1;uid2` list
        #[arg(value_name = "ID")]
        id: String,
        /// State returned by the previous apply; secure settings are taken from it
        #[arg(long, value_name = "FILE")]
        state: Option<PathBuf>,
    },
    /// Adopt an existing contact point
    Import {
        #[arg(value_name = "ID")]
        id: String,
    },
    /// Delete every notifier of a contact point
    Delete {
        #[arg(value_name = "ID")]
        id: String,
    },
}

#[derive(Subcommand)]
enum MuteTimingCommand {
    /// Create the declared mute timing, or update it when a prior state is given
    Apply {
        /// Declared mute timing (YAML or JSON)
        #[arg(short, long, value_name = "FILE")]
        file: PathBuf,
        /// State returned by the previous apply
        #[arg(long, value_name = "FILE")]
        state: Option<PathBuf>,
    },
    /// Read the current state of a mute timing
    Read {
        /// `org:name`
        #[arg(value_name = "ID")]
        id: String,
        /// State returned by the previous apply
        #[arg(long, value_name = "FILE")]
        state: Option<PathBuf>,
    },
    /// Delete a mute timing
    Delete {
        #[arg(value_name = "ID")]
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ProvisionerConfig::from_env();
    if let Some(url) = cli.url.clone() {
        config.grafana_url = url;
    }
    if let Some(org_id) = cli.org_id {
        config.org_id = org_id;
    }

    observability::init_tracing(&config);
    metrics::register_metrics().context("Failed to register metrics")?;

    let result = run(cli.command, &config).await;

    if cli.dump_metrics {
        eprintln!("{}", metrics::gather_text()?);
    }
    result
}

async fn run(command: Commands, config: &ProvisionerConfig) -> Result<()> {
    if let Commands::Notifiers = command {
        return print_json(&NotifierRegistry::global().configuration_shape());
    }

    let api = GrafanaRestClient::new(config).context("Failed to create Grafana client")?;
    info!("Using Grafana at {:?}", api);

    let cancel = CancellationToken::new();
    let reconciler = Reconciler::new(Arc::new(api), ReconcileSettings::from(config))
        .with_cancellation(cancel.clone());

    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling pending retries");
            shutdown.cancel();
        }
    });

    match command {
        Commands::ContactPoint(command) => contact_point_command(&reconciler, command).await,
        Commands::MuteTiming(command) => mute_timing_command(&reconciler, command).await,
        Commands::Notifiers => Ok(()),
    }
}

async fn contact_point_command(reconciler: &Reconciler, command: ContactPointCommand) -> Result<()> {
    match command {
        ContactPointCommand::Apply { file, state } => {
            let desired: ContactPointConfig = load(&file)?;
            let applied = match state {
                Some(path) => {
                    let prior: ContactPointConfig = load(&path)?;
                    reconciler.update_contact_point(&desired, &prior).await?
                }
                None => reconciler.create_contact_point(&desired).await?,
            };
            print_json(&applied)
        }
        ContactPointCommand::Read { id, state } => {
            let prior: ContactPointConfig = match state {
                Some(path) => load(&path)?,
                None => ContactPointConfig::default(),
            };
            print_outcome(reconciler.read_contact_point(&id, &prior), &id).await
        }
        ContactPointCommand::Import { id } => {
            print_json(&reconciler.import_contact_point(&id).await?)
        }
        ContactPointCommand::Delete { id } => {
            reconciler.delete_contact_point(&id).await?;
            info!("Deleted contact point {}", id);
            Ok(())
        }
    }
}

async fn mute_timing_command(reconciler: &Reconciler, command: MuteTimingCommand) -> Result<()> {
    match command {
        MuteTimingCommand::Apply { file, state } => {
            let desired: MuteTimingConfig = load(&file)?;
            let applied = match state {
                Some(path) => {
                    let prior: MuteTimingConfig = load(&path)?;
                    reconciler.update_mute_timing(&desired, &prior).await?
                }
                None => reconciler.create_mute_timing(&desired).await?,
            };
            print_json(&applied)
        }
        MuteTimingCommand::Read { id, state } => {
            let prior: Option<MuteTimingConfig> = match state {
                Some(path) => Some(load(&path)?),
                None => None,
            };
            print_outcome(reconciler.read_mute_timing(&id, prior.as_ref()), &id).await
        }
        MuteTimingCommand::Delete { id } => {
            reconciler.delete_mute_timing(&id).await?;
            info!("Deleted mute timing {}", id);
            Ok(())
        }
    }
}

async fn print_outcome<T, E>(
    read: impl Future<Output = Result<ReadOutcome<T>, E>>,
    id: &str,
) -> Result<()>
where
    T: Serialize,
    E: std::error::Error + Send + Sync + 'static,
{
    match read.await? {
        ReadOutcome::Found(state) => print_json(&state),
        ReadOutcome::Missing => anyhow::bail!("{id} no longer exists"),
    }
}

/// Parse a YAML or JSON document
fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_yaml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to render output")?;
    println!("{rendered}");
    Ok(())
}
