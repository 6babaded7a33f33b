//! Modman - mod collection manager
//!
//! Usage:
//!   modman status             # Show the collection
//!   modman install <id>       # Subscribe and schedule an install
//!   modman uninstall <id>     # Unsubscribe and schedule removal
//!   modman process --all      # Drain pending work

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use modman_core::collection::{ModCollection, RequestOutcome};
use modman_core::config::{ConfigStore, ModmanConfig};
use modman_core::context::AppContext;
use modman_core::events::ModManagementEvent;
use modman_core::orchestration::{DrainReport, ProcessOutcome};
use modman_core::types::{ModId, UserId};

#[derive(Parser)]
#[command(name = "modman")]
#[command(about = "Mod collection manager", long_about = None)]
struct Cli {
    /// Path to modman.toml (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show every entry in the collection
    Status {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Subscribe a user to a mod and schedule its installation
    Install {
        /// Mod id
        id: ModId,
        /// User to subscribe (defaults to the configured active user)
        #[arg(long)]
        user: Option<UserId>,
    },

    /// Schedule an update for an installed mod
    Update {
        /// Mod id
        id: ModId,
    },

    /// Unsubscribe a user; the mod is removed once nobody is subscribed
    #[command(alias = "rm")]
    Uninstall {
        /// Mod id
        id: ModId,
        /// User to unsubscribe (defaults to the configured active user)
        #[arg(long)]
        user: Option<UserId>,
    },

    /// Process pending installs, updates and removals
    Process {
        /// Keep going until nothing is pending
        #[arg(long)]
        all: bool,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Set the active user whose subscriptions are installed
    Config {
        /// User id
        active_user: UserId,
    },
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "modman_core=info,modman=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let store = match cli.config {
        Some(path) => ConfigStore::from_path(path),
        None => ConfigStore::from_default_path()?,
    };
    let config = store.load()?;

    match cli.command {
        Commands::Status { format } => run_status(&config, format),
        Commands::Install { id, user } => {
            let user = resolve_user(&config, user)?;
            run_request(&config, |collection| {
                Ok(collection.request_install(id, user))
            })?;
            println!("Scheduled install of mod {} for user {}", id, user);
            Ok(())
        }
        Commands::Update { id } => {
            run_request(&config, |collection| Ok(collection.request_update(id)?))?;
            println!("Scheduled update of mod {}", id);
            Ok(())
        }
        Commands::Uninstall { id, user } => {
            let user = resolve_user(&config, user)?;
            run_request(&config, |collection| {
                Ok(collection.request_uninstall(id, user)?)
            })?;
            println!("Unsubscribed user {} from mod {}", user, id);
            Ok(())
        }
        Commands::Process { all, format } => run_process(&config, all, format).await,
        Commands::Config { active_user } => {
            let mut updated = config.clone();
            updated.active_user = Some(active_user);
            store.save(&updated)?;
            println!(
                "Active user set to {} in {}",
                active_user,
                store.config_path().display()
            );
            Ok(())
        }
    }
}

fn resolve_user(config: &ModmanConfig, user: Option<UserId>) -> Result<UserId> {
    user.or(config.active_user).context(
        "No user given and no active user configured (use --user or `modman config <user>`)",
    )
}

fn run_request<F>(config: &ModmanConfig, apply: F) -> Result<()>
where
    F: FnOnce(&mut ModCollection) -> Result<RequestOutcome>,
{
    let ctx = AppContext::from_config(config)?;
    let store = ctx.collection_store();
    let mut collection = store.load()?;

    if apply(&mut collection)? == RequestOutcome::Changed {
        store.save(&collection)?;
    } else {
        tracing::info!("collection already up to date");
    }
    Ok(())
}

fn run_status(config: &ModmanConfig, format: OutputFormat) -> Result<()> {
    let ctx = AppContext::from_config(config)?;
    let collection = ctx.collection_store().load()?;

    match format {
        OutputFormat::Json => {
            let entries: Vec<_> = collection.entries().collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Table => {
            if collection.is_empty() {
                println!("No mods in collection.");
                return Ok(());
            }
            println!("{:<12} {:<22} {:<8} SUBSCRIBERS", "MOD", "STATE", "RETRY");
            for entry in collection.entries() {
                let subscribers = entry
                    .subscribers()
                    .iter()
                    .map(|user| user.to_string())
                    .collect::<Vec<_>>()
                    .join(",");
                let marker = if ctx.active_user().is_some_and(|u| entry.is_subscribed_by(u)) {
                    "*"
                } else {
                    ""
                };
                println!(
                    "{:<12} {:<22} {:<8} {}{}",
                    entry.id(),
                    entry.state(),
                    if entry.should_retry() { "yes" } else { "no" },
                    subscribers,
                    marker
                );
            }
        }
    }
    Ok(())
}

async fn run_process(config: &ModmanConfig, all: bool, format: OutputFormat) -> Result<()> {
    let ctx = AppContext::from_config(config)?;
    let collection = ctx.load_collection()?;
    let processor = ctx.processor(collection.clone());

    let report = if all {
        processor.drain().await
    } else {
        let mut report = DrainReport::default();
        match processor.process_next().await {
            Ok(ProcessOutcome::Idle) => {}
            Ok(ProcessOutcome::Processed { id, kind }) => report.processed.push((id, kind)),
            Err(err) => report.failure = Some(err),
        }
        report
    };

    let events = ctx.events().drain();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&events)?),
        OutputFormat::Table => print_events(&events),
    }

    if let Some(err) = report.failure {
        // Keep retry flags set by the failed pass for the next invocation.
        ctx.save_collection(&collection).await?;
        anyhow::bail!("Processing stopped: {}", err);
    }
    if report.processed.is_empty() && matches!(format, OutputFormat::Table) {
        println!("Nothing to process.");
    }
    Ok(())
}

fn print_events(events: &[ModManagementEvent]) {
    for event in events {
        match &event.status {
            None => println!("✓ {} {}", event.kind, event.id),
            Some(err) => println!("✗ {} {}: {}", event.kind, event.id, err),
        }
    }
}
