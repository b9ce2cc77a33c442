//! Siteline CLI - Mutation queue and synthetic dataset tools.
//!
//! # Usage
//!
//! ```bash
//! # Check whether a remote backend is configured
//! sl-cli probe
//!
//! # Inspect and manage the mutation queue
//! sl-cli queue list
//! sl-cli queue remove 42
//! sl-cli queue replay
//!
//! # Dump the synthetic dataset
//! sl-cli dataset --entity orders
//! ```
//!
//! # Commands
//!
//! - `probe` - Report the capability flag and queue location
//! - `queue` - List, remove or replay pending mutations
//! - `dataset` - Log the synthetic fixtures as JSON

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use siteline_sync::{LogFormat, SyncConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::dataset::EntityKind;

#[derive(Parser)]
#[command(name = "sl-cli")]
#[command(author, version, about = "Siteline CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report whether the remote backend is configured
    Probe,
    /// Manage the mutation queue
    Queue {
        #[command(subcommand)]
        action: QueueAction,
    },
    /// Log the synthetic dataset
    Dataset {
        /// Only this collection
        #[arg(short, long, value_enum)]
        entity: Option<EntityKind>,
    },
}

#[derive(Subcommand)]
enum QueueAction {
    /// List pending mutations in replay order
    List,
    /// Remove one pending mutation
    Remove {
        /// Queue entry id
        id: i64,
    },
    /// Replay pending mutations against the remote backend
    Replay,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &SyncConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "siteline_sync=info,siteline_cli=info".into());

    let json = format == LogFormat::Json;
    let json_layer = json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match SyncConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt::init();
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    let _sentry_guard = init_sentry(&config);
    init_tracing(config.log_format);

    let result: Result<(), Box<dyn std::error::Error>> = run(cli, &config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &SyncConfig) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Probe => commands::probe::report(config).await,
        Commands::Queue { action } => match action {
            QueueAction::List => commands::queue::list(config).await?,
            QueueAction::Remove { id } => commands::queue::remove(config, id).await?,
            QueueAction::Replay => commands::queue::replay(config).await?,
        },
        Commands::Dataset { entity } => commands::dataset::dump(entity)?,
    }
    Ok(())
}
