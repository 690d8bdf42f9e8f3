use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use planet_tracker::api::{build_router, state::AppState};
use planet_tracker::commands::Bot;
use planet_tracker::config::AppConfig;
use planet_tracker::notify::{ChatNotifier, LogNotifier, Notifier};
use planet_tracker::reference::ReferenceData;
use planet_tracker::scanner::UpgradeScanner;
use planet_tracker::storage::{PlayerStore, StorageConfig};

#[derive(Parser)]
#[command(name = "planet-tracker")]
#[command(about = "Planet upgrade tracker and research planner for chat servers")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Data directory path (overrides config)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Reference data directory (overrides config)
    #[arg(long)]
    reference_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server and the upgrade scanner
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run a single command for a player and print the reply
    Run {
        /// Player id
        #[arg(long)]
        player: String,

        /// Command line, e.g. `list_planets`
        #[arg(trailing_var_arg = true, required = true)]
        command: Vec<String>,
    },

    /// Complete every due upgrade once and exit
    Scan,

    /// Print the effective configuration
    ShowConfig,
}

fn build_notifier(config: &AppConfig) -> Result<Arc<dyn Notifier>> {
    let Some(channel_id) = config.chat.channel_id.as_deref() else {
        tracing::info!("No notification channel configured, logging completions only");
        return Ok(Arc::new(LogNotifier));
    };

    match config.chat.token() {
        Some(token) => {
            let notifier = ChatNotifier::new(
                &config.chat.api_base,
                channel_id,
                &token,
                config.chat.timeout(),
            )
            .context("Failed to build chat notifier")?;
            tracing::info!("Posting completions to channel {}", channel_id);
            Ok(Arc::new(notifier))
        }
        None => {
            tracing::warn!(
                "{} is not set, logging completions only",
                config.chat.token_env
            );
            Ok(Arc::new(LogNotifier))
        }
    }
}

fn build_bot(config: &AppConfig) -> Result<Bot> {
    let storage = StorageConfig::new(config.data_dir.clone());
    let store = PlayerStore::load(storage.players_file())
        .with_context(|| format!("Failed to load {}", storage.players_file().display()))?;
    let reference = ReferenceData::load(&config.reference_dir).with_context(|| {
        format!(
            "Failed to load reference data from {}",
            config.reference_dir.display()
        )
    })?;
    let notifier = build_notifier(config)?;

    tracing::info!("Loaded {} players", store.len());
    Ok(Bot::new(store, reference, notifier))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(reference_dir) = cli.reference_dir {
        config.reference_dir = reference_dir;
    }
    if let Some(log_level) = cli.log_level {
        config.log_level = log_level;
    }

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    let fmt_layer = if cli.json_logs {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();

    tracing::debug!("Starting planet-tracker v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);

            let bot = Arc::new(build_bot(&config)?);
            let scanner = UpgradeScanner::new(bot.clone(), config.scan_interval()).start();

            let app = build_router(AppState::new(bot), &config.server.cors_origin);
            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;
            tracing::info!("Listening on http://{}", addr);

            let served = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await;
            scanner.stop().await;
            served?;
        }

        Commands::Run { player, command } => {
            let bot = build_bot(&config)?;
            let reply = bot.handle(&player, &command.join(" ")).await?;
            println!("{}", reply);
        }

        Commands::Scan => {
            let bot = build_bot(&config)?;
            let completed = bot.scan(Utc::now().timestamp()).await?;
            println!("Completed {} upgrades", completed.len());
            for completion in &completed {
                println!("  {}", completion.message());
            }
        }

        Commands::ShowConfig => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}
