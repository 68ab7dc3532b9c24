//! Stoa Pulse CLI
//!
//! Collective temperature, pulse and mood for agent populations.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::time::Duration;
use stoa_pulse::{
    broadcast::{BroadcastScheduler, MetricsHub},
    config::{Config, SourceConfig},
    core::{count_hits, SnapshotAssembler},
    source::{DataSource, MockSource},
    VERSION,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stoa-pulse")]
#[command(version = VERSION)]
#[command(about = "Collective temperature, pulse and mood for agent populations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the broadcast scheduler (and HTTP server when built with it)
    Serve {
        /// Port for the HTTP server
        #[arg(long)]
        port: Option<u16>,

        /// Seconds between broadcast ticks
        #[arg(long)]
        interval: Option<u64>,

        /// Data source: "mock" or an http(s) URL returning { agents, projects }
        #[arg(long)]
        source: Option<String>,

        /// Number of readings kept for charting
        #[arg(long)]
        history: Option<usize>,
    },

    /// Assemble one state from generated data and print it as JSON
    Snapshot {
        /// Number of generated agents
        #[arg(long, default_value = "20")]
        agents: usize,

        /// Number of generated projects
        #[arg(long, default_value = "15")]
        projects: usize,
    },

    /// Print the sentiment score of a text
    Score {
        /// Text to score
        text: String,
    },

    /// Show configuration
    Config {
        /// Write the default configuration file if none exists
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging();

    match cli.command {
        Commands::Serve {
            port,
            interval,
            source,
            history,
        } => cmd_serve(port, interval, source, history).await,
        Commands::Snapshot { agents, projects } => cmd_snapshot(agents, projects),
        Commands::Score { text } => {
            cmd_score(&text);
            Ok(())
        }
        Commands::Config { init } => cmd_config(init),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

async fn cmd_serve(
    port: Option<u16>,
    interval: Option<u64>,
    source: Option<String>,
    history: Option<usize>,
) -> Result<()> {
    let mut config = Config::load().context("Failed to load configuration")?;

    if let Some(port) = port {
        config.port = port;
    }
    if let Some(secs) = interval {
        config.tick_interval = Duration::from_secs(secs);
    }
    if let Some(capacity) = history {
        config.history_capacity = capacity;
    }
    if let Some(arg) = source {
        config.source = SourceConfig::from_arg(&arg)
            .with_context(|| format!("Unknown source '{arg}', expected mock or an http(s) URL"))?;
    }
    config.validate()?;

    println!("Stoa Pulse v{VERSION}");
    println!();

    match config.source.clone() {
        SourceConfig::Mock { agents, projects } => {
            println!("  Source: mock ({agents} agents, {projects} projects)");
            serve_with(MockSource::new(agents, projects), config).await
        }
        #[cfg(feature = "live")]
        SourceConfig::Http { url } => {
            let source = stoa_pulse::source::HttpSource::new(url, config.fetch_timeout)?;
            println!("  Source: {}", source.url());
            serve_with(source, config).await
        }
        #[cfg(not(feature = "live"))]
        SourceConfig::Http { url } => {
            anyhow::bail!("Source '{url}' needs the `live` feature enabled at compile time")
        }
    }
}

async fn serve_with<S: DataSource>(source: S, config: Config) -> Result<()> {
    println!("  Tick interval: {}s", config.tick_interval.as_secs());
    println!("  History capacity: {}", config.history_capacity);

    let hub = MetricsHub::new(config.history_capacity);
    let assembler = SnapshotAssembler::new(config.scales.clone(), config.mood.clone());

    #[cfg(feature = "server")]
    let (addr, server_shutdown) = stoa_pulse::server::run(
        stoa_pulse::server::ServerConfig::new(config.port),
        hub.clone(),
    )
    .await?;
    #[cfg(feature = "server")]
    println!("  Dashboard API: http://{addr}/api/metrics");

    println!();
    println!("Press Ctrl+C to stop");
    println!();

    // Console subscriber, one line per broadcast tick
    let mut updates = hub.subscribe();
    let console = tokio::spawn(async move {
        while let Ok(state) = updates.recv().await {
            println!(
                "[{}] temperature {:.1} | pulse {:.1} | mood {} | {}/{} agents active, {} projects",
                state.computed_at().format("%H:%M:%S"),
                state.temperature(),
                state.pulse(),
                state.mood(),
                state.active_agents(),
                state.total_agents(),
                state.total_projects()
            );
        }
    });

    let mut scheduler = BroadcastScheduler::new(
        source,
        assembler,
        hub.clone(),
        config.tick_interval,
        config.fetch_timeout,
    );
    scheduler.start()?;

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    println!();
    println!("Stopping...");
    scheduler.stop().await?;
    console.abort();

    #[cfg(feature = "server")]
    let _ = server_shutdown.send(());

    println!();
    println!("{}", hub.stats_summary());
    Ok(())
}

fn cmd_snapshot(agents: usize, projects: usize) -> Result<()> {
    let config = Config::load().unwrap_or_default();
    let now = Utc::now();
    let data = MockSource::new(agents, projects).generate(now);

    let state = SnapshotAssembler::new(config.scales, config.mood).assemble(&data, now)?;
    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}

fn cmd_score(text: &str) {
    let hits = count_hits(text);

    println!("Tokens: {}", hits.tokens);
    println!("Positive hits: {}", hits.positive);
    println!("Negative hits: {}", hits.negative);
    println!("Score: {:.4}", hits.score());
}

fn cmd_config(init: bool) -> Result<()> {
    let path = Config::config_path();

    if init {
        if path.exists() {
            println!("Config file already exists at {path:?}, leaving it untouched");
        } else {
            Config::default()
                .save()
                .context("Failed to write default configuration")?;
            println!("Wrote default configuration to {path:?}");
        }
        println!();
    }

    let config = Config::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {path:?}");
    println!();
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
