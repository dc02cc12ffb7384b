use clap::{Parser, ValueEnum};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::{info, warn};
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use fleetwatch::aggregate::SnapshotAggregator;
use fleetwatch::config_loader::{self, CliOverrides, ConfigFileSettings};
use fleetwatch::fetch::HttpTransport;
use fleetwatch::registry;
use fleetwatch::render::{JsonRenderer, RenderSink, TableRenderer};
use fleetwatch::scheduler::{scheduler, SchedulerHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

/// Status dashboard for a fleet of blockchain nodes
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the dashboard configuration YAML file
    #[arg(short, long)]
    config: PathBuf,

    /// Run a single polling pass and exit
    #[arg(long)]
    once: bool,

    /// How snapshots are printed
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// API key, overriding the config file
    #[arg(long)]
    api_key: Option<String>,

    /// Polling interval (e.g. "30s"), overriding the config file
    #[arg(short, long, allow_hyphen_values = true)]
    interval: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Ignore stdin; poll until interrupted (implied when stdin is not a terminal)
    #[arg(long)]
    no_input: bool,
}

/// How the process decides when to stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunMode {
    /// One pass, then exit
    Once,
    /// Operator toggles with Enter, quits with `q` or end of input
    Interactive,
    /// Periodic polling until Ctrl-C
    Detached,
}

fn run_mode(once: bool, no_input: bool, stdin_is_terminal: bool, interval_secs: i64) -> RunMode {
    if once {
        RunMode::Once
    } else if no_input || !stdin_is_terminal {
        if interval_secs <= 0 {
            RunMode::Once
        } else {
            RunMode::Detached
        }
    } else {
        RunMode::Interactive
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let args = Args::parse();

    let overrides = CliOverrides {
        api_key: args.api_key.clone(),
        interval: args.interval.clone(),
    };
    let mut config = config_loader::load_config(&args.config)?;
    config_loader::apply_cli_overrides(&mut config, &overrides)?;

    let log_level = args
        .log_level
        .clone()
        .or_else(|| config.log_level.clone())
        .unwrap_or_else(|| "info".to_string());
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    info!("Starting fleetwatch");
    info!("Configuration file: {:?}", args.config);

    let registry = registry::load_nodes(&config.nodes)
        .wrap_err_with(|| format!("Failed to load node list '{}'", config.nodes.display()))?;
    let transport = HttpTransport::new(config.request_timeout)
        .wrap_err("Failed to build HTTP client")?;

    let mode = run_mode(
        args.once,
        args.no_input,
        io::stdin().is_terminal(),
        config.interval_secs()?,
    );
    let categories = config.categories();
    info!(
        "Watching {} nodes, categories: {}",
        registry.len(),
        categories.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(", ")
    );

    let aggregator = SnapshotAggregator::new(Arc::new(transport), Arc::new(registry), categories);
    let settings = ConfigFileSettings::new(args.config.clone(), overrides, config);
    let sink: Box<dyn RenderSink> = match args.format {
        OutputFormat::Table => Box::new(TableRenderer::new(io::stdout())),
        OutputFormat::Json => Box::new(JsonRenderer::new(io::stdout())),
    };

    let (handle, driver) = scheduler(Arc::new(aggregator), settings, sink);

    handle.toggle();
    match mode {
        RunMode::Once => {
            handle.shutdown();
            driver.run().await;
        }
        RunMode::Interactive => {
            tokio::join!(driver.run(), read_operator_input(handle));
        }
        RunMode::Detached => {
            tokio::join!(driver.run(), wait_for_interrupt(handle));
        }
    }

    info!("Fleetwatch stopped");
    Ok(())
}

/// Every input line toggles polling; `q` or end of input quits.
async fn read_operator_input(handle: SchedulerHandle) {
    info!("Press Enter to start/stop polling, 'q' to quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) if line.trim() == "q" => break,
            Ok(Some(_)) => {
                if !handle.toggle() {
                    return;
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!("Failed to read operator input: {}", e);
                break;
            }
        }
    }
    handle.shutdown();
}

async fn wait_for_interrupt(handle: SchedulerHandle) {
    info!("Polling without operator input; press Ctrl-C to stop");
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
    }
    handle.shutdown();
}
