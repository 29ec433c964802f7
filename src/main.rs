use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use windowgate::config::{LoggingConfig, WindowgateConfig, DEFAULT_BOUNDARY};
use windowgate::error::WindowgateError;
use windowgate::ratelimit::{
    Clock, GuardedCaller, LimiterRegistry, ManualClock, Millis, SystemClock,
};

#[derive(Parser, Debug)]
#[command(name = "windowgate", version, about = "Sliding-window admission control")]
struct Cli {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Override the configured log level
    #[arg(long)]
    log_level: Option<String>,

    /// Emit JSON-formatted logs
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay request attempts at the given instants (milliseconds)
    Check {
        #[arg(short, long, default_value = DEFAULT_BOUNDARY)]
        boundary: String,

        #[arg(long, value_delimiter = ',', required = true)]
        at: Vec<Millis>,
    },

    /// Issue guarded calls in real time
    Burst {
        #[arg(short, long, default_value = DEFAULT_BOUNDARY)]
        boundary: String,

        #[arg(long, default_value_t = 20)]
        count: u32,

        #[arg(long, default_value_t = 0)]
        interval_ms: u64,
    },

    /// List configured boundaries
    Limits,
}

/// Outcome of one replayed attempt.
#[derive(Debug, Serialize)]
struct Attempt {
    at: Millis,
    admitted: bool,
    remaining: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => WindowgateConfig::from_file(path)
            .with_context(|| format!("failed to load configuration from {}", path))?,
        None => WindowgateConfig::default(),
    };

    let mut logging = config.logging.clone();
    if let Some(level) = &cli.log_level {
        logging.level = level.clone();
    }
    logging.json |= cli.json_logs;
    init_tracing(&logging);

    info!(version = env!("CARGO_PKG_VERSION"), boundaries = config.limits.len(), "Configuration loaded");

    match cli.command {
        Command::Check { boundary, at } => check(&config, &boundary, &at)?,
        Command::Burst {
            boundary,
            count,
            interval_ms,
        } => burst(&config, &boundary, count, interval_ms).await?,
        Command::Limits => {
            for (name, rule) in &config.limits {
                println!("{}: {} requests / {} ms", name, rule.max_requests, rule.window_ms);
            }
        }
    }

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Replay attempts on a manual clock so the timeline is exact.
fn check(config: &WindowgateConfig, boundary: &str, at: &[Millis]) -> anyhow::Result<()> {
    let clock = Arc::new(ManualClock::new(0));
    let registry = LimiterRegistry::from_config(config, clock.clone())?;
    let limiter = registry
        .get(boundary)
        .ok_or_else(|| WindowgateError::Config(format!("unknown boundary '{}'", boundary)))?;

    for &now in at {
        clock.set(now);
        let admitted = limiter.try_acquire();
        let attempt = Attempt {
            at: now,
            admitted,
            remaining: limiter.remaining_capacity(),
        };
        println!("{}", serde_json::to_string(&attempt)?);
    }

    Ok(())
}

/// Fire guarded calls on the system clock and report the totals.
async fn burst(
    config: &WindowgateConfig,
    boundary: &str,
    count: u32,
    interval_ms: u64,
) -> anyhow::Result<()> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let registry = LimiterRegistry::from_config(config, clock)?;
    let limiter = registry
        .get(boundary)
        .ok_or_else(|| WindowgateError::Config(format!("unknown boundary '{}'", boundary)))?;
    let caller = GuardedCaller::new(boundary, limiter);

    let mut admitted = 0u32;
    let mut denied = 0u32;

    for i in 0..count {
        match caller.call(|| async move { i }).await {
            Ok(_) => admitted += 1,
            Err(WindowgateError::RateLimitExceeded { .. }) => denied += 1,
            Err(e) => return Err(e.into()),
        }

        if interval_ms > 0 && i + 1 < count {
            tokio::time::sleep(Duration::from_millis(interval_ms)).await;
        }
    }

    if denied > 0 {
        warn!(boundary, denied, "Some calls were rejected");
    }
    info!(boundary, admitted, denied, remaining = caller.remaining_capacity(), "Burst finished");
    println!("admitted={} denied={}", admitted, denied);

    Ok(())
}
