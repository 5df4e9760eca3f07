//! RavenQ CLI - delivery entrypoints for captured event envelopes
//!
//! `relay` performs a single deferred delivery (invoked by the queue
//! consumer); `worker` consumes a stream of job bodies from stdin.

mod commands;

use clap::{Parser, Subcommand};
use commands::{RelayCommand, WorkerCommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RAVENQ_LOG_LEVEL", global = true)]
    log_level: String,

    /// Log format: compact, full
    #[arg(
        long,
        default_value = "compact",
        env = "RAVENQ_LOG_FORMAT",
        global = true
    )]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deliver one captured envelope to the tracking backend
    Relay(RelayCommand),
    /// Consume newline-delimited job bodies from stdin and deliver them
    Worker(WorkerCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // If RUST_LOG is set, use it directly; otherwise use our default
    // filter with all ravenq crates at the requested level and noisy
    // dependencies at warn.
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .expect("Invalid RUST_LOG environment variable")
    } else {
        tracing_subscriber::EnvFilter::new(format!(
            "ravenq_cli={level},\
             ravenq_core={level},\
             ravenq_capture={level},\
             ravenq_queue={level},\
             ravenq_relay={level},\
             reqwest=warn,\
             hyper=warn,\
             rustls=warn",
            level = cli.log_level
        ))
    };

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    match cli.log_format.as_str() {
        "full" => subscriber.with_target(true).init(),
        _ => subscriber.compact().with_target(false).init(),
    }

    let exit_code = match cli.command {
        Commands::Relay(cmd) => cmd.execute().await?,
        Commands::Worker(cmd) => cmd.execute().await?,
    };

    std::process::exit(exit_code);
}
