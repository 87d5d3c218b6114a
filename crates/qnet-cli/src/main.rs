//! qnet command-line interface.
//!
//! The entry point for the `qnet` tool: scripted demo scenarios,
//! standalone key-exchange runs, and the HTTP API server.

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{demo, qkd, serve, version};

/// qnet - quantum network simulation and key distribution
#[derive(Parser)]
#[command(name = "qnet")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted end-to-end scenario on a small network
    Demo {
        /// Number of nodes on the ring
        #[arg(short, long, default_value = "4")]
        nodes: u32,

        /// Depolarizing noise on entangled links (0.0-1.0)
        #[arg(long, default_value = "0.05")]
        noise: f64,

        /// RNG seed for a reproducible run
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Run one entanglement-based key exchange and print the stats
    Qkd {
        /// Round budget (one entangled pair per round)
        #[arg(short, long, default_value = "4096")]
        rounds: usize,

        /// Depolarizing noise on the link (0.0-1.0)
        #[arg(long, default_value = "0.05")]
        noise: f64,

        /// Requested key length in bytes
        #[arg(short, long, default_value = "16")]
        key_bytes: usize,

        /// RNG seed for a reproducible run
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Start the HTTP API server
    Serve {
        /// Address to bind (host:port)
        #[arg(short, long, default_value = "127.0.0.1:8000", env = "QNET_BIND")]
        bind: String,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    // Execute command
    let result = match cli.command {
        Commands::Demo { nodes, noise, seed } => demo::execute(nodes, noise, seed),

        Commands::Qkd {
            rounds,
            noise,
            key_bytes,
            seed,
        } => qkd::execute(rounds, noise, key_bytes, seed),

        Commands::Serve { bind } => serve::execute(&bind).await,

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
