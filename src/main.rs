use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;

#[derive(Parser)]
#[command(name = "drill")]
#[command(version, about = "Scripted network-fault-recovery walkthrough player")]
pub struct Cli {
    /// Enable debug-level tracing on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Play the scripted walkthrough
    Run {
        /// Task description to submit (defaults to the configured task)
        #[arg(short, long)]
        task: Option<String>,

        /// Multiplier for stage delays and reveal intervals
        /// (0.1 plays at 10x speed)
        #[arg(long)]
        speed: Option<f64>,

        /// Auto-approve the confirmation gate
        #[arg(long)]
        yes: bool,

        /// Stage table override (JSON, see `drill export`)
        #[arg(long)]
        stages: Option<PathBuf>,
    },
    /// Print the stage table
    List {
        /// Stage table override (JSON)
        #[arg(long)]
        stages: Option<PathBuf>,
    },
    /// Write the built-in stage table as JSON
    Export {
        /// Destination path
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            task,
            speed,
            yes,
            stages,
        } => cmd::run_walkthrough(task, speed, yes, stages).await,
        Commands::List { stages } => cmd::cmd_list(stages.as_deref()),
        Commands::Export { path } => cmd::cmd_export(&path),
    }
}

/// Tracing goes to stderr so the walkthrough output on stdout stays
/// clean.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_filter = if verbose { "drill=debug" } else { "drill=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
