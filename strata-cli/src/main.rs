use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "strata")]
#[command(about = "Dependency-ordered stack lifecycle orchestration", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Destroy stacks in reverse dependency order
    Destroy {
        /// Stacks to destroy (default: all in the configuration)
        stacks: Vec<String>,

        /// Path to the configuration file
        #[arg(short, long, env = "STRATA_CONFIG", default_value = "strata.yaml")]
        config: String,

        /// Actually destroy; without this only the plan outline is printed
        #[arg(short, long)]
        force: bool,

        /// Maximum number of stacks destroyed concurrently (0 = unbounded)
        #[arg(short = 'j', long, default_value = "0")]
        concurrency: usize,

        /// Log the remote status of each stack on every poll
        #[arg(long)]
        tail: bool,

        /// Override the provider named in the configuration
        #[arg(long)]
        provider: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Destroy { stacks, config, force, concurrency, tail, provider } => {
            commands::destroy(&config, stacks, force, concurrency, tail, provider.as_deref())
                .await?;
        }
    }

    Ok(())
}
