use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use videoteca::{commands, config::Config, server};

#[derive(Parser)]
#[command(name = "videoteca", about = "Video library served from a blob store")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the videos API (default)
    Serve,
    /// Upload local videos that are not in the blob store yet
    Upload {
        /// Upload from the compressed directory
        #[arg(long)]
        compressed: bool,
    },
    /// Re-encode local videos with ffmpeg
    Compress,
    /// List the videos in the blob store by category folder
    List,
    /// Delete every video under the prefix
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("videoteca=debug,tower_http=debug")),
        )
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => server::serve(config).await?,
        Commands::Upload { compressed } => {
            let store = commands::require_store(&config)?;
            commands::upload::run(&config, store.as_ref(), compressed).await?;
            println!("\n🎉 Done!");
        }
        Commands::Compress => {
            commands::compress::run(&config).await?;
        }
        Commands::List => {
            let store = commands::require_store(&config)?;
            commands::list::run(&config, store.as_ref()).await?;
        }
        Commands::Clear => {
            let store = commands::require_store(&config)?;
            commands::clear::run(&config, store.as_ref()).await?;
        }
    }

    Ok(())
}
