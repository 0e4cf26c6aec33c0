mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use commands::{ImportArgs, MigrateDirection};

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild a video from a snapshot directory
    Import {
        /// Project directory holding the document and its assets
        #[clap(short, long)]
        root: PathBuf,
        /// Snapshot document, defaults to the configured file under the root
        #[clap(long)]
        document: Option<PathBuf>,
        /// Name for the imported video instead of the document's
        #[clap(short, long)]
        name: Option<String>,
        #[clap(short, long, default_value = "vidsnap.db")]
        database: String,
        #[clap(long)]
        batch_size: Option<usize>,
        #[clap(long)]
        region_batch_size: Option<usize>,
    },
    /// Write a video's snapshot document
    Export {
        #[clap(short, long)]
        video_id: i32,
        #[clap(short, long)]
        output: PathBuf,
        #[clap(short, long, default_value = "vidsnap.db")]
        database: String,
    },
    /// Finish relocations interrupted by a crash
    Relocate {
        #[clap(short, long)]
        root: PathBuf,
    },
    Db {
        #[clap(subcommand)]
        command: DbCommands,
    },
}

#[derive(Subcommand, Debug)]
enum DbCommands {
    Init {
        #[clap(short, long, default_value = "vidsnap.db")]
        database: String,
    },
    Migrate {
        #[clap(subcommand)]
        direction: MigrateDirection,
        #[clap(short, long, default_value = "vidsnap.db")]
        database: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    setup_logging(&args.log_level);

    match args.command {
        Commands::Import {
            root,
            document,
            name,
            database,
            batch_size,
            region_batch_size,
        } => {
            commands::import_snapshot(ImportArgs {
                root,
                document,
                name,
                database,
                batch_size,
                region_batch_size,
            })
            .await?;
        }
        Commands::Export {
            video_id,
            output,
            database,
        } => {
            info!("Exporting video {}", video_id);
            commands::export_snapshot(video_id, &output, &database).await?;
        }
        Commands::Relocate { root } => {
            info!("Resuming relocations under {}", root.display());
            commands::resume_relocation(&root)?;
        }
        Commands::Db { command } => match command {
            DbCommands::Init { database } => {
                info!("Initializing database: {}", database);
                commands::migrate_database(&database, MigrateDirection::Up).await?;
            }
            DbCommands::Migrate {
                direction,
                database,
            } => {
                info!("Running database migration: {:?}", direction);
                commands::migrate_database(&database, direction).await?;
            }
        },
    }

    Ok(())
}

fn setup_logging(log_level: &Option<String>) {
    let log_level = match log_level
        .as_ref()
        .map(|level| level.to_lowercase())
        .as_deref()
    {
        Some("trace") => Level::TRACE,
        Some("debug") => Level::DEBUG,
        Some("warn") => Level::WARN,
        Some("error") => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("sqlx=warn,{}", log_level)))
        .without_time()
        .init();
}
