use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;
use sea_orm_migration::prelude::*;
use tracing::info;
use vidsnap::database::{establish_connection, get_database_url, migrations::Migrator};
use vidsnap::services::{AssetRelocator, ExportService, ImportService};
use vidsnap::SnapshotConfig;

#[derive(Subcommand, Debug)]
pub enum MigrateDirection {
    Up,
    Down,
    Fresh,
}

pub async fn migrate_database(database_path: &str, direction: MigrateDirection) -> Result<()> {
    let database_url = get_database_url(Some(database_path));
    let db = establish_connection(&database_url).await?;

    match direction {
        MigrateDirection::Up => {
            info!("Running migrations up");
            Migrator::up(&db, None).await?;
        }
        MigrateDirection::Down => {
            info!("Running migrations down");
            Migrator::down(&db, None).await?;
        }
        MigrateDirection::Fresh => {
            info!("Running fresh migrations (down then up)");
            Migrator::down(&db, None).await?;
            Migrator::up(&db, None).await?;
        }
    }

    info!("Database migration completed");
    Ok(())
}

pub struct ImportArgs {
    pub root: PathBuf,
    pub document: Option<PathBuf>,
    pub name: Option<String>,
    pub database: String,
    pub batch_size: Option<usize>,
    pub region_batch_size: Option<usize>,
}

pub async fn import_snapshot(args: ImportArgs) -> Result<()> {
    let mut config = SnapshotConfig::from_env();
    if let Some(size) = args.batch_size {
        config = config.with_batch_size(size);
    }
    if let Some(size) = args.region_batch_size {
        config = config.with_region_batch_size(size);
    }

    let database_url = get_database_url(Some(&args.database));
    let db = establish_connection(&database_url).await?;
    Migrator::up(&db, None).await?;

    let document_path = args
        .document
        .unwrap_or_else(|| args.root.join(&config.document_file_name));
    info!("Importing {}", document_path.display());

    let service = ImportService::with_config(db, config);
    let summary = service
        .import_from_file(&document_path, &args.root, args.name.as_deref())
        .await
        .with_context(|| format!("Failed to import {}", document_path.display()))?;

    println!("Imported video {}", summary.video_id);
    println!("{}", serde_json::to_string_pretty(&summary.counts)?);
    println!("Relocated {} asset files", summary.relocated_assets);
    Ok(())
}

pub async fn export_snapshot(video_id: i32, output: &Path, database: &str) -> Result<()> {
    let database_url = get_database_url(Some(database));
    let db = establish_connection(&database_url).await?;

    ExportService::new(db)
        .export_to_file(video_id, output)
        .await
        .with_context(|| format!("Failed to export video {}", video_id))?;

    info!("Wrote snapshot of video {} to {}", video_id, output.display());
    Ok(())
}

pub fn resume_relocation(root: &Path) -> Result<()> {
    let report = AssetRelocator::new(root)
        .resume_pending()
        .with_context(|| format!("Failed to relocate assets under {}", root.display()))?;
    println!(
        "Relocated {} files ({} missing, {} blocked)",
        report.moved, report.missing, report.blocked
    );
    Ok(())
}
