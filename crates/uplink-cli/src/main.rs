//! uplink — stage local files as transport-sized upload units.
//!
//! Set UPLINK_MAX_OBJECT_SIZE_MB, UPLINK_CAPTION_TEMPLATE and friends
//! in the environment (or a .env file); flags override env.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use uplink_cli::init_tracing;
use uplink_core::{ThumbnailMode, UploadConfig};
use uplink_pipeline::{filter_existing, SizeRule, Traversal, UploadPipeline};
use uplink_transport::{LocalSpool, Transport};

#[derive(Parser)]
#[command(name = "uplink", about = "Stage files as transport-sized upload units")]
struct Cli {
    /// Files or directories to process
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Directory where staged units are written
    #[arg(long, default_value = "uplink-out")]
    output: PathBuf,

    /// Maximum single-object size in bytes (overrides env)
    #[arg(long)]
    max_size: Option<u64>,

    /// Caption template; placeholders: {path} {dir} {name} {stem} {ext} {now}
    #[arg(long)]
    caption: Option<String>,

    /// Explicit thumbnail image attached to every unit
    #[arg(long)]
    thumbnail: Option<PathBuf>,

    /// Never attach thumbnails
    #[arg(long, conflicts_with = "thumbnail")]
    no_thumbnail: bool,

    /// Send media as plain documents (no media attributes or thumbnails)
    #[arg(long)]
    force_document: bool,

    /// How to handle directory inputs
    #[arg(long, value_enum, default_value_t = DirectoryMode::Fail)]
    directories: DirectoryMode,

    /// How to handle files larger than the maximum object size
    #[arg(long, value_enum, default_value_t = LargeFileMode::Fail)]
    large_files: LargeFileMode,
}

#[derive(Clone, Copy, ValueEnum)]
enum DirectoryMode {
    /// Fail on any directory input
    Fail,
    /// Walk directories recursively
    Recursive,
}

#[derive(Clone, Copy, ValueEnum)]
enum LargeFileMode {
    /// Fail on oversized files
    Fail,
    /// Split oversized files into parts
    Split,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = UploadConfig::from_env().context("loading configuration")?;
    if let Some(max_size) = cli.max_size {
        config.max_object_size = max_size;
    }
    if let Some(template) = cli.caption {
        config.caption_template = Some(template);
    }
    if let Some(thumb) = cli.thumbnail {
        config.thumbnail = ThumbnailMode::Explicit(thumb);
    } else if cli.no_thumbnail {
        config.thumbnail = ThumbnailMode::Disabled;
    }
    if cli.force_document {
        config.force_document = true;
    }
    config.validate().context("invalid configuration")?;

    let traversal = match cli.directories {
        DirectoryMode::Fail => Traversal::FilesOnly,
        DirectoryMode::Recursive => Traversal::Recursive,
    };
    let size_rule = match cli.large_files {
        LargeFileMode::Fail => SizeRule::Reject,
        LargeFileMode::Split => SizeRule::Split,
    };

    let paths = filter_existing(cli.paths);
    if paths.is_empty() {
        anyhow::bail!("no valid input paths");
    }

    let spool = LocalSpool::new(&cli.output, config.max_object_size).await?;
    // The transport is authoritative for the object-size ceiling the
    // size policy works against.
    config.max_object_size = spool.max_object_size();
    let mut pipeline = UploadPipeline::new(paths, config, traversal, size_rule);

    let mut staged = 0usize;
    let mut failures = 0usize;
    loop {
        match pipeline.next_unit().await {
            Ok(Some(unit)) => {
                let name = unit.name().to_string();
                let (meta, payload) = unit.into_payload();
                match spool.send(meta, payload).await {
                    Ok(location) => {
                        tracing::info!(unit = %name, location = %location, "unit staged");
                        staged += 1;
                    }
                    Err(e) => {
                        tracing::error!(unit = %name, error = %e, "failed to stage unit");
                        failures += 1;
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                // The failure is scoped to one input; keep going with
                // the rest of the batch.
                tracing::error!("{e}");
                failures += 1;
            }
        }
    }

    tracing::info!(staged, failures, "run complete");
    if failures > 0 {
        std::process::exit(1);
    }
    Ok(())
}
