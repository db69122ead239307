///
/// This module implements the CLI interface for site-bucket: command parsing,
/// argument validation, the async entrypoint, and user-visible output.
///
/// All provisioning and synchronisation logic lives in the [`site-bucket-core`] crate.
/// This module is strictly CLI glue: it builds the [`Session`], picks the
/// command, and prints results.
///
/// ## How To Use
/// - For command-line users: use the installed `site-bucket` binary with `--help`.
/// - For programmatic/integration use: call [`run`] with a constructed [`Cli`],
///   or [`execute`] with any [`StorageService`] implementation.
///
/// [`site-bucket-core`]: ../../site-bucket-core/
use crate::load_config::{load_optional_config, CliConfig};
use crate::session::{Session, SessionOptions};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use site_bucket_core::contract::{Bucket, StorageService};
use site_bucket_core::{provision, synchronise};
use std::io::Write;
use std::path::PathBuf;

/// CLI for site-bucket: deploy static websites to S3.
#[derive(Debug, Parser)]
#[clap(
    name = "site-bucket",
    version,
    about = "Provision S3 buckets for static website hosting and sync local directories into them"
)]
pub struct Cli {
    /// Use a given AWS profile
    #[clap(long, global = true, env = "SITE_BUCKET_PROFILE")]
    pub profile: Option<String>,

    /// Path to an optional YAML config file
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List all buckets
    ListBuckets,
    /// List objects in a bucket
    ListBucketObjects {
        bucket: String,
    },
    /// Create and configure a bucket for website hosting
    SetupBucket {
        bucket: String,
    },
    /// Sync contents of PATHNAME to BUCKET
    Sync {
        pathname: PathBuf,
        bucket: String,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::ListBuckets => "list-buckets",
            Commands::ListBucketObjects { .. } => "list-bucket-objects",
            Commands::SetupBucket { .. } => "setup-bucket",
            Commands::Sync { .. } => "sync",
        }
    }
}

/// Runs one command against `storage`, writing user-facing output to `out`.
///
/// `region` is where new buckets are created; `None` lets the service decide.
pub async fn execute<S, W>(
    command: &Commands,
    storage: &S,
    region: Option<&str>,
    config: &CliConfig,
    out: &mut W,
) -> Result<()>
where
    S: StorageService + ?Sized,
    W: Write,
{
    match command {
        Commands::ListBuckets => {
            for name in storage.list_buckets().await? {
                writeln!(out, "{name}")?;
            }
        }
        Commands::ListBucketObjects { bucket } => {
            for key in storage.list_objects(bucket).await? {
                writeln!(out, "{key}")?;
            }
        }
        Commands::SetupBucket { bucket } => {
            let bucket = provision::setup_bucket(storage, bucket, region, &config.website)
                .await
                .with_context(|| format!("Failed to set up bucket {bucket}"))?;
            writeln!(out, "Bucket {} is ready for website hosting", bucket.name)?;
        }
        Commands::Sync { pathname, bucket } => {
            let mut write_err = None;
            synchronise::sync(storage, pathname, bucket, |uploaded| {
                if write_err.is_none() {
                    if let Err(e) = writeln!(
                        out,
                        "Path: {}\n Key: {}",
                        uploaded.path.display(),
                        uploaded.key
                    ) {
                        write_err = Some(e);
                    }
                }
            })
            .await
            .with_context(|| format!("Failed to sync {} to {bucket}", pathname.display()))?;
            if let Some(e) = write_err {
                return Err(e.into());
            }

            let url = provision::website_url(storage, &Bucket::new(bucket.as_str())).await?;
            writeln!(out, "{url}")?;
        }
    }
    Ok(())
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    let config = load_optional_config(cli.config.as_ref())?;

    // The sync root is checked before any session or remote call is made.
    if let Commands::Sync { pathname, .. } = &cli.command {
        synchronise::resolve_root(pathname)
            .with_context(|| format!("Invalid value for PATHNAME: {}", pathname.display()))?;
    }

    let options = SessionOptions::resolve(cli.profile, &config);
    let session = Session::connect(&options).await;

    let command = cli.command.name();
    tracing::info!(command, "Running command");

    let stdout = std::io::stdout();
    let result = execute(
        &cli.command,
        session.storage(),
        session.region(),
        &config,
        &mut stdout.lock(),
    )
    .await;

    match &result {
        Ok(()) => tracing::info!(command, "Command complete"),
        Err(e) => tracing::error!(command, error = %e, "Command failed"),
    }
    result
}
