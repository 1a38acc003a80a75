//! Main CLI parser and global options.
//!
//! Every option can also come from the environment (or a `.env` file loaded
//! before parsing). A flag on the command line always wins.

use clap::{Parser, ValueEnum};

use clug_core::retrieval::DEFAULT_ROOT_PREFIX;
use clug_core::{HierarchyLayout, RetrievalOptions, WorkerCount};
use clug_s3::{DEFAULT_BUCKET, DEFAULT_REGION, S3StoreConfig};

use crate::commands::Commands;

/// Data source to download from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Source {
    /// NOAA Open Data Dissemination buckets
    #[default]
    Nodd,
}

impl Source {
    /// Bucket used when `--bucket` is not given.
    pub const fn default_bucket(self) -> &'static str {
        match self {
            Self::Nodd => DEFAULT_BUCKET,
        }
    }
}

/// Download NOAA survey data from public cloud buckets.
#[derive(Debug, Parser)]
#[command(name = "clug")]
#[command(about = "Download NOAA survey data from public cloud buckets")]
#[command(version)]
pub struct Cli {
    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// Parallel downloads (clamped to 1..=100)
    #[arg(
        short = 'p',
        long = "parallel",
        env = "CLUG_PARALLEL",
        default_value_t = 3,
        allow_negative_numbers = true,
        global = true
    )]
    pub parallel: i64,

    /// Check free disk space before downloading
    #[arg(short = 'c', long = "check", env = "CLUG_CHECK", global = true)]
    pub check: bool,

    /// List what would be downloaded without fetching anything
    #[arg(long = "dry-run", visible_alias = "try", env = "CLUG_DRY_RUN", global = true)]
    pub dry_run: bool,

    /// Data source
    #[arg(short = 's', long = "source", value_enum, default_value_t = Source::Nodd, global = true)]
    pub source: Source,

    /// Print progress events as JSON lines
    #[arg(long = "json", global = true)]
    pub json: bool,

    /// Override the source bucket
    #[arg(long = "bucket", env = "CLUG_BUCKET", global = true)]
    pub bucket: Option<String>,

    /// Bucket region
    #[arg(long = "region", env = "CLUG_REGION", default_value = DEFAULT_REGION, global = true)]
    pub region: String,

    /// Custom S3-compatible endpoint (mirrors, local test servers)
    #[arg(long = "endpoint-url", env = "CLUG_ENDPOINT_URL", global = true)]
    pub endpoint_url: Option<String>,

    /// Key prefix the survey search starts from
    #[arg(long = "root-prefix", env = "CLUG_ROOT_PREFIX", default_value = DEFAULT_ROOT_PREFIX, global = true)]
    pub root_prefix: String,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Worker count after clamping.
    pub fn workers(&self) -> WorkerCount {
        WorkerCount::new(self.parallel)
    }

    /// Pipeline options from the global flags.
    pub fn retrieval_options(&self) -> RetrievalOptions {
        let mut root_prefix = self.root_prefix.clone();
        if !root_prefix.is_empty() && !root_prefix.ends_with('/') {
            root_prefix.push('/');
        }
        RetrievalOptions {
            check_disk: self.check,
            dry_run: self.dry_run,
            layout: HierarchyLayout {
                root_prefix,
                ..HierarchyLayout::default()
            },
        }
    }

    /// S3 adapter configuration from the global flags.
    pub fn store_config(&self) -> S3StoreConfig {
        let bucket = self
            .bucket
            .clone()
            .unwrap_or_else(|| self.source.default_bucket().to_string());
        S3StoreConfig::new()
            .with_bucket(bucket)
            .with_region(self.region.clone())
            .with_optional_endpoint_url(self.endpoint_url.clone())
    }
}
