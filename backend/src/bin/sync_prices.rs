//! Refresh catalogue prices from the TCGCSV feed.
//!
//! `--stats` and `--sample` inspect what is stored instead of syncing.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use cap_std::{ambient_authority, fs::Dir};
use clap::Parser;
use mockable::DefaultClock;
use tcg_backend::domain::ports::{PriceCatalogueQuery, PriceSyncCommand};
use tcg_backend::domain::{
    CataloguePriceCoverage, PriceCatalogueService, PriceSampleRequest, PriceSyncReport,
    PriceSyncRequest, PriceSyncService, PricedRecordSample, SetScope, TablePriceCoverage,
};
use tcg_backend::outbound::persistence::{DbPool, DieselPriceCatalogueRepository, PoolConfig};
use tcg_backend::outbound::tcgcsv::TcgcsvHttpSource;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};
use url::Url;

/// `sync-prices` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sync-prices",
    about = "Refresh catalogue price data from TCGCSV",
    version
)]
struct CliArgs {
    /// Only synchronise this set id.
    #[arg(long = "set", value_name = "set-id")]
    set: Option<String>,
    /// Print price coverage of the catalogue and exit.
    #[arg(
        long = "stats",
        conflicts_with_all = ["sample", "set", "dry_run", "force", "unknown_report"]
    )]
    stats: bool,
    /// Print a few priced records, optionally from one set, and exit.
    #[arg(
        long = "sample",
        value_name = "set-id",
        num_args = 0..=1,
        default_missing_value = "",
        conflicts_with_all = ["set", "dry_run", "force", "unknown_report"]
    )]
    sample: Option<String>,
    /// Records per table shown by `--sample`.
    #[arg(long = "sample-limit", value_name = "count", default_value_t = 5)]
    sample_limit: u32,
    /// Perform every read but write nothing.
    #[arg(long = "dry-run")]
    dry_run: bool,
    /// Rewrite prices even when updated within the freshness window.
    #[arg(long = "force")]
    force: bool,
    /// Write unknown product ids as JSON to this path.
    #[arg(long = "unknown-report", value_name = "path")]
    unknown_report: Option<PathBuf>,
    /// Database connection URL. Falls back to `DATABASE_URL` when omitted.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
    /// TCGCSV base URL.
    #[arg(long = "tcgcsv-url", value_name = "url", default_value = "https://tcgcsv.com")]
    tcgcsv_url: Url,
    /// Per-request timeout in seconds.
    #[arg(long = "timeout-secs", value_name = "seconds", default_value_t = 30)]
    timeout_secs: u64,
}

/// What one invocation does.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    Sync(PriceSyncRequest),
    Coverage,
    Sample(PriceSampleRequest),
}

impl CliArgs {
    fn mode(&self) -> Mode {
        if self.stats {
            return Mode::Coverage;
        }
        match self.sample.as_deref() {
            Some(set_id) => Mode::Sample(PriceSampleRequest {
                set_id: Some(set_id.trim())
                    .filter(|id| !id.is_empty())
                    .map(str::to_owned),
                limit: self.sample_limit,
            }),
            None => Mode::Sync(self.request()),
        }
    }

    fn request(&self) -> PriceSyncRequest {
        PriceSyncRequest {
            scope: self
                .set
                .clone()
                .map_or(SetScope::All, SetScope::One),
            dry_run: self.dry_run,
            force: self.force,
        }
    }
}

/// Install the stderr subscriber. Returns `false` when one was already set.
fn init_tracing() -> bool {
    match fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init()
    {
        Ok(()) => true,
        Err(error) => {
            warn!(%error, "tracing init failed");
            false
        }
    }
}

fn main() -> io::Result<()> {
    init_tracing();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;

    let database_url = resolve_database_url(args.database_url.clone())?;
    let pool = DbPool::new(PoolConfig::for_batch_job(database_url))
        .await
        .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;
    let catalogue = Arc::new(DieselPriceCatalogueRepository::new(pool));

    let lines = match args.mode() {
        Mode::Sync(request) => {
            let source =
                TcgcsvHttpSource::new(&args.tcgcsv_url, Duration::from_secs(args.timeout_secs))
                    .map_err(|error| io::Error::other(format!("create TCGCSV client: {error}")))?;
            let command = PriceSyncService::new(Arc::new(source), catalogue, Arc::new(DefaultClock));
            let report = command
                .sync_prices(request)
                .await
                .map_err(|error| io::Error::other(format!("price sync failed: {error}")))?;
            let mut lines = summary_lines(&report);
            if let Some(path) = args.unknown_report.as_deref() {
                write_unknown_report(path, &report)?;
                lines.push(format!("unknown_report={}", path.display()));
            }
            lines
        }
        Mode::Coverage => {
            let query = PriceCatalogueService::new(catalogue, Arc::new(DefaultClock));
            let coverage = query
                .price_coverage()
                .await
                .map_err(|error| io::Error::other(format!("price stats failed: {error}")))?;
            coverage_lines(&coverage)
        }
        Mode::Sample(request) => {
            let query = PriceCatalogueService::new(catalogue, Arc::new(DefaultClock));
            let samples = query
                .sample_prices(&request)
                .await
                .map_err(|error| io::Error::other(format!("price sample failed: {error}")))?;
            sample_lines(&samples)
        }
    };

    let mut stdout = io::stdout().lock();
    for line in lines {
        writeln!(stdout, "{line}")?;
    }
    Ok(())
}

fn summary_lines(report: &PriceSyncReport) -> Vec<String> {
    let totals = &report.totals;
    let mut lines = vec![
        format!("dry_run={}", report.dry_run),
        format!("sets_processed={}", report.sets_processed),
        format!("cards_updated={}", totals.cards_updated),
        format!("cards_skipped={}", totals.cards_skipped),
        format!("products_updated={}", totals.products_updated),
        format!("products_skipped={}", totals.products_skipped),
        format!("unknown_products={}", totals.unknown_products),
        format!("history_rows={}", totals.history_rows),
        format!("errors={}", totals.errors),
    ];
    lines.extend(report.per_set.iter().map(|(set_id, stats)| {
        format!(
            "set={set_id} cards_updated={} products_updated={} skipped={} unknown={} errors={}",
            stats.cards_updated,
            stats.products_updated,
            stats.cards_skipped + stats.products_skipped,
            stats.unknown_products,
            stats.errors
        )
    }));
    lines
}

fn coverage_line(label: &str, coverage: &TablePriceCoverage) -> String {
    format!(
        "{label} total={} with_tcgplayer_id={} ({:.1}%) with_prices={} ({:.1}%) updated_24h={} ({:.1}%)",
        coverage.total,
        coverage.with_tcgplayer_id,
        coverage.percent(coverage.with_tcgplayer_id),
        coverage.with_prices,
        coverage.percent(coverage.with_prices),
        coverage.updated_recently,
        coverage.percent(coverage.updated_recently),
    )
}

fn coverage_lines(coverage: &CataloguePriceCoverage) -> Vec<String> {
    vec![
        coverage_line("cards", &coverage.cards),
        coverage_line("products", &coverage.products),
    ]
}

fn price_or_na(price: Option<f64>) -> String {
    price.map_or_else(|| "n/a".to_owned(), |value| format!("{value:.2}"))
}

fn sample_lines(samples: &[PricedRecordSample]) -> Vec<String> {
    if samples.is_empty() {
        return vec!["no priced records".to_owned()];
    }
    let mut lines = Vec::new();
    for sample in samples {
        let updated = sample
            .price_last_updated
            .map_or_else(|| "never".to_owned(), |at| at.to_rfc3339());
        lines.push(format!(
            "{} {} \"{}\" updated={updated}",
            sample.table, sample.id, sample.name
        ));
        for variant in &sample.variants {
            let name = if variant.sub_type.is_empty() {
                "Unknown"
            } else {
                variant.sub_type.as_str()
            };
            lines.push(format!(
                "  {name}: market={} low={} high={}",
                price_or_na(variant.market_price),
                price_or_na(variant.low_price),
                price_or_na(variant.high_price),
            ));
        }
    }
    lines
}

fn write_unknown_report(path: &Path, report: &PriceSyncReport) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "report path must be a file"))?;
    let directory = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|error| {
        io::Error::other(format!(
            "open report directory '{}': {error}",
            parent.display()
        ))
    })?;
    let json = serde_json::to_vec_pretty(&report.unknown)
        .map_err(|error| io::Error::other(format!("serialise unknown report: {error}")))?;
    directory.write(Path::new(file_name), json).map_err(|error| {
        io::Error::other(format!("write report '{}': {error}", path.display()))
    })
}

fn resolve_database_url(explicit: Option<String>) -> io::Result<String> {
    if let Some(value) = explicit {
        if value.trim().is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "--database-url must not be empty when provided",
            ));
        }
        return Ok(value);
    }

    let from_env = env::var("DATABASE_URL").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "database URL missing: set --database-url or DATABASE_URL",
        )
    })?;
    if from_env.trim().is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "DATABASE_URL must not be empty",
        ));
    }
    Ok(from_env)
}
