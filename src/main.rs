//! Catalog-Harvest main entry point
//!
//! This is the command-line interface for the catalog crawl-and-reconcile cycle.

use anyhow::Context;
use catalog_harvest::config::{load_config_with_hash, Config};
use catalog_harvest::output::{generate_markdown_summary, generate_summary, print_report};
use catalog_harvest::run_cycle;
use catalog_harvest::storage::{ProductStore, SqliteStorage};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Catalog-Harvest: crawl a retail catalog and reconcile it into a local store
///
/// Each cycle walks the category tree, enriches every listed product,
/// translates only products the store has not seen before, and reports
/// per-field coverage of the batch and of the whole store.
#[derive(Parser, Debug)]
#[command(name = "catalog-harvest")]
#[command(version)]
#[command(about = "Crawl-and-reconcile pipeline for retail product catalogs", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Stop after this many products (overrides `max-products`)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    max_products: Option<u64>,

    /// Enrich products one at a time
    #[arg(long, conflicts_with = "concurrent")]
    sequential: bool,

    /// Enrich products on the bounded task pool
    #[arg(long, conflicts_with = "sequential")]
    concurrent: bool,

    /// Keep running cycles; wait out the cooldown after a failed one
    #[arg(long, conflicts_with_all = ["dry_run", "stats", "export_summary"])]
    watch: bool,

    /// Seconds to wait after a failed cycle in watch mode
    #[arg(long, default_value_t = 3600, value_name = "SECS")]
    cooldown_secs: u64,

    /// Validate config and show the crawl plan without crawling
    #[arg(long, conflicts_with_all = ["stats", "export_summary"])]
    dry_run: bool,

    /// Show store coverage and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_summary"])]
    stats: bool,

    /// Generate markdown summary of the latest cycle and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    export_summary: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    apply_overrides(&mut config, &cli);

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.export_summary {
        handle_export_summary(&config)?;
    } else if cli.watch {
        handle_watch(&config, &config_hash, Duration::from_secs(cli.cooldown_secs)).await;
    } else {
        handle_cycle(&config, &config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("catalog_harvest=info,warn"),
            1 => EnvFilter::new("catalog_harvest=debug,info"),
            2 => EnvFilter::new("catalog_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(cap) = cli.max_products {
        config.crawler.max_products = Some(usize::try_from(cap).unwrap_or(usize::MAX));
    }
    if cli.sequential {
        config.crawler.concurrent = false;
    } else if cli.concurrent {
        config.crawler.concurrent = true;
    }
}

/// Handles the --dry-run mode: validates config and shows the crawl plan
fn handle_dry_run(config: &Config) {
    println!("=== Catalog-Harvest Dry Run ===\n");

    println!("Source:");
    println!("  Category menu: {}", config.source.category_menu_url);
    println!("  Listing endpoint: {}", config.source.listing_url);
    for (key, value) in &config.source.listing_params {
        println!("    {} = {}", key, value);
    }
    println!("  Category tags: {}", config.source.category_tags_url);
    println!("  Locale: {}", config.source.locale_path);
    println!("  Market locale: {}", config.market.locale_path);

    println!("\nCrawler Configuration:");
    println!("  Page size: {}", config.crawler.page_size);
    if config.crawler.concurrent {
        println!(
            "  Mode: concurrent (up to {} enrichments)",
            config.crawler.max_concurrent_enrichments
        );
    } else {
        println!("  Mode: sequential");
    }
    match config.crawler.max_products {
        Some(cap) => println!("  Product cap: {}", cap),
        None => println!("  Product cap: none"),
    }
    println!("  Fulfillment store: {}", config.crawler.fulfillment_store);
    println!(
        "  Excluded subcategories ({}):",
        config.crawler.excluded_subcategories.len()
    );
    for name in &config.crawler.excluded_subcategories {
        println!("    - {}", name);
    }

    println!("\nRetry:");
    println!("  Max retries: {}", config.retry.max_retries);
    println!("  Backoff base: {}ms", config.retry.backoff_base_ms);
    println!(
        "  Timeouts: lookup {}ms, listing {}ms",
        config.timeouts.lookup_ms, config.timeouts.listing_ms
    );

    println!("\nTranslation:");
    println!("  Site: {}", config.translation.base_url);
    println!("  Locales: {}", config.translation.locales.join(", "));

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Summary: {}", config.output.summary_path);

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows coverage of the whole store
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))
        .context("Failed to open database")?;
    let records = storage.all().context("Failed to read products")?;

    let report = catalog_harvest::CoverageReport::compute(&records, &config.translation.locales);
    print_report("Store coverage", &report);

    Ok(())
}

/// Handles the --export-summary mode: generates markdown summary
fn handle_export_summary(config: &Config) -> anyhow::Result<()> {
    println!("=== Exporting Cycle Summary ===\n");
    println!("Database: {}", config.output.database_path);
    println!("Output: {}", config.output.summary_path);
    println!();

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))
        .context("Failed to open database")?;

    tracing::info!("Loading cycle data from database...");
    let summary = generate_summary(&storage, &config.translation.locales)?;

    tracing::info!("Generating markdown summary...");
    generate_markdown_summary(&summary, Path::new(&config.output.summary_path))
        .context("Failed to write summary")?;

    println!("✓ Summary exported to: {}", config.output.summary_path);

    Ok(())
}

/// Runs a single cycle and prints its reports
async fn handle_cycle(config: &Config, config_hash: &str) -> anyhow::Result<()> {
    let outcome = run_cycle(config, config_hash)
        .await
        .context("Crawl cycle failed")?;

    print_report("Crawl batch", &outcome.crawl_report);
    print_report("Store", &outcome.database_report);

    if outcome.diff_degraded {
        println!("! Store diff failed; no products were translated this cycle");
    }
    println!(
        "✓ Run {} finished ({}): {} products, {} new, {} written",
        outcome.run_id,
        outcome.phase,
        outcome.records.len(),
        outcome.new,
        outcome.written
    );

    Ok(())
}

/// Runs cycles forever, sleeping for `cooldown` after a failed one
async fn handle_watch(config: &Config, config_hash: &str, cooldown: Duration) {
    loop {
        if let Err(e) = handle_cycle(config, config_hash).await {
            tracing::error!(
                error = %format!("{:#}", e),
                cooldown_secs = cooldown.as_secs(),
                "Cycle failed, cooling down"
            );
            tokio::time::sleep(cooldown).await;
        }
    }
}
