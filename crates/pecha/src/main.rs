mod cli;
mod interrupt;

use anyhow::Context;
use clap::Parser;
use cli::{Args, Command, ScrapeArgs};
use pecha_engine::analyze::{analyze_dataset, format_dataset_report};
use pecha_engine::backend::PageFetcher;
use pecha_engine::config::loader::validate;
use pecha_engine::config::{ConfigLoader, ImageFormat};
use pecha_engine::formatter::format_summary;
use pecha_engine::orchestrator::{FetchOrchestrator, run_session};
use pecha_engine::resolver::resolve;
use pecha_engine::store::ArtifactStore;
use pecha_h::backend::HeadlessFetcher;
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the banner and the summary.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match args.command {
        Command::Scrape(scrape) => run_scrape(scrape).await,
        Command::Analyze { dir } => run_analyze(&dir),
    }
}

async fn run_scrape(args: ScrapeArgs) -> anyhow::Result<()> {
    let mut config = ConfigLoader::load(args.config.as_deref())
        .await
        .context("Failed to load configuration")?;
    args.apply(&mut config);
    validate(&config)?;

    let pages = resolve(&args.selection()).context("Invalid page selection")?;

    println!("{}", "=".repeat(60));
    println!("Tibetan canon scraper");
    println!("{}", "=".repeat(60));
    println!("Catalog:  {} / {}", config.site.kdb, config.site.sutra);
    println!("Pages:    {}", pages.len());
    println!("Output:   {}", config.output.directory.display());
    match config.output.image_format {
        ImageFormat::Png => println!("Format:   png"),
        ImageFormat::Jpeg => println!("Format:   jpeg (quality {})", config.output.jpeg_quality),
    }
    println!("{}", "=".repeat(60));

    let store = ArtifactStore::create(&config.output.directory)
        .await
        .context("Failed to create output directories")?;

    let mut orchestrator = FetchOrchestrator::new().with_page_delay(config.run.page_delay());
    let token = orchestrator.cancellation_token();
    tokio::spawn(async move {
        if interrupt::watch(move || token.cancel(), tokio::signal::ctrl_c).await {
            std::process::exit(interrupt::FORCED_EXIT_CODE);
        }
    });

    let mut fetcher: Box<dyn PageFetcher> = Box::new(HeadlessFetcher::new_with_visibility(
        config.clone(),
        store.clone(),
        args.no_headless,
    ));

    let report = run_session(&mut *fetcher, &mut orchestrator, &pages)
        .await
        .context("Failed to start the browser")?;

    store
        .write_metadata(&report)
        .await
        .context("Failed to write metadata")?;

    println!("\n{}", format_summary(&report));
    println!("Images:   {}", store.images_dir().display());
    println!("Texts:    {}", store.texts_dir().display());
    println!("HTML:     {}", store.raw_dir().display());
    println!("Metadata: {}", store.metadata_file().display());

    Ok(())
}

fn run_analyze(dir: &Path) -> anyhow::Result<()> {
    let report = analyze_dataset(dir)?;
    println!("{}", format_dataset_report(&report));
    Ok(())
}
