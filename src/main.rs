// src/main.rs
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use filing_segmenter::batch;
use filing_segmenter::config::{FilterMode, ParserConfig};
use filing_segmenter::markup::decode_bytes;
use filing_segmenter::utils::{self, html_debug, AppError};
use filing_segmenter::{FilingParser, StorageManager};

/// Command Line Interface for the SEC filing segmenter
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Local 10-K / 10-Q HTML files to parse
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory for extracted content
    #[arg(short, long, default_value = "./output")]
    output_dir: PathBuf,

    /// Keep only tables mentioning financial statement vocabulary
    #[arg(long)]
    financial_only: bool,

    /// Skip orphan tables already attached by the footnote scan
    #[arg(long)]
    dedupe_orphans: bool,

    /// Debug mode - save annotated HTML files for debugging
    #[arg(short, long)]
    debug: bool,

    /// Maximum number of files parsed at once
    #[arg(short, long, default_value_t = batch::DEFAULT_CONCURRENCY)]
    jobs: usize,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments; flags override the environment
    let args = Args::parse();
    tracing::info!("Starting processing for args: {:?}", args);

    let mut config = ParserConfig::from_env()?;
    if args.financial_only {
        config.table_filter = FilterMode::Financial;
    }
    if args.dedupe_orphans {
        config.dedupe_orphan_tables = true;
    }
    tracing::debug!("Parser configuration: {:?}", config);

    // 3. Initialize storage and parser
    let storage = StorageManager::new(&args.output_dir)?;
    tracing::info!("Writing output to {}", storage.base_dir().display());
    let parser = Arc::new(FilingParser::from_config(&config));

    // 4. Annotated copies of the inputs
    if args.debug {
        let debug_dir = storage.debug_dir()?;
        for input in &args.inputs {
            let bytes = match tokio::fs::read(input).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!("Skipping debug HTML for {}: {}", input.display(), e);
                    continue;
                }
            };
            let decoded = decode_bytes(&bytes);
            let path = debug_dir.join(format!("{}_annotated.html", StorageManager::stem_for(input)));
            if let Err(e) = html_debug::create_debug_html(&decoded.text, &path, &html_debug::DEFAULT_DEBUG_PATTERNS) {
                tracing::warn!("Failed to create debug HTML: {}", e);
            }
        }
    }

    // 5. Parse every input
    let results = batch::parse_files(parser, args.inputs.clone(), args.jobs).await;

    let mut success_count = 0;
    let mut failure_count = 0;
    for (path, result) in results {
        let sections = match result {
            Ok(sections) => sections,
            Err(_) => {
                failure_count += 1;
                continue;
            }
        };

        if sections.is_empty() {
            tracing::warn!("No sections extracted from {}", path.display());
        }

        match storage.save_all(&path, &sections) {
            Ok(paths) => {
                success_count += 1;
                for saved in paths {
                    tracing::debug!("Wrote {}", saved.display());
                }
            }
            Err(e) => {
                tracing::error!("Failed to save output for {}: {}", path.display(), e);
                failure_count += 1;
            }
        }
    }

    tracing::info!("Processing finished. Success: {}, Failures: {}", success_count, failure_count);

    if success_count == 0 && failure_count > 0 {
        return Err(AppError::Processing(format!(
            "Failed to process any of {} filings",
            failure_count
        )));
    }

    Ok(())
}
