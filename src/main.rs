use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use log::{debug, error, info, warn, LevelFilter};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ads_txt_validator_rs::prelude::*;
use ads_txt_validator_rs::reporting::summarize;

#[derive(Parser)]
#[command(name = "ads_txt_validator_rs")]
#[command(about = "ads.txt validator with sellers.json cross-checking", long_about = None)]
struct Cli {
    /// ads.txt file, or directory containing ads.txt files
    target: PathBuf,

    /// Scan directories recursively
    #[arg(short, long)]
    recursive: bool,

    /// Publisher domain the ads.txt belongs to (enables the sellers.json cross-check)
    #[arg(short, long)]
    publisher_domain: Option<String>,

    /// Directory of sellers.json files (<domain>.json or <domain>/sellers.json)
    #[arg(short, long)]
    sellers_dir: Option<PathBuf>,

    /// Load whole sellers.json files instead of batched seller id lookups
    #[arg(long)]
    legacy_fetch: bool,

    /// Previously published ads.txt, used to flag already-implemented entries
    #[arg(long)]
    cached: Option<PathBuf>,

    /// Message language (en, ja)
    #[arg(long, default_value = "en")]
    locale: Locale,

    /// Base URL for per-message help links
    #[arg(long)]
    help_url: Option<String>,

    /// Output report filename
    #[arg(short, long, default_value = "ads_txt_report.txt")]
    output: PathBuf,

    /// Write the report as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Write optimized copies of each ads.txt into this directory
    #[arg(long)]
    optimize_dir: Option<PathBuf>,

    /// Number of parallel worker threads (default: number of CPUs)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Run in batch mode (no progress bar)
    #[arg(long)]
    batch: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    // Set up graceful shutdown handler
    let shutdown_requested = Arc::new(AtomicBool::new(false));
    let shutdown_flag = shutdown_requested.clone();

    ctrlc::set_handler(move || {
        eprintln!("\n⚠️  Shutdown requested. Finishing current files...");
        shutdown_flag.store(true, Ordering::SeqCst);
    })
    .context("Error setting Ctrl-C handler")?;

    // Set up rayon thread pool
    if let Some(workers) = cli.workers {
        rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build_global()
            .context("Failed to build thread pool")?;
    }

    let files = if cli.target.is_dir() {
        collect_ads_txt_files(&cli.target, cli.recursive)?
    } else {
        vec![cli.target.clone()]
    };

    if files.is_empty() {
        println!("No ads.txt files found in {}", cli.target.display());
        return Ok(());
    }

    let cached = cli
        .cached
        .as_ref()
        .map(|path| {
            fs::read_to_string(path)
                .with_context(|| format!("Failed to read cached ads.txt {}", path.display()))
        })
        .transpose()?;

    let sellers = cli
        .sellers_dir
        .as_deref()
        .map(LocalSellersDirectory::open)
        .transpose()?;

    if let Some(directory) = &sellers {
        let domains = directory.domains();
        info!("sellers.json available for {} domain(s)", domains.len());
        debug!("sellers.json domains: {}", domains.join(", "));
    }

    let access = sellers.as_ref().map(|directory| {
        if cli.legacy_fetch {
            SellerAccess::Legacy(directory)
        } else {
            SellerAccess::Batch(directory)
        }
    });

    let publisher_domain = cli.publisher_domain.as_deref();
    if publisher_domain.is_some() && access.is_none() {
        warn!("--publisher-domain given without --sellers-dir; sellers.json cross-check skipped");
    }

    println!("ads.txt Validator (Rust Edition)");
    println!("Using {} worker thread(s)", rayon::current_num_threads());
    println!("Found {} ads.txt file(s) to validate\n", files.len());

    // Set up progress bar (skip in batch mode)
    let progress = if cli.batch {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .context("Invalid progress bar template")?
                .progress_chars("#>-"),
        );
        pb
    };

    let shutdown_check = shutdown_requested.clone();
    let reports: Vec<FileReport> = files
        .par_iter()
        .progress_with(progress.clone())
        .filter_map(|path| {
            // Check if shutdown was requested
            if shutdown_check.load(Ordering::SeqCst) {
                return None;
            }

            match validate_file(path, publisher_domain, cached.as_deref(), access) {
                Ok(report) => Some(report),
                Err(e) => {
                    error!("{:#}", e);
                    None
                }
            }
        })
        .collect();

    let was_interrupted = shutdown_requested.load(Ordering::SeqCst);
    if !cli.batch {
        if was_interrupted {
            progress.finish_and_clear();
            eprintln!("\n⏹️  Graceful shutdown complete");
            eprintln!("📊 Processed {}/{} files", reports.len(), files.len());
        } else {
            progress.finish_with_message("Validation complete!");
        }
        println!();
    }

    if let Some(dir) = &cli.optimize_dir {
        write_optimized(dir, &cli.target, &reports)?;
    }

    let mut invalid_count = 0;
    let mut warning_count = 0;
    for report in &reports {
        let summary = summarize(&report.entries);
        invalid_count += summary.invalid;
        warning_count += summary.with_warnings;
    }

    // Print summary
    println!("==================================================");
    println!("VALIDATION COMPLETE");
    println!("==================================================");
    println!("Files validated: {}", reports.len());
    println!("Invalid records: {}", invalid_count);
    println!("Records with warnings: {}", warning_count);
    println!();

    let messages = match &cli.help_url {
        Some(url) => MessageProvider::new(cli.locale).with_help_base_url(url.clone()),
        None => MessageProvider::new(cli.locale),
    };

    if cli.json {
        write_json_report(&cli.output, &reports)?;
    } else {
        write_report(&cli.output, &reports, &messages)?;
    }
    println!("Detailed report saved to: {:?}", cli.output);

    Ok(())
}

fn init_logger(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    if let Err(e) = builder.try_init() {
        eprintln!("⚠️  Warning: Failed to initialize logger: {}", e);
    }
}

fn validate_file(
    path: &Path,
    publisher_domain: Option<&str>,
    cached: Option<&str>,
    access: Option<SellerAccess<'_>>,
) -> Result<FileReport> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let (entries, checked_domain) = match access {
        Some(access) => (
            validate_ads_txt(&content, publisher_domain, cached, access),
            publisher_domain.map(str::to_string),
        ),
        None => (parse_ads_txt_content(&content), None),
    };

    Ok(FileReport {
        path: path.to_path_buf(),
        publisher_domain: checked_domain,
        entries,
    })
}

/// Mirror each validated file into `dir` in optimized form
fn write_optimized(dir: &Path, target: &Path, reports: &[FileReport]) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    for report in reports {
        let relative = match report.path.strip_prefix(target) {
            Ok(rel) if !rel.as_os_str().is_empty() => rel.to_path_buf(),
            _ => PathBuf::from(report.path.file_name().unwrap_or_default()),
        };
        let destination = dir.join(relative);
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = fs::read_to_string(&report.path)
            .with_context(|| format!("Failed to read {}", report.path.display()))?;
        fs::write(&destination, optimize_ads_txt(&content))
            .with_context(|| format!("Failed to write {}", destination.display()))?;
    }

    println!("Optimized files written to: {}", dir.display());
    Ok(())
}
