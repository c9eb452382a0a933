use anyhow::Result;
use clap::{Arg, Command};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

mod config;
mod crop;
mod dedup;
mod error;
mod filter;
mod ocr;
mod processing;
mod sanitize;
mod storage;
mod subtitles;
mod timestamp;
mod video;

use crate::config::Config;
use crate::ocr::TesseractRecognizer;
use crate::processing::BatchProcessor;
use crate::subtitles::OutputFormat;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("subtitle_extractor=info,warn")
        .init();

    let matches = Command::new("Subtitle Extractor (Rust)")
        .version("0.1.0")
        .about("Extract burned-in subtitles from videos using OCR")
        .arg(
            Arg::new("input")
                .value_name("PATH")
                .help("Video file or directory of videos to process")
                .required(true),
        )
        .arg(
            Arg::new("output-dir")
                .short('o')
                .long("output-dir")
                .value_name("DIR")
                .help("Output directory for results")
                .default_value("./output"),
        )
        .arg(
            Arg::new("fps")
                .long("fps")
                .value_name("RATE")
                .help("Frame sampling rate in frames per second")
                .default_value("1.0"),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_name("FORMAT")
                .help("Output format (txt or srt)")
                .default_value("txt"),
        )
        .arg(
            Arg::new("lang")
                .short('l')
                .long("lang")
                .value_name("CODES")
                .help("Comma-separated OCR language codes")
                .default_value("eng,chi_tra,jpn"),
        )
        .arg(
            Arg::new("region-ratio")
                .short('r')
                .long("region-ratio")
                .value_name("RATIO")
                .help("Fraction of frame height (from the bottom) scanned for subtitles")
                .default_value("0.3"),
        )
        .arg(
            Arg::new("no-dedupe")
                .long("no-dedupe")
                .help("Keep near-duplicate subtitles")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dedupe-threshold")
                .long("dedupe-threshold")
                .value_name("SCORE")
                .help("Similarity score above which two texts are duplicates")
                .default_value("0.9"),
        )
        .arg(
            Arg::new("content-labels")
                .long("content-labels")
                .help("Label entries by their sanitized text instead of frame names")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("keep-frames")
                .long("keep-frames")
                .help("Keep the per-video frame workspace after processing")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("skip-existing")
                .long("skip-existing")
                .help("Skip videos whose output already exists")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("workers")
                .short('w')
                .long("workers")
                .value_name("NUM")
                .help("Number of videos processed in parallel"),
        )
        .get_matches();

    let input = PathBuf::from(matches.get_one::<String>("input").unwrap());
    let output_dir = PathBuf::from(matches.get_one::<String>("output-dir").unwrap());

    // Load configuration, then apply command-line overrides
    let mut config = Config::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {}", e);
        Config::default()
    });

    config.extraction.fps = matches.get_one::<String>("fps").unwrap().parse()?;
    config.extraction.region_ratio = matches.get_one::<String>("region-ratio").unwrap().parse()?;
    config.extraction.dedupe = !matches.get_flag("no-dedupe");
    config.extraction.dedupe_threshold = matches
        .get_one::<String>("dedupe-threshold")
        .unwrap()
        .parse()?;
    config.ocr.languages = matches
        .get_one::<String>("lang")
        .unwrap()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    config.output.format = matches
        .get_one::<String>("format")
        .unwrap()
        .parse::<OutputFormat>()
        .map_err(|e| anyhow::anyhow!(e))?;
    config.output.base_dir = output_dir.clone();
    config.output.keep_frames = matches.get_flag("keep-frames");
    config.output.label_by_content = matches.get_flag("content-labels");
    config.processing.skip_existing = matches.get_flag("skip-existing");

    if let Some(workers) = matches.get_one::<String>("workers") {
        config.performance.max_workers = workers.parse()?;
    }
    let workers = config.performance.max_workers;

    info!("🚀 Subtitle Extractor (Rust) starting...");
    info!("📁 Input: {}", input.display());
    info!("📂 Output directory: {}", output_dir.display());
    info!("🔧 Workers: {}", workers);

    if !input.exists() {
        error!("Input path does not exist: {}", input.display());
        return Err(anyhow::anyhow!("Input path not found"));
    }

    tokio::fs::create_dir_all(&output_dir).await?;

    let recognizer = Arc::new(
        TesseractRecognizer::new()
            .with_binary(config.ocr.binary.clone())
            .with_psm(config.ocr.psm),
    );
    let processor = BatchProcessor::new(config, recognizer, workers)?;

    let start_time = std::time::Instant::now();
    let results = processor.process_path(&input, &output_dir).await?;
    let duration = start_time.elapsed();

    info!("🎉 Processing completed in {:.2}s", duration.as_secs_f64());
    info!("✅ Successful: {}", results.successful);
    info!("⏭️  Skipped: {}", results.skipped);
    info!("❌ Failed: {}", results.failed);
    info!(
        "📊 Success rate: {:.1}%",
        if results.total > 0 {
            results.successful as f64 / results.total as f64 * 100.0
        } else {
            0.0
        }
    );

    if results.failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}
