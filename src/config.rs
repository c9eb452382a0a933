use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::subtitles::OutputFormat;

/// Configuration for the subtitle extractor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Input handling settings
    pub processing: ProcessingConfig,

    /// Frame sampling and pipeline settings
    pub extraction: ExtractionConfig,

    /// External OCR engine settings
    pub ocr: OcrConfig,

    /// Output and storage settings
    pub output: OutputConfig,

    /// Performance and resource settings
    pub performance: PerformanceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Supported video file extensions
    pub supported_extensions: Vec<String>,

    /// Skip videos that already have output
    pub skip_existing: bool,

    /// Enable video validation before processing
    pub validate_videos: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Sampling rate in frames per second
    pub fps: f64,

    /// Fraction of frame height (from the bottom) scanned for subtitles,
    /// in (0.1, 1.0]
    pub region_ratio: f64,

    /// Collapse near-duplicate subtitles
    pub dedupe: bool,

    /// Similarity score above which two texts are duplicates, in (0, 1]
    pub dedupe_threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Language codes passed to the recognizer
    pub languages: Vec<String>,

    /// Recognizer binary name or path
    pub binary: String,

    /// Tesseract page segmentation mode
    pub psm: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Base output directory
    pub base_dir: PathBuf,

    /// Output format
    pub format: OutputFormat,

    /// Keep frame images after processing instead of removing the
    /// per-video workspace
    pub keep_frames: bool,

    /// Label entries by their sanitized text instead of frame names
    pub label_by_content: bool,

    /// Maximum length of content-derived labels, in characters
    pub max_label_length: usize,

    /// Save a processing summary JSON for batch runs
    pub save_metadata: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceConfig {
    /// Maximum number of videos processed concurrently
    pub max_workers: usize,
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let config_paths = [
            "subtitle-extractor.toml",
            "config/subtitle-extractor.toml",
            "~/.config/subtitle-extractor/config.toml",
        ];

        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str(&config_str) {
                    Ok(config) => {
                        tracing::info!("📄 Loaded configuration from: {}", path);
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        // Fall back to environment overrides over defaults
        Self::from_env()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(workers) = std::env::var("SUBTITLE_EXTRACTOR_WORKERS") {
            config.performance.max_workers = workers.parse().unwrap_or(4);
        }

        if let Ok(fps) = std::env::var("SUBTITLE_EXTRACTOR_FPS") {
            config.extraction.fps = fps.parse().unwrap_or(1.0);
        }

        if let Ok(langs) = std::env::var("SUBTITLE_EXTRACTOR_LANGS") {
            config.ocr.languages = langs.split(',').map(|s| s.trim().to_string()).collect();
        }

        if let Ok(output_dir) = std::env::var("SUBTITLE_EXTRACTOR_OUTPUT_DIR") {
            config.output.base_dir = PathBuf::from(output_dir);
        }

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path);
        Ok(())
    }

    /// Validate configuration against the contractual ranges. Runs before
    /// any processing starts; violations are fatal.
    pub fn validate(&self) -> Result<()> {
        if self.extraction.fps <= 0.0 {
            return Err(anyhow!(
                "Invalid configuration: fps must be positive, got {}",
                self.extraction.fps
            ));
        }

        if self.extraction.region_ratio <= 0.1 || self.extraction.region_ratio > 1.0 {
            return Err(anyhow!(
                "Invalid configuration: region_ratio must be in (0.1, 1.0], got {}",
                self.extraction.region_ratio
            ));
        }

        if self.extraction.dedupe_threshold <= 0.0 || self.extraction.dedupe_threshold > 1.0 {
            return Err(anyhow!(
                "Invalid configuration: dedupe_threshold must be in (0, 1], got {}",
                self.extraction.dedupe_threshold
            ));
        }

        if self.performance.max_workers == 0 {
            return Err(anyhow!(
                "Invalid configuration: max_workers must be greater than 0"
            ));
        }

        if self.ocr.languages.is_empty() {
            return Err(anyhow!(
                "Invalid configuration: at least one OCR language is required"
            ));
        }

        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Subtitle Extractor Configuration:\n\
            - Sampling rate: {} fps\n\
            - Region ratio: {}\n\
            - Dedupe: {} (threshold {})\n\
            - Languages: {}\n\
            - Output format: {:?}\n\
            - Output directory: {}\n\
            - Workers: {}",
            self.extraction.fps,
            self.extraction.region_ratio,
            self.extraction.dedupe,
            self.extraction.dedupe_threshold,
            self.ocr.languages.join(", "),
            self.output.format,
            self.output.base_dir.display(),
            self.performance.max_workers
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            processing: ProcessingConfig {
                supported_extensions: vec![
                    "mp4".to_string(),
                    "mkv".to_string(),
                    "avi".to_string(),
                    "mov".to_string(),
                    "webm".to_string(),
                    "m4v".to_string(),
                ],
                skip_existing: false,
                validate_videos: true,
            },
            extraction: ExtractionConfig {
                fps: 1.0,
                region_ratio: 0.3,
                dedupe: true,
                dedupe_threshold: crate::dedup::DEFAULT_SIMILARITY_THRESHOLD,
            },
            ocr: OcrConfig {
                languages: vec![
                    "eng".to_string(),
                    "chi_tra".to_string(),
                    "jpn".to_string(),
                ],
                binary: "tesseract".to_string(),
                psm: 6,
            },
            output: OutputConfig {
                base_dir: PathBuf::from("./output"),
                format: OutputFormat::Transcript,
                keep_frames: false,
                label_by_content: false,
                max_label_length: crate::sanitize::DEFAULT_MAX_LABEL_LENGTH,
                save_metadata: true,
            },
            performance: PerformanceConfig {
                max_workers: num_cpus::get().min(8),
            },
        }
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_fps(mut self, fps: f64) -> Self {
        self.config.extraction.fps = fps;
        self
    }

    pub fn with_region_ratio(mut self, region_ratio: f64) -> Self {
        self.config.extraction.region_ratio = region_ratio;
        self
    }

    pub fn with_dedupe(mut self, dedupe: bool) -> Self {
        self.config.extraction.dedupe = dedupe;
        self
    }

    pub fn with_dedupe_threshold(mut self, threshold: f64) -> Self {
        self.config.extraction.dedupe_threshold = threshold;
        self
    }

    pub fn with_languages(mut self, languages: Vec<String>) -> Self {
        self.config.ocr.languages = languages;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.config.output.format = format;
        self
    }

    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.config.output.base_dir = dir;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.config.performance.max_workers = workers;
        self
    }

    pub fn keep_frames(mut self, keep: bool) -> Self {
        self.config.output.keep_frames = keep;
        self
    }

    pub fn label_by_content(mut self, enable: bool) -> Self {
        self.config.output.label_by_content = enable;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
