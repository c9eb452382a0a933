/// Subtitle Extractor - Rust Implementation
///
/// Extracts burned-in subtitles from video files: samples frames with
/// FFmpeg, recognizes text in the bottom region of each frame with an
/// external OCR engine, filters noise, collapses near-duplicates and
/// writes a timestamped transcript or SRT file.

pub mod config;
pub mod crop;
pub mod dedup;
pub mod error;
pub mod filter;
pub mod ocr;
pub mod processing;
pub mod sanitize;
pub mod storage;
pub mod subtitles;
pub mod timestamp;
pub mod video;

// Re-export main types for easy access
pub use crate::config::{Config, ConfigBuilder};
pub use crate::dedup::{similarity_ratio, Deduplicator};
pub use crate::error::{ExtractorError, Result};
pub use crate::filter::is_meaningful;
pub use crate::ocr::{MockRecognizer, TesseractRecognizer, TextRecognizer};
pub use crate::processing::{BatchProcessor, ProcessingResult, SubtitlePipeline};
pub use crate::sanitize::sanitize_label;
pub use crate::storage::FrameStore;
pub use crate::subtitles::{OutputFormat, SrtGenerator, SubtitleEntry};
pub use crate::timestamp::frame_timestamp;
pub use crate::video::{SampledFrame, VideoInfo, VideoProcessor};
