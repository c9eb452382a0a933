use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::crop::crop_frame_file;
use crate::dedup::Deduplicator;
use crate::error::ExtractorError;
use crate::filter::is_meaningful;
use crate::ocr::TextRecognizer;
use crate::sanitize::sanitize_label;
use crate::storage::FrameStore;
use crate::subtitles::{write_srt, write_transcript, OutputFormat, SubtitleEntry};
use crate::video::{SampledFrame, VideoInfo, VideoProcessor};

/// Pipeline stages for a single video
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum PipelineStage {
    /// Frame sampling via the external frame source
    Sampling,
    /// Per-frame crop and recognition
    Recognizing,
    /// Noise rejection over recognized text
    Filtering,
    /// Near-duplicate collapse (optional)
    Deduplicating,
    /// Output formatting and writing
    Formatting,
    /// All stages done
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProcessingStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    Skipped,
}

/// Processing result for a single video
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoProcessingResult {
    pub video_info: VideoInfo,
    pub entries_produced: usize,
    pub output_path: Option<PathBuf>,
    pub processing_time: Duration,
    pub status: ProcessingStatus,
    pub error_message: Option<String>,
    pub stages_completed: Vec<PipelineStage>,
}

impl VideoProcessingResult {
    fn pending(video_path: &Path) -> Self {
        Self {
            video_info: VideoInfo {
                path: video_path.to_path_buf(),
                filename: video_path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
                duration: Duration::from_secs(0),
                width: 0,
                height: 0,
                fps: 0.0,
                format: String::new(),
                file_size: 0,
            },
            entries_produced: 0,
            output_path: None,
            processing_time: Duration::from_secs(0),
            status: ProcessingStatus::InProgress,
            error_message: None,
            stages_completed: Vec::new(),
        }
    }
}

/// Overall batch processing results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
    pub total_time: Duration,
    pub results: Vec<VideoProcessingResult>,
}

/// Per-video subtitle extraction pipeline.
///
/// Frames are processed strictly in increasing index order; dedup's
/// earliest-wins retention depends on it. Per-frame crop or recognition
/// failures skip that frame; a frame-source failure fails the video.
pub struct SubtitlePipeline {
    config: Config,
    video_processor: VideoProcessor,
    recognizer: Arc<dyn TextRecognizer>,
}

impl SubtitlePipeline {
    pub fn new(config: Config, recognizer: Arc<dyn TextRecognizer>) -> Self {
        let video_processor =
            VideoProcessor::with_extensions(config.processing.supported_extensions.clone());
        Self {
            config,
            video_processor,
            recognizer,
        }
    }

    /// Run the full pipeline for one video. Configuration violations are
    /// the only hard error; everything else is reported in the returned
    /// result record so batch runs can continue.
    pub async fn run(&self, video_path: &Path, output_dir: &Path) -> Result<VideoProcessingResult> {
        self.config.validate()?;

        let start_time = Instant::now();
        let mut result = VideoProcessingResult::pending(video_path);

        let output_path = output_dir.join(format!(
            "{}.{}",
            video_path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "video".to_string()),
            self.config.output.format.extension()
        ));

        // Destination collisions resolve to skip or failure, never to a
        // silent overwrite
        if output_path.exists() {
            if self.config.processing.skip_existing {
                info!("⏭️  Skipping {} (output exists)", result.video_info.filename);
                result.status = ProcessingStatus::Skipped;
            } else {
                result.status = ProcessingStatus::Failed;
                result.error_message =
                    Some(ExtractorError::OutputExists(output_path.clone()).to_string());
            }
            result.processing_time = start_time.elapsed();
            return Ok(result);
        }

        if self.config.processing.validate_videos
            && !self.video_processor.validate_video(video_path).await.unwrap_or(false)
        {
            result.status = ProcessingStatus::Failed;
            result.error_message = Some(format!(
                "Video validation failed: {}",
                video_path.display()
            ));
            result.processing_time = start_time.elapsed();
            return Ok(result);
        }

        debug!("📊 Analyzing video: {}", video_path.display());
        match self.video_processor.get_video_info(video_path).await {
            Ok(video_info) => result.video_info = video_info,
            Err(e) => {
                result.status = ProcessingStatus::Failed;
                result.error_message = Some(format!("Video analysis failed: {}", e));
                result.processing_time = start_time.elapsed();
                return Ok(result);
            }
        }

        // Stage 1: frame sampling
        let store = FrameStore::for_video(&self.config.output.base_dir, video_path);
        let frames = match self.sample_frames(video_path, &store).await {
            Ok(frames) => {
                result.stages_completed.push(PipelineStage::Sampling);
                frames
            }
            Err(e) => {
                result.status = ProcessingStatus::Failed;
                result.error_message = Some(format!("Frame sampling failed: {}", e));
                result.processing_time = start_time.elapsed();
                return Ok(result);
            }
        };

        // Stages 2+3: per-frame recognition and filtering, interleaved
        let entries = self.process_frames(&frames, &store).await;
        result.stages_completed.push(PipelineStage::Recognizing);
        result.stages_completed.push(PipelineStage::Filtering);

        // Stage 4: dedup (optional)
        let entries = if self.config.extraction.dedupe {
            let deduplicator =
                Deduplicator::with_threshold(self.config.extraction.dedupe_threshold);
            let before = entries.len();
            let deduped = deduplicator.deduplicate(entries);
            debug!("🧹 Dedup kept {}/{} entries", deduped.len(), before);
            result.stages_completed.push(PipelineStage::Deduplicating);
            deduped
        } else {
            entries
        };

        // Stage 5: formatting
        let write_result = match self.config.output.format {
            OutputFormat::Transcript => write_transcript(&entries, &output_path).await,
            OutputFormat::Srt => {
                write_srt(&entries, self.config.extraction.fps, &output_path).await
            }
        };

        if let Err(e) = write_result {
            result.status = ProcessingStatus::Failed;
            result.error_message = Some(format!("Output writing failed: {}", e));
            result.processing_time = start_time.elapsed();
            return Ok(result);
        }
        result.stages_completed.push(PipelineStage::Formatting);

        if !self.config.output.keep_frames {
            if let Err(e) = store.cleanup().await {
                warn!("Frame workspace cleanup failed: {}", e);
            }
        }

        result.stages_completed.push(PipelineStage::Completed);
        result.status = ProcessingStatus::Completed;
        result.entries_produced = entries.len();
        result.output_path = Some(output_path);
        result.processing_time = start_time.elapsed();

        Ok(result)
    }

    async fn sample_frames(
        &self,
        video_path: &Path,
        store: &FrameStore,
    ) -> crate::error::Result<Vec<SampledFrame>> {
        store.prepare().await?;
        self.video_processor
            .extract_frames(video_path, self.config.extraction.fps, &store.frames_dir())
            .await
    }

    /// Crop, recognize and filter each sampled frame in index order.
    ///
    /// Per-frame errors are logged with the frame identity and the frame
    /// is excluded; they never abort the video.
    pub async fn process_frames(
        &self,
        frames: &[SampledFrame],
        store: &FrameStore,
    ) -> Vec<SubtitleEntry> {
        let mut entries = Vec::new();

        for frame in frames {
            let cropped = match crop_frame_file(&frame.path, self.config.extraction.region_ratio) {
                Ok(image) => image,
                Err(e) => {
                    warn!("⚠️ Frame {} unreadable, skipping: {}", frame.index, e);
                    store.discard(frame).await;
                    continue;
                }
            };

            let crop_path = match store.save_crop(frame, &cropped).await {
                Ok(path) => path,
                Err(e) => {
                    warn!("⚠️ Frame {} crop not saved, skipping: {}", frame.index, e);
                    store.discard(frame).await;
                    continue;
                }
            };

            let raw_text = match self
                .recognizer
                .recognize(&crop_path, &self.config.ocr.languages)
                .await
            {
                Ok(text) => text,
                Err(e) => {
                    warn!("⚠️ Recognition failed on frame {}, skipping: {}", frame.index, e);
                    store.discard(frame).await;
                    continue;
                }
            };

            let text = raw_text.trim();
            if !is_meaningful(text) {
                debug!("Frame {} rejected as noise: {:?}", frame.index, text);
                store.discard(frame).await;
                continue;
            }

            let label = if self.config.output.label_by_content {
                format!(
                    "{}_{:04}",
                    sanitize_label(text, self.config.output.max_label_length),
                    frame.index
                )
            } else {
                format!("frame_{:04}", frame.index)
            };

            if self.config.output.keep_frames {
                if let Err(e) = store.rename_to_label(frame, &label).await {
                    warn!("Frame {} not renamed: {}", frame.index, e);
                }
            }

            debug!("frame_{:04}: {}", frame.index, text);
            entries.push(SubtitleEntry {
                frame_index: frame.index,
                text: text.to_string(),
                label,
            });
        }

        entries
    }
}

/// Batch processor over independent per-video pipelines
pub struct BatchProcessor {
    config: Config,
    recognizer: Arc<dyn TextRecognizer>,
    video_processor: VideoProcessor,
    worker_semaphore: Arc<Semaphore>,
    max_concurrent: usize,
}

impl BatchProcessor {
    pub fn new(
        config: Config,
        recognizer: Arc<dyn TextRecognizer>,
        max_workers: usize,
    ) -> Result<Self> {
        config.validate()?;
        info!("🔧 Initializing BatchProcessor with {} workers", max_workers);

        let video_processor =
            VideoProcessor::with_extensions(config.processing.supported_extensions.clone());

        Ok(Self {
            config,
            recognizer,
            video_processor,
            worker_semaphore: Arc::new(Semaphore::new(max_workers)),
            max_concurrent: max_workers,
        })
    }

    /// Process a video file or every video under a directory.
    pub async fn process_path(&self, input: &Path, output_dir: &Path) -> Result<ProcessingResult> {
        let start_time = Instant::now();

        tokio::fs::create_dir_all(output_dir).await?;

        let video_paths = if input.is_dir() {
            info!("🔍 Discovering videos in {}", input.display());
            self.video_processor.discover_videos(input).await?
        } else {
            vec![input.to_path_buf()]
        };

        if video_paths.is_empty() {
            warn!("No videos found in {}", input.display());
            return Ok(ProcessingResult {
                total: 0,
                successful: 0,
                failed: 0,
                skipped: 0,
                total_time: start_time.elapsed(),
                results: Vec::new(),
            });
        }

        info!("📹 Found {} videos to process", video_paths.len());

        let results = self.process_videos_parallel(video_paths, output_dir).await;

        let total_time = start_time.elapsed();
        let successful = results
            .iter()
            .filter(|r| r.status == ProcessingStatus::Completed)
            .count();
        let skipped = results
            .iter()
            .filter(|r| r.status == ProcessingStatus::Skipped)
            .count();
        let failed = results.len() - successful - skipped;

        let processing_result = ProcessingResult {
            total: results.len(),
            successful,
            failed,
            skipped,
            total_time,
            results,
        };

        if self.config.output.save_metadata {
            let results_path = output_dir.join("processing_results.json");
            let json_data = serde_json::to_string_pretty(&processing_result)?;
            tokio::fs::write(&results_path, json_data).await?;
            info!("💾 Results saved to: {}", results_path.display());
        }

        Ok(processing_result)
    }

    /// Process multiple videos in parallel with controlled concurrency.
    ///
    /// Each video's pipeline run is independent: its own frame workspace,
    /// its own output file, no shared mutable state.
    async fn process_videos_parallel(
        &self,
        video_paths: Vec<PathBuf>,
        output_dir: &Path,
    ) -> Vec<VideoProcessingResult> {
        let (tx, mut rx) = mpsc::channel(self.max_concurrent.max(1));
        let total_videos = video_paths.len();

        for (index, video_path) in video_paths.into_iter().enumerate() {
            let config = self.config.clone();
            let recognizer = Arc::clone(&self.recognizer);
            let output_dir = output_dir.to_path_buf();
            let tx = tx.clone();
            let semaphore = Arc::clone(&self.worker_semaphore);

            tokio::spawn(async move {
                let _permit = match semaphore.acquire().await {
                    Ok(permit) => permit,
                    Err(_) => return,
                };

                info!(
                    "📹 Processing video {}/{}: {}",
                    index + 1,
                    total_videos,
                    video_path.display()
                );

                let pipeline = SubtitlePipeline::new(config, recognizer);
                let result = pipeline.run(&video_path, &output_dir).await;

                if let Err(e) = tx.send(result).await {
                    error!("Failed to send result: {}", e);
                }
            });
        }

        drop(tx);

        let mut results = Vec::new();
        while let Some(result) = rx.recv().await {
            match result {
                Ok(video_result) => {
                    match video_result.status {
                        ProcessingStatus::Completed => {
                            info!(
                                "✅ Completed: {} ({} entries, {:.2}s)",
                                video_result.video_info.filename,
                                video_result.entries_produced,
                                video_result.processing_time.as_secs_f64()
                            );
                        }
                        ProcessingStatus::Failed => {
                            warn!(
                                "❌ Failed: {} - {}",
                                video_result.video_info.filename,
                                video_result.error_message.as_deref().unwrap_or("Unknown error")
                            );
                        }
                        _ => {}
                    }
                    results.push(video_result);
                }
                Err(e) => {
                    error!("Processing error: {}", e);
                }
            }
        }

        results
    }

    /// Get processing statistics
    pub fn get_stats(&self) -> ProcessingStats {
        ProcessingStats {
            max_workers: self.max_concurrent,
            available_permits: self.worker_semaphore.available_permits(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProcessingStats {
    pub max_workers: usize,
    pub available_permits: usize,
}
