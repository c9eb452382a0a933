use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{ExtractorError, Result};

/// Video information extracted from file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoInfo {
    pub path: PathBuf,
    pub filename: String,
    pub duration: Duration,
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub format: String,
    pub file_size: u64,
}

/// A still image sampled from the video, tagged with its 1-based ordinal
/// position in the sampling sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampledFrame {
    pub index: u32,
    pub path: PathBuf,
}

/// Video frame source backed by FFmpeg
#[derive(Debug, Clone)]
pub struct VideoProcessor {
    /// Supported video extensions
    supported_extensions: Vec<String>,
}

impl VideoProcessor {
    pub fn new() -> Self {
        Self {
            supported_extensions: vec![
                "mp4".to_string(),
                "mkv".to_string(),
                "avi".to_string(),
                "mov".to_string(),
                "webm".to_string(),
                "m4v".to_string(),
            ],
        }
    }

    pub fn with_extensions(extensions: Vec<String>) -> Self {
        Self {
            supported_extensions: extensions,
        }
    }

    /// Discover all video files in a directory recursively
    pub async fn discover_videos(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        use std::future::Future;
        use std::pin::Pin;

        fn discover_recursive<'a>(
            supported_extensions: &'a [String],
            dir: &'a Path,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<PathBuf>>> + Send + 'a>> {
            Box::pin(async move {
                let mut videos = Vec::new();

                let mut entries = tokio::fs::read_dir(dir).await?;

                while let Some(entry) = entries.next_entry().await? {
                    let path = entry.path();

                    if path.is_dir() {
                        let mut sub_videos =
                            discover_recursive(supported_extensions, &path).await?;
                        videos.append(&mut sub_videos);
                    } else if let Some(extension) = path.extension() {
                        if let Some(ext_str) = extension.to_str() {
                            if supported_extensions.contains(&ext_str.to_lowercase()) {
                                videos.push(path);
                            }
                        }
                    }
                }

                videos.sort();
                Ok(videos)
            })
        }

        discover_recursive(&self.supported_extensions, dir).await
    }

    /// Extract video information using FFmpeg command line
    pub async fn get_video_info(&self, video_path: &Path) -> Result<VideoInfo> {
        let output = tokio::process::Command::new("ffprobe")
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(video_path)
            .output()
            .await?;

        if !output.status.success() {
            return Err(ExtractorError::Decode(format!(
                "ffprobe failed for {}",
                video_path.display()
            )));
        }

        let ffprobe_data: serde_json::Value = serde_json::from_slice(&output.stdout)
            .map_err(|e| ExtractorError::Decode(format!("unreadable ffprobe output: {}", e)))?;

        let format = &ffprobe_data["format"];
        let video_stream = ffprobe_data["streams"]
            .as_array()
            .and_then(|streams| streams.iter().find(|s| s["codec_type"] == "video"))
            .ok_or_else(|| {
                ExtractorError::Decode(format!(
                    "no video stream found in {}",
                    video_path.display()
                ))
            })?;

        let duration_seconds: f64 = format["duration"]
            .as_str()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.0);

        let file_size = tokio::fs::metadata(video_path).await?.len();

        let video_info = VideoInfo {
            path: video_path.to_path_buf(),
            filename: video_path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            duration: Duration::from_secs_f64(duration_seconds),
            width: video_stream["width"].as_u64().unwrap_or(0) as u32,
            height: video_stream["height"].as_u64().unwrap_or(0) as u32,
            fps: video_stream["r_frame_rate"]
                .as_str()
                .and_then(|s| {
                    let parts: Vec<&str> = s.split('/').collect();
                    if parts.len() == 2 {
                        let num: f64 = parts[0].parse().ok()?;
                        let den: f64 = parts[1].parse().ok()?;
                        Some(num / den)
                    } else {
                        s.parse().ok()
                    }
                })
                .unwrap_or(0.0),
            format: format["format_name"].as_str().unwrap_or("unknown").to_string(),
            file_size,
        };

        info!(
            "📹 Analyzed video: {} ({}x{}, {:.1}fps, {:.1}s)",
            video_info.filename,
            video_info.width,
            video_info.height,
            video_info.fps,
            video_info.duration.as_secs_f64()
        );

        Ok(video_info)
    }

    /// Validate video file integrity
    pub async fn validate_video(&self, video_path: &Path) -> Result<bool> {
        let output = tokio::process::Command::new("ffprobe")
            .args(["-v", "error", "-select_streams", "v:0", "-show_entries", "stream=codec_name", "-of", "csv=p=0"])
            .arg(video_path)
            .output()
            .await?;

        Ok(output.status.success())
    }

    /// Sample still frames from a video at `fps` frames per second into
    /// `frames_dir`, returning them in increasing index order.
    ///
    /// Failure here means the video itself cannot be decoded and is fatal
    /// for this video's run.
    pub async fn extract_frames(
        &self,
        video_path: &Path,
        fps: f64,
        frames_dir: &Path,
    ) -> Result<Vec<SampledFrame>> {
        tokio::fs::create_dir_all(frames_dir).await?;

        info!("🎞️  Sampling frames from {} at {} fps", video_path.display(), fps);

        let pattern = frames_dir.join("frame_%04d.png");
        let output = tokio::process::Command::new("ffmpeg")
            .arg("-i")
            .arg(video_path)
            .args(["-vf", &format!("fps={}", fps)])
            .arg(&pattern)
            .output()
            .await?;

        if !output.status.success() {
            return Err(ExtractorError::Decode(format!(
                "ffmpeg frame extraction failed for {}: {}",
                video_path.display(),
                String::from_utf8_lossy(&output.stderr)
                    .lines()
                    .last()
                    .unwrap_or("unknown error")
            )));
        }

        let frames = Self::collect_frames(frames_dir).await?;
        if frames.is_empty() {
            return Err(ExtractorError::Decode(format!(
                "ffmpeg produced no frames for {}",
                video_path.display()
            )));
        }

        info!("🖼️  Sampled {} frames", frames.len());
        Ok(frames)
    }

    /// Gather `frame_NNNN.png` files from a directory, parsing indices
    /// back out of the generated names.
    pub async fn collect_frames(frames_dir: &Path) -> Result<Vec<SampledFrame>> {
        let frame_name = Regex::new(r"^frame_(\d+)\.png$").expect("static pattern");

        let mut frames = Vec::new();
        let mut entries = tokio::fs::read_dir(frames_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let name = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name,
                None => continue,
            };

            if let Some(captures) = frame_name.captures(name) {
                if let Ok(index) = captures[1].parse::<u32>() {
                    frames.push(SampledFrame { index, path });
                }
            } else {
                debug!("Ignoring non-frame file: {}", name);
            }
        }

        frames.sort_by_key(|frame| frame.index);
        Ok(frames)
    }
}

impl Default for VideoProcessor {
    fn default() -> Self {
        Self::new()
    }
}
