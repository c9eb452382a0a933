//! Frame asset storage.
//!
//! The pipeline itself never renames or deletes files; every storage side
//! effect on frame assets goes through a [`FrameStore`]. Each video gets
//! its own workspace directory keyed by a hash of the video path, so
//! concurrent batch runs never share frame directories.

use std::path::{Path, PathBuf};

use image::DynamicImage;
use tracing::{debug, warn};

use crate::error::{ExtractorError, Result};
use crate::video::SampledFrame;

/// Per-video workspace for sampled frames and their cropped regions.
#[derive(Debug, Clone)]
pub struct FrameStore {
    root: PathBuf,
}

impl FrameStore {
    /// Workspace for `video_path` under `output_root`, isolated by an
    /// md5-derived token so identical stems from different directories
    /// cannot collide.
    pub fn for_video(output_root: &Path, video_path: &Path) -> Self {
        let digest = md5::compute(video_path.to_string_lossy().as_bytes());
        let token = format!("{:x}", digest);
        let stem = video_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "video".to_string());

        Self {
            root: output_root
                .join("frames")
                .join(format!("{}-{}", stem, &token[..8])),
        }
    }

    /// Workspace at an explicit root, for tests and embedding callers.
    pub fn at(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory the frame source samples into.
    pub fn frames_dir(&self) -> PathBuf {
        self.root.join("raw")
    }

    /// Directory for cropped subtitle regions handed to the recognizer.
    pub fn crops_dir(&self) -> PathBuf {
        self.root.join("crops")
    }

    pub async fn prepare(&self) -> Result<()> {
        tokio::fs::create_dir_all(self.frames_dir()).await?;
        tokio::fs::create_dir_all(self.crops_dir()).await?;
        Ok(())
    }

    /// Persist a frame's cropped subtitle region and return its path.
    pub async fn save_crop(&self, frame: &SampledFrame, crop: &DynamicImage) -> Result<PathBuf> {
        let path = self.crops_dir().join(format!("frame_{:04}.png", frame.index));
        crop.save(&path)
            .map_err(|e| ExtractorError::InvalidImage(format!("{}: {}", path.display(), e)))?;
        Ok(path)
    }

    /// Discard the assets of a frame that produced no meaningful text.
    pub async fn discard(&self, frame: &SampledFrame) {
        for path in [
            frame.path.clone(),
            self.crops_dir().join(format!("frame_{:04}.png", frame.index)),
        ] {
            if let Err(e) = tokio::fs::remove_file(&path).await {
                if path.exists() {
                    warn!("Failed to discard {}: {}", path.display(), e);
                }
            }
        }
    }

    /// Rename a kept frame asset to its entry label. Fails on collision
    /// instead of overwriting.
    pub async fn rename_to_label(&self, frame: &SampledFrame, label: &str) -> Result<PathBuf> {
        let target = self.frames_dir().join(format!("{}.png", label));
        if target.exists() {
            return Err(ExtractorError::OutputExists(target));
        }

        tokio::fs::rename(&frame.path, &target).await?;
        debug!("🏷️  {} -> {}", frame.path.display(), target.display());
        Ok(target)
    }

    /// Remove the whole workspace once the run no longer needs it.
    pub async fn cleanup(&self) -> Result<()> {
        if self.root.exists() {
            tokio::fs::remove_dir_all(&self.root).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn frame(store: &FrameStore, index: u32) -> SampledFrame {
        SampledFrame {
            index,
            path: store.frames_dir().join(format!("frame_{:04}.png", index)),
        }
    }

    #[test]
    fn test_workspaces_are_distinct_per_video_path() {
        let output = Path::new("/tmp/out");
        let a = FrameStore::for_video(output, Path::new("/videos/a/clip.mp4"));
        let b = FrameStore::for_video(output, Path::new("/videos/b/clip.mp4"));

        // Same stem, different paths, different workspaces
        assert_ne!(a.root(), b.root());
    }

    #[test]
    fn test_workspace_token_is_stable() {
        let output = Path::new("/tmp/out");
        let first = FrameStore::for_video(output, Path::new("/videos/clip.mp4"));
        let second = FrameStore::for_video(output, Path::new("/videos/clip.mp4"));
        assert_eq!(first.root(), second.root());
    }

    #[tokio::test]
    async fn test_discard_removes_frame_assets() {
        let temp_dir = TempDir::new().unwrap();
        let store = FrameStore::at(temp_dir.path().join("ws"));
        store.prepare().await.unwrap();

        let frame = frame(&store, 1);
        tokio::fs::write(&frame.path, b"png").await.unwrap();

        store.discard(&frame).await;
        assert!(!frame.path.exists());
    }

    #[tokio::test]
    async fn test_rename_refuses_collision() {
        let temp_dir = TempDir::new().unwrap();
        let store = FrameStore::at(temp_dir.path().join("ws"));
        store.prepare().await.unwrap();

        let first = frame(&store, 1);
        tokio::fs::write(&first.path, b"png").await.unwrap();
        store.rename_to_label(&first, "Hello_0001").await.unwrap();

        let second = frame(&store, 2);
        tokio::fs::write(&second.path, b"png").await.unwrap();
        let err = store.rename_to_label(&second, "Hello_0001").await.unwrap_err();
        assert!(matches!(err, ExtractorError::OutputExists(_)));
    }

    #[tokio::test]
    async fn test_cleanup_removes_workspace() {
        let temp_dir = TempDir::new().unwrap();
        let store = FrameStore::at(temp_dir.path().join("ws"));
        store.prepare().await.unwrap();
        assert!(store.root().exists());

        store.cleanup().await.unwrap();
        assert!(!store.root().exists());
    }
}
