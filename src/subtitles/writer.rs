use std::path::Path;

use tracing::info;

use super::{SrtGenerator, SubtitleEntry};
use crate::error::{ExtractorError, Result};

/// Write a plain transcript: one `<label>: <text>` line per entry, UTF-8,
/// no trailing metadata. Refuses to overwrite an existing file.
pub async fn write_transcript(entries: &[SubtitleEntry], path: &Path) -> Result<()> {
    refuse_overwrite(path)?;

    let mut content = String::new();
    for entry in entries {
        content.push_str(&entry.label);
        content.push_str(": ");
        content.push_str(&entry.text);
        content.push('\n');
    }

    tokio::fs::write(path, content).await?;
    info!("💾 Transcript saved: {} ({} entries)", path.display(), entries.len());
    Ok(())
}

/// Write timed SRT blocks for the final subtitle sequence. Refuses to
/// overwrite an existing file.
pub async fn write_srt(entries: &[SubtitleEntry], fps: f64, path: &Path) -> Result<()> {
    refuse_overwrite(path)?;

    let generator = SrtGenerator::from_entries(entries, fps);
    tokio::fs::write(path, generator.generate()).await?;
    info!("💾 SRT saved: {} ({} blocks)", path.display(), generator.len());
    Ok(())
}

/// Name collisions on the destination are a hard error; resolving them is
/// the caller's job.
fn refuse_overwrite(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(ExtractorError::OutputExists(path.to_path_buf()));
    }
    Ok(())
}
