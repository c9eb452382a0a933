use std::fmt;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::SubtitleEntry;
use crate::timestamp::segment_bounds;

/// SRT (SubRip Subtitle) block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SrtEntry {
    /// Sequential number, 1-based over the final sequence
    pub index: u32,
    /// Start timestamp, `HH:MM:SS,mmm`
    pub start: String,
    /// End timestamp, one sampling interval after start
    pub end: String,
    /// Subtitle text
    pub text: String,
}

impl fmt::Display for SrtEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\n{} --> {}\n{}\n",
            self.index, self.start, self.end, self.text
        )
    }
}

/// SRT file generator over frame-indexed subtitle entries.
#[derive(Debug, Clone)]
pub struct SrtGenerator {
    fps: f64,
    entries: Vec<SrtEntry>,
}

impl SrtGenerator {
    /// Create a generator for subtitles sampled at `fps` frames per second.
    pub fn new(fps: f64) -> Self {
        Self {
            fps,
            entries: Vec::new(),
        }
    }

    /// Append a subtitle; its block spans one sampling interval starting
    /// at its frame's timestamp.
    pub fn push(&mut self, subtitle: &SubtitleEntry) {
        let (start, end) = segment_bounds(subtitle.frame_index, self.fps);
        self.entries.push(SrtEntry {
            index: self.entries.len() as u32 + 1,
            start,
            end,
            text: subtitle.text.clone(),
        });
    }

    /// Build a generator from an already-final subtitle sequence.
    pub fn from_entries(subtitles: &[SubtitleEntry], fps: f64) -> Self {
        let mut generator = Self::new(fps);
        for subtitle in subtitles {
            generator.push(subtitle);
        }
        generator
    }

    /// Generate SRT content as a string: blocks separated by blank lines.
    pub fn generate(&self) -> String {
        let mut content = String::new();
        for entry in &self.entries {
            content.push_str(&entry.to_string());
            content.push('\n');
        }
        content
    }

    /// Save SRT content to a file.
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        tokio::fs::write(path.as_ref(), self.generate()).await?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[SrtEntry] {
        &self.entries
    }

    /// Check generated blocks for common issues.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        for (i, entry) in self.entries.iter().enumerate() {
            if entry.index != i as u32 + 1 {
                issues.push(format!("Entry {}: Out-of-sequence index {}", i + 1, entry.index));
            }
            // Longer timestamps carry more hour digits, so compare length
            // before comparing lexicographically
            if (entry.end.len(), entry.end.as_str()) <= (entry.start.len(), entry.start.as_str()) {
                issues.push(format!("Entry {}: End time is not after start time", i + 1));
            }
            if entry.text.trim().is_empty() {
                issues.push(format!("Entry {}: Empty text", i + 1));
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subtitle(frame_index: u32, text: &str) -> SubtitleEntry {
        SubtitleEntry {
            frame_index,
            text: text.to_string(),
            label: format!("frame_{:04}", frame_index),
        }
    }

    #[test]
    fn test_entry_display() {
        let entry = SrtEntry {
            index: 1,
            start: "00:00:01,000".to_string(),
            end: "00:00:02,000".to_string(),
            text: "Test subtitle".to_string(),
        };

        assert_eq!(entry.to_string(), "1\n00:00:01,000 --> 00:00:02,000\nTest subtitle\n");
    }

    #[test]
    fn test_blocks_span_one_sampling_interval() {
        let generator = SrtGenerator::from_entries(&[subtitle(1, "Hello")], 1.0);
        let entry = &generator.entries()[0];
        assert_eq!(entry.start, "00:00:01,000");
        assert_eq!(entry.end, "00:00:02,000");
    }

    #[test]
    fn test_sequence_numbers_follow_final_order() {
        // Entries surviving dedup keep their frame indices but are
        // renumbered 1..n
        let generator =
            SrtGenerator::from_entries(&[subtitle(1, "Hello"), subtitle(4, "World!!!")], 1.0);

        let indices: Vec<u32> = generator.entries().iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![1, 2]);
        assert_eq!(generator.entries()[1].start, "00:00:04,000");
    }

    #[test]
    fn test_generated_block_layout() {
        let generator =
            SrtGenerator::from_entries(&[subtitle(1, "One"), subtitle(2, "Two")], 1.0);

        let content = generator.generate();
        assert_eq!(
            content,
            "1\n00:00:01,000 --> 00:00:02,000\nOne\n\n2\n00:00:02,000 --> 00:00:03,000\nTwo\n\n"
        );
    }

    #[test]
    fn test_validate_passes_on_well_formed_output() {
        let generator =
            SrtGenerator::from_entries(&[subtitle(1, "One"), subtitle(5, "Two")], 2.0);
        assert!(generator.validate().is_empty());
    }
}
