pub mod srt;
pub mod writer;

pub use srt::{SrtEntry, SrtGenerator};
pub use writer::{write_srt, write_transcript};

use serde::{Deserialize, Serialize};

/// A single accepted subtitle: meaningful recognized text tied to the
/// sampled frame it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtitleEntry {
    /// 1-based index of the originating sampled frame
    pub frame_index: u32,
    /// Recognized text, trimmed, accepted by the quality filter
    pub text: String,
    /// Display label for transcript output and frame assets
    pub label: String,
}

/// Output format for the extracted subtitles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// One `<label>: <text>` line per entry
    Transcript,
    /// SubRip blocks with frame-derived timestamps
    Srt,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Transcript => "txt",
            OutputFormat::Srt => "srt",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "txt" | "transcript" => Ok(OutputFormat::Transcript),
            "srt" => Ok(OutputFormat::Srt),
            other => Err(format!("unknown output format: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!("txt".parse::<OutputFormat>().unwrap(), OutputFormat::Transcript);
        assert_eq!("SRT".parse::<OutputFormat>().unwrap(), OutputFormat::Srt);
        assert!("pdf".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_format_extensions() {
        assert_eq!(OutputFormat::Transcript.extension(), "txt");
        assert_eq!(OutputFormat::Srt.extension(), "srt");
    }
}
