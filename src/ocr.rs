//! External OCR collaborators.
//!
//! Recognition is delegated to a black-box engine behind the
//! [`TextRecognizer`] trait. The shipped implementation shells out to the
//! `tesseract` binary the same way frame extraction shells out to ffmpeg;
//! tests use [`MockRecognizer`] instead.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{ExtractorError, Result};

/// Black-box text recognizer over a single frame image.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Recognize text in the image at `path`. An empty string is a valid
    /// result (no text in frame); errors are per-frame and recoverable.
    async fn recognize(&self, path: &Path, languages: &[String]) -> Result<String>;
}

/// Recognizer backed by the `tesseract` command-line tool.
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    /// Binary to invoke, normally `tesseract`
    binary: String,
    /// Page segmentation mode; 6 assumes a uniform block of text
    psm: u8,
}

impl TesseractRecognizer {
    pub fn new() -> Self {
        Self {
            binary: "tesseract".to_string(),
            psm: 6,
        }
    }

    pub fn with_binary(mut self, binary: String) -> Self {
        self.binary = binary;
        self
    }

    pub fn with_psm(mut self, psm: u8) -> Self {
        self.psm = psm;
        self
    }

    /// Join language codes the way tesseract expects (`eng+chi_tra+jpn`).
    fn language_arg(languages: &[String]) -> String {
        if languages.is_empty() {
            "eng".to_string()
        } else {
            languages.join("+")
        }
    }
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextRecognizer for TesseractRecognizer {
    async fn recognize(&self, path: &Path, languages: &[String]) -> Result<String> {
        let lang = Self::language_arg(languages);
        debug!("🔤 Recognizing {} (lang: {})", path.display(), lang);

        let output = tokio::process::Command::new(&self.binary)
            .arg(path)
            .arg("stdout")
            .args(["-l", &lang])
            .args(["--psm", &self.psm.to_string()])
            .arg("quiet")
            .output()
            .await
            .map_err(|e| {
                ExtractorError::Recognition(format!("failed to spawn {}: {}", self.binary, e))
            })?;

        if !output.status.success() {
            return Err(ExtractorError::Recognition(format!(
                "{} exited with {} for {}",
                self.binary,
                output.status,
                path.display()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout);
        // Recognized lines are joined; the pipeline trims and filters
        Ok(text.split_whitespace().collect::<Vec<_>>().join(" "))
    }
}

/// Scripted recognizer for tests: maps frame file stems to canned text.
pub struct MockRecognizer {
    responses: HashMap<String, String>,
    fail_on: Vec<String>,
}

impl MockRecognizer {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            fail_on: Vec::new(),
        }
    }

    /// Respond with `text` for the frame whose file stem is `stem`
    /// (e.g. `frame_0001`). Unknown stems recognize as empty text.
    pub fn with_response(mut self, stem: &str, text: &str) -> Self {
        self.responses.insert(stem.to_string(), text.to_string());
        self
    }

    /// Build from ordered raw texts, keyed as `frame_0001`, `frame_0002`, …
    pub fn from_texts(texts: &[&str]) -> Self {
        let mut mock = Self::new();
        for (i, text) in texts.iter().enumerate() {
            mock = mock.with_response(&format!("frame_{:04}", i + 1), text);
        }
        mock
    }

    /// Fail recognition for the frame with this file stem.
    pub fn failing_on(mut self, stem: &str) -> Self {
        self.fail_on.push(stem.to_string());
        self
    }
}

impl Default for MockRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextRecognizer for MockRecognizer {
    async fn recognize(&self, path: &Path, _languages: &[String]) -> Result<String> {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        if self.fail_on.contains(&stem) {
            return Err(ExtractorError::Recognition(format!(
                "mock failure for {}",
                stem
            )));
        }

        Ok(self.responses.get(&stem).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_language_arg_joins_with_plus() {
        let langs = vec!["eng".to_string(), "chi_tra".to_string(), "jpn".to_string()];
        assert_eq!(TesseractRecognizer::language_arg(&langs), "eng+chi_tra+jpn");
    }

    #[test]
    fn test_language_arg_defaults_to_english() {
        assert_eq!(TesseractRecognizer::language_arg(&[]), "eng");
    }

    #[tokio::test]
    async fn test_mock_recognizer_scripted_responses() {
        let mock = MockRecognizer::new().with_response("frame_0001", "Hello");
        let langs = vec!["eng".to_string()];

        let text = mock
            .recognize(&PathBuf::from("/tmp/frame_0001.png"), &langs)
            .await
            .unwrap();
        assert_eq!(text, "Hello");

        let empty = mock
            .recognize(&PathBuf::from("/tmp/frame_0099.png"), &langs)
            .await
            .unwrap();
        assert_eq!(empty, "");
    }

    #[tokio::test]
    async fn test_mock_recognizer_scripted_failure() {
        let mock = MockRecognizer::new().failing_on("frame_0002");
        let err = mock
            .recognize(&PathBuf::from("/tmp/frame_0002.png"), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractorError::Recognition(_)));
    }
}
