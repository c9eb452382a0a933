use std::path::PathBuf;

/// Result type for subtitle extraction operations
pub type Result<T> = std::result::Result<T, ExtractorError>;

/// Error types for subtitle extraction operations
#[derive(thiserror::Error, Debug)]
pub enum ExtractorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The frame source could not produce frames for a video. Fatal for
    /// that video's run.
    #[error("Video decoding failed: {0}")]
    Decode(String),

    /// The external recognizer failed on a single frame. Recoverable: the
    /// frame is skipped.
    #[error("Text recognition failed: {0}")]
    Recognition(String),

    /// A frame image could not be read or decoded. Recoverable: the frame
    /// is skipped.
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// A parameter is outside its contractual range. Rejected before any
    /// processing starts.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The destination path already exists. Runs fail instead of silently
    /// overwriting another run's output.
    #[error("Output already exists: {}", .0.display())]
    OutputExists(PathBuf),
}
