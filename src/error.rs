//! Error types for the html2image library.
//!
//! Every failure a conversion can hit is a variant of [`Html2ImageError`].
//! Callers that need to decide *how* to surface an error (the HTTP layer maps
//! to status codes, the CLI to exit messages) match on [`ErrorKind`] instead of
//! on individual variants:
//!
//! | Kind | Meaning | HTTP |
//! |------|---------|------|
//! | [`ErrorKind::ClientInput`] | bad or missing request parameters | 400 |
//! | [`ErrorKind::PayloadTooLarge`] | upload exceeded the body limit | 413 |
//! | [`ErrorKind::Timeout`] | engine ran past its deadline | 504 |
//! | [`ErrorKind::ConversionFailed`] | engine exited non-zero or produced junk | 500 |
//! | [`ErrorKind::InternalIo`] | temp-file, upload or spawn I/O failed | 500 |

use std::path::PathBuf;
use thiserror::Error;

/// Library-wide result alias.
pub type Result<T> = std::result::Result<T, Html2ImageError>;

/// All errors returned by the html2image library.
#[derive(Debug, Error)]
pub enum Html2ImageError {
    // ── Client input ──────────────────────────────────────────────────────
    /// Requested output format is not one of png, jpg, jpeg, pdf.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A numeric parameter parsed but fell outside its allowed range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },

    /// Neither an upload nor a URL was supplied.
    #[error("missing file or url")]
    MissingInput,

    /// The URL is not an absolute http(s) URL.
    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The request body could not be read as a form.
    #[error("form parse error: {0}")]
    MalformedForm(String),

    /// The request body exceeded the configured upload limit.
    #[error("upload exceeds the {limit_bytes} byte limit")]
    UploadTooLarge { limit_bytes: usize },

    // ── Engine ────────────────────────────────────────────────────────────
    /// The engine did not finish before the deadline and was killed.
    #[error("conversion timeout: {engine} exceeded {secs}s{}", timeout_detail(.stderr))]
    Timeout {
        engine: String,
        secs: u64,
        stderr: String,
    },

    /// The engine exited with a non-zero status.
    #[error("conversion failed: {engine} exited with {status}: {stderr}")]
    ConversionFailed {
        engine: String,
        status: String,
        stderr: String,
    },

    /// The engine exited cleanly but wrote fewer bytes than any real image or PDF.
    #[error("conversion failed: {}", output_too_small_detail(.stderr))]
    OutputTooSmall {
        engine: String,
        size: usize,
        stderr: String,
    },

    /// The engine binary could not be started at all.
    #[error("failed to start '{}': {source}", .binary.display())]
    EngineUnavailable {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── I/O ───────────────────────────────────────────────────────────────
    /// Staging the uploaded HTML on disk failed.
    #[error("failed to stage temporary file: {source}")]
    TempFile {
        #[source]
        source: std::io::Error,
    },

    /// Writing the conversion result failed.
    #[error("failed to write output file '{}': {source}", .path.display())]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

fn output_too_small_detail(stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        "output too small, possibly corrupted".to_string()
    } else {
        stderr.to_string()
    }
}

fn timeout_detail(stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

/// Coarse classification used to pick a response for an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ClientInput,
    PayloadTooLarge,
    Timeout,
    ConversionFailed,
    InternalIo,
}

impl Html2ImageError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedFormat(_)
            | Self::OutOfRange { .. }
            | Self::MissingInput
            | Self::InvalidUrl { .. }
            | Self::MalformedForm(_) => ErrorKind::ClientInput,
            Self::UploadTooLarge { .. } => ErrorKind::PayloadTooLarge,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::ConversionFailed { .. } | Self::OutputTooSmall { .. } => {
                ErrorKind::ConversionFailed
            }
            Self::EngineUnavailable { .. }
            | Self::TempFile { .. }
            | Self::OutputWriteFailed { .. }
            | Self::Internal(_) => ErrorKind::InternalIo,
        }
    }
}
