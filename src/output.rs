//! Conversion results.

use crate::config::OutputFormat;
use crate::error::{Html2ImageError, Result};
use crate::pipeline::exec::ProcessOutput;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Outputs smaller than this are treated as a failed render even when the
/// engine exits 0. No valid PNG, JPEG or PDF of a real page is this small.
pub const MIN_OUTPUT_BYTES: usize = 100;

/// Bytes produced by an engine plus what we know about how they were made.
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
    /// Name of the converter that produced the bytes.
    pub engine: &'static str,
    /// Engine diagnostics; non-empty stderr on success is informational only.
    pub stderr: String,
    pub duration_ms: u64,
}

impl ConversionOutput {
    /// Validate raw engine output and wrap it.
    pub fn from_process(
        engine: &'static str,
        format: OutputFormat,
        process: ProcessOutput,
    ) -> Result<Self> {
        let size = process.stdout.len();
        if !is_plausible_size(size) {
            warn!(
                engine,
                size,
                stderr = %process.stderr.trim(),
                "Suspiciously small output"
            );
            return Err(Html2ImageError::OutputTooSmall {
                engine: engine.to_string(),
                size,
                stderr: process.stderr,
            });
        }

        Ok(Self {
            bytes: process.stdout,
            format,
            engine,
            stderr: process.stderr,
            duration_ms: process.elapsed.as_millis() as u64,
        })
    }

    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }

    pub fn stats(&self) -> ConversionStats {
        ConversionStats {
            engine: self.engine.to_string(),
            format: self.format,
            bytes: self.bytes.len(),
            duration_ms: self.duration_ms,
        }
    }
}

/// Serializable summary of a conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    pub engine: String,
    pub format: OutputFormat,
    pub bytes: usize,
    pub duration_ms: u64,
}

/// The minimum-size sanity flag.
pub fn is_plausible_size(len: usize) -> bool {
    len >= MIN_OUTPUT_BYTES
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn process(stdout: Vec<u8>, stderr: &str) -> ProcessOutput {
        ProcessOutput {
            stdout,
            stderr: stderr.to_string(),
            elapsed: Duration::from_millis(42),
        }
    }

    #[test]
    fn threshold_is_inclusive() {
        assert!(!is_plausible_size(99));
        assert!(is_plausible_size(100));
    }

    #[test]
    fn small_output_is_an_error() {
        let err = ConversionOutput::from_process(
            "wkhtmltox",
            OutputFormat::Png,
            process(vec![0; 10], ""),
        )
        .unwrap_err();
        assert!(matches!(err, Html2ImageError::OutputTooSmall { size: 10, .. }));
    }

    #[test]
    fn accepted_output_keeps_stderr_and_stats() {
        let out = ConversionOutput::from_process(
            "plutobook",
            OutputFormat::Pdf,
            process(vec![b'%'; 512], "warning: font fallback"),
        )
        .unwrap();
        assert_eq!(out.content_type(), "application/pdf");
        assert_eq!(out.stderr, "warning: font fallback");

        let stats = out.stats();
        assert_eq!(stats.bytes, 512);
        assert_eq!(stats.duration_ms, 42);
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["format"], "pdf");
        assert_eq!(json["engine"], "plutobook");
    }
}
