//! # html2image
//!
//! Render HTML to PNG, JPEG or PDF over HTTP by driving an external engine
//! (wkhtmltoimage / wkhtmltopdf, or plutobook) as a subprocess.
//!
//! ## Why a wrapper?
//!
//! The engines do the hard part, but calling them safely from a server is
//! fiddly: request parameters must be range-checked before anything is
//! spawned, uploads must land in a file the engine can open and must be
//! removed afterwards, a wedged renderer must be killed on a deadline, and a
//! "successful" exit with an empty image must still count as a failure.
//!
//! ## Pipeline Overview
//!
//! ```text
//! form fields
//!  │
//!  ├─ 1. Validate  format, width/height/quality/scale ranges, input source
//!  ├─ 2. Stage     uploads → html2image-*.html temp file (URLs pass through)
//!  ├─ 3. Select    ConverterFactory: wkhtmltox | plutobook
//!  ├─ 4. Execute   engine argv, stdout captured, killed after timeout
//!  └─ 5. Check     ≥ 100 bytes, Content-Type from the format
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use html2image::{convert, ConverterFactory, FormFields, RequestLimits};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut fields = FormFields::default();
//!     fields.set("url", "https://example.com/");
//!     fields.set("format", "pdf");
//!
//!     let request = fields.validate(&RequestLimits::default())?;
//!     let output = convert(request, &ConverterFactory::default(), "plutobook").await?;
//!     std::fs::write("example.pdf", &output.bytes)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `html2image` binary (clap + anyhow + tracing-subscriber + dotenvy) |
//!
//! Disable `cli` when embedding the router in another service:
//! ```toml
//! html2image = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod converter;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod server;
pub mod validate;

#[cfg(all(test, unix))]
mod test_support;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    ConversionOptions, ConversionOptionsBuilder, EngineSettings, OutputFormat, ServerConfig,
};
pub use convert::{convert, convert_to_file};
pub use converter::{Converter, ConverterFactory, PlutoBookConverter, WkhtmltoxConverter};
pub use error::{ErrorKind, Html2ImageError};
pub use output::{ConversionOutput, ConversionStats};
pub use pipeline::input::{InputSource, Upload};
pub use server::{router, serve, AppState};
pub use validate::{ConversionRequest, FormFields, RequestLimits};
