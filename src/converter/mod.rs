//! Converter strategies: one implementation per external rendering engine.
//!
//! A [`Converter`] only has to say what it is called and how to turn a
//! location, format and options into an [`Invocation`]. Staging uploads,
//! applying defaults, running under a deadline and rejecting undersized output
//! are the same for every engine and live in the provided methods.
//!
//! ```text
//! convert(html) ──stage──▶ convert_url(path) ──invocation──▶ exec::run ──▶ ConversionOutput
//! ```

pub mod factory;
pub mod plutobook;
pub mod wkhtmltox;

pub use factory::ConverterFactory;
pub use plutobook::PlutoBookConverter;
pub use wkhtmltox::WkhtmltoxConverter;

use crate::config::{ConversionOptions, OutputFormat};
use crate::error::Result;
use crate::output::ConversionOutput;
use crate::pipeline::exec::{self, Invocation};
use crate::pipeline::input;
use async_trait::async_trait;
use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// An HTML renderer backed by an external executable.
#[async_trait]
pub trait Converter: Send + Sync {
    /// Registry name, e.g. `"wkhtmltox"`.
    fn name(&self) -> &'static str;

    /// Build the command line for rendering `location` as `format`.
    ///
    /// `options` have already been [normalized](ConversionOptions::normalized).
    fn invocation(
        &self,
        location: &OsStr,
        format: OutputFormat,
        options: &ConversionOptions,
    ) -> Invocation;

    /// Directory uploads are staged in; `None` means the system temp dir.
    fn temp_dir(&self) -> Option<&Path> {
        None
    }

    /// Render an HTML document held in memory.
    ///
    /// The document is written to a temp file which is removed before this
    /// returns, whatever the outcome.
    async fn convert(
        &self,
        html: Vec<u8>,
        format: OutputFormat,
        options: &ConversionOptions,
    ) -> Result<ConversionOutput> {
        let staged = input::stage_html(html, self.temp_dir()).await?;
        self.convert_url(staged.location(), format, options).await
    }

    /// Render a URL or local path.
    async fn convert_url(
        &self,
        location: &OsStr,
        format: OutputFormat,
        options: &ConversionOptions,
    ) -> Result<ConversionOutput> {
        let options = options.normalized();
        let invocation = self.invocation(location, format, &options);
        let deadline = Duration::from_secs(options.timeout_secs);

        let process = exec::run(self.name(), &invocation, deadline).await?;
        let output = ConversionOutput::from_process(self.name(), format, process)?;

        info!(
            engine = self.name(),
            %format,
            bytes = output.bytes.len(),
            duration_ms = output.duration_ms,
            "Conversion complete"
        );
        Ok(output)
    }
}

/// Push `--flag value` onto an invocation.
pub(crate) fn flag(invocation: Invocation, name: &str, value: impl ToString) -> Invocation {
    invocation.arg(name).arg(value.to_string())
}
