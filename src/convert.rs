//! Request-level entry points.
//!
//! These tie validation output to a converter: pick the engine, dispatch on
//! the input source, and hand back the checked result. The HTTP handler and
//! the `render` subcommand both go through [`convert`].

use crate::converter::ConverterFactory;
use crate::error::{Html2ImageError, Result};
use crate::output::{ConversionOutput, ConversionStats};
use crate::pipeline::input::{resolve_input, InputSource};
use crate::validate::ConversionRequest;
use std::path::Path;
use tracing::{info, warn};

/// Run a validated request.
///
/// `default_engine` is used when the request does not name one. Uploads are
/// staged and removed again before this returns.
pub async fn convert(
    request: ConversionRequest,
    factory: &ConverterFactory,
    default_engine: &str,
) -> Result<ConversionOutput> {
    let engine = request.engine.as_deref().unwrap_or(default_engine);
    let converter = factory.create(engine);

    match &request.source {
        InputSource::Upload(upload) => info!(
            engine = converter.name(),
            format = %request.format,
            file_name = upload.file_name.as_deref().unwrap_or("-"),
            size = upload.bytes.len(),
            "Converting upload"
        ),
        InputSource::Url(url) => info!(
            engine = converter.name(),
            format = %request.format,
            url = %url,
            "Converting URL"
        ),
    }

    let input = resolve_input(request.source, converter.temp_dir()).await?;
    let result = converter
        .convert_url(input.location(), request.format, &request.options)
        .await;

    if let Some(path) = input.staged_path().map(Path::to_path_buf) {
        if let Err(e) = input.close() {
            warn!(path = %path.display(), error = %e, "Failed to remove staged HTML");
        }
    }
    result
}

/// Run a request and write the result to `output_path`.
///
/// Uses atomic write (temp file + rename) so a failed or interrupted run
/// never leaves a truncated image behind.
pub async fn convert_to_file(
    request: ConversionRequest,
    factory: &ConverterFactory,
    default_engine: &str,
    output_path: impl AsRef<Path>,
) -> Result<ConversionStats> {
    let output = convert(request, factory, default_engine).await?;
    let path = output_path.as_ref();
    let write_err = |source| Html2ImageError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = std::path::PathBuf::from(tmp_name);

    tokio::fs::write(&tmp_path, &output.bytes)
        .await
        .map_err(write_err)?;
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_err(e));
    }

    Ok(output.stats())
}
