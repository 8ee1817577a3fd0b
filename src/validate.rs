//! Request validation: raw form strings in, a typed [`ConversionRequest`] out.
//!
//! Integer fields are lenient on *parsing* and strict on *range*: an empty or
//! unparseable value silently becomes the field's default, but a value that
//! parses and lands outside its range is rejected. Nothing here touches the
//! filesystem or spawns a process, so a rejected request never costs more
//! than the string work.

use crate::config::{
    ConversionOptions, OutputFormat, DEFAULT_QUALITY, DEFAULT_SCALE, DEFAULT_TIMEOUT_SECS,
    DEFAULT_WIDTH,
};
use crate::error::{Html2ImageError, Result};
use crate::pipeline::input::{InputSource, Upload};
use url::Url;

/// Upper bound for width and height.
pub const MAX_DIMENSION: i64 = 10_000;
/// Upper bound for scale, in percent.
pub const MAX_SCALE: i64 = 1000;

/// Bounds on the per-request `timeout` field.
#[derive(Debug, Clone, Copy)]
pub struct RequestLimits {
    pub default_timeout_secs: u64,
    pub max_timeout_secs: u64,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            default_timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_timeout_secs: 300,
        }
    }
}

/// Form fields exactly as the client sent them.
#[derive(Debug, Clone, Default)]
pub struct FormFields {
    pub format: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub quality: Option<String>,
    pub scale: Option<String>,
    pub crop: Option<String>,
    pub timeout: Option<String>,
    pub engine: Option<String>,
    pub url: Option<String>,
    pub file: Option<Upload>,
}

impl FormFields {
    /// Record a text field. Unknown names are ignored; the first value wins.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let slot = match name {
            "format" => &mut self.format,
            "width" => &mut self.width,
            "height" => &mut self.height,
            "quality" => &mut self.quality,
            "scale" => &mut self.scale,
            "crop" => &mut self.crop,
            "timeout" => &mut self.timeout,
            "engine" => &mut self.engine,
            "url" => &mut self.url,
            _ => return,
        };
        if slot.is_none() {
            *slot = Some(value.into());
        }
    }

    /// Validate every field and pick the input source.
    ///
    /// Check order: format, numeric ranges, timeout, then input source. An
    /// upload takes precedence over `url` when both are present.
    pub fn validate(self, limits: &RequestLimits) -> Result<ConversionRequest> {
        let format: OutputFormat = self.format.as_deref().unwrap_or("").parse()?;

        let width = parse_int(self.width.as_deref(), DEFAULT_WIDTH);
        let height = parse_int(self.height.as_deref(), 0);
        let quality = parse_int(self.quality.as_deref(), DEFAULT_QUALITY);
        let scale = parse_int(self.scale.as_deref(), DEFAULT_SCALE);

        let options = ConversionOptions::builder()
            .width(width)
            .height(height)
            .quality(quality)
            .scale(scale)
            .crop(parse_bool(self.crop.as_deref()))
            .timeout_secs(parse_timeout(self.timeout.as_deref(), limits)?)
            .build()?;

        let engine = self
            .engine
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());

        let source = match (self.file, self.url) {
            (Some(upload), _) if !upload.is_empty() => InputSource::Upload(upload),
            (_, Some(url)) if !url.trim().is_empty() => InputSource::Url(parse_url(&url)?),
            _ => return Err(Html2ImageError::MissingInput),
        };

        Ok(ConversionRequest {
            format,
            engine,
            options,
            source,
        })
    }
}

/// A fully validated conversion request.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub format: OutputFormat,
    /// Engine name as sent by the client, if any.
    pub engine: Option<String>,
    pub options: ConversionOptions,
    pub source: InputSource,
}

/// Parse an integer, falling back to `default` for empty or malformed input.
pub fn parse_int(value: Option<&str>, default: i64) -> i64 {
    match value.map(str::trim) {
        None | Some("") => default,
        Some(s) => s.parse().unwrap_or(default),
    }
}

/// `true` and `1` (any case) are true; anything else is false.
pub fn parse_bool(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("true") | Some("1")
    )
}

/// Reject `value` unless `min <= value <= max`.
pub fn check_range(field: &'static str, value: i64, min: i64, max: i64) -> Result<()> {
    if value < min || value > max {
        return Err(Html2ImageError::OutOfRange { field, min, max });
    }
    Ok(())
}

fn parse_timeout(value: Option<&str>, limits: &RequestLimits) -> Result<u64> {
    let default = i64::try_from(limits.default_timeout_secs).unwrap_or(i64::MAX);
    let max = i64::try_from(limits.max_timeout_secs).unwrap_or(i64::MAX);
    let secs = parse_int(value, default);
    check_range("timeout", secs, 1, max)?;
    Ok(secs as u64)
}

/// Accept only absolute http(s) URLs. Anything else would let a client hand
/// the engine a local path or something that parses as a flag.
pub fn parse_url(raw: &str) -> Result<String> {
    let raw = raw.trim();
    let parsed = Url::parse(raw).map_err(|e| Html2ImageError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed.to_string()),
        other => Err(Html2ImageError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("scheme '{other}' is not allowed, use http or https"),
        }),
    }
}
