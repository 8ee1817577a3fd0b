//! Configuration types for HTML conversion and the HTTP server.
//!
//! Per-conversion knobs live in [`ConversionOptions`], built via
//! [`ConversionOptionsBuilder`]. Process-wide settings (where the engine
//! binaries live, where uploads are staged, server limits) live in
//! [`EngineSettings`] and [`ServerConfig`]; both are constructed once at
//! startup and shared read-only between requests.

use crate::error::Html2ImageError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Default render width in pixels when the caller omits one.
pub const DEFAULT_WIDTH: i64 = 1280;
/// Default JPEG/PNG quality.
pub const DEFAULT_QUALITY: i64 = 100;
/// Default zoom, in percent.
pub const DEFAULT_SCALE: i64 = 100;
/// Default engine deadline, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Output format requested by the caller.
///
/// `Jpg` and `Jpeg` render identically; both spellings are kept so the
/// format echoed back in logs matches what the caller sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpg,
    Jpeg,
    Pdf,
}

impl OutputFormat {
    /// `Content-Type` for a response carrying this format.
    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpg | OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Pdf => "application/pdf",
        }
    }

    /// False for PDF, which engines render through a separate code path.
    pub fn is_raster(&self) -> bool {
        !matches!(self, OutputFormat::Pdf)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpg => "jpg",
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Pdf => "pdf",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = Html2ImageError;

    /// Case-insensitive; an empty string selects PNG.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "png" => Ok(OutputFormat::Png),
            "jpg" => Ok(OutputFormat::Jpg),
            "jpeg" => Ok(OutputFormat::Jpeg),
            "pdf" => Ok(OutputFormat::Pdf),
            other => Err(Html2ImageError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Options for a single conversion.
///
/// Values of zero (or below) mean "use the default" for width, quality,
/// scale and timeout; see [`ConversionOptions::normalized`]. Height 0 lets
/// the engine pick the page height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionOptions {
    /// Viewport width in pixels. Default: 1280.
    pub width: i64,
    /// Viewport height in pixels. Default: 0 (full page).
    pub height: i64,
    /// Image quality 1–100. Ignored for PDF. Default: 100.
    pub quality: i64,
    /// Zoom in percent, 100 = 1:1. Default: 100.
    pub scale: i64,
    /// Crop the image to `width` × `height`.
    pub crop: bool,
    /// Engine deadline in seconds. Default: 30.
    pub timeout_secs: u64,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: 0,
            quality: DEFAULT_QUALITY,
            scale: DEFAULT_SCALE,
            crop: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ConversionOptions {
    /// Create a new builder starting from the defaults.
    pub fn builder() -> ConversionOptionsBuilder {
        ConversionOptionsBuilder {
            options: Self::default(),
        }
    }

    /// Replace unset (≤ 0) values with their defaults.
    pub fn normalized(mut self) -> Self {
        if self.width <= 0 {
            self.width = DEFAULT_WIDTH;
        }
        if self.quality <= 0 {
            self.quality = DEFAULT_QUALITY;
        }
        if self.scale <= 0 {
            self.scale = DEFAULT_SCALE;
        }
        if self.timeout_secs == 0 {
            self.timeout_secs = DEFAULT_TIMEOUT_SECS;
        }
        self
    }

    /// Zoom factor as the engines expect it, e.g. 150 → `"1.50"`.
    pub fn zoom(&self) -> String {
        format!("{:.2}", self.scale as f64 / 100.0)
    }
}

/// Builder for [`ConversionOptions`].
#[derive(Debug)]
pub struct ConversionOptionsBuilder {
    options: ConversionOptions,
}

impl ConversionOptionsBuilder {
    pub fn width(mut self, width: i64) -> Self {
        self.options.width = width;
        self
    }

    pub fn height(mut self, height: i64) -> Self {
        self.options.height = height;
        self
    }

    pub fn quality(mut self, quality: i64) -> Self {
        self.options.quality = quality;
        self
    }

    pub fn scale(mut self, scale: i64) -> Self {
        self.options.scale = scale;
        self
    }

    pub fn crop(mut self, crop: bool) -> Self {
        self.options.crop = crop;
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.options.timeout_secs = secs;
        self
    }

    /// Build the options, checking every range the HTTP layer enforces.
    pub fn build(self) -> Result<ConversionOptions, Html2ImageError> {
        let o = &self.options;
        crate::validate::check_range("width", o.width, 0, crate::validate::MAX_DIMENSION)?;
        crate::validate::check_range("height", o.height, 0, crate::validate::MAX_DIMENSION)?;
        crate::validate::check_range("quality", o.quality, 1, 100)?;
        crate::validate::check_range("scale", o.scale, 1, crate::validate::MAX_SCALE)?;
        Ok(self.options)
    }
}

/// Where the engine executables live and where uploads are staged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub wkhtmltoimage: PathBuf,
    pub wkhtmltopdf: PathBuf,
    pub plutobook: PathBuf,
    /// Directory for staged HTML. `None` uses the system temp dir.
    pub temp_dir: Option<PathBuf>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            wkhtmltoimage: PathBuf::from("wkhtmltoimage"),
            wkhtmltopdf: PathBuf::from("wkhtmltopdf"),
            plutobook: PathBuf::from("plutobook"),
            temp_dir: None,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Engine used when a request does not name one.
    pub default_engine: String,
    /// Deadline applied when a request does not carry `timeout`.
    pub default_timeout_secs: u64,
    /// Largest `timeout` a request may ask for.
    pub max_timeout_secs: u64,
    /// Request body limit for uploads, in bytes. Default: 32 MiB.
    pub max_upload_bytes: usize,
    /// Answer cross-origin requests with permissive CORS headers.
    pub cors: bool,
    pub engines: EngineSettings,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            default_engine: "wkhtmltox".to_string(),
            default_timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_timeout_secs: 300,
            max_upload_bytes: 32 << 20,
            cors: false,
            engines: EngineSettings::default(),
        }
    }
}

impl ServerConfig {
    /// `host:port` as given, for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Per-request timeout bounds.
    pub fn request_limits(&self) -> crate::validate::RequestLimits {
        crate::validate::RequestLimits {
            default_timeout_secs: self.default_timeout_secs,
            max_timeout_secs: self.max_timeout_secs,
        }
    }
}
