//! wkhtmltox: `wkhtmltoimage` for raster output, `wkhtmltopdf` for PDF.

use super::{flag, Converter};
use crate::config::{ConversionOptions, EngineSettings, OutputFormat};
use crate::pipeline::exec::Invocation;
use async_trait::async_trait;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Renders through the wkhtmltox command-line tools.
#[derive(Debug, Clone)]
pub struct WkhtmltoxConverter {
    image_binary: PathBuf,
    pdf_binary: PathBuf,
    temp_dir: Option<PathBuf>,
}

impl WkhtmltoxConverter {
    pub const NAME: &'static str = "wkhtmltox";

    pub fn new(settings: &EngineSettings) -> Self {
        Self {
            image_binary: settings.wkhtmltoimage.clone(),
            pdf_binary: settings.wkhtmltopdf.clone(),
            temp_dir: settings.temp_dir.clone(),
        }
    }
}

impl Default for WkhtmltoxConverter {
    fn default() -> Self {
        Self::new(&EngineSettings::default())
    }
}

#[async_trait]
impl Converter for WkhtmltoxConverter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn temp_dir(&self) -> Option<&Path> {
        self.temp_dir.as_deref()
    }

    fn invocation(
        &self,
        location: &OsStr,
        format: OutputFormat,
        options: &ConversionOptions,
    ) -> Invocation {
        // Uploads are staged as local files, which wkhtmltox refuses to read
        // without this flag.
        let common = ["--enable-local-file-access", "--quiet"];

        if !format.is_raster() {
            return Invocation::new(&self.pdf_binary)
                .args(common)
                .arg(location)
                .arg("-");
        }

        let image_format = match format {
            OutputFormat::Png => "png",
            _ => "jpg",
        };

        let mut inv = Invocation::new(&self.image_binary).args(common);
        inv = flag(inv, "--format", image_format);
        inv = flag(inv, "--quality", options.quality);
        if options.width > 0 {
            inv = flag(inv, "--width", options.width);
        }
        if options.height > 0 {
            inv = flag(inv, "--height", options.height);
        }
        if options.scale != 100 {
            inv = flag(inv, "--zoom", options.zoom());
        }
        if options.crop {
            if options.width > 0 {
                inv = flag(inv, "--crop-w", options.width);
            }
            if options.height > 0 {
                inv = flag(inv, "--crop-h", options.height);
            }
        }
        inv.arg(location).arg("-")
    }
}
