//! plutobook: a single binary for both raster and PDF output.

use super::{flag, Converter};
use crate::config::{ConversionOptions, EngineSettings, OutputFormat};
use crate::pipeline::exec::Invocation;
use async_trait::async_trait;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct PlutoBookConverter {
    binary: PathBuf,
    temp_dir: Option<PathBuf>,
}

impl PlutoBookConverter {
    pub const NAME: &'static str = "plutobook";

    pub fn new(settings: &EngineSettings) -> Self {
        Self {
            binary: settings.plutobook.clone(),
            temp_dir: settings.temp_dir.clone(),
        }
    }
}

impl Default for PlutoBookConverter {
    fn default() -> Self {
        Self::new(&EngineSettings::default())
    }
}

#[async_trait]
impl Converter for PlutoBookConverter {
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
        let mut inv = Invocation::new(&self.binary);

        if !format.is_raster() {
            inv = flag(inv, "--format", "pdf");
            inv = flag(inv, "--width", options.width);
            inv = flag(inv, "--scale", options.scale);
            return inv.arg(location).arg("-");
        }

        let image_format = if format == OutputFormat::Png { "png" } else { "jpeg" };
        inv = flag(inv, "--format", image_format);
        inv = flag(inv, "--width", options.width);
        inv = flag(inv, "--quality", options.quality);
        inv = flag(inv, "--scale", options.scale);
        if options.height > 0 {
            inv = flag(inv, "--height", options.height);
        }
        if options.crop {
            inv = inv.arg("--crop");
        }
        inv.arg(location).arg("-")
    }
}
