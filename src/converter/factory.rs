//! Name → converter lookup.
//!
//! The table is built once from [`EngineSettings`] and shared read-only.
//! Lookups never fail: an unknown name resolves to wkhtmltox, the engine the
//! server has always shipped with, and the fallback is logged.

use super::{Converter, PlutoBookConverter, WkhtmltoxConverter};
use crate::config::EngineSettings;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Engine returned for names that are not registered.
pub const FALLBACK_CONVERTER: &str = WkhtmltoxConverter::NAME;
/// Engine returned by [`ConverterFactory::create_default`].
pub const DEFAULT_CONVERTER: &str = PlutoBookConverter::NAME;

/// Lookup table of available converters.
#[derive(Clone)]
pub struct ConverterFactory {
    converters: HashMap<&'static str, Arc<dyn Converter>>,
    fallback: Arc<dyn Converter>,
}

impl ConverterFactory {
    /// Register wkhtmltox and plutobook using the given binaries.
    pub fn new(settings: &EngineSettings) -> Self {
        let wkhtmltox: Arc<dyn Converter> = Arc::new(WkhtmltoxConverter::new(settings));
        let plutobook: Arc<dyn Converter> = Arc::new(PlutoBookConverter::new(settings));

        let mut converters = HashMap::new();
        converters.insert(wkhtmltox.name(), Arc::clone(&wkhtmltox));
        converters.insert(plutobook.name(), plutobook);

        Self {
            converters,
            fallback: wkhtmltox,
        }
    }

    /// Add or replace a converter under its own name.
    pub fn with_converter(mut self, converter: Arc<dyn Converter>) -> Self {
        if converter.name() == FALLBACK_CONVERTER {
            self.fallback = Arc::clone(&converter);
        }
        self.converters.insert(converter.name(), converter);
        self
    }

    /// Exact (case-insensitive) lookup.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Converter>> {
        let name = name.trim().to_ascii_lowercase();
        self.converters.get(name.as_str()).cloned()
    }

    /// Look up `name`, falling back to wkhtmltox for unknown names.
    pub fn create(&self, name: &str) -> Arc<dyn Converter> {
        self.get(name).unwrap_or_else(|| {
            debug!(
                requested = name,
                fallback = FALLBACK_CONVERTER,
                "Unknown converter, using fallback"
            );
            Arc::clone(&self.fallback)
        })
    }

    /// The library's preferred engine (plutobook).
    pub fn create_default(&self) -> Arc<dyn Converter> {
        self.create(DEFAULT_CONVERTER)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.converters.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for ConverterFactory {
    fn default() -> Self {
        Self::new(&EngineSettings::default())
    }
}

impl std::fmt::Debug for ConverterFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConverterFactory")
            .field("converters", &self.names())
            .field("fallback", &self.fallback.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConversionOptions, OutputFormat};
    use crate::pipeline::exec::Invocation;
    use async_trait::async_trait;
    use std::ffi::OsStr;

    #[test]
    fn creates_by_name() {
        let factory = ConverterFactory::default();
        assert_eq!(factory.create("plutobook").name(), "plutobook");
        assert_eq!(factory.create("wkhtmltox").name(), "wkhtmltox");
        assert_eq!(factory.create(" PlutoBook ").name(), "plutobook");
    }

    #[test]
    fn default_is_plutobook() {
        assert_eq!(ConverterFactory::default().create_default().name(), "plutobook");
    }

    #[test]
    fn unknown_falls_back_to_wkhtmltox() {
        let factory = ConverterFactory::default();
        assert_eq!(factory.create("unknown").name(), "wkhtmltox");
        assert_eq!(factory.create("").name(), "wkhtmltox");
        assert!(factory.get("unknown").is_none());
    }

    #[test]
    fn names_are_sorted() {
        assert_eq!(ConverterFactory::default().names(), ["plutobook", "wkhtmltox"]);
    }

    struct Echo;

    #[async_trait]
    impl Converter for Echo {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn invocation(
            &self,
            location: &OsStr,
            _format: OutputFormat,
            _options: &ConversionOptions,
        ) -> Invocation {
            Invocation::new("echo").arg(location)
        }
    }

    #[test]
    fn custom_converters_can_be_registered() {
        let factory = ConverterFactory::default().with_converter(Arc::new(Echo));
        assert_eq!(factory.create("echo").name(), "echo");
        assert_eq!(factory.names(), ["echo", "plutobook", "wkhtmltox"]);
    }
}
