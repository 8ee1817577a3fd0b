//! Input resolution: turn an upload or URL into something an engine can open.
//!
//! ## Why stage uploads on disk?
//!
//! None of the engines read HTML from stdin reliably, and wkhtmltox resolves
//! relative resources against the document location. Writing the upload to a
//! `NamedTempFile` gives every engine a real path, and the file is unlinked
//! when [`ResolvedInput`] is dropped: on success, on error, and while
//! unwinding from a panic.

use crate::error::{Html2ImageError, Result};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Prefix of every staged file name.
pub const TEMP_PREFIX: &str = "html2image-";

/// An uploaded HTML document.
#[derive(Clone)]
pub struct Upload {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: Option<String>, bytes: Vec<u8>) -> Self {
        Self { file_name, bytes }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for Upload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Upload")
            .field("file_name", &self.file_name)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Where the HTML comes from.
#[derive(Debug, Clone)]
pub enum InputSource {
    Upload(Upload),
    Url(String),
}

/// An input the engine can open: either a remote URL or a staged file.
pub enum ResolvedInput {
    /// Passed to the engine untouched.
    Remote(String),
    /// HTML written to a temp file; the file lives as long as this value.
    Staged { path: PathBuf, _file: NamedTempFile },
}

impl ResolvedInput {
    /// The argument to hand to the engine.
    pub fn location(&self) -> &OsStr {
        match self {
            ResolvedInput::Remote(url) => OsStr::new(url),
            ResolvedInput::Staged { path, .. } => path.as_os_str(),
        }
    }

    /// Remove a staged file now, reporting failures instead of ignoring them.
    pub fn close(self) -> std::io::Result<()> {
        match self {
            ResolvedInput::Remote(_) => Ok(()),
            ResolvedInput::Staged { _file, .. } => _file.close(),
        }
    }

    /// Path of the staged file, if there is one.
    pub fn staged_path(&self) -> Option<&Path> {
        match self {
            ResolvedInput::Remote(_) => None,
            ResolvedInput::Staged { path, .. } => Some(path),
        }
    }
}

/// Write `html` to a uniquely named `html2image-*.html` file.
///
/// `dir` overrides the system temp directory. The write happens on the
/// blocking pool so large uploads don't stall a runtime worker.
pub async fn stage_html(html: Vec<u8>, dir: Option<&Path>) -> Result<ResolvedInput> {
    let dir = dir.map(Path::to_path_buf);

    let file = tokio::task::spawn_blocking(move || -> std::io::Result<NamedTempFile> {
        use std::io::Write;

        let mut builder = tempfile::Builder::new();
        builder.prefix(TEMP_PREFIX).suffix(".html");
        let mut file = match dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        file.write_all(&html)?;
        file.flush()?;
        Ok(file)
    })
    .await
    .map_err(|e| Html2ImageError::Internal(format!("staging task panicked: {e}")))?
    .map_err(|source| Html2ImageError::TempFile { source })?;

    let path = file.path().to_path_buf();
    debug!("Staged HTML at {}", path.display());

    Ok(ResolvedInput::Staged { path, _file: file })
}

/// Resolve a validated [`InputSource`].
pub async fn resolve_input(source: InputSource, dir: Option<&Path>) -> Result<ResolvedInput> {
    match source {
        InputSource::Url(url) => Ok(ResolvedInput::Remote(url)),
        InputSource::Upload(upload) => stage_html(upload.bytes, dir).await,
    }
}
