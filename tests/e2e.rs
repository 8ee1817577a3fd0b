//! End-to-end tests against the real rendering engines.
//!
//! These need `wkhtmltoimage`, `wkhtmltopdf` and/or `plutobook` on `PATH`
//! (or pointed to by `HTML2IMAGE_WKHTMLTOIMAGE` etc.). They are gated behind
//! the `E2E_ENABLED` environment variable so they do not run in CI unless
//! explicitly requested.
//!
//! Run with:
//!   E2E_ENABLED=1 cargo test --test e2e -- --nocapture
//!
//! To restrict to one engine:
//!   E2E_ENABLED=1 cargo test --test e2e plutobook -- --nocapture

use html2image::{
    convert, convert_to_file, ConversionOptions, ConversionRequest, Converter, ConverterFactory,
    EngineSettings, InputSource, OutputFormat, Upload,
};
use std::path::{Path, PathBuf};

// ── Test helpers ─────────────────────────────────────────────────────────────

const PAGE: &str = r#"<!DOCTYPE html>
<html>
  <head><style>body { font-family: sans-serif; background: #fafafa; }</style></head>
  <body>
    <h1>html2image</h1>
    <p>The quick brown fox jumps over the lazy dog.</p>
    <table border="1"><tr><td>a</td><td>b</td></tr><tr><td>c</td><td>d</td></tr></table>
  </body>
</html>
"#;

fn settings() -> EngineSettings {
    let var = |name: &str, default: &str| {
        PathBuf::from(std::env::var(name).unwrap_or_else(|_| default.to_string()))
    };
    EngineSettings {
        wkhtmltoimage: var("HTML2IMAGE_WKHTMLTOIMAGE", "wkhtmltoimage"),
        wkhtmltopdf: var("HTML2IMAGE_WKHTMLTOPDF", "wkhtmltopdf"),
        plutobook: var("HTML2IMAGE_PLUTOBOOK", "plutobook"),
        temp_dir: None,
    }
}

/// Is `binary` runnable? Tries `<binary> --version`.
fn available(binary: &Path) -> bool {
    std::process::Command::new(binary)
        .arg("--version")
        .output()
        .is_ok()
}

/// Skip this test if E2E_ENABLED is not set *or* the engine binary is missing.
macro_rules! e2e_skip_unless_ready {
    ($binary:expr) => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        let b: PathBuf = $binary;
        if !available(&b) {
            println!("SKIP — engine not found: {}", b.display());
            return;
        }
    }};
}

fn upload_request(format: OutputFormat, engine: &str) -> ConversionRequest {
    ConversionRequest {
        format,
        engine: Some(engine.to_string()),
        options: ConversionOptions::default(),
        source: InputSource::Upload(Upload::new(
            Some("page.html".into()),
            PAGE.as_bytes().to_vec(),
        )),
    }
}

fn assert_magic(bytes: &[u8], format: OutputFormat) {
    let magic: &[u8] = match format {
        OutputFormat::Png => b"\x89PNG\r\n\x1a\n",
        OutputFormat::Jpg | OutputFormat::Jpeg => b"\xff\xd8\xff",
        OutputFormat::Pdf => b"%PDF-",
    };
    assert!(
        bytes.starts_with(magic),
        "[{format}] unexpected header: {:02x?}",
        &bytes[..bytes.len().min(8)]
    );
    println!("[{format}] ✓  {} bytes", bytes.len());
}

// ── wkhtmltox ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn wkhtmltox_png_from_upload() {
    e2e_skip_unless_ready!(settings().wkhtmltoimage);

    let factory = ConverterFactory::new(&settings());
    let out = convert(upload_request(OutputFormat::Png, "wkhtmltox"), &factory, "wkhtmltox")
        .await
        .expect("png conversion should succeed");

    assert_eq!(out.engine, "wkhtmltox");
    assert_eq!(out.content_type(), "image/png");
    assert_magic(&out.bytes, OutputFormat::Png);
}

#[tokio::test]
async fn wkhtmltox_jpeg_cropped() {
    e2e_skip_unless_ready!(settings().wkhtmltoimage);

    let converter = ConverterFactory::new(&settings()).create("wkhtmltox");
    let options = ConversionOptions::builder()
        .width(640)
        .height(480)
        .quality(70)
        .crop(true)
        .build()
        .unwrap();
    let out = converter
        .convert(PAGE.as_bytes().to_vec(), OutputFormat::Jpeg, &options)
        .await
        .expect("jpeg conversion should succeed");

    assert_magic(&out.bytes, OutputFormat::Jpeg);
}

#[tokio::test]
async fn wkhtmltox_pdf_to_file() {
    e2e_skip_unless_ready!(settings().wkhtmltopdf);

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("page.pdf");
    let factory = ConverterFactory::new(&settings());
    let stats = convert_to_file(
        upload_request(OutputFormat::Pdf, "wkhtmltox"),
        &factory,
        "wkhtmltox",
        &target,
    )
    .await
    .expect("pdf conversion should succeed");

    let bytes = std::fs::read(&target).unwrap();
    assert_eq!(stats.bytes, bytes.len());
    assert_magic(&bytes, OutputFormat::Pdf);
}

// ── plutobook ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn plutobook_png_from_upload() {
    e2e_skip_unless_ready!(settings().plutobook);

    let factory = ConverterFactory::new(&settings());
    let out = convert(upload_request(OutputFormat::Png, "plutobook"), &factory, "wkhtmltox")
        .await
        .expect("png conversion should succeed");

    assert_eq!(out.engine, "plutobook");
    assert_magic(&out.bytes, OutputFormat::Png);
}

#[tokio::test]
async fn plutobook_pdf_from_upload() {
    e2e_skip_unless_ready!(settings().plutobook);

    let converter = ConverterFactory::new(&settings()).create_default();
    let out = converter
        .convert(PAGE.as_bytes().to_vec(), OutputFormat::Pdf, &ConversionOptions::default())
        .await
        .expect("pdf conversion should succeed");

    assert_eq!(out.content_type(), "application/pdf");
    assert_magic(&out.bytes, OutputFormat::Pdf);
}

#[tokio::test]
async fn plutobook_is_deterministic() {
    e2e_skip_unless_ready!(settings().plutobook);

    let factory = ConverterFactory::new(&settings());
    let a = convert(upload_request(OutputFormat::Png, "plutobook"), &factory, "plutobook")
        .await
        .unwrap();
    let b = convert(upload_request(OutputFormat::Png, "plutobook"), &factory, "plutobook")
        .await
        .unwrap();
    assert_eq!(a.bytes, b.bytes, "identical input should render identically");
}
