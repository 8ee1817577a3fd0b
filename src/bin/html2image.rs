//! CLI binary for html2image.
//!
//! `serve` maps flags onto `ServerConfig` and runs the HTTP server;
//! `render` performs a single conversion through the same pipeline.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use html2image::validate::{parse_url, RequestLimits};
use html2image::{
    convert, convert_to_file, ConversionOptions, ConversionRequest, ConverterFactory,
    EngineSettings, InputSource, OutputFormat, ServerConfig, Upload,
};
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Start the server on :8080
  html2image serve

  # Screenshot a page through the server
  curl -F url=https://example.com -F format=jpeg localhost:8080/screenshot -o shot.jpg

  # Upload HTML and get a PDF
  curl -F file=@page.html -F format=pdf localhost:8080/screenshot -o page.pdf

  # One-off render without the server
  html2image render https://example.com -o example.png --width 1024 --crop --height 768

  # Render a local file with plutobook
  html2image render page.html --engine plutobook --format pdf -o page.pdf

FORM FIELDS (POST /screenshot):
  file     HTML upload (wins over url)
  url      http(s) URL to render
  format   png (default), jpg, jpeg, pdf
  width    0-10000, default 1280      height   0-10000, 0 = full page
  quality  1-100, default 100         scale    1-1000 percent, default 100
  crop     true/1 to crop to width x height
  timeout  seconds, 1 to --max-timeout
  engine   wkhtmltox or plutobook; unknown names fall back to wkhtmltox

ENVIRONMENT VARIABLES:
  HTML2IMAGE_HOST, HTML2IMAGE_PORT, HTML2IMAGE_ENGINE, HTML2IMAGE_TIMEOUT,
  HTML2IMAGE_MAX_TIMEOUT, HTML2IMAGE_MAX_UPLOAD_MB, HTML2IMAGE_CORS,
  HTML2IMAGE_TEMP_DIR, HTML2IMAGE_WKHTMLTOIMAGE, HTML2IMAGE_WKHTMLTOPDF,
  HTML2IMAGE_PLUTOBOOK, RUST_LOG
  A .env file in the working directory is loaded first.
"#;

/// Render HTML to PNG, JPEG or PDF with wkhtmltox or plutobook.
#[derive(Parser, Debug)]
#[command(
    name = "html2image",
    version,
    about = "Render HTML to PNG, JPEG or PDF with wkhtmltox or plutobook",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "HTML2IMAGE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "HTML2IMAGE_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server.
    Serve(ServeArgs),
    /// Convert a single URL or HTML file.
    Render(RenderArgs),
}

#[derive(Args, Debug)]
struct EngineArgs {
    /// Path to the wkhtmltoimage binary.
    #[arg(long, env = "HTML2IMAGE_WKHTMLTOIMAGE", default_value = "wkhtmltoimage")]
    wkhtmltoimage: PathBuf,

    /// Path to the wkhtmltopdf binary.
    #[arg(long, env = "HTML2IMAGE_WKHTMLTOPDF", default_value = "wkhtmltopdf")]
    wkhtmltopdf: PathBuf,

    /// Path to the plutobook binary.
    #[arg(long, env = "HTML2IMAGE_PLUTOBOOK", default_value = "plutobook")]
    plutobook: PathBuf,

    /// Directory for staged HTML uploads (default: system temp dir).
    #[arg(long, env = "HTML2IMAGE_TEMP_DIR")]
    temp_dir: Option<PathBuf>,
}

impl From<&EngineArgs> for EngineSettings {
    fn from(a: &EngineArgs) -> Self {
        EngineSettings {
            wkhtmltoimage: a.wkhtmltoimage.clone(),
            wkhtmltopdf: a.wkhtmltopdf.clone(),
            plutobook: a.plutobook.clone(),
            temp_dir: a.temp_dir.clone(),
        }
    }
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Interface to bind.
    #[arg(long, env = "HTML2IMAGE_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on.
    #[arg(short, long, env = "HTML2IMAGE_PORT", default_value_t = 8080)]
    port: u16,

    /// Engine for requests that don't name one.
    #[arg(long, env = "HTML2IMAGE_ENGINE", default_value = "wkhtmltox")]
    default_engine: String,

    /// Engine deadline in seconds when a request has no `timeout`.
    #[arg(long, env = "HTML2IMAGE_TIMEOUT", default_value_t = 30,
          value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    /// Largest `timeout` a request may ask for, in seconds.
    #[arg(long, env = "HTML2IMAGE_MAX_TIMEOUT", default_value_t = 300,
          value_parser = clap::value_parser!(u64).range(1..))]
    max_timeout: u64,

    /// Request body limit in MiB.
    #[arg(long, env = "HTML2IMAGE_MAX_UPLOAD_MB", default_value_t = 32)]
    max_upload_mb: usize,

    /// Send permissive CORS headers.
    #[arg(long, env = "HTML2IMAGE_CORS")]
    cors: bool,

    #[command(flatten)]
    engines: EngineArgs,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// http(s) URL or local HTML file.
    input: String,

    /// Write the result to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format: png, jpg, jpeg, pdf.
    #[arg(long, default_value = "png")]
    format: String,

    /// Engine: wkhtmltox or plutobook.
    #[arg(long, env = "HTML2IMAGE_ENGINE", default_value = "wkhtmltox")]
    engine: String,

    /// Viewport width in pixels (0 = engine default).
    #[arg(long, default_value_t = 1280)]
    width: i64,

    /// Viewport height in pixels (0 = full page).
    #[arg(long, default_value_t = 0)]
    height: i64,

    /// Image quality 1-100.
    #[arg(long, default_value_t = 100)]
    quality: i64,

    /// Zoom in percent.
    #[arg(long, default_value_t = 100)]
    scale: i64,

    /// Crop to width x height.
    #[arg(long)]
    crop: bool,

    /// Engine deadline in seconds.
    #[arg(long, env = "HTML2IMAGE_TIMEOUT", default_value_t = 30)]
    timeout: u64,

    /// Print conversion stats as JSON on stdout instead of the bytes.
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    engines: EngineArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Serve(args) => serve(args).await,
        Command::Render(args) => render(args, cli.quiet).await,
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    if args.timeout > args.max_timeout {
        anyhow::bail!(
            "--timeout ({}) must not exceed --max-timeout ({})",
            args.timeout,
            args.max_timeout
        );
    }

    let config = ServerConfig {
        host: args.host,
        port: args.port,
        default_engine: args.default_engine,
        default_timeout_secs: args.timeout,
        max_timeout_secs: args.max_timeout,
        max_upload_bytes: args.max_upload_mb.saturating_mul(1024 * 1024),
        cors: args.cors,
        engines: EngineSettings::from(&args.engines),
    };

    html2image::serve(config).await.context("Server failed")
}

async fn render(args: RenderArgs, quiet: bool) -> Result<()> {
    if args.output.is_none() && !args.json && io::stdout().is_terminal() {
        anyhow::bail!("Refusing to write binary output to a terminal; use -o <FILE> or redirect");
    }

    let request = build_request(&args).await?;
    let factory = ConverterFactory::new(&EngineSettings::from(&args.engines));

    if let Some(ref output_path) = args.output {
        let stats = convert_to_file(request, &factory, &args.engine, output_path)
            .await
            .context("Conversion failed")?;

        if args.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&stats).context("Failed to serialise stats")?
            );
        } else if !quiet {
            eprintln!(
                "{}  {} via {}  {}  {}ms  →  {}",
                green("✔"),
                stats.format,
                stats.engine,
                dim(&format!("{} bytes", stats.bytes)),
                stats.duration_ms,
                bold(&output_path.display().to_string()),
            );
        }
    } else {
        let output = convert(request, &factory, &args.engine)
            .await
            .context("Conversion failed")?;

        if args.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&output.stats())
                    .context("Failed to serialise stats")?
            );
        } else {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(&output.bytes)
                .context("Failed to write to stdout")?;
            handle.flush().context("Failed to write to stdout")?;
        }
    }

    Ok(())
}

/// Map CLI args onto a validated `ConversionRequest`.
async fn build_request(args: &RenderArgs) -> Result<ConversionRequest> {
    let format: OutputFormat = args.format.parse().context("Invalid --format")?;

    let limits = RequestLimits::default();
    if args.timeout == 0 || args.timeout > limits.max_timeout_secs {
        anyhow::bail!(
            "--timeout must be between 1 and {} seconds",
            limits.max_timeout_secs
        );
    }

    let options = ConversionOptions::builder()
        .width(args.width)
        .height(args.height)
        .quality(args.quality)
        .scale(args.scale)
        .crop(args.crop)
        .timeout_secs(args.timeout)
        .build()
        .context("Invalid conversion options")?;

    let lower = args.input.to_ascii_lowercase();
    let source = if lower.starts_with("http://") || lower.starts_with("https://") {
        InputSource::Url(parse_url(&args.input).context("Invalid URL")?)
    } else {
        let path = PathBuf::from(&args.input);
        let bytes = tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned());
        InputSource::Upload(Upload::new(file_name, bytes))
    };

    Ok(ConversionRequest {
        format,
        engine: Some(args.engine.clone()),
        options,
        source,
    })
}
