use crate::api::OcrMode;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "ocr-console")]
#[command(about = "Interactive terminal client for a DeepSeek-OCR server")]
#[command(version)]
pub struct Args {
    /// Base URL of the OCR server
    #[arg(long, env = "OCR_SERVER_URL", default_value = "http://127.0.0.1:8000")]
    pub server: String,

    /// Default OCR mode (free_ocr, markdown, grounding, parse_figure, detailed)
    #[arg(long, env = "OCR_MODE", default_value = "markdown")]
    pub mode: String,

    /// Directory where `save` writes result files
    #[arg(long, env = "OCR_OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Maximum file size in bytes (default: 10MB)
    #[arg(long, env = "OCR_MAX_FILE_SIZE", default_value = "10485760")]
    pub max_file_size: u64,

    /// Seconds between background health checks
    #[arg(long, env = "OCR_HEALTH_INTERVAL", default_value = "10")]
    pub health_interval_secs: u64,

    /// Seconds between model-download progress checks
    #[arg(long, env = "OCR_PROGRESS_INTERVAL", default_value = "2")]
    pub progress_interval_secs: u64,

    /// Start in demo mode (no OCR requests hit the server)
    #[arg(long)]
    pub demo: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server_url: String,
    pub default_mode: OcrMode,
    pub output_dir: PathBuf,
    pub max_file_size: u64,
    pub health_interval: Duration,
    pub progress_interval: Duration,
    /// Simulated processing delay for demo-mode submissions.
    pub demo_delay: Duration,
    pub demo: bool,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            server_url: args.server.trim_end_matches('/').to_string(),
            default_mode: OcrMode::parse(&args.mode).unwrap_or_default(),
            output_dir: args.output_dir,
            max_file_size: args.max_file_size,
            health_interval: Duration::from_secs(args.health_interval_secs),
            progress_interval: Duration::from_secs(args.progress_interval_secs),
            demo_delay: Duration::from_millis(2500),
            demo: args.demo,
        }
    }
}
