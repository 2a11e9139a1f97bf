use clap::Parser;
use ocr_console::api::OcrMode;
use ocr_console::{Args, Config, SessionController};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr so the screens on stdout stay clean.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if OcrMode::parse(&args.mode).is_none() {
        anyhow::bail!(
            "unknown OCR mode `{}` (expected one of: {})",
            args.mode,
            OcrMode::ALL
                .iter()
                .map(|m| m.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    let config = Config::from(args);
    tracing::info!(
        "Starting ocr-console v{} against {}",
        env!("CARGO_PKG_VERSION"),
        config.server_url
    );

    let (session, events) = SessionController::new(config);
    session.run(events).await
}
