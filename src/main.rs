use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use vouchmark::config::Config;
use vouchmark::fetcher::AssetFetcher;
use vouchmark::metrics::Metrics;

/// Vouchmark - proof watermarking service daemon
///
/// Hosts the liveness/metrics endpoint and validates deployment
/// configuration. The chat-platform gateway embeds the vouchmark library
/// and drives the submission pipeline through it.
#[derive(Parser, Debug)]
#[command(name = "vouchmark")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Test configuration and exit
    #[arg(long)]
    test: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    vouchmark::logging::init_subscriber()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    let args = Args::parse();

    let config = Config::from_file(&args.config)
        .map_err(|e| anyhow::anyhow!(e))
        .with_context(|| format!("loading {}", args.config.display()))?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    if args.test {
        println!("Configuration OK");
        return Ok(());
    }

    tracing::info!(
        config_file = %args.config.display(),
        allowed_channel = config.service.allowed_channel_id,
        role_restricted = config.gate().required_role.is_some(),
        width_divisor = config.watermark.width_divisor,
        width_floor = config.watermark.width_floor,
        opacity = config.watermark.opacity,
        "Configuration loaded successfully"
    );

    // Fail fast if the HTTP client (TLS backend) cannot initialize; the
    // gateway would otherwise only discover this on the first submission.
    AssetFetcher::new(config.fetch_timeout()).map_err(|e| anyhow::anyhow!(e))?;

    let metrics = Arc::new(Metrics::new());

    let listener = vouchmark::server::bind(&config.health.address, config.health.port)
        .await
        .with_context(|| {
            format!(
                "binding health listener on {}:{}",
                config.health.address, config.health.port
            )
        })?;
    tracing::info!(
        address = %config.health.address,
        port = config.health.port,
        "Starting liveness/metrics listener"
    );

    let serve_metrics = Arc::clone(&metrics);
    tokio::spawn(async move {
        if let Err(e) = vouchmark::server::serve(listener, serve_metrics).await {
            tracing::error!(error = %e, "health listener terminated");
        }
    });

    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;
    tracing::info!("Shutting down");

    Ok(())
}
