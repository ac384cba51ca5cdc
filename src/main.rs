use anyhow::{bail, Context, Result};
use clap::Parser;
use opentelemetry_proto::tonic::collector::logs::v1::ExportLogsServiceRequest;
use opentelemetry_proto::tonic::collector::metrics::v1::ExportMetricsServiceRequest;
use opentelemetry_proto::tonic::collector::trace::v1::ExportTraceServiceRequest;
use otlp2columnar::otlp2columnar_config::RuntimeConfig;
use otlp2columnar::otlp2columnar_core::SignalType;
use otlp2columnar::{CancellationToken, ExportError, ExportSummary, Exporter};
use prost::Message;
use std::path::{Path, PathBuf};
use tokio::signal;
use tracing::{error, info};

/// Load OTLP protobuf export requests into a column store
#[derive(Parser)]
#[command(name = "otlp2columnar")]
#[command(version)]
#[command(about = "Flatten OTLP export requests and bulk-load them into a column store", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short = 'v', long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Signal carried by the input files: logs, traces, metrics
    #[arg(short, long, value_name = "SIGNAL")]
    signal: SignalType,

    /// Binary protobuf ExportServiceRequest files
    #[arg(required = true, value_name = "FILE")]
    files: Vec<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?
        .block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    let mut config = if let Some(config_path) = &cli.config {
        RuntimeConfig::load_from_path(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        RuntimeConfig::load_or_default().context("Failed to load configuration")?
    };

    // CLI overrides have the highest priority
    if let Some(level) = &cli.log_level {
        config.log.level = level.clone();
    }

    otlp2columnar::init_tracing(&config);
    let exporter = otlp2columnar::init_exporter(&config)?;

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_shutdown(cancel.clone()));

    let mut failed = 0usize;
    for path in &cli.files {
        if cancel.is_cancelled() {
            break;
        }

        match export_file(&exporter, cli.signal, path, &cancel).await {
            Ok(summary) => info!(
                file = %path.display(),
                records = summary.records,
                rows = summary.rows,
                tables = summary.tables,
                "Exported file"
            ),
            Err(e) => {
                failed += 1;
                error!(file = %path.display(), "{:#}", e);
            }
        }
    }

    if cancel.is_cancelled() {
        bail!("Export cancelled");
    }
    if failed > 0 {
        bail!("{} of {} files failed to export", failed, cli.files.len());
    }
    Ok(())
}

async fn export_file(
    exporter: &Exporter,
    signal: SignalType,
    path: &Path,
    cancel: &CancellationToken,
) -> Result<ExportSummary> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;

    let result: std::result::Result<ExportSummary, ExportError> = match signal {
        SignalType::Logs => {
            let request = ExportLogsServiceRequest::decode(bytes.as_slice())
                .context("Failed to decode logs export request")?;
            exporter.export_logs(&request, cancel).await
        }
        SignalType::Traces => {
            let request = ExportTraceServiceRequest::decode(bytes.as_slice())
                .context("Failed to decode traces export request")?;
            exporter.export_traces(&request, cancel).await
        }
        SignalType::Metrics => {
            let request = ExportMetricsServiceRequest::decode(bytes.as_slice())
                .context("Failed to decode metrics export request")?;
            exporter.export_metrics(&request, cancel).await
        }
    };

    Ok(result?)
}

/// Cancel pending exports on Ctrl+C or SIGTERM
async fn cancel_on_shutdown(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, cancelling export...");
        },
        _ = terminate => {
            info!("Received SIGTERM, cancelling export...");
        },
    }
    cancel.cancel();
}
