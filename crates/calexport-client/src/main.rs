//! calexport CLI entry point.

use std::process::ExitCode;

use calexport_core::{DateRange, TracingConfig, init_tracing};
use clap::Parser;
use tracing::debug;

use calexport_client::cli::{Cli, Command};
use calexport_client::config::ExportConfig;
use calexport_client::error::{ExportError, ExportResult};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracing_config = if cli.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::cli()
    }
    .with_format(cli.log_format);
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("warning: {}", e);
    }

    // both ring and aws-lc may be compiled in through the TLS stack
    let _ = rustls::crypto::ring::default_provider().install_default();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ExportResult<()> {
    let mut config = match cli.config {
        Some(ref path) => ExportConfig::load_from(path)?,
        None => ExportConfig::default(),
    };
    cli.apply_to(&mut config);
    debug!(?config, "effective configuration");

    match cli.command {
        Some(Command::Auth { force }) => calexport_client::commands::auth::run(&config, force).await,
        None => {
            let (start, end) = cli
                .date_args()
                .ok_or_else(|| ExportError::Config("START and END dates are required".to_string()))?;
            // dates are checked before any credential is touched
            let range = DateRange::parse(start, end)?;
            debug!(start = %range.start(), end = %range.end(), "export range");

            let summary =
                calexport_client::commands::export::run(&config, &range, cli.non_interactive).await?;
            debug!(rows = summary.rows(), "export complete");
            Ok(())
        }
    }
}
