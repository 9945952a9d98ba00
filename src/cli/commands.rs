//! Command implementation for the conversion uploader CLI
//!
//! Sets up logging, assembles configuration from the parsed arguments,
//! runs the upload pipeline and prints the summary to stdout.

use crate::app::models::UploadSummary;
use crate::app::services::batch_uploader::{BatchUploader, create_client};
use crate::app::services::pipeline::UploadPipeline;
use crate::app::services::record_validator::{RecordValidator, ValidationRules};
use crate::app::services::reporter::{render_human, render_json};
use crate::cli::args::{Args, OutputFormat};
use crate::{Error, Result};
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub summary: UploadSummary,
    pub exit_code: i32,
}

/// Exit code for a run whose summary was produced
///
/// Per-row rejections are reported, not fatal. A batch lost to a transport
/// failure or a cancelled run means some rows were never settled.
pub fn exit_code_for(summary: &UploadSummary) -> i32 {
    if summary.transport_failures > 0 || summary.cancelled {
        1
    } else {
        0
    }
}

/// Main command runner
///
/// 1. Set up logging and validate arguments
/// 2. Build static, credential and upload configuration
/// 3. Stream the input file through the pipeline
/// 4. Print the summary in the requested format
pub async fn run(args: Args, cancel: CancellationToken) -> Result<RunOutcome> {
    let start_time = Instant::now();

    setup_logging(&args)?;
    info!("Starting conversion uploader");
    debug!("Command line arguments: {:?}", args);

    args.validate()?;
    let static_config = args.static_config()?;
    let upload_config = args.upload_config()?;
    let credentials = args.credentials();
    debug!("Static configuration: {:?}", static_config);

    if upload_config.dry_run {
        warn!("Dry run: rows are validated and mapped but nothing is uploaded");
    }

    let client = create_client(&static_config, credentials, &upload_config)?;
    let uploader = BatchUploader::new(client, upload_config.max_batch_size);
    let validator = RecordValidator::new(ValidationRules {
        strict_identifiers: args.strict_identifiers,
    });
    let pipeline = UploadPipeline::new(
        static_config,
        validator,
        uploader,
        upload_config.concurrent_batches,
    )
    .with_dry_run(upload_config.dry_run)
    .with_progress(args.show_progress());

    let summary = pipeline
        .run_file(&args.input, args.delimiter_byte(), &cancel)
        .await?;

    print_summary(&summary, args.output_format)?;
    info!("Finished in {:.2?}", start_time.elapsed());

    Ok(RunOutcome {
        exit_code: exit_code_for(&summary),
        summary,
    })
}

/// Write the summary to stdout
fn print_summary(summary: &UploadSummary, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Human => print!("{}", render_human(summary)),
        OutputFormat::Json => println!("{}", render_json(summary)?),
    }
    Ok(())
}

/// Set up structured logging based on CLI arguments
///
/// Logs go to stderr so stdout carries only the summary.
fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("conversion_uploader={}", log_level)));

    let result = if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
    result.map_err(|e| Error::configuration(format!("Failed to initialise logging: {}", e)))?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::services::reporter::Reporter;

    #[test]
    fn test_exit_code_ignores_row_rejections() {
        let mut reporter = Reporter::new();
        reporter
            .record_validation_error(&crate::ValidationError::missing(2, "identifier"))
            .unwrap();
        let summary = reporter.finish(1).unwrap();
        assert_eq!(exit_code_for(&summary), 0);
    }

    #[test]
    fn test_exit_code_for_transport_failure_and_cancellation() {
        let mut reporter = Reporter::new();
        reporter
            .record_transport_failure(&[2], &Error::EmptyBatch)
            .unwrap();
        assert_eq!(exit_code_for(&reporter.finish(1).unwrap()), 1);

        let mut cancelled = Reporter::new();
        cancelled.mark_cancelled();
        assert_eq!(exit_code_for(&cancelled.finish(0).unwrap()), 1);
    }
}
