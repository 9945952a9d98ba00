//! Upload pipeline orchestration
//!
//! Wires the stages together for one run: rows are read lazily, validated,
//! mapped, grouped into batches of at most the configured size and handed to
//! the [`BatchUploader`]. Up to `concurrent_batches` uploads run at once;
//! their outcomes are merged into the [`Reporter`] by source row, so the
//! summary does not depend on completion order.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use conversion_uploader::app::services::batch_uploader::{BatchUploader, DryRunClient};
//! use conversion_uploader::app::services::pipeline::UploadPipeline;
//! use conversion_uploader::app::services::record_validator::RecordValidator;
//! use conversion_uploader::config::StaticConfig;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> conversion_uploader::Result<()> {
//! let config = StaticConfig::new("1234567890", "987654321", "USD")?;
//! let uploader = BatchUploader::new(Arc::new(DryRunClient), 2000);
//! let pipeline = UploadPipeline::new(config, RecordValidator::default(), uploader, 1);
//!
//! let summary = pipeline
//!     .run_file(std::path::Path::new("conversions.csv"), b',', &CancellationToken::new())
//!     .await?;
//! println!("{} of {} rows uploaded", summary.succeeded, summary.total);
//! # Ok(())
//! # }
//! ```

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::app::models::{BatchResult, ConversionEvent, UploadSummary};
use crate::app::services::batch_uploader::BatchUploader;
use crate::app::services::conversion_mapper::map_record;
use crate::app::services::record_parser::RecordReader;
use crate::app::services::record_validator::RecordValidator;
use crate::app::services::reporter::Reporter;
use crate::config::StaticConfig;
use crate::{Error, Result};

/// Reason recorded for validated rows that never reached the remote
const CANCELLED_REASON: &str = "run cancelled";

/// A finished upload task: the rows it carried and what happened to them
struct BatchCompletion {
    rows: Vec<u64>,
    result: Result<BatchResult>,
}

type InFlight = FuturesUnordered<JoinHandle<BatchCompletion>>;

/// Runs a whole upload from input rows to summary
#[derive(Clone)]
pub struct UploadPipeline {
    config: StaticConfig,
    validator: RecordValidator,
    uploader: BatchUploader,
    concurrent_batches: usize,
    dry_run: bool,
    show_progress: bool,
}

impl UploadPipeline {
    /// Create a pipeline; batch size comes from the uploader
    pub fn new(
        config: StaticConfig,
        validator: RecordValidator,
        uploader: BatchUploader,
        concurrent_batches: usize,
    ) -> Self {
        Self {
            config,
            validator,
            uploader,
            concurrent_batches: concurrent_batches.max(1),
            dry_run: false,
            show_progress: false,
        }
    }

    /// Mark the summary as a dry run
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Show a spinner with the running row count
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Open `path` and run the pipeline over it
    pub async fn run_file(
        &self,
        path: &Path,
        delimiter: u8,
        cancel: &CancellationToken,
    ) -> Result<UploadSummary> {
        info!("Reading conversions from {}", path.display());
        let reader = RecordReader::open_with_delimiter(path, delimiter)?;
        self.run(reader, cancel).await
    }

    /// Run the pipeline over an open reader
    ///
    /// File-level errors abort the run after in-flight batches settle.
    /// Cancellation stops reading and submitting; batches already sent are
    /// awaited and pending rows are reported as not submitted.
    pub async fn run<R: Read>(
        &self,
        reader: RecordReader<R>,
        cancel: &CancellationToken,
    ) -> Result<UploadSummary> {
        let batch_size = self.uploader.max_batch_size();
        let progress = self.create_progress_bar();
        let mut reporter = Reporter::new().with_dry_run(self.dry_run);
        let mut in_flight = InFlight::new();
        let mut pending: Vec<ConversionEvent> = Vec::with_capacity(batch_size);
        let mut total = 0usize;
        let mut fatal = None;
        let mut cancelled = false;

        for row in reader {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    fatal = Some(e);
                    break;
                }
            };
            total += 1;
            progress.inc(1);

            match self.validator.validate(&row) {
                Err(validation_error) => {
                    debug!("Skipping {}", validation_error);
                    reporter.record_validation_error(&validation_error)?;
                }
                Ok(record) => {
                    pending.push(map_record(&record, &self.config));
                    if pending.len() >= batch_size {
                        let batch = std::mem::replace(&mut pending, Vec::with_capacity(batch_size));
                        if !self
                            .submit_when_ready(batch, cancel, &mut in_flight, &mut reporter)
                            .await?
                        {
                            cancelled = true;
                            break;
                        }
                    }
                }
            }
        }

        if let Some(e) = fatal {
            error!("Aborting run: {}", e);
            progress.finish_and_clear();
            self.drain(&mut in_flight, &mut reporter).await?;
            return Err(e);
        }

        if !pending.is_empty()
            && !self
                .submit_when_ready(pending, cancel, &mut in_flight, &mut reporter)
                .await?
        {
            cancelled = true;
        }

        self.drain(&mut in_flight, &mut reporter).await?;
        progress.finish_and_clear();

        if cancelled {
            reporter.mark_cancelled();
        }
        let summary = reporter.finish(total)?;
        info!(
            "Run complete: {} rows, {} succeeded, {} failed, {} skipped",
            summary.total, summary.succeeded, summary.failed, summary.skipped_validation
        );
        Ok(summary)
    }

    /// Submit `batch` once an upload slot is free
    ///
    /// Returns `false` when the run was cancelled before the batch could be
    /// sent; its rows are then recorded as not submitted.
    async fn submit_when_ready(
        &self,
        batch: Vec<ConversionEvent>,
        cancel: &CancellationToken,
        in_flight: &mut InFlight,
        reporter: &mut Reporter,
    ) -> Result<bool> {
        if !cancel.is_cancelled() {
            self.wait_for_slot(in_flight, reporter).await?;
        }
        if cancel.is_cancelled() {
            let rows: Vec<u64> = batch.iter().map(|e| e.row).collect();
            warn!("Run cancelled; {} validated rows not submitted", rows.len());
            reporter.record_not_submitted(&rows, CANCELLED_REASON)?;
            return Ok(false);
        }
        in_flight.push(self.submit(batch));
        Ok(true)
    }

    fn submit(&self, batch: Vec<ConversionEvent>) -> JoinHandle<BatchCompletion> {
        let uploader = self.uploader.clone();
        tokio::spawn(async move {
            let rows = batch.iter().map(|e| e.row).collect();
            let result = uploader.upload(&batch).await;
            BatchCompletion { rows, result }
        })
    }

    /// Block until fewer than `concurrent_batches` uploads are running
    async fn wait_for_slot(&self, in_flight: &mut InFlight, reporter: &mut Reporter) -> Result<()> {
        while in_flight.len() >= self.concurrent_batches {
            match in_flight.next().await {
                Some(joined) => record_completion(reporter, joined)?,
                None => break,
            }
        }
        Ok(())
    }

    async fn drain(&self, in_flight: &mut InFlight, reporter: &mut Reporter) -> Result<()> {
        while let Some(joined) = in_flight.next().await {
            record_completion(reporter, joined)?;
        }
        Ok(())
    }

    fn create_progress_bar(&self) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new_spinner();
        if let Ok(style) =
            ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {pos} rows read")
        {
            pb.set_style(style);
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}

fn record_completion(
    reporter: &mut Reporter,
    joined: std::result::Result<BatchCompletion, JoinError>,
) -> Result<()> {
    let completion = joined
        .map_err(|e| Error::processing_interrupted(format!("upload task failed: {}", e)))?;

    match completion.result {
        Ok(result) => reporter.record_batch(&completion.rows, &result),
        Err(e) => {
            warn!("{} rows failed without per-row results: {}", completion.rows.len(), e);
            reporter.record_transport_failure(&completion.rows, &e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TransportError;
    use crate::app::services::batch_uploader::tests::{FixedClient, MockClient};
    use crate::app::services::batch_uploader::{ConversionUploadClient, UploadResponse};
    use async_trait::async_trait;
    use std::io::Cursor;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Accepts every batch and cancels the run during the first call
    struct CancelOnFirstUpload {
        token: CancellationToken,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ConversionUploadClient for CancelOnFirstUpload {
        async fn upload_batch(
            &self,
            events: &[ConversionEvent],
            _partial_failure: bool,
        ) -> std::result::Result<UploadResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.token.cancel();
            Ok(UploadResponse::all_accepted(events.len()))
        }

        fn name(&self) -> &str {
            "cancel-on-first-upload"
        }
    }

    const CLICK_ID: &str = "CjwKCAiA1KL3BRA8EiwAzCfbQ";

    fn pipeline(client: Arc<dyn ConversionUploadClient>, batch_size: usize) -> UploadPipeline {
        let config = StaticConfig::new("1234567890", "987654321", "USD").unwrap();
        UploadPipeline::new(
            config,
            RecordValidator::default(),
            BatchUploader::new(client, batch_size),
            2,
        )
    }

    fn reader(content: &str) -> RecordReader<Cursor<Vec<u8>>> {
        RecordReader::from_reader(Cursor::new(content.as_bytes().to_vec()), "test.csv", b',').unwrap()
    }

    fn valid_rows(count: usize) -> String {
        let mut content = String::from("identifier,timestamp,value\n");
        for i in 0..count {
            content.push_str(&format!("{}{},2025-01-01T10:00:00+00:00,{}\n", CLICK_ID, i, i));
        }
        content
    }

    #[tokio::test]
    async fn test_rows_are_split_into_batches() {
        let client = Arc::new(MockClient::default());
        let summary = pipeline(client.clone(), 2)
            .run(reader(&valid_rows(5)), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(summary.total, 5);
        assert_eq!(summary.succeeded, 5);
        let mut sizes = client.calls.lock().unwrap().clone();
        sizes.sort();
        assert_eq!(sizes, vec![1, 2, 2]);
        assert!(client.partial_failure_flags.lock().unwrap().iter().all(|f| *f));
    }

    #[tokio::test]
    async fn test_invalid_rows_never_reach_the_client() {
        let content = format!(
            "identifier,timestamp,value\n,2025-01-01T10:00:00+00:00,1\n{},bad-date,1\n{},2025-01-01T10:00:00+00:00,-5\n",
            CLICK_ID, CLICK_ID
        );
        let client = Arc::new(MockClient::default());
        let summary = pipeline(client.clone(), 10)
            .run(reader(&content), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(summary.total, 3);
        assert_eq!(summary.skipped_validation, 3);
        assert_eq!(client.call_count(), 0);
        assert_eq!(summary.failures[0].reason, "MISSING identifier");
        assert_eq!(summary.failures[1].reason, "MALFORMED timestamp");
        assert_eq!(summary.failures[2].reason, "MALFORMED value");
    }

    #[tokio::test]
    async fn test_transport_failure_fails_the_batch_rows() {
        let client = Arc::new(FixedClient::new(Err(TransportError::Server {
            status: 503,
            message: "unavailable".to_string(),
        })));
        let summary = pipeline(client, 10)
            .run(reader(&valid_rows(3)), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(summary.failed, 3);
        assert_eq!(summary.transport_failures, 1);
        assert_eq!(
            summary.failures.iter().map(|f| f.row).collect::<Vec<_>>(),
            vec![2, 3, 4]
        );
    }

    #[tokio::test]
    async fn test_cancelled_before_start_reads_nothing() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let client = Arc::new(MockClient::default());

        let summary = pipeline(client.clone(), 10)
            .run(reader(&valid_rows(3)), &cancel)
            .await
            .unwrap();

        assert!(summary.cancelled);
        assert_eq!(summary.total, 0);
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_no_batch_is_sent_after_cancellation() {
        let cancel = CancellationToken::new();
        let client = Arc::new(CancelOnFirstUpload {
            token: cancel.clone(),
            calls: AtomicUsize::new(0),
        });
        let pipeline = UploadPipeline::new(
            StaticConfig::new("1234567890", "987654321", "USD").unwrap(),
            RecordValidator::default(),
            BatchUploader::new(client.clone(), 1),
            1,
        );

        let summary = pipeline.run(reader(&valid_rows(3)), &cancel).await.unwrap();

        // Row 3 waited for the slot held by row 2 and was never sent
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
        assert!(summary.cancelled);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.failures[0].row, 3);
        assert_eq!(summary.failures[0].reason, "not submitted: run cancelled");
    }

    #[tokio::test]
    async fn test_final_partial_batch_is_held_back_after_cancellation() {
        let cancel = CancellationToken::new();
        let client = Arc::new(CancelOnFirstUpload {
            token: cancel.clone(),
            calls: AtomicUsize::new(0),
        });
        // Rows 2-3 fill the first batch, row 4 is left for the final flush
        let pipeline = UploadPipeline::new(
            StaticConfig::new("1234567890", "987654321", "USD").unwrap(),
            RecordValidator::default(),
            BatchUploader::new(client.clone(), 2),
            1,
        );

        let summary = pipeline.run(reader(&valid_rows(3)), &cancel).await.unwrap();

        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
        assert!(summary.cancelled);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(
            summary.failures.iter().map(|f| f.row).collect::<Vec<_>>(),
            vec![4]
        );
    }

    #[tokio::test]
    async fn test_format_error_aborts_the_run() {
        let content = format!(
            "identifier,timestamp\n{},2025-01-01T10:00:00+00:00\n{},2025-01-01T10:00:00+00:00,extra\n",
            CLICK_ID, CLICK_ID
        );
        let result = pipeline(Arc::new(MockClient::default()), 10)
            .run(reader(&content), &CancellationToken::new())
            .await;

        match result {
            Err(Error::Format { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected format error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_header_only_file_is_an_empty_run() {
        let summary = pipeline(Arc::new(MockClient::default()), 10)
            .run(reader("identifier,timestamp\n"), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(summary.total, 0);
        assert!(summary.is_full_success());
    }
}
