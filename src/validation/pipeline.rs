//! The logo validation pipeline.
//!
//! One run takes one file through three ordered stages:
//!
//! 1. size check (synchronous, before any I/O)
//! 2. content read into a `data:` URL
//! 3. image decode, only when the declared MIME type is an image
//!
//! Every run ends in exactly one [`ValidationOutcome`]. Starting a new run
//! aborts the previous one, so a superseded run resolves to `None` instead of
//! delivering a late result.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::future::{AbortHandle, Abortable, LocalBoxFuture};
use serde::{Deserialize, Serialize};
use web_time::Instant;

use super::decode::ImageDecoder;
use super::error::RejectionKind;
use super::source::{ByteReader, FileLike};
use crate::constants::{BYTES_PER_KB, LOGO_MAX_KB, LOGO_MIN_KB};
use crate::model::LogoPayload;

/// Accepted logo size window in kilobytes, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogoLimits {
    #[serde(default = "default_min_kb")]
    pub min_kb: f64,
    #[serde(default = "default_max_kb")]
    pub max_kb: f64,
}

fn default_min_kb() -> f64 {
    LOGO_MIN_KB
}

fn default_max_kb() -> f64 {
    LOGO_MAX_KB
}

impl Default for LogoLimits {
    fn default() -> Self {
        Self {
            min_kb: default_min_kb(),
            max_kb: default_max_kb(),
        }
    }
}

impl LogoLimits {
    /// Check a size in bytes against the window.
    pub fn accepts(&self, size_bytes: u64) -> bool {
        let kb = size_bytes as f64 / BYTES_PER_KB;
        kb >= self.min_kb && kb <= self.max_kb
    }
}

/// Whether a declared MIME type names an image.
pub fn is_image_mime(mime_type: &str) -> bool {
    mime_type.trim().to_ascii_lowercase().starts_with("image/")
}

/// Name, type and size of the file a run looked at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSummary {
    pub name: String,
    pub mime_type: String,
    pub size: u64,
}

impl FileSummary {
    pub fn of(file: &impl FileLike) -> Self {
        Self {
            name: file.name().to_string(),
            mime_type: file.mime_type().to_string(),
            size: file.size(),
        }
    }
}

/// Result of validating one file.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    /// The file passed; `payload` is its encoded content.
    Accepted {
        file: FileSummary,
        payload: LogoPayload,
    },
    /// The file failed one of the stages.
    Rejected {
        file: FileSummary,
        kind: RejectionKind,
        message: String,
    },
}

impl ValidationOutcome {
    fn rejected(file: FileSummary, kind: RejectionKind) -> Self {
        ValidationOutcome::Rejected {
            file,
            kind,
            message: kind.message().to_string(),
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationOutcome::Accepted { .. })
    }

    pub fn file(&self) -> &FileSummary {
        match self {
            ValidationOutcome::Accepted { file, .. } | ValidationOutcome::Rejected { file, .. } => file,
        }
    }

    /// Rejection kind, if the file was rejected.
    pub fn rejection(&self) -> Option<RejectionKind> {
        match self {
            ValidationOutcome::Accepted { .. } => None,
            ValidationOutcome::Rejected { kind, .. } => Some(*kind),
        }
    }
}

/// Run all stages for one file.
async fn run_stages<R, D>(reader: &R, decoder: &D, limits: LogoLimits, blob: &R::Blob) -> ValidationOutcome
where
    R: ByteReader,
    D: ImageDecoder,
{
    let file = FileSummary::of(blob);
    let started = Instant::now();

    if !limits.accepts(file.size) {
        log::warn!(
            "🖼️ Rejected {}: {} bytes outside {}..={} KB",
            file.name,
            file.size,
            limits.min_kb,
            limits.max_kb
        );
        return ValidationOutcome::rejected(file, RejectionKind::InvalidSize);
    }

    let data_url = match reader.read_data_url(blob).await {
        Ok(data_url) => data_url,
        Err(e) => {
            log::warn!("🖼️ Rejected {}: read failed: {}", file.name, e);
            return ValidationOutcome::rejected(file, RejectionKind::InvalidFile);
        }
    };

    if !is_image_mime(&file.mime_type) {
        log::info!(
            "🖼️ Accepted {} ({:?}, not decoded) in {:?}",
            file.name,
            file.mime_type,
            started.elapsed()
        );
        return ValidationOutcome::Accepted {
            file,
            payload: LogoPayload::new(data_url, false),
        };
    }

    match decoder.decode(&data_url).await {
        Ok((width, height)) => {
            log::info!(
                "🖼️ Accepted {} ({}x{}) in {:?}",
                file.name,
                width,
                height,
                started.elapsed()
            );
            ValidationOutcome::Accepted {
                file,
                payload: LogoPayload::new(data_url, true),
            }
        }
        Err(e) => {
            log::warn!("🖼️ Rejected {}: decode failed: {}", file.name, e);
            ValidationOutcome::rejected(file, RejectionKind::InvalidImage)
        }
    }
}

/// An in-flight validation run.
///
/// Resolves to `Some(outcome)`, or `None` if the run was aborted because a
/// newer run started or the pipeline was cancelled.
pub struct ValidationTask {
    run: u64,
    future: Abortable<LocalBoxFuture<'static, ValidationOutcome>>,
}

impl ValidationTask {
    /// Sequence number of this run within its pipeline.
    pub fn run(&self) -> u64 {
        self.run
    }
}

impl Future for ValidationTask {
    type Output = Option<ValidationOutcome>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let run = self.run;
        Pin::new(&mut self.future).poll(cx).map(|result| match result {
            Ok(outcome) => Some(outcome),
            Err(_) => {
                log::debug!("🖼️ Validation run {} aborted", run);
                None
            }
        })
    }
}

/// Validates logo uploads, one selection at a time.
pub struct FileValidationPipeline<R, D> {
    reader: R,
    decoder: D,
    limits: LogoLimits,
    last_run: u64,
    in_flight: Option<AbortHandle>,
}

impl<R, D> FileValidationPipeline<R, D>
where
    R: ByteReader + Clone + 'static,
    R::Blob: 'static,
    D: ImageDecoder + Clone + 'static,
{
    pub fn new(reader: R, decoder: D) -> Self {
        Self {
            reader,
            decoder,
            limits: LogoLimits::default(),
            last_run: 0,
            in_flight: None,
        }
    }

    /// Use a custom size window.
    pub fn with_limits(mut self, limits: LogoLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> LogoLimits {
        self.limits
    }

    /// Sequence number of the most recently started run.
    pub fn last_run(&self) -> u64 {
        self.last_run
    }

    /// Start validating a file selection.
    ///
    /// Only the first file is validated; the rest are dropped unread. Any run
    /// still in flight is aborted first. Returns `None` for an empty selection.
    pub fn start<I>(&mut self, selection: I) -> Option<ValidationTask>
    where
        I: IntoIterator<Item = R::Blob>,
    {
        let mut files = selection.into_iter();
        let blob = files.next()?;
        let ignored = files.count();
        if ignored > 0 {
            log::debug!("🖼️ Only the first file is validated, ignoring {} more", ignored);
        }

        self.cancel();

        let (handle, registration) = AbortHandle::new_pair();
        self.in_flight = Some(handle);
        self.last_run += 1;

        let reader = self.reader.clone();
        let decoder = self.decoder.clone();
        let limits = self.limits;
        let future: LocalBoxFuture<'static, ValidationOutcome> =
            Box::pin(async move { run_stages(&reader, &decoder, limits, &blob).await });

        log::debug!("🖼️ Validation run {} started", self.last_run);
        Some(ValidationTask {
            run: self.last_run,
            future: Abortable::new(future, registration),
        })
    }

    /// Abort the run in flight, if any. Returns whether one was aborted.
    pub fn cancel(&mut self) -> bool {
        match self.in_flight.take() {
            Some(handle) if !handle.is_aborted() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    /// Validate a single file without cancellation support.
    pub async fn validate(&self, blob: &R::Blob) -> ValidationOutcome {
        run_stages(&self.reader, &self.decoder, self.limits, blob).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::error::ReadError;
    use crate::validation::fixtures;
    use crate::validation::{FileBlob, ImageCrateDecoder, LocalReader};
    use futures::FutureExt;
    use futures::channel::oneshot;
    use futures::future::Shared;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Counts reads, then delegates to `LocalReader`.
    #[derive(Clone, Default)]
    struct CountingReader {
        reads: Rc<Cell<usize>>,
    }

    impl ByteReader for CountingReader {
        type Blob = FileBlob;

        async fn read_data_url(&self, blob: &FileBlob) -> Result<String, ReadError> {
            self.reads.set(self.reads.get() + 1);
            LocalReader.read_data_url(blob).await
        }
    }

    #[derive(Clone)]
    struct FailingReader;

    impl ByteReader for FailingReader {
        type Blob = FileBlob;

        async fn read_data_url(&self, _blob: &FileBlob) -> Result<String, ReadError> {
            Err(ReadError::Reader("disk on fire".to_string()))
        }
    }

    /// Holds every read until the gate opens.
    #[derive(Clone)]
    struct GatedReader {
        gate: Shared<oneshot::Receiver<()>>,
    }

    impl ByteReader for GatedReader {
        type Blob = FileBlob;

        async fn read_data_url(&self, blob: &FileBlob) -> Result<String, ReadError> {
            let _ = self.gate.clone().await;
            LocalReader.read_data_url(blob).await
        }
    }

    fn pipeline() -> FileValidationPipeline<LocalReader, ImageCrateDecoder> {
        FileValidationPipeline::new(LocalReader, ImageCrateDecoder)
    }

    fn text_blob(name: &str, size: usize) -> FileBlob {
        FileBlob::from_bytes(name, "text/plain", vec![b'x'; size])
    }

    fn run(
        pipeline: &mut FileValidationPipeline<impl ByteReader<Blob = FileBlob> + Clone + 'static, ImageCrateDecoder>,
        files: Vec<FileBlob>,
    ) -> ValidationOutcome {
        let task = pipeline.start(files).expect("selection is not empty");
        pollster::block_on(task).expect("run was not aborted")
    }

    #[test]
    fn test_limits_boundaries() {
        let limits = LogoLimits::default();
        assert!(!limits.accepts(0));
        assert!(!limits.accepts(1023));
        assert!(limits.accepts(1024));
        assert!(limits.accepts(50 * 1024));
        assert!(limits.accepts(100 * 1024));
        assert!(!limits.accepts(100 * 1024 + 1));
        assert!(!limits.accepts(101 * 1024));
    }

    #[test]
    fn test_is_image_mime() {
        assert!(is_image_mime("image/png"));
        assert!(is_image_mime("IMAGE/JPEG"));
        assert!(is_image_mime("image/svg+xml"));
        assert!(!is_image_mime("text/plain"));
        assert!(!is_image_mime("application/octet-stream"));
        assert!(!is_image_mime(""));
    }

    #[test]
    fn test_size_boundaries_through_pipeline() {
        let mut pipeline = pipeline();

        for size in [1024, 100 * 1024] {
            let outcome = run(&mut pipeline, vec![text_blob("ok.txt", size)]);
            assert!(outcome.is_accepted(), "{} bytes should pass", size);
        }

        for size in [0, 101 * 1024] {
            let outcome = run(&mut pipeline, vec![text_blob("bad.txt", size)]);
            assert_eq!(outcome.rejection(), Some(RejectionKind::InvalidSize), "{} bytes", size);
        }
    }

    #[test]
    fn test_size_check_runs_before_read() {
        let reader = CountingReader::default();
        let reads = reader.reads.clone();
        let mut pipeline = FileValidationPipeline::new(reader, ImageCrateDecoder);

        let outcome = run(&mut pipeline, vec![text_blob("huge.txt", 200 * 1024)]);
        assert_eq!(outcome.rejection(), Some(RejectionKind::InvalidSize));
        assert_eq!(reads.get(), 0);

        let outcome = run(&mut pipeline, vec![text_blob("fine.txt", 2048)]);
        assert!(outcome.is_accepted());
        assert_eq!(reads.get(), 1);
    }

    #[test]
    fn test_read_failure_is_invalid_file() {
        let mut pipeline = FileValidationPipeline::new(FailingReader, ImageCrateDecoder);
        let outcome = run(&mut pipeline, vec![text_blob("a.txt", 2048)]);
        match outcome {
            ValidationOutcome::Rejected { kind, message, file } => {
                assert_eq!(kind, RejectionKind::InvalidFile);
                assert_eq!(message, "Invalid file.");
                assert_eq!(file.name, "a.txt");
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_undecodable_image_is_invalid_image() {
        let mut pipeline = pipeline();
        let blob = FileBlob::from_bytes("logo.png", "image/png", vec![0xAB; 4096]);
        let outcome = run(&mut pipeline, vec![blob]);
        assert_eq!(outcome.rejection(), Some(RejectionKind::InvalidImage));
    }

    #[test]
    fn test_jpeg_accepted_and_mime_gates_decode() {
        let jpeg = fixtures::noise_jpeg(45 * 1024);
        let kb = jpeg.len() as f64 / 1024.0;
        assert!((1.0..=100.0).contains(&kb), "fixture is {} KB", kb);

        let mut pipeline = pipeline();
        let outcome = run(&mut pipeline, vec![FileBlob::from_bytes("logo.jpg", "image/jpeg", jpeg.clone())]);
        match &outcome {
            ValidationOutcome::Accepted { payload, .. } => {
                assert!(payload.is_decoded());
                assert_eq!(payload.mime_type(), Some("image/jpeg"));
            }
            other => panic!("expected acceptance, got {:?}", other),
        }

        let renamed = FileBlob::from_bytes("logo.bin", "application/octet-stream", jpeg);
        match run(&mut pipeline, vec![renamed]) {
            ValidationOutcome::Accepted { payload, .. } => assert!(!payload.is_decoded()),
            other => panic!("expected acceptance, got {:?}", other),
        }
    }

    #[test]
    fn test_non_image_skips_decode_even_if_garbage() {
        let mut pipeline = pipeline();
        let outcome = run(&mut pipeline, vec![FileBlob::from_bytes("x.bin", "", vec![0xFF; 3000])]);
        match outcome {
            ValidationOutcome::Accepted { payload, .. } => {
                assert!(payload.as_str().starts_with("data:application/octet-stream;base64,"));
            }
            other => panic!("expected acceptance, got {:?}", other),
        }
    }

    #[test]
    fn test_only_first_file_is_validated() {
        let reader = CountingReader::default();
        let reads = reader.reads.clone();
        let mut pipeline = FileValidationPipeline::new(reader, ImageCrateDecoder);

        let outcome = run(
            &mut pipeline,
            vec![text_blob("first.txt", 2048), text_blob("second.txt", 0), text_blob("third.txt", 4096)],
        );
        assert!(outcome.is_accepted());
        assert_eq!(outcome.file().name, "first.txt");
        assert_eq!(reads.get(), 1);

        let outcome = run(&mut pipeline, vec![text_blob("first.txt", 0), text_blob("second.txt", 2048)]);
        assert_eq!(outcome.rejection(), Some(RejectionKind::InvalidSize));
        assert_eq!(outcome.file().name, "first.txt");
        assert_eq!(reads.get(), 1);
    }

    #[test]
    fn test_empty_selection_starts_nothing() {
        let mut pipeline = pipeline();
        assert!(pipeline.start(Vec::new()).is_none());
        assert_eq!(pipeline.last_run(), 0);
    }

    #[test]
    fn test_new_run_aborts_stale_run() {
        let (open_gate, gate) = oneshot::channel();
        let mut pipeline = FileValidationPipeline::new(GatedReader { gate: gate.shared() }, ImageCrateDecoder);

        let stale = pipeline.start(vec![text_blob("old.txt", 2048)]).unwrap();
        let fresh = pipeline.start(vec![text_blob("new.txt", 2048)]).unwrap();
        assert_eq!(stale.run(), 1);
        assert_eq!(fresh.run(), 2);

        open_gate.send(()).unwrap();
        assert_eq!(pollster::block_on(stale), None);

        let outcome = pollster::block_on(fresh).expect("latest run completes");
        assert_eq!(outcome.file().name, "new.txt");
    }

    #[test]
    fn test_cancel() {
        let (_open_gate, gate) = oneshot::channel();
        let mut pipeline = FileValidationPipeline::new(GatedReader { gate: gate.shared() }, ImageCrateDecoder);

        assert!(!pipeline.cancel());
        let task = pipeline.start(vec![text_blob("a.txt", 2048)]).unwrap();
        assert!(pipeline.cancel());
        assert!(!pipeline.cancel());
        assert!(task.now_or_never().flatten().is_none());
    }

    #[test]
    fn test_validate_direct() {
        let pipeline = pipeline();
        let outcome = pollster::block_on(pipeline.validate(&text_blob("a.txt", 5000)));
        assert!(outcome.is_accepted());
    }
}
