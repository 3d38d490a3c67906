//! Client-side upload queue.
//!
//! Files are admitted in FIFO order into an unbounded channel drained by a
//! fixed pool of worker threads, so at most `concurrency` uploads run at the
//! same time. The queue keeps live counters of waiting and processing files.
//! A failed upload is logged and recorded, it never stops the queue.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, unbounded};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use common::Settings;

use crate::{BooruClient, BooruError};

pub const DEFAULT_CONCURRENCY: usize = 3;
const MAX_CONCURRENCY: usize = 16;

/// Something that can push one file to the backend.
pub trait Uploader: Send + Sync {
    fn upload_file(&self, path: &Path) -> Result<(), BooruError>;
}

impl Uploader for BooruClient {
    fn upload_file(&self, path: &Path) -> Result<(), BooruError> {
        self.upload().file(path)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("Upload queue is closed")]
    Closed,
    #[error("Rejected {}: {reason}", path.display())]
    Rejected { path: PathBuf, reason: String },
    #[error("Failed to spawn upload worker: {0}")]
    Spawn(io::Error),
}

/// Point-in-time view of the queue counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Admitted, not started yet.
    pub waiting: usize,
    /// Upload in flight.
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
}

impl QueueStats {
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.waiting == 0 && self.processing == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFailure {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, Default)]
pub struct UploadReport {
    pub stats: QueueStats,
    pub failures: Vec<UploadFailure>,
}

#[derive(Debug, Default)]
struct Counters {
    waiting: AtomicUsize,
    processing: AtomicUsize,
    completed: AtomicUsize,
    failed: AtomicUsize,
}

impl Counters {
    fn snapshot(&self) -> QueueStats {
        QueueStats {
            waiting: self.waiting.load(Ordering::SeqCst),
            processing: self.processing.load(Ordering::SeqCst),
            completed: self.completed.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
        }
    }
}

/// Rejects files the backend would refuse, before they are uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFilter {
    allowed_extensions: Vec<String>,
    max_size: u64,
}

impl UploadFilter {
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            allowed_extensions: settings.allowed_extensions(),
            max_size: settings.max_file_size(),
        }
    }

    pub fn check(&self, path: &Path) -> Result<(), String> {
        let size = fs::metadata(path).map_err(|e| e.to_string())?.len();
        self.check_file(path, size)
    }

    fn check_file(&self, path: &Path, size: u64) -> Result<(), String> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if !self.allowed_extensions.iter().any(|e| *e == extension) {
            return Err(format!(
                "extension '{extension}' not allowed (allowed: {})",
                self.allowed_extensions.join(",")
            ));
        }
        if size > self.max_size {
            return Err(format!(
                "file is {size} bytes, limit is {} bytes",
                self.max_size
            ));
        }
        Ok(())
    }
}

pub struct UploadQueue {
    sender: Option<Sender<PathBuf>>,
    counters: Arc<Counters>,
    failures: Arc<Mutex<Vec<UploadFailure>>>,
    workers: Vec<JoinHandle<()>>,
    filter: Option<UploadFilter>,
    concurrency: usize,
}

impl UploadQueue {
    /// Starts `concurrency` workers (clamped to 1..=16) sharing `uploader`.
    pub fn new<U: Uploader + 'static>(
        uploader: Arc<U>,
        concurrency: usize,
    ) -> Result<Self, QueueError> {
        let concurrency = concurrency.clamp(1, MAX_CONCURRENCY);
        let (sender, receiver) = unbounded::<PathBuf>();
        let counters = Arc::new(Counters::default());
        let failures = Arc::new(Mutex::new(Vec::new()));

        let workers = (0..concurrency)
            .map(|i| {
                let uploader = Arc::clone(&uploader);
                let receiver = receiver.clone();
                let counters = Arc::clone(&counters);
                let failures = Arc::clone(&failures);
                thread::Builder::new()
                    .name(format!("upload-{i}"))
                    .spawn(move || run_worker(&*uploader, &receiver, &counters, &failures))
                    .map_err(QueueError::Spawn)
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Upload queue started with {concurrency} workers");

        Ok(Self {
            sender: Some(sender),
            counters,
            failures,
            workers,
            filter: None,
            concurrency,
        })
    }

    #[must_use]
    pub fn with_filter(mut self, filter: UploadFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    #[must_use]
    pub const fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Admits a file at the back of the queue. Never waits for uploads.
    pub fn add(&self, path: PathBuf) -> Result<(), QueueError> {
        let sender = self.sender.as_ref().ok_or(QueueError::Closed)?;

        if let Some(filter) = &self.filter {
            filter
                .check(&path)
                .map_err(|reason| QueueError::Rejected {
                    path: path.clone(),
                    reason,
                })?;
        }

        self.counters.waiting.fetch_add(1, Ordering::SeqCst);
        if sender.send(path).is_err() {
            self.counters.waiting.fetch_sub(1, Ordering::SeqCst);
            return Err(QueueError::Closed);
        }
        Ok(())
    }

    #[must_use]
    pub fn stats(&self) -> QueueStats {
        self.counters.snapshot()
    }

    /// Stops admission, waits for every admitted file and reports.
    pub fn finish(mut self) -> UploadReport {
        self.shutdown();
        let failures = std::mem::take(
            &mut *self
                .failures
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        let stats = self.counters.snapshot();
        info!(
            "Upload queue finished: {} completed, {} failed",
            stats.completed, stats.failed
        );
        UploadReport { stats, failures }
    }

    fn shutdown(&mut self) {
        // Closing the channel lets workers drain what is left, then exit
        self.sender.take();
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                error!("Upload worker panicked");
            }
        }
    }
}

impl Drop for UploadQueue {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker<U: Uploader + ?Sized>(
    uploader: &U,
    receiver: &Receiver<PathBuf>,
    counters: &Counters,
    failures: &Mutex<Vec<UploadFailure>>,
) {
    for path in receiver {
        counters.processing.fetch_add(1, Ordering::SeqCst);
        counters.waiting.fetch_sub(1, Ordering::SeqCst);

        match uploader.upload_file(&path) {
            Ok(()) => {
                info!("Uploaded {}", path.display());
                counters.completed.fetch_add(1, Ordering::SeqCst);
            }
            Err(e) => {
                error!("Upload failed for {}: {e}", path.display());
                counters.failed.fetch_add(1, Ordering::SeqCst);
                failures
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(UploadFailure {
                        path,
                        error: e.to_string(),
                    });
            }
        }

        counters.processing.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Expands the given inputs into a list of files.
///
/// Files are kept as given. Directories contribute their regular files,
/// sorted by name, descending into subdirectories only when `recursive`.
pub fn collect_files(inputs: &[PathBuf], recursive: bool) -> Result<Vec<PathBuf>, BooruError> {
    let mut files = Vec::new();
    for input in inputs {
        let meta = fs::metadata(input).map_err(|e| {
            BooruError::Io(io::Error::new(
                e.kind(),
                format!("{}: {e}", input.display()),
            ))
        })?;

        if meta.is_file() {
            files.push(input.clone());
            continue;
        }

        let walker = WalkDir::new(input)
            .max_depth(if recursive { usize::MAX } else { 1 })
            .sort_by_file_name();
        for entry in walker {
            let entry = entry.map_err(io::Error::from)?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
    }

    if files.is_empty() {
        warn!("No files found in the given inputs");
    }
    Ok(files)
}
