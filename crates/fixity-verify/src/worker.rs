//! Bounded-queue worker pool.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use compact_str::CompactString;
use crossbeam_channel::{Receiver, Sender, bounded};

use fixity_core::{ResultRecord, VerifyConfig};
use fixity_scan::relative_key;
use fixity_store::ChecksumStore;

use crate::classify::verify_file;
use crate::error::VerifyError;

/// Fixed-size pool of hashing threads fed from a bounded task queue.
///
/// The queue capacity is independent of the worker count; the producer
/// blocks whenever the queue is full.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    workers: usize,
    task_queue_capacity: usize,
}

impl WorkerPool {
    /// Create a pool. Zero values are raised to one.
    pub fn new(workers: usize, task_queue_capacity: usize) -> Self {
        Self {
            workers: workers.max(1),
            task_queue_capacity: task_queue_capacity.max(1),
        }
    }

    /// Size the pool from a run configuration.
    pub fn from_config(config: &VerifyConfig) -> Self {
        Self::new(config.effective_workers(), config.task_queue_capacity)
    }

    /// Number of worker threads.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Verify every task against `store`, sending one result per task into
    /// `results`.
    ///
    /// Returns once all workers have been joined. `results` is dropped by then,
    /// so a consumer iterating the other end sees the stream close.
    pub fn run(
        &self,
        root: &Path,
        store: &ChecksumStore,
        tasks: Vec<PathBuf>,
        results: Sender<ResultRecord>,
    ) -> Result<(), VerifyError> {
        self.run_with(root, tasks, results, |path| verify_file(root, path, store))
    }

    /// Feed tasks through `process` on the pool's threads.
    ///
    /// Per-file errors become [`OpStatus::Error`](fixity_core::OpStatus::Error)
    /// results. An error that is not per-file stops every worker, and the
    /// first such error is returned once the pool has drained.
    pub fn run_with<F>(
        &self,
        root: &Path,
        tasks: Vec<PathBuf>,
        results: Sender<ResultRecord>,
        process: F,
    ) -> Result<(), VerifyError>
    where
        F: Fn(&Path) -> Result<ResultRecord, VerifyError> + Sync,
    {
        let (task_tx, task_rx) = bounded::<PathBuf>(self.task_queue_capacity);
        let abort = AtomicBool::new(false);
        tracing::debug!(
            workers = self.workers,
            tasks = tasks.len(),
            capacity = self.task_queue_capacity,
            "starting worker pool"
        );

        thread::scope(|scope| {
            let abort = &abort;
            let process = &process;

            let producer = scope.spawn(move || {
                for task in tasks {
                    if abort.load(Ordering::Acquire) || task_tx.send(task).is_err() {
                        break;
                    }
                }
            });

            let handles: Vec<_> = (0..self.workers)
                .map(|id| {
                    let worker = Worker {
                        id,
                        root,
                        abort,
                        tasks: task_rx.clone(),
                        results: results.clone(),
                    };
                    scope.spawn(move || worker.run(process))
                })
                .collect();

            // Only workers hold receivers and senders from here on.
            drop(task_rx);
            drop(results);

            let mut panicked = producer.join().is_err().then_some("producer");
            let mut fatal = None;
            for handle in handles {
                match handle.join() {
                    Ok(Ok(())) => {}
                    Ok(Err(err)) => {
                        fatal.get_or_insert(err);
                    }
                    Err(_) => panicked = Some("worker"),
                }
            }

            match (panicked, fatal) {
                (Some(which), _) => Err(VerifyError::Panicked(which)),
                (None, Some(err)) => Err(err),
                (None, None) => Ok(()),
            }
        })
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(
            fixity_core::DEFAULT_WORKERS,
            fixity_core::DEFAULT_QUEUE_CAPACITY,
        )
    }
}

struct Worker<'a> {
    id: usize,
    root: &'a Path,
    abort: &'a AtomicBool,
    tasks: Receiver<PathBuf>,
    results: Sender<ResultRecord>,
}

impl Worker<'_> {
    fn run<F>(self, process: &F) -> Result<(), VerifyError>
    where
        F: Fn(&Path) -> Result<ResultRecord, VerifyError>,
    {
        for path in self.tasks.iter() {
            if self.abort.load(Ordering::Acquire) {
                break;
            }

            let result = match process(&path) {
                Ok(result) => result,
                Err(err) if err.is_per_file() => {
                    tracing::error!(worker = self.id, path = %path.display(), "{err}");
                    let label = relative_key(self.root, &path)
                        .unwrap_or_else(|| CompactString::from(path.to_string_lossy()));
                    ResultRecord::error(label, &err)
                }
                Err(err) => {
                    tracing::error!(worker = self.id, path = %path.display(), "aborting run: {err}");
                    self.abort.store(true, Ordering::Release);
                    return Err(err);
                }
            };

            if self.results.send(result).is_err() {
                tracing::debug!(worker = self.id, "result stream closed");
                break;
            }
        }
        Ok(())
    }
}
