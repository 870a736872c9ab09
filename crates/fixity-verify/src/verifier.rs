//! Run orchestration: scan, verify, aggregate, record.

use std::sync::Arc;
use std::thread;
use std::time::Instant;

use tokio::sync::broadcast;

use fixity_core::{RunSummary, VerifyConfig};
use fixity_scan::{DirectoryScanner, FilterChain, ScanProgress, canonical_root};
use fixity_store::ChecksumStore;

use crate::aggregate::{Aggregator, ProgressSink};
use crate::error::VerifyError;
use crate::journal::RunJournal;
use crate::worker::WorkerPool;

/// One verification run over a root directory.
pub struct Verifier {
    config: VerifyConfig,
    store: Arc<ChecksumStore>,
    scanner: DirectoryScanner,
    pool: WorkerPool,
    journal: RunJournal,
}

impl Verifier {
    /// Validate the configuration and open the root's store.
    ///
    /// An unusable root or store aborts here, before any file is touched.
    pub fn new(mut config: VerifyConfig) -> Result<Self, VerifyError> {
        config.mode.validate()?;
        config.root = canonical_root(&config.root)?;

        let store = Arc::new(ChecksumStore::open(config.store_path())?);
        tracing::info!(
            root = %config.root.display(),
            mode = %config.mode,
            tracked = store.len()?,
            "store opened"
        );

        Ok(Self {
            pool: WorkerPool::from_config(&config),
            journal: RunJournal::for_config(&config),
            scanner: DirectoryScanner::new(),
            store,
            config,
        })
    }

    /// Receive progress snapshots while the directory is walked.
    pub fn subscribe_scan(&self) -> broadcast::Receiver<ScanProgress> {
        self.scanner.subscribe()
    }

    /// Read access to the store.
    pub fn store(&self) -> &ChecksumStore {
        &self.store
    }

    /// Shared handle to the store that outlives the run.
    pub fn store_handle(&self) -> Arc<ChecksumStore> {
        Arc::clone(&self.store)
    }

    /// Effective configuration, with the root canonicalized.
    pub fn config(&self) -> &VerifyConfig {
        &self.config
    }

    /// The run log this verifier appends to.
    pub fn journal(&self) -> &RunJournal {
        &self.journal
    }

    /// Execute the run and append its summary to the run log.
    ///
    /// Per-file failures are counted in the summary. Only a failed walk, a
    /// crashed pipeline thread or an unwritable run log are errors.
    pub fn run(self, progress: &dyn ProgressSink) -> Result<RunSummary, VerifyError> {
        let start = Instant::now();
        let config = &self.config;

        let chain = FilterChain::for_mode(config, Arc::clone(&self.store))?;
        tracing::debug!(filters = ?chain.names(), "filter chain ready");

        let outcome = self.scanner.scan(config, &chain)?;
        let eligible = outcome.count;
        progress.begin(eligible);

        let (result_tx, result_rx) = crossbeam_channel::bounded(config.result_queue_capacity);
        let mut aggregator = Aggregator::new(progress);
        let root = outcome.root.as_path();
        let store = self.store.as_ref();
        let pool = self.pool;

        let pipeline = thread::scope(|scope| {
            let pool_thread = scope.spawn(move || pool.run(root, store, outcome.files, result_tx));
            for result in result_rx.iter() {
                aggregator.record(result);
            }
            pool_thread.join()
        });
        let pipeline = pipeline.map_err(|_| VerifyError::Panicked("pool"))?;
        pipeline?;

        progress.finish();

        if aggregator.processed() != eligible {
            tracing::error!(
                eligible,
                processed = aggregator.processed(),
                "result count does not match eligible files"
            );
        }

        let summary = aggregator.finish(
            outcome.root,
            config.mode,
            eligible,
            start.elapsed(),
            outcome.warnings,
        );
        self.journal.append(&summary)?;

        tracing::info!(
            processed = summary.total_processed,
            added = summary.counts.added,
            modified = summary.counts.modified,
            corrupted = summary.counts.corrupted,
            unchanged = summary.counts.unchanged,
            errors = summary.counts.errors,
            elapsed_secs = summary.elapsed_secs,
            "verification complete"
        );
        Ok(summary)
    }
}

impl std::fmt::Debug for Verifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Verifier")
            .field("root", &self.config.root)
            .field("mode", &self.config.mode)
            .field("workers", &self.pool.workers())
            .finish_non_exhaustive()
    }
}
