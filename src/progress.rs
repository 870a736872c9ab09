//! Terminal progress rendering.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::broadcast::{self, error::RecvError};

use fixity_verify::{ProgressSink, ScanProgress};

const SPINNER_TEMPLATE: &str = "{spinner:.green} Scanning... {pos} files [{elapsed}] {msg}";
const BAR_TEMPLATE: &str =
    "[{bar:40.cyan/blue}] {pos}/{len} {percent}% [{elapsed_precise}] {wide_msg}";

/// Spinner while the tree is walked, then a bar while files are verified.
pub struct IndicatifProgress {
    bar: ProgressBar,
    scanning: Arc<AtomicBool>,
}

impl IndicatifProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template(SPINNER_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.enable_steady_tick(Duration::from_millis(100));

        Self {
            bar,
            scanning: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Feed scan snapshots into the spinner until the scanner goes away.
    pub fn watch_scan(&self, mut rx: broadcast::Receiver<ScanProgress>) -> JoinHandle<()> {
        let bar = self.bar.clone();
        let scanning = Arc::clone(&self.scanning);

        thread::spawn(move || {
            loop {
                match rx.blocking_recv() {
                    Ok(snapshot) => {
                        if !scanning.load(Ordering::Acquire) {
                            continue;
                        }
                        bar.set_position(snapshot.files_seen);
                        bar.set_message(format!(
                            "{} selected, {} skipped, {} warnings ({:.0} files/s)",
                            snapshot.files_selected,
                            snapshot.files_skipped(),
                            snapshot.warnings,
                            snapshot.files_per_second()
                        ));
                    }
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

impl ProgressSink for IndicatifProgress {
    fn begin(&self, total: u64) {
        self.scanning.store(false, Ordering::Release);
        self.bar.set_style(
            ProgressStyle::default_bar()
                .template(BAR_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        self.bar.set_length(total);
        self.bar.set_position(0);
        self.bar.set_message("");
    }

    fn advance(&self, increment: u64, message: &str) {
        self.bar.inc(increment);
        self.bar.set_message(message.to_string());
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
