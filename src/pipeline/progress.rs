// file: src/pipeline/progress.rs
// description: progress tracking and statistics reporting for transfer batches
// reference: uses indicatif for progress bars and tracks job outcomes

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

#[derive(Debug, Clone, Default)]
pub struct BatchStats {
    pub jobs_succeeded: usize,
    pub jobs_failed: usize,
    pub duration_secs: u64,
}

impl BatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn jobs_attempted(&self) -> usize {
        self.jobs_succeeded + self.jobs_failed
    }

    pub fn success_rate(&self) -> f64 {
        let total = self.jobs_attempted();
        if total == 0 {
            return 0.0;
        }
        (self.jobs_succeeded as f64 / total as f64) * 100.0
    }
}

/// Advances once per completed job regardless of outcome, so the displayed
/// count always reaches the submitted total. Completion order is whatever
/// the runtime produces; nothing here assumes submission order.
pub struct ProgressTracker {
    main_bar: ProgressBar,
    detail_bar: ProgressBar,
    jobs_succeeded: Arc<AtomicUsize>,
    jobs_failed: Arc<AtomicUsize>,
    start_time: Instant,
}

impl ProgressTracker {
    pub fn new(total_jobs: usize) -> Self {
        Self::with_color(total_jobs, true)
    }

    pub fn with_color(total_jobs: usize, colored: bool) -> Self {
        let multi_progress = MultiProgress::new();

        let main_bar = create_progress_bar(&multi_progress, total_jobs as u64, colored);
        let detail_bar = create_detail_bar(&multi_progress);

        Self {
            main_bar,
            detail_bar,
            jobs_succeeded: Arc::new(AtomicUsize::new(0)),
            jobs_failed: Arc::new(AtomicUsize::new(0)),
            start_time: Instant::now(),
        }
    }

    pub fn inc_succeeded(&self) {
        self.jobs_succeeded.fetch_add(1, Ordering::SeqCst);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    pub fn inc_failed(&self) {
        self.jobs_failed.fetch_add(1, Ordering::SeqCst);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    pub fn set_message(&self, message: String) {
        self.detail_bar.set_message(message);
    }

    pub fn finish(&self) {
        self.main_bar.finish_with_message("Batch complete");
        self.detail_bar.finish_and_clear();
    }

    pub fn get_stats(&self) -> BatchStats {
        let duration = self.start_time.elapsed().as_secs();

        BatchStats {
            jobs_succeeded: self.jobs_succeeded.load(Ordering::SeqCst),
            jobs_failed: self.jobs_failed.load(Ordering::SeqCst),
            duration_secs: duration,
        }
    }

    fn update_detail_bar(&self) {
        let succeeded = self.jobs_succeeded.load(Ordering::SeqCst);
        let failed = self.jobs_failed.load(Ordering::SeqCst);

        let message = format!("Succeeded: {} | Failed: {}", succeeded, failed);

        self.detail_bar.set_message(message);
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        self.finish();
    }
}

fn create_progress_bar(multi_progress: &MultiProgress, total: u64, colored: bool) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(total));
    if colored {
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
                )
                .expect("Failed to create progress bar template")
                .progress_chars("█▓▒░"),
        );
    } else {
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({eta}) {msg}")
                .expect("Failed to create progress bar template")
                .progress_chars("=>-"),
        );
    }
    bar
}

fn create_detail_bar(multi_progress: &MultiProgress) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(0));
    let style = ProgressStyle::default_bar()
        .template("{msg}")
        .expect("Failed to create detail bar template");
    bar.set_style(style);
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_stats_calculations() {
        let mut stats = BatchStats::new();
        stats.jobs_succeeded = 90;
        stats.jobs_failed = 10;
        stats.duration_secs = 10;

        assert_eq!(stats.jobs_attempted(), 100);
        assert_eq!(stats.success_rate(), 90.0);
    }

    #[test]
    fn test_batch_stats_empty_batch() {
        let stats = BatchStats::new();
        assert_eq!(stats.jobs_attempted(), 0);
        assert_eq!(stats.success_rate(), 0.0);
    }

    #[test]
    fn test_progress_tracker_counts_both_outcomes() {
        let tracker = ProgressTracker::with_color(3, false);

        tracker.inc_succeeded();
        tracker.inc_succeeded();
        tracker.inc_failed();

        let stats = tracker.get_stats();
        assert_eq!(stats.jobs_succeeded, 2);
        assert_eq!(stats.jobs_failed, 1);
        assert_eq!(stats.jobs_attempted(), 3);
    }
}
