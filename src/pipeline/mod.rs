// file: src/pipeline/mod.rs
// description: pipeline module exports and public api
// reference: pipeline orchestration

mod backup;
mod progress;
mod restore;
mod scheduler;

pub use backup::{BackupPipeline, TransferPlan};
pub use progress::{BatchStats, ProgressTracker};
pub use restore::{MirrorEntry, RestorePipeline, RestorePlan, enumerate_mirrors};
pub use scheduler::{BatchReport, Job, JobOutcome, JobResult, JobScheduler};
