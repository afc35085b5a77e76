pub mod config;
pub mod db;
pub mod error;
pub mod git_ops;
pub mod harvest;
pub mod job_queue;
pub mod law_status;
pub mod models;
pub mod worker;

pub use config::{PipelineConfig, WorkerConfig};
pub use db::{create_pool, run_migrations};
pub use error::PipelineError;
pub use harvest::{HarvestPayload, HarvestResult};
pub use models::{Job, JobStatus, JobType, LawEntry, LawStatusValue, Priority};
