pub mod config;
pub mod context;
pub mod error;
pub mod outcome;
pub mod policy;
pub mod progress;
pub mod runner;

pub use config::PipelineConfig;
pub use context::{CommitContext, CommitPhase};
pub use error::{PipelineWarning, RollbackError, UploadError};
pub use outcome::{CommitReport, Outcome, RollbackStatus};
pub use policy::{Advisory, Counter};
pub use progress::{NoopProgress, ProgressEvent, ProgressReporter, TracingProgress};
pub use runner::{CommitPipeline, CommitRequest};
