pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod job;
pub mod logging;
pub mod metrics;
pub mod naming;
pub mod pipeline;
pub mod report;
pub mod sanitize;
pub mod secrets;
pub mod settings;
pub mod source;
pub mod store;

pub use config::{load_config, load_config_or_default, Config};
pub use error::{
    ConfigError, DeleteError, InsertError, LogCommitError, Result, SourceError, StoreError,
    ValidationError,
};
pub use job::{CommitRecord, JobMetadata, RecordId};
pub use metrics::LogMetrics;
pub use naming::{next_key, ArchiveKey, SequenceError};
pub use pipeline::{CommitPipeline, CommitReport, CommitRequest, Outcome, PipelineConfig};
pub use report::{render, Message};
pub use secrets::SecretError;
pub use settings::Settings;
pub use source::{LocalSourceFile, SourceFile};
pub use store::{ArchiveStore, Clock, FixedClock, RecordStore, SystemClock};
