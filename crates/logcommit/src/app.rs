//! Turns a loaded `Config` into concrete stores and a ready pipeline.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::{ArchiveConfig, Config, EndpointConfig, RecordsConfig};
use crate::db::{default_database_path, Database};
use crate::error::{ConfigError, Result};
use crate::pipeline::{CommitPipeline, PipelineConfig};
use crate::sanitize;
use crate::secrets::expand_home;
use crate::store::http::HttpEndpoint;
use crate::store::{
    ArchiveStore, FilesystemArchiveStore, PostgrestRecordStore, RecordStore, SqliteRecordStore,
    SupabaseArchiveStore, SystemClock,
};

fn build_endpoint(config: &EndpointConfig, section: &str, timeout_secs: u64) -> Result<HttpEndpoint> {
    let url_label = format!("{}.url", section);
    let key_label = format!("{}.api_key", section);

    let url = config.url_source(&url_label).resolve_plain()?;
    let api_key = config.api_key_source(&key_label).resolve()?;

    info!(
        section,
        url = %sanitize::redact_url(&url),
        timeout_secs,
        "Configured HTTP endpoint"
    );
    Ok(HttpEndpoint::new(
        &url,
        api_key,
        Duration::from_secs(timeout_secs),
    )?)
}

pub fn build_record_store(config: &RecordsConfig) -> Result<Arc<dyn RecordStore>> {
    match config {
        RecordsConfig::Sqlite { path } => {
            let path: PathBuf = match path {
                Some(p) => expand_home(p),
                None => default_database_path().ok_or_else(|| ConfigError::Validation {
                    message: "records.path is required: no home directory found".to_string(),
                })?,
            };
            info!(path = %sanitize::redact_path(&path), "Using SQLite record store");
            let db = Database::open(&path)?;
            Ok(Arc::new(SqliteRecordStore::new(db)))
        }
        RecordsConfig::Postgrest(postgrest) => {
            let endpoint = build_endpoint(&postgrest.endpoint, "records", postgrest.timeout_secs)?;
            info!(table = %postgrest.table, "Using PostgREST record store");
            Ok(Arc::new(PostgrestRecordStore::new(
                endpoint,
                postgrest.table.clone(),
            )))
        }
    }
}

pub fn build_archive_store(config: &ArchiveConfig) -> Result<Arc<dyn ArchiveStore>> {
    match config {
        ArchiveConfig::Filesystem { root } => {
            let root = expand_home(root);
            info!(root = %sanitize::redact_path(&root), "Using filesystem archive");
            Ok(Arc::new(FilesystemArchiveStore::new(root)))
        }
        ArchiveConfig::Supabase(storage) => {
            let endpoint = build_endpoint(&storage.endpoint, "archive", storage.timeout_secs)?;
            info!(bucket = %storage.bucket, "Using Supabase storage archive");
            Ok(Arc::new(SupabaseArchiveStore::new(
                endpoint,
                storage.bucket.clone(),
            )))
        }
    }
}

/// Production wiring: configured stores and the system clock.
pub fn build_pipeline(config: &Config) -> Result<CommitPipeline> {
    let records = build_record_store(&config.records)?;
    let archive = build_archive_store(&config.archive)?;
    Ok(CommitPipeline::new(
        PipelineConfig::from_config(config),
        records,
        archive,
        Arc::new(SystemClock),
    ))
}
