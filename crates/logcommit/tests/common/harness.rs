//! Isolated environment for end-to-end commit tests: a temporary directory
//! holding the log files, a SQLite record store and a filesystem archive.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use tempfile::TempDir;

use logcommit::db::{record_repo, Database};
use logcommit::pipeline::{CommitPipeline, CommitReport, CommitRequest, NoopProgress, PipelineConfig};
use logcommit::store::{
    ArchiveStore, FilesystemArchiveStore, FixedClock, RecordStore, SqliteRecordStore,
};
use logcommit::{JobMetadata, LocalSourceFile};

pub fn commit_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 15).expect("valid date")
}

pub struct TestHarness {
    temp_dir: TempDir,
    pub log_dir: PathBuf,
    pub archive_dir: PathBuf,
    pub db: Database,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();

        let log_dir = base.join("logs");
        let archive_dir = base.join("archive");
        std::fs::create_dir_all(&log_dir).expect("Failed to create log dir");
        std::fs::create_dir_all(&archive_dir).expect("Failed to create archive dir");

        let db = Database::open(&base.join("data").join("records.db"))
            .expect("Failed to open database");

        Self {
            temp_dir,
            log_dir,
            archive_dir,
            db,
        }
    }

    pub fn base_path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn records(&self) -> Arc<SqliteRecordStore> {
        Arc::new(SqliteRecordStore::new(self.db.clone()))
    }

    pub fn archive(&self) -> Arc<FilesystemArchiveStore> {
        Arc::new(FilesystemArchiveStore::new(&self.archive_dir))
    }

    /// Pipeline over the harness stores with a fixed commit date.
    pub fn pipeline(&self) -> CommitPipeline {
        self.pipeline_with(self.records(), self.archive())
    }

    pub fn pipeline_with(
        &self,
        records: Arc<dyn RecordStore>,
        archive: Arc<dyn ArchiveStore>,
    ) -> CommitPipeline {
        CommitPipeline::new(
            PipelineConfig::default(),
            records,
            archive,
            Arc::new(FixedClock(commit_date())),
        )
    }

    /// Writes a log with the given number of programmed and verified lines.
    pub fn write_log(&self, name: &str, programmed: usize, verified: usize) -> PathBuf {
        let mut content = String::from("Programmer session start\n");
        for card in 0..programmed {
            content.push_str(&format!("Card {} Programmed OK\n", card));
        }
        for card in 0..verified {
            content.push_str(&format!("Card {} Passed Verification\n", card));
        }
        let path = self.log_dir.join(name);
        std::fs::write(&path, content).expect("Failed to write log");
        path
    }

    /// Reads the log, counts it, and commits it through `pipeline`.
    pub async fn commit_log(
        &self,
        pipeline: &CommitPipeline,
        metadata: JobMetadata,
        log_path: &Path,
    ) -> CommitReport {
        let payload = std::fs::read(log_path).expect("Failed to read log");
        let request = CommitRequest::from_log(metadata, payload);
        let source = LocalSourceFile::new(log_path);
        pipeline.commit(request, &source, &NoopProgress).await
    }

    pub fn record_count(&self, job_id: &str) -> u64 {
        record_repo::count_by_job(&self.db, job_id).expect("Failed to count records")
    }

    pub fn archived_path(&self, key: &str) -> PathBuf {
        self.archive_dir.join(key)
    }
}
