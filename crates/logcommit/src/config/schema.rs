use serde::{Deserialize, Serialize};

use crate::naming::DEFAULT_MAX_SEQUENCE;
use crate::pipeline::policy::DEFAULT_VARIANCE_MARGIN;
use crate::secrets::SecretSource;
use crate::store::postgrest::DEFAULT_TABLE;

pub const CONFIG_VERSION: &str = "1.0";
pub const DEFAULT_BUCKET: &str = "coding-logs";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    #[serde(default)]
    pub records: RecordsConfig,
    #[serde(default)]
    pub archive: ArchiveConfig,
    #[serde(default)]
    pub commit: CommitConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            records: RecordsConfig::default(),
            archive: ArchiveConfig::default(),
            commit: CommitConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum RecordsConfig {
    /// Local SQLite file. `path` defaults to `~/.logcommit/data/records.db`.
    Sqlite {
        #[serde(default)]
        path: Option<String>,
    },
    Postgrest(PostgrestConfig),
}

impl Default for RecordsConfig {
    fn default() -> Self {
        RecordsConfig::Postgrest(PostgrestConfig::default())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum ArchiveConfig {
    Filesystem { root: String },
    Supabase(SupabaseStorageConfig),
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        ArchiveConfig::Supabase(SupabaseStorageConfig::default())
    }
}

/// URL and API key of a Supabase project, each resolvable from a direct
/// value, a file, or an env var.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub url_file: Option<String>,
    #[serde(default = "default_url_env_var")]
    pub url_env_var: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_key_file: Option<String>,
    #[serde(default = "default_api_key_env_var")]
    pub api_key_env_var: Option<String>,
}

fn default_url_env_var() -> Option<String> {
    Some("SUPABASE_URL".to_string())
}

fn default_api_key_env_var() -> Option<String> {
    Some("SUPABASE_KEY".to_string())
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: None,
            url_file: None,
            url_env_var: default_url_env_var(),
            api_key: None,
            api_key_file: None,
            api_key_env_var: default_api_key_env_var(),
        }
    }
}

impl EndpointConfig {
    pub fn url_source<'a>(&'a self, what: &'a str) -> SecretSource<'a> {
        SecretSource::new(what)
            .direct(self.url.as_deref())
            .file(self.url_file.as_deref())
            .env_var(self.url_env_var.as_deref())
    }

    pub fn api_key_source<'a>(&'a self, what: &'a str) -> SecretSource<'a> {
        SecretSource::new(what)
            .direct(self.api_key.as_deref())
            .file(self.api_key_file.as_deref())
            .env_var(self.api_key_env_var.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgrestConfig {
    #[serde(flatten)]
    pub endpoint: EndpointConfig,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_records_timeout")]
    pub timeout_secs: u64,
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

fn default_records_timeout() -> u64 {
    30
}

impl Default for PostgrestConfig {
    fn default() -> Self {
        Self {
            endpoint: EndpointConfig::default(),
            table: default_table(),
            timeout_secs: default_records_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupabaseStorageConfig {
    #[serde(flatten)]
    pub endpoint: EndpointConfig,
    #[serde(default = "default_bucket")]
    pub bucket: String,
    #[serde(default = "default_archive_timeout")]
    pub timeout_secs: u64,
}

fn default_bucket() -> String {
    DEFAULT_BUCKET.to_string()
}

fn default_archive_timeout() -> u64 {
    60
}

impl Default for SupabaseStorageConfig {
    fn default() -> Self {
        Self {
            endpoint: EndpointConfig::default(),
            bucket: default_bucket(),
            timeout_secs: default_archive_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitConfig {
    #[serde(default = "default_max_sequence")]
    pub max_sequence: u32,
    #[serde(default = "default_variance_margin")]
    pub variance_margin: u64,
}

fn default_max_sequence() -> u32 {
    DEFAULT_MAX_SEQUENCE
}

fn default_variance_margin() -> u64 {
    DEFAULT_VARIANCE_MARGIN
}

impl Default for CommitConfig {
    fn default() -> Self {
        Self {
            max_sequence: DEFAULT_MAX_SEQUENCE,
            variance_margin: DEFAULT_VARIANCE_MARGIN,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub json: bool,
}
