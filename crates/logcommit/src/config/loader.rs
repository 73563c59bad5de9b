use std::path::{Path, PathBuf};

use crate::config::schema::{ArchiveConfig, Config, RecordsConfig, CONFIG_VERSION};
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../../../schema/config-v1.json");

/// `<config_dir>/logcommit/config.json`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("logcommit").join("config.json"))
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigError::NotFound(path.to_path_buf())
        } else {
            ConfigError::ReadFile {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    load_config_from_str(&content)
}

/// Loads an explicitly requested file, or the default location when none is
/// given. A missing default file yields the built-in configuration, which
/// reads `SUPABASE_URL` and `SUPABASE_KEY` from the environment.
pub fn load_config_or_default(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(path) = explicit {
        return load_config(path);
    }

    match default_config_path() {
        Some(path) if path.exists() => load_config(&path),
        _ => {
            log::debug!("No config file found, using built-in defaults");
            Ok(Config::default())
        }
    }
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: Config = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != CONFIG_VERSION {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    if config.commit.max_sequence == 0 {
        return Err(ConfigError::Validation {
            message: "commit.max_sequence must be at least 1".to_string(),
        });
    }

    match &config.records {
        RecordsConfig::Postgrest(postgrest) => {
            if postgrest.table.trim().is_empty() {
                return Err(ConfigError::Validation {
                    message: "records.table must not be empty".to_string(),
                });
            }
            if postgrest.timeout_secs == 0 {
                return Err(ConfigError::Validation {
                    message: "records.timeout_secs must be at least 1".to_string(),
                });
            }
        }
        RecordsConfig::Sqlite { path } => {
            if path.as_deref().is_some_and(|p| p.trim().is_empty()) {
                return Err(ConfigError::Validation {
                    message: "records.path must not be empty".to_string(),
                });
            }
        }
    }

    match &config.archive {
        ArchiveConfig::Supabase(storage) => {
            if storage.bucket.trim().is_empty() {
                return Err(ConfigError::Validation {
                    message: "archive.bucket must not be empty".to_string(),
                });
            }
            if storage.timeout_secs == 0 {
                return Err(ConfigError::Validation {
                    message: "archive.timeout_secs must be at least 1".to_string(),
                });
            }
        }
        ArchiveConfig::Filesystem { root } => {
            if root.trim().is_empty() {
                return Err(ConfigError::Validation {
                    message: "archive.root must not be empty".to_string(),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = load_config_from_str(r#"{ "version": "1.0" }"#).unwrap();

        match &config.records {
            RecordsConfig::Postgrest(p) => {
                assert_eq!(p.table, "ij_coding_log_ver1");
                assert_eq!(p.timeout_secs, 30);
                assert_eq!(p.endpoint.url_env_var.as_deref(), Some("SUPABASE_URL"));
                assert_eq!(p.endpoint.api_key_env_var.as_deref(), Some("SUPABASE_KEY"));
            }
            other => panic!("Expected postgrest records, got {:?}", other),
        }
        match &config.archive {
            ArchiveConfig::Supabase(s) => assert_eq!(s.timeout_secs, 60),
            other => panic!("Expected supabase archive, got {:?}", other),
        }
        assert_eq!(config.commit.max_sequence, 5000);
        assert_eq!(config.commit.variance_margin, 10);
        assert!(!config.logging.json);
    }

    #[test]
    fn test_local_backends() {
        let config = load_config_from_str(
            r#"
            {
                "version": "1.0",
                "records": { "backend": "sqlite", "path": "/tmp/records.db" },
                "archive": { "backend": "filesystem", "root": "/tmp/archive" },
                "commit": { "max_sequence": 10 },
                "logging": { "json": true }
            }
            "#,
        )
        .unwrap();

        assert!(matches!(
            config.records,
            RecordsConfig::Sqlite { path: Some(ref p) } if p == "/tmp/records.db"
        ));
        assert!(matches!(
            config.archive,
            ArchiveConfig::Filesystem { ref root } if root == "/tmp/archive"
        ));
        assert_eq!(config.commit.max_sequence, 10);
        assert!(config.logging.json);
    }

    #[test]
    fn test_remote_backends_with_direct_values() {
        let config = load_config_from_str(
            r#"
            {
                "version": "1.0",
                "records": {
                    "backend": "postgrest",
                    "url": "https://abc.supabase.co",
                    "api_key": "service-key",
                    "table": "coding_log"
                },
                "archive": {
                    "backend": "supabase",
                    "url": "https://abc.supabase.co",
                    "api_key_file": "/run/secrets/storage_key",
                    "bucket": "logs-bucket",
                    "timeout_secs": 5
                }
            }
            "#,
        )
        .unwrap();

        match &config.records {
            RecordsConfig::Postgrest(p) => {
                assert_eq!(p.endpoint.url.as_deref(), Some("https://abc.supabase.co"));
                assert_eq!(p.table, "coding_log");
            }
            other => panic!("Expected postgrest records, got {:?}", other),
        }
        match &config.archive {
            ArchiveConfig::Supabase(s) => {
                assert_eq!(s.bucket, "logs-bucket");
                assert_eq!(s.timeout_secs, 5);
                assert_eq!(
                    s.endpoint.api_key_file.as_deref(),
                    Some("/run/secrets/storage_key")
                );
            }
            other => panic!("Expected supabase archive, got {:?}", other),
        }
    }

    #[test]
    fn test_wrong_version_rejected_by_schema() {
        let err = load_config_from_str(r#"{ "version": "2.0" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::SchemaValidation { .. }));
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let err = load_config_from_str(
            r#"{ "version": "1.0", "archive": { "backend": "s3", "bucket": "x" } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::SchemaValidation { .. }));
    }

    #[test]
    fn test_zero_max_sequence_rejected() {
        let err = load_config_from_str(r#"{ "version": "1.0", "commit": { "max_sequence": 0 } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::SchemaValidation { .. }));
    }

    #[test]
    fn test_empty_bucket_rejected() {
        let err = load_config_from_str(
            r#"{ "version": "1.0", "archive": { "backend": "supabase", "bucket": "" } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::SchemaValidation { .. }));
    }

    #[test]
    fn test_blank_table_rejected_semantically() {
        let err = load_config_from_str(
            r#"{ "version": "1.0", "records": { "backend": "postgrest", "table": "   " } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            load_config_from_str("{ not json"),
            Err(ConfigError::ParseJson(_))
        ));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "version": "1.0", "logging": {{ "json": true }} }}"#).unwrap();

        let config = load_config(file.path()).unwrap();
        assert!(config.logging.json);
    }

    #[test]
    fn test_explicit_missing_file_is_not_found() {
        let err = load_config_or_default(Some(Path::new("/nonexistent/logcommit.json")))
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
