//! Resolution of credentials and endpoint URLs for the remote stores.
//!
//! A value can be configured three ways, tried in this order:
//!
//! 1. **Direct value** in the config file (`api_key: "..."`)
//! 2. **File reference** (`api_key_file: /run/secrets/supabase_key`)
//! 3. **Env var reference** (`api_key_env_var: SUPABASE_KEY`), which also
//!    picks up values loaded from `.env`

use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};

#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("No source configured for {what} (need a value, a file, or an env var name)")]
    NoSourceProvided { what: String },

    #[error("Failed to read {what} from '{path}': {source}")]
    FileReadError {
        what: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Environment variable '{name}' for {what} is not set")]
    EnvVarNotSet { what: String, name: String },

    #[error("Environment variable '{name}' for {what} contains invalid UTF-8")]
    EnvVarNotUnicode { what: String, name: String },

    #[error("{what} resolved to an empty value")]
    Empty { what: String },
}

pub type Result<T> = std::result::Result<T, SecretError>;

/// The three places a value may come from. Empty strings count as unset.
#[derive(Debug, Clone, Copy)]
pub struct SecretSource<'a> {
    /// Human label used in error messages, e.g. `"records.api_key"`.
    pub what: &'a str,
    pub direct: Option<&'a str>,
    pub file: Option<&'a str>,
    pub env_var: Option<&'a str>,
}

impl<'a> SecretSource<'a> {
    pub fn new(what: &'a str) -> Self {
        Self {
            what,
            direct: None,
            file: None,
            env_var: None,
        }
    }

    pub fn direct(mut self, value: Option<&'a str>) -> Self {
        self.direct = value;
        self
    }

    pub fn file(mut self, path: Option<&'a str>) -> Self {
        self.file = path;
        self
    }

    pub fn env_var(mut self, name: Option<&'a str>) -> Self {
        self.env_var = name;
        self
    }

    pub fn is_configured(&self) -> bool {
        [self.direct, self.file, self.env_var]
            .iter()
            .any(|s| non_empty(*s).is_some())
    }

    /// Resolves the first configured source. Values are trimmed; a source
    /// that is configured but yields nothing is an error, not a fallthrough.
    pub fn resolve(&self) -> Result<SecretString> {
        let value = if let Some(value) = non_empty(self.direct) {
            value.trim().to_string()
        } else if let Some(path) = non_empty(self.file) {
            let path = expand_home(path);
            std::fs::read_to_string(&path)
                .map_err(|source| SecretError::FileReadError {
                    what: self.what.to_string(),
                    path,
                    source,
                })?
                .trim()
                .to_string()
        } else if let Some(name) = non_empty(self.env_var) {
            match std::env::var(name) {
                Ok(value) => value.trim().to_string(),
                Err(std::env::VarError::NotPresent) => {
                    return Err(SecretError::EnvVarNotSet {
                        what: self.what.to_string(),
                        name: name.to_string(),
                    })
                }
                Err(std::env::VarError::NotUnicode(_)) => {
                    return Err(SecretError::EnvVarNotUnicode {
                        what: self.what.to_string(),
                        name: name.to_string(),
                    })
                }
            }
        } else {
            return Err(SecretError::NoSourceProvided {
                what: self.what.to_string(),
            });
        };

        if value.is_empty() {
            return Err(SecretError::Empty {
                what: self.what.to_string(),
            });
        }
        Ok(SecretString::from(value))
    }

    /// Same as `resolve` for values that are not secret, such as URLs.
    pub fn resolve_plain(&self) -> Result<String> {
        self.resolve().map(|s| s.expose_secret().to_string())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

/// Expands a leading `~` to the home directory. `~user` is not supported.
pub fn expand_home(path: &str) -> PathBuf {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            return match path.strip_prefix("~/") {
                Some(rest) => home.join(rest),
                None => home,
            };
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_direct_value_wins() {
        let secret = SecretSource::new("records.api_key")
            .direct(Some("direct-key"))
            .file(Some("/nonexistent"))
            .env_var(Some("LOGCOMMIT_TEST_UNUSED"))
            .resolve()
            .unwrap();
        assert_eq!(secret.expose_secret(), "direct-key");
    }

    #[test]
    fn test_file_value_trimmed() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "  file-key  ").unwrap();

        let path = file.path().to_str().unwrap();
        let secret = SecretSource::new("archive.api_key")
            .direct(Some(""))
            .file(Some(path))
            .resolve()
            .unwrap();
        assert_eq!(secret.expose_secret(), "file-key");
    }

    #[test]
    fn test_missing_file_is_error() {
        let err = SecretSource::new("archive.api_key")
            .file(Some("/nonexistent/logcommit/key"))
            .resolve()
            .unwrap_err();
        assert!(matches!(err, SecretError::FileReadError { .. }));
        assert!(err.to_string().contains("archive.api_key"));
    }

    #[test]
    #[serial]
    fn test_env_var_fallback() {
        std::env::set_var("LOGCOMMIT_TEST_URL", "https://example.supabase.co\n");
        let url = SecretSource::new("records.url")
            .env_var(Some("LOGCOMMIT_TEST_URL"))
            .resolve_plain()
            .unwrap();
        std::env::remove_var("LOGCOMMIT_TEST_URL");
        assert_eq!(url, "https://example.supabase.co");
    }

    #[test]
    #[serial]
    fn test_env_var_not_set() {
        std::env::remove_var("LOGCOMMIT_TEST_MISSING");
        let err = SecretSource::new("records.api_key")
            .env_var(Some("LOGCOMMIT_TEST_MISSING"))
            .resolve()
            .unwrap_err();
        assert!(matches!(err, SecretError::EnvVarNotSet { ref name, .. } if name == "LOGCOMMIT_TEST_MISSING"));
    }

    #[test]
    #[serial]
    fn test_blank_env_value_is_empty_error() {
        std::env::set_var("LOGCOMMIT_TEST_BLANK", "   ");
        let err = SecretSource::new("records.api_key")
            .env_var(Some("LOGCOMMIT_TEST_BLANK"))
            .resolve()
            .unwrap_err();
        std::env::remove_var("LOGCOMMIT_TEST_BLANK");
        assert!(matches!(err, SecretError::Empty { .. }));
    }

    #[test]
    fn test_no_source() {
        let source = SecretSource::new("records.api_key").direct(Some(" "));
        assert!(!source.is_configured());
        assert!(matches!(
            source.resolve(),
            Err(SecretError::NoSourceProvided { .. })
        ));
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/abs/path"), PathBuf::from("/abs/path"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/keys/a"), home.join("keys/a"));
            assert_eq!(expand_home("~"), home);
        }
    }
}
