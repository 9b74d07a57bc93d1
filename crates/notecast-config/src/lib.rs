//! Configuration management for notecast.
//!
//! Parses `notecast.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `remote.endpoint`
//! - `remote.token`
//! - `upload.endpoint`
//! - `upload.token`

mod expand;

use std::path::{Path, PathBuf};

use serde::Deserialize;

use expand::expand_env;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "notecast.toml";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the documents base directory.
    pub base_dir: Option<PathBuf>,
    /// Override the remote render endpoint.
    pub remote_endpoint: Option<String>,
    /// Override the upload endpoint.
    pub upload_endpoint: Option<String>,
}

/// Application configuration.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Document handling configuration.
    pub docs: DocsConfig,
    /// Remote render endpoint (optional section).
    pub remote: Option<RemoteConfig>,
    /// Upload service (optional section).
    pub upload: Option<UploadConfig>,
    /// Plain-text style overrides.
    pub style: StyleConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Document handling configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DocsConfig {
    /// Base directory local image references resolve against.
    pub base_dir: PathBuf,
    /// Heading level that receives section numbers (0 disables numbering).
    pub numbered_heading_level: u8,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            numbered_heading_level: 2,
        }
    }
}

/// Remote render endpoint configuration.
#[derive(Debug, Deserialize)]
pub struct RemoteConfig {
    /// Endpoint base URL.
    pub endpoint: String,
    /// Bearer token, if the endpoint requires authentication.
    #[serde(default)]
    pub token: Option<String>,
    /// HTTP timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    30
}

/// Upload service configuration.
#[derive(Debug, Deserialize)]
pub struct UploadConfig {
    /// Upload base URL.
    pub endpoint: String,
    /// Bearer token sent with uploads.
    pub token: String,
}

/// Plain-text style overrides.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct StyleConfig {
    /// Unordered list bullet glyph.
    pub bullet: Option<String>,
    /// Prefix glyph per heading level (up to 6 entries).
    pub heading_prefixes: Option<Vec<String>>,
    /// Glyph for completed task items.
    pub task_checked: Option<String>,
    /// Glyph for open task items.
    pub task_unchecked: Option<String>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`remote.token`").
        field: String,
        /// Error message (e.g., "${`RENDER_TOKEN`} not set").
        message: String,
    },
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise,
    /// searches for `notecast.toml` in the current directory and parents.
    /// CLI settings are applied after loading, taking precedence over
    /// config file values.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Load and expand a config file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&raw)?;
        config.expand()?;
        config.docs.base_dir = expand_tilde(&config.docs.base_dir);
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Search for `notecast.toml` in the current directory and its parents.
    fn discover_config() -> Option<PathBuf> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let candidate = dir.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !dir.pop() {
                return None;
            }
        }
    }

    fn expand(&mut self) -> Result<(), ConfigError> {
        if let Some(remote) = &mut self.remote {
            remote.endpoint = expand_env(&remote.endpoint, "remote.endpoint")?;
            if let Some(token) = &remote.token {
                remote.token = Some(expand_env(token, "remote.token")?);
            }
        }
        if let Some(upload) = &mut self.upload {
            upload.endpoint = expand_env(&upload.endpoint, "upload.endpoint")?;
            upload.token = expand_env(&upload.token, "upload.token")?;
        }
        Ok(())
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(base_dir) = &settings.base_dir {
            self.docs.base_dir.clone_from(base_dir);
        }
        if let Some(endpoint) = &settings.remote_endpoint {
            match &mut self.remote {
                Some(remote) => remote.endpoint.clone_from(endpoint),
                None => {
                    self.remote = Some(RemoteConfig {
                        endpoint: endpoint.clone(),
                        token: None,
                        timeout_secs: default_timeout(),
                    });
                }
            }
        }
        if let Some(endpoint) = &settings.upload_endpoint {
            if let Some(upload) = &mut self.upload {
                upload.endpoint.clone_from(endpoint);
            }
        }
    }

    /// Get validated upload configuration.
    ///
    /// Use this instead of accessing the `upload` field directly when the
    /// command requires uploading.
    pub fn require_upload(&self) -> Result<&UploadConfig, ConfigError> {
        let upload = self.upload.as_ref().ok_or_else(|| {
            ConfigError::Validation("[upload] section is required for publishing".to_owned())
        })?;
        require_non_empty(&upload.endpoint, "upload.endpoint")?;
        require_http_url(&upload.endpoint, "upload.endpoint")?;
        require_non_empty(&upload.token, "upload.token")?;
        Ok(upload)
    }
}

/// Expand a leading `~` in a path.
fn expand_tilde(path: &Path) -> PathBuf {
    let text = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(text.as_ref()).as_ref())
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.docs.base_dir, PathBuf::from("."));
        assert_eq!(config.docs.numbered_heading_level, 2);
        assert!(config.remote.is_none());
        assert!(config.upload.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notecast.toml");
        std::fs::write(
            &path,
            r#"
[docs]
base_dir = "notes"
numbered_heading_level = 3

[remote]
endpoint = "https://render.example.com"
timeout_secs = 10

[style]
bullet = "▪"
"#,
        )
        .unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.docs.base_dir, PathBuf::from("notes"));
        assert_eq!(config.docs.numbered_heading_level, 3);
        let remote = config.remote.unwrap();
        assert_eq!(remote.endpoint, "https://render.example.com");
        assert_eq!(remote.timeout_secs, 10);
        assert_eq!(config.style.bullet.as_deref(), Some("▪"));
    }

    #[test]
    fn test_env_expansion_in_tokens() {
        // SAFETY: test-local variable name, no concurrent readers care.
        unsafe { std::env::set_var("NOTECAST_TEST_TOKEN", "sekrit") };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notecast.toml");
        std::fs::write(
            &path,
            r#"
[upload]
endpoint = "${NOTECAST_TEST_UPLOAD:-https://upload.example.com}"
token = "${NOTECAST_TEST_TOKEN}"
"#,
        )
        .unwrap();

        let config = Config::load_from_file(&path).unwrap();
        let upload = config.upload.unwrap();
        assert_eq!(upload.endpoint, "https://upload.example.com");
        assert_eq!(upload.token, "sekrit");
    }

    #[test]
    fn test_missing_explicit_path_errors() {
        let err = Config::load(Some(Path::new("/no/such/notecast.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_cli_settings_override() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings {
            base_dir: Some(PathBuf::from("elsewhere")),
            remote_endpoint: Some("https://other.example.com".to_owned()),
            upload_endpoint: None,
        });
        assert_eq!(config.docs.base_dir, PathBuf::from("elsewhere"));
        assert_eq!(
            config.remote.unwrap().endpoint,
            "https://other.example.com"
        );
    }

    #[test]
    fn test_require_upload_validation() {
        let config = Config::default();
        assert!(config.require_upload().is_err());

        let mut config = Config::default();
        config.upload = Some(UploadConfig {
            endpoint: "ftp://bad".to_owned(),
            token: "t".to_owned(),
        });
        assert!(config.require_upload().is_err());

        let mut config = Config::default();
        config.upload = Some(UploadConfig {
            endpoint: "https://upload.example.com".to_owned(),
            token: "t".to_owned(),
        });
        assert!(config.require_upload().is_ok());
    }
}
