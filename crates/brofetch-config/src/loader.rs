//! Configuration file loading and parsing.

use crate::types::ClientOptions;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read config: {source}")]
    ReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("invalid YAML at line {}: {message}", line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    ParseError { line: Option<usize>, message: String },

    #[error("validation error: {message}")]
    ValidationError { message: String },

    #[error("environment variable not found: {var}")]
    EnvVarNotFound { var: String },
}

/// Configuration loader.
pub struct ConfigLoader {
    base_path: PathBuf,
}

impl ConfigLoader {
    /// Create a loader for the given project directory.
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        Self {
            base_path: project_dir.as_ref().to_path_buf(),
        }
    }

    /// Path of the project config file.
    pub fn config_path(&self) -> PathBuf {
        self.base_path.join(".brofetch/config.yaml")
    }

    /// Load options from `.brofetch/config.yaml`, falling back to defaults.
    pub fn load(&self) -> Result<ClientOptions, ConfigError> {
        let config_path = self.config_path();

        if !config_path.exists() {
            return Ok(ClientOptions::default());
        }

        self.load_file(&config_path)
    }

    /// Load options from an explicit file. The file must exist.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<ClientOptions, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let contents = std::fs::read_to_string(path)?;
        let expanded = self.expand_env_vars(&contents)?;

        let options: ClientOptions = serde_yaml::from_str(&expanded)
            .map_err(|e| ConfigError::ParseError {
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?;

        validate(&options)?;
        Ok(options)
    }

    /// Expand environment variables in the form `${VAR}` or `${VAR:-default}`.
    fn expand_env_vars(&self, content: &str) -> Result<String, ConfigError> {
        let re = regex::Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}").map_err(|e| {
            ConfigError::ParseError {
                line: None,
                message: e.to_string(),
            }
        })?;

        let mut result = content.to_string();
        for cap in re.captures_iter(content) {
            let full_match = &cap[0];
            let var_name = &cap[1];
            let default = cap.get(2).map(|m| m.as_str());

            let value = match std::env::var(var_name) {
                Ok(v) => v,
                Err(_) => match default {
                    Some(d) => d.to_string(),
                    None => {
                        return Err(ConfigError::EnvVarNotFound {
                            var: var_name.to_string(),
                        })
                    }
                },
            };

            result = result.replace(full_match, &value);
        }

        Ok(result)
    }
}

/// Validate option values.
pub fn validate(options: &ClientOptions) -> Result<(), ConfigError> {
    if options.timeout_ms == 0 {
        return Err(ConfigError::ValidationError {
            message: "timeout_ms must be greater than 0".to_string(),
        });
    }

    if let Some(key) = options
        .headers
        .keys()
        .find(|k| k.is_empty() || k.chars().any(char::is_whitespace))
    {
        return Err(ConfigError::ValidationError {
            message: format!("invalid header name: {key:?}"),
        });
    }

    if let Some(base) = &options.base_url {
        url::Url::parse(base).map_err(|e| ConfigError::ValidationError {
            message: format!("base_url is not a valid absolute URL: {e}"),
        })?;
    }

    Ok(())
}
