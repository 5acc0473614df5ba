//! Environment variable handling.

use crate::types::{ClientOptions, ResponseType};
use std::env;
use std::path::Path;
use thiserror::Error;

/// Environment variable errors.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },

    #[error("failed to load .env file: {0}")]
    DotenvError(#[from] dotenvy::Error),
}

/// Environment variable names.
pub mod vars {
    // Client options
    pub const BROFETCH_TIMEOUT_MS: &str = "BROFETCH_TIMEOUT_MS";
    pub const BROFETCH_RETRY: &str = "BROFETCH_RETRY";
    pub const BROFETCH_RETRY_DELAY_MS: &str = "BROFETCH_RETRY_DELAY_MS";
    pub const BROFETCH_MAX_REDIRECTS: &str = "BROFETCH_MAX_REDIRECTS";
    pub const BROFETCH_ENCODE_URI: &str = "BROFETCH_ENCODE_URI";
    pub const BROFETCH_RESPONSE_TYPE: &str = "BROFETCH_RESPONSE_TYPE";
    pub const BROFETCH_BASE_URL: &str = "BROFETCH_BASE_URL";
    pub const BROFETCH_AUTHORIZATION: &str = "BROFETCH_AUTHORIZATION";

    // Configuration
    pub const BROFETCH_CONFIG: &str = "BROFETCH_CONFIG";
}

/// Environment configuration.
pub struct Environment {
    _guard: (),
}

impl Environment {
    /// Initialize environment from `.env` files in the working directory.
    pub fn init() -> Result<Self, EnvError> {
        Self::init_from(Path::new("."))
    }

    /// Load `.env` then `.env.local` from `dir`.
    ///
    /// Missing files are skipped; a file that fails to parse is an error.
    /// Variables already set in the process are never overridden.
    pub fn init_from(dir: &Path) -> Result<Self, EnvError> {
        for name in [".env", ".env.local"] {
            match dotenvy::from_path(dir.join(name)) {
                Ok(()) => {}
                Err(e) if e.not_found() => {}
                Err(e) => return Err(e.into()),
            }
        }

        Ok(Self { _guard: () })
    }

    /// Get an optional string variable.
    pub fn get(var: &str) -> Option<String> {
        env::var(var).ok()
    }

    /// Get a boolean variable.
    pub fn get_bool(var: &str) -> Option<bool> {
        env::var(var).ok().map(|v| {
            matches!(v.to_lowercase().as_str(), "true" | "1" | "yes")
        })
    }

    /// Get an integer variable.
    pub fn get_int<T: std::str::FromStr>(var: &str) -> Result<Option<T>, EnvError> {
        match env::var(var) {
            Ok(v) => v.trim().parse().map(Some).map_err(|_| EnvError::InvalidValue {
                var: var.to_string(),
                message: "expected integer".to_string(),
            }),
            Err(_) => Ok(None),
        }
    }
}

impl ClientOptions {
    /// Override options from `BROFETCH_*` environment variables.
    pub fn apply_env(&mut self) -> Result<(), EnvError> {
        if let Some(timeout) = Environment::get_int(vars::BROFETCH_TIMEOUT_MS)? {
            self.timeout_ms = timeout;
        }
        if let Some(retry) = Environment::get_int(vars::BROFETCH_RETRY)? {
            self.retry = retry;
        }
        if let Some(delay) = Environment::get_int(vars::BROFETCH_RETRY_DELAY_MS)? {
            self.retry_delay_ms = delay;
        }
        if let Some(hops) = Environment::get_int(vars::BROFETCH_MAX_REDIRECTS)? {
            self.max_redirects = hops;
        }
        if let Some(encode) = Environment::get_bool(vars::BROFETCH_ENCODE_URI) {
            self.encode_uri = encode;
        }
        if let Some(kind) = Environment::get(vars::BROFETCH_RESPONSE_TYPE) {
            self.response_type =
                ResponseType::parse(&kind).ok_or_else(|| EnvError::InvalidValue {
                    var: vars::BROFETCH_RESPONSE_TYPE.to_string(),
                    message: format!("expected text or binary, got {kind:?}"),
                })?;
        }
        if let Some(base) = Environment::get(vars::BROFETCH_BASE_URL) {
            self.base_url = Some(base);
        }
        if let Some(token) = Environment::get(vars::BROFETCH_AUTHORIZATION) {
            self.headers.insert("authorization".to_string(), token);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_without_dotenv_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Environment::init_from(dir.path()).is_ok());
    }

    #[test]
    fn test_init_loads_dotenv() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".env"), "BROFETCH_TEST_DOTENV_KEY=from-dotenv\n").unwrap();

        Environment::init_from(dir.path()).unwrap();
        assert_eq!(
            Environment::get("BROFETCH_TEST_DOTENV_KEY").as_deref(),
            Some("from-dotenv")
        );
        env::remove_var("BROFETCH_TEST_DOTENV_KEY");
    }

    #[test]
    fn test_init_rejects_malformed_dotenv() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".env.local"), "NOT A VALID LINE\n").unwrap();

        let result = Environment::init_from(dir.path());
        assert!(matches!(result, Err(EnvError::DotenvError(_))));
    }

    #[test]
    fn test_bool_parsing() {
        env::set_var("BROFETCH_TEST_BOOL", "true");
        assert_eq!(Environment::get_bool("BROFETCH_TEST_BOOL"), Some(true));
        env::set_var("BROFETCH_TEST_BOOL", "1");
        assert_eq!(Environment::get_bool("BROFETCH_TEST_BOOL"), Some(true));
        env::set_var("BROFETCH_TEST_BOOL", "false");
        assert_eq!(Environment::get_bool("BROFETCH_TEST_BOOL"), Some(false));
        env::remove_var("BROFETCH_TEST_BOOL");
    }

    #[test]
    fn test_int_parsing_rejects_garbage() {
        env::set_var("BROFETCH_TEST_INT", "ten");
        let result = Environment::get_int::<u64>("BROFETCH_TEST_INT");
        assert!(matches!(result, Err(EnvError::InvalidValue { .. })));
        env::remove_var("BROFETCH_TEST_INT");
    }

    #[test]
    fn test_apply_env_overrides() {
        // Only this test touches the BROFETCH_* option variables
        env::set_var(vars::BROFETCH_TIMEOUT_MS, "120");
        env::set_var(vars::BROFETCH_RETRY, "0");
        env::set_var(vars::BROFETCH_RESPONSE_TYPE, "blob");
        env::set_var(vars::BROFETCH_AUTHORIZATION, "Bearer t0k3n");

        let mut options = ClientOptions::default();
        options.apply_env().unwrap();

        assert_eq!(options.timeout_ms, 120);
        assert_eq!(options.retry, 0);
        assert_eq!(options.response_type, ResponseType::Binary);
        assert_eq!(
            options.headers.get("authorization").map(String::as_str),
            Some("Bearer t0k3n")
        );
        assert_eq!(options.max_redirects, 3);

        env::remove_var(vars::BROFETCH_TIMEOUT_MS);
        env::remove_var(vars::BROFETCH_RETRY);
        env::remove_var(vars::BROFETCH_RESPONSE_TYPE);
        env::remove_var(vars::BROFETCH_AUTHORIZATION);
    }
}
