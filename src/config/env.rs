//! Environment-derived settings
//!
//! | Variable          | Effect                               | Fallback            |
//! |-------------------|--------------------------------------|---------------------|
//! | `FOLIO_BASE_URL`  | absolute URL prefix for links        | `url` in config     |
//! | `FOLIO_BASE_PATH` | path prefix for local assets         | `base_path` in config |
//! | `FOLIO_ENV`       | `production` or `development`        | `production`        |

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const BASE_URL_VAR: &str = "FOLIO_BASE_URL";
pub const BASE_PATH_VAR: &str = "FOLIO_BASE_PATH";
pub const MODE_VAR: &str = "FOLIO_ENV";

/// Errors raised while reading configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {MODE_VAR} value `{0}`, expected `production` or `development`")]
    InvalidMode(String),
}

/// Whether drafts are visible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildMode {
    #[default]
    Production,
    Development,
}

impl BuildMode {
    pub fn is_production(self) -> bool {
        matches!(self, BuildMode::Production)
    }
}

impl FromStr for BuildMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(BuildMode::Production),
            "development" | "dev" => Ok(BuildMode::Development),
            other => Err(ConfigError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildMode::Production => f.write_str("production"),
            BuildMode::Development => f.write_str("development"),
        }
    }
}

/// Settings read from the process environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    pub base_url: Option<String>,
    pub base_path: Option<String>,
    pub mode: BuildMode,
}

impl Environment {
    /// Read from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read through an arbitrary lookup, empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mode = match get(MODE_VAR) {
            Some(value) => value.parse()?,
            None => BuildMode::default(),
        };

        Ok(Self {
            base_url: get(BASE_URL_VAR),
            base_path: get(BASE_PATH_VAR).map(|p| normalize_base_path(&p)),
            mode,
        })
    }
}

/// `blog/` -> `/blog`, `/` -> ``
pub fn normalize_base_path(path: &str) -> String {
    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let env = Environment::from_lookup(lookup(&[])).unwrap();
        assert_eq!(env, Environment::default());
        assert!(env.mode.is_production());
    }

    #[test]
    fn test_reads_all_variables() {
        let env = Environment::from_lookup(lookup(&[
            (BASE_URL_VAR, "http://localhost:4000"),
            (BASE_PATH_VAR, "blog/"),
            (MODE_VAR, "development"),
        ]))
        .unwrap();
        assert_eq!(env.base_url.as_deref(), Some("http://localhost:4000"));
        assert_eq!(env.base_path.as_deref(), Some("/blog"));
        assert_eq!(env.mode, BuildMode::Development);
    }

    #[test]
    fn test_empty_values_are_ignored() {
        let env = Environment::from_lookup(lookup(&[(BASE_URL_VAR, "  ")])).unwrap();
        assert_eq!(env.base_url, None);
    }

    #[test]
    fn test_invalid_mode() {
        let err = Environment::from_lookup(lookup(&[(MODE_VAR, "staging")])).unwrap_err();
        assert_eq!(err, ConfigError::InvalidMode("staging".to_string()));
    }

    #[test]
    fn test_normalize_base_path() {
        assert_eq!(normalize_base_path("/"), "");
        assert_eq!(normalize_base_path("/docs/"), "/docs");
    }
}
