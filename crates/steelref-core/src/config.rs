//! Session configuration.
//!
//! All fields have defaults. Overrides come from the environment:
//!
//! | Variable                     | Field              | Default |
//! |------------------------------|--------------------|---------|
//! | `STEELREF_SEARCH_LIMIT`      | `search_limit`     | `50`    |
//! | `STEELREF_COMPARE_CAPACITY`  | `compare_capacity` | `3`     |

use serde::{Deserialize, Serialize};

use crate::error::{SteelRefError, SteelRefResult};

/// Default maximum number of records a query returns.
pub const DEFAULT_SEARCH_LIMIT: usize = 50;

/// Default compare-tray capacity. The tray evicts its oldest entry on
/// overflow regardless of capacity.
pub const DEFAULT_COMPARE_CAPACITY: usize = 3;

/// Tuning knobs owned by the UI collaborator's session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Maximum results a session query returns.
    pub search_limit: usize,
    /// Compare-tray capacity.
    pub compare_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            search_limit: DEFAULT_SEARCH_LIMIT,
            compare_capacity: DEFAULT_COMPARE_CAPACITY,
        }
    }
}

impl SessionConfig {
    /// Defaults with `STEELREF_*` environment overrides applied.
    ///
    /// # Errors
    ///
    /// Returns [`SteelRefError::InvalidConfig`] when an override is present
    /// but not a positive integer.
    pub fn from_env() -> SteelRefResult<Self> {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var("STEELREF_SEARCH_LIMIT") {
            config.search_limit = parse_positive("search_limit", &raw)?;
        }
        if let Ok(raw) = std::env::var("STEELREF_COMPARE_CAPACITY") {
            config.compare_capacity = parse_positive("compare_capacity", &raw)?;
        }
        Ok(config)
    }
}

fn parse_positive(field: &'static str, raw: &str) -> SteelRefResult<usize> {
    match raw.parse::<usize>() {
        Ok(value) if value > 0 => Ok(value),
        Ok(_) => Err(SteelRefError::InvalidConfig {
            field,
            value: raw.to_string(),
            reason: "must be at least 1".into(),
        }),
        Err(err) => Err(SteelRefError::InvalidConfig {
            field,
            value: raw.to_string(),
            reason: err.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_exact_values() {
        let config = SessionConfig::default();
        assert_eq!(config.search_limit, 50);
        assert_eq!(config.compare_capacity, 3);
    }

    #[test]
    fn parse_positive_accepts_integers() {
        assert_eq!(parse_positive("search_limit", "25").unwrap(), 25);
    }

    #[test]
    fn parse_positive_rejects_zero() {
        let err = parse_positive("compare_capacity", "0").unwrap_err();
        assert!(matches!(err, SteelRefError::InvalidConfig { .. }));
        assert!(err.to_string().contains("at least 1"));
    }

    #[test]
    fn parse_positive_rejects_garbage() {
        let err = parse_positive("search_limit", "many").unwrap_err();
        assert!(matches!(err, SteelRefError::InvalidConfig { .. }));
    }

    #[test]
    fn serde_fills_missing_fields_with_defaults() {
        let config: SessionConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SessionConfig::default());

        let config: SessionConfig =
            serde_json::from_str(r#"{"search_limit": 10}"#).unwrap();
        assert_eq!(config.search_limit, 10);
        assert_eq!(config.compare_capacity, DEFAULT_COMPARE_CAPACITY);
    }
}
