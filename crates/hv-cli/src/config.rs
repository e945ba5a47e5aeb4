//! Optional `harvest.toml`. Every value has a default and every value can be
//! overridden by a flag.
//!
//! ```toml
//! [session]
//! time_window_ms = 200
//! edit_distance_threshold = 2
//!
//! [merge]
//! timestamp = 0
//! index = 2
//! user = 4
//! click = 6
//! query = 7
//!
//! [associate.search]
//! query = 6
//!
//! [associate.click]
//! query_id = 2
//! ```

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use hv_core::SegmenterConfig;
use hv_io::columns::{AssociatedColumns, ClickColumns, SearchColumns};

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub session: SegmenterConfig,
    #[serde(default)]
    pub merge: AssociatedColumns,
    #[serde(default)]
    pub associate: AssociateConfig,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct AssociateConfig {
    #[serde(default)]
    pub search: SearchColumns,
    #[serde(default)]
    pub click: ClickColumns,
}

impl Config {
    /// A missing file means defaults; a file that exists must parse.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read config file {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}

/// Replace `slot` with a flag value when the flag was given.
pub fn set<T>(slot: &mut T, flag: Option<T>) {
    if let Some(value) = flag {
        *slot = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_all_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.session, SegmenterConfig::default());
        assert_eq!(config.merge, AssociatedColumns::default());
        assert_eq!(config.associate.click.query_id, 2);
    }

    #[test]
    fn test_partial_sections() {
        let config: Config = toml::from_str(
            r#"
            [session]
            time_window_ms = 1000

            [merge]
            query = 8

            [associate.search]
            query = 7
            query_params = 6
            "#,
        )
        .unwrap();
        assert_eq!(config.session.time_window_ms, 1000);
        assert_eq!(config.session.edit_distance_threshold, 2);
        assert_eq!(config.merge.query, 8);
        assert_eq!(config.merge.click, 6);
        assert_eq!(config.associate.search.query, 7);
        assert_eq!(config.associate.search.query_params, 6);
    }

    #[test]
    fn test_missing_file_is_default() {
        let config = Config::load(Path::new("/nonexistent/harvest.toml")).unwrap();
        assert_eq!(config.session, SegmenterConfig::default());
    }

    #[test]
    fn test_set_only_overrides_given_flags() {
        let mut value = 3;
        set(&mut value, None);
        assert_eq!(value, 3);
        set(&mut value, Some(9));
        assert_eq!(value, 9);
    }
}
