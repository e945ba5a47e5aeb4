//! # Column Layouts
//!
//! CSV files carry no header; each command is told where its fields live.
//! Defaults match the files this tool writes itself:
//!
//! ```text
//! search CSV      timestamp, appID, index, queryID, userID, context, query, queryParameters
//! click CSV       timestamp, appID, queryID, position, objectID
//! associated CSV  timestamp, appID, index, queryID, userID, context, hadClick, query, queryParameters
//! ```

use serde::Deserialize;

use hv_core::ConfigError;

/// Layout of a raw search CSV (input of `associate`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SearchColumns {
    pub timestamp: usize,
    pub app: usize,
    pub index: usize,
    pub query_id: usize,
    pub user: usize,
    pub context: usize,
    pub query: usize,
    pub query_params: usize,
}

impl Default for SearchColumns {
    fn default() -> Self {
        Self {
            timestamp: 0,
            app: 1,
            index: 2,
            query_id: 3,
            user: 4,
            context: 5,
            query: 6,
            query_params: 7,
        }
    }
}

impl SearchColumns {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_distinct(&self.named())
    }

    /// Minimum number of fields a row needs.
    pub fn width(&self) -> usize {
        width(&self.named())
    }

    fn named(&self) -> [(&'static str, usize); 8] {
        [
            ("timestamp", self.timestamp),
            ("app", self.app),
            ("index", self.index),
            ("query_id", self.query_id),
            ("user", self.user),
            ("context", self.context),
            ("query", self.query),
            ("query_params", self.query_params),
        ]
    }
}

/// Layout of a click CSV. Only the query id matters for the join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClickColumns {
    pub query_id: usize,
}

impl Default for ClickColumns {
    fn default() -> Self {
        Self { query_id: 2 }
    }
}

/// Layout of an associated CSV (output of `associate`, input of `merge`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AssociatedColumns {
    pub timestamp: usize,
    pub app: usize,
    pub index: usize,
    pub query_id: usize,
    pub user: usize,
    pub context: usize,
    pub click: usize,
    pub query: usize,
    pub query_params: usize,
}

impl Default for AssociatedColumns {
    fn default() -> Self {
        Self {
            timestamp: 0,
            app: 1,
            index: 2,
            query_id: 3,
            user: 4,
            context: 5,
            click: 6,
            query: 7,
            query_params: 8,
        }
    }
}

impl AssociatedColumns {
    /// Only the columns the session rules read have to be distinct.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_distinct(&self.rule_columns())
    }

    /// Minimum number of fields a row needs for the session rules.
    pub fn width(&self) -> usize {
        width(&self.rule_columns())
    }

    fn rule_columns(&self) -> [(&'static str, usize); 5] {
        [
            ("timestamp", self.timestamp),
            ("index", self.index),
            ("user", self.user),
            ("click", self.click),
            ("query", self.query),
        ]
    }
}

fn check_distinct(columns: &[(&'static str, usize)]) -> Result<(), ConfigError> {
    for (i, &(first, index)) in columns.iter().enumerate() {
        if let Some(&(second, _)) = columns[i + 1..].iter().find(|(_, other)| *other == index) {
            return Err(ConfigError::ColumnConflict {
                first,
                second,
                index,
            });
        }
    }
    Ok(())
}

fn width(columns: &[(&'static str, usize)]) -> usize {
    columns.iter().map(|&(_, index)| index + 1).max().unwrap_or(0)
}
