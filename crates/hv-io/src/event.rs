//! # Log Line Model
//!
//! Raw search and click logs arrive as newline-delimited JSON, one
//! `{"jsonPayload": {...}}` object per line. Search and click events share
//! the payload shape; a search always names the index it ran against.

use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    Search,
    Click,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogLine {
    #[serde(rename = "jsonPayload", default)]
    pub payload: Payload,
}

impl LogLine {
    pub fn kind(&self) -> LogKind {
        // `index` is mandatory for search events.
        if self.payload.index.is_empty() {
            LogKind::Click
        } else {
            LogKind::Search
        }
    }

    /// CSV row for this line: the search or click layout, by kind.
    pub fn to_row(&self) -> Vec<&str> {
        let p = &self.payload;
        match self.kind() {
            LogKind::Search => vec![
                p.timestamp.as_str(),
                p.app_id.as_str(),
                p.index.as_str(),
                p.query_id.as_str(),
                p.user_id.as_str(),
                p.context.as_str(),
                p.query.as_str(),
                p.query_parameters.as_str(),
            ],
            LogKind::Click => vec![
                p.timestamp.as_str(),
                p.app_id.as_str(),
                p.query_id.as_str(),
                p.position.as_str(),
                p.object_id.as_str(),
            ],
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Payload {
    #[serde(deserialize_with = "number_text")]
    pub timestamp: String,
    pub index: String,
    #[serde(rename = "appID")]
    pub app_id: String,
    #[serde(rename = "queryID")]
    pub query_id: String,
    #[serde(rename = "userID")]
    pub user_id: String,
    pub context: String,
    pub query: String,
    pub query_parameters: String,
    #[serde(deserialize_with = "number_text")]
    pub position: String,
    #[serde(rename = "objectID")]
    pub object_id: String,
}

/// Numbers are kept as their literal text; numeric strings are accepted too.
fn number_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(D::Error::custom(format!("expected a number, got {other}"))),
    }
}
