//! # Query Records
//!
//! The engine reads records through the [`SearchQuery`] trait so that any
//! row shape can flow through it untouched: a CSV row keeps its source
//! columns, a JSON record keeps its source fields. [`QueryRecord`] is the
//! structured form used by the JSON-lines format and by tests.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Read-only view of the fields the decision rules inspect.
///
/// Everything else a record carries is passthrough.
pub trait SearchQuery {
    fn user_id(&self) -> &str;
    fn index_name(&self) -> &str;
    fn query_text(&self) -> &str;
    fn had_click(&self) -> bool;

    /// Timestamp in the input's unit, or `None` when the field is not an integer.
    fn timestamp(&self) -> Option<i64>;
}

impl<T: SearchQuery + ?Sized> SearchQuery for &T {
    fn user_id(&self) -> &str {
        (**self).user_id()
    }

    fn index_name(&self) -> &str {
        (**self).index_name()
    }

    fn query_text(&self) -> &str {
        (**self).query_text()
    }

    fn had_click(&self) -> bool {
        (**self).had_click()
    }

    fn timestamp(&self) -> Option<i64> {
        (**self).timestamp()
    }
}

/// Parse a timestamp field. Only a bare base-10 integer counts; surrounding
/// whitespace makes the field unparsable.
#[inline]
pub fn parse_millis(raw: &str) -> Option<i64> {
    raw.parse().ok()
}

/// A timestamp kept as the text it arrived as.
///
/// Output must reproduce the input value exactly, including values that do
/// not parse, so parsing happens on demand in [`Timestamp::millis`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timestamp(String);

impl Timestamp {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn millis(&self) -> Option<i64> {
        parse_millis(&self.0)
    }
}

impl From<i64> for Timestamp {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.millis() {
            Some(ms) if ms.to_string() == self.0 => serializer.serialize_i64(ms),
            _ => serializer.serialize_str(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Signed(i64),
            Unsigned(u64),
            Float(f64),
            Text(String),
            Missing(()),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Signed(n) => Self(n.to_string()),
            Raw::Unsigned(n) => Self(n.to_string()),
            Raw::Float(n) => Self(n.to_string()),
            Raw::Text(s) => Self(s),
            Raw::Missing(()) => Self::default(),
        })
    }
}

/// One observed search query, annotated with its click flag.
///
/// Field names on the wire follow the log producer (`appID`, `index`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRecord {
    #[serde(default)]
    pub timestamp: Timestamp,
    #[serde(rename = "appID", default)]
    pub app_id: String,
    #[serde(rename = "index", default)]
    pub index_name: String,
    #[serde(rename = "queryID", default)]
    pub query_id: String,
    #[serde(rename = "userID", default)]
    pub user_id: String,
    #[serde(default)]
    pub context: String,
    #[serde(rename = "hadClick", default)]
    pub had_click: bool,
    #[serde(rename = "query", default)]
    pub query_text: String,
    #[serde(rename = "queryParameters", default)]
    pub query_parameters: String,
}

impl QueryRecord {
    /// Build a record from the fields the rules look at; passthrough fields stay empty.
    pub fn new(
        timestamp: impl Into<Timestamp>,
        user_id: impl Into<String>,
        index_name: impl Into<String>,
        query_text: impl Into<String>,
        had_click: bool,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            user_id: user_id.into(),
            index_name: index_name.into(),
            query_text: query_text.into(),
            had_click,
            ..Default::default()
        }
    }
}

impl SearchQuery for QueryRecord {
    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn index_name(&self) -> &str {
        &self.index_name
    }

    fn query_text(&self) -> &str {
        &self.query_text
    }

    fn had_click(&self) -> bool {
        self.had_click
    }

    fn timestamp(&self) -> Option<i64> {
        self.timestamp.millis()
    }
}
