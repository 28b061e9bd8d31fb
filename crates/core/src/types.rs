use serde::{Deserialize, Serialize};

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// A single user-entered datum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Choice(Option<String>),
    Flag(bool),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn choice(value: impl Into<String>) -> Self {
        Self::Choice(Some(value.into()))
    }

    pub fn unselected() -> Self {
        Self::Choice(None)
    }

    pub fn flag(value: bool) -> Self {
        Self::Flag(value)
    }

    /// String view of the value; empty for flags and unselected choices.
    pub fn as_text(&self) -> &str {
        match self {
            Self::Text(s) => s,
            Self::Choice(Some(s)) => s,
            Self::Choice(None) | Self::Flag(_) => "",
        }
    }

    pub fn as_choice(&self) -> Option<&str> {
        match self {
            Self::Choice(c) => c.as_deref(),
            Self::Text(s) if !s.is_empty() => Some(s),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> bool {
        matches!(self, Self::Flag(true))
    }

    /// Whether the value counts as "not filled in".
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.trim().is_empty(),
            Self::Choice(c) => c.as_deref().map_or(true, |s| s.trim().is_empty()),
            Self::Flag(b) => !b,
        }
    }
}
