//! Draft and schedule request types.

use std::fmt;

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::error::ValidationError;
use crate::core::UserIdentity;

/// Accepted local date-time layouts, tried in order.
const LOCAL_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// The live generated post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    /// Post text, exactly as generated or as edited by the user
    pub content: String,
}

impl Draft {
    /// Create a draft from content.
    pub fn new(content: impl Into<String>) -> Self {
        Self { content: content.into() }
    }

    /// Whether the draft has no content.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// A validated schedule time.
///
/// Keeps the user's original text for the wire and the parsed value for
/// comparisons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleTime {
    raw: String,
    at: NaiveDateTime,
}

impl ScheduleTime {
    /// Parse a user-supplied time.
    ///
    /// Accepts `YYYY-MM-DDTHH:MM`, `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD HH:MM`
    /// and RFC 3339.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err(ValidationError::MissingScheduleTime);
        }

        let at = LOCAL_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .or_else(|| {
                DateTime::parse_from_rfc3339(raw)
                    .ok()
                    .map(|dt| dt.with_timezone(&Local).naive_local())
            })
            .ok_or_else(|| ValidationError::UnparseableScheduleTime(raw.to_string()))?;

        Ok(Self { raw: raw.to_string(), at })
    }

    /// The trimmed text as entered.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Parsed local date-time.
    pub fn at(&self) -> NaiveDateTime {
        self.at
    }

    /// Whether this time lies after `now`.
    pub fn is_after(&self, now: NaiveDateTime) -> bool {
        self.at > now
    }
}

impl fmt::Display for ScheduleTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for ScheduleTime {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for ScheduleTime {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Request body of `POST /schedule_post`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    /// Post text
    pub content: String,
    /// When to publish
    pub scheduled_time: ScheduleTime,
    /// Owner of the post
    pub user_id: UserIdentity,
}

impl ScheduleRequest {
    /// Build a request, enforcing the local preconditions.
    ///
    /// Content is checked before the time, so an empty draft is reported
    /// even when no time was picked.
    pub fn new(draft: &Draft, time: &str, user_id: UserIdentity) -> Result<Self, ValidationError> {
        if draft.is_empty() {
            return Err(ValidationError::EmptyContent);
        }

        let scheduled_time = ScheduleTime::parse(time)?;
        Ok(Self { content: draft.content.clone(), scheduled_time, user_id })
    }
}
