use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Storage format for due dates: a plain calendar date, no time or zone.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Due date as shown in the task table.
pub const LIST_DATE_FORMAT: &str = "%Y/%m/%d";
/// Due date as shown on the date picker trigger.
pub const PICKER_DATE_FORMAT: &str = "%B %-d, %Y";

/// Server-generated row identifier. Kept opaque: the hosted table may use
/// uuids or integer identities, both are carried as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        TaskId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(id) => TaskId(id),
            RawId::Number(id) => TaskId(id.to_string()),
        })
    }
}

/// One row of the `todos` table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Task {
    pub id: TaskId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub task: String,
    #[serde(default, deserialize_with = "due_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_completed: bool,
    #[serde(default, deserialize_with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn due_label(&self) -> String {
        match self.due_date {
            Some(date) => date.format(LIST_DATE_FORMAT).to_string(),
            None => "-".to_string(),
        }
    }
}

/// Insert payload. `id` and `created_at` are left to the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTask {
    pub task: String,
    pub due_date: Option<NaiveDate>,
    pub is_completed: bool,
}

/// Full update of the editable columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskChanges {
    pub task: String,
    pub due_date: Option<NaiveDate>,
    pub is_completed: bool,
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

/// Reads a due date stored either as a plain date or as a timestamp, keeping
/// the calendar date as written.
pub fn parse_due_date(value: &str) -> Option<NaiveDate> {
    parse_date(value)
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|ts| ts.date_naive())
        })
        .or_else(|| parse_timestamp(value).map(|ts| ts.date_naive()))
}

/// Accepts RFC 3339 (`timestamptz`) as well as zone-less timestamps, which
/// are read as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// An unreadable due date drops the date, not the row.
fn due_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.and_then(|raw| parse_due_date(&raw)))
}

fn timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}"))),
    }
}
