use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field name to the list of messages describing why that field was rejected.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub id: u64,
    #[serde(rename = "action")]
    pub description: String,
    pub date: NaiveDate,
    pub points: u32,
}

/// Unvalidated fields submitted for create or update.
///
/// Every field is optional so the same shape serves full and partial updates.
/// Fields stay raw JSON values so a wrongly typed field is reported against
/// that field instead of failing the whole body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionInput {
    #[serde(rename = "action", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<serde_json::Value>,
}

impl ActionInput {
    pub fn new(description: impl Into<String>, date: impl Into<String>, points: i64) -> Self {
        Self {
            description: Some(serde_json::Value::String(description.into())),
            date: Some(serde_json::Value::String(date.into())),
            points: Some(points.into()),
        }
    }

    pub fn points_only(points: i64) -> Self {
        Self {
            points: Some(points.into()),
            ..Self::default()
        }
    }
}

/// On-disk representation of the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionData {
    pub next_id: u64,
    pub actions: Vec<Action>,
}

impl Default for ActionData {
    fn default() -> Self {
        Self {
            next_id: 1,
            actions: Vec::new(),
        }
    }
}

/// Uniform response wrapper shared by every endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
            errors: None,
            count: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatistics {
    pub total_actions: usize,
    pub total_points: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub success: bool,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub statistics: HealthStatistics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionStats {
    pub total_actions: usize,
    pub total_points: u64,
    pub average_points: u64,
    pub this_week_actions: usize,
    pub this_month_actions: usize,
    pub this_month_points: u64,
    pub monthly_progress_percent: u8,
}
