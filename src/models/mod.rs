use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The fixed hour estimates a tasking may carry.
pub const TASK_HOUR_OPTIONS: [i64; 8] = [1, 2, 4, 8, 16, 24, 48, 96];

pub const PROGRESS_ASSIGNED: &str = "Assigned";
pub const PROGRESS_COMPLETED: &str = "completed";

/// An employee on the roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// Store-assigned opaque identifier.
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    /// Free-text skill summary.
    pub skills: String,
    /// Public download reference for the profile image; clients fall back to a
    /// placeholder when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub date_joined: DateTime<Utc>,
}

impl Employee {
    pub fn new(name: String, skills: String, image_url: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            skills,
            image_url,
            date_joined: Utc::now(),
        }
    }
}

/// A unit-of-work assignment linking one employee to a task description, an
/// hour estimate and a due date. Employee references are not enforced by the
/// store; readers must tolerate orphans.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tasking {
    #[serde(rename = "_id")]
    pub id: String,
    pub employee_id: String,
    pub task_description: String,
    pub task_hours: i64,
    pub date_tasked: DateTime<Utc>,
    /// Legacy records may lack a due date; those stay out of the calendar but
    /// still count toward outstanding hours.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_due: Option<DateTime<Utc>>,
    /// Free-form progress string; `"completed"` is terminal for aggregation.
    pub task_progress: String,
}

impl Tasking {
    pub fn is_completed(&self) -> bool {
        self.task_progress == PROGRESS_COMPLETED
    }
}

/// One message in the global chat feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    #[serde(rename = "_id")]
    pub id: String,
    /// Sender's account email.
    pub email: String,
    pub message: String,
    /// Assigned by the service at write time, never by the client.
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(email: String, message: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email,
            message,
            timestamp: Utc::now(),
        }
    }
}
