use serde::{Deserialize, Serialize};

/// Epoch milliseconds, matching the timestamps the frontend produces with
/// `Date.now()`.
pub type Timestamp = i64;

pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct ShoppingItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub completed_at: Option<Timestamp>,
    pub updated_at: Timestamp,
}

/// Persisted countdown record: the handle of the one outstanding scheduled
/// notification plus every acknowledgement, most recent first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub struct ReminderState {
    #[serde(default)]
    pub current_notification_id: Option<String>,
    #[serde(default)]
    pub completed_at_timestamps: Vec<Timestamp>,
}

impl ReminderState {
    pub fn last_completed_at(&self) -> Option<Timestamp> {
        self.completed_at_timestamps.first().copied()
    }

    /// The state after marking the chore done at `now`: history grows by
    /// prepending and the outstanding handle is replaced wholesale.
    pub fn acknowledged(&self, now: Timestamp, notification_id: Option<String>) -> Self {
        let mut completed_at_timestamps = Vec::with_capacity(self.completed_at_timestamps.len() + 1);
        completed_at_timestamps.push(now);
        completed_at_timestamps.extend_from_slice(&self.completed_at_timestamps);
        Self {
            current_notification_id: notification_id,
            completed_at_timestamps,
        }
    }
}

/// Runtime configuration for the single tracked chore. Built once at startup
/// and injected into the state; not persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct ReminderConfig {
    pub period_ms: i64,
    pub title: String,
    pub body: String,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            period_ms: DAY_MS,
            title: "Time to water the plants!".to_string(),
            body: "Mark the chore done in Taskly to restart the countdown.".to_string(),
        }
    }
}

/// `|now - target|` broken down for display. All components are
/// non-negative; the overdue flag carries the direction.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub struct TimeParts {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

/// Derived countdown view, recomputed every tick and never persisted.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct CountdownStatus {
    pub target_at: Timestamp,
    pub is_overdue: bool,
    pub parts: TimeParts,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct HistoryEntry {
    pub completed_at: Timestamp,
    pub label: String,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    Granted,
    Denied,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ShoppingFile {
    pub schema_version: u32,
    pub items: Vec<ShoppingItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CountdownFile {
    pub schema_version: u32,
    pub reminder: ReminderState,
}
