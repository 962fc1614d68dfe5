//! Schedule store trait — recurring or one-shot triggers owned by the caller.
//!
//! The agent never interprets a schedule beyond rendering it into an
//! instruction; validation and firing belong to the store and scheduler.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::error::ScheduleError;

/// A stored schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Unique schedule ID
    pub id: String,

    /// Short human-readable name
    pub name: String,

    /// What the schedule is for
    #[serde(default)]
    pub description: String,

    /// Cadence (a cron expression for the built-in store)
    pub pattern: String,

    /// Stop firing after this many calls (`None` = unbounded)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_calls: Option<u32>,

    /// How many times this schedule has fired
    #[serde(default)]
    pub calls: u32,

    /// The instruction to carry out when the schedule fires
    pub command: String,

    /// When the schedule was created
    pub created_at: DateTime<Utc>,
}

impl Schedule {
    /// Whether the schedule still has calls left.
    pub fn is_exhausted(&self) -> bool {
        self.max_calls.is_some_and(|max| self.calls >= max)
    }
}

/// The payload for creating a schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSchedule {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_calls: Option<u32>,
    pub command: String,
}

/// The schedule collaborator.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Create a schedule and return it with its assigned ID.
    async fn create(&self, spec: NewSchedule) -> std::result::Result<Schedule, ScheduleError>;

    /// All schedules.
    async fn list(&self) -> std::result::Result<Vec<Schedule>, ScheduleError>;

    /// Remove a schedule by ID.
    async fn remove(&self, id: &str) -> std::result::Result<(), ScheduleError>;
}
