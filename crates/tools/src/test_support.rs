//! In-crate collaborator fakes for tool tests.

use async_trait::async_trait;
use chrono::Utc;
use memoh_core::error::{MessagingError, ScheduleError};
use memoh_core::messaging::{MessageSender, SendMessageOptions};
use memoh_core::schedule::{NewSchedule, Schedule, ScheduleStore};
use tokio::sync::Mutex;

#[derive(Default)]
pub struct MemoryScheduleStore {
    schedules: Mutex<Vec<Schedule>>,
}

#[async_trait]
impl ScheduleStore for MemoryScheduleStore {
    async fn create(&self, spec: NewSchedule) -> Result<Schedule, ScheduleError> {
        let mut schedules = self.schedules.lock().await;
        let schedule = Schedule {
            id: format!("s{}", schedules.len() + 1),
            name: spec.name,
            description: spec.description,
            pattern: spec.pattern,
            max_calls: spec.max_calls,
            calls: 0,
            command: spec.command,
            created_at: Utc::now(),
        };
        schedules.push(schedule.clone());
        Ok(schedule)
    }

    async fn list(&self) -> Result<Vec<Schedule>, ScheduleError> {
        Ok(self.schedules.lock().await.clone())
    }

    async fn remove(&self, id: &str) -> Result<(), ScheduleError> {
        let mut schedules = self.schedules.lock().await;
        let before = schedules.len();
        schedules.retain(|s| s.id != id);
        if schedules.len() == before {
            return Err(ScheduleError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingSender {
    pub async fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send(&self, platform: &str, options: SendMessageOptions) -> Result<(), MessagingError> {
        self.sent
            .lock()
            .await
            .push((platform.to_string(), options.message));
        Ok(())
    }
}
