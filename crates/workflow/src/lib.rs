//! Workflow engine — the schedule store and the background scheduler.
//!
//! [`InMemoryScheduleStore`] backs the schedule tools the model sees and
//! validates every pattern as a cron expression on create. [`Scheduler`]
//! checks the store once a minute and emits each due schedule on a
//! channel; the caller feeds them to the agent's schedule trigger.

pub mod cron;

pub use cron::CronExpr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use memoh_core::error::ScheduleError;
use memoh_core::{NewSchedule, Schedule, ScheduleStore};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock, mpsc};
use tracing::{debug, info, warn};

/// A schedule store held in process memory.
#[derive(Clone, Default)]
pub struct InMemoryScheduleStore {
    schedules: Arc<RwLock<BTreeMap<String, Schedule>>>,
}

impl InMemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create every seed schedule, returning one message per rejected seed.
    pub async fn seed(&self, seeds: &[NewSchedule]) -> Vec<String> {
        let mut errors = Vec::new();
        for seed in seeds {
            if let Err(e) = self.create(seed.clone()).await {
                errors.push(format!("Schedule '{}': {e}", seed.name));
            }
        }
        errors
    }

    /// Count one call against a schedule and return its updated state.
    pub async fn record_call(&self, id: &str) -> Option<Schedule> {
        let mut map = self.schedules.write().await;
        let schedule = map.get_mut(id)?;
        schedule.calls = schedule.calls.saturating_add(1);
        Some(schedule.clone())
    }
}

#[async_trait]
impl ScheduleStore for InMemoryScheduleStore {
    async fn create(&self, spec: NewSchedule) -> Result<Schedule, ScheduleError> {
        CronExpr::parse(&spec.pattern).map_err(|reason| ScheduleError::InvalidPattern {
            pattern: spec.pattern.clone(),
            reason,
        })?;

        let schedule = Schedule {
            id: uuid::Uuid::new_v4().to_string(),
            name: spec.name,
            description: spec.description,
            pattern: spec.pattern,
            max_calls: spec.max_calls,
            calls: 0,
            command: spec.command,
            created_at: Utc::now(),
        };
        info!(schedule_id = %schedule.id, name = %schedule.name, pattern = %schedule.pattern, "Schedule created");
        self.schedules
            .write()
            .await
            .insert(schedule.id.clone(), schedule.clone());
        Ok(schedule)
    }

    async fn list(&self) -> Result<Vec<Schedule>, ScheduleError> {
        let mut all: Vec<Schedule> = self.schedules.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn remove(&self, id: &str) -> Result<(), ScheduleError> {
        match self.schedules.write().await.remove(id) {
            Some(_) => {
                info!(schedule_id = %id, "Schedule removed");
                Ok(())
            }
            None => Err(ScheduleError::NotFound(id.to_string())),
        }
    }
}

/// Fires due schedules from an [`InMemoryScheduleStore`].
pub struct Scheduler {
    store: InMemoryScheduleStore,
    /// Minute (seconds since epoch / 60) each schedule last fired in
    last_fired: Mutex<HashMap<String, i64>>,
}

impl Scheduler {
    pub fn new(store: InMemoryScheduleStore) -> Self {
        Self {
            store,
            last_fired: Mutex::new(HashMap::new()),
        }
    }

    /// Schedules due at `now`, each counted as one call.
    ///
    /// A schedule fires at most once per minute and never once its
    /// `max_calls` is used up.
    pub async fn due(&self, now: DateTime<Utc>) -> Vec<Schedule> {
        let minute = now.timestamp().div_euclid(60);
        let candidates = self.store.schedules.read().await.values().cloned().collect::<Vec<_>>();
        let mut last_fired = self.last_fired.lock().await;
        let mut fired = Vec::new();

        for schedule in candidates {
            if schedule.is_exhausted() {
                continue;
            }
            let expr = match CronExpr::parse(&schedule.pattern) {
                Ok(e) => e,
                Err(e) => {
                    warn!(schedule_id = %schedule.id, error = %e, "Invalid cron expression, skipping");
                    continue;
                }
            };
            if !expr.matches(&now) || last_fired.get(&schedule.id) == Some(&minute) {
                continue;
            }

            last_fired.insert(schedule.id.clone(), minute);
            if let Some(updated) = self.store.record_call(&schedule.id).await {
                info!(schedule_id = %updated.id, name = %updated.name, calls = updated.calls, "Schedule triggered");
                fired.push(updated);
            }
        }

        last_fired.retain(|_, m| *m == minute);
        fired
    }

    /// Start the background loop.
    ///
    /// Returns a receiver of fired schedules and the loop's join handle. The
    /// loop stops when the receiver is dropped.
    pub fn start(self) -> (mpsc::Receiver<Schedule>, tokio::task::JoinHandle<()>) {
        let (tx, rx) = mpsc::channel::<Schedule>(64);

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(60));
            loop {
                interval.tick().await;
                for schedule in self.due(Utc::now()).await {
                    if tx.send(schedule).await.is_err() {
                        debug!("Schedule receiver dropped, stopping scheduler");
                        return;
                    }
                }
            }
        });

        (rx, handle)
    }
}
