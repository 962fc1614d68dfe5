//! `memoh daemon` — Fire configured schedules and run each as a turn.

use memoh_workflow::{InMemoryScheduleStore, Scheduler};
use std::sync::Arc;
use tracing::{error, info, warn};

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;

    let store = InMemoryScheduleStore::new();
    for problem in store.seed(&config.schedules).await {
        warn!(%problem, "Skipping configured schedule");
    }

    let agent = super::session_builder(&config)?
        .with_schedule_store(Arc::new(store.clone()))
        .build();

    let (mut fired, handle) = Scheduler::new(store).start();
    info!(schedules = config.schedules.len(), "Daemon started");

    loop {
        tokio::select! {
            schedule = fired.recv() => {
                let Some(schedule) = schedule else {
                    break;
                };
                match agent.trigger_schedule(&schedule).await {
                    Ok(result) => info!(
                        schedule_id = %schedule.id,
                        messages = result.messages.len(),
                        "Scheduled turn complete"
                    ),
                    Err(e) => error!(schedule_id = %schedule.id, error = %e, "Scheduled turn failed"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down daemon");
                break;
            }
        }
    }

    handle.abort();
    Ok(())
}
