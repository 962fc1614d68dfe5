//! Rendering a fired schedule into the user turn that carries it out.

use chrono::{DateTime, Utc};
use memoh_core::Schedule;
use memoh_core::locale::{format_date, format_time};

/// The instruction submitted as a user turn when `schedule` fires at `now`.
pub fn schedule_prompt(schedule: &Schedule, now: &DateTime<Utc>, locale: &str) -> String {
    let calls = match schedule.max_calls {
        Some(max) => format!("{}/{max}", schedule.calls),
        None => schedule.calls.to_string(),
    };

    let mut text = format!(
        "---\nnotice: scheduled task triggered\nschedule-id: {}\nname: {}\npattern: {}\ncalls: {calls}\ndate: {}\ntime: {}\ntimezone: UTC\n---\n",
        schedule.id,
        schedule.name,
        schedule.pattern,
        format_date(now, locale),
        format_time(now, locale),
    );

    if !schedule.description.trim().is_empty() {
        text.push_str(schedule.description.trim());
        text.push_str("\n\n");
    }

    text.push_str(
        "This message was sent by the scheduler, not typed by the user. \
         Carry out the following instruction now:\n",
    );
    text.push_str(&schedule.command);
    text
}
