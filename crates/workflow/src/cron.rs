//! Standard 5-field cron expressions: `minute hour day-of-month month day-of-week`.

use chrono::{DateTime, Datelike, Timelike, Utc};

/// A parsed cron expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronExpr {
    minutes: Vec<u32>,
    hours: Vec<u32>,
    days_of_month: Vec<u32>,
    months: Vec<u32>,
    days_of_week: Vec<u32>, // 0=Sun, 6=Sat
}

impl CronExpr {
    /// Parse a cron expression.
    ///
    /// Supports: `*`, `*/N` (step), `N` (literal), `N-M` (range), `N,M` (list).
    /// A day-of-week of `7` is read as Sunday.
    pub fn parse(expr: &str) -> Result<Self, String> {
        let fields: Vec<&str> = expr.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(format!(
                "Expected 5 fields (minute hour dom month dow), got {}",
                fields.len()
            ));
        }

        let mut days_of_week = parse_field(fields[4], 0, 7)?;
        if days_of_week.contains(&7) {
            days_of_week.retain(|d| *d != 7);
            days_of_week.push(0);
            days_of_week.sort_unstable();
            days_of_week.dedup();
        }

        Ok(Self {
            minutes: parse_field(fields[0], 0, 59)?,
            hours: parse_field(fields[1], 0, 23)?,
            days_of_month: parse_field(fields[2], 1, 31)?,
            months: parse_field(fields[3], 1, 12)?,
            days_of_week,
        })
    }

    /// Whether `dt` falls in a minute this expression selects.
    pub fn matches(&self, dt: &DateTime<Utc>) -> bool {
        self.minutes.contains(&dt.minute())
            && self.hours.contains(&dt.hour())
            && self.days_of_month.contains(&dt.day())
            && self.months.contains(&dt.month())
            && self
                .days_of_week
                .contains(&dt.weekday().num_days_from_sunday())
    }
}

fn parse_field(field: &str, min: u32, max: u32) -> Result<Vec<u32>, String> {
    let mut values = Vec::new();

    for part in field.split(',') {
        let part = part.trim();

        if let Some((base, step)) = part.split_once('/') {
            let step: u32 = step
                .parse()
                .map_err(|_| format!("Invalid step: {step}"))?;
            if step == 0 {
                return Err("Step cannot be zero".into());
            }
            let (start, end) = if base == "*" {
                (min, max)
            } else if base.contains('-') {
                parse_range(base, min, max)?
            } else {
                (parse_value(base, min, max)?, max)
            };
            values.extend((start..=end).step_by(step as usize));
        } else if part.contains('-') {
            let (start, end) = parse_range(part, min, max)?;
            values.extend(start..=end);
        } else if part == "*" {
            values.extend(min..=max);
        } else {
            values.push(parse_value(part, min, max)?);
        }
    }

    values.sort_unstable();
    values.dedup();
    if values.is_empty() {
        return Err("Field produced no values".into());
    }
    Ok(values)
}

fn parse_value(s: &str, min: u32, max: u32) -> Result<u32, String> {
    let v: u32 = s.parse().map_err(|_| format!("Invalid number: {s}"))?;
    if v < min || v > max {
        return Err(format!("{v} out of range {min}-{max}"));
    }
    Ok(v)
}

fn parse_range(s: &str, min: u32, max: u32) -> Result<(u32, u32), String> {
    let (start, end) = s
        .split_once('-')
        .ok_or_else(|| format!("Invalid range: {s}"))?;
    let start: u32 = start
        .parse()
        .map_err(|_| format!("Invalid range start: {start}"))?;
    let end: u32 = end
        .parse()
        .map_err(|_| format!("Invalid range end: {end}"))?;
    if start < min || end > max || start > end {
        return Err(format!("Range {start}-{end} invalid for {min}-{max}"));
    }
    Ok((start, end))
}
