//! Locale-aware date and time rendering for prompts and transcripts.
//!
//! Only the handful of conventions the prompts need are covered; any other
//! locale tag falls back to ISO 8601.

use chrono::{DateTime, Datelike, Timelike, Utc};

/// Date/time ordering convention for a locale tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Convention {
    /// M/D/YYYY, 12-hour clock
    UnitedStates,
    /// DD/MM/YYYY, 24-hour clock
    DayFirstSlash,
    /// D.M.YYYY, 24-hour clock
    DayFirstDot,
    /// YYYY/M/D, 24-hour clock
    YearFirst,
    /// YYYY-MM-DD, 24-hour clock
    Iso,
}

fn convention(locale: &str) -> Convention {
    let tag = locale.replace('_', "-").to_ascii_lowercase();
    let language = tag.split('-').next().unwrap_or_default();
    match tag.as_str() {
        "en-us" | "en" => Convention::UnitedStates,
        "en-gb" | "en-au" | "en-nz" | "en-ie" | "en-in" => Convention::DayFirstSlash,
        _ => match language {
            "fr" | "es" | "it" | "pt" => Convention::DayFirstSlash,
            "de" | "ru" | "pl" | "tr" | "fi" | "nb" | "cs" => Convention::DayFirstDot,
            "zh" | "ja" => Convention::YearFirst,
            _ => Convention::Iso,
        },
    }
}

/// Render the calendar date of `ts` for `locale`.
pub fn format_date(ts: &DateTime<Utc>, locale: &str) -> String {
    let (y, m, d) = (ts.year(), ts.month(), ts.day());
    match convention(locale) {
        Convention::UnitedStates => format!("{m}/{d}/{y}"),
        Convention::DayFirstSlash => format!("{d:02}/{m:02}/{y}"),
        Convention::DayFirstDot => format!("{d}.{m}.{y}"),
        Convention::YearFirst => format!("{y}/{m}/{d}"),
        Convention::Iso => format!("{y}-{m:02}-{d:02}"),
    }
}

/// Render the wall-clock time of `ts` for `locale`.
pub fn format_time(ts: &DateTime<Utc>, locale: &str) -> String {
    let (h, min, s) = (ts.hour(), ts.minute(), ts.second());
    match convention(locale) {
        Convention::UnitedStates => {
            let (pm, h12) = ts.hour12();
            let suffix = if pm { "PM" } else { "AM" };
            format!("{h12}:{min:02}:{s:02} {suffix}")
        }
        _ => format!("{h:02}:{min:02}:{s:02}"),
    }
}
