//! Date/time utilities for StoreIt.

use chrono::{DateTime, Datelike, Timelike, Utc};
use chrono_tz::Tz;

/// Placeholder shown when there is no date to display.
pub const NO_DATE: &str = "—";

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Format an RFC3339 timestamp as `"3:45pm, 15 Jul"` in the given timezone.
///
/// Returns [`NO_DATE`] when the input is absent, empty or not a valid
/// timestamp. An unknown timezone falls back to UTC.
pub fn format_date_time(iso: Option<&str>, timezone: &str) -> String {
    let Some(iso) = iso.filter(|s| !s.is_empty()) else {
        return NO_DATE.to_string();
    };

    let Ok(parsed) = DateTime::parse_from_rfc3339(iso) else {
        return NO_DATE.to_string();
    };

    let tz: Tz = timezone.parse().unwrap_or(Tz::UTC);
    let local = parsed.with_timezone(&Utc).with_timezone(&tz);

    let (is_pm, hour) = local.hour12();
    let period = if is_pm { "pm" } else { "am" };
    let month = MONTH_NAMES[local.month0() as usize];

    format!(
        "{}:{:02}{}, {} {}",
        hour,
        local.minute(),
        period,
        local.day(),
        month
    )
}
