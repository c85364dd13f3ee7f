// Date parsing and display helpers
//
// Instants are stored as `DateTime<Utc>`; calendar-day questions are always
// answered in an explicit timezone.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Display format for timestamps in the details view and exports
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse an ISO-8601 UTC timestamp as sent by the remote API
/// (e.g. `2024-06-10T00:00:00.000Z`).
pub fn parse_remote_timestamp(value: &str) -> Result<DateTime<Utc>> {
    let trimmed = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    // Some records omit the zone designator; the API always means UTC
    let naive = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .with_context(|| format!("Invalid timestamp: '{}'", value))?;
    Ok(Utc.from_utc_datetime(&naive))
}

/// Format an instant for the remote API
pub fn to_remote_timestamp(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Calendar date of an instant in the reference timezone
pub fn local_date(dt: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    dt.with_timezone(tz).date_naive()
}

pub fn format_local(dt: DateTime<Utc>, tz: &Tz) -> String {
    dt.with_timezone(tz).format(DISPLAY_FORMAT).to_string()
}

pub fn format_local_date(dt: DateTime<Utc>, tz: &Tz) -> String {
    dt.with_timezone(tz).format("%Y-%m-%d").to_string()
}

/// Start of a calendar day in the given timezone
pub fn start_of_day(date: NaiveDate, tz: &Tz) -> Result<DateTime<Utc>> {
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| anyhow::anyhow!("Invalid date"))?;
    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        // Midnight skipped by a DST jump; the day starts an hour later
        LocalResult::None => tz
            .from_local_datetime(&(midnight + Duration::hours(1)))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| anyhow::anyhow!("Nonexistent local time for {}", date)),
    }
}

/// Parse a reference date expression: `now`, `today`, `tomorrow`,
/// `yesterday` or an absolute `YYYY-MM-DD` (start of that day).
pub fn parse_reference_date(expr: &str, tz: &Tz, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let today = local_date(now, tz);
    match expr.trim() {
        "now" | "today" => Ok(now),
        "tomorrow" => start_of_day(today + Duration::days(1), tz),
        "yesterday" => start_of_day(today - Duration::days(1), tz),
        other => {
            let date = NaiveDate::parse_from_str(other, "%Y-%m-%d").with_context(|| {
                format!("Unsupported date expression: '{}'. Use YYYY-MM-DD or today.", other)
            })?;
            start_of_day(date, tz)
        }
    }
}
