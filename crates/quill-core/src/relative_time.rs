//! Human-friendly "time ago" rendering for post and comment timestamps.

use chrono::{DateTime, Utc};

use crate::{Error, Result};

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;

/// Render `ts` relative to `now`.
///
/// Anything older than a week falls back to a calendar date such as
/// `Jan 5, 2024`, rendered in UTC. Timestamps in the future read as
/// "just now".
pub fn format_relative_date(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
  let secs = (now - ts).num_seconds();

  if secs < MINUTE {
    "just now".to_owned()
  } else if secs < HOUR {
    ago(secs / MINUTE, "minute")
  } else if secs < DAY {
    ago(secs / HOUR, "hour")
  } else if secs < WEEK {
    ago(secs / DAY, "day")
  } else {
    ts.format("%b %-d, %Y").to_string()
  }
}

/// Parse an RFC 3339 timestamp and render it with [`format_relative_date`].
pub fn format_relative_str(ts: &str, now: DateTime<Utc>) -> Result<String> {
  let parsed = DateTime::parse_from_rfc3339(ts).map_err(|e| Error::InvalidTimestamp {
    value:  ts.to_owned(),
    reason: e.to_string(),
  })?;
  Ok(format_relative_date(parsed.with_timezone(&Utc), now))
}

fn ago(n: i64, unit: &str) -> String {
  if n == 1 {
    format!("1 {unit} ago")
  } else {
    format!("{n} {unit}s ago")
  }
}
