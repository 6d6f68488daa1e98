//! Time window arguments shared by `clip` and `range`.

use anyhow::{bail, Result};
use chrono::{DateTime, Duration, TimeZone, Utc};
use clap::Args;

#[derive(Debug, Clone, Args)]
pub struct WindowArgs {
    /// Start of the clip: RFC 3339 (`2024-05-10T12:00:00Z`) or Unix seconds.
    #[arg(long, short = 's', value_parser = parse_instant)]
    pub start: DateTime<Utc>,

    /// End of the clip (same formats as --start).
    #[arg(long, short = 'e', value_parser = parse_instant, conflicts_with = "duration", required_unless_present = "duration")]
    pub end: Option<DateTime<Utc>>,

    /// Clip length instead of --end: `HH:MM:SS`, `MM:SS` or seconds (`90`, `7.68`).
    #[arg(long, short = 'd', value_parser = parse_duration)]
    pub duration: Option<Duration>,
}

impl WindowArgs {
    /// Absolute `(start, end)`; the end must come after the start.
    pub fn resolve(&self) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
        let end = match (self.end, self.duration) {
            (Some(end), _) => end,
            (None, Some(d)) => self.start + d,
            (None, None) => bail!("either --end or --duration is required"),
        };
        if end <= self.start {
            bail!("end ({}) must be after start ({})", end, self.start);
        }
        Ok((self.start, end))
    }
}

pub fn parse_instant(s: &str) -> Result<DateTime<Utc>, String> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(secs) = s.parse::<i64>() {
        return Utc
            .timestamp_opt(secs, 0)
            .single()
            .ok_or_else(|| format!("timestamp out of range: {}", secs));
    }
    Err(format!(
        "invalid time '{}': expected RFC 3339 (e.g. 2024-05-10T12:00:00Z) or Unix seconds",
        s
    ))
}

pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    let invalid = || format!("invalid duration '{}': expected HH:MM:SS, MM:SS or seconds", s);
    let parts: Vec<&str> = s.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [secs] => (0, 0, *secs),
        [m, secs] => (0, m.parse::<i64>().map_err(|_| invalid())?, *secs),
        [h, m, secs] => (
            h.parse::<i64>().map_err(|_| invalid())?,
            m.parse::<i64>().map_err(|_| invalid())?,
            *secs,
        ),
        _ => return Err(invalid()),
    };
    let seconds: f64 = seconds.parse().map_err(|_| invalid())?;
    if hours < 0 || minutes < 0 || !seconds.is_finite() || seconds < 0.0 {
        return Err(invalid());
    }
    let millis = (seconds * 1000.0).round() as i64;
    let total = Duration::hours(hours) + Duration::minutes(minutes) + Duration::milliseconds(millis);
    if total <= Duration::zero() {
        return Err(format!("duration must be positive: '{}'", s));
    }
    Ok(total)
}
