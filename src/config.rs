use std::collections::HashMap;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, anyhow};
use chrono::FixedOffset;
use dotenvy::dotenv;

use crate::engine::shift::parse_time_of_day;
use crate::engine::{LunchWindow, ShiftPolicy, StatsWindow, WindowBy};

/// Shift, lunch and statistics rules of the workshop.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttendancePolicy {
    pub shift: ShiftPolicy,
    pub lunch: LunchWindow,
    pub stats_window: StatsWindow,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub api_prefix: String,
    pub log_level: tracing::Level,

    // Rate limiting
    pub rate_kiosk_per_min: u32,
    pub rate_protected_per_min: u32,

    /// Offset of the workshop's local time from UTC.
    pub utc_offset: FixedOffset,
    pub attendance: AttendancePolicy,
    pub roster_cache_ttl: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        let vars: HashMap<String, String> = env::vars().collect();
        Self::from_vars(&vars)
    }

    pub fn from_vars(vars: &HashMap<String, String>) -> anyhow::Result<Self> {
        let get = |key: &str| vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());
        let required = |key: &str| {
            get(key)
                .map(str::to_string)
                .ok_or_else(|| anyhow!("{key} must be set"))
        };

        let shift = match get("SHIFT_POLICY").unwrap_or("split") {
            "split" => ShiftPolicy::split(
                parse_time_of_day(
                    "SHIFT_MORNING_CUTOFF",
                    get("SHIFT_MORNING_CUTOFF").unwrap_or("06:40"),
                )?,
                parse_time_of_day(
                    "SHIFT_AFTERNOON_CUTOFF",
                    get("SHIFT_AFTERNOON_CUTOFF").unwrap_or("13:10"),
                )?,
                parse_number("SHIFT_SPLIT_HOUR", get("SHIFT_SPLIT_HOUR").unwrap_or("12"))?,
            )?,
            "single" => ShiftPolicy::single(parse_time_of_day(
                "SHIFT_SINGLE_CUTOFF",
                get("SHIFT_SINGLE_CUTOFF").unwrap_or("09:00"),
            )?),
            other => return Err(anyhow!("SHIFT_POLICY must be split or single, got {other:?}")),
        };

        let lunch = LunchWindow::new(
            parse_time_of_day("LUNCH_START", get("LUNCH_START").unwrap_or("12:00"))?,
            parse_time_of_day("LUNCH_END", get("LUNCH_END").unwrap_or("13:00"))?,
        )?;

        let window_by = get("STATS_WINDOW_BY").unwrap_or("record_count");
        let stats_window = StatsWindow::new(
            WindowBy::from_str(window_by)
                .with_context(|| format!("STATS_WINDOW_BY has unknown value {window_by:?}"))?,
            parse_number("STATS_WINDOW_SIZE", get("STATS_WINDOW_SIZE").unwrap_or("30"))?,
        )?;

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            api_prefix: get("API_PREFIX").unwrap_or("/api").to_string(),
            log_level: parse_number("LOG_LEVEL", get("LOG_LEVEL").unwrap_or("debug"))?,

            rate_kiosk_per_min: parse_number(
                "RATE_KIOSK_PER_MIN",
                get("RATE_KIOSK_PER_MIN").unwrap_or("120"),
            )?,
            rate_protected_per_min: parse_number(
                "RATE_PROTECTED_PER_MIN",
                get("RATE_PROTECTED_PER_MIN").unwrap_or("1000"),
            )?,

            utc_offset: parse_utc_offset(get("WORKSHOP_UTC_OFFSET").unwrap_or("-03:00"))?,
            attendance: AttendancePolicy {
                shift,
                lunch,
                stats_window,
            },
            roster_cache_ttl: Duration::from_secs(parse_number(
                "ROSTER_CACHE_TTL_SECS",
                get("ROSTER_CACHE_TTL_SECS").unwrap_or("300"),
            )?),
        })
    }
}

fn parse_number<T>(key: &str, value: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| anyhow!("{key} has invalid value {value:?}: {e}"))
}

/// Parses `+HH:MM` / `-HH:MM` (a bare `HH:MM` is east of UTC).
pub fn parse_utc_offset(value: &str) -> anyhow::Result<FixedOffset> {
    let (sign, rest) = match value.as_bytes().first() {
        Some(b'-') => (-1, &value[1..]),
        Some(b'+') => (1, &value[1..]),
        _ => (1, value),
    };
    let (hours, minutes) = rest
        .split_once(':')
        .ok_or_else(|| anyhow!("WORKSHOP_UTC_OFFSET must look like -03:00, got {value:?}"))?;
    let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if !digits(hours) || !digits(minutes) {
        return Err(anyhow!("WORKSHOP_UTC_OFFSET must look like -03:00, got {value:?}"));
    }
    let hours: u32 = parse_number("WORKSHOP_UTC_OFFSET", hours)?;
    let minutes: u32 = parse_number("WORKSHOP_UTC_OFFSET", minutes)?;
    if hours > 23 || minutes >= 60 {
        return Err(anyhow!("WORKSHOP_UTC_OFFSET out of range: {value:?}"));
    }

    let seconds = (hours * 3600 + minutes * 60) as i32;
    FixedOffset::east_opt(sign * seconds)
        .ok_or_else(|| anyhow!("WORKSHOP_UTC_OFFSET out of range: {value:?}"))
}
