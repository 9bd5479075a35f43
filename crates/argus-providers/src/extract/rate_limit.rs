use crate::extract::activity::tail;
use argus_types::{Block, Entry, TimestampMs};
use chrono::{Local, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;

const TAIL_WINDOW: usize = 15;
const DEFAULT_RESET_MINUTES: i64 = 5;

static LIMIT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)you'?ve hit your (usage |rate )?limit",
        r"(?i)rate limit(ed| exceeded)",
        r"(?i)too many requests",
        r"(?i)quota exceeded",
        r"(?i)overloaded",
        r"429",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static rate-limit pattern is valid"))
    .collect()
});

static RESET_IN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)in (\d+)\s*(min|sec|hour)s?").expect("static pattern"));
static RESET_AT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)at (\d{1,2}):(\d{2})\s*(am|pm)?").expect("static pattern"));
static RESET_HOUR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)resets?\s+(\d{1,2})\s*(am|pm)").expect("static pattern"));

/// Rate limit detection: scans the tail window for a rate-limit phrase in
/// `System` text or assistant `Text` blocks, then parses a reset time from the same
/// message. `now` is injected so the "has this time already passed today" rollover
/// is testable without wall-clock dependence.
pub fn rate_limit(entries: &[Entry], now: TimestampMs) -> Option<TimestampMs> {
    let window = tail(entries, TAIL_WINDOW);

    for entry in window.iter().rev() {
        let text = match entry {
            Entry::System { text } => text.as_str(),
            Entry::Assistant { blocks } => match blocks.iter().find_map(|b| match b {
                Block::Text { text } => Some(text.as_str()),
                _ => None,
            }) {
                Some(t) => t,
                None => continue,
            },
            _ => continue,
        };

        if LIMIT_PATTERNS.iter().any(|re| re.is_match(text)) {
            return Some(parse_reset_time(text, now));
        }
    }

    None
}

fn parse_reset_time(text: &str, now: TimestampMs) -> TimestampMs {
    if let Some(caps) = RESET_IN.captures(text) {
        let amount: i64 = caps[1].parse().unwrap_or(DEFAULT_RESET_MINUTES);
        let unit = caps[2].to_ascii_lowercase();
        let ms = match unit.as_str() {
            "sec" => amount * 1_000,
            "hour" => amount * 3_600_000,
            _ => amount * 60_000,
        };
        return now + ms;
    }

    if let Some(caps) = RESET_AT.captures(text) {
        if let Some(ts) = resolve_clock_time(&caps[1], &caps[2], caps.get(3).map(|m| m.as_str()), now) {
            return ts;
        }
    }

    if let Some(caps) = RESET_HOUR.captures(text) {
        if let Some(ts) = resolve_clock_time(&caps[1], "00", Some(&caps[2]), now) {
            return ts;
        }
    }

    now + DEFAULT_RESET_MINUTES * 60_000
}

fn resolve_clock_time(hour: &str, minute: &str, meridiem: Option<&str>, now: TimestampMs) -> Option<TimestampMs> {
    let mut hour: u32 = hour.parse().ok()?;
    let minute: u32 = minute.parse().ok()?;

    if let Some(m) = meridiem {
        let is_pm = m.eq_ignore_ascii_case("pm");
        hour %= 12;
        if is_pm {
            hour += 12;
        }
    }

    let now_dt = Local.timestamp_millis_opt(now).single()?;
    let mut candidate = now_dt.date_naive().and_hms_opt(hour, minute, 0)?;
    if candidate <= now_dt.naive_local() {
        candidate += chrono::Duration::days(1);
    }

    Local
        .from_local_datetime(&candidate)
        .single()
        .map(|dt| dt.timestamp_millis())
}
