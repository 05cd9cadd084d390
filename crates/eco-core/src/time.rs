//! Time model for constraint validity and zone restrictions.
//!
//! All instants are Unix seconds (UTC) wrapped in [`Timestamp`].  Absolute
//! validity ranges use [`TimeWindow`]; recurring daily restrictions ("no
//! trucks 07:00–19:00") use [`DailyWindow`].

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::CoreError;

const SECS_PER_DAY: i64 = 86_400;
const MINUTES_PER_DAY: u16 = 1_440;

// ── Timestamp ────────────────────────────────────────────────────────────────

/// Seconds since the Unix epoch, UTC.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub const EPOCH: Timestamp = Timestamp(0);

    /// Current wall-clock time.  A clock set before 1970 reads as the epoch.
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        Timestamp(secs)
    }

    /// Minute of the UTC day, `0..1440`.
    #[inline]
    pub fn minute_of_day(self) -> u16 {
        (self.0.rem_euclid(SECS_PER_DAY) / 60) as u16
    }

    #[inline]
    pub fn offset(self, secs: i64) -> Timestamp {
        Timestamp(self.0 + secs)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={}", self.0)
    }
}

// ── TimeWindow ───────────────────────────────────────────────────────────────

/// Half-open absolute range `[start, end)`.  An absent bound is unbounded.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct TimeWindow {
    #[serde(default)]
    pub start: Option<Timestamp>,
    #[serde(default)]
    pub end: Option<Timestamp>,
}

impl TimeWindow {
    /// A window covering all time.
    pub const ALWAYS: TimeWindow = TimeWindow { start: None, end: None };

    pub fn between(start: Timestamp, end: Timestamp) -> Self {
        Self { start: Some(start), end: Some(end) }
    }

    #[inline]
    pub fn contains(&self, t: Timestamp) -> bool {
        self.start.is_none_or(|s| t >= s) && self.end.is_none_or(|e| t < e)
    }
}

// ── DailyWindow ──────────────────────────────────────────────────────────────

/// A recurring range of minutes within each UTC day, `[start, end)`.
///
/// `end < start` wraps past midnight (`22:00-06:00`).  `start == end` covers
/// the whole day.  Serialized as `"HH:MM-HH:MM"`.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DailyWindow {
    pub start_minute: u16,
    pub end_minute: u16,
}

impl DailyWindow {
    pub fn new(start_minute: u16, end_minute: u16) -> Result<Self, CoreError> {
        if start_minute >= MINUTES_PER_DAY || end_minute >= MINUTES_PER_DAY {
            return Err(CoreError::Parse(format!(
                "daily window minutes must be below {MINUTES_PER_DAY}, got {start_minute}-{end_minute}"
            )));
        }
        Ok(Self { start_minute, end_minute })
    }

    pub fn contains(&self, t: Timestamp) -> bool {
        let m = t.minute_of_day();
        match self.start_minute.cmp(&self.end_minute) {
            std::cmp::Ordering::Less => m >= self.start_minute && m < self.end_minute,
            std::cmp::Ordering::Greater => m >= self.start_minute || m < self.end_minute,
            std::cmp::Ordering::Equal => true,
        }
    }
}

fn parse_hhmm(s: &str) -> Result<u16, CoreError> {
    let bad = || CoreError::Parse(format!("invalid time of day {s:?}: expected HH:MM"));
    let (h, m) = s.trim().split_once(':').ok_or_else(bad)?;
    let h: u16 = h.parse().map_err(|_| bad())?;
    let m: u16 = m.parse().map_err(|_| bad())?;
    if h > 23 || m > 59 {
        return Err(bad());
    }
    Ok(h * 60 + m)
}

impl std::str::FromStr for DailyWindow {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (a, b) = s.split_once('-').ok_or_else(|| {
            CoreError::Parse(format!("invalid daily window {s:?}: expected HH:MM-HH:MM"))
        })?;
        DailyWindow::new(parse_hhmm(a)?, parse_hhmm(b)?)
    }
}

impl TryFrom<String> for DailyWindow {
    type Error = CoreError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<DailyWindow> for String {
    fn from(w: DailyWindow) -> String {
        w.to_string()
    }
}

impl fmt::Display for DailyWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}-{:02}:{:02}",
            self.start_minute / 60,
            self.start_minute % 60,
            self.end_minute / 60,
            self.end_minute % 60
        )
    }
}
