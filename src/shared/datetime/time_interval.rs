use chrono::{DateTime, Duration, SecondsFormat, TimeZone, Utc};
use rand::Rng;
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

const NANOS_PER_SECOND: i64 = 1_000_000_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeIntervalError {
    #[error("end time before start time")]
    EndBeforeStart,

    #[error("random window equal to or larger than interval: window {window:?}, interval {interval:?}")]
    WindowTooLarge { window: Duration, interval: Duration },
}

/// A span of UTC time. The start is inclusive, the end is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeInterval {
    pub fn new<Tz: TimeZone>(start: DateTime<Tz>, end: DateTime<Tz>) -> Result<Self, TimeIntervalError> {
        let start = start.with_timezone(&Utc);
        let end = end.with_timezone(&Utc);
        if end < start {
            return Err(TimeIntervalError::EndBeforeStart);
        }
        Ok(Self { start, end })
    }

    /// Zero-length interval anchored at a single nanosecond timestamp.
    pub fn instant(timestamp_ns: i64) -> Self {
        let at = from_unix_nanos(timestamp_ns);
        Self { start: at, end: at }
    }

    /// Interval of width `window` starting at `start_ns`.
    pub fn from_unix_nanos(start_ns: i64, window: Duration) -> Self {
        let start = from_unix_nanos(start_ns);
        Self {
            start,
            end: start + window,
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn start_unix_nanos(&self) -> i64 {
        to_unix_nanos(&self.start)
    }

    pub fn end_unix_nanos(&self) -> i64 {
        to_unix_nanos(&self.end)
    }

    pub fn start_string(&self) -> String {
        self.start.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }

    pub fn end_string(&self) -> String {
        self.end.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }

    /// Overlap test under [start, end) semantics: intervals that merely touch
    /// at a boundary do not overlap.
    pub fn overlap(&self, other: &TimeInterval) -> bool {
        if self.end == other.start || other.end == self.start {
            return false;
        }
        if self.start < other.start && self.end < other.start {
            return false;
        }
        if other.start < self.start && other.end < self.start {
            return false;
        }
        true
    }

    /// Uniformly random sub-interval of exactly `window` length.
    pub fn rand_window(&self, window: Duration) -> Result<TimeInterval, TimeIntervalError> {
        let lower = self.start_unix_nanos();
        let upper = to_unix_nanos(&(self.end - window));
        if upper <= lower {
            return Err(TimeIntervalError::WindowTooLarge {
                window,
                interval: self.duration(),
            });
        }

        let start_ns = rand::thread_rng().gen_range(lower..upper);
        Ok(TimeInterval::from_unix_nanos(start_ns, window))
    }
}

impl Ord for TimeInterval {
    fn cmp(&self, other: &Self) -> Ordering {
        self.start
            .cmp(&other.start)
            .then_with(|| self.end.cmp(&other.end))
    }
}

impl PartialOrd for TimeInterval {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start_string(), self.end_string())
    }
}

pub fn to_unix_nanos(dt: &DateTime<Utc>) -> i64 {
    dt.timestamp() * NANOS_PER_SECOND + i64::from(dt.timestamp_subsec_nanos())
}

pub fn from_unix_nanos(ns: i64) -> DateTime<Utc> {
    Utc.timestamp_nanos(ns)
}

/// Floors a nanosecond timestamp to a multiple of `window` since the epoch.
pub fn truncate_nanos(timestamp_ns: i64, window: Duration) -> i64 {
    let step = duration_nanos(window);
    if step <= 0 {
        return timestamp_ns;
    }
    timestamp_ns - timestamp_ns.rem_euclid(step)
}

pub fn duration_nanos(window: Duration) -> i64 {
    window
        .num_nanoseconds()
        .unwrap_or(window.num_milliseconds().saturating_mul(1_000_000))
}

/// Contiguous, ascending buckets of width `window` covering [start, end).
/// The first bucket starts at `start` truncated to `window`.
pub fn bucket_time_intervals(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    window: Duration,
) -> Vec<TimeInterval> {
    if end < start {
        panic!("logic error in bucket_time_intervals: bad input times");
    }
    if duration_nanos(window) <= 0 {
        panic!("logic error in bucket_time_intervals: non-positive window");
    }

    let end_ns = to_unix_nanos(&end);
    let step = duration_nanos(window);
    let mut cursor = truncate_nanos(to_unix_nanos(&start), window);

    let mut buckets = Vec::new();
    while cursor < end_ns {
        buckets.push(TimeInterval::from_unix_nanos(cursor, window));
        cursor += step;
    }

    debug_assert!(buckets.windows(2).all(|pair| pair[0] < pair[1]));
    buckets
}
