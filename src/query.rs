//! Query option value objects
//!
//! These describe *how* data is read (time range, zone, rollups,
//! interpolation, predicates, selection filters). They carry no behavior of
//! their own; [`crate::client::params::ParamEncoder`] maps them onto request
//! parameters.

use chrono::{DateTime, FixedOffset, TimeZone};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// A start/end timestamp pair
///
/// `start <= end` is expected but not checked; the service rejects inverted
/// ranges itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    /// Inclusive start of the range
    pub start: DateTime<FixedOffset>,
    /// Exclusive end of the range
    pub end: DateTime<FixedOffset>,
}

impl Interval {
    /// Create an interval from two zoned timestamps
    pub fn new<Tz: TimeZone>(start: DateTime<Tz>, end: DateTime<Tz>) -> Self {
        Self {
            start: start.fixed_offset(),
            end: end.fixed_offset(),
        }
    }
}

/// Time zone identifier sent with read requests (e.g. `America/Chicago`)
///
/// The service resolves the identifier; this layer only carries it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Zone(String);

impl Zone {
    /// Identifier of the UTC zone
    pub const UTC_ID: &'static str = "UTC";

    /// Create a zone from its canonical identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The UTC zone
    pub fn utc() -> Self {
        Self(Self::UTC_ID.to_string())
    }

    /// Canonical identifier string
    pub fn id(&self) -> &str {
        &self.0
    }
}

impl Default for Zone {
    fn default() -> Self {
        Self::utc()
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Calendar period in ISO-8601 form (`P1D`, `PT1H30M`)
///
/// Equality is field-wise: `PT60M` and `PT1H` are different periods that
/// format identically once normalized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Period {
    /// Years
    pub years: i64,
    /// Months
    pub months: i64,
    /// Weeks
    pub weeks: i64,
    /// Days
    pub days: i64,
    /// Hours
    pub hours: i64,
    /// Minutes
    pub minutes: i64,
    /// Seconds
    pub seconds: i64,
    /// Milliseconds
    pub millis: i64,
}

impl Period {
    /// Period of `n` years
    pub fn years(n: i64) -> Self {
        Self {
            years: n,
            ..Self::default()
        }
    }

    /// Period of `n` months
    pub fn months(n: i64) -> Self {
        Self {
            months: n,
            ..Self::default()
        }
    }

    /// Period of `n` weeks
    pub fn weeks(n: i64) -> Self {
        Self {
            weeks: n,
            ..Self::default()
        }
    }

    /// Period of `n` days
    pub fn days(n: i64) -> Self {
        Self {
            days: n,
            ..Self::default()
        }
    }

    /// Period of `n` hours
    pub fn hours(n: i64) -> Self {
        Self {
            hours: n,
            ..Self::default()
        }
    }

    /// Period of `n` minutes
    pub fn minutes(n: i64) -> Self {
        Self {
            minutes: n,
            ..Self::default()
        }
    }

    /// Period of `n` seconds
    pub fn seconds(n: i64) -> Self {
        Self {
            seconds: n,
            ..Self::default()
        }
    }

    /// Normalized form of this period
    ///
    /// Years and months are left alone since their length varies. Weeks fold
    /// into days and the time fields carry upward into days.
    pub fn normalize(&self) -> Self {
        let total_ms = ((((i128::from(self.days) + i128::from(self.weeks) * 7) * 24
            + i128::from(self.hours))
            * 60
            + i128::from(self.minutes))
            * 60
            + i128::from(self.seconds))
            * 1000
            + i128::from(self.millis);

        let total_s = total_ms / 1000;
        let total_m = total_s / 60;
        let total_h = total_m / 60;

        // Only the day count can leave the i64 range
        match i64::try_from(total_h / 24) {
            Ok(days) => Self {
                years: self.years,
                months: self.months,
                weeks: 0,
                days,
                hours: (total_h % 24) as i64,
                minutes: (total_m % 60) as i64,
                seconds: (total_s % 60) as i64,
                millis: (total_ms % 1000) as i64,
            },
            Err(_) => *self,
        }
    }

    /// ISO-8601 text of the normalized period, as sent on the wire
    pub fn to_normalized_iso(&self) -> String {
        self.normalize().to_string()
    }

    fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("P0D");
        }

        f.write_str("P")?;
        for (value, unit) in [
            (self.years, 'Y'),
            (self.months, 'M'),
            (self.weeks, 'W'),
            (self.days, 'D'),
        ] {
            if value != 0 {
                write!(f, "{value}{unit}")?;
            }
        }

        if self.hours != 0 || self.minutes != 0 || self.seconds != 0 || self.millis != 0 {
            f.write_str("T")?;
            if self.hours != 0 {
                write!(f, "{}H", self.hours)?;
            }
            if self.minutes != 0 {
                write!(f, "{}M", self.minutes)?;
            }
            match (self.seconds, self.millis) {
                (0, 0) => {}
                (s, 0) => write!(f, "{s}S")?,
                (s, ms) => {
                    let sign = if s < 0 || ms < 0 { "-" } else { "" };
                    write!(f, "{sign}{}.{:03}S", s.abs(), ms.abs())?
                }
            }
        }
        Ok(())
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix('P')
            .ok_or_else(|| format!("Invalid period (missing 'P'): {s}"))?;
        if rest.is_empty() {
            return Err(format!("Invalid period (no fields): {s}"));
        }

        let mut period = Period::default();
        let mut in_time = false;
        let mut number = String::new();
        let mut fields = 0;

        for c in rest.chars() {
            match c {
                'T' if !in_time && number.is_empty() => in_time = true,
                '0'..='9' | '-' | '.' => number.push(c),
                unit => {
                    if number.is_empty() {
                        return Err(format!("Invalid period (unit without value): {s}"));
                    }
                    if unit == 'S' && in_time {
                        let (whole, frac) = split_seconds(&number)
                            .ok_or_else(|| format!("Invalid period seconds: {s}"))?;
                        period.seconds = whole;
                        period.millis = frac;
                    } else {
                        let value: i64 = number
                            .parse()
                            .map_err(|_| format!("Invalid period value '{number}': {s}"))?;
                        match (unit, in_time) {
                            ('Y', false) => period.years = value,
                            ('M', false) => period.months = value,
                            ('W', false) => period.weeks = value,
                            ('D', false) => period.days = value,
                            ('H', true) => period.hours = value,
                            ('M', true) => period.minutes = value,
                            _ => return Err(format!("Invalid period unit '{unit}': {s}")),
                        }
                    }
                    number.clear();
                    fields += 1;
                }
            }
        }

        if !number.is_empty() {
            return Err(format!("Invalid period (trailing value): {s}"));
        }
        if fields == 0 {
            return Err(format!("Invalid period (no fields): {s}"));
        }
        Ok(period)
    }
}

/// Split `"1.5"` into `(1, 500)` (seconds, milliseconds)
fn split_seconds(text: &str) -> Option<(i64, i64)> {
    match text.split_once('.') {
        None => text.parse().ok().map(|s| (s, 0)),
        Some((whole, frac)) => {
            let negative = whole.starts_with('-');
            let whole: i64 = whole.parse().ok()?;
            let mut digits: String = frac.chars().take(3).collect();
            while digits.len() < 3 {
                digits.push('0');
            }
            let millis: i64 = digits.parse().ok()?;
            Some((whole, if negative { -millis } else { millis }))
        }
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Aggregation function applied over a rollup period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fold {
    /// Sum of values
    Sum,
    /// Arithmetic mean
    Mean,
    /// Maximum value
    Max,
    /// Minimum value
    Min,
    /// Number of points
    Count,
    /// Standard deviation
    Stddev,
    /// Sum of squares
    Ss,
    /// Max minus min
    Range,
    /// First value in the period
    First,
    /// Last value in the period
    Last,
}

impl fmt::Display for Fold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Fold::Sum => "sum",
            Fold::Mean => "mean",
            Fold::Max => "max",
            Fold::Min => "min",
            Fold::Count => "count",
            Fold::Stddev => "stddev",
            Fold::Ss => "ss",
            Fold::Range => "range",
            Fold::First => "first",
            Fold::Last => "last",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Fold {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sum" => Ok(Fold::Sum),
            "mean" => Ok(Fold::Mean),
            "max" => Ok(Fold::Max),
            "min" => Ok(Fold::Min),
            "count" => Ok(Fold::Count),
            "stddev" => Ok(Fold::Stddev),
            "ss" => Ok(Fold::Ss),
            "range" => Ok(Fold::Range),
            "first" => Ok(Fold::First),
            "last" => Ok(Fold::Last),
            _ => Err(format!("Invalid fold: {s}")),
        }
    }
}

/// Periodic aggregation: one fold over one period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rollup {
    /// Aggregation function
    pub fold: Fold,
    /// Bucket width
    pub period: Period,
}

impl Rollup {
    /// Create a rollup
    pub fn new(fold: Fold, period: Period) -> Self {
        Self { fold, period }
    }
}

/// Several folds computed over the same period in one request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MultiRollup {
    /// Aggregation functions
    pub folds: BTreeSet<Fold>,
    /// Bucket width shared by every fold
    pub period: Period,
}

impl MultiRollup {
    /// Create a multi-rollup
    pub fn new(folds: impl IntoIterator<Item = Fold>, period: Period) -> Self {
        Self {
            folds: folds.into_iter().collect(),
            period,
        }
    }
}

/// Gap-filling function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationFunction {
    /// Straight line between neighbouring points
    Linear,
    /// Zero-order hold (repeat the previous value)
    Zoh,
}

impl fmt::Display for InterpolationFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterpolationFunction::Linear => write!(f, "linear"),
            InterpolationFunction::Zoh => write!(f, "zoh"),
        }
    }
}

/// Gap-filling strategy applied over a period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interpolation {
    /// Spacing of interpolated points
    pub period: Period,
    /// Interpolation function
    pub function: InterpolationFunction,
}

impl Interpolation {
    /// Create an interpolation
    pub fn new(period: Period, function: InterpolationFunction) -> Self {
        Self { period, function }
    }
}

/// Rolling-window matcher used by find queries
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Predicate {
    /// Window width
    pub period: Period,
    /// Function name (e.g. `max`); sent lower-cased
    pub function: String,
}

impl Predicate {
    /// Create a predicate
    pub fn new(period: Period, function: impl Into<String>) -> Self {
        Self {
            period,
            function: function.into(),
        }
    }
}

/// Search direction for single-value reads
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Only a point exactly at the timestamp
    #[default]
    Exact,
    /// Nearest point at or before the timestamp
    Before,
    /// Nearest point at or after the timestamp
    After,
    /// Nearest point in either direction
    Nearest,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Exact => "exact",
            Direction::Before => "before",
            Direction::After => "after",
            Direction::Nearest => "nearest",
        };
        write!(f, "{s}")
    }
}

/// Cross-series aggregation for filter reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Aggregation {
    /// Fold applied across the selected series
    pub fold: Fold,
}

impl Aggregation {
    /// Create an aggregation
    pub fn new(fold: Fold) -> Self {
        Self { fold }
    }
}

/// Series selection criteria
///
/// How keys, tags and attributes combine is up to the service; this type
/// only carries them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Filter {
    /// Series keys
    pub keys: BTreeSet<String>,
    /// Tags
    pub tags: BTreeSet<String>,
    /// Attribute name/value pairs
    pub attributes: BTreeMap<String, String>,
}

impl Filter {
    /// Empty filter (matches whatever the service matches by default)
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a series key
    pub fn add_key(mut self, key: impl Into<String>) -> Self {
        self.keys.insert(key.into());
        self
    }

    /// Add a tag
    pub fn add_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Add an attribute constraint
    pub fn add_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }
}
