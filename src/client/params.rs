//! Query parameter encoders
//!
//! Stateless functions that map query option objects onto request
//! parameters. Each `apply_*` only appends to the request's parameter list;
//! optional inputs that are `None` add nothing.
//!
//! # Wire names
//!
//! | Option | Parameters |
//! |---|---|
//! | interval | `start`, `end` (UTC) |
//! | zone | `tz` |
//! | timestamp | `ts` |
//! | direction | `direction` |
//! | filter | `key`*, `tag`*, `attr[<name>]`* |
//! | rollup | `rollup.period`, `rollup.fold` |
//! | multi-rollup | `rollup.fold`*, `rollup.period` |
//! | interpolation | `interpolation.period`, `interpolation.function` |
//! | predicate | `predicate.period`, `predicate.function` |
//! | aggregation | `aggregation.fold` |

use crate::client::request::Request;
use crate::query::{
    Aggregation, Direction, Filter, Interpolation, Interval, MultiRollup, Predicate, Rollup, Zone,
};
use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};

/// Stateless encoder for query options
pub struct ParamEncoder;

impl ParamEncoder {
    /// Format a zoned timestamp as ISO-8601 with millisecond precision
    ///
    /// The timestamp keeps its own offset, e.g. `2012-01-01T00:00:00.000-06:00`.
    pub fn format_timestamp(ts: &DateTime<FixedOffset>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Millis, false)
    }

    /// Add `start` and `end`, both converted to UTC
    pub fn apply_interval(request: &mut Request, interval: &Interval) {
        let start = interval.start.with_timezone(&Utc).fixed_offset();
        let end = interval.end.with_timezone(&Utc).fixed_offset();
        request.add_parameter("start", Self::format_timestamp(&start));
        request.add_parameter("end", Self::format_timestamp(&end));
    }

    /// Add `tz`, defaulting to UTC
    pub fn apply_zone(request: &mut Request, zone: Option<&Zone>) {
        let id = zone.map_or(Zone::UTC_ID, Zone::id);
        request.add_parameter("tz", id);
    }

    /// Add `ts`
    pub fn apply_timestamp(request: &mut Request, timestamp: &DateTime<FixedOffset>) {
        request.add_parameter("ts", Self::format_timestamp(timestamp));
    }

    /// Add `direction`
    pub fn apply_direction(request: &mut Request, direction: Direction) {
        request.add_parameter("direction", direction.to_string());
    }

    /// Add one `key` per key, one `tag` per tag and one `attr[name]` per attribute
    pub fn apply_filter(request: &mut Request, filter: Option<&Filter>) {
        let Some(filter) = filter else {
            return;
        };
        for key in &filter.keys {
            request.add_parameter("key", key.as_str());
        }
        for tag in &filter.tags {
            request.add_parameter("tag", tag.as_str());
        }
        for (name, value) in &filter.attributes {
            request.add_parameter(format!("attr[{name}]"), value.as_str());
        }
    }

    /// Add `rollup.period` and `rollup.fold`
    pub fn apply_rollup(request: &mut Request, rollup: Option<&Rollup>) {
        if let Some(rollup) = rollup {
            request.add_parameter("rollup.period", rollup.period.to_normalized_iso());
            request.add_parameter("rollup.fold", rollup.fold.to_string());
        }
    }

    /// Add one `rollup.fold` per fold and a single `rollup.period`
    pub fn apply_multi_rollup(request: &mut Request, rollup: Option<&MultiRollup>) {
        if let Some(rollup) = rollup {
            for fold in &rollup.folds {
                request.add_parameter("rollup.fold", fold.to_string());
            }
            request.add_parameter("rollup.period", rollup.period.to_normalized_iso());
        }
    }

    /// Add `interpolation.period` and `interpolation.function`
    pub fn apply_interpolation(request: &mut Request, interpolation: Option<&Interpolation>) {
        if let Some(interpolation) = interpolation {
            request.add_parameter(
                "interpolation.period",
                interpolation.period.to_normalized_iso(),
            );
            request.add_parameter("interpolation.function", interpolation.function.to_string());
        }
    }

    /// Add `predicate.period` and `predicate.function` (lower-cased)
    pub fn apply_predicate(request: &mut Request, predicate: Option<&Predicate>) {
        if let Some(predicate) = predicate {
            request.add_parameter("predicate.period", predicate.period.to_normalized_iso());
            request.add_parameter("predicate.function", predicate.function.to_lowercase());
        }
    }

    /// Add `aggregation.fold`
    pub fn apply_aggregation(request: &mut Request, aggregation: Option<&Aggregation>) {
        if let Some(aggregation) = aggregation {
            request.add_parameter("aggregation.fold", aggregation.fold.to_string());
        }
    }
}
