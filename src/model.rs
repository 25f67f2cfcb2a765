//! Payload types exchanged with the service
//!
//! Field names follow the service's JSON wire format. Timestamps are kept as
//! zoned values so the offset the service reports is preserved.

use crate::query::Interval;
use chrono::{DateTime, FixedOffset, TimeZone};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A named, tagged, attributed time series
///
/// Tags and attributes are ordered collections, so equality and hashing do
/// not depend on insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Series {
    /// Unique series key
    pub key: String,
    /// Human readable name
    #[serde(default)]
    pub name: String,
    /// Tags
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Attribute name/value pairs
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl Series {
    /// Series with only a key
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Add a tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Add an attribute
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }
}

/// One timestamped value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    /// Timestamp
    #[serde(rename = "t")]
    pub timestamp: DateTime<FixedOffset>,
    /// Value
    #[serde(rename = "v")]
    pub value: f64,
}

impl DataPoint {
    /// Create a data point
    pub fn new<Tz: TimeZone>(timestamp: DateTime<Tz>, value: f64) -> Self {
        Self {
            timestamp: timestamp.fixed_offset(),
            value,
        }
    }
}

/// One timestamp with a value per series key (or per fold, for multi-rollups)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiDataPoint {
    /// Timestamp
    #[serde(rename = "t")]
    pub timestamp: DateTime<FixedOffset>,
    /// Values keyed by series key or fold name
    #[serde(rename = "v")]
    pub values: BTreeMap<String, f64>,
}

impl MultiDataPoint {
    /// Value for one key, if present
    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }
}

/// Result of a single-value read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleValue {
    /// Series the value belongs to
    pub series: Series,
    /// Matching point, absent when nothing matched
    #[serde(default)]
    pub data: Option<DataPoint>,
}

/// Summary statistics for one series over an interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Series the summary describes
    pub series: Series,
    /// Statistic name to value (`mean`, `max`, `count`, ...)
    #[serde(default)]
    pub summary: BTreeMap<String, f64>,
}

/// Outcome of a bulk series delete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteSummary {
    /// Number of series removed
    pub deleted: u64,
}

/// A point located by a find query, with the window it was found in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPointFound {
    /// Window the predicate was evaluated over
    pub interval: Interval,
    /// Point matching the predicate
    pub found: DataPoint,
}

/// One point addressed to a series inside a multi-series write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiPoint {
    /// Target series key
    pub key: String,
    /// Timestamp
    #[serde(rename = "t")]
    pub timestamp: DateTime<FixedOffset>,
    /// Value
    #[serde(rename = "v")]
    pub value: f64,
}

/// Body of a multi-series write
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WriteRequest {
    points: Vec<MultiPoint>,
}

impl WriteRequest {
    /// Empty write request
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one point for a series
    pub fn add(mut self, series: &Series, point: DataPoint) -> Self {
        self.points.push(MultiPoint {
            key: series.key.clone(),
            timestamp: point.timestamp,
            value: point.value,
        });
        self
    }

    /// Add several points for a series
    pub fn add_all(mut self, series: &Series, points: impl IntoIterator<Item = DataPoint>) -> Self {
        for point in points {
            self = self.add(series, point);
        }
        self
    }

    /// Points in insertion order
    pub fn points(&self) -> &[MultiPoint] {
        &self.points
    }
}

/// Marker payload for operations whose response body carries nothing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Nothing;
