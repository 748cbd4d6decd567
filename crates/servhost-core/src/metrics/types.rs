// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Metric identifiers and values.

use std::fmt::{self, Display};
use std::time::Instant;

/// A unique, structured identifier for a metric.
///
/// The name is fully qualified (scope prefixes joined with `.`), tags are
/// key-value pairs kept sorted by key for consistent hashing and display.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetricId {
    /// The fully qualified name (e.g., "checkout.http.requests").
    pub name: String,
    /// Sorted key-value pairs for dimensional filtering.
    pub tags: Vec<(String, String)>,
}

impl MetricId {
    /// Creates a new `MetricId` without tags.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: Vec::new(),
        }
    }

    /// Adds a tag, replacing any existing tag with the same key.
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        self.tags.retain(|(k, _)| *k != key);
        self.tags.push((key, value.into()));
        self.tags.sort_by(|a, b| a.0.cmp(&b.0));
        self
    }
}

impl Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tags.is_empty() {
            return f.write_str(&self.name);
        }
        write!(f, "{}[", self.name)?;
        for (i, (k, v)) in self.tags.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{k}={v}")?;
        }
        f.write_str("]")
    }
}

/// The fundamental type of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    /// A value that only ever increases (e.g., total requests).
    Counter,
    /// A value that can go up or down (e.g., in-flight requests).
    Gauge,
    /// A distribution of samples across fixed buckets.
    Histogram,
}

/// An enumeration of possible metric values.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    /// A 64-bit unsigned integer for counters.
    Counter(u64),
    /// A 64-bit float for gauges.
    Gauge(f64),
    /// Sample counts per bucket.
    ///
    /// `bucket_counts` has one more entry than `bucket_bounds`: the last
    /// slot counts samples above the highest bound.
    Histogram {
        /// The upper bounds of the histogram buckets, ascending.
        bucket_bounds: Vec<f64>,
        /// The count of samples within each bucket.
        bucket_counts: Vec<u64>,
    },
}

impl MetricValue {
    /// Returns the [`MetricType`] corresponding to this value.
    pub fn metric_type(&self) -> MetricType {
        match self {
            MetricValue::Counter(_) => MetricType::Counter,
            MetricValue::Gauge(_) => MetricType::Gauge,
            MetricValue::Histogram { .. } => MetricType::Histogram,
        }
    }

    /// Returns the value as a `u64` if it is a `Counter`.
    pub fn as_counter(&self) -> Option<u64> {
        match self {
            MetricValue::Counter(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as an `f64` if it is a `Gauge`.
    pub fn as_gauge(&self) -> Option<f64> {
        match self {
            MetricValue::Gauge(v) => Some(*v),
            _ => None,
        }
    }
}

/// A metric as held by a reporter: its id, latest value and last update.
#[derive(Debug, Clone)]
pub struct Metric {
    /// The metric's identifier.
    pub id: MetricId,
    /// The accumulated value.
    pub value: MetricValue,
    /// When the value was last changed.
    pub last_updated: Instant,
}

impl Metric {
    /// Creates a metric stamped with the current time.
    pub fn new(id: MetricId, value: MetricValue) -> Self {
        Self {
            id,
            value,
            last_updated: Instant::now(),
        }
    }

    /// Updates the `last_updated` timestamp to the current time.
    pub fn touch(&mut self) {
        self.last_updated = Instant::now();
    }
}

/// Returns the bucket index a sample falls into for ascending `bounds`.
///
/// Samples above every bound land in the overflow slot `bounds.len()`.
pub(crate) fn bucket_index(bounds: &[f64], sample: f64) -> usize {
    bounds.partition_point(|&bound| bound < sample)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_id_tags_sorted() {
        let id = MetricId::new("http.requests")
            .with_tag("route", "/pay")
            .with_tag("method", "POST");

        assert_eq!(id.tags[0], ("method".to_string(), "POST".to_string()));
        assert_eq!(id.tags[1], ("route".to_string(), "/pay".to_string()));
    }

    #[test]
    fn test_metric_id_tag_replaced() {
        let id = MetricId::new("m").with_tag("env", "dev").with_tag("env", "prod");
        assert_eq!(id.tags, vec![("env".to_string(), "prod".to_string())]);
    }

    #[test]
    fn test_metric_id_display() {
        assert_eq!(MetricId::new("jobs.done").to_string(), "jobs.done");
        let id = MetricId::new("jobs.done")
            .with_tag("queue", "fast")
            .with_tag("host", "a");
        assert_eq!(id.to_string(), "jobs.done[host=a,queue=fast]");
    }

    #[test]
    fn test_bucket_index() {
        let bounds = [1.0, 5.0, 10.0];
        assert_eq!(bucket_index(&bounds, 0.5), 0);
        assert_eq!(bucket_index(&bounds, 1.0), 0);
        assert_eq!(bucket_index(&bounds, 4.0), 1);
        assert_eq!(bucket_index(&bounds, 10.0), 2);
        assert_eq!(bucket_index(&bounds, 11.0), 3);
    }

    #[test]
    fn test_metric_value_accessors() {
        assert_eq!(MetricValue::Counter(4).as_counter(), Some(4));
        assert_eq!(MetricValue::Counter(4).as_gauge(), None);
        assert_eq!(MetricValue::Gauge(1.5).metric_type(), MetricType::Gauge);
    }
}
