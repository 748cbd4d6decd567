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

use crate::error::{MetricsError, MetricsResult};
use servhost_core::metrics::{Metric, MetricId, MetricType, MetricValue, StatsReporter};
use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Statistics about the reporter's storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReporterStats {
    /// Total number of metrics stored
    pub total_metrics: usize,
    /// Number of counters
    pub counter_count: usize,
    /// Number of gauges
    pub gauge_count: usize,
    /// Number of histograms
    pub histogram_count: usize,
    /// Number of completed reports
    pub flush_count: u64,
}

/// In-memory reporter accumulating everything it receives.
///
/// Counters hold their running total, gauges their last reported value and
/// histograms the summed bucket counts. Useful in tests and for processes
/// that expose metrics by reading them back rather than shipping them.
#[derive(Debug, Default)]
pub struct InMemoryReporter {
    /// The core storage - RwLock allows concurrent reads
    storage: RwLock<HashMap<MetricId, Metric>>,
    flushes: AtomicU64,
}

impl InMemoryReporter {
    /// Create a new in-memory reporter
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new in-memory reporter with initial capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: RwLock::new(HashMap::with_capacity(capacity)),
            flushes: AtomicU64::new(0),
        }
    }

    fn read(&self) -> MetricsResult<RwLockReadGuard<'_, HashMap<MetricId, Metric>>> {
        self.storage
            .read()
            .map_err(|_| MetricsError::StorageError("Failed to acquire read lock".to_string()))
    }

    fn write(&self) -> MetricsResult<RwLockWriteGuard<'_, HashMap<MetricId, Metric>>> {
        self.storage
            .write()
            .map_err(|_| MetricsError::StorageError("Failed to acquire write lock".to_string()))
    }

    /// Retrieve a metric by ID
    pub fn get_metric(&self, id: &MetricId) -> MetricsResult<Metric> {
        self.read()?
            .get(id)
            .cloned()
            .ok_or_else(|| MetricsError::MetricNotFound(id.clone()))
    }

    /// The running total of a counter
    pub fn counter_value(&self, id: &MetricId) -> MetricsResult<u64> {
        let metric = self.get_metric(id)?;
        metric
            .value
            .as_counter()
            .ok_or(MetricsError::TypeMismatch {
                expected: MetricType::Counter,
                found: metric.value.metric_type(),
            })
    }

    /// The last reported value of a gauge
    pub fn gauge_value(&self, id: &MetricId) -> MetricsResult<f64> {
        let metric = self.get_metric(id)?;
        metric.value.as_gauge().ok_or(MetricsError::TypeMismatch {
            expected: MetricType::Gauge,
            found: metric.value.metric_type(),
        })
    }

    /// The summed bucket counts of a histogram, overflow bucket last
    pub fn histogram_counts(&self, id: &MetricId) -> MetricsResult<Vec<u64>> {
        match self.get_metric(id)?.value {
            MetricValue::Histogram { bucket_counts, .. } => Ok(bucket_counts),
            other => Err(MetricsError::TypeMismatch {
                expected: MetricType::Histogram,
                found: other.metric_type(),
            }),
        }
    }

    /// Check if a metric exists
    pub fn contains_metric(&self, id: &MetricId) -> bool {
        self.read().map(|s| s.contains_key(id)).unwrap_or(false)
    }

    /// Get the number of metrics stored
    pub fn metric_count(&self) -> usize {
        self.read().map(|s| s.len()).unwrap_or(0)
    }

    /// Get all metric IDs currently stored
    pub fn list_metric_ids(&self) -> Vec<MetricId> {
        self.read()
            .map(|s| s.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Get all metrics (potentially expensive operation)
    pub fn list_all_metrics(&self) -> Vec<Metric> {
        self.read()
            .map(|s| s.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Get metrics whose name starts with `prefix`
    pub fn get_metrics_by_prefix(&self, prefix: &str) -> Vec<Metric> {
        self.read()
            .map(|s| {
                s.values()
                    .filter(|metric| metric.id.name.starts_with(prefix))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get metrics by type
    pub fn get_metrics_by_type(&self, metric_type: MetricType) -> Vec<Metric> {
        self.read()
            .map(|s| {
                s.values()
                    .filter(|metric| metric.value.metric_type() == metric_type)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of completed reports
    pub fn flush_count(&self) -> u64 {
        self.flushes.load(Ordering::Acquire)
    }

    /// Get statistics about this reporter
    pub fn get_stats(&self) -> MetricsResult<ReporterStats> {
        let storage = self.read()?;

        let mut counter_count = 0;
        let mut gauge_count = 0;
        let mut histogram_count = 0;

        for metric in storage.values() {
            match metric.value.metric_type() {
                MetricType::Counter => counter_count += 1,
                MetricType::Gauge => gauge_count += 1,
                MetricType::Histogram => histogram_count += 1,
            }
        }

        Ok(ReporterStats {
            total_metrics: storage.len(),
            counter_count,
            gauge_count,
            histogram_count,
            flush_count: self.flush_count(),
        })
    }

    /// Clear all metrics
    pub fn clear_all(&self) -> MetricsResult<()> {
        self.write()?.clear();
        Ok(())
    }

    /// Applies `update` to the stored value of `id`, starting from `initial`
    /// when the metric is new or was previously stored with another type.
    fn apply(
        &self,
        id: &MetricId,
        initial: impl FnOnce() -> MetricValue,
        update: impl FnOnce(&mut MetricValue),
    ) {
        let mut storage = match self.write() {
            Ok(storage) => storage,
            Err(e) => {
                log::error!("[InMemoryReporter] Dropping update for {id}: {e}");
                return;
            }
        };
        let initial = initial();
        let metric = storage
            .entry(id.clone())
            .or_insert_with(|| Metric::new(id.clone(), initial.clone()));
        if metric.value.metric_type() != initial.metric_type() {
            log::warn!(
                "[InMemoryReporter] {id} reported as {:?}, was {:?}; resetting",
                initial.metric_type(),
                metric.value.metric_type()
            );
            metric.value = initial;
        }
        update(&mut metric.value);
        metric.touch();
    }
}

impl StatsReporter for InMemoryReporter {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn report_counter(&self, id: &MetricId, delta: u64) {
        self.apply(
            id,
            || MetricValue::Counter(0),
            |value| {
                if let MetricValue::Counter(total) = value {
                    *total = total.saturating_add(delta);
                }
            },
        );
    }

    fn report_gauge(&self, id: &MetricId, value: f64) {
        self.apply(
            id,
            || MetricValue::Gauge(0.0),
            |stored| {
                if let MetricValue::Gauge(current) = stored {
                    *current = value;
                }
            },
        );
    }

    fn report_histogram(&self, id: &MetricId, bucket_bounds: &[f64], bucket_counts: &[u64]) {
        self.apply(
            id,
            || MetricValue::Histogram {
                bucket_bounds: bucket_bounds.to_vec(),
                bucket_counts: vec![0; bucket_counts.len()],
            },
            |stored| {
                if let MetricValue::Histogram {
                    bucket_bounds: bounds,
                    bucket_counts: counts,
                } = stored
                {
                    if bounds.as_slice() != bucket_bounds {
                        *bounds = bucket_bounds.to_vec();
                        *counts = vec![0; bucket_counts.len()];
                    }
                    for (total, delta) in counts.iter_mut().zip(bucket_counts) {
                        *total = total.saturating_add(*delta);
                    }
                }
            },
        );
    }

    fn flush(&self) {
        self.flushes.fetch_add(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_accumulates() {
        let reporter = InMemoryReporter::new();
        let id = MetricId::new("svc.requests");

        reporter.report_counter(&id, 3);
        reporter.report_counter(&id, 4);

        assert_eq!(reporter.counter_value(&id).unwrap(), 7);
        assert_eq!(reporter.metric_count(), 1);
    }

    #[test]
    fn test_gauge_keeps_last_value() {
        let reporter = InMemoryReporter::new();
        let id = MetricId::new("svc.inflight").with_tag("pool", "db");

        reporter.report_gauge(&id, 12.0);
        reporter.report_gauge(&id, 3.5);

        assert_eq!(reporter.gauge_value(&id).unwrap(), 3.5);
    }

    #[test]
    fn test_histogram_sums_buckets() {
        let reporter = InMemoryReporter::new();
        let id = MetricId::new("svc.latency");
        let bounds = [1.0, 10.0];

        reporter.report_histogram(&id, &bounds, &[1, 0, 2]);
        reporter.report_histogram(&id, &bounds, &[0, 5, 1]);

        assert_eq!(reporter.histogram_counts(&id).unwrap(), vec![1, 5, 3]);
    }

    #[test]
    fn test_histogram_bucket_overflow_saturates() {
        let reporter = InMemoryReporter::new();
        let latency = MetricId::new("svc.latency");
        let requests = MetricId::new("svc.requests");

        reporter.report_histogram(&latency, &[1.0], &[u64::MAX, 0]);
        reporter.report_histogram(&latency, &[1.0], &[1, 2]);
        reporter.report_counter(&requests, 1);

        assert_eq!(reporter.histogram_counts(&latency).unwrap(), vec![u64::MAX, 2]);
        // Storage is still usable for every other metric.
        assert_eq!(reporter.counter_value(&requests).unwrap(), 1);
    }

    #[test]
    fn test_type_mismatch_on_query() {
        let reporter = InMemoryReporter::new();
        let id = MetricId::new("svc.requests");
        reporter.report_counter(&id, 1);

        assert!(matches!(
            reporter.gauge_value(&id),
            Err(MetricsError::TypeMismatch {
                expected: MetricType::Gauge,
                found: MetricType::Counter
            })
        ));
    }

    #[test]
    fn test_missing_metric() {
        let reporter = InMemoryReporter::new();
        assert!(matches!(
            reporter.counter_value(&MetricId::new("nope")),
            Err(MetricsError::MetricNotFound(_))
        ));
        assert!(!reporter.contains_metric(&MetricId::new("nope")));
    }

    #[test]
    fn test_type_change_resets_value() {
        let reporter = InMemoryReporter::new();
        let id = MetricId::new("svc.x");
        reporter.report_counter(&id, 5);
        reporter.report_gauge(&id, 1.5);

        assert_eq!(reporter.gauge_value(&id).unwrap(), 1.5);
    }

    #[test]
    fn test_filters_and_stats() {
        let reporter = InMemoryReporter::with_capacity(4);
        reporter.report_counter(&MetricId::new("http.requests"), 1);
        reporter.report_counter(&MetricId::new("http.errors"), 1);
        reporter.report_gauge(&MetricId::new("db.pool"), 4.0);
        reporter.report_histogram(&MetricId::new("db.latency"), &[1.0], &[1, 0]);
        reporter.flush();

        assert_eq!(reporter.get_metrics_by_prefix("http.").len(), 2);
        assert_eq!(reporter.get_metrics_by_type(MetricType::Gauge).len(), 1);
        assert_eq!(
            reporter.get_stats().unwrap(),
            ReporterStats {
                total_metrics: 4,
                counter_count: 2,
                gauge_count: 1,
                histogram_count: 1,
                flush_count: 1,
            }
        );

        reporter.clear_all().unwrap();
        assert_eq!(reporter.metric_count(), 0);
        assert!(reporter.list_metric_ids().is_empty());
    }
}
