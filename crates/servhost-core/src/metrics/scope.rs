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

//! Metrics scopes: named, tagged views over a shared buffer of updates.

use crate::metrics::reporter::{NullStatsReporter, StatsReporter};
use crate::metrics::types::{bucket_index, MetricId};
use std::collections::HashMap;
use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Construction options for a root [`Scope`].
#[derive(Debug, Clone)]
pub struct ScopeOptions {
    /// Name prefix applied to every metric, joined with `.`. May be empty.
    pub prefix: String,
    /// Tags applied to every metric.
    pub tags: Vec<(String, String)>,
    /// Where reported values go.
    pub reporter: Arc<dyn StatsReporter>,
    /// How often a reporting loop should call [`Scope::report`].
    pub report_interval: Duration,
}

impl Default for ScopeOptions {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            tags: Vec::new(),
            reporter: Arc::new(NullStatsReporter),
            report_interval: Duration::from_secs(1),
        }
    }
}

/// Values recorded since the previous report.
#[derive(Debug)]
enum Pending {
    Counter(u64),
    Gauge(Option<f64>),
    Histogram {
        bounds: Arc<[f64]>,
        counts: Vec<u64>,
    },
}

/// A drained update, ready to be handed to the reporter.
enum Drained {
    Counter(u64),
    Gauge(f64),
    Histogram { bounds: Arc<[f64]>, counts: Vec<u64> },
}

#[derive(Debug)]
struct Shared {
    reporter: Arc<dyn StatsReporter>,
    report_interval: Duration,
    pending: Mutex<HashMap<MetricId, Pending>>,
}

impl Shared {
    fn pending(&self) -> MutexGuard<'_, HashMap<MetricId, Pending>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A handle for recording metrics under a common prefix and tag set.
///
/// Scopes derived with [`sub_scope`](Scope::sub_scope) and
/// [`tagged`](Scope::tagged) share their root's buffer and reporter.
/// Recording only touches the buffer; nothing reaches the reporter until
/// [`report`](Scope::report) runs, usually from a reporting loop every
/// [`report_interval`](Scope::report_interval).
///
/// Memory is bounded per metric: counters keep a delta, gauges their latest
/// value and histograms one count per bucket.
#[derive(Debug, Clone)]
pub struct Scope {
    prefix: String,
    tags: Vec<(String, String)>,
    shared: Arc<Shared>,
}

impl Scope {
    /// Creates a root scope.
    pub fn new(options: ScopeOptions) -> Self {
        let mut tags = options.tags;
        tags.sort_by(|a, b| a.0.cmp(&b.0));
        Self {
            prefix: options.prefix,
            tags,
            shared: Arc::new(Shared {
                reporter: options.reporter,
                report_interval: options.report_interval,
                pending: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Creates a root scope that discards every measurement.
    pub fn null() -> Self {
        Self::new(ScopeOptions::default())
    }

    /// The prefix applied to metric names.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The tags applied to every metric, sorted by key.
    pub fn tags(&self) -> &[(String, String)] {
        &self.tags
    }

    /// The reporter receiving this scope tree's values.
    pub fn reporter(&self) -> &Arc<dyn StatsReporter> {
        &self.shared.reporter
    }

    /// Returns the reporter as `T` if that is its concrete type.
    pub fn reporter_as<T: StatsReporter>(&self) -> Option<&T> {
        self.shared.reporter.as_any().downcast_ref::<T>()
    }

    /// Returns `true` if values recorded here are discarded.
    pub fn is_null(&self) -> bool {
        self.reporter_as::<NullStatsReporter>().is_some()
    }

    /// How often this scope tree expects to be reported.
    pub fn report_interval(&self) -> Duration {
        self.shared.report_interval
    }

    /// Returns a child scope whose prefix is extended by `name`.
    pub fn sub_scope(&self, name: &str) -> Scope {
        Scope {
            prefix: self.qualify(name),
            tags: self.tags.clone(),
            shared: Arc::clone(&self.shared),
        }
    }

    /// Returns a child scope with extra tags. Existing keys are overridden.
    pub fn tagged<K, V>(&self, tags: impl IntoIterator<Item = (K, V)>) -> Scope
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut merged = self.tags.clone();
        for (key, value) in tags {
            let key = key.into();
            merged.retain(|(k, _)| *k != key);
            merged.push((key, value.into()));
        }
        merged.sort_by(|a, b| a.0.cmp(&b.0));
        Scope {
            prefix: self.prefix.clone(),
            tags: merged,
            shared: Arc::clone(&self.shared),
        }
    }

    /// Returns a counter named `name` under this scope.
    pub fn counter(&self, name: &str) -> Counter {
        let id = self.metric_id(name);
        self.shared
            .pending()
            .entry(id.clone())
            .or_insert(Pending::Counter(0));
        Counter {
            id,
            shared: Arc::clone(&self.shared),
        }
    }

    /// Returns a gauge named `name` under this scope.
    pub fn gauge(&self, name: &str) -> Gauge {
        let id = self.metric_id(name);
        self.shared
            .pending()
            .entry(id.clone())
            .or_insert(Pending::Gauge(None));
        Gauge {
            id,
            shared: Arc::clone(&self.shared),
        }
    }

    /// Returns a histogram named `name` with the given bucket upper bounds.
    ///
    /// Bounds are sorted and deduplicated; NaN bounds are dropped. If the
    /// histogram already exists, its original bounds are kept.
    pub fn histogram(&self, name: &str, bucket_bounds: &[f64]) -> Histogram {
        let mut requested: Vec<f64> = bucket_bounds
            .iter()
            .copied()
            .filter(|b| !b.is_nan())
            .collect();
        requested.sort_by(f64::total_cmp);
        requested.dedup();
        let requested: Arc<[f64]> = Arc::from(requested);

        let id = self.metric_id(name);
        let bounds = {
            let mut pending = self.shared.pending();
            let entry = pending
                .entry(id.clone())
                .or_insert_with(|| Pending::Histogram {
                    bounds: Arc::clone(&requested),
                    counts: vec![0; requested.len() + 1],
                });
            // An existing histogram keeps its original buckets.
            match entry {
                Pending::Histogram { bounds, .. } => Arc::clone(bounds),
                _ => requested,
            }
        };
        Histogram {
            id,
            bounds,
            shared: Arc::clone(&self.shared),
        }
    }

    /// Hands everything recorded since the previous report to the reporter,
    /// then flushes it.
    ///
    /// The whole scope tree is reported, whichever scope this is called on.
    /// The buffer lock is released before the reporter is invoked.
    pub fn report(&self) {
        let drained = self.drain();
        let reporter = &self.shared.reporter;
        for (id, update) in &drained {
            match update {
                Drained::Counter(delta) => reporter.report_counter(id, *delta),
                Drained::Gauge(value) => reporter.report_gauge(id, *value),
                Drained::Histogram { bounds, counts } => {
                    reporter.report_histogram(id, bounds, counts)
                }
            }
        }
        reporter.flush();
    }

    fn drain(&self) -> Vec<(MetricId, Drained)> {
        let mut pending = self.shared.pending();
        let mut drained = Vec::new();
        for (id, value) in pending.iter_mut() {
            let update = match value {
                Pending::Counter(delta) if *delta > 0 => Drained::Counter(mem::take(delta)),
                Pending::Gauge(latest) => match latest.take() {
                    Some(v) => Drained::Gauge(v),
                    None => continue,
                },
                Pending::Histogram { bounds, counts } if counts.iter().any(|&c| c > 0) => {
                    let fresh = vec![0; counts.len()];
                    Drained::Histogram {
                        bounds: Arc::clone(bounds),
                        counts: mem::replace(counts, fresh),
                    }
                }
                _ => continue,
            };
            drained.push((id.clone(), update));
        }
        drained
    }

    fn qualify(&self, name: &str) -> String {
        match (self.prefix.is_empty(), name.is_empty()) {
            (true, _) => name.to_string(),
            (false, true) => self.prefix.clone(),
            (false, false) => format!("{}.{}", self.prefix, name),
        }
    }

    fn metric_id(&self, name: &str) -> MetricId {
        MetricId {
            name: self.qualify(name),
            tags: self.tags.clone(),
        }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::null()
    }
}

/// Handle for counter updates.
#[derive(Debug, Clone)]
pub struct Counter {
    id: MetricId,
    shared: Arc<Shared>,
}

impl Counter {
    /// Increments the counter by `delta`.
    pub fn inc(&self, delta: u64) {
        let replaced = {
            let mut pending = self.shared.pending();
            match pending.get_mut(&self.id) {
                Some(Pending::Counter(value)) => {
                    *value = value.saturating_add(delta);
                    false
                }
                _ => {
                    pending.insert(self.id.clone(), Pending::Counter(delta));
                    true
                }
            }
        };
        // Logged after the buffer lock is released.
        if replaced {
            log::warn!("Metric '{}' re-registered as a counter", self.id);
        }
    }

    /// The metric ID.
    pub fn id(&self) -> &MetricId {
        &self.id
    }
}

/// Handle for gauge updates.
#[derive(Debug, Clone)]
pub struct Gauge {
    id: MetricId,
    shared: Arc<Shared>,
}

impl Gauge {
    /// Sets the gauge. Only the latest value before a report is kept.
    pub fn update(&self, value: f64) {
        let replaced = {
            let mut pending = self.shared.pending();
            match pending.get_mut(&self.id) {
                Some(Pending::Gauge(latest)) => {
                    *latest = Some(value);
                    false
                }
                _ => {
                    pending.insert(self.id.clone(), Pending::Gauge(Some(value)));
                    true
                }
            }
        };
        if replaced {
            log::warn!("Metric '{}' re-registered as a gauge", self.id);
        }
    }

    /// The metric ID.
    pub fn id(&self) -> &MetricId {
        &self.id
    }
}

/// Handle for histogram samples.
#[derive(Debug, Clone)]
pub struct Histogram {
    id: MetricId,
    bounds: Arc<[f64]>,
    shared: Arc<Shared>,
}

impl Histogram {
    /// Records one sample.
    pub fn record_value(&self, sample: f64) {
        let index = bucket_index(&self.bounds, sample);
        let replaced = {
            let mut pending = self.shared.pending();
            match pending.get_mut(&self.id) {
                Some(Pending::Histogram { bounds, counts }) if bounds[..] == self.bounds[..] => {
                    counts[index] = counts[index].saturating_add(1);
                    false
                }
                _ => {
                    let mut counts = vec![0; self.bounds.len() + 1];
                    counts[index] = 1;
                    pending.insert(
                        self.id.clone(),
                        Pending::Histogram {
                            bounds: Arc::clone(&self.bounds),
                            counts,
                        },
                    );
                    true
                }
            }
        };
        if replaced {
            log::warn!("Metric '{}' re-registered as a histogram", self.id);
        }
    }

    /// Records a duration as milliseconds.
    pub fn record_duration(&self, elapsed: Duration) {
        self.record_value(elapsed.as_secs_f64() * 1000.0);
    }

    /// The bucket upper bounds, ascending.
    pub fn bucket_bounds(&self) -> &[f64] {
        &self.bounds
    }

    /// The metric ID.
    pub fn id(&self) -> &MetricId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;
    use std::sync::OnceLock;

    #[derive(Debug, Default)]
    struct RecordingReporter {
        counters: Mutex<Vec<(String, u64)>>,
        gauges: Mutex<Vec<(String, f64)>>,
        histograms: Mutex<Vec<(String, Vec<u64>)>>,
        flushes: Mutex<usize>,
    }

    impl StatsReporter for RecordingReporter {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn report_counter(&self, id: &MetricId, delta: u64) {
            self.counters.lock().unwrap().push((id.to_string(), delta));
        }

        fn report_gauge(&self, id: &MetricId, value: f64) {
            self.gauges.lock().unwrap().push((id.to_string(), value));
        }

        fn report_histogram(&self, id: &MetricId, _bounds: &[f64], counts: &[u64]) {
            self.histograms
                .lock()
                .unwrap()
                .push((id.to_string(), counts.to_vec()));
        }

        fn flush(&self) {
            *self.flushes.lock().unwrap() += 1;
        }
    }

    fn recording_scope(prefix: &str) -> (Scope, Arc<RecordingReporter>) {
        let reporter = Arc::new(RecordingReporter::default());
        let scope = Scope::new(ScopeOptions {
            prefix: prefix.to_string(),
            reporter: reporter.clone(),
            ..Default::default()
        });
        (scope, reporter)
    }

    #[test]
    fn test_null_scope_defaults() {
        let scope = Scope::null();
        assert!(scope.is_null());
        assert_eq!(scope.prefix(), "");
        assert!(scope.tags().is_empty());
        assert_eq!(scope.report_interval(), Duration::from_secs(1));

        // Recording into a null scope is harmless.
        scope.counter("requests").inc(3);
        scope.report();
    }

    #[test]
    fn test_counter_reports_deltas() {
        let (scope, reporter) = recording_scope("checkout");
        let requests = scope.counter("requests");

        requests.inc(2);
        requests.inc(3);
        scope.report();
        requests.inc(1);
        scope.report();
        scope.report();

        let counters = reporter.counters.lock().unwrap();
        assert_eq!(
            *counters,
            vec![
                ("checkout.requests".to_string(), 5),
                ("checkout.requests".to_string(), 1)
            ]
        );
        assert_eq!(*reporter.flushes.lock().unwrap(), 3);
    }

    #[test]
    fn test_gauge_reports_latest_value_once() {
        let (scope, reporter) = recording_scope("");
        let inflight = scope.gauge("inflight");

        inflight.update(4.0);
        inflight.update(2.0);
        scope.report();
        scope.report();

        assert_eq!(
            *reporter.gauges.lock().unwrap(),
            vec![("inflight".to_string(), 2.0)]
        );
    }

    #[test]
    fn test_histogram_buckets() {
        let (scope, reporter) = recording_scope("svc");
        let latency = scope.histogram("latency", &[10.0, 1.0, 5.0, 5.0]);
        assert_eq!(latency.bucket_bounds(), &[1.0, 5.0, 10.0]);

        for sample in [0.5, 3.0, 4.0, 7.0, 100.0] {
            latency.record_value(sample);
        }
        scope.report();

        assert_eq!(
            *reporter.histograms.lock().unwrap(),
            vec![("svc.latency".to_string(), vec![1, 2, 1, 1])]
        );
    }

    #[test]
    fn test_sub_scope_and_tags_share_reporter() {
        let (root, reporter) = recording_scope("svc");
        let http = root.sub_scope("http").tagged([("route", "/pay")]);

        http.counter("requests").inc(1);
        // Reporting from the root drains children too.
        root.report();

        let counters = reporter.counters.lock().unwrap();
        assert_eq!(
            *counters,
            vec![("svc.http.requests[route=/pay]".to_string(), 1)]
        );
        assert!(Arc::ptr_eq(root.reporter(), http.reporter()));
    }

    #[test]
    fn test_tagged_overrides_existing_key() {
        let scope = Scope::new(ScopeOptions {
            tags: vec![("env".to_string(), "dev".to_string())],
            ..Default::default()
        });
        let prod = scope.tagged([("env", "prod"), ("az", "b")]);
        assert_eq!(
            prod.tags(),
            &[
                ("az".to_string(), "b".to_string()),
                ("env".to_string(), "prod".to_string())
            ]
        );
    }

    #[test]
    fn test_same_name_returns_same_metric() {
        let (scope, reporter) = recording_scope("");
        scope.counter("hits").inc(1);
        scope.counter("hits").inc(1);
        scope.report();

        assert_eq!(
            *reporter.counters.lock().unwrap(),
            vec![("hits".to_string(), 2)]
        );
    }

    static LOGGED_INTO: OnceLock<Scope> = OnceLock::new();

    /// Logger that records every warning as a metric in `LOGGED_INTO`.
    struct MetricsCountingLog;

    impl log::Log for MetricsCountingLog {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            metadata.level() <= log::Level::Warn
        }

        fn log(&self, record: &log::Record) {
            if let Some(scope) = LOGGED_INTO.get() {
                if self.enabled(record.metadata()) {
                    scope.counter("log.warnings").inc(1);
                }
            }
        }

        fn flush(&self) {}
    }

    #[test]
    fn test_type_change_warning_can_record_into_same_scope() {
        let (scope, reporter) = recording_scope("");
        LOGGED_INTO
            .set(scope.clone())
            .expect("only this test installs the logging scope");
        log::set_logger(&MetricsCountingLog).expect("no other test installs a global logger");
        log::set_max_level(log::LevelFilter::Warn);

        // Each handle finds the slot holding another type and warns.
        scope.gauge("shape").update(1.0);
        scope.counter("shape").inc(1);
        scope.histogram("shape", &[1.0]).record_value(0.5);
        scope.gauge("shape").update(2.0);
        scope.report();

        let counters = reporter.counters.lock().unwrap();
        let warnings: u64 = counters
            .iter()
            .filter(|(name, _)| name == "log.warnings")
            .map(|(_, delta)| delta)
            .sum();
        assert!(warnings >= 3);
    }

    #[test]
    fn test_histogram_bucket_saturates() {
        let (scope, reporter) = recording_scope("");
        let latency = scope.histogram("latency", &[1.0]);
        latency.record_value(0.5);
        if let Some(Pending::Histogram { counts, .. }) =
            scope.shared.pending().get_mut(latency.id())
        {
            counts[0] = u64::MAX;
        }

        latency.record_value(0.5);
        latency.record_value(2.0);
        scope.report();

        assert_eq!(
            *reporter.histograms.lock().unwrap(),
            vec![("latency".to_string(), vec![u64::MAX, 1])]
        );
    }

    #[test]
    fn test_reporter_downcast() {
        let (scope, _reporter) = recording_scope("");
        assert!(scope.reporter_as::<RecordingReporter>().is_some());
        assert!(!scope.is_null());
    }
}
