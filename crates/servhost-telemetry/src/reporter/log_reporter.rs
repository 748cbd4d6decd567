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

use servhost_core::metrics::{MetricId, StatsReporter};
use std::any::Any;

/// Log target used for every reported metric.
pub const METRICS_TARGET: &str = "metrics";

/// Reporter writing each update as a log line under the `metrics` target.
#[derive(Debug, Clone, Copy)]
pub struct LogReporter {
    level: log::Level,
}

impl LogReporter {
    /// Creates a reporter logging at `level`.
    pub fn new(level: log::Level) -> Self {
        Self { level }
    }

    /// The level updates are logged at.
    pub fn level(&self) -> log::Level {
        self.level
    }
}

impl Default for LogReporter {
    fn default() -> Self {
        Self::new(log::Level::Debug)
    }
}

impl StatsReporter for LogReporter {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn report_counter(&self, id: &MetricId, delta: u64) {
        log::log!(target: METRICS_TARGET, self.level, "counter {id} +{delta}");
    }

    fn report_gauge(&self, id: &MetricId, value: f64) {
        log::log!(target: METRICS_TARGET, self.level, "gauge {id} = {value}");
    }

    fn report_histogram(&self, id: &MetricId, bucket_bounds: &[f64], bucket_counts: &[u64]) {
        log::log!(
            target: METRICS_TARGET,
            self.level,
            "histogram {id} bounds={bucket_bounds:?} counts={bucket_counts:?}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use servhost_core::{Scope, ScopeOptions};
    use std::sync::Arc;

    #[test]
    fn test_scope_reports_through_log_reporter() {
        let scope = Scope::new(ScopeOptions {
            reporter: Arc::new(LogReporter::new(log::Level::Info)),
            ..ScopeOptions::default()
        });
        scope.counter("hits").inc(1);
        scope.report();

        let reporter = scope.reporter_as::<LogReporter>().unwrap();
        assert_eq!(reporter.level(), log::Level::Info);
        assert_eq!(LogReporter::default().level(), log::Level::Debug);
    }
}
