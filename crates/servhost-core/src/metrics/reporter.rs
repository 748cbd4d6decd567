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

//! The contract between scopes and metrics backends.

use crate::metrics::types::MetricId;
use std::any::Any;
use std::fmt::Debug;

/// Trait defining the interface for metrics backends.
///
/// A [`Scope`](crate::metrics::Scope) buffers updates and hands them to its
/// reporter each time it is reported. Counters arrive as deltas since the
/// previous report, gauges as their latest value, histograms as per-bucket
/// deltas.
pub trait StatsReporter: Send + Sync + Debug + 'static {
    /// Get a reference to this object as Any for downcasting
    fn as_any(&self) -> &dyn Any;

    /// Report a counter increment.
    fn report_counter(&self, id: &MetricId, delta: u64);

    /// Report the latest value of a gauge.
    fn report_gauge(&self, id: &MetricId, value: f64);

    /// Report histogram samples bucketed by `bucket_bounds`.
    ///
    /// `bucket_counts` has `bucket_bounds.len() + 1` entries, the last one
    /// counting samples above the highest bound.
    fn report_histogram(&self, id: &MetricId, bucket_bounds: &[f64], bucket_counts: &[u64]);

    /// Called once at the end of every report.
    fn flush(&self) {}
}

/// A reporter that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStatsReporter;

impl StatsReporter for NullStatsReporter {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn report_counter(&self, _id: &MetricId, _delta: u64) {}

    fn report_gauge(&self, _id: &MetricId, _value: f64) {}

    fn report_histogram(&self, _id: &MetricId, _bucket_bounds: &[f64], _bucket_counts: &[u64]) {}
}
