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

//! Metrics scopes and the reporter contract behind them.
//!
//! This module defines the abstract "what" of metrics: identifiers, values,
//! the [`StatsReporter`] contract a backend implements, and the [`Scope`]
//! that components record into. `servhost-telemetry` provides concrete
//! reporters and the loop that drives [`Scope::report`].

pub mod reporter;
pub mod scope;
pub mod types;

pub use self::reporter::{NullStatsReporter, StatsReporter};
pub use self::scope::{Counter, Gauge, Histogram, Scope, ScopeOptions};
pub use self::types::{Metric, MetricId, MetricType, MetricValue};
