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

//! # Servhost Telemetry
//!
//! Concrete collaborators for the metrics and logging capabilities of a
//! `servhost-core` host: reporters a [`Scope`](servhost_core::Scope) can be
//! built on, the loop that periodically reports it, an RAII timer, and the
//! `env_logger` bootstrap used by binaries.

#![warn(missing_docs)]

pub mod error;
pub mod logging;
pub mod reporter;
pub mod reporting;
pub mod timer;

pub use error::{MetricsError, MetricsResult};
pub use reporter::{InMemoryReporter, LogReporter, ReporterStats};
pub use reporting::ReportingLoop;
pub use timer::ScopedMetricTimer;
