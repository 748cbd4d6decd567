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

//! # Servhost Core
//!
//! The shared runtime context a long-running service process hands to its
//! internal components: identity, lifecycle state, configuration, structured
//! logging, metrics reporting and an optional observer hook.
//!
//! Everything hangs off a single [`HostContext`], built once by the process
//! assembler through a [`HostBuilder`] and shared as an `Arc`. Components
//! that want host access embed a [`HostContainer`] and get it populated once
//! through [`SetContainer`].

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod host;
pub mod items;
pub mod lifecycle;
pub mod logging;
pub mod metrics;
pub mod observer;

pub use config::{ConfigValue, ConfigurationProvider, StaticProvider};
pub use error::{HostError, HostResult};
pub use host::{HostBuilder, HostContainer, HostContext, ServiceConfig, SetContainer};
pub use items::Items;
pub use lifecycle::ServiceState;
pub use logging::HostLogger;
pub use metrics::{NullStatsReporter, Scope, ScopeOptions, StatsReporter};
pub use observer::Observer;
