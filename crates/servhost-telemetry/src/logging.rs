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

//! `env_logger` bootstrap for binaries embedding a host.
//!
//! Library code only ever talks to the `log` facade; this is the one place a
//! concrete logger gets installed.

use env_logger::{Builder, Env};

/// Returns a logger builder reading `RUST_LOG`, falling back to
/// `default_filter` when the variable is unset.
pub fn builder(default_filter: &str) -> Builder {
    Builder::from_env(Env::default().default_filter_or(default_filter))
}

/// Installs the global logger.
///
/// Fails if a logger was already installed, e.g. by a test harness.
pub fn init(default_filter: &str) -> Result<(), log::SetLoggerError> {
    builder(default_filter).try_init()
}
