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

//! Error type shared by host construction and setup.
//!
//! Accessors on [`HostContext`](crate::HostContext) never fail; these errors
//! only surface while the host is being assembled or configured.

use thiserror::Error;

/// A specialized `Result` type for host setup operations.
pub type HostResult<T> = Result<T, HostError>;

/// Errors raised while assembling or configuring a host.
#[derive(Debug, Error)]
pub enum HostError {
    /// The service name was empty or blank.
    #[error("service name must not be empty")]
    MissingServiceName,

    /// `set_container` was called on a container that already holds a host.
    #[error("host container is already populated")]
    ContainerAlreadySet,

    /// A metrics scope was installed after the slot had already been filled,
    /// either by an earlier install or by the null-scope fallback.
    #[error("metrics scope is already initialized")]
    MetricsAlreadyInitialized,

    /// A required configuration key had no value.
    #[error("missing configuration value for key '{key}'")]
    MissingConfigValue {
        /// The dotted key that was looked up.
        key: String,
    },

    /// A configuration value could not be deserialized into the target type.
    #[error("invalid configuration value for key '{key}': {source}")]
    InvalidConfigValue {
        /// The dotted key that was looked up.
        key: String,
        /// The underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },

    /// An observer hook reported a failure.
    #[error("observer failed: {0}")]
    Observer(String),
}
