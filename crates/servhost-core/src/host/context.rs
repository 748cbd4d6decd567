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

use crate::config::ConfigurationProvider;
use crate::error::{HostError, HostResult};
use crate::items::Items;
use crate::lifecycle::{AtomicServiceState, ServiceState};
use crate::logging::HostLogger;
use crate::metrics::Scope;
use crate::observer::Observer;
use serde::Deserialize;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Configuration key holding the [`ServiceConfig`] section.
pub const SERVICE_CONFIG_KEY: &str = "service";

/// The standard identity section of a service's configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// The service name. Must not be empty.
    pub name: String,
    /// A human readable description.
    pub description: String,
    /// Who owns the service (a team, an alias). Informational only.
    pub owner: String,
    /// The logical roles this instance fulfills, in declaration order.
    pub roles: Vec<String>,
}

/// The hosting environment of one running service instance.
///
/// A `HostContext` is built once by the process assembler (see
/// [`HostBuilder`](crate::HostBuilder)) and shared as an `Arc` with every
/// component that needs it. Apart from the lifecycle state, the items
/// registry and the lazily created metrics scope, everything is fixed at
/// construction.
///
/// None of the accessors fail. Absent capabilities come back as `None`
/// (observer, configuration) or as a usable default (logger, metrics).
pub struct HostContext {
    service: ServiceConfig,
    state: AtomicServiceState,
    config: Option<Arc<dyn ConfigurationProvider>>,
    scope: OnceLock<Arc<Scope>>,
    observer: Option<Arc<dyn Observer>>,
    items: Items,
    logger: HostLogger,
}

impl HostContext {
    pub(crate) fn from_parts(
        service: ServiceConfig,
        state: ServiceState,
        config: Option<Arc<dyn ConfigurationProvider>>,
        scope: Option<Arc<Scope>>,
        observer: Option<Arc<dyn Observer>>,
        logger: HostLogger,
    ) -> Self {
        Self {
            service,
            state: AtomicServiceState::new(state),
            config,
            scope: scope.map_or_else(OnceLock::new, OnceLock::from),
            observer,
            items: Items::new(),
            logger,
        }
    }

    /// The service name. Never empty.
    pub fn name(&self) -> &str {
        &self.service.name
    }

    /// The service description.
    pub fn description(&self) -> &str {
        &self.service.description
    }

    /// The service owner string.
    pub fn owner(&self) -> &str {
        &self.service.owner
    }

    /// The roles this instance fulfills, in declaration order.
    pub fn roles(&self) -> &[String] {
        &self.service.roles
    }

    /// The full identity section the host was built from.
    pub fn service_config(&self) -> &ServiceConfig {
        &self.service
    }

    /// The current lifecycle state.
    pub fn state(&self) -> ServiceState {
        self.state.load()
    }

    /// Records a lifecycle transition and returns the previous state.
    ///
    /// Meant for the single component driving the lifecycle. Readers on
    /// other threads see either the old or the new value.
    pub fn set_state(&self, state: ServiceState) -> ServiceState {
        let previous = self.state.swap(state);
        log::debug!(
            "Service '{}' state: {} -> {}",
            self.service.name,
            previous,
            state
        );
        previous
    }

    /// The shared side-channel registry.
    pub fn items(&self) -> &Items {
        &self.items
    }

    /// Returns the metrics scope, creating a null one on first use if none
    /// was installed.
    ///
    /// Concurrent first callers block until one of them has created the
    /// scope; exactly one is ever created and every call returns the same
    /// `Arc`, so callers may cache it.
    pub fn metrics(&self) -> &Arc<Scope> {
        self.scope.get_or_init(|| {
            log::debug!(
                "No metrics scope configured for '{}', reporting to a null scope",
                self.service.name
            );
            Arc::new(Scope::null())
        })
    }

    /// Installs the scope [`metrics`](Self::metrics) will return.
    ///
    /// Fails with [`HostError::MetricsAlreadyInitialized`] if a scope is
    /// already in place, including the null fallback created by an earlier
    /// `metrics()` call. Setup code should install before anything reads.
    pub fn install_metrics(&self, scope: Arc<Scope>) -> HostResult<()> {
        self.scope.set(scope).map_err(|_| {
            log::warn!(
                "Metrics scope for '{}' installed after it was already initialized",
                self.service.name
            );
            HostError::MetricsAlreadyInitialized
        })
    }

    /// Returns `true` if the metrics slot is filled. Does not create a scope.
    pub fn has_metrics(&self) -> bool {
        self.scope.get().is_some()
    }

    /// The observer, if one was supplied.
    pub fn observer(&self) -> Option<&Arc<dyn Observer>> {
        self.observer.as_ref()
    }

    /// The configuration provider, if one was supplied.
    pub fn config(&self) -> Option<&Arc<dyn ConfigurationProvider>> {
        self.config.as_ref()
    }

    /// The host logger.
    pub fn logger(&self) -> &HostLogger {
        &self.logger
    }
}

impl fmt::Debug for HostContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostContext")
            .field("service", &self.service)
            .field("state", &self.state())
            .field("config", &self.config.as_ref().map(|c| c.name().to_owned()))
            .field("has_metrics", &self.has_metrics())
            .field("has_observer", &self.observer.is_some())
            .field("items", &self.items)
            .field("logger", &self.logger)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostBuilder;
    use crate::logging::tests::CaptureLog;
    use crate::metrics::ScopeOptions;

    fn host() -> HostContext {
        HostBuilder::new("checkout")
            .description("Takes payments")
            .owner("payments-team")
            .roles(["writer", "api"])
            .build()
            .unwrap()
    }

    #[test]
    fn test_identity_accessors() {
        let host = host();
        assert_eq!(host.name(), "checkout");
        assert_eq!(host.description(), "Takes payments");
        assert_eq!(host.owner(), "payments-team");
        assert_eq!(host.roles(), &["writer".to_string(), "api".to_string()]);
        assert_eq!(host.service_config().name, "checkout");
    }

    #[test]
    fn test_state_transitions() {
        let host = host();
        assert_eq!(host.state(), ServiceState::Uninitialized);
        assert_eq!(
            host.set_state(ServiceState::Running),
            ServiceState::Uninitialized
        );
        assert_eq!(host.state(), ServiceState::Running);
    }

    #[test]
    fn test_metrics_falls_back_to_null_scope() {
        let host = host();
        assert!(!host.has_metrics());

        let first = Arc::clone(host.metrics());
        assert!(first.is_null());
        assert!(host.has_metrics());
        assert!(Arc::ptr_eq(&first, host.metrics()));
    }

    #[test]
    fn test_install_before_first_use() {
        let host = host();
        let scope = Arc::new(Scope::new(ScopeOptions {
            prefix: "checkout".to_string(),
            ..Default::default()
        }));

        host.install_metrics(Arc::clone(&scope)).unwrap();
        assert!(Arc::ptr_eq(&scope, host.metrics()));
    }

    #[test]
    fn test_install_after_fallback_fails() {
        let host = host();
        let fallback = Arc::clone(host.metrics());

        let late = Arc::new(Scope::null());
        assert!(matches!(
            host.install_metrics(late),
            Err(HostError::MetricsAlreadyInitialized)
        ));
        assert!(Arc::ptr_eq(&fallback, host.metrics()));
    }

    #[test]
    fn test_absent_capabilities() {
        let host = host();
        assert!(host.observer().is_none());
        assert!(host.config().is_none());
        assert_eq!(host.logger().target(), "checkout");
    }

    #[test]
    fn test_custom_logger_is_returned() {
        let capture = Arc::new(CaptureLog::default());
        let host = HostBuilder::new("billing")
            .logger(HostLogger::with_sink("billing", capture.clone()))
            .build()
            .unwrap();

        host.logger().with("invoice", 42).info("issued");

        let records = capture.records.lock().unwrap();
        assert_eq!(records[0].2, "issued invoice=42");
    }

    #[test]
    fn test_items_are_shared() {
        struct Shard(u8);

        let host = Arc::new(host());
        let writer = Arc::clone(&host);
        std::thread::spawn(move || {
            writer.items().insert(Shard(9));
        })
        .join()
        .unwrap();

        assert_eq!(host.items().get::<Shard>().unwrap().0, 9);
    }

    #[test]
    fn test_debug_does_not_create_scope() {
        let host = host();
        let rendered = format!("{host:?}");
        assert!(rendered.contains("checkout"));
        assert!(!host.has_metrics());
    }
}
