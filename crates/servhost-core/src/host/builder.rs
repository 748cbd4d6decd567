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

use super::context::{HostContext, ServiceConfig, SERVICE_CONFIG_KEY};
use crate::config::ConfigurationProvider;
use crate::error::{HostError, HostResult};
use crate::lifecycle::ServiceState;
use crate::logging::HostLogger;
use crate::metrics::Scope;
use crate::observer::Observer;
use std::sync::Arc;

/// Assembles a [`HostContext`].
///
/// Every field of the host except the state, the items and a not yet
/// installed metrics scope is fixed once [`build`](HostBuilder::build)
/// returns.
///
/// # Example
///
/// ```rust
/// use servhost_core::HostBuilder;
///
/// let host = HostBuilder::new("checkout")
///     .roles(["writer", "api"])
///     .build()
///     .unwrap();
///
/// assert_eq!(host.name(), "checkout");
/// assert_eq!(host.roles(), &["writer", "api"]);
/// ```
#[derive(Default)]
pub struct HostBuilder {
    service: ServiceConfig,
    state: ServiceState,
    config: Option<Arc<dyn ConfigurationProvider>>,
    scope: Option<Arc<Scope>>,
    observer: Option<Arc<dyn Observer>>,
    logger: Option<HostLogger>,
}

impl HostBuilder {
    /// Starts a builder for a service called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_service_config(ServiceConfig {
            name: name.into(),
            ..Default::default()
        })
    }

    /// Starts a builder from an identity section.
    pub fn from_service_config(service: ServiceConfig) -> Self {
        Self {
            service,
            ..Default::default()
        }
    }

    /// Starts a builder from the `service` section of `provider`, keeping
    /// the provider as the host's configuration.
    pub fn from_provider(provider: Arc<dyn ConfigurationProvider>) -> HostResult<Self> {
        let service: ServiceConfig = provider.get(SERVICE_CONFIG_KEY).populate()?;
        Ok(Self::from_service_config(service).config(provider))
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.service.description = description.into();
        self
    }

    /// Sets the owner string.
    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.service.owner = owner.into();
        self
    }

    /// Appends one role.
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.service.roles.push(role.into());
        self
    }

    /// Replaces the role list.
    pub fn roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.service.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the configuration provider.
    pub fn config(mut self, provider: Arc<dyn ConfigurationProvider>) -> Self {
        self.config = Some(provider);
        self
    }

    /// Sets the observer.
    pub fn observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Sets the logger. Defaults to the global `log` facade under the
    /// service name.
    pub fn logger(mut self, logger: HostLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Pre-installs the metrics scope.
    pub fn metrics(mut self, scope: Arc<Scope>) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Sets the initial lifecycle state. Defaults to `Uninitialized`.
    pub fn state(mut self, state: ServiceState) -> Self {
        self.state = state;
        self
    }

    /// Builds the host.
    ///
    /// Fails with [`HostError::MissingServiceName`] if the name is blank.
    pub fn build(self) -> HostResult<HostContext> {
        if self.service.name.trim().is_empty() {
            return Err(HostError::MissingServiceName);
        }
        let logger = self
            .logger
            .unwrap_or_else(|| HostLogger::new(self.service.name.clone()));
        log::debug!(
            "Host '{}' built with roles {:?}",
            self.service.name,
            self.service.roles
        );
        Ok(HostContext::from_parts(
            self.service,
            self.state,
            self.config,
            self.scope,
            self.observer,
            logger,
        ))
    }
}
