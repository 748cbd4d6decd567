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

use super::context::HostContext;
use crate::error::{HostError, HostResult};
use std::ops::Deref;
use std::sync::{Arc, OnceLock};

/// Anything the assembler can hand a host to.
///
/// Components embedding a [`HostContainer`] implement this by forwarding to
/// it.
pub trait SetContainer {
    /// Gives the component its host. Only the first call succeeds.
    fn set_container(&self, host: Arc<HostContext>) -> HostResult<()>;
}

/// A write-once slot giving an embedding component access to the host.
///
/// The assembler populates it once during startup; afterwards the container
/// derefs to the [`HostContext`], so an embedding component reads
/// `self.host.name()` as if it were the host.
///
/// The container holds a strong reference. If the embedding component is
/// also the host's observer, host and observer keep each other alive and
/// neither is dropped before the process exits. Components that must not
/// outlive a shorter-lived host should hold a `Weak<HostContext>` instead.
///
/// ```rust
/// use servhost_core::{HostBuilder, HostContainer, SetContainer};
/// use std::sync::Arc;
///
/// let host = Arc::new(HostBuilder::new("checkout").build().unwrap());
/// let container = HostContainer::new();
/// container.set_container(Arc::clone(&host)).unwrap();
///
/// assert_eq!(container.name(), "checkout");
/// assert!(container.set_container(host).is_err());
/// ```
#[derive(Debug, Default)]
pub struct HostContainer {
    host: OnceLock<Arc<HostContext>>,
}

impl HostContainer {
    /// Creates an empty container.
    pub fn new() -> Self {
        Self {
            host: OnceLock::new(),
        }
    }

    /// The host, or `None` before [`set_container`](SetContainer::set_container).
    pub fn host(&self) -> Option<&Arc<HostContext>> {
        self.host.get()
    }

    /// Returns `true` once the container has been populated.
    pub fn is_set(&self) -> bool {
        self.host.get().is_some()
    }
}

impl SetContainer for HostContainer {
    fn set_container(&self, host: Arc<HostContext>) -> HostResult<()> {
        self.host.set(host).map_err(|rejected| {
            log::warn!(
                "Host container already populated, ignoring host '{}'",
                rejected.name()
            );
            HostError::ContainerAlreadySet
        })
    }
}

impl Deref for HostContainer {
    type Target = HostContext;

    /// # Panics
    ///
    /// Panics if the container has not been populated yet.
    fn deref(&self) -> &HostContext {
        match self.host.get() {
            Some(host) => host,
            None => panic!("HostContainer read before set_container was called"),
        }
    }
}
