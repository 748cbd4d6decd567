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

//! The optional, user-supplied extension hook.

use crate::error::HostResult;
use crate::host::HostContext;
use crate::lifecycle::ServiceState;
use std::error::Error;

/// Hooks a service author can plug into the host.
///
/// The host only stores the observer and hands it back through
/// [`HostContext::observer`]; it never calls these methods itself. Whatever
/// drives the service lifecycle decides when they run. Every hook has a
/// no-op default.
///
/// An observer that needs host access can embed a
/// [`HostContainer`](crate::HostContainer) and implement
/// [`SetContainer`](crate::SetContainer) by delegation.
pub trait Observer: Send + Sync {
    /// Called once setup is complete and before the service starts.
    fn on_init(&self, _host: &HostContext) -> HostResult<()> {
        Ok(())
    }

    /// Called after the lifecycle state changed from `old` to `new`.
    fn on_state_change(&self, _old: ServiceState, _new: ServiceState) {}

    /// Called when the service begins shutting down.
    fn on_shutdown(&self, _reason: &str) {}

    /// Called on an unrecoverable error.
    ///
    /// Returning `true` lets the service shut down; `false` asks it to keep
    /// running if it can.
    fn on_critical_error(&self, _error: &(dyn Error + 'static)) -> bool {
        true
    }
}
