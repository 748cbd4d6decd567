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

//! Service lifecycle states.

use std::fmt::{self, Display};
use std::sync::atomic::{AtomicU8, Ordering};

/// The run phase of a service instance.
///
/// The host only stores the current value; transitions are driven by the
/// owning process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ServiceState {
    /// The host exists but nothing has been set up yet.
    #[default]
    Uninitialized = 0,
    /// Setup finished, the service has not started.
    Initialized = 1,
    /// The service is starting its workers.
    Starting = 2,
    /// The service is serving.
    Running = 3,
    /// The service is draining and shutting down.
    Stopping = 4,
    /// The service has stopped.
    Stopped = 5,
}

impl ServiceState {
    /// All states, in lifecycle order.
    pub const ALL: [ServiceState; 6] = [
        ServiceState::Uninitialized,
        ServiceState::Initialized,
        ServiceState::Starting,
        ServiceState::Running,
        ServiceState::Stopping,
        ServiceState::Stopped,
    ];

    /// Returns the lowercase name of the state.
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceState::Uninitialized => "uninitialized",
            ServiceState::Initialized => "initialized",
            ServiceState::Starting => "starting",
            ServiceState::Running => "running",
            ServiceState::Stopping => "stopping",
            ServiceState::Stopped => "stopped",
        }
    }

    /// Parses a state from its name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(name))
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => ServiceState::Initialized,
            2 => ServiceState::Starting,
            3 => ServiceState::Running,
            4 => ServiceState::Stopping,
            5 => ServiceState::Stopped,
            _ => ServiceState::Uninitialized,
        }
    }
}

impl Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A [`ServiceState`] cell readable from any thread.
#[derive(Debug, Default)]
pub(crate) struct AtomicServiceState(AtomicU8);

impl AtomicServiceState {
    pub(crate) fn new(state: ServiceState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    pub(crate) fn load(&self) -> ServiceState {
        ServiceState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Stores `state` and returns the previous value.
    pub(crate) fn swap(&self, state: ServiceState) -> ServiceState {
        ServiceState::from_u8(self.0.swap(state as u8, Ordering::AcqRel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_uninitialized() {
        assert_eq!(ServiceState::default(), ServiceState::Uninitialized);
        assert_eq!(AtomicServiceState::default().load(), ServiceState::Uninitialized);
    }

    #[test]
    fn test_name_round_trip() {
        for state in ServiceState::ALL {
            assert_eq!(ServiceState::from_name(state.as_str()), Some(state));
        }
        assert_eq!(ServiceState::from_name("RUNNING"), Some(ServiceState::Running));
        assert_eq!(ServiceState::from_name("paused"), None);
    }

    #[test]
    fn test_swap_returns_previous() {
        let cell = AtomicServiceState::new(ServiceState::Starting);
        assert_eq!(cell.swap(ServiceState::Running), ServiceState::Starting);
        assert_eq!(cell.load(), ServiceState::Running);
    }
}
