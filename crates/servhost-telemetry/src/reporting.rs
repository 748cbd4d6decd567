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

//! Background thread periodically reporting a metrics scope.

use crossbeam_channel::{RecvTimeoutError, Sender};
use servhost_core::Scope;
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Name given to the reporting thread.
pub const THREAD_NAME: &str = "servhost-metrics";

/// Reports a [`Scope`] on a fixed interval until stopped.
///
/// A final report is issued when the loop stops, so nothing recorded before
/// [`stop`](ReportingLoop::stop) is lost. Dropping the loop stops it.
#[derive(Debug)]
pub struct ReportingLoop {
    interval: Duration,
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl ReportingLoop {
    /// Starts reporting `scope` at its own report interval.
    pub fn start(scope: Arc<Scope>) -> io::Result<Self> {
        let interval = scope.report_interval();
        Self::with_interval(scope, interval)
    }

    /// Starts reporting `scope` every `interval`.
    ///
    /// Fails with [`io::ErrorKind::InvalidInput`] if `interval` is zero.
    pub fn with_interval(scope: Arc<Scope>, interval: Duration) -> io::Result<Self> {
        if interval.is_zero() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "metrics report interval must be greater than zero",
            ));
        }

        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);

        let handle = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || {
                log::info!("Metrics reporting thread started ({interval:?}).");
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => scope.report(),
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                scope.report();
                log::info!("Metrics reporting thread stopped.");
            })?;

        Ok(Self {
            interval,
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }

    /// The interval between two reports.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether the reporting thread is still alive.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stops the loop after a final report and waits for the thread.
    pub fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Metrics reporting thread panicked.");
            }
        }
    }
}

impl Drop for ReportingLoop {
    fn drop(&mut self) {
        self.stop();
    }
}
