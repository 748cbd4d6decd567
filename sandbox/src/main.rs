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

// Servhost Sandbox
// Assembles a host the way a service binary would and drives it briefly.

use anyhow::{Context as _, Result};
use serde_json::json;
use servhost_core::{
    HostBuilder, HostContainer, HostContext, HostError, HostResult, Observer, Scope,
    ScopeOptions, ServiceState, SetContainer, StaticProvider,
};
use servhost_telemetry::{InMemoryReporter, ReportingLoop, ScopedMetricTimer};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const WORKERS: usize = 4;
const JOBS_PER_WORKER: u64 = 100;

/// Observer that reaches the host through an embedded container.
#[derive(Default)]
struct LifecycleLogger {
    container: HostContainer,
}

impl SetContainer for LifecycleLogger {
    fn set_container(&self, host: Arc<HostContext>) -> HostResult<()> {
        self.container.set_container(host)
    }
}

impl Observer for LifecycleLogger {
    fn on_init(&self, host: &HostContext) -> HostResult<()> {
        if host.roles().is_empty() {
            return Err(HostError::Observer(format!(
                "'{}' has no roles to serve",
                host.name()
            )));
        }
        log::info!("Initializing '{}' owned by '{}'", host.name(), host.owner());
        Ok(())
    }

    fn on_state_change(&self, old: ServiceState, new: ServiceState) {
        self.container
            .logger()
            .with("from", old)
            .with("to", new)
            .info("State changed");
        self.container.metrics().counter("state_changes").inc(1);
    }

    fn on_shutdown(&self, reason: &str) {
        log::info!("'{}' shutting down: {reason}", self.container.name());
    }

    fn on_critical_error(&self, error: &(dyn std::error::Error + 'static)) -> bool {
        log::error!("'{}' hit a critical error: {error}", self.container.name());
        self.container.metrics().counter("critical_errors").inc(1);
        true
    }
}

fn transition(host: &HostContext, observer: &LifecycleLogger, state: ServiceState) {
    let old = host.set_state(state);
    observer.on_state_change(old, state);
}

fn main() -> Result<()> {
    servhost_telemetry::logging::init("info")?;

    let provider = Arc::new(StaticProvider::new(json!({
        "service": {
            "name": "sandbox",
            "description": "Servhost demo service",
            "owner": "platform",
            "roles": ["worker"],
        },
        "metrics": { "prefix": "sandbox", "report_interval_ms": 250 },
    })));

    let observer = Arc::new(LifecycleLogger::default());
    let host = Arc::new(
        HostBuilder::from_provider(provider)?
            .observer(observer.clone())
            .build()?,
    );
    // Host and observer now reference each other and live until exit.
    observer.set_container(Arc::clone(&host))?;

    // Metrics are installed after build, before anything touches the slot.
    let config = host.config().context("host has no configuration")?;
    let interval_ms = config.get("metrics.report_interval_ms").as_i64().unwrap_or(1000);
    let reporter = Arc::new(InMemoryReporter::new());
    host.install_metrics(Arc::new(Scope::new(ScopeOptions {
        prefix: config.get("metrics.prefix").as_str().unwrap_or_default().to_string(),
        reporter: reporter.clone(),
        report_interval: Duration::from_millis(interval_ms.max(1) as u64),
        ..ScopeOptions::default()
    })))?;
    let mut reporting = ReportingLoop::start(Arc::clone(host.metrics()))?;

    transition(&host, &observer, ServiceState::Initialized);
    if let Err(err) = observer.on_init(&host) {
        if observer.on_critical_error(&err) {
            return Err(err.into());
        }
    }
    transition(&host, &observer, ServiceState::Starting);
    transition(&host, &observer, ServiceState::Running);

    let workers: Vec<_> = (0..WORKERS)
        .map(|worker| {
            let host = Arc::clone(&host);
            thread::spawn(move || {
                let scope = host.metrics().tagged([("worker", worker.to_string())]);
                let jobs = scope.counter("jobs");
                let latency = scope.histogram("job_ms", &[0.01, 0.1, 1.0]);
                for _ in 0..JOBS_PER_WORKER {
                    let _timer = ScopedMetricTimer::new(&latency);
                    jobs.inc(1);
                }
            })
        })
        .collect();
    for worker in workers {
        if worker.join().is_err() {
            log::error!("A worker thread panicked.");
        }
    }

    transition(&host, &observer, ServiceState::Stopping);
    observer.on_shutdown("demo complete");
    transition(&host, &observer, ServiceState::Stopped);
    reporting.stop();

    let stats = reporter.get_stats()?;
    let jobs: u64 = reporter
        .get_metrics_by_prefix("sandbox.jobs")
        .iter()
        .filter_map(|metric| metric.value.as_counter())
        .sum();
    log::info!(
        "Reported {} metrics ({} counters, {} histograms) over {} flushes; {jobs} jobs done",
        stats.total_metrics,
        stats.counter_count,
        stats.histogram_count,
        stats.flush_count
    );
    Ok(())
}
