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

use servhost_core::{HostBuilder, Scope, ScopeOptions};
use servhost_telemetry::{InMemoryReporter, ReportingLoop, ScopedMetricTimer};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn scope_on(reporter: &Arc<InMemoryReporter>) -> Arc<Scope> {
    Arc::new(Scope::new(ScopeOptions {
        prefix: "checkout".to_string(),
        tags: vec![("region".to_string(), "eu".to_string())],
        reporter: reporter.clone(),
        report_interval: Duration::from_secs(3600),
    }))
}

#[test]
fn test_workers_share_the_installed_scope() {
    // --- 1. ARRANGE ---
    const WORKERS: u64 = 8;
    const PER_WORKER: u64 = 250;
    let reporter = Arc::new(InMemoryReporter::new());
    let host = Arc::new(
        HostBuilder::new("checkout")
            .metrics(scope_on(&reporter))
            .build()
            .unwrap(),
    );

    // --- 2. ACT ---
    let handles: Vec<_> = (0..WORKERS)
        .map(|_| {
            let host = Arc::clone(&host);
            thread::spawn(move || {
                let requests = host.metrics().counter("requests");
                for _ in 0..PER_WORKER {
                    requests.inc(1);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    host.metrics().report();

    // --- 3. ASSERT ---
    let id = host.metrics().counter("requests").id().clone();
    assert_eq!(id.name, "checkout.requests");
    assert_eq!(reporter.counter_value(&id).unwrap(), WORKERS * PER_WORKER);
    assert!(host
        .metrics()
        .reporter_as::<InMemoryReporter>()
        .is_some());
}

#[test]
fn test_reporting_loop_flushes_on_stop() {
    // --- 1. ARRANGE ---
    let reporter = Arc::new(InMemoryReporter::new());
    let host = HostBuilder::new("checkout")
        .metrics(scope_on(&reporter))
        .build()
        .unwrap();
    let mut reporting = ReportingLoop::start(Arc::clone(host.metrics())).unwrap();

    // --- 2. ACT ---
    let db = host.metrics().sub_scope("db");
    db.gauge("pool_size").update(16.0);
    db.gauge("pool_size").update(12.0);
    reporting.stop();

    // --- 3. ASSERT ---
    let id = db.gauge("pool_size").id().clone();
    assert_eq!(reporter.gauge_value(&id).unwrap(), 12.0);
    assert_eq!(reporter.flush_count(), 1);
}

#[test]
fn test_scoped_timer_feeds_host_histogram() {
    // --- 1. ARRANGE ---
    let reporter = Arc::new(InMemoryReporter::new());
    let host = HostBuilder::new("checkout")
        .metrics(scope_on(&reporter))
        .build()
        .unwrap();
    let latency = host.metrics().histogram("latency_ms", &[60_000.0]);

    // --- 2. ACT ---
    for _ in 0..3 {
        let _timer = ScopedMetricTimer::new(&latency);
    }
    host.metrics().report();

    // --- 3. ASSERT ---
    assert_eq!(reporter.histogram_counts(latency.id()).unwrap(), vec![3, 0]);
}
