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

//! Structured logging capability handed out by the host.

use log::{Level, Log, Metadata, Record};
use std::fmt::{self, Display};
use std::sync::Arc;

#[derive(Clone)]
enum Sink {
    /// Whatever logger is installed behind the `log` facade.
    Global,
    Custom(Arc<dyn Log>),
}

/// A logger bound to a target, carrying key/value fields.
///
/// Records go through the `log` facade by default, so whatever the process
/// installed (`env_logger` in the sandbox) receives them. A custom sink can
/// be supplied instead, which is mostly useful in tests.
///
/// Fields are appended to the message as `key=value` pairs.
#[derive(Clone)]
pub struct HostLogger {
    target: Arc<str>,
    fields: Vec<(String, String)>,
    sink: Sink,
}

impl HostLogger {
    /// Creates a logger writing to the global `log` facade under `target`.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: Arc::from(target.into()),
            fields: Vec::new(),
            sink: Sink::Global,
        }
    }

    /// Creates a logger writing to `sink` under `target`.
    pub fn with_sink(target: impl Into<String>, sink: Arc<dyn Log>) -> Self {
        Self {
            target: Arc::from(target.into()),
            fields: Vec::new(),
            sink: Sink::Custom(sink),
        }
    }

    /// Returns a child logger with an extra field.
    #[must_use]
    pub fn with(&self, key: impl Into<String>, value: impl Display) -> Self {
        let mut child = self.clone();
        child.fields.push((key.into(), value.to_string()));
        child
    }

    /// The target records are emitted under.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The fields attached to every record.
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// Returns `true` if a record at `level` would be emitted.
    pub fn enabled(&self, level: Level) -> bool {
        let metadata = Metadata::builder()
            .level(level)
            .target(&self.target)
            .build();
        match &self.sink {
            Sink::Global => level <= log::max_level() && log::logger().enabled(&metadata),
            Sink::Custom(sink) => sink.enabled(&metadata),
        }
    }

    /// Emits a record at `level`.
    pub fn log(&self, level: Level, message: impl Display) {
        if !self.enabled(level) {
            return;
        }
        let fields = Fields(&self.fields);
        let sink: &dyn Log = match &self.sink {
            Sink::Global => log::logger(),
            Sink::Custom(sink) => sink.as_ref(),
        };
        sink.log(
            &Record::builder()
                .args(format_args!("{message}{fields}"))
                .level(level)
                .target(&self.target)
                .module_path_static(Some(module_path!()))
                .build(),
        );
    }

    /// Emits an error record.
    pub fn error(&self, message: impl Display) {
        self.log(Level::Error, message);
    }

    /// Emits a warning record.
    pub fn warn(&self, message: impl Display) {
        self.log(Level::Warn, message);
    }

    /// Emits an info record.
    pub fn info(&self, message: impl Display) {
        self.log(Level::Info, message);
    }

    /// Emits a debug record.
    pub fn debug(&self, message: impl Display) {
        self.log(Level::Debug, message);
    }

    /// Emits a trace record.
    pub fn trace(&self, message: impl Display) {
        self.log(Level::Trace, message);
    }
}

impl fmt::Debug for HostLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sink = match self.sink {
            Sink::Global => "global",
            Sink::Custom(_) => "custom",
        };
        f.debug_struct("HostLogger")
            .field("target", &self.target)
            .field("fields", &self.fields)
            .field("sink", &sink)
            .finish()
    }
}

struct Fields<'a>(&'a [(String, String)]);

impl Display for Fields<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in self.0 {
            write!(f, " {key}={value}")?;
        }
        Ok(())
    }
}
