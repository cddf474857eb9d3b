//! Logger handle used by command builders.
//!
//! A [`Logger`] pairs a log target with an optional sink. Without a sink,
//! records go to whatever global logger the binary installed (env_logger in
//! `fabgen`). Passing a sink lets callers route a builder's output elsewhere,
//! which the tests use to capture records.

use log::{Level, Log, Record};
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub struct Logger {
    target: String,
    sink: Option<Arc<dyn Log>>,
}

impl Logger {
    /// Logger writing to the global logger under `target`
    pub fn scoped(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            sink: None,
        }
    }

    /// Logger scoped to the type name of `T`
    pub fn for_type<T: ?Sized>() -> Self {
        Self::scoped(std::any::type_name::<T>())
    }

    /// Logger writing to an explicit sink instead of the global logger
    pub fn with_sink(target: impl Into<String>, sink: Arc<dyn Log>) -> Self {
        Self {
            target: target.into(),
            sink: Some(sink),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Debug, args);
    }

    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Error, args);
    }

    fn emit(&self, level: Level, args: fmt::Arguments<'_>) {
        let record = Record::builder()
            .level(level)
            .target(&self.target)
            .module_path_static(Some(module_path!()))
            .args(args)
            .build();

        match &self.sink {
            Some(sink) => {
                if sink.enabled(record.metadata()) {
                    sink.log(&record);
                }
            }
            None => {
                if level <= log::max_level() && log::logger().enabled(record.metadata()) {
                    log::logger().log(&record);
                }
            }
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("target", &self.target)
            .field("sink", &self.sink.as_ref().map(|_| "custom"))
            .finish()
    }
}
