//! Generic command builder.
//!
//! [`CommandBuilder`] accumulates options for one fixed tool binary,
//! serializes them into argv tokens and hands them to a [`ProcessRunner`].
//! Tool-specific builders such as [`ConfigTxGen`](super::ConfigTxGen) wrap it
//! and only add named setters.
//!
//! ## Failure handling
//!
//! When the runner reports a failure, `execute` logs exactly one error line
//! and then applies the builder's [`FailurePolicy`]. The library default is
//! [`FailurePolicy::Propagate`]; the `fabgen` binary switches to
//! [`FailurePolicy::Exit`] so a failed generation halts the whole run.

use super::options::{options_to_args, OptionStore, OptionValue};
use crate::logging::Logger;
use crate::process::runner::{ProcessRunner, RunError, SystemRunner};
use crate::utils::binary::Binary;
use std::fmt;
use std::sync::Arc;

/// Handler invoked by [`FailurePolicy::Custom`]
pub type FailureHandler = Arc<dyn Fn(&RunError) + Send + Sync>;

/// What `execute` does after logging a runner failure
#[derive(Clone, Default)]
pub enum FailurePolicy {
    /// Return the error to the caller
    #[default]
    Propagate,
    /// Terminate the host process with `code`. A zero code is raised to 1,
    /// a failed command never exits successfully.
    Exit { code: i32 },
    /// Call the handler, then return the error to the caller
    Custom(FailureHandler),
}

impl FailurePolicy {
    pub fn exit() -> Self {
        FailurePolicy::Exit { code: 1 }
    }

    pub fn custom(handler: impl Fn(&RunError) + Send + Sync + 'static) -> Self {
        FailurePolicy::Custom(Arc::new(handler))
    }

    /// Status the process exits with under this policy, if it exits at all
    pub fn exit_status(&self) -> Option<i32> {
        match self {
            FailurePolicy::Exit { code: 0 } => Some(1),
            FailurePolicy::Exit { code } => Some(*code),
            _ => None,
        }
    }
}

impl fmt::Debug for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::Propagate => f.write_str("Propagate"),
            FailurePolicy::Exit { code } => f.debug_struct("Exit").field("code", code).finish(),
            FailurePolicy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

pub struct CommandBuilder {
    binary: Binary,
    options: OptionStore,
    logger: Logger,
    runner: Box<dyn ProcessRunner>,
    failure_policy: FailurePolicy,
}

impl CommandBuilder {
    /// Create a builder for `binary`. Without a logger, records are scoped
    /// to the `CommandBuilder` type name.
    pub fn new(binary: Binary, logger: Option<Logger>) -> Self {
        Self {
            binary,
            options: OptionStore::new(),
            logger: logger.unwrap_or_else(Logger::for_type::<Self>),
            runner: Box::new(SystemRunner::new()),
            failure_policy: FailurePolicy::default(),
        }
    }

    pub fn with_runner(mut self, runner: impl ProcessRunner + 'static) -> Self {
        self.runner = Box::new(runner);
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn set_runner(&mut self, runner: impl ProcessRunner + 'static) -> &mut Self {
        self.runner = Box::new(runner);
        self
    }

    pub fn set_failure_policy(&mut self, policy: FailurePolicy) -> &mut Self {
        self.failure_policy = policy;
        self
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn options(&self) -> &OptionStore {
        &self.options
    }

    /// Record `value` under `key`. `None` leaves the builder untouched.
    pub fn set<V: Into<OptionValue>>(&mut self, key: &str, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            let value = value.into();
            self.logger
                .debug(format_args!("Setting {} to {}", key, value));
            self.options.insert(key, value);
        }
        self
    }

    pub fn get_binary(&self) -> &'static str {
        self.binary.as_str()
    }

    pub fn get_args(&self) -> Vec<String> {
        options_to_args(&self.options)
    }

    /// Display form of the command line: binary followed by the argv tokens.
    /// Execution never re-parses this string.
    pub fn build(&self) -> String {
        let command = std::iter::once(self.get_binary().to_string())
            .chain(self.get_args())
            .collect::<Vec<_>>()
            .join(" ");
        self.logger.debug(format_args!("Built command: {}", command));
        command
    }

    /// Run the command and wait for it to exit.
    ///
    /// On failure one error line is logged, then the failure policy decides
    /// between returning the error and terminating the process.
    pub fn execute(&self) -> Result<(), RunError> {
        let binary = self.get_binary();
        let args = self.get_args();

        match self.runner.run(binary, &args) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.logger
                    .error(format_args!("Failed to execute {}: {}", binary, err));
                match &self.failure_policy {
                    FailurePolicy::Propagate => Err(err),
                    FailurePolicy::Exit { .. } => {
                        std::process::exit(self.failure_policy.exit_status().unwrap_or(1))
                    }
                    FailurePolicy::Custom(handler) => {
                        handler(&err);
                        Err(err)
                    }
                }
            }
        }
    }
}

impl fmt::Debug for CommandBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandBuilder")
            .field("binary", &self.binary)
            .field("options", &self.options)
            .field("logger", &self.logger)
            .field("failure_policy", &self.failure_policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::capture::CaptureLog;
    use log::Level;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn builder_with_capture() -> (CommandBuilder, Arc<CaptureLog>) {
        let sink = Arc::new(CaptureLog::default());
        let logger = Logger::with_sink("fabgen::command::builder::tests", sink.clone());
        (CommandBuilder::new(Binary::Configtxgen, Some(logger)), sink)
    }

    #[test]
    fn test_default_logger_is_type_scoped() {
        let builder = CommandBuilder::new(Binary::Configtxgen, None);
        assert!(builder.logger().target().ends_with("CommandBuilder"));
    }

    #[test]
    fn test_set_none_is_noop() {
        let (mut builder, sink) = builder_with_capture();
        builder.set("profile", Some("OrgsChannel"));
        let before = builder.get_args();

        builder.set("channelID", None::<&str>);

        assert_eq!(builder.get_args(), before);
        assert_eq!(builder.options().len(), 1);
        assert_eq!(sink.count(Level::Debug), 1);
    }

    #[test]
    fn test_list_option_serializes_as_two_tokens() {
        let (mut builder, _) = builder_with_capture();
        builder.set("orgs", Some(vec!["a".to_string(), "b".to_string(), "c".to_string()]));
        assert_eq!(builder.get_args(), vec!["--orgs", "a,b,c"]);
    }

    #[test]
    fn test_build_matches_binary_and_args() {
        let (mut builder, sink) = builder_with_capture();
        assert_eq!(builder.build(), "configtxgen");

        builder
            .set("profile", Some("OrgsChannel"))
            .set("version", Some(true))
            .set("port", Some(7050u16));

        let expected = format!("{} {}", builder.get_binary(), builder.get_args().join(" "));
        assert_eq!(builder.build(), expected);
        assert_eq!(expected, "configtxgen --profile OrgsChannel --version --port 7050");

        let built_lines = sink
            .records()
            .into_iter()
            .filter(|(_, msg)| msg.starts_with("Built command"))
            .count();
        assert_eq!(built_lines, 2);
    }

    #[test]
    fn test_execute_passes_binary_and_tokens() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_by_runner = seen.clone();
        let (builder, _) = builder_with_capture();
        let mut builder = builder.with_runner(move |binary: &str, args: &[String]| -> Result<(), RunError> {
            seen_by_runner.lock().unwrap().push((binary.to_string(), args.to_vec()));
            Ok(())
        });
        builder.set("channelID", Some("mychannel"));

        builder.execute().unwrap();
        builder.execute().unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0, "configtxgen");
        assert_eq!(seen[0].1, vec!["--channelID", "mychannel"]);
    }

    #[test]
    fn test_execute_failure_propagates_with_single_error_line() {
        let (builder, sink) = builder_with_capture();
        let builder = builder.with_runner(|binary: &str, _args: &[String]| -> Result<(), RunError> {
            Err(RunError::NonZeroExit {
                binary: binary.to_string(),
                code: 1,
                stderr: "bad profile".to_string(),
            })
        });

        let err = builder.execute().unwrap_err();
        assert!(matches!(err, RunError::NonZeroExit { code: 1, .. }));

        let errors: Vec<_> = sink
            .records()
            .into_iter()
            .filter(|(level, _)| *level == Level::Error)
            .collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].1.contains("bad profile"));
    }

    #[test]
    fn test_custom_policy_observes_failure_after_log() {
        let calls = Arc::new(AtomicUsize::new(0));
        let errors_at_call = Arc::new(AtomicUsize::new(usize::MAX));
        let (builder, sink) = builder_with_capture();

        let calls_in_handler = calls.clone();
        let errors_in_handler = errors_at_call.clone();
        let sink_in_handler = sink.clone();
        let builder = builder
            .with_runner(|binary: &str, _args: &[String]| -> Result<(), RunError> {
                Err(RunError::Terminated {
                    binary: binary.to_string(),
                })
            })
            .with_failure_policy(FailurePolicy::custom(move |err| {
                assert!(matches!(err, RunError::Terminated { .. }));
                calls_in_handler.fetch_add(1, Ordering::SeqCst);
                errors_in_handler.store(sink_in_handler.count(Level::Error), Ordering::SeqCst);
            }));

        assert!(builder.execute().is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(errors_at_call.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failure_policy_defaults() {
        assert!(matches!(FailurePolicy::default(), FailurePolicy::Propagate));
        assert!(matches!(FailurePolicy::exit(), FailurePolicy::Exit { code: 1 }));
    }

    #[test]
    fn test_exit_status_is_never_zero() {
        assert_eq!(FailurePolicy::Exit { code: 0 }.exit_status(), Some(1));
        assert_eq!(FailurePolicy::Exit { code: 3 }.exit_status(), Some(3));
        assert_eq!(FailurePolicy::exit().exit_status(), Some(1));
        assert_eq!(FailurePolicy::Propagate.exit_status(), None);
        assert_eq!(FailurePolicy::custom(|_| {}).exit_status(), None);
    }
}
