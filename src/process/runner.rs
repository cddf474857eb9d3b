//! Process runners.
//!
//! A [`ProcessRunner`] executes a binary with discrete argv tokens and
//! reports whether it succeeded. [`SystemRunner`] spawns real child
//! processes; closures implement the trait too, which is how tests stand in
//! for the external tool.
//!
//! The child's stdout is passed straight through: inspect, print-org and
//! version invocations report their result there. Stderr is captured so a
//! failure can carry the tool's own message.

use crate::utils::binary::{resolve_binary_path, validate_binary, BinaryError};
use log::debug;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::Duration;

/// `ETXTBSY`, same value on Linux and macOS
const TEXT_FILE_BUSY: i32 = 26;
const SPAWN_RETRIES: u32 = 5;
const SPAWN_RETRY_DELAY: Duration = Duration::from_millis(20);

/// Failure reported by a process runner
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Failed to resolve binary: {0}")]
    Binary(#[from] BinaryError),

    #[error("Failed to spawn {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{binary} exited with status {code}: {stderr}")]
    NonZeroExit {
        binary: String,
        code: i32,
        stderr: String,
    },

    #[error("{binary} was terminated by a signal")]
    Terminated { binary: String },
}

/// Executes a binary with an argument list, blocking until it exits
pub trait ProcessRunner {
    fn run(&self, binary: &str, args: &[String]) -> Result<(), RunError>;
}

impl<F> ProcessRunner for F
where
    F: Fn(&str, &[String]) -> Result<(), RunError>,
{
    fn run(&self, binary: &str, args: &[String]) -> Result<(), RunError> {
        self(binary, args)
    }
}

/// Runner backed by `std::process::Command`
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    bin_dir: Option<PathBuf>,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look binaries up in `bin_dir` instead of `PATH`
    pub fn with_bin_dir(bin_dir: impl Into<PathBuf>) -> Self {
        Self {
            bin_dir: Some(bin_dir.into()),
        }
    }
}

/// A freshly written executable can still be held open for writing by a
/// concurrently forked process; exec then fails with `ETXTBSY` until that
/// process execs or exits.
fn is_text_file_busy(err: &io::Error) -> bool {
    err.raw_os_error() == Some(TEXT_FILE_BUSY)
}

fn spawn_with_retry(program: &Path, binary: &str, args: &[String]) -> Result<Output, RunError> {
    let mut attempt = 0;
    loop {
        let result = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .output();

        match result {
            Ok(output) => return Ok(output),
            Err(err) if is_text_file_busy(&err) && attempt < SPAWN_RETRIES => {
                attempt += 1;
                debug!("{:?} is busy, retrying spawn ({}/{})", program, attempt, SPAWN_RETRIES);
                thread::sleep(SPAWN_RETRY_DELAY * attempt);
            }
            Err(source) => {
                return Err(RunError::Spawn {
                    binary: binary.to_string(),
                    source,
                })
            }
        }
    }
}

impl ProcessRunner for SystemRunner {
    fn run(&self, binary: &str, args: &[String]) -> Result<(), RunError> {
        let program = resolve_binary_path(binary, self.bin_dir.as_deref())?;
        if self.bin_dir.is_some() || program.components().count() > 1 {
            validate_binary(&program)?;
        }

        debug!("Spawning {:?} with {} argument(s)", program, args.len());
        let output = spawn_with_retry(&program, binary, args)?;

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if output.status.success() {
            for line in stderr.lines() {
                debug!("[{}] {}", binary, line);
            }
            return Ok(());
        }

        match output.status.code() {
            Some(code) => Err(RunError::NonZeroExit {
                binary: binary.to_string(),
                code,
                stderr,
            }),
            None => Err(RunError::Terminated {
                binary: binary.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    fn write_script(dir: &Path, name: &str, body: &str) {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn test_closure_runner() {
        let runner = |binary: &str, args: &[String]| -> Result<(), RunError> {
            assert_eq!(binary, "configtxgen");
            assert_eq!(args, ["--version".to_string()]);
            Ok(())
        };
        runner.run("configtxgen", &["--version".to_string()]).unwrap();
    }

    #[test]
    fn test_system_runner_success() {
        let dir = tempfile::tempdir().unwrap();
        write_script(dir.path(), "configtxgen", "echo generated; exit 0");

        let runner = SystemRunner::with_bin_dir(dir.path());
        runner.run("configtxgen", &["--profile".to_string(), "X".to_string()]).unwrap();
    }

    #[test]
    fn test_system_runner_receives_discrete_args() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("argv.txt");
        write_script(
            dir.path(),
            "configtxgen",
            &format!("for a in \"$@\"; do echo \"$a\" >> {}; done", out.display()),
        );

        let runner = SystemRunner::with_bin_dir(dir.path());
        let args = vec!["--configPath".to_string(), "/tmp/with space".to_string()];
        runner.run("configtxgen", &args).unwrap();

        let written = fs::read_to_string(&out).unwrap();
        assert_eq!(written.lines().collect::<Vec<_>>(), vec!["--configPath", "/tmp/with space"]);
    }

    #[test]
    fn test_system_runner_non_zero_exit() {
        let dir = tempfile::tempdir().unwrap();
        write_script(dir.path(), "configtxgen", "echo 'profile not found' >&2; exit 3");

        let runner = SystemRunner::with_bin_dir(dir.path());
        match runner.run("configtxgen", &[]) {
            Err(RunError::NonZeroExit { code, stderr, .. }) => {
                assert_eq!(code, 3);
                assert_eq!(stderr, "profile not found");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_text_file_busy_detection() {
        assert!(is_text_file_busy(&io::Error::from_raw_os_error(TEXT_FILE_BUSY)));
        assert!(!is_text_file_busy(&io::Error::from_raw_os_error(2)));
        assert!(!is_text_file_busy(&io::Error::new(io::ErrorKind::Other, "boom")));
    }

    #[test]
    fn test_system_runner_stderr_on_success_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write_script(dir.path(), "configtxgen", "echo 'Loading configuration' >&2; exit 0");

        let runner = SystemRunner::with_bin_dir(dir.path());
        assert!(runner.run("configtxgen", &[]).is_ok());
    }

    #[test]
    fn test_system_runner_missing_binary() {
        let dir = tempfile::tempdir().unwrap();
        let runner = SystemRunner::with_bin_dir(dir.path());
        assert!(matches!(
            runner.run("configtxgen", &[]),
            Err(RunError::Binary(BinaryError::NotFound { .. }))
        ));
    }
}
