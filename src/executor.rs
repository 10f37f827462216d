use crate::errors::RecordingError;
use crate::storage::{ExecOptions, ProcessError, RunOutput};
use std::fmt::Display;
use std::io::{self, Read, Write};
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

/// Something that can answer "what does this command print?".
///
/// Implemented by [`ProcessRunner`] for real runs and by the record and
/// playback adapters in [`crate::replay`].
pub trait Runner {
    /// Runs `command` with `args`, feeding it `stdin`, and returns its output.
    ///
    /// A failing process is reported in [`RunOutput::error`]; `Err` is
    /// reserved for failures of the runner itself.
    fn run(
        &self,
        options: Option<&ExecOptions>,
        stdin: &str,
        command: &str,
        args: &[String],
    ) -> Result<RunOutput, RecordingError>;
}

/// Runs real processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl Runner for ProcessRunner {
    fn run(
        &self,
        options: Option<&ExecOptions>,
        stdin: &str,
        command: &str,
        args: &[String],
    ) -> Result<RunOutput, RecordingError> {
        let mut cmd = Command::new(command);
        cmd.args(args)
            .stdin(if stdin.is_empty() {
                Stdio::null()
            } else {
                Stdio::piped()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(options) = options {
            if let Some(dir) = &options.dir {
                cmd.current_dir(dir);
            }
            if let Some(env) = &options.env {
                cmd.env_clear().envs(env.clone());
            }
        }

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(err) => {
                debug!(command, error = %err, "spawn failed");
                return Ok(RunOutput {
                    error: Some(process_error(command, args, &err, "")),
                    ..Default::default()
                });
            }
        };

        // Feed stdin from its own thread so a child blocked on a full stdout
        // pipe cannot deadlock us.
        let stdin_handle = child.stdin.take().map(|mut pipe| {
            let input = stdin.to_string();
            thread::spawn(move || {
                if let Err(err) = pipe.write_all(input.as_bytes()) {
                    warn!(error = %err, "write stdin");
                }
                // Dropping the pipe closes the child's stdin.
            })
        });
        let stdout_handle = drain(child.stdout.take());
        let stderr_handle = drain(child.stderr.take());

        let status = child.wait()?;

        if let Some(handle) = stdin_handle {
            if handle.join().is_err() {
                warn!(command, "stdin writer panicked");
            }
        }
        let stdout = collect(stdout_handle, "stdout")?;
        let stderr = collect(stderr_handle, "stderr")?;

        debug!(command, %status, stdout = %stdout, stderr = %stderr, "run result");

        let error = (!status.success()).then(|| process_error(command, args, &status, &stderr));
        Ok(RunOutput {
            stdout,
            stderr,
            error,
        })
    }
}

fn process_error(command: &str, args: &[String], cause: &dyn Display, stderr: &str) -> ProcessError {
    ProcessError::new(format!(
        "{} [{}]: {} - {}",
        command,
        args.join(" "),
        cause,
        stderr
    ))
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<io::Result<Vec<u8>>>> {
    pipe.map(|mut reader| {
        thread::spawn(move || {
            let mut collected = Vec::new();
            reader.read_to_end(&mut collected)?;
            Ok(collected)
        })
    })
}

fn collect(
    handle: Option<JoinHandle<io::Result<Vec<u8>>>>,
    stream: &str,
) -> Result<String, RecordingError> {
    let Some(handle) = handle else {
        return Ok(String::new());
    };
    let bytes = handle
        .join()
        .map_err(|_| io::Error::other(format!("{stream} reader panicked")))??;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn echoes_on_stdout() -> anyhow::Result<()> {
        let out = ProcessRunner.run(None, "", "echo", &args(&["-n", "hello world"]))?;
        assert_eq!(out.stdout, "hello world");
        assert_eq!(out.stderr, "");
        assert!(out.error.is_none());
        Ok(())
    }

    #[test]
    fn reports_non_zero_exit() -> anyhow::Result<()> {
        let out = ProcessRunner.run(None, "", "ls", &args(&["nonexisting"]))?;
        assert_eq!(out.stdout, "");
        assert!(out.stderr.contains("nonexisting"));
        let err = out.error.ok_or_else(|| anyhow::anyhow!("expected an error"))?;
        assert!(err.message.starts_with("ls [nonexisting]: exit status"));
        assert!(err.message.ends_with(&out.stderr));
        Ok(())
    }

    #[test]
    fn reports_spawn_failure() -> anyhow::Result<()> {
        let out = ProcessRunner.run(None, "", "exerec-no-such-binary", &args(&["x"]))?;
        let err = out.error.ok_or_else(|| anyhow::anyhow!("expected an error"))?;
        assert!(err.message.starts_with("exerec-no-such-binary [x]: "));
        Ok(())
    }

    #[test]
    fn feeds_stdin() -> anyhow::Result<()> {
        let out = ProcessRunner.run(None, "aGVsbG8gd29ybGQ=", "base64", &args(&["-d"]))?;
        assert_eq!(out.stdout, "hello world");
        assert!(out.error.is_none());
        Ok(())
    }

    #[test]
    fn large_stdin_does_not_deadlock() -> anyhow::Result<()> {
        let input = "0123456789abcdef\n".repeat(64 * 1024);
        let out = ProcessRunner.run(None, &input, "cat", &[])?;
        assert_eq!(out.stdout.len(), input.len());
        Ok(())
    }

    #[test]
    fn uses_the_given_environment() -> anyhow::Result<()> {
        let options = ExecOptions {
            env: Some(vec![("SONG".to_string(), "HappyHappyJoyJoy".to_string())]),
            ..Default::default()
        };
        let out = ProcessRunner.run(Some(&options), "", "/usr/bin/env", &[])?;
        assert_eq!(out.stdout, "SONG=HappyHappyJoyJoy\n");
        Ok(())
    }

    #[test]
    fn runs_in_the_given_dir() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let canonical = dir.path().canonicalize()?;
        let options = ExecOptions {
            dir: Some(canonical.clone()),
            ..Default::default()
        };
        let out = ProcessRunner.run(Some(&options), "", "pwd", &[])?;
        assert_eq!(PathBuf::from(out.stdout.trim_end()), canonical);
        Ok(())
    }
}
