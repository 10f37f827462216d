use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// One captured process run: what went in and what came out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Interaction {
    pub command: String,        // Executable name
    pub arguments: Vec<String>, // Arguments in order
    pub stdin: String,          // Text fed to the child
    pub stdout: String,         // Captured standard output
    pub stderr: String,         // Captured standard error
    pub error: Option<String>,  // Error message, None on success
}

impl Interaction {
    /// An empty error message is stored as no error, since a recording
    /// cannot tell the two apart.
    pub fn from_run(stdin: &str, command: &str, args: &[String], output: &RunOutput) -> Self {
        Self {
            command: command.to_string(),
            arguments: args.to_vec(),
            stdin: stdin.to_string(),
            stdout: output.stdout.clone(),
            stderr: output.stderr.clone(),
            error: output
                .error
                .as_ref()
                .map(|e| e.message.clone())
                .filter(|message| !message.is_empty()),
        }
    }

    pub fn into_output(self) -> RunOutput {
        RunOutput {
            stdout: self.stdout,
            stderr: self.stderr,
            error: self.error.map(ProcessError::new),
        }
    }
}

/// First line of a recording file.
///
/// Every field except `version` is the 1-based line number where that
/// section's content starts.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct RecordingHeader {
    pub version: u32,
    pub cmd: usize,
    #[serde(default)]
    pub stdin: usize,
    #[serde(default)]
    pub stdout: usize,
    #[serde(default)]
    pub stderr: usize,
    #[serde(default)]
    pub err: usize,
    #[serde(default)]
    pub timing: usize,
}

/// Execution options, see [`std::process::Command`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOptions {
    /// Working directory of the child.
    pub dir: Option<PathBuf>,
    /// Complete child environment. `None` inherits the caller's environment.
    pub env: Option<Vec<(String, String)>>,
}

/// What a [`crate::executor::Runner`] hands back after a run or a playback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutput {
    pub stdout: String,
    pub stderr: String,
    pub error: Option<ProcessError>,
}

/// A failed process run: non-zero exit or spawn failure.
///
/// Only the message survives a recording, so this carries nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessError {
    pub message: String,
}

impl ProcessError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ProcessError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interaction_carries_error_message_only() {
        let output = RunOutput {
            stdout: String::new(),
            stderr: "boom\n".to_string(),
            error: Some(ProcessError::new("false []: exit status: 1 - boom\n")),
        };
        let args = vec!["-x".to_string()];
        let interaction = Interaction::from_run("in", "false", &args, &output);
        assert_eq!(interaction.command, "false");
        assert_eq!(interaction.arguments, args);
        assert_eq!(interaction.stdin, "in");
        assert_eq!(
            interaction.error.as_deref(),
            Some("false []: exit status: 1 - boom\n")
        );

        assert_eq!(interaction.into_output(), output);
    }

    #[test]
    fn empty_error_message_counts_as_success() {
        let output = RunOutput {
            stdout: "ok".to_string(),
            error: Some(ProcessError::new("")),
            ..Default::default()
        };
        let interaction = Interaction::from_run("", "true", &[], &output);
        assert_eq!(interaction.error, None);
    }

    #[test]
    fn header_serializes_fields_in_file_order() -> anyhow::Result<()> {
        let header = RecordingHeader {
            version: 1,
            cmd: 3,
            stdin: 5,
            stdout: 7,
            stderr: 9,
            err: 11,
            timing: 13,
        };
        assert_eq!(
            serde_json::to_string(&header)?,
            r#"{"version":1,"cmd":3,"stdin":5,"stdout":7,"stderr":9,"err":11,"timing":13}"#
        );
        Ok(())
    }
}
