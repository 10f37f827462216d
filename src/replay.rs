//! Record and playback adapters.
//!
//! [`Recorder`] runs a command and stores the interaction in a directory;
//! [`Player`] answers the same call from that directory without running
//! anything. Both are keyed by [`recording_key`], so a recording made with
//! one set of inputs is only found again with exactly the same inputs.

use crate::codec;
use crate::errors::RecordingError;
use crate::executor::{ProcessRunner, Runner};
use crate::naming::recording_key;
use crate::storage::{ExecOptions, Interaction, RunOutput};
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Runs commands through an inner [`Runner`] and records every result.
#[derive(Debug, Clone)]
pub struct Recorder<R = ProcessRunner> {
    dir: PathBuf,
    inner: R,
}

impl Recorder {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_runner(dir, ProcessRunner)
    }
}

impl<R: Runner> Recorder<R> {
    pub fn with_runner(dir: impl Into<PathBuf>, inner: R) -> Self {
        Self {
            dir: dir.into(),
            inner,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `interaction` to its recording file, replacing any previous one.
    ///
    /// The content goes to a temporary file in the same directory first and
    /// is renamed into place only once fully written.
    pub fn record(&self, interaction: &Interaction) -> Result<PathBuf, RecordingError> {
        let path = self.dir.join(recording_key(
            &interaction.stdin,
            &interaction.command,
            &interaction.arguments,
        ));

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        codec::encode(&mut BufWriter::new(tmp.as_file_mut()), interaction)?;
        tmp.persist(&path).map_err(|e| e.error)?;

        info!(path = %path.display(), "recorded");
        Ok(path)
    }
}

impl<R: Runner> Runner for Recorder<R> {
    fn run(
        &self,
        options: Option<&ExecOptions>,
        stdin: &str,
        command: &str,
        args: &[String],
    ) -> Result<RunOutput, RecordingError> {
        let output = self.inner.run(options, stdin, command, args)?;
        self.record(&Interaction::from_run(stdin, command, args, &output))?;
        Ok(output)
    }
}

/// Plays back recordings made by [`Recorder`] instead of running processes.
#[derive(Debug, Clone)]
pub struct Player {
    dir: PathBuf,
}

impl Player {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Loads the recording for an invocation.
    ///
    /// Only the filename ties the recording to the request; the stored
    /// command and arguments are not compared.
    pub fn load(
        &self,
        stdin: &str,
        command: &str,
        args: &[String],
    ) -> Result<Interaction, RecordingError> {
        let path = self.dir.join(recording_key(stdin, command, args));
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(RecordingError::Missing { path });
            }
            Err(err) => return Err(err.into()),
        };

        info!(path = %path.display(), "playback");
        codec::decode(BufReader::new(file))
    }
}

impl Runner for Player {
    fn run(
        &self,
        options: Option<&ExecOptions>,
        stdin: &str,
        command: &str,
        args: &[String],
    ) -> Result<RunOutput, RecordingError> {
        if options.is_some() {
            debug!(command, "playback ignores exec options");
        }
        Ok(self.load(stdin, command, args)?.into_output())
    }
}
