//! Record a process's stdin, stdout, stderr and exit error to a readable file,
//! then play it back without running the process again.

pub mod codec;
pub mod config;
pub mod errors;
pub mod executor;
pub mod logging;
pub mod naming;
pub mod replay;
pub mod storage;

pub use errors::RecordingError;
pub use executor::{ProcessRunner, Runner};
pub use naming::recording_key;
pub use replay::{Player, Recorder};
pub use storage::{ExecOptions, Interaction, ProcessError, RecordingHeader, RunOutput};
