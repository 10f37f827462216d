//! Text encoding of an [`Interaction`].
//!
//! Recordings are meant to be read, diffed and edited by hand. The first line
//! is a JSON [`RecordingHeader`] holding the line number where each section
//! starts, so section content never needs escaping: boundaries come from line
//! arithmetic, not from scanning for the separator.
//!
//! ```text
//! {"version":1,"cmd":3,"stdin":5,"stdout":7,"stderr":9,"err":11,"timing":13}
//! ----
//! echo -n hi
//! ----
//!
//! ----
//! hi
//! ----
//! ...
//! ```

use crate::errors::RecordingError;
use crate::storage::{Interaction, RecordingHeader};
use std::io::{Read, Write};

pub const FORMAT_VERSION: u32 = 1;

/// Section separator. Must contain at least one linebreak; the dashes are for
/// readability.
pub const SEPARATOR: &str = "\n----\n";
/// Line counter advance contributed by one [`SEPARATOR`].
pub const SEPARATOR_LINES: usize = 2;

/// Reserved slot for replay timing data.
pub const TIMING_PLACEHOLDER: &str = "{}";

/// Writes `interaction` to `out` in recording format.
pub fn encode<W: Write>(out: &mut W, interaction: &Interaction) -> Result<(), RecordingError> {
    let error = interaction.error.as_deref().unwrap_or("");
    let header = header_for(interaction, error);

    let mut command_line = interaction.command.clone();
    for arg in &interaction.arguments {
        command_line.push(' ');
        command_line.push_str(arg);
    }

    out.write_all(serde_json::to_string(&header)?.as_bytes())?;
    for section in [
        command_line.as_str(),
        interaction.stdin.as_str(),
        interaction.stdout.as_str(),
        interaction.stderr.as_str(),
        error,
        TIMING_PLACEHOLDER,
    ] {
        out.write_all(SEPARATOR.as_bytes())?;
        out.write_all(section.as_bytes())?;
    }
    out.flush()?;
    Ok(())
}

fn header_for(interaction: &Interaction, error: &str) -> RecordingHeader {
    // The command line always takes exactly one line.
    let cmd = 1 + SEPARATOR_LINES;
    let stdin = cmd + SEPARATOR_LINES;
    let stdout = stdin + count_linebreaks(&interaction.stdin) + SEPARATOR_LINES;
    let stderr = stdout + count_linebreaks(&interaction.stdout) + SEPARATOR_LINES;
    let err = stderr + count_linebreaks(&interaction.stderr) + SEPARATOR_LINES;
    let timing = err + count_linebreaks(error) + SEPARATOR_LINES;

    RecordingHeader {
        version: FORMAT_VERSION,
        cmd,
        stdin,
        stdout,
        stderr,
        err,
        timing,
    }
}

fn count_linebreaks(text: &str) -> usize {
    text.bytes().filter(|b| *b == b'\n').count()
}

/// Reads a recording produced by [`encode`].
pub fn decode<R: Read>(mut input: R) -> Result<Interaction, RecordingError> {
    let mut content = String::new();
    input.read_to_string(&mut content)?;

    // Split on LF only; a CR before a linebreak belongs to the content.
    let lines: Vec<&str> = content.split('\n').collect();

    let header: RecordingHeader = serde_json::from_str(lines[0])?;
    if header.version != FORMAT_VERSION {
        return Err(RecordingError::UnsupportedVersion(header.version));
    }

    let command_line = header
        .cmd
        .checked_sub(1)
        .and_then(|index| lines.get(index))
        .ok_or_else(|| {
            RecordingError::Malformed(format!("command line {} out of range", header.cmd))
        })?;
    let mut parts = command_line.split(' ').map(str::to_string);
    let command = parts.next().unwrap_or_default();
    let arguments = parts.collect();

    let error = section(&lines, header.err, header.timing)?;

    Ok(Interaction {
        command,
        arguments,
        stdin: section(&lines, header.stdin, header.stdout)?,
        stdout: section(&lines, header.stdout, header.stderr)?,
        stderr: section(&lines, header.stderr, header.err)?,
        error: (!error.is_empty()).then_some(error),
    })
}

/// Rebuilds the text of the section starting at line `start` and ending
/// right before the separator preceding line `next`.
fn section(lines: &[&str], start: usize, next: usize) -> Result<String, RecordingError> {
    let malformed =
        || RecordingError::Malformed(format!("section lines {start}..{next} out of range"));
    let begin = start.checked_sub(1).ok_or_else(malformed)?;
    let end = next.checked_sub(SEPARATOR_LINES).ok_or_else(malformed)?;
    if begin > end || end >= lines.len() {
        return Err(malformed());
    }

    let mut text = lines[begin..end].join("\n");
    // A trailing linebreak is invisible to a line split; an empty line right
    // after the range means the text ended with one.
    if end > begin && lines[end].is_empty() {
        text.push('\n');
    }
    Ok(text)
}
