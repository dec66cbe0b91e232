//! Editing collaborators for jot content.
//!
//! # Responsibility
//! - Define the `Editor` seam the lifecycle service hands buffers to.
//! - Run an external editor process on a scratch file.
//!
//! # Invariants
//! - The scratch file is removed on every exit path, including spawn
//!   failures, non-zero exits and unreadable results.
//! - A failed edit never yields content.

use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io::{self, Write};
use std::process::{Command, ExitStatus, Stdio};

/// Program used when no editor is configured.
pub const DEFAULT_EDITOR: &str = "editor";

/// Failure while editing a buffer.
#[derive(Debug)]
pub enum EditorError {
    /// The configured editor command line is blank.
    EmptyCommand,
    /// The editor process could not be started.
    Spawn { program: String, source: io::Error },
    /// The editor process exited unsuccessfully.
    Exited { program: String, status: ExitStatus },
    /// The scratch buffer could not be written or read back.
    Buffer(io::Error),
    /// Failure reported by a non-process editor.
    Aborted(String),
}

impl Display for EditorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCommand => write!(f, "editor command is empty"),
            Self::Spawn { program, source } => {
                write!(f, "couldn't start editor `{program}`: {source}")
            }
            Self::Exited { program, status } => write!(f, "editor `{program}` exited with {status}"),
            Self::Buffer(err) => write!(f, "edit buffer error: {err}"),
            Self::Aborted(reason) => write!(f, "edit aborted: {reason}"),
        }
    }
}

impl Error for EditorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Spawn { source, .. } => Some(source),
            Self::Buffer(err) => Some(err),
            _ => None,
        }
    }
}

/// Takes initial text and returns the edited text.
pub trait Editor {
    fn edit(&mut self, initial: &str) -> Result<String, EditorError>;
}

impl<F> Editor for F
where
    F: FnMut(&str) -> Result<String, EditorError>,
{
    fn edit(&mut self, initial: &str) -> Result<String, EditorError> {
        self(initial)
    }
}

/// Editor backed by an external program invoked as `program [args...] <file>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalEditor {
    program: String,
    args: Vec<String>,
}

impl ExternalEditor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Parses a command line such as `code --wait` into program and args.
    pub fn from_command_line(command_line: &str) -> Result<Self, EditorError> {
        let mut parts = command_line.split_whitespace();
        let program = parts.next().ok_or(EditorError::EmptyCommand)?;
        Ok(Self {
            program: program.to_string(),
            args: parts.map(str::to_string).collect(),
        })
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Editor for ExternalEditor {
    fn edit(&mut self, initial: &str) -> Result<String, EditorError> {
        let mut scratch = tempfile::Builder::new()
            .prefix("jot-")
            .suffix(".txt")
            .tempfile()
            .map_err(EditorError::Buffer)?;
        scratch
            .write_all(initial.as_bytes())
            .map_err(EditorError::Buffer)?;
        scratch.flush().map_err(EditorError::Buffer)?;

        // Close our handle so the editor owns the file; the path guard still
        // deletes it on drop.
        let scratch_path = scratch.into_temp_path();

        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(&scratch_path)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| {
                error!("event=editor_run module=editor status=error error_code=spawn_failed");
                EditorError::Spawn {
                    program: self.program.clone(),
                    source,
                }
            })?;

        if !status.success() {
            error!(
                "event=editor_run module=editor status=error error_code=editor_exit exit={status}"
            );
            return Err(EditorError::Exited {
                program: self.program.clone(),
                status,
            });
        }

        let edited = fs::read_to_string(&scratch_path).map_err(EditorError::Buffer)?;
        info!("event=editor_run module=editor status=ok bytes={}", edited.len());
        Ok(edited)
    }
}

#[cfg(test)]
mod tests {
    use super::{EditorError, ExternalEditor};

    #[test]
    fn command_line_splits_program_and_args() {
        let editor = ExternalEditor::from_command_line("  code --wait  -n ").unwrap();
        assert_eq!(editor, ExternalEditor::new("code").with_args(["--wait", "-n"]));
        assert_eq!(editor.program(), "code");
    }

    #[test]
    fn blank_command_line_is_rejected() {
        let err = ExternalEditor::from_command_line("   ").unwrap_err();
        assert!(matches!(err, EditorError::EmptyCommand));
    }
}
