//! The boundary between the parsers and the external programs they read.
//!
//! Detection never talks to the OS directly. It asks a [`CommandExecutor`]
//! for the standard output of a command as a stream of lines, which lets the
//! parsing logic run against canned output in tests.

use std::fmt;
use std::io::{self, BufRead, BufReader};
use std::process::{Child, ChildStdout, Command, Stdio};

use tracing::{debug, warn};

use crate::error::{DetectError, Result};

/// A lazy, finite, non-restartable sequence of output lines.
pub type LineStream = Box<dyn Iterator<Item = io::Result<String>>>;

/// A program and its arguments, executed without a shell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Splits a whitespace-separated command line such as `df -h`.
    ///
    /// Returns `None` for a blank string.
    pub fn parse(command_line: &str) -> Option<Self> {
        let mut words = command_line.split_whitespace();
        let program = words.next()?;
        Some(Self {
            program: program.to_string(),
            args: words.map(str::to_string).collect(),
        })
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Runs a command and exposes its standard output line by line.
///
/// A launch failure is returned as [`DetectError::Spawn`]. Read failures are
/// yielded by the stream itself; dropping the stream releases every resource
/// tied to the command.
pub trait CommandExecutor {
    fn execute(&self, command: &CommandSpec) -> Result<LineStream>;
}

impl<E: CommandExecutor + ?Sized> CommandExecutor for &E {
    fn execute(&self, command: &CommandSpec) -> Result<LineStream> {
        (**self).execute(command)
    }
}

/// Spawns real child processes.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemExecutor;

impl CommandExecutor for SystemExecutor {
    fn execute(&self, command: &CommandSpec) -> Result<LineStream> {
        debug!(%command, "spawning");

        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| DetectError::Spawn {
                command: command.to_string(),
                source,
            })?;

        let Some(stdout) = child.stdout.take() else {
            reap(&mut child, command);
            return Err(DetectError::Spawn {
                command: command.to_string(),
                source: io::Error::other("child stdout was not captured"),
            });
        };

        Ok(Box::new(ProcessLines {
            command: command.to_string(),
            child,
            reader: Some(BufReader::new(stdout)),
        }))
    }
}

/// Standard output of a running child.
///
/// The child is waited for once its output ends, after a read error, or when
/// the stream is dropped early. The pipe is closed first so a child still
/// writing gets `EPIPE` instead of blocking forever.
struct ProcessLines {
    command: String,
    child: Child,
    reader: Option<BufReader<ChildStdout>>,
}

impl ProcessLines {
    fn finish(&mut self) {
        if self.reader.take().is_some() {
            match self.child.wait() {
                Ok(status) if !status.success() => {
                    warn!(command = %self.command, %status, "command exited unsuccessfully");
                }
                Ok(_) => {}
                Err(error) => {
                    warn!(command = %self.command, %error, "failed to wait for command");
                }
            }
        }
    }
}

impl Iterator for ProcessLines {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let reader = self.reader.as_mut()?;
        let mut buf = Vec::new();

        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => {
                self.finish();
                None
            }
            Ok(_) => {
                if buf.last() == Some(&b'\n') {
                    buf.pop();
                    if buf.last() == Some(&b'\r') {
                        buf.pop();
                    }
                }
                Some(Ok(String::from_utf8_lossy(&buf).into_owned()))
            }
            Err(error) => {
                self.finish();
                Some(Err(error))
            }
        }
    }
}

impl Drop for ProcessLines {
    fn drop(&mut self) {
        self.finish();
    }
}

fn reap(child: &mut Child, command: &CommandSpec) {
    if let Err(error) = child.kill().and_then(|_| child.wait().map(|_| ())) {
        warn!(%command, %error, "failed to reap child");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_command_line() {
        let command = CommandSpec::new("udevadm")
            .arg("info")
            .arg("-q")
            .arg("property")
            .arg("-n")
            .arg("/dev/sdb1");
        assert_eq!(command.to_string(), "udevadm info -q property -n /dev/sdb1");
    }

    #[test]
    fn parses_command_line() {
        let command = CommandSpec::parse("  df   -h ").unwrap();
        assert_eq!(command, CommandSpec::new("df").arg("-h"));
        assert!(CommandSpec::parse("   ").is_none());
    }

    #[test]
    fn streams_child_output_lines() {
        let command = CommandSpec::new("printf").arg("first\\r\\nsecond\\n\\nlast");
        let lines: Vec<String> = SystemExecutor
            .execute(&command)
            .unwrap()
            .collect::<io::Result<_>>()
            .unwrap();
        assert_eq!(lines, vec!["first", "second", "", "last"]);
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let command = CommandSpec::new("usbdetect-no-such-program-for-tests");
        let error = match SystemExecutor.execute(&command) {
            Err(error) => error,
            Ok(_) => panic!("spawning a missing program should fail"),
        };
        assert!(matches!(error, DetectError::Spawn { .. }));
        assert_eq!(error.command(), Some("usbdetect-no-such-program-for-tests"));
    }

    #[test]
    fn failing_program_yields_no_lines() {
        let mut lines = SystemExecutor.execute(&CommandSpec::new("false")).unwrap();
        assert!(lines.next().is_none());
        assert!(lines.next().is_none());
    }

    #[test]
    fn dropping_early_releases_the_child() {
        let command = CommandSpec::new("yes");
        let mut lines = SystemExecutor.execute(&command).unwrap();
        assert_eq!(lines.next().unwrap().unwrap(), "y");
        drop(lines);
    }
}
