//! [`CommandRunner`] implementation that spawns real child processes.

use crate::traits::CommandRunner;
use log::debug;
use std::io::Write;
use std::process::{Child, Command, Stdio};

/// Runs programs with [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

/// Errors from running an external program.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("io error talking to {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}: {stderr}")]
    Status {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
}

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }

    fn start(program: &str, args: &[&str], stdin: Option<&[u8]>, capture: bool) -> Result<Child, ProcessError> {
        let output = || if capture { Stdio::piped() } else { Stdio::null() };
        let mut child = Command::new(program)
            .args(args)
            .stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(output())
            .stderr(output())
            .spawn()
            .map_err(|source| ProcessError::Spawn {
                program: program.to_string(),
                source,
            })?;

        if let (Some(data), Some(mut pipe)) = (stdin, child.stdin.take()) {
            if let Err(source) = pipe.write_all(data) {
                drop(pipe);
                let _ = child.kill();
                let _ = child.wait();
                return Err(ProcessError::Io {
                    program: program.to_string(),
                    source,
                });
            }
            // Dropping the pipe sends EOF.
        }
        Ok(child)
    }

    /// Start `command` with all standard streams closed and reap it on a
    /// background thread.
    fn detach(program: &str, command: &mut Command) -> Result<(), ProcessError> {
        let mut child = command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| ProcessError::Spawn {
                program: program.to_string(),
                source,
            })?;
        std::thread::spawn(move || {
            let _ = child.wait();
        });
        Ok(())
    }
}

impl CommandRunner for SystemRunner {
    type Error = ProcessError;

    fn output(&self, program: &str, args: &[&str], stdin: Option<&[u8]>) -> Result<Vec<u8>, ProcessError> {
        debug!("exec {} {:?}", program, args);
        let child = Self::start(program, args, stdin, true)?;
        let out = child.wait_with_output().map_err(|source| ProcessError::Io {
            program: program.to_string(),
            source,
        })?;
        if !out.status.success() {
            return Err(ProcessError::Status {
                program: program.to_string(),
                status: out.status,
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            });
        }
        Ok(out.stdout)
    }

    fn run(&self, program: &str, args: &[&str], stdin: Option<&[u8]>) -> Result<(), ProcessError> {
        debug!("exec {} {:?} (no capture)", program, args);
        let mut child = Self::start(program, args, stdin, false)?;
        let status = child.wait().map_err(|source| ProcessError::Io {
            program: program.to_string(),
            source,
        })?;
        if !status.success() {
            return Err(ProcessError::Status {
                program: program.to_string(),
                status,
                stderr: String::new(),
            });
        }
        Ok(())
    }

    fn spawn(&self, program: &str, args: &[&str]) -> Result<(), ProcessError> {
        debug!("spawn {} {:?}", program, args);
        Self::detach(program, Command::new(program).args(args))
    }

    fn spawn_shell(&self, command_line: &str) -> Result<(), ProcessError> {
        debug!("spawn sh -c {:?}", command_line);
        Self::detach("sh", Command::new("sh").arg("-c").arg(command_line))
    }
}
