//! Seams that decouple the panel services from the operating system.
//!
//! Every side effect the services perform goes through one of these
//! traits: running the clipboard tool or a session command
//! ([`CommandRunner`]), enumerating and launching desktop applications
//! ([`AppRegistry`]), and receiving user intent ([`CommandSource`]).
//! Concrete implementations live in [`system`](crate::system) and
//! [`ipc`](crate::ipc); the tests below and in each service use recording
//! doubles instead.

use crate::command::Command;
use std::sync::mpsc;

//  Command runner

/// Runs external programs on behalf of a service.
///
/// Implementations must be cheap to clone and [`Send`]: the clipboard
/// history poller and the image preview loader run them on background
/// threads.
pub trait CommandRunner: Clone + Send + 'static {
    /// The error type produced by this runner.
    type Error: std::error::Error + Send + 'static;

    /// Run `program` with `args`, feed `stdin` if given, wait for it and
    /// return its standard output.
    ///
    /// A non-zero exit status is an error.
    fn output(&self, program: &str, args: &[&str], stdin: Option<&[u8]>) -> Result<Vec<u8>, Self::Error>;

    /// Like [`output`](CommandRunner::output) but discards standard output.
    ///
    /// Needed for tools such as `wl-copy` that fork a server which keeps
    /// inherited pipes open long after the command itself returned.
    fn run(&self, program: &str, args: &[&str], stdin: Option<&[u8]>) -> Result<(), Self::Error>;

    /// Start `program` with `args` without waiting for it.  The child is
    /// reaped off the calling thread.
    ///
    /// Used for openers such as `xdg-open`, which may keep running for as
    /// long as the program they open.
    fn spawn(&self, program: &str, args: &[&str]) -> Result<(), Self::Error>;

    /// Start `command_line` through the shell without waiting for it.
    fn spawn_shell(&self, command_line: &str) -> Result<(), Self::Error>;
}

//  Application registry

/// A launchable desktop application as reported by the OS registry.
///
/// Empty strings stand for "not provided".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppEntry {
    /// Desktop file id (`firefox.desktop`), if the entry came from one.
    pub desktop_id: Option<String>,
    pub name: String,
    pub display_name: String,
    pub generic_name: Option<String>,
    pub executable: String,
    pub command_line: Option<String>,
    pub description: Option<String>,
    /// Serialized icon (a themed icon name or a file path).
    pub icon: Option<String>,
}

/// Source of desktop applications.
pub trait AppRegistry {
    /// The error type produced by this registry.
    type Error: std::error::Error + Send + 'static;

    /// List the installed applications.  Entries the user asked to hide
    /// are only included when `include_hidden` is set.
    fn applications(&self, include_hidden: bool) -> Result<Vec<AppEntry>, Self::Error>;

    /// Launch `app`.
    fn launch(&self, app: &AppEntry) -> Result<(), Self::Error>;
}

//  Command Source

/// A source of [`Command`]s.
///
/// Implementations listen on some transport (a Unix socket, an in-memory
/// channel, …) and forward parsed commands into the provided
/// [`mpsc::Sender`].
///
/// # Contract
///
/// * [`run`](CommandSource::run) **blocks** until the source is exhausted or
///   an unrecoverable error occurs.
/// * Each received command must be sent through `sink` exactly once.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
pub trait CommandSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every incoming [`Command`] into `sink`.
    ///
    /// This method blocks the calling thread.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! Recording doubles shared by the service tests.

    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, thiserror::Error)]
    #[error("mock error: {0}")]
    pub struct MockError(pub String);

    /// One recorded invocation of [`MockRunner`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        Output { program: String, args: Vec<String>, stdin: Option<Vec<u8>> },
        Run { program: String, args: Vec<String>, stdin: Option<Vec<u8>> },
        Spawn { program: String, args: Vec<String> },
        Shell(String),
    }

    /// A [`CommandRunner`] that records calls and answers from a table
    /// keyed by `"program arg1 arg2"`.
    #[derive(Clone, Default)]
    pub struct MockRunner {
        pub calls: Arc<Mutex<Vec<Call>>>,
        pub responses: Arc<Mutex<HashMap<String, Result<Vec<u8>, String>>>>,
        pub fail_shell: bool,
    }

    impl MockRunner {
        pub fn respond(&self, command: &str, stdout: &[u8]) {
            self.responses
                .lock()
                .unwrap()
                .insert(command.to_string(), Ok(stdout.to_vec()));
        }

        pub fn fail(&self, command: &str) {
            self.responses
                .lock()
                .unwrap()
                .insert(command.to_string(), Err(format!("{} failed", command)));
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl CommandRunner for MockRunner {
        type Error = MockError;

        fn output(&self, program: &str, args: &[&str], stdin: Option<&[u8]>) -> Result<Vec<u8>, MockError> {
            self.calls.lock().unwrap().push(Call::Output {
                program: program.to_string(),
                args: args.iter().map(|a| a.to_string()).collect(),
                stdin: stdin.map(|s| s.to_vec()),
            });
            let key = std::iter::once(program)
                .chain(args.iter().copied())
                .collect::<Vec<_>>()
                .join(" ");
            match self.responses.lock().unwrap().get(&key) {
                Some(Ok(out)) => Ok(out.clone()),
                Some(Err(e)) => Err(MockError(e.clone())),
                None => Ok(Vec::new()),
            }
        }

        fn run(&self, program: &str, args: &[&str], stdin: Option<&[u8]>) -> Result<(), MockError> {
            self.calls.lock().unwrap().push(Call::Run {
                program: program.to_string(),
                args: args.iter().map(|a| a.to_string()).collect(),
                stdin: stdin.map(|s| s.to_vec()),
            });
            let key = std::iter::once(program)
                .chain(args.iter().copied())
                .collect::<Vec<_>>()
                .join(" ");
            match self.responses.lock().unwrap().get(&key) {
                Some(Err(e)) => Err(MockError(e.clone())),
                _ => Ok(()),
            }
        }

        fn spawn(&self, program: &str, args: &[&str]) -> Result<(), MockError> {
            self.calls.lock().unwrap().push(Call::Spawn {
                program: program.to_string(),
                args: args.iter().map(|a| a.to_string()).collect(),
            });
            let key = std::iter::once(program)
                .chain(args.iter().copied())
                .collect::<Vec<_>>()
                .join(" ");
            match self.responses.lock().unwrap().get(&key) {
                Some(Err(e)) => Err(MockError(e.clone())),
                _ => Ok(()),
            }
        }

        fn spawn_shell(&self, command_line: &str) -> Result<(), MockError> {
            self.calls.lock().unwrap().push(Call::Shell(command_line.to_string()));
            if self.fail_shell {
                Err(MockError(format!("cannot spawn {}", command_line)))
            } else {
                Ok(())
            }
        }
    }

    /// An [`AppRegistry`] backed by a fixed list that records launches.
    #[derive(Default)]
    pub struct MockRegistry {
        pub apps: Vec<AppEntry>,
        pub launched: Mutex<Vec<String>>,
        pub fail_enumerate: bool,
    }

    impl AppRegistry for MockRegistry {
        type Error = MockError;

        fn applications(&self, _include_hidden: bool) -> Result<Vec<AppEntry>, MockError> {
            if self.fail_enumerate {
                return Err(MockError("no registry".into()));
            }
            Ok(self.apps.clone())
        }

        fn launch(&self, app: &AppEntry) -> Result<(), MockError> {
            self.launched.lock().unwrap().push(app.display_name.clone());
            Ok(())
        }
    }

    pub fn app(name: &str, display_name: &str) -> AppEntry {
        AppEntry {
            desktop_id: Some(format!("{}.desktop", name)),
            name: name.to_string(),
            display_name: display_name.to_string(),
            executable: name.to_string(),
            ..AppEntry::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::command::WidgetKind;

    #[test]
    fn mock_runner_records_calls() {
        let runner = MockRunner::default();
        runner.respond("cliphist list", b"1\thello");
        let out = runner.output("cliphist", &["list"], None).unwrap();
        assert_eq!(out, b"1\thello");
        runner.spawn_shell("systemctl reboot").unwrap();
        assert_eq!(
            runner.calls(),
            vec![
                Call::Output { program: "cliphist".into(), args: vec!["list".into()], stdin: None },
                Call::Shell("systemctl reboot".into()),
            ]
        );
    }

    /// A test double that emits a fixed sequence of commands.
    struct MockSource {
        commands: Vec<Command>,
    }

    impl CommandSource for MockSource {
        type Error = MockError;

        fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), MockError> {
            for cmd in self.commands.drain(..) {
                let _ = sink.send(cmd);
            }
            Ok(())
        }
    }

    #[test]
    fn mock_source_emits_commands() {
        let mut src = MockSource {
            commands: vec![Command::Widget(WidgetKind::Launcher), Command::Ping],
        };
        let (tx, rx) = mpsc::channel();
        src.run(tx).unwrap();
        let cmds: Vec<Command> = rx.try_iter().collect();
        assert_eq!(cmds, vec![Command::Widget(WidgetKind::Launcher), Command::Ping]);
    }
}
