//! Unix-socket [`CommandSource`] implementation.
//!
//! Binds a Unix stream socket and accepts one connection at a time.
//! Each line received is parsed as a JSON-encoded [`Command`] and
//! answered with a single reply line.
//!
//! # Wire format
//!
//! Every message is a single line of JSON followed by `\n`:
//!
//! ```json
//! {"Widget":"clipboard"}
//! {"Close":"launcher"}
//! "Ping"
//! ```
//!
//! Replies are plain text: `launched clipboard`, `closed launcher`,
//! `pong`, or `error: <reason>` for lines that do not parse.

use crate::command::Command;
use crate::traits::CommandSource;
use log::{debug, error, info, warn};
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::mpsc;

/// File name of the daemon socket inside the runtime directory.
pub const SOCKET_NAME: &str = "lfn-shell.sock";

/// Default socket location: `$XDG_RUNTIME_DIR/lfn-shell.sock`, or
/// `/tmp/lfn-shell.sock` when the runtime directory is unset.
pub fn default_socket_path() -> PathBuf {
    std::env::var_os("XDG_RUNTIME_DIR")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(SOCKET_NAME)
}

/// A [`CommandSource`] that listens on a Unix stream socket for
/// JSON-encoded commands.
///
/// Each accepted connection can send multiple newline-delimited JSON
/// commands.  When the connection closes, the listener waits for the
/// next one.
pub struct UnixSocketListener {
    path: PathBuf,
}

/// Errors produced by the Unix socket listener.
#[derive(Debug, thiserror::Error)]
pub enum UnixSocketError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Whether the sink is still accepting commands after a connection.
enum Served {
    Open,
    SinkClosed,
}

impl UnixSocketListener {
    /// Create a new listener bound to `path`.
    ///
    /// The socket file is created when [`run`](CommandSource::run) is called.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The filesystem path of the socket.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn serve(stream: UnixStream, sink: &mpsc::Sender<Command>) -> Result<Served, std::io::Error> {
        let mut writer = stream.try_clone()?;
        let reader = BufReader::new(stream);

        for line in reader.lines() {
            let text = line?;
            let text = text.trim();
            if text.is_empty() {
                continue;
            }
            let reply = match serde_json::from_str::<Command>(text) {
                Ok(cmd) => {
                    debug!("received {:?}", cmd);
                    let reply = cmd.reply();
                    if sink.send(cmd).is_err() {
                        let _ = writeln!(writer, "error: daemon is shutting down");
                        return Ok(Served::SinkClosed);
                    }
                    reply
                }
                Err(e) => {
                    warn!("bad command: {}: {}", text, e);
                    format!("error: {}", e)
                }
            };
            if let Err(e) = writeln!(writer, "{}", reply) {
                // The client may hang up without reading.
                debug!("could not write reply: {}", e);
            }
        }
        Ok(Served::Open)
    }
}

impl CommandSource for UnixSocketListener {
    type Error = UnixSocketError;

    /// Bind the socket and start accepting connections.
    ///
    /// This method **blocks** until the sink is dropped.  Run it on a
    /// dedicated thread.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error> {
        // Remove stale socket if present.
        let _ = std::fs::remove_file(&self.path);

        let listener = UnixListener::bind(&self.path)?;
        info!("listening on {}", self.path.display());

        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    debug!("client connected");
                    match Self::serve(stream, &sink) {
                        Ok(Served::Open) => debug!("client disconnected"),
                        Ok(Served::SinkClosed) => {
                            info!("sink closed, shutting down");
                            let _ = std::fs::remove_file(&self.path);
                            return Ok(());
                        }
                        Err(e) => error!("read error: {}", e),
                    }
                }
                Err(e) => {
                    error!("accept error: {}", e);
                }
            }
        }
        Ok(())
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::WidgetKind;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Monotonic counter to generate unique socket paths per test.
    static TEST_ID: AtomicU32 = AtomicU32::new(0);

    /// Helper: create a unique temporary socket path for each test.
    fn tmp_socket_path() -> PathBuf {
        let id = TEST_ID.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir().join(format!("lfn-shell-test-{}-{}.sock", std::process::id(), id))
    }

    fn spawn_listener(path: &Path) -> mpsc::Receiver<Command> {
        let (tx, rx) = mpsc::channel();
        let path = path.to_path_buf();
        std::thread::spawn(move || {
            let mut listener = UnixSocketListener::new(&path);
            let _ = listener.run(tx);
        });
        // Give the listener a moment to bind.
        std::thread::sleep(Duration::from_millis(150));
        rx
    }

    fn exchange(path: &Path, lines: &[&str]) -> Vec<String> {
        let mut stream = UnixStream::connect(path).expect("connect");
        for line in lines {
            writeln!(stream, "{}", line).unwrap();
        }
        stream.shutdown(std::net::Shutdown::Write).unwrap();
        BufReader::new(stream).lines().map(|l| l.unwrap()).collect()
    }

    #[test]
    fn round_trip_commands_over_socket() {
        let path = tmp_socket_path();
        let rx = spawn_listener(&path);

        let replies = exchange(
            &path,
            &[r#"{"Widget":"clipboard"}"#, "", r#"{"Close":"power_menu"}"#, r#""Ping""#],
        );
        assert_eq!(replies, ["launched clipboard", "closed power_menu", "pong"]);

        let cmds: Vec<Command> = rx.try_iter().collect();
        assert_eq!(
            cmds,
            vec![
                Command::Widget(WidgetKind::Clipboard),
                Command::Close(WidgetKind::PowerMenu),
                Command::Ping,
            ]
        );

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn malformed_json_does_not_crash() {
        let path = tmp_socket_path();
        let rx = spawn_listener(&path);

        let replies = exchange(
            &path,
            &["not json at all", r#"{"Widget":"dock"}"#, r#"{"Widget":"launcher"}"#],
        );
        assert_eq!(replies.len(), 3);
        assert!(replies[0].starts_with("error: "));
        assert!(replies[1].contains("unknown widget: dock"), "{}", replies[1]);
        assert_eq!(replies[2], "launched launcher");

        // Only the valid command should have arrived.
        let cmds: Vec<Command> = rx.try_iter().collect();
        assert_eq!(cmds, vec![Command::Widget(WidgetKind::Launcher)]);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn connections_are_served_one_after_another() {
        let path = tmp_socket_path();
        let _rx = spawn_listener(&path);

        assert_eq!(exchange(&path, &[r#""Ping""#]), ["pong"]);
        assert_eq!(exchange(&path, &[r#""Ping""#]), ["pong"]);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn default_path_ends_with_socket_name() {
        assert!(default_socket_path().ends_with(SOCKET_NAME));
    }
}
