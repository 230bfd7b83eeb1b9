//! Client side of the command socket, used by `lfn-shell widget <name>`.

use crate::command::Command;
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::Path;

/// Errors from talking to the daemon.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("cannot reach lfn-shell at {path}: {source} (is the daemon running?)")]
    Connect {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot encode command: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("daemon closed the connection without replying")]
    NoReply,
}

/// Send one command to the daemon listening on `path` and return its
/// reply line.
pub fn send(path: &Path, command: &Command) -> Result<String, ClientError> {
    let mut stream = UnixStream::connect(path).map_err(|source| ClientError::Connect {
        path: path.display().to_string(),
        source,
    })?;

    let line = serde_json::to_string(command)?;
    writeln!(stream, "{}", line)?;
    stream.shutdown(std::net::Shutdown::Write)?;

    let mut reply = String::new();
    if BufReader::new(stream).read_line(&mut reply)? == 0 {
        return Err(ClientError::NoReply);
    }
    Ok(reply.trim_end().to_string())
}
