//! Command surface over a Unix socket.
//!
//! The daemon runs a [`listener::UnixSocketListener`]; the same binary,
//! invoked as `lfn-shell widget <name>`, uses [`client::send`] to deliver
//! a command and print the daemon's reply.  Scripts and key bindings can
//! also write newline-delimited JSON to the socket directly.

pub mod client;
pub mod listener;
