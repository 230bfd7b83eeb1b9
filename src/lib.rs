//! **lfn-shell**: overlay panels for Wayland compositors.
//!
//! A single daemon owns three panels: a clipboard history bar, an
//! application launcher with calculator and web-search rows, and a power
//! menu.  Panels are opened by name over a Unix socket
//! (`lfn-shell widget clipboard`), and at most one of each kind is open
//! at a time.
//!
//! # Architecture
//!
//! The crate is organised around a few traits:
//!
//! * [`traits::CommandRunner`] and [`traits::AppRegistry`]: every side
//!   effect a panel has (running `cliphist`, `wl-copy`, session commands,
//!   launching desktop apps) goes through these, so the
//!   [`services`] are plain state machines that can be tested without a
//!   desktop.
//! * [`traits::CommandSource`]: abstracts the transport that delivers
//!   user intent, implemented by [`ipc::listener`].
//! * [`registry::Panel`]: what the [`registry::PanelRegistry`] needs
//!   from a built panel.
//!
//! Concrete implementations live in [`system`] (child processes, GIO) and
//! `ui` (GTK4 + layer-shell, behind the `gui-gtk` feature).

pub mod command;
pub mod config;
pub mod ipc;
pub mod list;
pub mod preview;
pub mod query;
pub mod registry;
pub mod render;
pub mod search;
pub mod services;
pub mod system;
pub mod traits;
#[cfg(feature = "gui-gtk")]
pub mod ui;
