//! Operating-system backends for the service traits.
//!
//! [`process::SystemRunner`] runs external tools (the clipboard history
//! manager, session commands, `notify-send`) and, with the `gui-gtk`
//! feature, [`apps::GioAppRegistry`] talks to GIO's application database.
//!
//! Nothing outside this module should spawn processes directly.

#[cfg(feature = "gui-gtk")]
pub mod apps;
pub mod notify;
pub mod process;
