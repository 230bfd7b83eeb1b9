//! GTK4 + layer-shell front end.  Runs on the **main thread**.
//!
//! # Windows
//!
//! ```text
//! clipboard  (bottom edge)  entry + "Clear" ┐
//!                            └ scroller → horizontal strip of .clip-card buttons
//! launcher   (top, centred) entry
//!                            └ scroller → list of .launcher-row (icon + title)
//! power_menu (left edge)    column of four .power-button icons
//! ```
//!
//! Every panel is an overlay-layer surface with exclusive keyboard focus
//! and its own ~16 ms tick that drains service events and stops once the
//! window is closed.  Panels never spawn processes themselves; they call
//! into their [`services`](crate::services) object.

pub mod app;
pub mod clipboard;
pub mod launcher;
pub mod layer;
pub mod power;
pub mod style;
