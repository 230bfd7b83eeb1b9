//! At most one live panel per [`WidgetKind`].
//!
//! Asking for a panel that is already open re-presents it instead of
//! stacking a second window on top.  Panels close themselves (Escape,
//! activation), so the registry checks [`Panel::is_open`] and forgets
//! dead entries before every lookup.

use crate::command::WidgetKind;
use log::{debug, info};
use std::collections::HashMap;

/// A toplevel panel as seen by the registry.
pub trait Panel {
    /// Raise the panel and give it keyboard focus.
    fn present(&self);

    /// Whether the panel's window still exists.
    fn is_open(&self) -> bool;

    /// Close the panel.  Closing twice is a no-op.
    fn close(&self);
}

/// Outcome of [`PanelRegistry::launch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launch {
    /// A new panel was built.
    Created,
    /// An open panel was raised again.
    Presented,
}

/// Keeps track of the open panel of each kind.
pub struct PanelRegistry<P: Panel> {
    panels: HashMap<WidgetKind, P>,
}

impl<P: Panel> Default for PanelRegistry<P> {
    fn default() -> Self {
        Self {
            panels: HashMap::new(),
        }
    }
}

impl<P: Panel> PanelRegistry<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget panels whose window is gone.
    pub fn prune(&mut self) {
        self.panels.retain(|kind, panel| {
            let open = panel.is_open();
            if !open {
                debug!("{} panel closed", kind);
            }
            open
        });
    }

    /// Show the `kind` panel, building it with `build` unless one is
    /// already open.
    pub fn launch(&mut self, kind: WidgetKind, build: impl FnOnce() -> P) -> Launch {
        self.prune();
        if let Some(panel) = self.panels.get(&kind) {
            debug!("re-presenting {} panel", kind);
            panel.present();
            return Launch::Presented;
        }
        let panel = build();
        panel.present();
        info!("{} panel created", kind);
        self.panels.insert(kind, panel);
        Launch::Created
    }

    /// Close the `kind` panel.  Returns whether one was open.
    pub fn close(&mut self, kind: WidgetKind) -> bool {
        self.prune();
        match self.panels.remove(&kind) {
            Some(panel) => {
                panel.close();
                true
            }
            None => false,
        }
    }

    pub fn is_open(&self, kind: WidgetKind) -> bool {
        self.panels.get(&kind).is_some_and(|p| p.is_open())
    }

    /// Close every panel.
    pub fn close_all(&mut self) {
        for (_, panel) in self.panels.drain() {
            panel.close();
        }
    }
}
