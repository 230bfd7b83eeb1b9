//! Layer-shell windows shared by all panels.

use crate::registry::Panel;
use gtk4::prelude::*;
use gtk4::{gdk, glib};
use gtk4_layer_shell::{Edge, KeyboardMode, Layer, LayerShell};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

/// Frame interval of panel ticks (~60 fps).
pub const TICK: Duration = Duration::from_millis(16);

/// Create an overlay-layer window that grabs the keyboard, anchored to
/// `anchors` with the given per-edge `margins`.
pub fn layer_window(namespace: &str, anchors: &[Edge], margins: &[(Edge, i32)]) -> gtk4::Window {
    let window = gtk4::Window::new();
    window.init_layer_shell();
    window.set_layer(Layer::Overlay);
    window.set_namespace(namespace);
    window.set_keyboard_mode(KeyboardMode::Exclusive);
    window.set_exclusive_zone(0);
    for edge in anchors {
        window.set_anchor(*edge, true);
    }
    for (edge, margin) in margins {
        window.set_margin(*edge, *margin);
    }
    window.set_decorated(false);
    window.remove_css_class("background");
    window
}

/// Install a capture-phase key handler on `window`, so keys reach the
/// panel before the focused entry sees them.
pub fn on_key_pressed<F>(window: &gtk4::Window, handler: F)
where
    F: Fn(gdk::Key) -> glib::Propagation + 'static,
{
    let keys = gtk4::EventControllerKey::new();
    keys.set_propagation_phase(gtk4::PropagationPhase::Capture);
    keys.connect_key_pressed(move |_, key, _, _| handler(key));
    window.add_controller(keys);
}

/// Run `frame` every [`TICK`] until the panel is closed.
pub fn every_frame<F>(alive: Rc<Cell<bool>>, mut frame: F)
where
    F: FnMut() + 'static,
{
    glib::timeout_add_local(TICK, move || {
        if !alive.get() {
            return glib::ControlFlow::Break;
        }
        frame();
        glib::ControlFlow::Continue
    });
}

/// A built panel as held by the [`PanelRegistry`](crate::registry::PanelRegistry).
pub struct PanelHandle {
    window: gtk4::Window,
    alive: Rc<Cell<bool>>,
    focus: Option<gtk4::Widget>,
}

impl PanelHandle {
    /// Wrap `window`; `focus` receives keyboard focus on every present.
    pub fn new(window: gtk4::Window, focus: Option<gtk4::Widget>) -> Self {
        let alive = Rc::new(Cell::new(true));
        let flag = alive.clone();
        window.connect_close_request(move |_| {
            flag.set(false);
            glib::Propagation::Proceed
        });
        Self { window, alive, focus }
    }

    /// Shared flag cleared when the window closes.
    pub fn alive(&self) -> Rc<Cell<bool>> {
        self.alive.clone()
    }
}

impl Panel for PanelHandle {
    fn present(&self) {
        self.window.present();
        if let Some(focus) = &self.focus {
            focus.grab_focus();
        }
    }

    fn is_open(&self) -> bool {
        self.alive.get()
    }

    fn close(&self) {
        if self.alive.get() {
            self.window.close();
        }
    }
}
