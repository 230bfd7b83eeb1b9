//! Power menu: four round buttons on the left screen edge.

use super::layer::{every_frame, layer_window, on_key_pressed, PanelHandle};
use crate::config::PowerConfig;
use crate::services::power::{PowerAction, PowerEvent, PowerService};
use crate::traits::CommandRunner;
use gtk4::prelude::*;
use gtk4::{gdk, glib};
use gtk4_layer_shell::Edge;
use log::{debug, warn};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc;

const LEFT_MARGIN: i32 = 5;
const SPACING: i32 = 17;

fn icon_name(action: PowerAction) -> &'static str {
    match action {
        PowerAction::Lock => "system-lock-screen-symbolic",
        PowerAction::Logout => "system-log-out-symbolic",
        PowerAction::Reboot => "system-reboot-symbolic",
        PowerAction::Shutdown => "system-shutdown-symbolic",
    }
}

/// Build the power menu window.
pub fn build<R: CommandRunner>(config: &PowerConfig, runner: R) -> PanelHandle {
    let window = layer_window("lfn-shell-power", &[Edge::Left], &[(Edge::Left, LEFT_MARGIN)]);

    let column = gtk4::Box::new(gtk4::Orientation::Vertical, SPACING);
    column.add_css_class("power-menu");
    column.set_halign(gtk4::Align::Center);
    column.set_valign(gtk4::Align::Center);
    window.set_child(Some(&column));

    let (tx, events) = mpsc::channel();
    let mut service = PowerService::new(runner, config.clone());
    service.set_observer(tx);
    let service = Rc::new(RefCell::new(service));

    for action in PowerAction::ALL {
        let button = gtk4::Button::from_icon_name(icon_name(action));
        button.add_css_class("power-button");
        button.set_tooltip_text(Some(action.label()));
        button.set_halign(gtk4::Align::Center);
        button.set_valign(gtk4::Align::Center);
        let service = service.clone();
        button.connect_clicked(move |_| {
            if let Ok(mut svc) = service.try_borrow_mut() {
                svc.execute(action);
            }
        });
        column.append(&button);
    }

    {
        let service = service.clone();
        on_key_pressed(&window, move |key| {
            if key != gdk::Key::Escape {
                return glib::Propagation::Proceed;
            }
            if let Ok(mut svc) = service.try_borrow_mut() {
                svc.request_close();
            }
            glib::Propagation::Stop
        });
    }

    let focus = column.first_child();
    let handle = PanelHandle::new(window.clone(), focus);

    every_frame(handle.alive(), move || {
        for event in events.try_iter() {
            match event {
                PowerEvent::ActionExecuted(action) => debug!("power action {} started", action),
                PowerEvent::ActionFailed(action, message) => {
                    warn!("power action {} failed: {}", action, message)
                }
                PowerEvent::CloseRequested => {
                    window.close();
                    return;
                }
            }
        }
    });

    handle
}
