//! Launcher panel: search entry and a short result list near the top of
//! the screen.

use super::layer::{every_frame, layer_window, on_key_pressed, PanelHandle};
use crate::config::LauncherConfig;
use crate::query::{is_special_id, SPECIAL_PREFIX};
use crate::render::scroll_target;
use crate::services::launcher::{LauncherEvent, LauncherService};
use crate::traits::{AppRegistry, CommandRunner};
use gtk4::prelude::*;
use gtk4::{gdk, gio, glib};
use gtk4_layer_shell::Edge;
use log::debug;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc;
use std::time::Instant;

const FALLBACK_ICON: &str = "application-x-executable";

/// Row height for a given icon size.
fn row_height(icon_size: i32) -> i32 {
    (icon_size + 17).max(64)
}

/// Icon for special rows, by handler.
fn special_icon(id: &str) -> &'static str {
    match id.strip_prefix(SPECIAL_PREFIX) {
        Some(rest) if rest.starts_with("calc:") => "accessories-calculator",
        Some(rest) if rest.starts_with("web-search:") => "web-browser",
        _ => FALLBACK_ICON,
    }
}

struct LauncherPanel<A: AppRegistry, R: CommandRunner> {
    service: LauncherService<A, R>,
    events: mpsc::Receiver<LauncherEvent>,
    config: LauncherConfig,
    window: gtk4::Window,
    entry: gtk4::Entry,
    scroller: gtk4::ScrolledWindow,
    list: gtk4::ListBox,
    rows: Vec<gtk4::ListBoxRow>,
}

impl<A: AppRegistry + 'static, R: CommandRunner> LauncherPanel<A, R> {
    fn tick(&mut self) {
        self.service.tick(Instant::now());
        let events: Vec<LauncherEvent> = self.events.try_iter().collect();
        for event in events {
            match event {
                LauncherEvent::ItemsChanged => self.rebuild_rows(),
                LauncherEvent::SelectionChanged(_) => self.sync_selection(),
                LauncherEvent::QueryChanged(query) => debug!("launcher query {:?}", query),
                LauncherEvent::CloseRequested => {
                    self.window.close();
                    return;
                }
            }
        }
    }

    fn rebuild_rows(&mut self) {
        for row in self.rows.drain(..) {
            self.list.remove(&row);
        }

        let icon_size = self.config.icon_size;
        for (id, title) in self.service.items() {
            let line = gtk4::Box::new(gtk4::Orientation::Horizontal, 12);

            let icon = if is_special_id(id) {
                gtk4::Image::from_icon_name(special_icon(id))
            } else {
                self.service
                    .icon_for(id)
                    .and_then(|s| gio::Icon::for_string(s).ok())
                    .map(|icon| gtk4::Image::from_gicon(&icon))
                    .unwrap_or_else(|| gtk4::Image::from_icon_name(FALLBACK_ICON))
            };
            icon.set_pixel_size(icon_size);
            line.append(&icon);

            let label = gtk4::Label::new(Some(title.as_str()));
            label.set_xalign(0.0);
            label.set_hexpand(true);
            label.set_ellipsize(gtk4::pango::EllipsizeMode::End);
            line.append(&label);

            let row = gtk4::ListBoxRow::new();
            row.add_css_class("launcher-row");
            row.set_child(Some(&line));
            row.set_size_request(-1, row_height(icon_size));
            row.set_focusable(false);
            if let Some(details) = self.service.app_details(id) {
                if !details.description.is_empty() {
                    row.set_tooltip_text(Some(details.description.as_str()));
                }
            }
            self.list.append(&row);
            self.rows.push(row);
        }

        let visible = self.rows.len().min(self.config.max_visible_rows.max(1)) as i32;
        let height = visible * row_height(icon_size);
        self.scroller.set_min_content_height(height);
        self.scroller.set_max_content_height(height);
        self.scroller.set_visible(!self.rows.is_empty());
        self.sync_selection();
    }

    fn sync_selection(&self) {
        let row = self.service.selected().and_then(|i| self.rows.get(i));
        self.list.select_row(row);
        if let Some(row) = row {
            self.scroll_to(row);
        }
    }

    fn scroll_to(&self, row: &gtk4::ListBoxRow) {
        #[allow(deprecated)]
        let alloc = row.allocation();
        if alloc.height() <= 0 {
            return;
        }
        let adj = self.scroller.vadjustment();
        if let Some(value) = scroll_target(
            alloc.y() as f64,
            alloc.height() as f64,
            adj.value(),
            adj.page_size(),
            adj.upper(),
        ) {
            adj.set_value(value);
        }
    }
}

/// Build the launcher window.
pub fn build<A, R>(config: &LauncherConfig, registry: A, runner: R) -> PanelHandle
where
    A: AppRegistry + 'static,
    R: CommandRunner,
{
    let window = layer_window("lfn-shell-launcher", &[Edge::Top], &[(Edge::Top, config.top_margin)]);

    let container = gtk4::Box::new(gtk4::Orientation::Vertical, 8);
    container.add_css_class("launcher-panel");
    container.set_size_request(config.width, -1);
    window.set_child(Some(&container));

    let entry = gtk4::Entry::new();
    entry.set_placeholder_text(Some("Search applications, =calc, ?web"));
    container.append(&entry);

    let list = gtk4::ListBox::new();
    list.set_selection_mode(gtk4::SelectionMode::Single);
    list.set_activate_on_single_click(true);

    let scroller = gtk4::ScrolledWindow::new();
    scroller.set_policy(gtk4::PolicyType::Never, gtk4::PolicyType::Automatic);
    scroller.set_child(Some(&list));
    scroller.set_visible(false);
    container.append(&scroller);

    let (tx, events) = mpsc::channel();
    let mut service = LauncherService::new(registry, runner, config);
    service.set_observer(tx);

    let panel = Rc::new(RefCell::new(LauncherPanel {
        service,
        events,
        config: config.clone(),
        window: window.clone(),
        entry: entry.clone(),
        scroller,
        list: list.clone(),
        rows: Vec::new(),
    }));

    {
        let panel = Rc::downgrade(&panel);
        entry.connect_changed(move |entry| {
            let Some(panel) = panel.upgrade() else { return };
            if let Ok(mut p) = panel.try_borrow_mut() {
                p.service.update_query_input(&entry.text(), Instant::now());
            };
        });
    }

    {
        let panel = Rc::downgrade(&panel);
        list.connect_row_activated(move |_, row| {
            let Some(panel) = panel.upgrade() else { return };
            if let Ok(mut p) = panel.try_borrow_mut() {
                let Ok(index) = usize::try_from(row.index()) else { return };
                p.service.set_selected(Some(index));
                p.service.launch_selected();
            };
        });
    }

    {
        let panel = Rc::downgrade(&panel);
        on_key_pressed(&window, move |key| {
            let Some(panel) = panel.upgrade() else {
                return glib::Propagation::Proceed;
            };
            let Ok(mut p) = panel.try_borrow_mut() else {
                return glib::Propagation::Proceed;
            };
            match key {
                gdk::Key::Down => p.service.move_selection(1),
                gdk::Key::Up => p.service.move_selection(-1),
                gdk::Key::Return | gdk::Key::KP_Enter => {
                    // Apply typed text right away so Return never acts on a stale list.
                    let text = p.entry.text();
                    p.service.cancel_pending_query();
                    p.service.set_query(&text);
                    p.service.launch_selected();
                }
                gdk::Key::Escape => {
                    p.service.cancel_pending_query();
                    p.service.request_close();
                }
                _ => return glib::Propagation::Proceed,
            }
            glib::Propagation::Stop
        });
    }

    let handle = PanelHandle::new(window, Some(entry.upcast()));

    every_frame(handle.alive(), move || {
        if let Ok(mut p) = panel.try_borrow_mut() {
            p.tick();
        }
    });

    handle
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_at_least_64px() {
        assert_eq!(row_height(32), 64);
        assert_eq!(row_height(64), 81);
    }

    #[test]
    fn special_rows_get_handler_icons() {
        assert_eq!(special_icon("__special__:calc:12"), "accessories-calculator");
        assert_eq!(special_icon("__special__:web-search:hint"), "web-browser");
        assert_eq!(special_icon("firefox"), FALLBACK_ICON);
    }
}
