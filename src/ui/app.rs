//! GTK main loop: drains the command channel and opens or closes panels.

use super::layer::{PanelHandle, TICK};
use super::style::load_css;
use crate::command::{Command, WidgetKind};
use crate::config::Config;
use crate::registry::{Launch, PanelRegistry};
use crate::system::apps::GioAppRegistry;
use crate::system::process::SystemRunner;
use gtk4::glib;
use log::{debug, info};
use std::path::PathBuf;
use std::sync::mpsc;

fn build_panel(kind: WidgetKind, config: &Config) -> PanelHandle {
    match kind {
        WidgetKind::Clipboard => super::clipboard::build(&config.clipboard, SystemRunner::new()),
        WidgetKind::Launcher => {
            super::launcher::build(&config.launcher, GioAppRegistry::new(), SystemRunner::new())
        }
        WidgetKind::PowerMenu => super::power::build(&config.power, SystemRunner::new()),
    }
}

/// Run the GLib main loop on the calling thread until every command
/// source has hung up.
pub fn run_main_loop(config: Config, cmd_rx: mpsc::Receiver<Command>, css_path: Option<PathBuf>) {
    gtk4::init().expect("failed to initialise GTK4");
    info!("GTK4 initialised on main thread");

    load_css(css_path.as_deref());

    let main_loop = glib::MainLoop::new(None, false);
    let mut panels: PanelRegistry<PanelHandle> = PanelRegistry::new();

    let quit = main_loop.clone();
    glib::timeout_add_local(TICK, move || {
        loop {
            match cmd_rx.try_recv() {
                Ok(cmd) => {
                    debug!("command: {:?}", cmd);
                    match cmd {
                        Command::Widget(kind) => match panels.launch(kind, || build_panel(kind, &config)) {
                            Launch::Created => debug!("{} built", kind),
                            Launch::Presented => debug!("{} already open, presented", kind),
                        },
                        Command::Close(kind) => {
                            if !panels.close(kind) {
                                debug!("{} was not open", kind);
                            }
                        }
                        Command::Ping => debug!("ping"),
                    }
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    info!("all sources closed, exiting");
                    panels.close_all();
                    quit.quit();
                    return glib::ControlFlow::Break;
                }
            }
        }
        panels.prune();
        glib::ControlFlow::Continue
    });

    info!("entering GLib main loop");
    main_loop.run();
    info!("GLib main loop exited");
}
