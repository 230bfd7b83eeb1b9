//! Entry point for **lfn-shell**.
//!
//! Without arguments the binary runs the daemon: the command listener on a
//! background thread and the GTK main loop on the main thread.  With
//! `widget <name>`, `close <name>` or `ping` it acts as a client, sends one
//! command to the running daemon and prints the reply.
//!
//! When the `gui-gtk` feature is disabled the daemon still accepts
//! commands but only logs them.

use lfn_shell::command::{Command, WidgetKind};
use lfn_shell::config::Config;
use lfn_shell::ipc::client;
use lfn_shell::ipc::listener::{default_socket_path, UnixSocketListener};
use lfn_shell::system::notify::send_start_notification;
use lfn_shell::system::process::SystemRunner;
use lfn_shell::traits::CommandSource;
use log::{error, info};
use std::path::PathBuf;
use std::sync::mpsc;

const USAGE: &str = "\
usage: lfn-shell                  run the daemon
       lfn-shell widget <name>    open a panel (clipboard, launcher, power_menu)
       lfn-shell close <name>     close a panel
       lfn-shell ping             check that the daemon is running";

/// Resolve the config directory (`$XDG_CONFIG_HOME/lfn-shell`).
fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base).join("lfn-shell")
}

/// Try to load the config from `$XDG_CONFIG_HOME/lfn-shell/config.json`,
/// falling back to compiled-in defaults.
fn load_config() -> Config {
    let path = config_dir().join("config.json");
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            info!("no config file ({}), using defaults", e);
            Config::default()
        }
    }
}

//  Main

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None => run_daemon(),
        Some("-h" | "--help" | "help") => println!("{}", USAGE),
        Some("ping") => run_client(Command::Ping),
        Some(verb @ ("widget" | "close")) => {
            let Some(name) = args.get(1) else {
                eprintln!("{} needs a widget name\n{}", verb, USAGE);
                std::process::exit(2);
            };
            let kind: WidgetKind = match name.parse() {
                Ok(kind) => kind,
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(1);
                }
            };
            let cmd = if verb == "widget" {
                Command::Widget(kind)
            } else {
                Command::Close(kind)
            };
            run_client(cmd);
        }
        Some(other) => {
            eprintln!("unknown command: {}\n{}", other, USAGE);
            std::process::exit(2);
        }
    }
}

/// Send `cmd` to the daemon and print its reply.
fn run_client(cmd: Command) {
    match client::send(&default_socket_path(), &cmd) {
        Ok(reply) => println!("{}", reply),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

/// Daemon mode.
fn run_daemon() {
    let config = load_config();

    let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
    spawn_command_sources(cmd_tx);

    if config.notifications.startup {
        send_start_notification(SystemRunner::new(), config.notifications.timeout_ms);
    }

    start_event_loop(config, cmd_rx);
}

//  Event loops

#[cfg(feature = "gui-gtk")]
fn start_event_loop(config: Config, cmd_rx: mpsc::Receiver<Command>) {
    lfn_shell::ui::app::run_main_loop(config, cmd_rx, Some(config_dir().join("style.css")));
}

#[cfg(not(feature = "gui-gtk"))]
fn start_event_loop(_config: Config, cmd_rx: mpsc::Receiver<Command>) {
    log::warn!("built without `gui-gtk`, commands are only logged");
    for cmd in cmd_rx {
        info!("command: {:?}", cmd);
    }
    info!("all command sources closed, exiting");
}

//  Helpers

fn spawn_command_sources(tx: mpsc::Sender<Command>) {
    let path = default_socket_path();
    std::thread::spawn(move || {
        let mut source = UnixSocketListener::new(&path);
        if let Err(e) = source.run(tx) {
            error!("socket listener error: {}", e);
        }
    });
}
