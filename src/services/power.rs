//! Session actions for the power menu.

use super::Observer;
use crate::config::PowerConfig;
use crate::traits::CommandRunner;
use log::{error, info};
use std::fmt;
use std::sync::mpsc;

/// One of the four power-menu buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerAction {
    Lock,
    Logout,
    Reboot,
    Shutdown,
}

impl PowerAction {
    /// Buttons in display order.
    pub const ALL: [PowerAction; 4] = [Self::Lock, Self::Logout, Self::Reboot, Self::Shutdown];

    pub fn name(self) -> &'static str {
        match self {
            Self::Lock => "lock",
            Self::Logout => "logout",
            Self::Reboot => "reboot",
            Self::Shutdown => "shutdown",
        }
    }

    /// Tooltip text for the button.
    pub fn label(self) -> &'static str {
        match self {
            Self::Lock => "Lock",
            Self::Logout => "Logout",
            Self::Reboot => "Reboot",
            Self::Shutdown => "Shutdown",
        }
    }
}

impl fmt::Display for PowerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PowerEvent {
    ActionExecuted(PowerAction),
    ActionFailed(PowerAction, String),
    CloseRequested,
}

/// Runs the configured command for each power action.
pub struct PowerService<R: CommandRunner> {
    runner: R,
    config: PowerConfig,
    observer: Observer<PowerEvent>,
}

impl<R: CommandRunner> PowerService<R> {
    pub fn new(runner: R, config: PowerConfig) -> Self {
        Self {
            runner,
            config,
            observer: Observer::default(),
        }
    }

    pub fn set_observer(&mut self, tx: mpsc::Sender<PowerEvent>) {
        self.observer.set(tx);
    }

    pub fn lock_session(&mut self) {
        self.execute(PowerAction::Lock);
    }

    pub fn logout_session(&mut self) {
        self.execute(PowerAction::Logout);
    }

    pub fn reboot_system(&mut self) {
        self.execute(PowerAction::Reboot);
    }

    pub fn shutdown_system(&mut self) {
        self.execute(PowerAction::Shutdown);
    }

    /// Shell command bound to `action`.
    pub fn command_for(&self, action: PowerAction) -> &str {
        match action {
            PowerAction::Lock => &self.config.lock,
            PowerAction::Logout => &self.config.logout,
            PowerAction::Reboot => &self.config.reboot,
            PowerAction::Shutdown => &self.config.shutdown,
        }
    }

    /// Start the command for `action` without waiting for it.  The menu
    /// is asked to close whether or not the command could be started.
    pub fn execute(&mut self, action: PowerAction) {
        let command = self.command_for(action).to_string();
        match self.runner.spawn_shell(&command) {
            Ok(()) => {
                info!("power action {}: {}", action, command);
                self.observer.emit(PowerEvent::ActionExecuted(action));
            }
            Err(e) => {
                error!("power action {} failed: {}", action, e);
                self.observer.emit(PowerEvent::ActionFailed(action, e.to_string()));
            }
        }
        self.request_close();
    }

    pub fn request_close(&mut self) {
        self.observer.emit(PowerEvent::CloseRequested);
    }
}
