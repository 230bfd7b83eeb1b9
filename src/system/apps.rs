//! [`AppRegistry`] backed by GIO's desktop application database.

use crate::traits::{AppEntry, AppRegistry};
use gtk4::gio;
use gtk4::glib;
use gtk4::prelude::*;
use log::debug;

/// Enumerates and launches applications through `GAppInfo`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GioAppRegistry;

/// Errors from the GIO application registry.
#[derive(Debug, thiserror::Error)]
pub enum AppRegistryError {
    #[error("cannot build a launcher for {0}")]
    Unlaunchable(String),
    #[error("failed to launch {name}: {source}")]
    Launch {
        name: String,
        #[source]
        source: glib::Error,
    },
}

impl GioAppRegistry {
    pub fn new() -> Self {
        Self
    }
}

fn entry_from(app: &gio::AppInfo) -> AppEntry {
    let generic_name = app
        .downcast_ref::<gio::DesktopAppInfo>()
        .and_then(|d| d.generic_name())
        .map(|s| s.to_string());
    AppEntry {
        desktop_id: app.id().map(|s| s.to_string()),
        name: app.name().to_string(),
        display_name: app.display_name().to_string(),
        generic_name,
        executable: app.executable().display().to_string(),
        command_line: app.commandline().map(|p| p.display().to_string()),
        description: app.description().map(|s| s.to_string()),
        icon: app
            .icon()
            .and_then(|icon| IconExt::to_string(&icon))
            .map(|s| s.to_string()),
    }
}

impl AppRegistry for GioAppRegistry {
    type Error = AppRegistryError;

    fn applications(&self, include_hidden: bool) -> Result<Vec<AppEntry>, Self::Error> {
        let apps: Vec<AppEntry> = gio::AppInfo::all()
            .iter()
            .filter(|app| include_hidden || app.should_show())
            .map(entry_from)
            .collect();
        debug!("enumerated {} applications", apps.len());
        Ok(apps)
    }

    fn launch(&self, app: &AppEntry) -> Result<(), Self::Error> {
        let info: gio::AppInfo = match app.desktop_id.as_deref().and_then(gio::DesktopAppInfo::new) {
            Some(desktop) => desktop.upcast(),
            None => {
                let command_line = app.command_line.as_deref().unwrap_or(&app.executable);
                if command_line.is_empty() {
                    return Err(AppRegistryError::Unlaunchable(app.display_name.clone()));
                }
                gio::AppInfo::create_from_commandline(
                    command_line,
                    Some(app.name.as_str()),
                    gio::AppInfoCreateFlags::NONE,
                )
                .map_err(|source| AppRegistryError::Launch {
                    name: app.display_name.clone(),
                    source,
                })?
            }
        };
        debug!("launching {}", info.name());
        info.launch(&[], None::<&gio::AppLaunchContext>)
            .map_err(|source| AppRegistryError::Launch {
                name: app.display_name.clone(),
                source,
            })
    }
}
