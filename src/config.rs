//! Application configuration.
//!
//! The configuration is loaded from `$XDG_CONFIG_HOME/lfn-shell/config.json`.
//! Every section and every field is optional; anything missing falls back
//! to the compiled-in defaults and unknown keys are ignored.
//!
//! # Example
//!
//! ```json
//! {
//!   "clipboard": { "poll_interval_ms": 1000, "max_items": 80 },
//!   "launcher": { "web_search_url": "https://duckduckgo.com/?q={query}" },
//!   "power": { "lock": "swaylock -f" },
//!   "notifications": { "startup": false }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub clipboard: ClipboardConfig,

    #[serde(default)]
    pub launcher: LauncherConfig,

    #[serde(default)]
    pub power: PowerConfig,

    #[serde(default)]
    pub notifications: NotificationConfig,
}

/// Clipboard history panel.  Sizes are in pixels, durations in
/// milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipboardConfig {
    /// How often the history tool is polled.
    pub poll_interval_ms: u64,
    /// Quiet period after the last keystroke before the filter applies.
    pub search_debounce_ms: u64,
    /// Cap on rendered cards after filtering.
    pub max_items: usize,
    /// Minimum height of the card strip.
    pub bar_height: i32,
    pub item_width: i32,
    /// Card height; derived from `bar_height` when unset.
    pub item_height: Option<i32>,
    /// Cards built synchronously when the list is (re)rendered.
    pub initial_chunk: usize,
    /// Cards built per idle callback afterwards.
    pub chunk_size: usize,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1500,
            search_debounce_ms: 200,
            max_items: 50,
            bar_height: 197,
            item_width: 320,
            item_height: None,
            initial_chunk: 48,
            chunk_size: 96,
        }
    }
}

impl ClipboardConfig {
    /// Card height actually used by the panel.
    pub fn effective_item_height(&self) -> i32 {
        self.item_height.unwrap_or_else(|| (self.bar_height - 4).max(56))
    }
}

/// Application launcher panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    /// Also list applications marked `NoDisplay`.
    pub include_hidden: bool,
    pub search_debounce_ms: u64,
    pub icon_size: i32,
    /// Rows shown before the list starts scrolling.
    pub max_visible_rows: usize,
    pub width: i32,
    /// Distance from the top screen edge.
    pub top_margin: i32,
    /// Web search target; `{query}` is replaced by the encoded term.
    pub web_search_url: String,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            include_hidden: false,
            search_debounce_ms: 200,
            icon_size: 32,
            max_visible_rows: 4,
            width: 420,
            top_margin: 300,
            web_search_url: "https://www.google.com/search?q={query}".into(),
        }
    }
}

/// Shell commands run by the power menu.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerConfig {
    pub lock: String,
    pub logout: String,
    pub reboot: String,
    pub shutdown: String,
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            lock: "hyprlock".into(),
            logout: "hyprctl dispatch exit".into(),
            reboot: "systemctl reboot".into(),
            shutdown: "systemctl poweroff".into(),
        }
    }
}

/// Desktop notifications sent by the daemon itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Announce daemon startup.
    pub startup: bool,
    pub timeout_ms: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            startup: true,
            timeout_ms: 7000,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_full_config() {
        let json = r#"{
            "clipboard": {
                "poll_interval_ms": 1000,
                "search_debounce_ms": 100,
                "max_items": 80,
                "bar_height": 150,
                "item_width": 280,
                "item_height": 120,
                "initial_chunk": 10,
                "chunk_size": 20
            },
            "launcher": {
                "include_hidden": true,
                "icon_size": 48,
                "max_visible_rows": 6,
                "web_search_url": "https://duckduckgo.com/?q={query}"
            },
            "power": { "lock": "swaylock -f" },
            "notifications": { "startup": false, "timeout_ms": 3000 }
        }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.clipboard.poll_interval_ms, 1000);
        assert_eq!(cfg.clipboard.max_items, 80);
        assert_eq!(cfg.clipboard.effective_item_height(), 120);
        assert_eq!(cfg.clipboard.chunk_size, 20);
        assert!(cfg.launcher.include_hidden);
        assert_eq!(cfg.launcher.icon_size, 48);
        assert_eq!(cfg.launcher.web_search_url, "https://duckduckgo.com/?q={query}");
        assert_eq!(cfg.power.lock, "swaylock -f");
        assert_eq!(cfg.power.reboot, PowerConfig::default().reboot);
        assert!(!cfg.notifications.startup);
        assert_eq!(cfg.notifications.timeout_ms, 3000);
    }

    #[test]
    fn deserialize_empty_uses_defaults() {
        let cfg: Config = serde_json::from_str("{}").unwrap();
        let cd = ClipboardConfig::default();
        assert_eq!(cfg.clipboard.poll_interval_ms, cd.poll_interval_ms);
        assert_eq!(cfg.clipboard.max_items, cd.max_items);
        assert_eq!(cfg.clipboard.initial_chunk, cd.initial_chunk);
        let ld = LauncherConfig::default();
        assert_eq!(cfg.launcher.search_debounce_ms, ld.search_debounce_ms);
        assert_eq!(cfg.launcher.top_margin, ld.top_margin);
        assert_eq!(cfg.power.shutdown, "systemctl poweroff");
        assert!(cfg.notifications.startup);
    }

    #[test]
    fn item_height_derives_from_bar_height() {
        let mut cd = ClipboardConfig::default();
        assert_eq!(cd.effective_item_height(), 193);
        cd.bar_height = 40;
        assert_eq!(cd.effective_item_height(), 56);
    }

    #[test]
    fn unknown_top_level_keys_ignored() {
        let json = r#"{ "launcher": {}, "future_section": { "key": 42 } }"#;
        let _cfg: Config = serde_json::from_str(json).unwrap();
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Config::load(Path::new("/nonexistent/lfn-shell/config.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
