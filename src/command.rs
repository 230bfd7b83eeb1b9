//! Commands understood by the lfn-shell daemon.
//!
//! [`Command`] is the whole vocabulary of the command surface and
//! [`WidgetKind`] names the overlay panels it can address.  Widget names
//! are parsed leniently ("Clipboard", " launcher ", "power-menu") so
//! key-bind helpers don't have to care about the exact spelling.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// One of the overlay panels the daemon can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    Clipboard,
    Launcher,
    PowerMenu,
}

impl WidgetKind {
    /// Every panel, in a stable order.
    pub const ALL: [WidgetKind; 3] = [WidgetKind::Clipboard, WidgetKind::Launcher, WidgetKind::PowerMenu];

    /// Canonical name used on the command line and in replies.
    pub fn name(self) -> &'static str {
        match self {
            WidgetKind::Clipboard => "clipboard",
            WidgetKind::Launcher => "launcher",
            WidgetKind::PowerMenu => "power_menu",
        }
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A widget name that does not match any panel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown widget: {0}")]
pub struct UnknownWidget(pub String);

impl FromStr for WidgetKind {
    type Err = UnknownWidget;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "clipboard" => Ok(WidgetKind::Clipboard),
            "launcher" => Ok(WidgetKind::Launcher),
            "power_menu" | "power-menu" | "powermenu" => Ok(WidgetKind::PowerMenu),
            _ => Err(UnknownWidget(s.to_string())),
        }
    }
}

impl Serialize for WidgetKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for WidgetKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|e: UnknownWidget| DeError::custom(e))
    }
}

/// Every action the daemon can perform.
///
/// Commands are produced by [`CommandSource`](crate::traits::CommandSource)
/// implementations and consumed on the GTK main thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Show the panel, or re-present and focus it if it is already open.
    Widget(WidgetKind),

    /// Close the panel if it is open.  No-op otherwise.
    Close(WidgetKind),

    /// Liveness probe.  On the wire this is the JSON string `"Ping"`.
    Ping,
}

impl Command {
    /// Text written back to the client once the command was accepted.
    pub fn reply(&self) -> String {
        match self {
            Command::Widget(kind) => format!("launched {}", kind),
            Command::Close(kind) => format!("closed {}", kind),
            Command::Ping => "pong".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widget_names_parse_leniently() {
        assert_eq!("clipboard".parse(), Ok(WidgetKind::Clipboard));
        assert_eq!("  Launcher ".parse(), Ok(WidgetKind::Launcher));
        assert_eq!("power_menu".parse(), Ok(WidgetKind::PowerMenu));
        assert_eq!("power-menu".parse(), Ok(WidgetKind::PowerMenu));
        assert_eq!("PowerMenu".parse(), Ok(WidgetKind::PowerMenu));
    }

    #[test]
    fn only_listed_aliases_parse() {
        for name in ["clip_board", "-launcher-", "laun_cher", "power__menu", "power menu"] {
            assert_eq!(name.parse::<WidgetKind>(), Err(UnknownWidget(name.to_string())));
        }
    }

    #[test]
    fn unknown_widget_message() {
        let err = "dock".parse::<WidgetKind>().unwrap_err();
        assert_eq!(err.to_string(), "unknown widget: dock");
    }

    #[test]
    fn widget_display_is_canonical() {
        assert_eq!(WidgetKind::PowerMenu.to_string(), "power_menu");
        for kind in WidgetKind::ALL {
            assert_eq!(kind.name().parse(), Ok(kind));
        }
    }

    #[test]
    fn command_wire_format() {
        let cmd: Command = serde_json::from_str(r#"{"Widget":"clipboard"}"#).unwrap();
        assert_eq!(cmd, Command::Widget(WidgetKind::Clipboard));

        let cmd: Command = serde_json::from_str(r#"{"Close":"Power_Menu"}"#).unwrap();
        assert_eq!(cmd, Command::Close(WidgetKind::PowerMenu));

        let cmd: Command = serde_json::from_str(r#""Ping""#).unwrap();
        assert_eq!(cmd, Command::Ping);

        let json = serde_json::to_string(&Command::Widget(WidgetKind::PowerMenu)).unwrap();
        assert_eq!(json, r#"{"Widget":"power_menu"}"#);
    }

    #[test]
    fn unknown_widget_on_the_wire_is_rejected() {
        let err = serde_json::from_str::<Command>(r#"{"Widget":"dock"}"#).unwrap_err();
        assert!(err.to_string().contains("unknown widget: dock"));
    }

    #[test]
    fn replies() {
        assert_eq!(Command::Widget(WidgetKind::Launcher).reply(), "launched launcher");
        assert_eq!(Command::Close(WidgetKind::Clipboard).reply(), "closed clipboard");
        assert_eq!(Command::Ping.reply(), "pong");
    }
}
