//! Stylesheet loading.
//!
//! # CSS selectors
//!
//! | Selector                 | Targets                                    |
//! |--------------------------|--------------------------------------------|
//! | `window`                 | Panel windows (keep transparent)           |
//! | `.clipboard-panel`       | Container of the clipboard bar             |
//! | `.clip-card`             | One history entry                          |
//! | `.clip-card.selected`    | Entry under the keyboard cursor            |
//! | `.clip-card.image`       | Entry showing an image preview             |
//! | `.empty-state`           | `(Clipboard empty)` / `(no results)`       |
//! | `.launcher-panel`        | Container of the launcher                  |
//! | `.launcher-row`          | One search result                          |
//! | `.power-menu`            | Column of power buttons                    |
//! | `.power-button`          | One power button                           |

use gtk4::gdk;
use log::{info, warn};
use std::path::Path;

pub const DEFAULT_CSS: &str = r#"
window,
window.background {
    background-color: transparent;
    background: none;
}

.clipboard-panel,
.launcher-panel,
.power-menu {
    background-color: rgba(20, 20, 24, 0.92);
    border-radius: 14px;
    padding: 10px;
    color: #e6e6e6;
}

.clipboard-panel {
    margin: 6px;
}

.clip-card {
    background-color: rgba(255, 255, 255, 0.06);
    border-radius: 10px;
    padding: 8px;
}

.clip-card.selected {
    background-color: rgba(120, 160, 255, 0.35);
}

.clip-card label {
    font-size: 11px;
}

.empty-state {
    opacity: 0.6;
    padding: 24px;
}

.launcher-row {
    padding: 6px 10px;
    border-radius: 8px;
}

.launcher-row:selected {
    background-color: rgba(120, 160, 255, 0.35);
}

.power-button {
    min-width: 48px;
    min-height: 48px;
    border-radius: 24px;
}

.power-button:hover {
    background-color: rgba(255, 255, 255, 0.12);
}
"#;

/// Register the user stylesheet at `css_path`, or the built-in one when
/// it is missing or unreadable.
pub fn load_css(css_path: Option<&Path>) {
    let provider = gtk4::CssProvider::new();

    let css_content = match css_path.filter(|p| p.exists()) {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(content) => {
                info!("user CSS: {} ({} bytes)", p.display(), content.len());
                content
            }
            Err(e) => {
                warn!("CSS read failed ({}): {}, using built-in", p.display(), e);
                DEFAULT_CSS.to_string()
            }
        },
        None => {
            info!("no user CSS, using built-in default");
            DEFAULT_CSS.to_string()
        }
    };

    #[allow(deprecated)]
    provider.load_from_data(&css_content);

    if let Some(display) = gdk::Display::default() {
        gtk4::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
        info!("CSS registered on display");
    } else {
        warn!("no GDK display, CSS will not be applied");
    }
}
