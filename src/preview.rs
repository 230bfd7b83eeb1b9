//! Classification and sizing of clipboard previews.

/// Longest card text before it is cut with an ellipsis.
pub const CARD_TEXT_LIMIT: usize = 600;

/// Whether a clipboard history preview stands for image data.
///
/// The history tool lists binary entries as
/// `[[ binary data 34 KiB png 640x480 ]]`; other producers leave data
/// URIs, raw magic bytes or `<img>` tags behind.
pub fn is_image_data(content: &str) -> bool {
    let text = content.trim();
    if text.is_empty() {
        return false;
    }
    let low = text.to_lowercase();
    if matches!(low.as_str(), "[image]" | "[imagem]" | "[img]") {
        return true;
    }
    content.starts_with("data:image/")
        || content.starts_with("\u{89}PNG")
        || content.starts_with("GIF8")
        || content.starts_with("\u{ff}\u{d8}\u{ff}")
        || is_img_tag(content)
        || (low.contains("binary") && ["jpg", "jpeg", "png", "bmp", "gif"].iter().any(|ext| low.contains(ext)))
}

fn is_img_tag(content: &str) -> bool {
    let rest = content.trim_start();
    rest.len() > 4
        && rest.is_char_boundary(4)
        && rest[..4].eq_ignore_ascii_case("<img")
        && rest[4..].starts_with(char::is_whitespace)
}

/// Trim `text` and cut it to `limit` characters, ending in `...` when cut.
pub fn truncate_display(text: &str, limit: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut out: String = text.chars().take(limit.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

/// Scale `(width, height)` down to fit in `(max_width, max_height)`,
/// keeping the aspect ratio.  Never scales up; each side is at least 1.
pub fn fit_within(width: i32, height: i32, max_width: i32, max_height: i32) -> (i32, i32) {
    if width <= 0 || height <= 0 {
        return (width.max(1), height.max(1));
    }
    let scale = (max_width.max(1) as f64 / width as f64)
        .min(max_height.max(1) as f64 / height as f64)
        .min(1.0);
    (
        ((width as f64 * scale) as i32).max(1),
        ((height as f64 * scale) as i32).max(1),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_image_previews() {
        assert!(is_image_data("[[ binary data 34 KiB png 640x480 ]]"));
        assert!(is_image_data("[Image]"));
        assert!(is_image_data("  [img] "));
        assert!(is_image_data("data:image/png;base64,AAAA"));
        assert!(is_image_data("  <img src=\"x.png\">"));
        assert!(is_image_data("\u{89}PNG\r\n"));
        assert!(is_image_data("GIF89a"));
    }

    #[test]
    fn plain_text_is_not_an_image() {
        assert!(!is_image_data(""));
        assert!(!is_image_data("   "));
        assert!(!is_image_data("hello world"));
        assert!(!is_image_data("binary search tree"));
        assert!(!is_image_data("<imgur link>"));
        assert!(!is_image_data("a png file"));
    }

    #[test]
    fn truncation() {
        assert_eq!(truncate_display("  short  ", 600), "short");
        let long = "é".repeat(700);
        let cut = truncate_display(&long, 600);
        assert_eq!(cut.chars().count(), 600);
        assert!(cut.ends_with("..."));
        assert_eq!(truncate_display(&"a".repeat(600), 600).len(), 600);
    }

    #[test]
    fn fitting_keeps_aspect_and_never_upscales() {
        assert_eq!(fit_within(1000, 500, 250, 200), (250, 125));
        assert_eq!(fit_within(100, 50, 304, 149), (100, 50));
        assert_eq!(fit_within(4096, 1, 128, 128), (128, 1));
        assert_eq!(fit_within(0, 10, 100, 100), (1, 10));
    }
}
