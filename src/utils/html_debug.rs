// src/utils/html_debug.rs
use std::fs::File;
use std::io::Write;
use std::path::Path;

use regex::Regex;

use crate::utils::error::AppError;

/// Heading candidates the segmenter and note scan look for. Group 1 is the
/// highlighted span; the leading `>` anchors it to the start of an element.
pub const DEFAULT_DEBUG_PATTERNS: [(&str, &str); 3] = [
    (r"(?i)>\s*(Item(?:\s|&nbsp;|&#160;)+\d+[A-Z]?)", "item"),
    (r"(?i)>\s*(Note(?:\s|&nbsp;|&#160;)+\d+)", "note"),
    (r"(?i)(<table\b)", "table"),
];

/// Wraps `html` in a page with the given byte ranges highlighted.
/// Ranges overlapping an earlier one are skipped.
pub fn render_debug_html(html: &str, highlights: &[(usize, usize, &str)]) -> String {
    let mut debug_html = String::from("<!DOCTYPE html>\n<html>\n<head>\n<style>\n");

    // CSS for highlight colors
    debug_html.push_str(".highlight-item { background-color: #90EE90; }\n");
    debug_html.push_str(".highlight-note { background-color: #ADD8E6; }\n");
    debug_html.push_str(".highlight-table { background-color: #FFA500; }\n");
    debug_html.push_str(".highlight-custom { background-color: #FFC0CB; }\n");
    debug_html.push_str("</style>\n</head>\n<body>\n");

    let mut sorted_highlights = highlights.to_vec();
    sorted_highlights.sort_by_key(|h| (h.0, h.1));

    let mut last_pos = 0;
    for (start, end, highlight_type) in sorted_highlights {
        if start < last_pos || end > html.len() || start >= end {
            continue;
        }
        debug_html.push_str(&html[last_pos..start]);

        let css_class = match highlight_type {
            "item" => "highlight-item",
            "note" => "highlight-note",
            "table" => "highlight-table",
            _ => "highlight-custom",
        };

        debug_html.push_str(&format!(
            "<span class=\"{}\" title=\"Position: {}-{}, Type: {}\">",
            css_class, start, end, highlight_type
        ));
        debug_html.push_str(&html[start..end]);
        debug_html.push_str("</span>");

        last_pos = end;
    }
    debug_html.push_str(&html[last_pos..]);

    debug_html.push_str("\n</body>\n</html>");
    debug_html
}

/// Saves a HTML document to a file with debug highlights.
pub fn save_debug_html(html: &str, path: &Path, highlights: &[(usize, usize, &str)]) -> Result<(), AppError> {
    let mut file = File::create(path)?;
    file.write_all(render_debug_html(html, highlights).as_bytes())?;

    tracing::info!("Saved debug HTML to {}", path.display());
    Ok(())
}

/// Highlights every match of each pattern (capture group 1 when present,
/// otherwise the whole match) and saves the result.
pub fn create_debug_html(html: &str, path: &Path, patterns: &[(&str, &str)]) -> Result<(), AppError> {
    let mut highlights = Vec::new();

    for (pattern, highlight_type) in patterns {
        let re = Regex::new(pattern).map_err(|e| {
            AppError::Processing(format!("Invalid regex pattern '{}': {}", pattern, e))
        })?;

        for caps in re.captures_iter(html) {
            if let Some(m) = caps.get(1).or_else(|| caps.get(0)) {
                highlights.push((m.start(), m.end(), *highlight_type));
            }
        }
    }

    tracing::debug!("{} debug highlights for {}", highlights.len(), path.display());
    save_debug_html(html, path, &highlights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_render_wraps_ranges() {
        let out = render_debug_html("<p>Item 7</p>", &[(3, 9, "item")]);
        assert!(out.contains(
            "<p><span class=\"highlight-item\" title=\"Position: 3-9, Type: item\">Item 7</span></p>"
        ));
        assert!(out.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn test_render_skips_overlaps() {
        let out = render_debug_html("abcdef", &[(0, 4, "x"), (2, 5, "note")]);
        assert_eq!(out.matches("<span").count(), 1);
        assert!(out.contains("abcd</span>ef"));
    }

    #[test]
    fn test_create_debug_html_highlights_headings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("annotated.html");
        let html = "<p>Item&nbsp;8. Financial</p><p><b>Note 3</b></p><table></table>";

        create_debug_html(html, &path, &DEFAULT_DEBUG_PATTERNS).unwrap();
        let out = std::fs::read_to_string(&path).unwrap();
        assert!(out.contains("class=\"highlight-item\" title=\"Position: 3-14, Type: item\">Item&nbsp;8</span>"));
        assert!(out.contains(">Note 3</span>"));
        assert!(out.contains("class=\"highlight-table\""));
    }

    #[test]
    fn test_invalid_pattern_is_processing_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("never_written.html");
        let err = create_debug_html("<p></p>", &path, &[("(unclosed", "item")]).unwrap_err();
        assert!(matches!(err, AppError::Processing(_)));
    }
}
