// src/utils/html_debug.rs
use std::fs::File;
use std::io::Write;
use std::path::Path;

use regex::Regex;

use crate::utils::error::AppError;

/// Saves a copy of a page with the given byte ranges wrapped in highlight spans.
/// Overlapping ranges are skipped after the first one that covers a position.
pub fn save_debug_html(html: &str, path: &Path, highlights: &[(usize, usize, &str)]) -> Result<(), AppError> {
    let mut file = File::create(path)?;

    let mut debug_html = String::from("<!DOCTYPE html>\n<html>\n<head>\n<style>\n");
    debug_html.push_str(".highlight-block { background-color: #FFFF00; }\n");
    debug_html.push_str(".highlight-date { background-color: #90EE90; }\n");
    debug_html.push_str(".highlight-time { background-color: #ADD8E6; }\n");
    debug_html.push_str(".highlight-category { background-color: #FFA500; }\n");
    debug_html.push_str(".highlight-custom { background-color: #FFC0CB; }\n");
    debug_html.push_str("</style>\n</head>\n<body>\n");

    let mut last_pos = 0;
    let mut sorted_highlights = highlights.to_vec();
    sorted_highlights.sort_by_key(|h| h.0);

    for (start, end, highlight_type) in sorted_highlights {
        if start < last_pos {
            continue;
        }
        debug_html.push_str(&html[last_pos..start]);

        let css_class = match highlight_type {
            "block" => "highlight-block",
            "date" => "highlight-date",
            "time" => "highlight-time",
            "category" => "highlight-category",
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

    if last_pos < html.len() {
        debug_html.push_str(&html[last_pos..]);
    }
    debug_html.push_str("\n</body>\n</html>");

    file.write_all(debug_html.as_bytes())?;

    tracing::debug!("Saved debug HTML to {}", path.display());
    Ok(())
}

/// Highlights every match of each `(pattern, label)` pair and saves the result.
pub fn create_debug_html<S: AsRef<str>>(html: &str, path: &Path, patterns: &[(S, &str)]) -> Result<(), AppError> {
    let mut highlights = Vec::new();

    for (pattern, highlight_type) in patterns {
        let pattern = pattern.as_ref();
        let re = Regex::new(pattern).map_err(|e| {
            AppError::Processing(format!("Invalid debug pattern '{}': {}", pattern, e))
        })?;

        for mat in re.find_iter(html) {
            highlights.push((mat.start(), mat.end(), *highlight_type));
        }
    }

    save_debug_html(html, path, &highlights)
}
