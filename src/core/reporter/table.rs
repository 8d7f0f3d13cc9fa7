//! Markdown table rows, shared by the HTML and PDF renderers.

/// Cells of a `| a | b |` row, trimmed. An escaped `\|` stays inside its cell.
pub(super) fn split_cells(line: &str) -> Vec<String> {
    line.trim()
        .trim_start_matches('|')
        .trim_end_matches('|')
        .replace("\\|", "\u{0}")
        .split('|')
        .map(|cell| cell.trim().replace('\u{0}', "|"))
        .collect()
}

/// `|---|:--:|` style header separator
pub(super) fn is_separator_row(line: &str) -> bool {
    split_cells(line)
        .iter()
        .all(|cell| !cell.is_empty() && cell.chars().all(|c| c == '-' || c == ':'))
}
