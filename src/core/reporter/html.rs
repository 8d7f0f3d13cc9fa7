//! HTML rendering of the Markdown report.
//!
//! Covers exactly the Markdown the report builder emits: headings, pipe
//! tables, two-level bullet lists, inline code and bold text. Hash values
//! are set in a monospace face and allowed to break anywhere, and the page is
//! A4 landscape so the digest column fits.

use super::table::{is_separator_row, split_cells};

const STYLE: &str = r#"
        @page {
            size: A4 landscape;
            margin: 1in;
        }
        body {
            font-family: 'Segoe UI', sans-serif;
            margin: 0;
            line-height: 1.5;
            font-size: 12px;
        }
        table {
            border-collapse: collapse;
            width: 100%;
            table-layout: fixed;
            word-wrap: break-word;
            font-size: 10px;
        }
        th, td {
            border: 1px solid #ccc;
            padding: 6px;
            text-align: left;
            vertical-align: top;
            word-break: break-word;
            overflow-wrap: break-word;
        }
        code {
            background-color: #f2f2f2;
            padding: 2px 4px;
            border-radius: 4px;
            font-family: Consolas, monospace;
            font-size: 9px;
            word-break: break-all;
        }
        li.nested {
            margin-left: 1.5em;
        }
        h1, h2, h3 {
            margin-top: 1em;
            margin-bottom: 0.5em;
        }
"#;

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wrap the odd-numbered pieces of `text` split on `marker` in a tag.
/// An unmatched trailing marker is kept literally.
fn wrap_delimited(text: &str, marker: &str, tag: &str, inner: impl Fn(&str) -> String) -> String {
    let parts: Vec<&str> = text.split(marker).collect();
    let balanced = parts.len() % 2 == 1;
    let mut out = String::new();

    for (i, part) in parts.iter().enumerate() {
        let is_last = i == parts.len() - 1;
        if i % 2 == 1 && (balanced || !is_last) {
            out.push_str(&format!("<{tag}>{}</{tag}>", inner(part)));
        } else if i % 2 == 1 {
            out.push_str(&escape(marker));
            out.push_str(&inner(part));
        } else {
            out.push_str(&inner(part));
        }
    }
    out
}

fn render_inline(text: &str) -> String {
    let mut out = String::new();
    let segments: Vec<&str> = text.split('`').collect();
    let balanced = segments.len() % 2 == 1;

    for (i, segment) in segments.iter().enumerate() {
        let is_code = i % 2 == 1 && (balanced || i != segments.len() - 1);
        if is_code {
            out.push_str(&format!("<code>{}</code>", escape(segment)));
        } else {
            if i % 2 == 1 {
                out.push('`');
            }
            out.push_str(&wrap_delimited(segment, "**", "strong", escape));
        }
    }
    out
}

fn render_table(lines: &[&str], html: &mut String) {
    html.push_str("<table>\n");
    let mut in_body = false;
    for (i, line) in lines.iter().enumerate() {
        if i == 1 && is_separator_row(line) {
            continue;
        }
        let cell_tag = if i == 0 { "th" } else { "td" };
        if i == 0 {
            html.push_str("<thead>\n");
        } else if !in_body {
            html.push_str("<tbody>\n");
            in_body = true;
        }
        html.push_str("<tr>");
        for cell in split_cells(line) {
            html.push_str(&format!("<{cell_tag}>{}</{cell_tag}>", render_inline(&cell)));
        }
        html.push_str("</tr>\n");
        if i == 0 {
            html.push_str("</thead>\n");
        }
    }
    if in_body {
        html.push_str("</tbody>\n");
    }
    html.push_str("</table>\n");
}

fn render_body(markdown: &str) -> String {
    let lines: Vec<&str> = markdown.lines().collect();
    let mut html = String::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim_start();

        if trimmed.is_empty() {
            i += 1;
        } else if trimmed.starts_with('|') {
            let start = i;
            while i < lines.len() && lines[i].trim_start().starts_with('|') {
                i += 1;
            }
            render_table(&lines[start..i], &mut html);
        } else if trimmed.starts_with("- ") {
            html.push_str("<ul>\n");
            while i < lines.len() && lines[i].trim_start().starts_with("- ") {
                let item = lines[i];
                let nested = item.starts_with(' ');
                let text = item.trim_start().trim_start_matches("- ");
                if nested {
                    html.push_str(&format!("<li class=\"nested\">{}</li>\n", render_inline(text)));
                } else {
                    html.push_str(&format!("<li>{}</li>\n", render_inline(text)));
                }
                i += 1;
            }
            html.push_str("</ul>\n");
        } else if let Some(level) = heading_level(trimmed) {
            let text = trimmed[level..].trim();
            html.push_str(&format!("<h{level}>{}</h{level}>\n", render_inline(text)));
            i += 1;
        } else {
            let mut paragraph = Vec::new();
            while i < lines.len() {
                let current = lines[i].trim_start();
                if current.is_empty()
                    || current.starts_with('|')
                    || current.starts_with("- ")
                    || heading_level(current).is_some()
                {
                    break;
                }
                paragraph.push(render_inline(current));
                i += 1;
            }
            html.push_str(&format!("<p>{}</p>\n", paragraph.join("<br>\n")));
        }
    }

    html
}

fn heading_level(line: &str) -> Option<usize> {
    let level = line.chars().take_while(|c| *c == '#').count();
    if (1..=6).contains(&level) && line[level..].starts_with(' ') {
        Some(level)
    } else {
        None
    }
}

/// Render the Markdown report as a standalone HTML document
pub fn markdown_to_html(markdown: &str) -> String {
    let title = markdown
        .lines()
        .find_map(|l| heading_level(l).map(|level| l[level..].trim().to_string()))
        .unwrap_or_else(|| super::REPORT_TITLE.to_string());

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n    <meta charset=\"utf-8\">\n    <title>{}</title>\n    <style>{}    </style>\n</head>\n<body>\n{}</body>\n</html>\n",
        escape(&title),
        STYLE,
        render_body(markdown)
    )
}
