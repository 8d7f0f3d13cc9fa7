//! PDF rendering of the Markdown report using `printpdf` 0.8.
//!
//! The layout mirrors the HTML rendering: A4 landscape, headings in
//! Helvetica-Bold, prose in Helvetica, and table rows in Courier so the
//! 64-character digests line up in a fixed-width column. Tokens wider than
//! their column are hard-wrapped instead of running off the page.

use super::table::{is_separator_row, split_cells};
use crate::error::ReportError;
use printpdf::{BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Pt, TextItem};
use tracing::{debug, instrument};

/// Converts report Markdown into PDF bytes
pub trait PdfRenderer: Send + Sync {
    fn render(&self, markdown: &str) -> Result<Vec<u8>, ReportError>;
}

const PAGE_WIDTH_MM: f32 = 297.0;
const PAGE_HEIGHT_MM: f32 = 210.0;
const MARGIN_MM: f32 = 20.0;

const BODY_SIZE_PT: f32 = 10.0;
const HEADING_SIZE_PT: f32 = 16.0;
const TABLE_SIZE_PT: f32 = 8.0;

/// Courier advance width is 600/1000 em
const COURIER_WIDTH_EM: f32 = 0.6;
/// Rough average Helvetica advance width
const HELVETICA_WIDTH_EM: f32 = 0.5;

/// Characters reserved for the name and size columns of the table
const NAME_COLUMN_CHARS: usize = 48;
const SIZE_COLUMN_CHARS: usize = 14;
const COLUMN_GAP_CHARS: usize = 2;

/// One laid-out line of text
#[derive(Debug, Clone, PartialEq)]
struct Line {
    text: String,
    font: BuiltinFont,
    size: f32,
}

impl Line {
    fn new(text: impl Into<String>, font: BuiltinFont, size: f32) -> Self {
        Self {
            text: text.into(),
            font,
            size,
        }
    }

    fn height_pt(&self) -> f32 {
        self.size * 1.4
    }
}

/// Default renderer built on printpdf's builtin fonts
#[derive(Debug, Clone)]
pub struct PrintPdfRenderer {
    title: String,
}

impl PrintPdfRenderer {
    pub fn new() -> Self {
        Self {
            title: super::REPORT_TITLE.to_string(),
        }
    }

    /// Set the title stored in the PDF metadata
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    fn usable_width_pt() -> f32 {
        Mm(PAGE_WIDTH_MM - 2.0 * MARGIN_MM).into_pt().0
    }

    fn chars_per_line(font_size: f32, width_em: f32) -> usize {
        (Self::usable_width_pt() / (font_size * width_em)).floor() as usize
    }

    fn layout(&self, markdown: &str) -> Vec<Line> {
        let mut lines = Vec::new();
        let body_chars = Self::chars_per_line(BODY_SIZE_PT, HELVETICA_WIDTH_EM);
        let table_chars = Self::chars_per_line(TABLE_SIZE_PT, COURIER_WIDTH_EM);
        let digest_chars = table_chars
            .saturating_sub(NAME_COLUMN_CHARS + SIZE_COLUMN_CHARS + 2 * COLUMN_GAP_CHARS)
            .max(16);

        for raw in markdown.lines() {
            let trimmed = raw.trim_start();

            if trimmed.is_empty() {
                lines.push(Line::new("", BuiltinFont::Helvetica, BODY_SIZE_PT));
            } else if let Some(heading) = trimmed.strip_prefix("# ") {
                lines.push(Line::new(
                    pdf_safe(&strip_inline(heading)),
                    BuiltinFont::HelveticaBold,
                    HEADING_SIZE_PT,
                ));
            } else if trimmed.starts_with('|') {
                if is_separator_row(trimmed) {
                    lines.push(Line::new(
                        "-".repeat(table_chars.min(
                            NAME_COLUMN_CHARS + digest_chars + SIZE_COLUMN_CHARS + 2 * COLUMN_GAP_CHARS,
                        )),
                        BuiltinFont::Courier,
                        TABLE_SIZE_PT,
                    ));
                    continue;
                }
                let cells: Vec<String> = split_cells(trimmed)
                    .iter()
                    .map(|c| pdf_safe(&strip_inline(c)))
                    .collect();
                let widths = [NAME_COLUMN_CHARS, digest_chars, SIZE_COLUMN_CHARS];
                for row in table_rows(&cells, &widths) {
                    lines.push(Line::new(row, BuiltinFont::Courier, TABLE_SIZE_PT));
                }
            } else {
                let indent = raw.len() - trimmed.len();
                let text = match trimmed.strip_prefix("- ") {
                    Some(item) => format!("{}- {}", " ".repeat(indent), strip_inline(item)),
                    None => strip_inline(trimmed),
                };
                for wrapped in wrap_text(&pdf_safe(&text), body_chars) {
                    lines.push(Line::new(wrapped, BuiltinFont::Helvetica, BODY_SIZE_PT));
                }
            }
        }

        lines
    }
}

impl Default for PrintPdfRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfRenderer for PrintPdfRenderer {
    #[instrument(skip(self, markdown), fields(markdown_len = markdown.len()))]
    fn render(&self, markdown: &str) -> Result<Vec<u8>, ReportError> {
        let lines = self.layout(markdown);
        let page_w = Mm(PAGE_WIDTH_MM);
        let page_h = Mm(PAGE_HEIGHT_MM);
        let margin_pt = Mm(MARGIN_MM).into_pt().0;
        let page_h_pt = page_h.into_pt().0;
        let bottom_pt = margin_pt;

        let mut doc = PdfDocument::new(&self.title);
        let mut pages: Vec<PdfPage> = Vec::new();
        let mut ops: Vec<Op> = Vec::new();
        let mut cursor_pt = page_h_pt - margin_pt;

        for line in &lines {
            let height = line.height_pt();
            if cursor_pt - height < bottom_pt {
                if !ops.is_empty() {
                    pages.push(PdfPage::new(page_w, page_h, std::mem::take(&mut ops)));
                }
                cursor_pt = page_h_pt - margin_pt;
            }
            cursor_pt -= height;

            if line.text.is_empty() {
                continue;
            }

            ops.push(Op::StartTextSection);
            ops.push(Op::SetTextCursor {
                pos: Point {
                    x: Pt(margin_pt),
                    y: Pt(cursor_pt),
                },
            });
            ops.push(Op::SetFontSizeBuiltinFont {
                size: Pt(line.size),
                font: line.font,
            });
            ops.push(Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(line.text.clone())],
                font: line.font,
            });
            ops.push(Op::EndTextSection);
        }

        if !ops.is_empty() || pages.is_empty() {
            pages.push(PdfPage::new(page_w, page_h, ops));
        }

        debug!(lines = lines.len(), pages = pages.len(), "Report layout complete");

        doc.with_pages(pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);

        if output.is_empty() {
            return Err(ReportError::Render("printpdf produced no output".to_string()));
        }

        Ok(output)
    }
}

/// Remove inline Markdown markers (code ticks and bold stars)
fn strip_inline(text: &str) -> String {
    text.replace("**", "").replace('`', "")
}

/// Builtin PDF fonts only cover Latin-1; map the report's symbols and
/// replace anything else.
fn pdf_safe(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '✅' => out.push_str("[OK]"),
            '❌' => out.push_str("[X]"),
            c if (c as u32) < 0x100 => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

/// Break `text` into chunks of at most `width` characters
fn hard_wrap(text: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }
    chars
        .chunks(width.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Lay out table cells in fixed-width columns, wrapping each cell inside its
/// column and emitting as many physical rows as the tallest cell needs
fn table_rows(cells: &[String], widths: &[usize]) -> Vec<String> {
    let wrapped: Vec<Vec<String>> = widths
        .iter()
        .enumerate()
        .map(|(i, width)| hard_wrap(cells.get(i).map(String::as_str).unwrap_or(""), *width))
        .collect();
    let height = wrapped.iter().map(Vec::len).max().unwrap_or(1);
    let gap = " ".repeat(COLUMN_GAP_CHARS);

    (0..height)
        .map(|row| {
            let parts: Vec<String> = wrapped
                .iter()
                .zip(widths)
                .map(|(column, width)| {
                    let text = column.get(row).map(String::as_str).unwrap_or("");
                    format!("{text:<width$}", width = *width)
                })
                .collect();
            parts.join(&gap).trim_end().to_string()
        })
        .collect()
}

/// Word-wrap a line so that no output line exceeds `max_width` characters.
/// Words longer than `max_width` are force-broken.
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let max_width = max_width.max(1);
    let indent: String = text.chars().take_while(|c| *c == ' ').collect();
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return vec![String::new()];
    }

    let mut result = Vec::new();
    let mut current = indent.clone();

    for word in words {
        let word_len = word.chars().count();
        let current_len = current.chars().count();
        let fresh = current.len() == indent.len();

        if word_len > max_width {
            if !fresh {
                result.push(std::mem::replace(&mut current, indent.clone()));
            }
            let mut pieces = hard_wrap(word, max_width);
            let last = pieces.pop().unwrap_or_default();
            result.extend(pieces);
            current = last;
        } else if fresh {
            current.push_str(word);
        } else if current_len + 1 + word_len <= max_width {
            current.push(' ');
            current.push_str(word);
        } else {
            result.push(std::mem::replace(&mut current, indent.clone()));
            current.push_str(word);
        }
    }

    if !current.trim().is_empty() {
        result.push(current);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIGEST: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    fn sample() -> String {
        format!(
            "# SHA-256 Hash Report\n\n**Report Time:** 2024-01-01 00:00:00\n\n\n| File Name | SHA-256 | Size |\n|-----------|---------|------|\n| a.txt | `{DIGEST}` | 0.00 KB |\n\n\n# File Comparison\n\n**Result:** ✅ Files are IDENTICAL."
        )
    }

    #[test]
    fn render_produces_pdf_bytes() {
        let bytes = PrintPdfRenderer::new().render(&sample()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn empty_markdown_still_renders_a_page() {
        let bytes = PrintPdfRenderer::new().render("").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn long_reports_span_pages() {
        let mut markdown = String::from("| File Name | SHA-256 | Size |\n|---|---|---|\n");
        for i in 0..400 {
            markdown.push_str(&format!("| file{i}.txt | `{DIGEST}` | 1.00 KB |\n"));
        }
        let bytes = PrintPdfRenderer::new().render(&markdown).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn digest_stays_on_one_table_line() {
        let lines = PrintPdfRenderer::new().layout(&sample());
        let row = lines.iter().find(|l| l.text.starts_with("a.txt")).unwrap();

        assert!(row.text.contains(DIGEST));
        assert_eq!(row.font, BuiltinFont::Courier);
        assert!(row.text.chars().count() <= PrintPdfRenderer::chars_per_line(TABLE_SIZE_PT, COURIER_WIDTH_EM));
    }

    #[test]
    fn long_names_wrap_inside_their_column() {
        let name = "n".repeat(NAME_COLUMN_CHARS + 10);
        let rows = table_rows(
            &[name, DIGEST.to_string(), "1.00 KB".to_string()],
            &[NAME_COLUMN_CHARS, 64, SIZE_COLUMN_CHARS],
        );
        assert_eq!(rows.len(), 2);
        assert!(rows[0].contains(DIGEST));
        assert_eq!(rows[1], "n".repeat(10));
    }

    #[test]
    fn symbols_are_mapped_to_latin1() {
        assert_eq!(pdf_safe("✅ ok"), "[OK] ok");
        assert_eq!(pdf_safe("❌"), "[X]");
        assert_eq!(pdf_safe("naïve"), "naïve");
        assert_eq!(pdf_safe("日本"), "??");
    }

    #[test]
    fn wrap_text_breaks_long_words() {
        let wrapped = wrap_text(&"x".repeat(25), 10);
        assert_eq!(wrapped, vec!["x".repeat(10), "x".repeat(10), "x".repeat(5)]);
    }

    #[test]
    fn wrap_text_keeps_words_together() {
        let wrapped = wrap_text("alpha beta gamma", 11);
        assert_eq!(wrapped, vec!["alpha beta".to_string(), "gamma".to_string()]);
    }
}
