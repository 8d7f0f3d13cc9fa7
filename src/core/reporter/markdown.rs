//! Markdown fragments of the report.

use crate::core::comparator::{ComparisonResult, FileComparison, ImageComparison};
use crate::core::hasher::FileRecord;

/// Heading at the top of every report
pub const REPORT_TITLE: &str = "SHA-256 Hash Report";

const TABLE_HEADER: &str = "| File Name | SHA-256 | Size |\n|-----------|---------|------|\n";

/// Size in binary kilobytes with two decimals, e.g. `"1024.00 KB"`
pub fn format_size_kb(bytes: u64) -> String {
    format!("{:.2} KB", bytes as f64 / 1024.0)
}

/// Pipes inside a cell would end the cell early
fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|")
}

/// Render the file table: two header rows, then one row per record in order
pub fn render_table(records: &[FileRecord]) -> String {
    let mut table = String::from(TABLE_HEADER);
    for record in records {
        table.push_str(&format!(
            "| {} | `{}` | {} |\n",
            escape_cell(&record.display_name),
            record.digest,
            format_size_kb(record.size_bytes)
        ));
    }
    table
}

fn render_file_comparison(c: &FileComparison) -> String {
    format!(
        "# File Comparison\n\n\
         - File A: `{}`\n  - SHA-256: `{}`\n\
         - File B: `{}`\n  - SHA-256: `{}`\n\n\
         **Result:** {}",
        c.name_a(),
        c.digest_a,
        c.name_b(),
        c.digest_b,
        c.verdict()
    )
}

fn render_image_comparison(c: &ImageComparison) -> String {
    format!(
        "# Image Comparison\n\n\
         - Image A: `{}`\n  - pHash: `{}`\n\
         - Image B: `{}`\n  - pHash: `{}`\n\n\
         **Difference:** {}\n\
         **Result:** {}",
        c.name_a(),
        c.hash_a,
        c.name_b(),
        c.hash_b,
        c.distance,
        c.verdict
    )
}

/// Render the trailing comparison block
pub fn render_comparison(comparison: &ComparisonResult) -> String {
    match comparison {
        ComparisonResult::Files(c) => render_file_comparison(c),
        ComparisonResult::Images(c) => render_image_comparison(c),
    }
}
