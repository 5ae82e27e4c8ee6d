//! Markdown rendering of a table

use crate::table::Table;

/// Render a table as a GitHub-style markdown table.
pub fn write_markdown_content(table: &Table) -> String {
    if table.columns().is_empty() {
        return "*Empty table*\n".to_string();
    }

    let mut out = String::new();
    out.push('|');
    for column in table.columns() {
        out.push_str(&format!(" {} |", escape_markdown(column)));
    }
    out.push('\n');

    out.push('|');
    for _ in table.columns() {
        out.push_str("---|");
    }
    out.push('\n');

    for row in table.rows() {
        out.push('|');
        for value in row {
            out.push_str(&format!(" {} |", escape_markdown(&value.to_string())));
        }
        out.push('\n');
    }
    out
}

/// Escape special markdown characters in cell content
fn escape_markdown(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ").replace('\r', "")
}
