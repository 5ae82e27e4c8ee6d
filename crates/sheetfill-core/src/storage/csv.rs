//! Comma-separated backing files.

use super::TableStore;
use crate::error::{Result, StorageError};
use crate::table::{CellValue, Table, normalize_headers};
use std::path::{Path, PathBuf};

/// A table stored as CSV text; the first line is the header.
#[derive(Clone, Debug)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvStore { path: path.into() }
    }
}

impl TableStore for CsvStore {
    fn load(&self) -> Result<Table> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })?;
        let table = parse_csv_content(&self.path, &content)?;
        tracing::debug!(
            path = %self.path.display(),
            rows = table.len(),
            columns = table.columns().len(),
            "loaded csv"
        );
        Ok(table)
    }

    fn save(&mut self, table: &Table) -> Result<()> {
        std::fs::write(&self.path, write_csv_content(table)).map_err(|source| {
            StorageError::Io {
                path: self.path.clone(),
                source,
            }
        })?;
        tracing::info!(path = %self.path.display(), rows = table.len(), "saved csv");
        Ok(())
    }

    fn path(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

/// Parse CSV text into a table. `path` is only used in error messages.
///
/// A leading UTF-8 byte order mark is dropped and blank lines are skipped.
pub(crate) fn parse_csv_content(path: &Path, content: &str) -> Result<Table> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut records = parse_csv_records(content)
        .into_iter()
        .filter(|(_, fields)| !is_blank_record(fields));
    let Some((_, header)) = records.next() else {
        return Err(StorageError::EmptySheet {
            path: path.to_path_buf(),
        }
        .into());
    };

    let columns = normalize_headers(header.into_iter().map(|(f, _)| f));
    let mut table = Table::new(columns);

    for (line, fields) in records {
        if fields.len() > table.columns().len() {
            return Err(StorageError::Malformed {
                path: path.to_path_buf(),
                line,
                message: format!(
                    "{} fields but the header has {} columns",
                    fields.len(),
                    table.columns().len()
                ),
            }
            .into());
        }
        table.push_row(
            fields
                .into_iter()
                .map(|(field, quoted)| parse_csv_field(&field, quoted))
                .collect(),
        );
    }

    Ok(table)
}

/// Split CSV text into records, handling quoted fields (which may span lines).
/// Each record carries its 1-based starting line; each field whether it was quoted.
pub(crate) fn parse_csv_records(content: &str) -> Vec<(usize, Vec<(String, bool)>)> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut field_was_quoted = false;
    let mut line = 1;
    let mut record_line = 1;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                // Check for escaped quote
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                if c == '\n' {
                    line += 1;
                }
                current.push(c);
            }
        } else {
            match c {
                '"' => {
                    in_quotes = true;
                    field_was_quoted = true;
                }
                ',' => {
                    fields.push(finish_field(&mut current, field_was_quoted));
                    field_was_quoted = false;
                }
                '\r' if chars.peek() == Some(&'\n') => {}
                '\n' => {
                    fields.push(finish_field(&mut current, field_was_quoted));
                    records.push((record_line, std::mem::take(&mut fields)));
                    field_was_quoted = false;
                    line += 1;
                    record_line = line;
                }
                _ => current.push(c),
            }
        }
    }
    if !current.is_empty() || field_was_quoted || !fields.is_empty() {
        fields.push(finish_field(&mut current, field_was_quoted));
        records.push((record_line, fields));
    }
    records
}

fn is_blank_record(fields: &[(String, bool)]) -> bool {
    matches!(fields, [(field, false)] if field.is_empty())
}

fn finish_field(current: &mut String, quoted: bool) -> (String, bool) {
    let field = std::mem::take(current);
    if quoted {
        (field, true)
    } else {
        (field.trim().to_string(), false)
    }
}

/// Quoted fields are always text; unquoted ones are inferred.
pub(crate) fn parse_csv_field(field: &str, quoted: bool) -> CellValue {
    if field.is_empty() {
        CellValue::Empty
    } else if quoted {
        CellValue::text(field)
    } else {
        CellValue::from_input(field)
    }
}

/// Serialize a table to CSV text with a header line.
pub fn write_csv_content(table: &Table) -> String {
    let mut out = String::new();
    let header: Vec<String> = table
        .columns()
        .iter()
        .map(|c| escape_csv_text(c))
        .collect();
    out.push_str(&header.join(","));
    out.push('\n');

    for row in table.rows() {
        let fields: Vec<String> = row
            .iter()
            .map(|value| match value {
                CellValue::Empty => String::new(),
                CellValue::Number(n) => n.to_string(),
                CellValue::Text(s) => escape_csv_text(s),
            })
            .collect();
        let line = fields.join(",");
        // A bare empty line would be skipped on load
        if line.is_empty() {
            out.push_str("\"\"");
        } else {
            out.push_str(&line);
        }
        out.push('\n');
    }
    out
}

/// Quote text that would otherwise be split, trimmed, or read back as a number.
fn escape_csv_text(field: &str) -> String {
    let needs_quotes = field.contains(',')
        || field.contains('"')
        || field.contains('\n')
        || field.contains('\r')
        || CellValue::from_input(field) != CellValue::text(field);

    if needs_quotes {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(line: &str) -> Vec<String> {
        parse_csv_records(line)
            .into_iter()
            .next()
            .map(|(_, fields)| fields.into_iter().map(|(f, _)| f).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_parse_csv_line_simple() {
        assert_eq!(fields("a,b,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_csv_line_quoted() {
        assert_eq!(fields(r#"a,"hello, world",c"#), vec!["a", "hello, world", "c"]);
    }

    #[test]
    fn test_parse_csv_line_quoted_preserves_whitespace() {
        assert_eq!(fields(r#""  keep me  ",x"#), vec!["  keep me  ", "x"]);
    }

    #[test]
    fn test_parse_csv_line_escaped_quotes() {
        assert_eq!(
            fields(r#"a,"say ""hello""",c"#),
            vec!["a", r#"say "hello""#, "c"]
        );
    }

    #[test]
    fn test_parse_csv_records_multiline_field() {
        let records = parse_csv_records("a,b\r\n\"line one\nline two\",2\n3,4");
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].0, 2);
        assert_eq!(records[1].1[0], ("line one\nline two".to_string(), true));
        assert_eq!(records[2].0, 4);
        assert_eq!(records[2].1[1], ("4".to_string(), false));
    }

    #[test]
    fn test_parse_csv_field_types() {
        assert_eq!(parse_csv_field("42", false), CellValue::Number(42.0));
        assert_eq!(parse_csv_field("42", true), CellValue::text("42"));
        assert_eq!(parse_csv_field("007", false), CellValue::text("007"));
        assert_eq!(parse_csv_field("", false), CellValue::Empty);
    }

    #[test]
    fn test_escape_csv_text() {
        assert_eq!(escape_csv_text("simple"), "simple");
        assert_eq!(escape_csv_text("with,comma"), "\"with,comma\"");
        assert_eq!(escape_csv_text("with\"quote"), "\"with\"\"quote\"");
        assert_eq!(escape_csv_text("5"), "\"5\"");
        assert_eq!(escape_csv_text(" pad "), "\" pad \"");
        assert_eq!(escape_csv_text("007"), "007");
    }

    #[test]
    fn test_parse_pads_short_rows() {
        let table = parse_csv_content(Path::new("t.csv"), "id,name,qty\n1,A\n2,B,5\n").unwrap();
        assert_eq!(table.columns(), ["id", "name", "qty"]);
        assert_eq!(table.get(0, "qty"), Some(&CellValue::Empty));
        assert_eq!(table.get(1, "qty"), Some(&CellValue::Number(5.0)));
    }

    #[test]
    fn test_parse_rejects_long_rows() {
        let err = parse_csv_content(Path::new("t.csv"), "a,b\n1,2,3\n").unwrap_err();
        assert!(err.is_storage());
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_parse_strips_byte_order_mark() {
        let table = parse_csv_content(Path::new("t.csv"), "\u{feff}id,name\n1,A\n").unwrap();
        assert_eq!(table.columns(), ["id", "name"]);
        assert_eq!(table.require_column("id").unwrap(), 0);
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        let table =
            parse_csv_content(Path::new("t.csv"), "\nid,name\n1,A\n\n2,B\r\n\n").unwrap();
        assert_eq!(table.columns(), ["id", "name"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1, "name"), Some(&CellValue::text("B")));
    }

    #[test]
    fn test_single_column_empty_row_survives_roundtrip() {
        let table = Table::from_rows(
            vec!["note".into()],
            vec![vec!["a".into()], vec![CellValue::Empty], vec!["b".into()]],
        );
        let content = write_csv_content(&table);
        assert_eq!(content, "note\na\n\"\"\nb\n");
        assert_eq!(parse_csv_content(Path::new("t.csv"), &content).unwrap(), table);
    }

    #[test]
    fn test_parse_empty_file() {
        let err = parse_csv_content(Path::new("t.csv"), "").unwrap_err();
        assert!(err.is_storage());
    }

    #[test]
    fn test_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        let table = Table::from_rows(
            vec!["id".into(), "name".into(), "code".into(), "note".into()],
            vec![
                vec![1i64.into(), "A, Inc.".into(), "007".into(), "5".into()],
                vec![2.5.into(), "say \"hi\"".into(), "two\nlines".into(), " pad ".into()],
            ],
        );

        let mut store = CsvStore::new(&path);
        store.save(&table).unwrap();
        assert_eq!(store.load().unwrap(), table);
    }

    #[test]
    fn test_load_missing_file_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path().join("nope.csv"));
        let err = store.load().unwrap_err();
        assert!(err.is_storage());
    }
}
