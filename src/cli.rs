//! Non-interactive subcommands.

use crate::config::Config;
use anyhow::Context;
use clap::{Subcommand, ValueEnum};
use sheetfill_core::storage::{write_csv_content, write_markdown_content};
use sheetfill_core::{CellValue, Editor, FilterSpec, Table, TableStore, UpdateSet};
use std::io::Write;
use std::path::PathBuf;

/// A `COLUMN=VALUE` pair from the command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    pub column: String,
    pub value: String,
}

pub fn parse_assignment(s: &str) -> Result<Assignment, String> {
    let (column, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected COLUMN=VALUE, got '{}'", s))?;
    let column = column.trim();
    if column.is_empty() {
        return Err(format!("missing column name in '{}'", s));
    }
    Ok(Assignment {
        column: column.to_string(),
        value: value.to_string(),
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Aligned plain-text columns
    Table,
    Markdown,
    Csv,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the column names
    Columns,
    /// Print the distinct non-empty values of a column
    Values { column: String },
    /// Print the table, or only the rows matching a filter
    Show {
        /// Only rows where COLUMN equals VALUE
        #[arg(long = "where", value_name = "COLUMN=VALUE", value_parser = parse_assignment)]
        filter: Option<Assignment>,
        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,
    },
    /// Print the columns with empty cells among the matching rows
    Missing {
        #[arg(long = "where", value_name = "COLUMN=VALUE", value_parser = parse_assignment)]
        filter: Assignment,
    },
    /// Set values on every matching row and save
    Update {
        #[arg(long = "where", value_name = "COLUMN=VALUE", value_parser = parse_assignment)]
        filter: Assignment,
        #[arg(long = "set", value_name = "COLUMN=VALUE", value_parser = parse_assignment, required = true)]
        updates: Vec<Assignment>,
    },
    /// Write the whole table as an xlsx workbook
    Export {
        /// Destination file, or `-` for stdout (defaults to `export_file` from the config)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

/// Run one subcommand, writing its output to `out`.
pub fn execute<S: TableStore, W: Write>(
    command: Command,
    editor: &mut Editor<S>,
    config: &Config,
    out: &mut W,
) -> anyhow::Result<()> {
    match command {
        Command::Columns => {
            let table = editor.load()?;
            for column in table.columns() {
                writeln!(out, "{}", column)?;
            }
        }
        Command::Values { column } => {
            let table = editor.load()?;
            for value in table.distinct_values(&column)? {
                writeln!(out, "{}", value)?;
            }
        }
        Command::Show { filter, format } => {
            let table = editor.load()?;
            let table = match filter {
                Some(filter) => table.filter(&filter_spec(&table, &filter)?)?,
                None => table,
            };
            let rendered = match format {
                Format::Table => render_table(&table),
                Format::Markdown => write_markdown_content(&table),
                Format::Csv => write_csv_content(&table),
            };
            out.write_all(rendered.as_bytes())?;
        }
        Command::Missing { filter } => {
            let table = editor.load()?;
            let subset = table.filter(&filter_spec(&table, &filter)?)?;
            for column in subset.missing_columns() {
                writeln!(out, "{}", column)?;
            }
        }
        Command::Update { filter, updates } => {
            let table = editor.load()?;
            let spec = filter_spec(&table, &filter)?;
            let submission = editor.submit_updates(&spec.column, &spec.value, &update_set(&updates))?;
            writeln!(out, "Updated {} row(s)", submission.affected)?;
        }
        Command::Export { output } => {
            let bytes = editor.request_export()?;
            let path = output.unwrap_or_else(|| config.export_file.clone());
            if path.as_os_str() == "-" {
                out.write_all(&bytes)?;
            } else {
                std::fs::write(&path, &bytes)
                    .with_context(|| format!("write export {}", path.display()))?;
                writeln!(out, "Exported to {}", path.display())?;
            }
        }
    }
    Ok(())
}

/// Resolve `--where` text against the column's existing values.
fn filter_spec(table: &Table, filter: &Assignment) -> sheetfill_core::Result<FilterSpec> {
    let value = table.resolve_value(&filter.column, &filter.value)?;
    Ok(FilterSpec::new(filter.column.as_str(), value))
}

fn update_set(assignments: &[Assignment]) -> UpdateSet {
    assignments
        .iter()
        .map(|a| (a.column.as_str(), CellValue::from_input(&a.value)))
        .collect()
}

/// Render a table as aligned plain-text columns.
pub fn render_table(table: &Table) -> String {
    let mut widths: Vec<usize> = table.columns().iter().map(|c| c.chars().count()).collect();
    let rows: Vec<Vec<String>> = table
        .rows()
        .iter()
        .map(|row| row.iter().map(|v| v.to_string()).collect())
        .collect();
    for row in &rows {
        for (col, text) in row.iter().enumerate() {
            widths[col] = widths[col].max(text.chars().count());
        }
    }

    let format_line = |cells: &[String]| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(text, width)| format!("{:<width$}", text, width = *width))
            .collect();
        padded.join("  ").trim_end().to_string()
    };

    let mut out = String::new();
    out.push_str(&format_line(table.columns()));
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');
    for row in &rows {
        out.push_str(&format_line(row));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetfill_core::MemoryStore;

    fn sample() -> Table {
        Table::from_rows(
            vec!["id".into(), "name".into(), "qty".into()],
            vec![
                vec![1i64.into(), "A".into(), CellValue::Empty],
                vec![2i64.into(), "B".into(), 5i64.into()],
            ],
        )
    }

    fn run(command: Command, editor: &mut Editor<MemoryStore>) -> String {
        let mut out = Vec::new();
        execute(command, editor, &Config::default(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn assign(column: &str, value: &str) -> Assignment {
        Assignment {
            column: column.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(parse_assignment("id=1"), Ok(assign("id", "1")));
        assert_eq!(parse_assignment("note=a=b"), Ok(assign("note", "a=b")));
        assert_eq!(parse_assignment("qty="), Ok(assign("qty", "")));
        assert!(parse_assignment("noequals").is_err());
        assert!(parse_assignment("=5").is_err());
    }

    #[test]
    fn test_render_table() {
        let rendered = render_table(&sample());
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "id  name  qty");
        assert_eq!(lines[1], "--  ----  ---");
        assert_eq!(lines[2], "1   A");
        assert_eq!(lines[3], "2   B     5");
    }

    #[test]
    fn test_show_where_resolves_number() {
        let mut editor = Editor::new(MemoryStore::new(sample()));
        let output = run(
            Command::Show {
                filter: Some(assign("id", "2")),
                format: Format::Csv,
            },
            &mut editor,
        );
        assert_eq!(output, "id,name,qty\n2,B,5\n");
    }

    #[test]
    fn test_values_and_missing() {
        let mut editor = Editor::new(MemoryStore::new(sample()));
        let values = run(Command::Values { column: "name".into() }, &mut editor);
        assert_eq!(values, "A\nB\n");

        let missing = run(Command::Missing { filter: assign("id", "1") }, &mut editor);
        assert_eq!(missing, "qty\n");
        let none = run(Command::Missing { filter: assign("id", "2") }, &mut editor);
        assert_eq!(none, "");
    }

    #[test]
    fn test_update_parses_values() {
        let mut editor = Editor::new(MemoryStore::new(sample()));
        let output = run(
            Command::Update {
                filter: assign("name", "A"),
                updates: vec![assign("qty", "3")],
            },
            &mut editor,
        );
        assert_eq!(output, "Updated 1 row(s)\n");
        let table = editor.load().unwrap();
        assert_eq!(table.get(0, "qty"), Some(&CellValue::Number(3.0)));
    }

    #[test]
    fn test_invalid_column_is_error() {
        let mut editor = Editor::new(MemoryStore::new(sample()));
        let mut out = Vec::new();
        let err = execute(
            Command::Show {
                filter: Some(assign("missing_col", "1")),
                format: Format::Table,
            },
            &mut editor,
            &Config::default(),
            &mut out,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Unknown column: missing_col"));
    }

    #[test]
    fn test_export_to_stdout_writes_workbook() {
        let mut editor = Editor::new(MemoryStore::new(sample()));
        let mut out = Vec::new();
        execute(
            Command::Export {
                output: Some(PathBuf::from("-")),
            },
            &mut editor,
            &Config::default(),
            &mut out,
        )
        .unwrap();
        assert_eq!(sheetfill_core::read_xlsx_bytes(&out).unwrap(), sample());
    }
}
