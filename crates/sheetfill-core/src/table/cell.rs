//! Cell values.
//!
//! A [`CellValue`] is the closed set of scalars a table cell can hold. Equality
//! is exact and never crosses variants: `Number(1.0)` is not `Text("1")`.

use std::fmt;

/// The content of a single table cell.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum CellValue {
    /// Missing value (blank spreadsheet cell).
    #[default]
    Empty,
    Text(String),
    Number(f64),
}

impl CellValue {
    pub fn text(text: impl Into<String>) -> CellValue {
        CellValue::Text(text.into())
    }

    pub fn number(n: f64) -> CellValue {
        CellValue::Number(n)
    }

    /// Parse user input into the most specific cell value.
    /// - Empty string -> Empty
    /// - Surrounding whitespace -> Text, kept verbatim
    /// - Leading-zero codes like "007" -> Text
    /// - Finite number -> Number
    /// - Otherwise -> Text
    pub fn from_input(input: &str) -> CellValue {
        if input.is_empty() {
            return CellValue::Empty;
        }

        let trimmed = input.trim();
        if trimmed.is_empty() || input != trimmed {
            return CellValue::text(input);
        }

        if trimmed.starts_with('0')
            && trimmed.len() > 1
            && !trimmed.starts_with("0.")
            && trimmed.chars().nth(1).is_some_and(|c| c.is_ascii_digit())
        {
            return CellValue::text(trimmed);
        }

        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => CellValue::Number(n),
            _ => CellValue::text(trimmed),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            // f64 Display is the shortest string that parses back to the same value.
            CellValue::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::text(s)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}
