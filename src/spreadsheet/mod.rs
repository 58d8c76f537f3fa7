//! Minimal XLSX writer.
//!
//! Produces a single-sheet Office Open XML workbook: a header row followed by data rows.
//! The package is assembled with the `zip` crate; cell text is written as inline strings so
//! no shared string table is needed.
//!
//! - [`parts`] - XML bodies of the package parts

mod parts;


use std::io::{Cursor, Write};

use zip::CompressionMethod;
use zip::write::FileOptions;

use crate::error::Result;

/// Header font size in points
pub const HEADER_FONT_SIZE: u8 = 16;
/// Data row font size in points
pub const ROW_FONT_SIZE: u8 = 12;

/// Longest worksheet name Excel accepts
const MAX_SHEET_NAME_LEN: usize = 31;

/// Value of a single cell
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    /// Text, written as an inline string
    Text(String),
    /// Number; non-finite values are written as 0
    Number(f64),
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(value as f64)
    }
}

/// One worksheet worth of data
#[derive(Clone, Debug, Default)]
pub struct Sheet {
    /// Worksheet tab name
    pub name: String,
    /// Column titles, written as row 1
    pub headers: Vec<String>,
    /// Data rows, written from row 2
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    /// Create an empty sheet with the given name and headers
    pub fn new<I, S>(name: &str, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: sanitize_sheet_name(name),
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a data row
    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }
}

/// Serialize `sheet` into XLSX bytes
pub fn write_workbook(sheet: &Sheet) -> Result<Vec<u8>> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let entries = [
        ("[Content_Types].xml", parts::content_types()),
        ("_rels/.rels", parts::root_rels()),
        ("xl/workbook.xml", parts::workbook(&sheet.name)),
        ("xl/_rels/workbook.xml.rels", parts::workbook_rels()),
        ("xl/styles.xml", parts::styles()),
        ("xl/worksheets/sheet1.xml", parts::worksheet(sheet)),
    ];

    for (name, body) in entries {
        zip.start_file(name, options)?;
        zip.write_all(body.as_bytes())?;
    }

    Ok(zip.finish()?.into_inner())
}

fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, ':' | '\\' | '/' | '?' | '*' | '[' | ']'))
        .take(MAX_SHEET_NAME_LEN)
        .collect();
    if cleaned.trim().is_empty() {
        "Sheet1".to_string()
    } else {
        cleaned
    }
}
