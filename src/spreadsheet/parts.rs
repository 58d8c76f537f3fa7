//! XML bodies of the workbook package parts.

use std::fmt::Write;

use super::{Cell, HEADER_FONT_SIZE, ROW_FONT_SIZE, Sheet};

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

// Indexes into cellXfs in styles()
const ROW_STYLE: u8 = 1;
const HEADER_STYLE: u8 = 2;

pub(super) fn content_types() -> String {
    format!(
        concat!(
            "{}",
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
            r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
            r#"<Default Extension="xml" ContentType="application/xml"/>"#,
            r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
            r#"<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
            r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
            r#"</Types>"#
        ),
        XML_DECL
    )
}

pub(super) fn root_rels() -> String {
    format!(
        concat!(
            "{}",
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
            r#"<Relationship Id="rId1" Type="{}/officeDocument" Target="xl/workbook.xml"/>"#,
            r#"</Relationships>"#
        ),
        XML_DECL, REL_NS
    )
}

pub(super) fn workbook(sheet_name: &str) -> String {
    format!(
        concat!(
            "{}",
            r#"<workbook xmlns="{}" xmlns:r="{}">"#,
            r#"<sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets>"#,
            r#"</workbook>"#
        ),
        XML_DECL,
        MAIN_NS,
        REL_NS,
        escape(sheet_name)
    )
}

pub(super) fn workbook_rels() -> String {
    format!(
        concat!(
            "{}",
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
            r#"<Relationship Id="rId1" Type="{rel}/worksheet" Target="worksheets/sheet1.xml"/>"#,
            r#"<Relationship Id="rId2" Type="{rel}/styles" Target="styles.xml"/>"#,
            r#"</Relationships>"#
        ),
        XML_DECL,
        rel = REL_NS
    )
}

pub(super) fn styles() -> String {
    format!(
        concat!(
            "{}",
            r#"<styleSheet xmlns="{}">"#,
            r#"<fonts count="3">"#,
            r#"<font><sz val="11"/><name val="Calibri"/></font>"#,
            r#"<font><sz val="{}"/><name val="Calibri"/></font>"#,
            r#"<font><b/><sz val="{}"/><name val="Calibri"/></font>"#,
            r#"</fonts>"#,
            r#"<fills count="1"><fill><patternFill patternType="none"/></fill></fills>"#,
            r#"<borders count="1"><border/></borders>"#,
            r#"<cellStyleXfs count="1"><xf/></cellStyleXfs>"#,
            r#"<cellXfs count="3">"#,
            r#"<xf fontId="0"/>"#,
            r#"<xf fontId="1" applyFont="1"/>"#,
            r#"<xf fontId="2" applyFont="1"/>"#,
            r#"</cellXfs>"#,
            r#"</styleSheet>"#
        ),
        XML_DECL, MAIN_NS, ROW_FONT_SIZE, HEADER_FONT_SIZE
    )
}

pub(super) fn worksheet(sheet: &Sheet) -> String {
    let mut xml = format!(r#"{}<worksheet xmlns="{}"><sheetData>"#, XML_DECL, MAIN_NS);

    let header: Vec<Cell> = sheet.headers.iter().map(|h| Cell::Text(h.clone())).collect();
    write_row(&mut xml, 1, &header, HEADER_STYLE);
    for (index, row) in sheet.rows.iter().enumerate() {
        write_row(&mut xml, index + 2, row, ROW_STYLE);
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

fn write_row(xml: &mut String, row_number: usize, cells: &[Cell], style: u8) {
    // Writing into a String cannot fail
    let _ = write!(xml, r#"<row r="{}">"#, row_number);
    for (index, cell) in cells.iter().enumerate() {
        let reference = format!("{}{}", column_name(index), row_number);
        let _ = match cell {
            Cell::Text(text) => write!(
                xml,
                r#"<c r="{}" s="{}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
                reference,
                style,
                escape(text)
            ),
            Cell::Number(value) => {
                let value = if value.is_finite() { *value } else { 0.0 };
                write!(xml, r#"<c r="{}" s="{}"><v>{}</v></c>"#, reference, style, value)
            }
        };
    }
    xml.push_str("</row>");
}

/// Spreadsheet column name for a zero-based index (0 -> A, 25 -> Z, 26 -> AA)
pub(super) fn column_name(mut index: usize) -> String {
    let mut name = Vec::new();
    loop {
        name.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

pub(super) fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            // Control characters other than tab/newline are not allowed in XML 1.0
            c if c.is_control() && c != '\t' && c != '\n' && c != '\r' => {}
            c => escaped.push(c),
        }
    }
    escaped
}
