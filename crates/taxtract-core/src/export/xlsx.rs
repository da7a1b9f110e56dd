use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::TaxtractError;
use crate::model::{Batch, Field};

pub const SHEET_NAME: &str = "Data";

/// Column order of the exported sheet, after the file name column.
pub const FIELD_COLUMNS: [Field; 7] = [
    Field::Id,
    Field::PayerName,
    Field::TaxBase,
    Field::TaxAmount,
    Field::Rate,
    Field::TaxType,
    Field::DocumentNumber,
];

const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

/// Header row of the exported sheet.
pub fn header_row() -> Vec<String> {
    std::iter::once("File Name".to_string())
        .chain(FIELD_COLUMNS.iter().map(|f| f.to_string()))
        .collect()
}

/// One sheet row per record, absent values as empty strings.
pub fn data_rows(batch: &Batch) -> Vec<Vec<String>> {
    batch
        .records
        .iter()
        .map(|record| {
            std::iter::once(record.file_name.clone())
                .chain(
                    FIELD_COLUMNS
                        .iter()
                        .map(|f| record.fields.text(*f).to_string()),
                )
                .collect()
        })
        .collect()
}

/// Encode the batch as a single-sheet Office Open XML workbook.
pub fn write_workbook(batch: &Batch) -> Result<Vec<u8>, TaxtractError> {
    let mut rows = vec![header_row()];
    rows.extend(data_rows(batch));

    let sheet_xml = sheet_xml(&rows)?;
    let workbook_xml = workbook_xml()?;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, content) in [
        ("[Content_Types].xml", CONTENT_TYPES_XML.as_bytes()),
        ("_rels/.rels", ROOT_RELS_XML.as_bytes()),
        ("xl/workbook.xml", workbook_xml.as_slice()),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS_XML.as_bytes()),
        ("xl/worksheets/sheet1.xml", sheet_xml.as_slice()),
    ] {
        zip.start_file(name, options)?;
        zip.write_all(content)?;
    }

    Ok(zip.finish()?.into_inner())
}

fn workbook_xml() -> Result<Vec<u8>, TaxtractError> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    writer.write_event(Event::Start(BytesStart::new("workbook").with_attributes([
        ("xmlns", NS_MAIN),
        (
            "xmlns:r",
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships",
        ),
    ])))?;
    writer.write_event(Event::Start(BytesStart::new("sheets")))?;
    writer.write_event(Event::Empty(BytesStart::new("sheet").with_attributes([
        ("name", SHEET_NAME),
        ("sheetId", "1"),
        ("r:id", "rId1"),
    ])))?;
    writer.write_event(Event::End(BytesEnd::new("sheets")))?;
    writer.write_event(Event::End(BytesEnd::new("workbook")))?;
    Ok(writer.into_inner().into_inner())
}

fn sheet_xml(rows: &[Vec<String>]) -> Result<Vec<u8>, TaxtractError> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    writer.write_event(Event::Start(
        BytesStart::new("worksheet").with_attributes([("xmlns", NS_MAIN)]),
    ))?;
    writer.write_event(Event::Start(BytesStart::new("sheetData")))?;

    for (row_idx, row) in rows.iter().enumerate() {
        let row_number = (row_idx + 1).to_string();
        writer.write_event(Event::Start(
            BytesStart::new("row").with_attributes([("r", row_number.as_str())]),
        ))?;

        for (col_idx, value) in row.iter().enumerate() {
            // Blank cells are left out of the sheet entirely.
            if value.is_empty() {
                continue;
            }
            let cell_ref = format!("{}{}", column_letter(col_idx), row_number);
            writer.write_event(Event::Start(
                BytesStart::new("c").with_attributes([("r", cell_ref.as_str()), ("t", "inlineStr")]),
            ))?;
            writer.write_event(Event::Start(BytesStart::new("is")))?;
            writer.write_event(Event::Start(
                BytesStart::new("t").with_attributes([("xml:space", "preserve")]),
            ))?;
            writer.write_event(Event::Text(BytesText::new(value)))?;
            writer.write_event(Event::End(BytesEnd::new("t")))?;
            writer.write_event(Event::End(BytesEnd::new("is")))?;
            writer.write_event(Event::End(BytesEnd::new("c")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("row")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("sheetData")))?;
    writer.write_event(Event::End(BytesEnd::new("worksheet")))?;
    Ok(writer.into_inner().into_inner())
}

/// Spreadsheet column name for a zero-based index ("A", ..., "Z", "AA", ...).
fn column_letter(mut index: usize) -> String {
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
