//! DOCX text extraction
//!
//! A .docx file is a ZIP archive; the body lives in `word/document.xml`.
//! Paragraphs become lines and tables become markdown tables, in
//! document order.

use super::table::table_to_markdown;
use crate::error::{AppError, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};

const DOCUMENT_PART: &str = "word/document.xml";

/// Extract plain text from DOCX bytes
pub fn extract(bytes: &[u8]) -> Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| AppError::Extraction(format!("not a valid DOCX archive: {}", e)))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| AppError::Extraction(format!("missing {}: {}", DOCUMENT_PART, e)))?
        .read_to_string(&mut xml)
        .map_err(|e| AppError::Extraction(format!("unreadable {}: {}", DOCUMENT_PART, e)))?;

    document_xml_to_text(&xml)
}

#[derive(Default)]
struct TableBuilder {
    rows: Vec<Vec<String>>,
    row: Option<Vec<String>>,
    cell: Option<String>,
}

/// Walk WordprocessingML and flatten it to text
fn document_xml_to_text(xml: &str) -> Result<String> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    let mut buf = Vec::new();

    let mut blocks: Vec<String> = Vec::new();
    let mut tables: Vec<TableBuilder> = Vec::new();
    let mut paragraph = String::new();
    let mut in_text = false;

    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|e| AppError::Extraction(format!("malformed document XML: {}", e)))?
        {
            Event::Start(e) => match e.local_name().as_ref() {
                b"p" => paragraph.clear(),
                b"t" => in_text = true,
                b"tbl" => tables.push(TableBuilder::default()),
                b"tr" => {
                    if let Some(table) = tables.last_mut() {
                        table.row = Some(Vec::new());
                    }
                }
                b"tc" => {
                    if let Some(table) = tables.last_mut() {
                        table.cell = Some(String::new());
                    }
                }
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"tab" => paragraph.push('\t'),
                b"br" | b"cr" => paragraph.push(' '),
                _ => {}
            },
            Event::Text(e) if in_text => {
                let text = e
                    .unescape()
                    .map_err(|e| AppError::Extraction(format!("bad text node: {}", e)))?;
                paragraph.push_str(&text);
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => {
                    let line = paragraph.trim();
                    match tables.last_mut().and_then(|t| t.cell.as_mut()) {
                        Some(cell) => {
                            if !line.is_empty() {
                                if !cell.is_empty() {
                                    cell.push(' ');
                                }
                                cell.push_str(line);
                            }
                        }
                        None => {
                            if !line.is_empty() {
                                blocks.push(line.to_string());
                            }
                        }
                    }
                    paragraph.clear();
                }
                b"tc" => {
                    if let Some(table) = tables.last_mut() {
                        let cell = table.cell.take().unwrap_or_default();
                        table.row.get_or_insert_with(Vec::new).push(cell);
                    }
                }
                b"tr" => {
                    if let Some(table) = tables.last_mut() {
                        if let Some(row) = table.row.take() {
                            table.rows.push(row);
                        }
                    }
                }
                b"tbl" => {
                    if let Some(table) = tables.pop() {
                        close_table(table, &mut tables, &mut blocks);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(blocks.join("\n").trim().to_string())
}

/// Emit a finished table. Nested tables collapse into their parent cell.
fn close_table(table: TableBuilder, parents: &mut [TableBuilder], blocks: &mut Vec<String>) {
    match parents.last_mut().and_then(|t| t.cell.as_mut()) {
        Some(cell) => {
            let flattened = table
                .rows
                .iter()
                .map(|row| row.join(" "))
                .collect::<Vec<_>>()
                .join(" ");
            if !flattened.trim().is_empty() {
                if !cell.is_empty() {
                    cell.push(' ');
                }
                cell.push_str(flattened.trim());
            }
        }
        None => {
            let markdown = table_to_markdown(&table.rows);
            if !markdown.is_empty() {
                blocks.push(format!("\n{}\n", markdown));
            }
        }
    }
}
