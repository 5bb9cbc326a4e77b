use anyhow::Context;
use quick_xml::escape::escape;
use quick_xml::events::Event;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::config::temp_sibling;
use crate::error::{QuizError, Result};
use crate::models::{OptionLabel, ParseTrace, Question};

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/></Types>"#;

const RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/></Relationships>"#;

const DOCUMENT_OPEN: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#;

const DOCUMENT_CLOSE: &str = r#"<w:sectPr><w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="708" w:footer="708" w:gutter="0"/></w:sectPr></w:body></w:document>"#;

const TABLE_PROPERTIES: &str = r#"<w:tblPr><w:tblStyle w:val="TableGrid"/><w:tblW w:w="0" w:type="auto"/><w:tblBorders><w:top w:val="single" w:sz="4" w:space="0" w:color="000000"/><w:left w:val="single" w:sz="4" w:space="0" w:color="000000"/><w:bottom w:val="single" w:sz="4" w:space="0" w:color="000000"/><w:right w:val="single" w:sz="4" w:space="0" w:color="000000"/><w:insideH w:val="single" w:sz="4" w:space="0" w:color="000000"/><w:insideV w:val="single" w:sz="4" w:space="0" w:color="000000"/></w:tblBorders><w:tblLook w:val="04A0"/></w:tblPr>"#;

/// Column widths in twentieths of a point.
const COLUMN_WIDTHS: [u32; 3] = [1800, 5400, 1800];

/// Reads a document as an ordered list of paragraphs.
///
/// `.docx` files are read from their `word/document.xml`; any other file is treated as
/// UTF-8 text with one paragraph per line.
///
/// # Arguments
///
/// * `path` - The document to read.
///
/// # Returns
///
/// Paragraphs in document order. Forced line breaks inside a paragraph are `\n`.
///
/// # Errors
///
/// `QuizError::DocumentRead` if the file is missing, not a valid package, or not text.
pub fn read_paragraphs(path: &Path) -> Result<Vec<String>> {
    let is_docx = path
        .extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("docx"));
    let paragraphs =
        if is_docx { read_docx_paragraphs(path) } else { read_text_paragraphs(path) };
    paragraphs.map_err(|e| QuizError::read(path, e))
}

fn read_text_paragraphs(path: &Path) -> anyhow::Result<Vec<String>> {
    let bytes = fs::read(path).context("cannot open file")?;
    let text = String::from_utf8(bytes).context("file is not valid UTF-8 text")?;
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(text.as_str());
    Ok(text.lines().map(|line| line.to_string()).collect())
}

fn read_docx_paragraphs(path: &Path) -> anyhow::Result<Vec<String>> {
    let file = File::open(path).context("cannot open file")?;
    let mut archive = ZipArchive::new(file).context("not a valid .docx package")?;
    let mut xml = String::new();
    let mut entry = archive
        .by_name("word/document.xml")
        .context("package has no word/document.xml")?;
    entry.read_to_string(&mut xml).context("cannot read word/document.xml")?;
    parse_document_xml(&xml)
}

/// Resolves a predefined XML entity or a character reference such as `#233` / `#xE9`.
fn resolve_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = name.strip_prefix('#')?;
            let value = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse::<u32>().ok()?,
            };
            char::from_u32(value)
        }
    }
}

/// Collects paragraph text from a WordprocessingML body.
///
/// Text comes from `w:t` and from `m:t` inside math zones. `w:tab` inside a run becomes a
/// space, `w:br`/`w:cr` a line break. Paragraphs nested in tables are read in document
/// order; each paragraph is trimmed.
fn parse_document_xml(xml: &str) -> anyhow::Result<Vec<String>> {
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut paragraphs: Vec<String> = Vec::new();
    let mut open: Vec<String> = Vec::new();
    let mut run_depth = 0usize;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"w:p" => open.push(String::new()),
                b"w:r" | b"m:r" => run_depth += 1,
                b"w:t" | b"m:t" => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:p" => paragraphs.push(String::new()),
                b"w:tab" if run_depth > 0 => {
                    if let Some(current) = open.last_mut() {
                        current.push(' ');
                    }
                }
                b"w:br" | b"w:cr" if run_depth > 0 => {
                    if let Some(current) = open.last_mut() {
                        current.push('\n');
                    }
                }
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_text {
                    if let Some(current) = open.last_mut() {
                        current.push_str(&String::from_utf8_lossy(&e));
                    }
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if in_text {
                    let name = String::from_utf8_lossy(&e).to_string();
                    if let (Some(current), Some(c)) = (open.last_mut(), resolve_entity(&name)) {
                        current.push(c);
                    }
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:p" => {
                    if let Some(paragraph) = open.pop() {
                        paragraphs.push(paragraph.trim().to_string());
                    }
                }
                b"w:r" | b"m:r" => run_depth = run_depth.saturating_sub(1),
                b"w:t" | b"m:t" => in_text = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "malformed word/document.xml at byte {}: {}",
                    reader.error_position(),
                    e
                ));
            }
            _ => {}
        }
    }
    Ok(paragraphs)
}

/// Drops characters XML 1.0 cannot carry and escapes markup characters.
fn xml_text(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_control() || *c == '\t' || *c == '\n')
        .collect();
    escape(cleaned.as_str()).to_string()
}

/// One paragraph per line; an empty cell still needs one `w:p`.
fn paragraphs_xml(text: &str) -> String {
    if text.is_empty() {
        return "<w:p/>".to_string();
    }
    text.split('\n')
        .map(|line| {
            if line.is_empty() {
                "<w:p/>".to_string()
            } else {
                format!(r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#, xml_text(line))
            }
        })
        .collect()
}

/// A table row of `(text, grid span)` cells.
fn row_xml(cells: &[(&str, usize)]) -> String {
    let mut column = 0;
    let mut xml = String::from("<w:tr>");
    for (text, span) in cells {
        let width: u32 = COLUMN_WIDTHS.iter().skip(column).take(*span).sum();
        xml.push_str(&format!(r#"<w:tc><w:tcPr><w:tcW w:w="{}" w:type="dxa"/>"#, width));
        if *span > 1 {
            xml.push_str(&format!(r#"<w:gridSpan w:val="{}"/>"#, span));
        }
        xml.push_str("</w:tcPr>");
        xml.push_str(&paragraphs_xml(text));
        xml.push_str("</w:tc>");
        column += span;
    }
    xml.push_str("</w:tr>");
    xml
}

/// The 8x3 table for one question.
///
/// | Row | Col0 | Col1 | Col2 |
/// |---|---|---|---|
/// | 0 | Question | question (merged) | |
/// | 1 | Type | multiple_choice (merged) | |
/// | 2-5 | Option | option text | correct / incorrect |
/// | 6 | Solution | explanation (merged) | |
/// | 7 | Marks | 1 | 0 |
fn question_table_xml(question: &Question) -> String {
    let mut xml = String::from("<w:tbl>");
    xml.push_str(TABLE_PROPERTIES);
    xml.push_str("<w:tblGrid>");
    for width in COLUMN_WIDTHS {
        xml.push_str(&format!(r#"<w:gridCol w:w="{}"/>"#, width));
    }
    xml.push_str("</w:tblGrid>");

    xml.push_str(&row_xml(&[("Question", 1), (question.question.as_str(), 2)]));
    xml.push_str(&row_xml(&[("Type", 1), ("multiple_choice", 2)]));
    for label in OptionLabel::ALL {
        let status = if question.is_correct(label) { "correct" } else { "incorrect" };
        xml.push_str(&row_xml(&[("Option", 1), (question.option(label), 1), (status, 1)]));
    }
    xml.push_str(&row_xml(&[("Solution", 1), (question.explanation.as_str(), 2)]));
    xml.push_str(&row_xml(&[("Marks", 1), ("1", 1), ("0", 1)]));
    xml.push_str("</w:tbl>");
    xml
}

/// `word/document.xml` for the questions: each table followed by an empty paragraph.
pub fn document_xml(questions: &[Question]) -> String {
    let mut xml = String::from(DOCUMENT_OPEN);
    for question in questions {
        xml.push_str(&question_table_xml(question));
        xml.push_str("<w:p/>");
    }
    xml.push_str(DOCUMENT_CLOSE);
    xml
}

fn core_properties_xml() -> String {
    let now = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            "\n",
            r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
            r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
            r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
            "<dc:title>Formatted questions</dc:title><dc:creator>quizfmt</dc:creator>",
            r#"<dcterms:created xsi:type="dcterms:W3CDTF">{now}</dcterms:created>"#,
            r#"<dcterms:modified xsi:type="dcterms:W3CDTF">{now}</dcterms:modified>"#,
            "</cp:coreProperties>"
        ),
        now = now
    )
}

fn write_package(questions: &[Question], path: &Path) -> anyhow::Result<()> {
    let file = File::create(path).context("cannot create file")?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let parts = [
        ("[Content_Types].xml", CONTENT_TYPES_XML.to_string()),
        ("_rels/.rels", RELS_XML.to_string()),
        ("word/document.xml", document_xml(questions)),
        ("docProps/core.xml", core_properties_xml()),
    ];
    for (name, content) in parts {
        zip.start_file(name, options)?;
        zip.write_all(content.as_bytes())?;
    }
    zip.finish()?;
    Ok(())
}

/// Runs `write` against a temporary sibling, then renames it over `path`.
fn write_atomically<F>(path: &Path, write: F) -> anyhow::Result<()>
where
    F: FnOnce(&Path) -> anyhow::Result<()>,
{
    let temp_path = temp_sibling(path);
    let result = write(&temp_path).and_then(|()| {
        fs::rename(&temp_path, path).context("cannot move the finished file into place")
    });
    if result.is_err() && temp_path.exists() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

/// Writes the questions as a `.docx` with one 8x3 table per question.
///
/// # Arguments
///
/// * `questions` - Questions in output order.
/// * `path` - Destination file; replaced only once the package is complete.
///
/// # Errors
///
/// `QuizError::OutputWrite` when the file cannot be created or moved into place.
pub fn write_docx(questions: &[Question], path: &Path) -> Result<()> {
    write_atomically(path, |temp_path| write_package(questions, temp_path))
        .map_err(|e| QuizError::write(path, e))
}

/// Writes one JSON object per trace, one per line.
pub fn write_debug_log(traces: &[ParseTrace], path: &Path) -> Result<()> {
    let mut lines = String::new();
    for trace in traces {
        let line = serde_json::to_string(trace).map_err(|e| QuizError::write(path, e))?;
        lines.push_str(&line);
        lines.push('\n');
    }
    fs::write(path, lines).map_err(|e| QuizError::write(path, e))
}

/// Writes the questions as a pretty-printed JSON array.
pub fn write_questions_json(questions: &[Question], path: &Path) -> Result<()> {
    let json = crate::parser::questions2json(questions);
    write_atomically(path, |temp_path| fs::write(temp_path, &json).context("cannot write file"))
        .map_err(|e| QuizError::write(path, e))
}
