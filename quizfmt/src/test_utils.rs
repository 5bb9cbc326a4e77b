use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use strum::Display;

use anyhow::Result;
use quick_xml::escape::escape;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

/// A `w:p` with one run per line of `text`, lines joined by `w:br`.
pub fn paragraph_xml(text: &str) -> String {
    if text.is_empty() {
        return "<w:p/>".to_string();
    }
    let runs: Vec<String> = text
        .split('\n')
        .map(|line| format!(r#"<w:r><w:t xml:space="preserve">{}</w:t></w:r>"#, escape(line)))
        .collect();
    format!("<w:p>{}</w:p>", runs.join("<w:r><w:br/></w:r>"))
}

/// A `w:p` with an inline `m:oMath` between two text runs.
pub fn math_paragraph_xml(before: &str, math: &str, after: &str) -> String {
    format!(
        concat!(
            r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r>"#,
            r#"<m:oMath><m:r><m:t>{}</m:t></m:r></m:oMath>"#,
            r#"<w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#
        ),
        escape(before),
        escape(math),
        escape(after)
    )
}

/// A one-column table with a single paragraph per cell.
pub fn table_xml(cells: &[&str]) -> String {
    let rows: Vec<String> = cells
        .iter()
        .map(|cell| format!("<w:tr><w:tc>{}</w:tc></w:tr>", paragraph_xml(cell)))
        .collect();
    format!("<w:tbl>{}</w:tbl>", rows.join(""))
}

/// Writes a minimal `.docx` whose body is `body_xml`.
pub fn write_docx_fixture(path: &Path, body_xml: &str) -> Result<()> {
    let document = format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" "#,
            r#"xmlns:m="http://schemas.openxmlformats.org/officeDocument/2006/math">"#,
            r#"<w:body>{}</w:body></w:document>"#
        ),
        body_xml
    );

    let file = File::create(path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    zip.start_file("[Content_Types].xml", options)?;
    zip.write_all(CONTENT_TYPES.as_bytes())?;
    zip.start_file("word/document.xml", options)?;
    zip.write_all(document.as_bytes())?;
    zip.finish()?;
    Ok(())
}

/// Built-in sample exams written by [`TestExams::setup`].
#[derive(Copy, Clone, Debug, Display)]
pub enum BuiltinExam {
    /// Headings, inline labels, a forced line break layout and inline math.
    ArithmeticBasics,
    /// One option per paragraph, answers given as option text.
    WorldCapitals,
    /// A question written inside a table cell.
    TabledQuestion,
}

impl BuiltinExam {
    pub const ALL: [BuiltinExam; 3] = [
        BuiltinExam::ArithmeticBasics,
        BuiltinExam::WorldCapitals,
        BuiltinExam::TabledQuestion,
    ];

    pub fn filename(&self) -> &'static str {
        match self {
            BuiltinExam::ArithmeticBasics => "arithmetic_basics.docx",
            BuiltinExam::WorldCapitals => "world_capitals.docx",
            BuiltinExam::TabledQuestion => "tabled_question.docx",
        }
    }

    pub fn body_xml(&self) -> String {
        match self {
            BuiltinExam::ArithmeticBasics => [
                paragraph_xml("Paper 1"),
                paragraph_xml("Unique Questions with Answers and Explanations"),
                paragraph_xml(""),
                paragraph_xml(
                    "1. What is 2+2? Options: (a) 3 (b) 4 (c) 5 (d) 6 Answer: (b) Explanation: Basic addition.",
                ),
                paragraph_xml("---"),
                paragraph_xml("2. What is 3x3?\na) 6\nb) 9\nc) 12\nd) 3\nAnswer: b"),
                paragraph_xml(""),
                math_paragraph_xml("3. Solve ", "x+1=2", " for x. (a) 1 (b) 2 Ans: a"),
            ]
            .join(""),
            BuiltinExam::WorldCapitals => [
                paragraph_xml("What is the capital of France?"),
                paragraph_xml("(a) Paris"),
                paragraph_xml("(b) London"),
                paragraph_xml("(c) Rome"),
                paragraph_xml("(d) Berlin"),
                paragraph_xml("Answer: Paris"),
                paragraph_xml("***"),
                paragraph_xml("What is the capital of Italy?"),
                paragraph_xml("a) Paris"),
                paragraph_xml("b) Rome"),
                paragraph_xml("Correct option: Rome"),
            ]
            .join(""),
            BuiltinExam::TabledQuestion => [
                paragraph_xml("Questions on Biology"),
                table_xml(&[
                    "Which gas do plants absorb? (a) Oxygen (b) Carbon dioxide (c) Nitrogen (d) Helium",
                    "Answer: (b)",
                ]),
            ]
            .join(""),
        }
    }
}

/// Sample exams written to a temporary directory that is removed on drop.
#[derive(Debug)]
pub struct TestExams {
    pub tmp_dir: TempDir,
}

impl TestExams {
    pub fn setup() -> Result<TestExams> {
        let tmp_dir = TempDir::new()?;
        for exam in BuiltinExam::ALL {
            write_docx_fixture(&tmp_dir.path().join(exam.filename()), &exam.body_xml())?;
            tracing::info!("Prepared sample exam {} ({})", exam, exam.filename());
        }
        Ok(TestExams { tmp_dir })
    }

    pub fn path(&self, exam: BuiltinExam) -> PathBuf {
        self.tmp_dir.path().join(exam.filename())
    }
}
