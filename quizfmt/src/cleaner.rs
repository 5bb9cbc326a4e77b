//! Text cleaning and paragraph classification module.
//!
//! This module provides functionality for:
//! - Normalizing raw paragraph text (Unicode composition, invisible marks, whitespace)
//! - Detecting separator paragraphs that divide questions
//! - Detecting heading/noise paragraphs such as "Paper 1" or "Unique Questions"

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Zero-width space, non-joiner and joiner.
const INVISIBLE_MARKS: &[char] = &['\u{200B}', '\u{200C}', '\u{200D}'];

/// A paragraph made only of dashes, em/en-dashes, asterisks or underscores.
static SEPARATOR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-—–*_]+\s*$").unwrap());

/// Pre-compiled heading patterns, matched against the lower-cased trimmed line.
/// Matches patterns like:
/// - "Unique Questions with Answers and Explanations"
/// - "Paper 3", "PAPER12"
/// - "Selected Questions with Answers"
/// - "Questions on Thermodynamics"
/// - "Index", "Contents", "Table of Contents"
static HEADING_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"^unique questions").unwrap(),
        Regex::new(r"^paper\s*\d+").unwrap(),
        Regex::new(r"^selected questions").unwrap(),
        Regex::new(r"^questions? on\b").unwrap(),
        Regex::new(r"^(?:table of )?contents\s*:?$").unwrap(),
        Regex::new(r"^index\s*:?$").unwrap(),
    ]
});

/// Phrases that mark a heading wherever they appear in the line.
const HEADING_PHRASES: &[&str] = &["unique questions", "answers and explanations"];

/// Normalizes a paragraph or field.
///
/// Removes zero-width marks, applies NFC, turns CR/CRLF into LF, collapses horizontal
/// whitespace to single spaces (trimming each line), keeps at most one blank line in a
/// row and trims the result. The function is idempotent.
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let composed: String =
        text.chars().filter(|c| !INVISIBLE_MARKS.contains(c)).nfc().collect();
    let unified = composed.replace("\r\n", "\n").replace('\r', "\n");

    let mut lines: Vec<String> = Vec::new();
    for line in unified.split('\n') {
        let collapsed = line.split_whitespace().collect::<Vec<&str>>().join(" ");
        // at most one blank line in a row
        if collapsed.is_empty() && lines.last().is_some_and(|l| l.is_empty()) {
            continue;
        }
        lines.push(collapsed);
    }
    lines.join("\n").trim().to_string()
}

/// [`normalize`] for optional input; `None` yields an empty string.
pub fn normalize_opt(text: Option<&str>) -> String {
    text.map(normalize).unwrap_or_default()
}

/// `true` for empty or whitespace-only paragraphs.
pub fn is_blank(paragraph: &str) -> bool {
    paragraph.trim().is_empty()
}

/// `true` for paragraphs like "-----", "———" or "***".
pub fn is_separator(paragraph: &str) -> bool {
    SEPARATOR_PATTERN.is_match(paragraph.trim())
}

/// Checks if a line is a document heading rather than question content.
///
/// # Arguments
///
/// * `line` - The paragraph text to check.
///
/// # Returns
///
/// `true` if the line starts with a heading phrase (e.g., "Paper 2", "Unique Questions")
/// or contains one of the heading phrases anywhere.
pub fn is_heading(line: &str) -> bool {
    let lowered = line.trim().to_lowercase();
    if lowered.is_empty() {
        return false;
    }
    if HEADING_PATTERNS.iter().any(|re| re.is_match(&lowered)) {
        return true;
    }
    HEADING_PHRASES.iter().any(|phrase| lowered.contains(phrase))
}

/// Drops heading paragraphs from the front of a block, returning what is left.
pub fn strip_leading_headings(paragraphs: &[String]) -> &[String] {
    let skip = paragraphs.iter().take_while(|p| is_heading(p)).count();
    &paragraphs[skip..]
}
