use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumString};

/// Number of characters of raw block text kept in a `ParseTrace`.
pub const RAW_PREVIEW_CHARS: usize = 220;

/// Label of one of the four option slots.
///
/// The default label `A` doubles as the fallback answer when nothing in the source text
/// identifies the correct option.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OptionLabel {
    #[default]
    A,
    B,
    C,
    D,
}

impl OptionLabel {
    pub const ALL: [OptionLabel; 4] = [OptionLabel::A, OptionLabel::B, OptionLabel::C, OptionLabel::D];

    /// Position of the label inside a four-slot option array.
    pub fn index(self) -> usize {
        match self {
            OptionLabel::A => 0,
            OptionLabel::B => 1,
            OptionLabel::C => 2,
            OptionLabel::D => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<OptionLabel> {
        OptionLabel::ALL.get(index).copied()
    }

    /// Parses a single label letter, case-insensitively.
    pub fn from_char(c: char) -> Option<OptionLabel> {
        match c.to_ascii_lowercase() {
            'a' => Some(OptionLabel::A),
            'b' => Some(OptionLabel::B),
            'c' => Some(OptionLabel::C),
            'd' => Some(OptionLabel::D),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            OptionLabel::A => 'a',
            OptionLabel::B => 'b',
            OptionLabel::C => 'c',
            OptionLabel::D => 'd',
        }
    }
}

/// How the question text was separated from the options text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SplitStrategy {
    /// An explicit "Options:" label.
    OptionsLabel,
    /// The first inline option label such as "(a)" or "a.".
    InlineLabels,
    /// Labeled lines found in the paragraphs after the first one.
    SeparateParagraphs,
    /// No options could be located; everything is question text.
    Unsplit,
    /// Fields came back from the AI-assisted backend.
    Llm,
}

/// How the options text was turned into four option strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PairStrategy {
    /// Label/text pairs keyed by letter.
    LabelPairs,
    /// Fallback split on bare "a)" style tokens.
    NaiveSplit,
    /// Nothing usable; four empty options.
    Empty,
    /// Options came back from the AI-assisted backend.
    Llm,
}

/// A maximal run of non-blank, non-separator paragraphs: one candidate question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub index: usize,
    pub paragraphs: Vec<String>,
}

impl Block {
    pub fn new(index: usize, paragraphs: Vec<String>) -> Block {
        Block { index, paragraphs }
    }

    /// Paragraphs joined with a single space.
    pub fn get_text(&self) -> String {
        self.paragraphs.join(" ")
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }
}

/// One normalized multiple-choice question.
///
/// # Fields
///
/// * `question` - Normalized question text.
/// * `options` - Exactly four options in a, b, c, d order; unresolved slots are empty.
/// * `answer` - The correct option label.
/// * `assumed` - `true` when `answer` is the default rather than read from the source.
/// * `explanation` - Normalized explanation, possibly empty.
/// * `raw_block` - The source block text, kept for auditing only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
    pub options: [String; 4],
    pub answer: OptionLabel,
    pub assumed: bool,
    pub explanation: String,
    pub raw_block: String,
}

impl Question {
    pub fn option(&self, label: OptionLabel) -> &str {
        &self.options[label.index()]
    }

    pub fn is_correct(&self, label: OptionLabel) -> bool {
        self.answer == label
    }

    /// Number of non-empty options.
    pub fn option_count(&self) -> usize {
        self.options.iter().filter(|o| !o.is_empty()).count()
    }
}

/// Diagnostic record emitted alongside every surviving question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseTrace {
    pub block_index: usize,
    pub raw_preview: String,
    pub split_strategy: SplitStrategy,
    pub pair_strategy: PairStrategy,
    pub found_options: [String; 4],
    pub raw_answer_text: Option<String>,
    pub final_answer: OptionLabel,
    pub assumed: bool,
}

/// Non-blocking issue a caller may want a human to confirm before writing output.
///
/// Question numbers are 1-based positions in the produced question list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseWarning {
    AssumedAnswer { question_number: usize },
    MissingOptions { question_number: usize, found: usize },
    LlmFallback { block_index: usize, reason: String },
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseWarning::AssumedAnswer { question_number } => {
                write!(f, "Q{}: assumed answer (A).", question_number)
            }
            ParseWarning::MissingOptions { question_number, .. } => {
                write!(f, "Q{}: fewer than 4 options (padded empty).", question_number)
            }
            ParseWarning::LlmFallback { block_index, reason } => {
                write!(f, "Block {}: AI parsing failed, used heuristics ({}).", block_index, reason)
            }
        }
    }
}

/// Result of one parse pass over a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOutcome {
    pub questions: Vec<Question>,
    pub traces: Vec<ParseTrace>,
    pub warnings: Vec<ParseWarning>,
}

impl ParseOutcome {
    /// Builds an outcome from assembled records, deriving the per-question warnings.
    pub fn from_records(records: Vec<(Question, ParseTrace)>) -> ParseOutcome {
        let (questions, traces): (Vec<Question>, Vec<ParseTrace>) = records.into_iter().unzip();
        let warnings = question_warnings(&questions);
        ParseOutcome {
            questions,
            traces,
            warnings,
        }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Warnings derived from the questions themselves, in question order.
pub fn question_warnings(questions: &[Question]) -> Vec<ParseWarning> {
    let mut warnings = Vec::new();
    for (i, question) in questions.iter().enumerate() {
        if question.assumed {
            warnings.push(ParseWarning::AssumedAnswer {
                question_number: i + 1,
            });
        }
        if question.options.iter().any(|o| o.trim().is_empty()) {
            warnings.push(ParseWarning::MissingOptions {
                question_number: i + 1,
                found: question.option_count(),
            });
        }
    }
    warnings
}

/// First `max_chars` characters of `text`.
pub fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
