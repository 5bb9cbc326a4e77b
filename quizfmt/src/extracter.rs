//! Field extraction for question blocks.
//!
//! A block is flattened into one string and fields are peeled off its end in a fixed
//! order: explanation, then answer, then the options. Every step is a plain function
//! over the remaining text; where several conventions exist they are tried as an
//! ordered chain and the first that matches wins. Nothing here can fail: a field that
//! cannot be found is left empty and resolved by later defaults.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::cleaner::normalize;
use crate::models::{OptionLabel, PairStrategy, SplitStrategy};

/// "Explanation", "Explanatory" or "Solution", with an optional ":"/"-" delimiter.
static EXPLANATION_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(explanation|explanatory|solution)\b\s*([:\-])?").unwrap()
});

/// Answer labels. "Correct option" comes first so it wins over a bare "Correct".
static ANSWER_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(correct\s+option|answer|ans|correct|key)\b\s*([:\-])?").unwrap()
});

/// "Option"/"Options" label in front of the option list.
static OPTIONS_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(options?)\b\s*([:\-])?").unwrap());

/// An answer that names a letter on its own or marked by punctuation: "b", "(b)", "[c] Rome",
/// "B.", "d)", "a:", "Option B".
static ANSWER_LETTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:option\s*([a-d])\b|[\(\[]([a-d])[\)\]]|([a-d])[\)\]\.:]|([a-d])$)").unwrap()
});

/// A letter followed by more text, as in "b because 2+2=4". Also matches "a whale", so it
/// is only consulted after the options were looked up in the answer text.
static LEADING_LETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^([a-d])\s+\S").unwrap());

/// Candidate option labels: "(a)", "[b]" or "c)", "d.", "a]".
/// Boundary rules are checked in code because the regex engine has no lookaround.
static LABEL_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([\(\[])([A-Da-d])([\)\]])|([A-Da-d])([\)\]\.])").unwrap()
});

/// A paragraph that starts with an option label: "(a) Paris", "b) London", "c Rome".
static PARAGRAPH_OPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*(?:[\(\[]([A-Da-d])[\)\]\.]?|([A-Da-d])[\)\]\.]|([A-Da-d])\s)\s*(\S.*)$")
        .unwrap()
});

/// Bare label tokens for the last-resort option split.
static NAIVE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[A-Da-d][\)\.\]]\s*").unwrap());

/// Label words that are also everyday English and only count with a ":"/"-" after them.
const DELIMITED_ONLY: &[&str] = &["solution", "correct", "key"];

/// Fields recovered from one block.
///
/// # Fields
///
/// * `question` - Normalized question text.
/// * `options` - Four normalized options in a, b, c, d order.
/// * `options_text` - The raw text the options were read from.
/// * `raw_answer_text` - Text after the answer label, if a label was found.
/// * `answer_letter` - The answer letter when `raw_answer_text` names one directly.
/// * `explanation` - Normalized explanation text.
/// * `split_strategy` - How question and options were separated.
/// * `pair_strategy` - How the options text became four options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFields {
    pub question: String,
    pub options: [String; 4],
    pub options_text: String,
    pub raw_answer_text: Option<String>,
    pub answer_letter: Option<OptionLabel>,
    pub explanation: String,
    pub split_strategy: SplitStrategy,
    pub pair_strategy: PairStrategy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LabelShape {
    open: Option<char>,
    close: char,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LabelMatch {
    start: usize,
    end: usize,
    label: OptionLabel,
    shape: LabelShape,
}

/// Text handed to the question/options split strategies.
struct SplitInput<'a> {
    /// What is left of the block after explanation and answer were removed.
    text: &'a str,
    /// The block paragraphs, clipped to `text`.
    paragraphs: Vec<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Split {
    question: String,
    options_text: String,
}

type SplitFn = for<'a> fn(&SplitInput<'a>) -> Option<Split>;

/// Question/options split strategies in precedence order.
const SPLIT_CHAIN: [(SplitStrategy, SplitFn); 3] = [
    (SplitStrategy::OptionsLabel, split_at_options_label),
    (SplitStrategy::InlineLabels, split_at_inline_label),
    (SplitStrategy::SeparateParagraphs, split_separate_paragraphs),
];

fn first_char(text: &str) -> Option<char> {
    text.chars().next()
}

/// Finds the first label match that is usable: either it carries a delimiter or its
/// word is not in `DELIMITED_ONLY`. Returns (label start, label end).
fn find_field_label(re: &Regex, text: &str) -> Option<(usize, usize)> {
    re.captures_iter(text).find_map(|caps| {
        let whole = caps.get(0)?;
        let word = caps.get(1)?.as_str().to_lowercase();
        let delimited = caps.get(2).is_some();
        if delimited || !DELIMITED_ONLY.contains(&word.as_str()) {
            Some((whole.start(), whole.end()))
        } else {
            None
        }
    })
}

/// Step 1: everything after the first explanation label.
///
/// Returns the byte offset where the label starts and the explanation text.
pub fn peel_explanation(text: &str) -> Option<(usize, String)> {
    let (start, end) = find_field_label(&EXPLANATION_LABEL, text)?;
    Some((start, text[end..].trim().to_string()))
}

/// Step 2: the rest of the line after the first answer label.
///
/// Returns the byte offset where the label starts and the raw answer text.
pub fn peel_answer(text: &str) -> Option<(usize, String)> {
    let (start, end) = find_field_label(&ANSWER_LABEL, text)?;
    let rest = text[end..].trim_start();
    let line = rest.split(['\n', '\r']).next().unwrap_or_default();
    Some((start, line.trim().to_string()))
}

/// The answer letter when the raw answer text names one directly.
pub fn explicit_answer_letter(raw_answer_text: &str) -> Option<OptionLabel> {
    let caps = ANSWER_LETTER.captures(raw_answer_text.trim())?;
    let letter = caps.iter().skip(1).flatten().next()?;
    first_char(letter.as_str()).and_then(OptionLabel::from_char)
}

fn leading_answer_letter(raw_answer_text: &str) -> Option<OptionLabel> {
    let caps = LEADING_LETTER.captures(raw_answer_text.trim())?;
    first_char(caps.get(1)?.as_str()).and_then(OptionLabel::from_char)
}

/// All option labels in `text` that sit on a plausible boundary.
///
/// Bracketed labels ("(a)", "[b]") must not follow a letter or digit, so "f(a)" is not a
/// label. Suffix labels ("a)", "b.") must be surrounded by whitespace or the text edges.
fn find_labels(text: &str) -> Vec<LabelMatch> {
    LABEL_TOKEN
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let before = text[..whole.start()].chars().next_back();
            let after = text[whole.end()..].chars().next();

            if let (Some(open), Some(letter), Some(close)) = (caps.get(1), caps.get(2), caps.get(3)) {
                if before.is_some_and(|c| c.is_alphanumeric()) {
                    return None;
                }
                return Some(LabelMatch {
                    start: whole.start(),
                    end: whole.end(),
                    label: first_char(letter.as_str()).and_then(OptionLabel::from_char)?,
                    shape: LabelShape {
                        open: first_char(open.as_str()),
                        close: first_char(close.as_str())?,
                    },
                });
            }

            let letter = caps.get(4)?;
            let close = caps.get(5)?;
            let bounded_before = before.is_none_or(char::is_whitespace);
            let bounded_after = after.is_none_or(char::is_whitespace);
            if !bounded_before || !bounded_after {
                return None;
            }
            Some(LabelMatch {
                start: whole.start(),
                end: whole.end(),
                label: first_char(letter.as_str()).and_then(OptionLabel::from_char)?,
                shape: LabelShape {
                    open: None,
                    close: first_char(close.as_str())?,
                },
            })
        })
        .collect()
}

fn starts_with_label(text: &str) -> bool {
    find_labels(text).first().is_some_and(|label| label.start == 0)
}

/// Step 3: an explicit "Options:" label splits question from options.
///
/// Without a delimiter the word only counts as a label when an option label follows it,
/// so "Which of the following options is true?" stays question text.
fn split_at_options_label(input: &SplitInput) -> Option<Split> {
    OPTIONS_LABEL.captures_iter(input.text).find_map(|caps| {
        let whole = caps.get(0)?;
        let rest = input.text[whole.end()..].trim_start();
        if caps.get(2).is_none() && !starts_with_label(rest) {
            return None;
        }
        Some(Split {
            question: input.text[..whole.start()].to_string(),
            options_text: rest.to_string(),
        })
    })
}

/// Step 3a: split in front of the first inline option label, preferring an "a" label.
fn split_at_inline_label(input: &SplitInput) -> Option<Split> {
    let labels = find_labels(input.text);
    let first = labels.iter().find(|l| l.label == OptionLabel::A).or(labels.first())?;
    Some(Split {
        question: input.text[..first.start].to_string(),
        options_text: input.text[first.start..].to_string(),
    })
}

/// Step 3b: options written one per paragraph after the question paragraph.
fn split_separate_paragraphs(input: &SplitInput) -> Option<Split> {
    let (question, rest) = input.paragraphs.split_first()?;
    let lines: Vec<String> = rest
        .iter()
        .filter_map(|paragraph| {
            let caps = PARAGRAPH_OPTION.captures(paragraph)?;
            let letter = caps.get(1).or(caps.get(2)).or(caps.get(3))?;
            let label = first_char(letter.as_str()).and_then(OptionLabel::from_char)?;
            let text = caps.get(4)?.as_str().trim();
            Some(format!("({}) {}", label, text))
        })
        .collect();
    if lines.is_empty() {
        return None;
    }
    Some(Split {
        question: question.to_string(),
        options_text: lines.join(" "),
    })
}

/// Step 4: turns the options text into four options in a, b, c, d order.
///
/// Labels of the same shape as the first label delimit the option texts; the first
/// occurrence of a letter wins. Without any labels the text is split on bare "a)"
/// tokens as a last resort.
pub fn extract_option_pairs(options_text: &str) -> ([String; 4], PairStrategy) {
    let labels = find_labels(options_text);
    if let Some(first) = labels.first() {
        let kept: Vec<&LabelMatch> = labels.iter().filter(|l| l.shape == first.shape).collect();
        let mut texts: HashMap<OptionLabel, String> = HashMap::new();
        for (i, label) in kept.iter().enumerate() {
            let end = kept.get(i + 1).map_or(options_text.len(), |next| next.start);
            texts
                .entry(label.label)
                .or_insert_with(|| normalize(&options_text[label.end..end]));
        }
        let options = OptionLabel::ALL.map(|label| texts.remove(&label).unwrap_or_default());
        return (options, PairStrategy::LabelPairs);
    }

    let segments: Vec<String> = if NAIVE_TOKEN.is_match(options_text) {
        // the text in front of the first token is not an option
        NAIVE_TOKEN.split(options_text).skip(1).map(normalize).collect()
    } else {
        vec![normalize(options_text)]
    };
    let mut segments = segments.into_iter().filter(|s| !s.is_empty()).take(4);
    let options: [String; 4] = std::array::from_fn(|_| segments.next().unwrap_or_default());
    if options.iter().all(String::is_empty) {
        (options, PairStrategy::Empty)
    } else {
        (options, PairStrategy::NaiveSplit)
    }
}

/// Clips the paragraphs to the first `limit` bytes of their space-joined text.
fn clip_paragraphs(paragraphs: &[String], limit: usize) -> Vec<&str> {
    let mut clipped = Vec::new();
    let mut offset = 0;
    for paragraph in paragraphs {
        if offset >= limit {
            break;
        }
        let keep = (limit - offset).min(paragraph.len());
        clipped.push(paragraph.get(..keep).unwrap_or(paragraph.as_str()));
        offset += paragraph.len() + 1;
    }
    clipped
}

/// Extracts question, options, answer and explanation from a block's paragraphs.
///
/// # Arguments
///
/// * `paragraphs` - The block paragraphs, headings already removed.
///
/// # Returns
///
/// The recovered fields. Options always has four entries; missing fields are empty.
pub fn extract(paragraphs: &[String]) -> ExtractedFields {
    let joined = paragraphs.join(" ");
    let mut remaining = joined.trim_end();

    let mut explanation = String::new();
    if let Some((start, text)) = peel_explanation(remaining) {
        explanation = text;
        remaining = remaining[..start].trim_end();
    }

    let mut raw_answer_text = None;
    let mut answer_letter = None;
    if let Some((start, text)) = peel_answer(remaining) {
        answer_letter = explicit_answer_letter(&text);
        raw_answer_text = Some(text);
        remaining = remaining[..start].trim_end();
    }

    let input = SplitInput {
        text: remaining,
        paragraphs: clip_paragraphs(paragraphs, remaining.len()),
    };
    let (split_strategy, split) = SPLIT_CHAIN
        .iter()
        .find_map(|(strategy, split_fn)| split_fn(&input).map(|split| (*strategy, split)))
        .unwrap_or((
            SplitStrategy::Unsplit,
            Split {
                question: remaining.to_string(),
                options_text: String::new(),
            },
        ));

    let (options, pair_strategy) = extract_option_pairs(&split.options_text);

    ExtractedFields {
        question: normalize(&split.question),
        options,
        options_text: split.options_text,
        raw_answer_text,
        answer_letter,
        explanation: normalize(&explanation),
        split_strategy,
        pair_strategy,
    }
}

/// Resolves the correct option.
///
/// An explicit letter wins. Otherwise the first option (a before b before c before d)
/// whose text appears inside the raw answer text is chosen. Failing that, a letter at the
/// start of the raw text ("b because ...") is used. With none of these, the answer
/// defaults to `a` and is flagged as assumed.
///
/// # Returns
///
/// The answer label and whether it was assumed.
pub fn resolve_answer(
    options: &[String; 4],
    answer_letter: Option<OptionLabel>,
    raw_answer_text: Option<&str>,
) -> (OptionLabel, bool) {
    if let Some(letter) = answer_letter {
        return (letter, false);
    }
    let raw = normalize(raw_answer_text.unwrap_or_default()).to_lowercase();
    if !raw.is_empty() {
        for (label, option) in OptionLabel::ALL.iter().zip(options.iter()) {
            if !option.is_empty() && raw.contains(&option.to_lowercase()) {
                return (*label, false);
            }
        }
    }
    match raw_answer_text.and_then(leading_answer_letter) {
        Some(letter) => (letter, false),
        None => (OptionLabel::A, true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraphs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn options(items: [&str; 4]) -> [String; 4] {
        items.map(|s| s.to_string())
    }

    #[test]
    fn test_extract_explicit_everything() {
        let fields = extract(&paragraphs(&[
            "1. What is 2+2? Options: (a) 3 (b) 4 (c) 5 (d) 6 Answer: (b) Explanation: Basic addition.",
        ]));
        assert_eq!(fields.question, "1. What is 2+2?");
        assert_eq!(fields.options, options(["3", "4", "5", "6"]));
        assert_eq!(fields.answer_letter, Some(OptionLabel::B));
        assert_eq!(fields.raw_answer_text.as_deref(), Some("(b)"));
        assert_eq!(fields.explanation, "Basic addition.");
        assert_eq!(fields.split_strategy, SplitStrategy::OptionsLabel);
        assert_eq!(fields.pair_strategy, PairStrategy::LabelPairs);
    }

    #[test]
    fn test_explanation_is_peeled_before_answer() {
        let fields = extract(&paragraphs(&[
            "Pick one (a) x (b) y Explanation: the Answer: b would be wrong",
        ]));
        assert_eq!(fields.explanation, "the Answer: b would be wrong");
        assert_eq!(fields.raw_answer_text, None);
        assert_eq!(fields.answer_letter, None);
        assert_eq!(fields.options, options(["x", "y", "", ""]));
    }

    #[test]
    fn test_explanation_labels() {
        assert_eq!(peel_explanation("Q Solution: because").unwrap().1, "because");
        assert_eq!(peel_explanation("Q Explanatory - note").unwrap().1, "note");
        assert_eq!(peel_explanation("Q explanation follows").unwrap().1, "follows");
        // "solution" without a delimiter is ordinary question text
        assert_eq!(peel_explanation("Which solution is acidic?"), None);
    }

    #[test]
    fn test_answer_labels() {
        assert_eq!(peel_answer("Q Ans: c").unwrap().1, "c");
        assert_eq!(peel_answer("Q Answer - Rome\nmore text").unwrap().1, "Rome");
        assert_eq!(peel_answer("Q Correct option: (d)").unwrap().1, "(d)");
        assert_eq!(peel_answer("Q Key: a").unwrap().1, "a");
        assert_eq!(peel_answer("What is the key idea here?"), None);
        assert_eq!(peel_answer("Which statement is correct?"), None);
        // "Ans" must be a whole word
        assert_eq!(peel_answer("Answering machines were invented when?"), None);
    }

    #[test]
    fn test_explicit_answer_letter() {
        assert_eq!(explicit_answer_letter("(b)"), Some(OptionLabel::B));
        assert_eq!(explicit_answer_letter("b"), Some(OptionLabel::B));
        assert_eq!(explicit_answer_letter("C. 5"), Some(OptionLabel::C));
        assert_eq!(explicit_answer_letter("[d] Berlin"), Some(OptionLabel::D));
        assert_eq!(explicit_answer_letter("Option A"), Some(OptionLabel::A));
        assert_eq!(explicit_answer_letter("d)"), Some(OptionLabel::D));
        assert_eq!(explicit_answer_letter("a: whale"), Some(OptionLabel::A));
        assert_eq!(explicit_answer_letter("a whale"), None);
        assert_eq!(explicit_answer_letter("C language"), None);
        assert_eq!(explicit_answer_letter("Optional"), None);
        assert_eq!(explicit_answer_letter("London"), None);
        assert_eq!(explicit_answer_letter("Berlin"), None);
        assert_eq!(explicit_answer_letter("All of the above"), None);
        assert_eq!(explicit_answer_letter(""), None);
    }

    #[test]
    fn test_options_label_takes_precedence_over_inline_labels() {
        let fields = extract(&paragraphs(&["Is (a) a label? Options: (a) yes (b) no"]));
        assert_eq!(fields.split_strategy, SplitStrategy::OptionsLabel);
        assert_eq!(fields.question, "Is (a) a label?");
        assert_eq!(fields.options, options(["yes", "no", "", ""]));
    }

    #[test]
    fn test_options_word_without_delimiter_is_question_text() {
        let fields = extract(&paragraphs(&[
            "Which of the following options is prime? (a) 4 (b) 6 (c) 7 (d) 9",
        ]));
        assert_eq!(fields.split_strategy, SplitStrategy::InlineLabels);
        assert_eq!(fields.question, "Which of the following options is prime?");
        assert_eq!(fields.options, options(["4", "6", "7", "9"]));
    }

    #[test]
    fn test_options_label_followed_by_label_without_delimiter() {
        let fields = extract(&paragraphs(&["Pick Options (a) 1 (b) 2"]));
        assert_eq!(fields.split_strategy, SplitStrategy::OptionsLabel);
        assert_eq!(fields.question, "Pick");
    }

    #[test]
    fn test_inline_labels_on_separate_paragraphs() {
        let fields = extract(&paragraphs(&[
            "What is the capital of France?",
            "a) Paris",
            "b) London",
            "c) Rome",
            "d) Berlin",
            "Answer: a",
        ]));
        assert_eq!(fields.split_strategy, SplitStrategy::InlineLabels);
        assert_eq!(fields.question, "What is the capital of France?");
        assert_eq!(fields.options, options(["Paris", "London", "Rome", "Berlin"]));
        assert_eq!(fields.answer_letter, Some(OptionLabel::A));
    }

    #[test]
    fn test_inline_split_prefers_label_a() {
        let fields = extract(&paragraphs(&["Vitamin C. deficiency causes? A. scurvy B. rickets"]));
        assert_eq!(fields.question, "Vitamin C. deficiency causes?");
        assert_eq!(fields.options, options(["scurvy", "rickets", "", ""]));
    }

    #[test]
    fn test_function_notation_is_not_a_label() {
        let fields = extract(&paragraphs(&["If f(a) = 2, find f(b). (a) 1 (b) 2"]));
        assert_eq!(fields.question, "If f(a) = 2, find f(b).");
        assert_eq!(fields.options, options(["1", "2", "", ""]));
    }

    #[test]
    fn test_separate_paragraph_options_without_punctuation() {
        let fields = extract(&paragraphs(&[
            "Which is the largest planet?",
            "a Jupiter",
            "b Saturn",
            "Some note",
            "c Earth",
        ]));
        assert_eq!(fields.split_strategy, SplitStrategy::SeparateParagraphs);
        assert_eq!(fields.question, "Which is the largest planet?");
        assert_eq!(fields.options, options(["Jupiter", "Saturn", "Earth", ""]));
    }

    #[test]
    fn test_separate_paragraphs_are_clipped_at_the_answer() {
        let fields = extract(&paragraphs(&[
            "Which is the largest planet?",
            "a Jupiter",
            "b Saturn",
            "Ans: a Jupiter",
        ]));
        assert_eq!(fields.options, options(["Jupiter", "Saturn", "", ""]));
        assert_eq!(fields.raw_answer_text.as_deref(), Some("a Jupiter"));
        let resolved =
            resolve_answer(&fields.options, fields.answer_letter, fields.raw_answer_text.as_deref());
        assert_eq!(resolved, (OptionLabel::A, false));
    }

    #[test]
    fn test_answer_text_starting_with_a_letter_word() {
        let fields = extract(&paragraphs(&[
            "What is a mammal? (a) fish (b) a whale (c) a shark (d) a crab Answer: a whale",
        ]));
        assert_eq!(fields.answer_letter, None);
        let resolved =
            resolve_answer(&fields.options, fields.answer_letter, fields.raw_answer_text.as_deref());
        assert_eq!(resolved, (OptionLabel::B, false));

        let fields = extract(&paragraphs(&[
            "Which language has pointers? (a) C language (b) Java (c) Python (d) Rust Answer: C language",
        ]));
        assert_eq!(fields.answer_letter, None);
        let resolved =
            resolve_answer(&fields.options, fields.answer_letter, fields.raw_answer_text.as_deref());
        assert_eq!(resolved, (OptionLabel::A, false));
    }

    #[test]
    fn test_leading_letter_is_used_when_no_option_matches() {
        let opts = options(["3", "4", "5", "6"]);
        assert_eq!(resolve_answer(&opts, None, Some("b because 2+2 is four")), (OptionLabel::B, false));
        // an option found in the text wins over the leading letter
        assert_eq!(resolve_answer(&opts, None, Some("c 5")), (OptionLabel::C, false));
        assert_eq!(resolve_answer(&opts, None, Some("a 6")), (OptionLabel::D, false));
    }

    #[test]
    fn test_everyday_label_words_need_a_delimiter() {
        let fields = extract(&paragraphs(&["Q? (a) x (b) y Key b"]));
        assert_eq!(fields.raw_answer_text, None);
        assert_eq!(fields.options, options(["x", "y Key b", "", ""]));

        let fields = extract(&paragraphs(&["Q? (a) x (b) y Answer: b Solution because 2"]));
        assert_eq!(fields.explanation, "");
        assert_eq!(fields.raw_answer_text.as_deref(), Some("b Solution because 2"));
        let resolved =
            resolve_answer(&fields.options, fields.answer_letter, fields.raw_answer_text.as_deref());
        assert_eq!(resolved, (OptionLabel::B, false));

        let fields = extract(&paragraphs(&["Q? (a) x (b) y Key: b Solution - because 2"]));
        assert_eq!(fields.answer_letter, Some(OptionLabel::B));
        assert_eq!(fields.explanation, "because 2");
    }

    #[test]
    fn test_unsplit_block() {
        let fields = extract(&paragraphs(&["Describe photosynthesis in one sentence."]));
        assert_eq!(fields.split_strategy, SplitStrategy::Unsplit);
        assert_eq!(fields.pair_strategy, PairStrategy::Empty);
        assert_eq!(fields.question, "Describe photosynthesis in one sentence.");
        assert_eq!(fields.options, options(["", "", "", ""]));
    }

    #[test]
    fn test_label_shape_consistency() {
        let (opts, strategy) = extract_option_pairs("(a) Vitamin C. (b) Iron (c) Zinc");
        assert_eq!(strategy, PairStrategy::LabelPairs);
        assert_eq!(opts, options(["Vitamin C.", "Iron", "Zinc", ""]));
    }

    #[test]
    fn test_option_pairs_out_of_order_and_duplicates() {
        let (opts, _) = extract_option_pairs("(c) three (a) one (a) uno (d) four");
        assert_eq!(opts, options(["one", "", "three", "four"]));
    }

    #[test]
    fn test_option_pairs_bracket_and_uppercase() {
        let (opts, _) = extract_option_pairs("[A] alpha [B] beta [C] gamma [D] delta");
        assert_eq!(opts, options(["alpha", "beta", "gamma", "delta"]));
    }

    #[test]
    fn test_naive_split_fallback() {
        let (opts, strategy) = extract_option_pairs("5a)six b)seven");
        assert_eq!(strategy, PairStrategy::NaiveSplit);
        assert_eq!(opts, options(["six", "seven", "", ""]));

        let (opts, strategy) = extract_option_pairs("Paris, London");
        assert_eq!(strategy, PairStrategy::NaiveSplit);
        assert_eq!(opts, options(["Paris, London", "", "", ""]));

        let (opts, strategy) = extract_option_pairs("");
        assert_eq!(strategy, PairStrategy::Empty);
        assert_eq!(opts, options(["", "", "", ""]));
    }

    #[test]
    fn test_naive_split_keeps_first_four() {
        let (opts, _) = extract_option_pairs("x1a)p b)q c)r d)s a)t");
        assert_eq!(opts, options(["p", "q", "r", "s"]));
    }

    #[test]
    fn test_resolve_answer_explicit_letter() {
        let opts = options(["3", "4", "5", "6"]);
        assert_eq!(resolve_answer(&opts, Some(OptionLabel::C), Some("(c)")), (OptionLabel::C, false));
    }

    #[test]
    fn test_resolve_answer_by_containment() {
        let opts = options(["Paris", "London", "Rome", "Berlin"]);
        assert_eq!(resolve_answer(&opts, None, Some("London")), (OptionLabel::B, false));
        assert_eq!(resolve_answer(&opts, None, Some("it is  ROME")), (OptionLabel::C, false));
    }

    #[test]
    fn test_resolve_answer_tie_break_prefers_earlier_option() {
        let opts = options(["New York", "York", "", ""]);
        assert_eq!(resolve_answer(&opts, None, Some("York")), (OptionLabel::B, false));
        assert_eq!(resolve_answer(&opts, None, Some("New York")), (OptionLabel::A, false));
    }

    #[test]
    fn test_resolve_answer_fallback() {
        let opts = options(["Paris", "", "", ""]);
        assert_eq!(resolve_answer(&opts, None, None), (OptionLabel::A, true));
        assert_eq!(resolve_answer(&opts, None, Some("")), (OptionLabel::A, true));
        assert_eq!(resolve_answer(&opts, None, Some("Madrid")), (OptionLabel::A, true));
        // empty options never match
        let empty = options(["", "", "", ""]);
        assert_eq!(resolve_answer(&empty, None, Some("anything")), (OptionLabel::A, true));
    }
}
