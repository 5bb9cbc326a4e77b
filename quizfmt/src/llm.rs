use anyhow::Result;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use openai_tools::chat::request::ChatCompletion;
use openai_tools::common::message::Message;
use openai_tools::common::role::Role;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::time::timeout;

use crate::cleaner::normalize;
use crate::config::FormatterConfig;
use crate::error::QuizError;
use crate::extracter::{explicit_answer_letter, resolve_answer, ExtractedFields};
use crate::models::{
    Block, OptionLabel, PairStrategy, ParseOutcome, ParseTrace, ParseWarning, Question,
    SplitStrategy,
};
use crate::parser;

const QUESTION_EXTRACTION_PROMPT: &str = r#"You are an exam question parser. The text below is one multiple-choice question copied from a document.

Extract:
- question: the question text without option labels
- options: exactly four option texts in order (a), (b), (c), (d), without their labels; use "" for missing options
- answer: the letter of the correct option ("a", "b", "c" or "d"), or "" if the text does not say
- explanation: the explanation or solution text, or ""

Return a JSON array with one object:
[{"question": "...", "options": ["...", "...", "...", "..."], "answer": "b", "explanation": "..."}]

Do not invent answers. Return ONLY the JSON array, no other text.

Question text:
"#;

/// Default model to use when OPENAI_API_MODEL is not set
const DEFAULT_MODEL: &str = "gpt-5.2";

/// Check if LLM processing is available (OPENAI_API_KEY is set)
pub fn is_llm_available() -> bool {
    std::env::var("OPENAI_API_KEY").is_ok()
}

/// Get the model ID to use for LLM calls.
/// Returns the value of OPENAI_API_MODEL environment variable, or DEFAULT_MODEL if not set.
pub fn get_model_id() -> String {
    std::env::var("OPENAI_API_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string())
}

/// One question as returned by the model. Every field may be missing or null.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LlmQuestion {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
}

/// Parse the model response into a question.
///
/// Accepts a JSON array (first element used) or a bare object, either clean or embedded
/// in surrounding prose.
fn parse_question_json(text: &str) -> Result<LlmQuestion> {
    fn from_json(json: &str) -> Option<LlmQuestion> {
        if let Ok(mut questions) = serde_json::from_str::<Vec<LlmQuestion>>(json) {
            if questions.is_empty() {
                return None;
            }
            return Some(questions.swap_remove(0));
        }
        serde_json::from_str::<LlmQuestion>(json).ok()
    }

    if let Some(question) = from_json(text.trim()) {
        return Ok(question);
    }

    for (open, close) in [('[', ']'), ('{', '}')] {
        if let (Some(start), Some(end)) = (text.find(open), text.rfind(close)) {
            if start < end {
                if let Some(question) = from_json(&text[start..=end]) {
                    return Ok(question);
                }
            }
        }
    }

    Err(anyhow::anyhow!("response is not a question object"))
}

/// Ask the model to split one block into question fields.
///
/// # Arguments
///
/// * `block_text` - The block paragraphs joined by newlines.
/// * `model_id` - Chat model to use.
pub async fn extract_question_llm(block_text: &str, model_id: &str) -> Result<LlmQuestion> {
    let prompt = format!("{}{}", QUESTION_EXTRACTION_PROMPT, block_text);
    let message = Message::from_string(Role::User, prompt);

    let mut chat = ChatCompletion::new();
    let response = chat
        .model_id(model_id)
        .messages(vec![message])
        .temperature(0.0)
        .chat()
        .await
        .map_err(|e| anyhow::anyhow!("LLM question extraction failed: {}", e))?;

    let text = response
        .choices
        .first()
        .and_then(|c| c.message.content.as_ref())
        .and_then(|c| c.text.as_ref())
        .map(|t| t.to_string())
        .unwrap_or_default();

    parse_question_json(&text)
}

/// Turn a model answer into extracted fields plus the resolved answer.
///
/// Options are normalized and padded or cut to four. An answer that is not an option
/// letter is matched against the option texts; without a usable answer the default
/// `a` is assumed.
pub fn llm_fields(question: LlmQuestion) -> (ExtractedFields, OptionLabel, bool) {
    let mut found = question.options.unwrap_or_default().into_iter();
    let options: [String; 4] =
        std::array::from_fn(|_| found.next().map(|o| normalize(&o)).unwrap_or_default());

    let raw_answer_text = question.answer.map(|a| a.trim().to_string()).filter(|a| !a.is_empty());
    let answer_letter = raw_answer_text.as_deref().and_then(explicit_answer_letter);
    let (answer, assumed) = resolve_answer(&options, answer_letter, raw_answer_text.as_deref());

    let fields = ExtractedFields {
        question: normalize(question.question.as_deref().unwrap_or_default()),
        options,
        options_text: String::new(),
        raw_answer_text,
        answer_letter,
        explanation: normalize(question.explanation.as_deref().unwrap_or_default()),
        split_strategy: SplitStrategy::Llm,
        pair_strategy: PairStrategy::Llm,
    };
    (fields, answer, assumed)
}

/// Parse blocks with the LLM backend.
///
/// Blocks are sent with at most `config.llm_concurrency` requests in flight; results keep
/// block order. A block whose request fails, times out, or returns unusable JSON is
/// parsed with the heuristic extractor instead and reported as an `LlmFallback` warning.
///
/// # Errors
///
/// `QuizError::Llm` when `OPENAI_API_KEY` is not set.
pub async fn parse_blocks_with_llm(
    blocks: &[Block],
    config: &FormatterConfig,
    verbose: bool,
) -> crate::error::Result<ParseOutcome> {
    if !is_llm_available() {
        return Err(QuizError::Llm("OPENAI_API_KEY is not set".to_string()));
    }
    let time = Instant::now();

    let pending: Vec<(&Block, String)> = blocks
        .iter()
        .filter_map(|block| {
            let body = parser::block_body(block);
            if body.is_empty() {
                tracing::debug!("Discarded heading-only block {}", block.index);
                None
            } else {
                Some((block, body.join("\n")))
            }
        })
        .collect();

    let pb = if verbose {
        let bar = ProgressBar::new(pending.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.green/blue} {pos:>7}/{len:7} {msg}")
        {
            bar.set_style(style.progress_chars("█▓▒░"));
        }
        bar
    } else {
        ProgressBar::hidden()
    };

    let limit = Duration::from_secs(config.llm_timeout_secs);
    let responses: Vec<(&Block, std::result::Result<LlmQuestion, String>)> =
        stream::iter(pending.into_iter().map(|(block, text)| {
            let pb = pb.clone();
            let model_id = config.llm_model.clone();
            async move {
                let response = match timeout(limit, extract_question_llm(&text, &model_id)).await {
                    Ok(Ok(question)) => Ok(question),
                    Ok(Err(e)) => Err(e.to_string()),
                    Err(_) => Err(format!("timed out after {}s", limit.as_secs())),
                };
                pb.inc(1);
                (block, response)
            }
        }))
        .buffered(config.llm_concurrency.max(1))
        .collect()
        .await;
    pb.finish_and_clear();

    let mut records: Vec<(Question, ParseTrace)> = Vec::new();
    let mut fallbacks: Vec<ParseWarning> = Vec::new();
    for (block, response) in responses {
        match response {
            Ok(question) => {
                let (fields, answer, assumed) = llm_fields(question);
                let raw_block = block.get_text();
                records.extend(parser::assemble(block.index, fields, answer, assumed, raw_block));
            }
            Err(reason) => {
                tracing::warn!(
                    "Block {}: LLM parsing failed, using heuristics: {}",
                    block.index,
                    reason
                );
                records.extend(parser::parse_block(block));
                fallbacks.push(ParseWarning::LlmFallback {
                    block_index: block.index,
                    reason,
                });
            }
        }
    }

    if verbose {
        tracing::info!(
            "LLM parsing complete in {:.2}s ({} questions, {} fallbacks)",
            time.elapsed().as_secs_f64(),
            records.len(),
            fallbacks.len()
        );
    }
    let mut outcome = ParseOutcome::from_records(records);
    outcome.warnings.extend(fallbacks);
    Ok(outcome)
}
