use std::time::Instant;

use crate::cleaner;
use crate::config::FormatterConfig;
use crate::converter;
use crate::error::Result;
use crate::extracter::{self, ExtractedFields};
use crate::llm;
use crate::models::{
    preview, Block, OptionLabel, ParseOutcome, ParseTrace, Question, RAW_PREVIEW_CHARS,
};


/// Splits the paragraph stream into blocks.
///
/// Blank paragraphs and separator paragraphs ("---", "***") close the open block and are
/// never part of one. Other paragraphs are kept verbatim and in order. Consecutive
/// delimiters never produce empty blocks.
///
/// # Arguments
///
/// * `paragraphs` - Paragraphs in document order.
///
/// # Returns
///
/// The blocks, indexed from zero in stream order.
pub fn segment(paragraphs: &[String]) -> Vec<Block> {
    let (mut blocks, mut open) = paragraphs.iter().fold(
        (Vec::<Block>::new(), Vec::<String>::new()),
        |(mut blocks, mut open), paragraph| {
            let cleaned = cleaner::normalize(paragraph);
            if cleaned.is_empty() || cleaner::is_separator(&cleaned) {
                close_block(&mut blocks, &mut open);
            } else {
                open.push(paragraph.clone());
            }
            (blocks, open)
        },
    );
    close_block(&mut blocks, &mut open);
    blocks
}

fn close_block(blocks: &mut Vec<Block>, open: &mut Vec<String>) {
    if !open.is_empty() {
        blocks.push(Block::new(blocks.len(), std::mem::take(open)));
    }
}

/// Builds the question record and its trace, or `None` for a block with no content.
///
/// # Arguments
///
/// * `block_index` - Index of the source block.
/// * `fields` - Fields recovered from the block.
/// * `answer` - The resolved answer label.
/// * `assumed` - Whether `answer` is the default.
/// * `raw_block` - The untouched block text.
pub fn assemble(
    block_index: usize,
    fields: ExtractedFields,
    answer: OptionLabel,
    assumed: bool,
    raw_block: String,
) -> Option<(Question, ParseTrace)> {
    if fields.question.is_empty() && fields.options.iter().all(String::is_empty) {
        tracing::debug!(
            "Discarded block {} without question or options: {:?}",
            block_index,
            preview(&raw_block, 60)
        );
        return None;
    }

    let trace = ParseTrace {
        block_index,
        raw_preview: preview(&raw_block, RAW_PREVIEW_CHARS),
        split_strategy: fields.split_strategy,
        pair_strategy: fields.pair_strategy,
        found_options: fields.options.clone(),
        raw_answer_text: fields.raw_answer_text,
        final_answer: answer,
        assumed,
    };
    let question = Question {
        question: fields.question,
        options: fields.options,
        answer,
        assumed,
        explanation: fields.explanation,
        raw_block,
    };
    Some((question, trace))
}

/// Normalized block paragraphs with leading headings removed.
///
/// Empty when the block holds nothing but headings.
pub fn block_body(block: &Block) -> Vec<String> {
    let cleaned: Vec<String> = block.paragraphs.iter().map(|p| cleaner::normalize(p)).collect();
    cleaner::strip_leading_headings(&cleaned).to_vec()
}

/// Runs heading removal, extraction, answer resolution and assembly on one block.
pub fn parse_block(block: &Block) -> Option<(Question, ParseTrace)> {
    let body = block_body(block);
    if body.is_empty() {
        tracing::debug!(
            "Discarded heading-only block {}: {:?}",
            block.index,
            preview(&block.get_text(), 60)
        );
        return None;
    }

    let fields = extracter::extract(&body);
    let (answer, assumed) = extracter::resolve_answer(
        &fields.options,
        fields.answer_letter,
        fields.raw_answer_text.as_deref(),
    );
    tracing::debug!(
        "Block {}: split={} pairs={} answer={} assumed={}",
        block.index,
        fields.split_strategy,
        fields.pair_strategy,
        answer,
        assumed
    );
    assemble(block.index, fields, answer, assumed, block.get_text())
}

/// Parses a paragraph stream into questions with the heuristic extractor.
///
/// Never fails: ambiguous blocks are resolved with defaults and reported as warnings,
/// and blocks without content are skipped.
///
/// # Arguments
///
/// * `paragraphs` - Paragraphs in document order; forced line breaks as `\n`.
/// * `verbose` - Log pipeline milestones.
///
/// # Returns
///
/// The questions in block order with their traces and warnings.
pub fn parse_paragraphs(paragraphs: &[String], verbose: bool) -> ParseOutcome {
    let time = Instant::now();

    let blocks = segment(paragraphs);
    if verbose {
        tracing::info!(
            "Segmented {} paragraphs into {} blocks in {:.2}s",
            paragraphs.len(),
            blocks.len(),
            time.elapsed().as_secs_f64()
        );
    }

    let records: Vec<(Question, ParseTrace)> = blocks.iter().filter_map(parse_block).collect();
    let outcome = ParseOutcome::from_records(records);
    if verbose {
        tracing::info!(
            "Extracted {} questions from {} blocks in {:.2}s",
            outcome.questions.len(),
            blocks.len(),
            time.elapsed().as_secs_f64()
        );
        for warning in outcome.warnings.iter() {
            tracing::warn!("{}", warning);
        }
    }
    outcome
}

/// Reads the configured input document and parses it.
///
/// Uses the LLM backend when `config.use_llm` is set, the heuristic extractor otherwise.
///
/// # Errors
///
/// `QuizError::DocumentRead` when the input cannot be read, and `QuizError::Llm` when the
/// LLM backend was requested but is not available.
pub async fn parse_document(config: &FormatterConfig, verbose: bool) -> Result<ParseOutcome> {
    let time = Instant::now();
    if verbose {
        tracing::info!("Parsing document: {}", config.input_path.display());
    }

    let paragraphs = converter::read_paragraphs(&config.input_path)?;
    if verbose {
        tracing::info!(
            "Read {} paragraphs in {:.2}s",
            paragraphs.len(),
            time.elapsed().as_secs_f64()
        );
    }

    let outcome = if config.use_llm {
        let blocks = segment(&paragraphs);
        llm::parse_blocks_with_llm(&blocks, config, verbose).await?
    } else {
        parse_paragraphs(&paragraphs, verbose)
    };

    if verbose {
        tracing::info!(
            "Finished Parsing in {:.2}s ({} questions, {} warnings)",
            time.elapsed().as_secs_f64(),
            outcome.questions.len(),
            outcome.warnings.len()
        );
    }
    Ok(outcome)
}

/// Writes the formatted document and, when configured, the debug log.
///
/// A debug log that cannot be written is logged and otherwise ignored.
///
/// # Errors
///
/// `QuizError::OutputWrite` when the formatted document cannot be saved.
pub fn save_outcome(outcome: &ParseOutcome, config: &FormatterConfig, verbose: bool) -> Result<()> {
    converter::write_docx(&outcome.questions, &config.output_path)?;
    if verbose {
        tracing::info!(
            "Saved {} questions to {}",
            outcome.questions.len(),
            config.output_path.display()
        );
    }

    if let Some(path) = &config.debug_log_path {
        match converter::write_debug_log(&outcome.traces, path) {
            Ok(()) => {
                if verbose {
                    tracing::info!("Saved parse trace to {}", path.display());
                }
            }
            Err(e) => tracing::warn!("Failed to write debug log: {}", e),
        }
    }
    Ok(())
}

/// Serializes questions as a pretty-printed JSON array.
pub fn questions2json(questions: &[Question]) -> String {
    serde_json::to_string_pretty(questions).unwrap_or_else(|_| "[]".to_string())
}
