//! # Quiz Formatter (quizfmt)
//!
//! The `quizfmt` library turns loosely formatted multiple-choice questions, as they
//! appear in exam documents, into one uniform table per question.
//!
//! ## Quick Start
//!
//! ### Installation
//! To start using the `quizfmt` library, add it to your project's dependencies in the `Cargo.toml` file:
//!
//! ```bash
//! cargo add quizfmt
//! ```
//!
//! Then, import the necessary modules in your code:
//!
//! ```rust
//! extern crate quizfmt;
//! use quizfmt::parser;
//! ```
//!
//! ## Examples
//!
//! Parsing paragraphs that are already in memory:
//!
//! ```rust
//! use quizfmt::parser::parse_paragraphs;
//! use quizfmt::models::OptionLabel;
//!
//! let paragraphs = vec![
//!     "1. What is 2+2? Options: (a) 3 (b) 4 (c) 5 (d) 6 Answer: (b)".to_string(),
//! ];
//! let outcome = parse_paragraphs(&paragraphs, false);
//! assert_eq!(outcome.questions[0].answer, OptionLabel::B);
//! ```
//!
//! Converting a document on disk:
//!
//! ```rust,no_run
//! # use quizfmt::config::FormatterConfig;
//! # use quizfmt::parser::{parse_document, save_outcome};
//! # async fn try_main() -> Result<(), quizfmt::error::QuizError> {
//! let config = FormatterConfig::new("exam.docx");
//! let verbose = true;
//! let outcome = parse_document(&config, verbose).await?; // ParseOutcome
//! for warning in outcome.warnings.iter() {
//!     println!("{}", warning);
//! }
//! save_outcome(&outcome, &config, verbose)?; // exam_Formatted.docx + debug_log.jsonl
//! # Ok(())
//! # }
//! # #[tokio::main]
//! # async fn main() {
//! #    try_main().await.unwrap();
//! # }
//! ```
//!
//! ## Environment
//!
//! - `OPENAI_API_KEY`: enables the LLM backend (`FormatterConfig::use_llm`).
//! - `OPENAI_API_MODEL`: overrides the default chat model.
//!
//! ## Tests
//!
//! The library includes a set of tests to ensure its functionality. To run the tests, use the following command:
//!
//! ```sh
//! cargo test
//! ```

pub mod cleaner;
pub mod config;
pub mod converter;
pub mod error;
pub mod extracter;
pub mod llm;
pub mod models;
pub mod parser;
#[cfg(test)]
pub mod test_utils;
