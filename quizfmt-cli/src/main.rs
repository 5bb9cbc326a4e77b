pub mod loggers;

use crate::loggers::init_logger;
use anyhow::{Context, Result};
use clap::Parser;
use glob::glob;
use quizfmt::config::FormatterConfig;
use quizfmt::converter::write_questions_json;
use quizfmt::models::ParseOutcome;
use quizfmt::parser::{parse_document, save_outcome};
use std::path::{Path, PathBuf};

/// Number of warnings printed per file before the rest are summarized.
const SHOWN_WARNINGS: usize = 10;

/// Exit code when strict mode skipped a file because of warnings.
const EXIT_WARNINGS: i32 = 2;

#[derive(Parser, Debug)]
#[command(version, about, long_about=None)]
struct Args {
    /// Input document (.docx or plain text), or a glob such as "exams/*.docx"
    #[arg(short, long)]
    input: String,

    /// Output .docx (single input only); defaults to <stem>_Formatted.docx
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Parse trace (JSON Lines); defaults to debug_log.jsonl next to the output
    #[arg(long)]
    debug_log: Option<PathBuf>,

    #[arg(long, default_value_t = false, conflicts_with = "debug_log")]
    no_debug_log: bool,

    /// Also write the questions as JSON next to the output
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Parse blocks with the LLM backend (requires OPENAI_API_KEY)
    #[arg(long, default_value_t = false)]
    llm: bool,

    /// Do not write files that produced warnings
    #[arg(long, default_value_t = false)]
    strict: bool,

    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileStatus {
    Saved,
    Skipped,
    Failed,
}

fn resolve_inputs(pattern: &str) -> Result<Vec<PathBuf>> {
    if Path::new(pattern).exists() {
        return Ok(vec![PathBuf::from(pattern)]);
    }
    let mut inputs = Vec::new();
    for entry in glob(pattern).with_context(|| format!("Invalid input pattern: {}", pattern))? {
        inputs.push(entry?);
    }
    inputs.sort();
    Ok(inputs)
}

fn build_config(args: &Args, input: &Path) -> FormatterConfig {
    let mut config = FormatterConfig::new(input);
    if let Some(out) = &args.out {
        config = config.with_output(out.clone());
    }
    if args.no_debug_log {
        config.debug_log_path = None;
    } else if let Some(debug_log) = &args.debug_log {
        config.debug_log_path = Some(debug_log.clone());
    }
    config.use_llm = args.llm;
    config
}

fn print_warnings(input: &Path, outcome: &ParseOutcome) {
    if !outcome.has_warnings() {
        return;
    }
    println!("{}: {} warning(s)", input.display(), outcome.warnings.len());
    for warning in outcome.warnings.iter().take(SHOWN_WARNINGS) {
        println!("  {}", warning);
    }
    if outcome.warnings.len() > SHOWN_WARNINGS {
        println!("  ... and {} more", outcome.warnings.len() - SHOWN_WARNINGS);
    }
}

async fn process(input: &Path, args: &Args) -> FileStatus {
    let config = build_config(args, input);

    let outcome = match parse_document(&config, args.verbose).await {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Error: couldn't parse {}: {}", input.display(), e);
            return FileStatus::Failed;
        }
    };
    print_warnings(input, &outcome);

    if args.strict && outcome.has_warnings() {
        eprintln!(
            "Skipped {}: {} warning(s) in strict mode",
            input.display(),
            outcome.warnings.len()
        );
        return FileStatus::Skipped;
    }

    if let Err(e) = save_outcome(&outcome, &config, args.verbose) {
        eprintln!("Error: parsed {} but couldn't save the output: {}", input.display(), e);
        return FileStatus::Failed;
    }
    if args.json {
        if let Err(e) = write_questions_json(&outcome.questions, &config.json_path()) {
            eprintln!("Error: parsed {} but couldn't save the JSON: {}", input.display(), e);
            return FileStatus::Failed;
        }
    }

    println!(
        "Saved {} question(s) from {} to {}",
        outcome.questions.len(),
        input.display(),
        config.output_path.display()
    );
    FileStatus::Saved
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(args.verbose).context("Failed to initialize logger")?;

    let inputs = resolve_inputs(&args.input)?;
    if inputs.is_empty() {
        eprintln!("File not found: {}", args.input);
        std::process::exit(1);
    }
    if inputs.len() > 1 && args.out.is_some() {
        anyhow::bail!("--out can only be used with a single input file");
    }

    let mut statuses = Vec::with_capacity(inputs.len());
    for input in inputs.iter() {
        statuses.push(process(input, &args).await);
    }
    if args.verbose && inputs.len() > 1 {
        let count = |status: FileStatus| statuses.iter().filter(|s| **s == status).count();
        tracing::info!(
            "Batch finished: {} saved, {} skipped, {} failed",
            count(FileStatus::Saved),
            count(FileStatus::Skipped),
            count(FileStatus::Failed)
        );
    }

    if statuses.contains(&FileStatus::Failed) {
        std::process::exit(1);
    }
    if statuses.contains(&FileStatus::Skipped) {
        std::process::exit(EXIT_WARNINGS);
    }
    Ok(())
}
