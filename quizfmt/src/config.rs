use rand::Rng;
use std::path::{Path, PathBuf};

/// Suffix appended to the input file stem to name the formatted output.
pub const OUTPUT_SUFFIX: &str = "_Formatted";

/// File name of the JSON Lines parse trace written next to the output.
pub const DEBUG_LOG_NAME: &str = "debug_log.jsonl";

/// Number of blocks sent to the LLM backend at the same time.
pub const DEFAULT_LLM_CONCURRENCY: usize = 4;

/// Per-block time limit for LLM requests.
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 60;

/// `FormatterConfig` is the configuration for converting one source document.
///
/// # Fields
///
/// * `input_path` - The source document (`.docx` or plain text).
/// * `output_path` - Where the formatted `.docx` is written.
/// * `debug_log_path` - Where the parse trace is written; `None` disables it.
/// * `use_llm` - Parse blocks with the LLM backend instead of the heuristics.
/// * `llm_model` - Model id passed to the chat API.
/// * `llm_concurrency` - Maximum number of blocks in flight at once.
/// * `llm_timeout_secs` - Time limit for a single block request.
///
/// # Methods
///
/// * `new` - Creates a config with output and debug-log paths derived from the input.
/// * `with_output` - Replaces the output path and moves the debug log next to it.
/// * `json_path` - Path of the optional JSON dump beside the output.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatterConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub debug_log_path: Option<PathBuf>,
    pub use_llm: bool,
    pub llm_model: String,
    pub llm_concurrency: usize,
    pub llm_timeout_secs: u64,
}

impl FormatterConfig {
    /// Creates a new `FormatterConfig` for `input_path`.
    ///
    /// The output defaults to `<stem>_Formatted.docx` in the input's directory and the
    /// debug log to `debug_log.jsonl` beside it. The model id comes from
    /// `OPENAI_API_MODEL` when set.
    ///
    /// # Arguments
    ///
    /// * `input_path` - The source document.
    ///
    /// # Returns
    ///
    /// A new `FormatterConfig` with the LLM backend disabled.
    pub fn new(input_path: impl Into<PathBuf>) -> FormatterConfig {
        let input_path = input_path.into();
        let output_path = default_output_path(&input_path);
        let debug_log_path = Some(sibling(&output_path, DEBUG_LOG_NAME));
        FormatterConfig {
            input_path,
            output_path,
            debug_log_path,
            use_llm: false,
            llm_model: crate::llm::get_model_id(),
            llm_concurrency: DEFAULT_LLM_CONCURRENCY,
            llm_timeout_secs: DEFAULT_LLM_TIMEOUT_SECS,
        }
    }

    pub fn with_output(mut self, output_path: impl Into<PathBuf>) -> FormatterConfig {
        self.output_path = output_path.into();
        if self.debug_log_path.is_some() {
            self.debug_log_path = Some(sibling(&self.output_path, DEBUG_LOG_NAME));
        }
        self
    }

    pub fn json_path(&self) -> PathBuf {
        self.output_path.with_extension("json")
    }
}

/// `<dir>/<stem>_Formatted.docx` for an input at `<dir>/<stem>.<ext>`.
pub fn default_output_path(input_path: &Path) -> PathBuf {
    let stem = input_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    sibling(input_path, &format!("{}{}.docx", stem, OUTPUT_SUFFIX))
}

fn sibling(path: &Path, file_name: &str) -> PathBuf {
    match path.parent() {
        Some(parent) => parent.join(file_name),
        None => PathBuf::from(file_name),
    }
}

/// A random, not yet existing path in the same directory as `path`.
///
/// Used to write a file completely before renaming it over the destination.
pub fn temp_sibling(path: &Path) -> PathBuf {
    let mut rng = rand::rng();
    let name = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    loop {
        let random_value = rng.random_range(10000..99999);
        let candidate = sibling(path, &format!(".{}.{}.tmp", name, random_value));
        if !candidate.exists() {
            return candidate;
        }
    }
}
