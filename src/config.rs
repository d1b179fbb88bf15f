//! Configuration types for extraction and question answering.
//!
//! Two independent configs, each with a builder:
//!
//! * [`ExtractionConfig`]: how a PDF becomes a line stream and paragraphs.
//!   No network or API key involved (except URL downloads).
//! * [`QueryConfig`]: how questions are sent to the LLM provider.
//!
//! Splitting them lets `pdfsearch extract` run without any provider setup and
//! lets callers ask many questions over one extraction.

use crate::error::PdfSearchError;
use crate::pipeline::lines::BaselineMatch;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Default model when a provider is named but no model is given.
pub const DEFAULT_MODEL: &str = "gpt-4.1-nano";

// ── Extraction ───────────────────────────────────────────────────────────

/// Configuration for turning a PDF into paragraphs.
///
/// # Example
/// ```rust
/// use edgequake_pdfsearch::{ExtractionConfig, PageJoin, PageSelection};
///
/// let config = ExtractionConfig::builder()
///     .pages(PageSelection::Range(1, 3))
///     .page_join(PageJoin::BlankLine)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Page selection. Default: All pages.
    pub pages: PageSelection,

    /// How page texts are joined into the document line stream. Default: [`PageJoin::LineBreak`].
    pub page_join: PageJoin,

    /// Baseline comparison used by line reconstruction. Default: [`BaselineMatch::Exact`].
    pub baseline_match: BaselineMatch,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Documents processed at once by [`crate::extract::extract_batch`]. Default: 4.
    pub concurrency: usize,

    /// Optional per-page progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            password: None,
            pages: PageSelection::default(),
            page_join: PageJoin::default(),
            baseline_match: BaselineMatch::default(),
            download_timeout_secs: 120,
            concurrency: 4,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("pages", &self.pages)
            .field("page_join", &self.page_join)
            .field("baseline_match", &self.baseline_match)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("concurrency", &self.concurrency)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ExtractionProgressCallback>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn pages(mut self, selection: PageSelection) -> Self {
        self.config.pages = selection;
        self
    }

    pub fn page_join(mut self, join: PageJoin) -> Self {
        self.config.page_join = join;
        self
    }

    pub fn baseline_match(mut self, matching: BaselineMatch) -> Self {
        self.config.baseline_match = matching;
        self
    }

    /// Shorthand for `baseline_match(BaselineMatch::Tolerance(points))`.
    pub fn baseline_tolerance(mut self, points: f32) -> Self {
        self.config.baseline_match = BaselineMatch::Tolerance(points);
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, PdfSearchError> {
        let c = &self.config;
        if let BaselineMatch::Tolerance(points) = c.baseline_match {
            if !points.is_finite() || points < 0.0 {
                return Err(PdfSearchError::InvalidConfig(format!(
                    "Baseline tolerance must be a finite, non-negative number of points, got {}",
                    points
                )));
            }
        }
        if let PageSelection::Range(start, end) = c.pages {
            if start > end {
                return Err(PdfSearchError::InvalidConfig(format!(
                    "Page range {}-{} is reversed",
                    start, end
                )));
            }
        }
        if c.download_timeout_secs == 0 {
            return Err(PdfSearchError::InvalidConfig(
                "Download timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Query ────────────────────────────────────────────────────────────────

/// Configuration for answering questions over extracted paragraphs.
///
/// # Example
/// ```rust
/// use edgequake_pdfsearch::QueryConfig;
///
/// let config = QueryConfig::builder()
///     .model("gpt-4.1-mini")
///     .temperature(0.0)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct QueryConfig {
    /// LLM model identifier, e.g. "gpt-4.1-nano". If None, uses [`DEFAULT_MODEL`]
    /// or the provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    /// If None along with `provider`, the provider is auto-detected.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature. Default: 0.2.
    pub temperature: f32,

    /// Maximum tokens in the answer. Default: 1024.
    pub max_tokens: usize,

    /// Maximum retry attempts on a failed call. Default: 3.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds, doubled per attempt. Default: 500.
    pub retry_backoff_ms: u64,

    /// Per-call timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Optional system prompt sent ahead of the search prompt.
    pub system_prompt: Option<String>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.2,
            max_tokens: 1024,
            max_retries: 3,
            retry_backoff_ms: 500,
            api_timeout_secs: 60,
            system_prompt: None,
        }
    }
}

impl fmt::Debug for QueryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("system_prompt", &self.system_prompt.as_ref().map(String::len))
            .finish()
    }
}

impl QueryConfig {
    /// Create a new builder for `QueryConfig`.
    pub fn builder() -> QueryConfigBuilder {
        QueryConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`QueryConfig`].
#[derive(Debug)]
pub struct QueryConfigBuilder {
    config: QueryConfig,
}

impl QueryConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<QueryConfig, PdfSearchError> {
        let c = &self.config;
        if c.max_tokens == 0 {
            return Err(PdfSearchError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.api_timeout_secs == 0 {
            return Err(PdfSearchError::InvalidConfig(
                "API timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Specifies which pages of the PDF to extract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSelection {
    /// Extract all pages (default).
    #[default]
    All,
    /// Extract a single page (1-indexed).
    Single(usize),
    /// Extract a contiguous range of pages (1-indexed, inclusive).
    Range(usize, usize),
    /// Extract specific pages (1-indexed, deduplicated).
    Set(Vec<usize>),
}

impl PageSelection {
    /// Expand the selection into a sorted, deduplicated list of 0-indexed page numbers.
    pub fn to_indices(&self, total_pages: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = match self {
            PageSelection::All => (0..total_pages).collect(),
            PageSelection::Single(p) => {
                if *p >= 1 && *p <= total_pages {
                    vec![p - 1]
                } else {
                    vec![]
                }
            }
            PageSelection::Range(start, end) => {
                let s = (*start).max(1) - 1;
                let e = (*end).min(total_pages);
                (s..e).collect()
            }
            PageSelection::Set(pages) => pages
                .iter()
                .filter(|&&p| p >= 1 && p <= total_pages)
                .map(|p| p - 1)
                .collect(),
        };
        indices.sort_unstable();
        indices.dedup();
        indices
    }

    /// First requested page, for error reporting when nothing matched.
    pub(crate) fn first_requested(&self) -> usize {
        match self {
            PageSelection::All => 0,
            PageSelection::Single(p) => *p,
            PageSelection::Range(start, _) => *start,
            PageSelection::Set(pages) => pages.iter().copied().min().unwrap_or(0),
        }
    }
}

/// How page texts are joined into one document line stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageJoin {
    /// A single line break: paragraphs may continue across pages. (default)
    #[default]
    LineBreak,
    /// A blank line: every page boundary terminates the pending paragraph.
    BlankLine,
}

impl PageJoin {
    /// The literal separator inserted between consecutive pages.
    pub fn separator(&self) -> &'static str {
        match self {
            PageJoin::LineBreak => "\n",
            PageJoin::BlankLine => "\n\n",
        }
    }
}
