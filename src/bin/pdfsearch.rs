//! CLI binary for edgequake-pdfsearch.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ExtractionConfig` / `QueryConfig` and prints results.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use edgequake_pdfsearch::{
    ask, extract, extract_to_file, inspect, ExtractionConfig, ExtractionOutput,
    ExtractionProgressCallback, PageJoin, PageSelection, ProgressCallback, QueryConfig,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress bar for page reading. Sized once the page selection is
/// known (`on_extraction_start`).
struct CliProgressCallback {
    bar: ProgressBar,
    lines: AtomicUsize,
}

impl CliProgressCallback {
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            lines: AtomicUsize::new(0),
        })
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_extraction_start(&self, total_pages: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} pages  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");
        self.bar.set_length(total_pages as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Reading");
    }

    fn on_page_start(&self, page_num: usize, _total_pages: usize) {
        self.bar.set_message(format!("page {page_num}"));
        self.bar.inc(1);
    }

    fn on_page_complete(&self, _page_num: usize, _total_pages: usize, line_count: usize) {
        self.lines.fetch_add(line_count, Ordering::SeqCst);
    }

    fn on_page_error(&self, page_num: usize, _total_pages: usize, error: String) {
        self.bar
            .println(format!("  {} Page {:>3}  {}", red("✗"), page_num, red(&error)));
    }

    fn on_extraction_complete(&self, total_pages: usize, paragraph_count: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} pages  {}  →  {} paragraphs",
            green("✔"),
            bold(&total_pages.to_string()),
            dim(&format!("{} lines", self.lines.load(Ordering::SeqCst))),
            bold(&paragraph_count.to_string()),
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Paragraphs to stdout (blank line between paragraphs)
  pdfsearch extract document.pdf

  # Paragraphs to a file, pages 1-5 only
  pdfsearch extract --pages 1-5 report.pdf -o report.txt

  # Full JSON (raw text, paragraphs, per-page text, metadata, stats)
  pdfsearch extract --json document.pdf > document.json

  # Treat every page break as a paragraph break
  pdfsearch extract --page-join blank slides.pdf

  # Ask a question about a PDF
  pdfsearch ask document.pdf "What is the warranty period?"

  # Ask over previously exported paragraphs (JSON array or extract --json output)
  pdfsearch ask --paragraphs document.json "Who signed the contract?"

  # Inspect PDF metadata (no API key needed)
  pdfsearch inspect document.pdf

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
  PDFIUM_LIB_PATH         Path to libpdfium (file or directory)
  RUST_LOG                Log filter, overrides --verbose/--quiet
"#;

/// Extract paragraph-structured text from PDFs and ask questions about it.
#[derive(Parser, Debug)]
#[command(
    name = "pdfsearch",
    version,
    about = "Extract paragraph-structured text from PDFs and ask questions about it",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "PDFSEARCH_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "PDFSEARCH_QUIET")]
    quiet: bool,

    /// Disable progress bar.
    #[arg(long, global = true, env = "PDFSEARCH_NO_PROGRESS")]
    no_progress: bool,

    /// HTTP download timeout in seconds.
    #[arg(long, global = true, env = "PDFSEARCH_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract paragraphs from a PDF.
    Extract(ExtractArgs),
    /// Answer a question from a PDF's paragraphs.
    Ask(AskArgs),
    /// Print PDF metadata only.
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
struct PdfArgs {
    /// Page selection: all, 5, 3-15, or 1,3,5,7.
    #[arg(long, env = "PDFSEARCH_PAGES", default_value = "all")]
    pages: String,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDFSEARCH_PASSWORD")]
    password: Option<String>,

    /// How pages are joined before segmentation: line or blank.
    #[arg(long, env = "PDFSEARCH_PAGE_JOIN", value_enum, default_value = "line")]
    page_join: PageJoinArg,

    /// Treat baselines within this many points as the same line.
    #[arg(long, env = "PDFSEARCH_BASELINE_TOLERANCE")]
    baseline_tolerance: Option<f32>,
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// Local PDF file path or HTTP/HTTPS URL.
    input: String,

    /// Write paragraphs to this file instead of stdout.
    #[arg(short, long, env = "PDFSEARCH_OUTPUT")]
    output: Option<PathBuf>,

    /// Output structured JSON (ExtractionOutput) instead of text.
    #[arg(long, env = "PDFSEARCH_JSON", conflicts_with = "raw")]
    json: bool,

    /// Print the reconstructed line stream instead of paragraphs.
    #[arg(long)]
    raw: bool,

    #[command(flatten)]
    pdf: PdfArgs,
}

#[derive(Args, Debug)]
struct AskArgs {
    /// Local PDF file path or URL (a paragraphs JSON file with --paragraphs).
    input: String,

    /// The question to answer.
    #[arg(required = true)]
    question: Vec<String>,

    /// Read INPUT as a JSON paragraph array or `extract --json` output.
    #[arg(long)]
    paragraphs: bool,

    /// LLM model ID (e.g. gpt-4.1-nano, gpt-4.1, claude-sonnet-4-20250514).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// Path to a text file containing a system prompt.
    #[arg(long, env = "PDFSEARCH_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// Max LLM output tokens.
    #[arg(long, env = "PDFSEARCH_MAX_TOKENS", default_value_t = 1024)]
    max_tokens: usize,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "PDFSEARCH_TEMPERATURE", default_value_t = 0.2)]
    temperature: f32,

    /// Retries on LLM failure.
    #[arg(long, env = "PDFSEARCH_MAX_RETRIES", default_value_t = 3)]
    max_retries: u32,

    /// Per-call LLM timeout in seconds.
    #[arg(long, env = "PDFSEARCH_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Output the answer as JSON.
    #[arg(long, env = "PDFSEARCH_JSON")]
    json: bool,

    #[command(flatten)]
    pdf: PdfArgs,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Local PDF file path or HTTP/HTTPS URL.
    input: String,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDFSEARCH_PASSWORD")]
    password: Option<String>,

    /// Output metadata as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum PageJoinArg {
    Line,
    Blank,
}

impl From<PageJoinArg> for PageJoin {
    fn from(v: PageJoinArg) -> Self {
        match v {
            PageJoinArg::Line => PageJoin::LineBreak,
            PageJoinArg::Blank => PageJoin::BlankLine,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let wants_json = match &cli.command {
        Command::Extract(a) => a.json,
        Command::Ask(a) => a.json,
        Command::Inspect(a) => a.json,
    };
    let show_progress = !cli.quiet && !cli.no_progress && !wants_json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new_dynamic() as Arc<dyn ExtractionProgressCallback>)
    } else {
        None
    };

    match &cli.command {
        Command::Extract(args) => run_extract(&cli, args, progress).await,
        Command::Ask(args) => run_ask(&cli, args, progress).await,
        Command::Inspect(args) => run_inspect(&cli, args).await,
    }
}

async fn run_extract(cli: &Cli, args: &ExtractArgs, progress: Option<ProgressCallback>) -> Result<()> {
    let config = build_extraction_config(cli, &args.pdf, progress)?;

    if let Some(ref path) = args.output {
        let output = extract_to_file(&args.input, path, &config)
            .await
            .context("Extraction failed")?;
        if !cli.quiet {
            eprintln!(
                "{}  {} paragraphs  {}ms  →  {}",
                green("✔"),
                output.stats.paragraph_count,
                output.stats.total_duration_ms,
                bold(&path.display().to_string()),
            );
        }
        return Ok(());
    }

    let output = extract(&args.input, &config)
        .await
        .context("Extraction failed")?;

    let text = if args.json {
        serde_json::to_string_pretty(&output).context("Failed to serialise output")?
    } else if args.raw {
        output.raw_text
    } else {
        output.formatted_text
    };
    write_stdout(&text)
}

async fn run_ask(cli: &Cli, args: &AskArgs, progress: Option<ProgressCallback>) -> Result<()> {
    let question = args.question.join(" ");

    let paragraphs = if args.paragraphs {
        load_paragraphs(Path::new(&args.input)).await?
    } else {
        let config = build_extraction_config(cli, &args.pdf, progress)?;
        extract(&args.input, &config)
            .await
            .context("Extraction failed")?
            .paragraphs
    };

    let config = build_query_config(args).await?;
    let answer = ask(&question, &paragraphs, &config)
        .await
        .context("Search failed")?;

    if args.json {
        let json = serde_json::to_string_pretty(&answer).context("Failed to serialise answer")?;
        write_stdout(&json)
    } else {
        write_stdout(&answer.answer)?;
        if !cli.quiet {
            eprintln!(
                "   {} tokens in  /  {} tokens out  ·  {}ms",
                dim(&answer.input_tokens.to_string()),
                dim(&answer.output_tokens.to_string()),
                answer.duration_ms,
            );
        }
        Ok(())
    }
}

async fn run_inspect(cli: &Cli, args: &InspectArgs) -> Result<()> {
    let mut builder = ExtractionConfig::builder().download_timeout_secs(cli.download_timeout);
    if let Some(ref pwd) = args.password {
        builder = builder.password(pwd.clone());
    }
    let config = builder.build().context("Invalid configuration")?;

    let meta = inspect(&args.input, &config)
        .await
        .context("Failed to inspect PDF")?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
        );
    } else {
        println!("File:         {}", args.input);
        if let Some(ref t) = meta.title {
            println!("Title:        {}", t);
        }
        if let Some(ref a) = meta.author {
            println!("Author:       {}", a);
        }
        if let Some(ref s) = meta.subject {
            println!("Subject:      {}", s);
        }
        println!("Pages:        {}", meta.page_count);
        println!("PDF Version:  {}", meta.pdf_version);
        if let Some(ref p) = meta.producer {
            println!("Producer:     {}", p);
        }
        if let Some(ref c) = meta.creator {
            println!("Creator:      {}", c);
        }
    }
    Ok(())
}

fn write_stdout(text: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(text.as_bytes())
        .context("Failed to write to stdout")?;
    if !text.ends_with('\n') {
        handle.write_all(b"\n").ok();
    }
    Ok(())
}

/// Map shared PDF flags to `ExtractionConfig`.
fn build_extraction_config(
    cli: &Cli,
    args: &PdfArgs,
    progress: Option<ProgressCallback>,
) -> Result<ExtractionConfig> {
    let mut builder = ExtractionConfig::builder()
        .pages(parse_pages(&args.pages)?)
        .page_join(args.page_join.into())
        .download_timeout_secs(cli.download_timeout);

    if let Some(points) = args.baseline_tolerance {
        builder = builder.baseline_tolerance(points);
    }
    if let Some(ref pwd) = args.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Map `ask` flags to `QueryConfig`.
async fn build_query_config(args: &AskArgs) -> Result<QueryConfig> {
    let mut builder = QueryConfig::builder()
        .max_tokens(args.max_tokens)
        .temperature(args.temperature)
        .max_retries(args.max_retries)
        .api_timeout_secs(args.api_timeout);

    if let Some(ref model) = args.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref provider) = args.provider {
        builder = builder.provider_name(provider.clone());
    }
    if let Some(ref path) = args.system_prompt {
        let prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read system prompt from {:?}", path))?;
        builder = builder.system_prompt(prompt);
    }

    builder.build().context("Invalid configuration")
}

/// Load paragraphs from a JSON array of strings or a full `ExtractionOutput`.
async fn load_paragraphs(path: &Path) -> Result<Vec<String>> {
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read paragraphs from {:?}", path))?;
    parse_paragraphs_json(&json).with_context(|| format!("Invalid paragraphs file {:?}", path))
}

fn parse_paragraphs_json(json: &str) -> Result<Vec<String>> {
    if let Ok(list) = serde_json::from_str::<Vec<String>>(json) {
        return Ok(list);
    }
    let output: ExtractionOutput = serde_json::from_str(json)
        .context("expected a JSON array of strings or `pdfsearch extract --json` output")?;
    Ok(output.paragraphs)
}

/// Parse `--pages` string into `PageSelection`.
fn parse_pages(s: &str) -> Result<PageSelection> {
    let s = s.trim().to_lowercase();

    if s == "all" {
        return Ok(PageSelection::All);
    }

    // Range: "3-15"
    if let Some((start, end)) = s.split_once('-') {
        let start: usize = start
            .trim()
            .parse()
            .context("Invalid start page in range")?;
        let end: usize = end.trim().parse().context("Invalid end page in range")?;

        if start < 1 {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", start);
        }
        if start > end {
            anyhow::bail!(
                "Invalid page range '{}-{}': start must be <= end",
                start,
                end
            );
        }

        return Ok(PageSelection::Range(start, end));
    }

    // Set: "1,3,5,7"
    if s.contains(',') {
        let pages: Vec<usize> = s
            .split(',')
            .map(|p| {
                p.trim()
                    .parse::<usize>()
                    .context(format!("Invalid page number: '{}'", p.trim()))
            })
            .collect::<Result<Vec<_>>>()?;

        if let Some(&p) = pages.iter().find(|&&p| p < 1) {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", p);
        }

        return Ok(PageSelection::Set(pages));
    }

    // Single page: "5"
    let page: usize = s.parse().context("Invalid page number")?;
    if page < 1 {
        anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", page);
    }

    Ok(PageSelection::Single(page))
}
