//! End-to-end integration tests for edgequake-pdfsearch.
//!
//! These tests use real PDF files in `./test_cases/` and a pdfium library;
//! the `ask` tests also make live LLM API calls. They are gated behind the
//! `E2E_ENABLED` environment variable so they do not run in CI unless
//! explicitly requested.
//!
//! Run with:
//!   E2E_ENABLED=1 PDFIUM_LIB_PATH=. cargo test --test e2e -- --nocapture
//!
//! To restrict to a specific test:
//!   E2E_ENABLED=1 PDFIUM_LIB_PATH=. cargo test --test e2e test_inspect -- --nocapture

use edgequake_pdfsearch::{
    ask, ask_document, extract, extract_batch, extract_from_bytes, extract_to_file, inspect,
    ExtractionConfig, ExtractionProgressCallback, PageJoin, PageSelection, PdfSearchError,
    QueryConfig,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases")
}

fn output_dir() -> PathBuf {
    let d = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases/output");
    std::fs::create_dir_all(&d).ok();
    d
}

/// Skip this test if E2E_ENABLED is not set *or* no PDF file at `path`.
macro_rules! e2e_skip_unless_ready {
    ($path:expr) => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        let p: PathBuf = $path;
        if !p.exists() {
            println!("SKIP — test file not found: {}", p.display());
            return;
        }
        p
    }};
}

/// Skip unless some LLM provider key is present.
macro_rules! skip_unless_llm {
    () => {
        if ["OPENAI_API_KEY", "ANTHROPIC_API_KEY", "GEMINI_API_KEY"]
            .iter()
            .all(|k| std::env::var(k).is_err())
        {
            println!("SKIP — no LLM API key set");
            return;
        }
    };
}

/// Assert the paragraph output passes basic quality checks.
fn assert_paragraph_quality(paragraphs: &[String], formatted: &str, context: &str) {
    assert!(!paragraphs.is_empty(), "[{context}] No paragraphs extracted");

    for (i, p) in paragraphs.iter().enumerate() {
        assert!(!p.is_empty(), "[{context}] Paragraph {i} is empty");
        assert_eq!(
            p.trim(),
            p,
            "[{context}] Paragraph {i} has surrounding whitespace"
        );
        assert!(
            !p.contains('\n'),
            "[{context}] Paragraph {i} spans lines: {p:?}"
        );
    }

    // formatted_text is exactly the paragraphs joined by a blank line
    assert_eq!(formatted, paragraphs.join("\n\n"), "[{context}] formatted_text mismatch");
    assert!(
        !formatted.contains("\n\n\n"),
        "[{context}] formatted_text has more than one blank line in a row"
    );

    println!(
        "[{context}] ✓  {} paragraphs, {} bytes",
        paragraphs.len(),
        formatted.len()
    );
}

// ── Inspect tests (no LLM, instant) ──────────────────────────────────────────

#[tokio::test]
async fn test_inspect_arxiv_paper() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("attention_is_all_you_need.pdf"));

    let meta = inspect(path.to_str().unwrap(), &ExtractionConfig::default())
        .await
        .expect("inspect() should succeed");

    assert_eq!(meta.page_count, 15, "Attention paper should have 15 pages");
    assert!(!meta.pdf_version.is_empty());

    println!("Metadata: {:?}", meta);
}

#[tokio::test]
async fn test_inspect_nonexistent() {
    let result = inspect("/definitely/not/a/real/file.pdf", &ExtractionConfig::default()).await;
    assert!(
        matches!(result, Err(PdfSearchError::FileNotFound { .. })),
        "inspect() should return FileNotFound, got {result:?}"
    );
}

// ── Input validation (no pdfium needed) ──────────────────────────────────────

#[tokio::test]
async fn test_bytes_without_signature_rejected() {
    let result = extract_from_bytes(b"<html>not a pdf</html>", &ExtractionConfig::default()).await;
    match result {
        Err(PdfSearchError::NotAPdf { magic, .. }) => assert_eq!(&magic, b"<htm"),
        other => panic!("expected NotAPdf, got {other:?}"),
    }
}

#[tokio::test]
async fn test_batch_reports_each_failure() {
    let inputs = ["/missing/one.pdf", "", "/missing/two.pdf"];
    let results = extract_batch(&inputs, &ExtractionConfig::default()).await;

    assert_eq!(results.len(), 3);
    assert!(matches!(results[0], Err(PdfSearchError::FileNotFound { .. })));
    assert!(matches!(results[1], Err(PdfSearchError::InvalidInput { .. })));
    assert!(matches!(results[2], Err(PdfSearchError::FileNotFound { .. })));
}

// ── Extraction tests (pdfium, no LLM) ────────────────────────────────────────

#[tokio::test]
async fn test_extract_arxiv_page1() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("attention_is_all_you_need.pdf"));

    let config = ExtractionConfig::builder()
        .pages(PageSelection::Single(1))
        .build()
        .expect("valid config");

    let result = extract(path.to_str().unwrap(), &config)
        .await
        .expect("extraction should succeed");

    assert_eq!(result.stats.extracted_pages, 1);
    assert_eq!(result.pages.len(), 1);
    assert_eq!(result.pages[0].page_num, 1);
    assert!(result.stats.fragment_count > 0);
    assert_paragraph_quality(&result.paragraphs, &result.formatted_text, "arxiv p1");

    let text = result.formatted_text.to_lowercase();
    assert!(
        text.contains("attention"),
        "Page 1 should mention 'attention'"
    );
}

#[tokio::test]
async fn test_extract_page_join_blank_never_merges_pages() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("attention_is_all_you_need.pdf"));

    let line = ExtractionConfig::builder()
        .pages(PageSelection::Range(1, 3))
        .build()
        .unwrap();
    let blank = ExtractionConfig::builder()
        .pages(PageSelection::Range(1, 3))
        .page_join(PageJoin::BlankLine)
        .build()
        .unwrap();

    let joined = extract(path.to_str().unwrap(), &line).await.unwrap();
    let split = extract(path.to_str().unwrap(), &blank).await.unwrap();

    // Same text either way; a blank join can only add boundaries.
    assert_eq!(joined.pages, split.pages);
    assert!(split.paragraphs.len() >= joined.paragraphs.len());
}

#[tokio::test]
async fn test_extract_out_of_range_page() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("attention_is_all_you_need.pdf"));

    let config = ExtractionConfig::builder()
        .pages(PageSelection::Single(100))
        .build()
        .unwrap();

    let err = extract(path.to_str().unwrap(), &config).await.unwrap_err();
    assert!(
        matches!(err, PdfSearchError::PageOutOfRange { page: 100, total: 15 }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn test_extract_to_file_writes_formatted_text() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("sample.pdf"));
    let out_path = output_dir().join("sample.txt");

    let result = extract_to_file(path.to_str().unwrap(), &out_path, &ExtractionConfig::default())
        .await
        .expect("extraction should succeed");

    let written = std::fs::read_to_string(&out_path).expect("output file must exist");
    assert_eq!(written, result.formatted_text);
    assert_paragraph_quality(&result.paragraphs, &written, "sample.pdf");
}

#[tokio::test]
async fn test_extract_json_serialisable() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("sample.pdf"));

    let result = extract(path.to_str().unwrap(), &ExtractionConfig::default())
        .await
        .unwrap();

    let json = serde_json::to_string_pretty(&result).expect("output must serialise");
    assert!(json.contains("\"paragraphs\""));
    assert!(json.contains("\"stats\""));
}

#[tokio::test]
async fn test_progress_callback_sees_every_page() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("attention_is_all_you_need.pdf"));

    #[derive(Default)]
    struct Counter {
        started: AtomicUsize,
        pages: AtomicUsize,
        paragraphs: AtomicUsize,
    }

    impl ExtractionProgressCallback for Counter {
        fn on_extraction_start(&self, total_pages: usize) {
            self.started.store(total_pages, Ordering::SeqCst);
        }
        fn on_page_complete(&self, _page: usize, _total: usize, _lines: usize) {
            self.pages.fetch_add(1, Ordering::SeqCst);
        }
        fn on_extraction_complete(&self, _total: usize, paragraph_count: usize) {
            self.paragraphs.store(paragraph_count, Ordering::SeqCst);
        }
    }

    let counter = Arc::new(Counter::default());
    let config = ExtractionConfig::builder()
        .pages(PageSelection::Set(vec![1, 3, 5]))
        .progress_callback(counter.clone())
        .build()
        .unwrap();

    let result = extract(path.to_str().unwrap(), &config).await.unwrap();

    assert_eq!(counter.started.load(Ordering::SeqCst), 3);
    assert_eq!(counter.pages.load(Ordering::SeqCst), 3);
    assert_eq!(
        counter.paragraphs.load(Ordering::SeqCst),
        result.paragraphs.len()
    );
}

/// Verifies that the callback trait object can be moved into a spawned task
/// and receive an owned error message.
#[tokio::test]
async fn test_callback_send_in_tokio_spawn() {
    use std::sync::Mutex;

    struct ErrorLogger {
        log: Arc<Mutex<Vec<String>>>,
    }

    impl ExtractionProgressCallback for ErrorLogger {
        fn on_page_error(&self, _page: usize, _total: usize, error: String) {
            self.log.lock().unwrap().push(error);
        }
    }

    let log = Arc::new(Mutex::new(vec![]));
    let cb: Arc<dyn ExtractionProgressCallback> = Arc::new(ErrorLogger {
        log: Arc::clone(&log),
    });

    tokio::spawn(async move {
        cb.on_page_error(2, 5, "page index out of range".to_string());
    })
    .await
    .expect("spawn must succeed");

    assert_eq!(*log.lock().unwrap(), vec!["page index out of range"]);
}

// ── Query tests (need LLM API) ───────────────────────────────────────────────

#[tokio::test]
async fn test_ask_over_inline_paragraphs() {
    if std::env::var("E2E_ENABLED").is_err() {
        println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
        return;
    }
    skip_unless_llm!();

    let paragraphs = vec![
        "WARRANTY".to_string(),
        "The device is covered for a period of two years from the date of purchase.".to_string(),
        "Batteries are covered for six months.".to_string(),
    ];
    let config = QueryConfig::builder().max_retries(2).build().unwrap();

    let answer = ask("How long are batteries covered?", &paragraphs, &config)
        .await
        .expect("ask should succeed");

    assert_eq!(answer.paragraph_count, 3);
    assert!(!answer.answer.trim().is_empty());
    assert!(
        answer.answer.to_lowercase().contains("six") || answer.answer.contains('6'),
        "answer should mention six months: {}",
        answer.answer
    );
    println!("Answer: {}", answer.answer);
}

#[tokio::test]
async fn test_ask_document_arxiv() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("attention_is_all_you_need.pdf"));
    skip_unless_llm!();

    let extraction = ExtractionConfig::builder()
        .pages(PageSelection::Single(1))
        .build()
        .unwrap();
    let query = QueryConfig::builder().max_tokens(256).build().unwrap();

    let answer = ask_document(
        path.to_str().unwrap(),
        "What neural network architecture does this paper propose?",
        &extraction,
        &query,
    )
    .await
    .expect("ask_document should succeed");

    assert!(
        answer.answer.to_lowercase().contains("transformer"),
        "answer should name the Transformer: {}",
        answer.answer
    );
    println!(
        "Answer ({} in / {} out tokens): {}",
        answer.input_tokens, answer.output_tokens, answer.answer
    );
}
