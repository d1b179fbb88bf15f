//! Integration tests for the pure text stages: line reconstruction and
//! paragraph segmentation.
//!
//! No PDF, pdfium library, or API key is needed; these always run.
//!
//! Run with:
//!   cargo test --test pipeline

use edgequake_pdfsearch::{
    classify_line, format_paragraphs, reconstruct_lines, reconstruct_lines_with, segment_paragraphs,
    BaselineMatch, LineKind, TextFragment,
};

// ── Test helpers ─────────────────────────────────────────────────────────────

fn frags(items: &[(&str, f32)]) -> Vec<TextFragment> {
    items
        .iter()
        .map(|(text, y)| TextFragment::new(*text, *y))
        .collect()
}

fn seg(lines: &[&str]) -> Vec<String> {
    segment_paragraphs(&lines.join("\n"))
}

/// A document line stream mixing every line kind.
const MIXED_DOCUMENT: &str = "\
TERMS OF SERVICE

These terms govern your use
of the service.

1. Acceptance
By using the service you agree.
2. Changes
We may update these terms.


LIABILITY
Our liability is limited
to the fees paid.
";

// ── Worked examples ──────────────────────────────────────────────────────────

#[test]
fn test_example_heading_then_prose() {
    assert_eq!(
        seg(&["HEADER", "", "This is line one.", "This continues line one."]),
        vec!["HEADER", "This is line one. This continues line one."]
    );
}

#[test]
fn test_example_numbered_items_absorb_continuations() {
    assert_eq!(
        seg(&["1. First item", "continued text", "2. Second item"]),
        vec!["1. First item continued text", "2. Second item"]
    );
}

#[test]
fn test_example_fragments_sharing_baseline() {
    let fragments = frags(&[("Hello ", 100.0), ("World", 100.0), ("Next", 200.0)]);
    assert_eq!(reconstruct_lines(&fragments), "Hello World\nNext");
}

#[test]
fn test_example_empty_inputs() {
    assert_eq!(reconstruct_lines(&[]), "");
    assert!(segment_paragraphs("").is_empty());
}

#[test]
fn test_example_single_lowercase_line() {
    assert_eq!(segment_paragraphs("  just one line  "), vec!["just one line"]);
}

// ── Properties over a mixed document ─────────────────────────────────────────

#[test]
fn test_mixed_document_segmentation() {
    assert_eq!(
        segment_paragraphs(MIXED_DOCUMENT),
        vec![
            "TERMS OF SERVICE",
            "These terms govern your use of the service.",
            "1. Acceptance By using the service you agree.",
            "2. Changes We may update these terms.",
            "LIABILITY",
            "Our liability is limited to the fees paid.",
        ]
    );
}

#[test]
fn test_resegmenting_formatted_output_is_stable() {
    let first = segment_paragraphs(MIXED_DOCUMENT);
    let second = segment_paragraphs(&format_paragraphs(&first));
    assert_eq!(first, second);
}

#[test]
fn test_every_nonblank_line_survives_in_order() {
    let paragraphs = segment_paragraphs(MIXED_DOCUMENT);
    let joined = paragraphs.join(" ");

    let mut cursor = 0;
    for line in MIXED_DOCUMENT.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let found = joined[cursor..]
            .find(line)
            .unwrap_or_else(|| panic!("line {line:?} missing or out of order"));
        cursor += found + line.len();
    }
}

#[test]
fn test_blank_line_runs_collapse() {
    let single = seg(&["alpha", "", "beta"]);
    for n in 2..6 {
        let mut lines = vec!["alpha"];
        lines.extend(std::iter::repeat("").take(n));
        lines.push("beta");
        assert_eq!(seg(&lines), single, "{n} blank lines");
    }
    assert_eq!(single, vec!["alpha", "beta"]);
}

#[test]
fn test_whitespace_only_lines_are_blank() {
    assert_eq!(seg(&["alpha", " \t ", "beta"]), vec!["alpha", "beta"]);
}

#[test]
fn test_heading_isolated_in_any_position() {
    let cases: [&[&str]; 3] = [
        &["SUMMARY", "first line", "second line"],
        &["first line", "SUMMARY", "second line"],
        &["first line", "second line", "SUMMARY"],
    ];
    for lines in cases {
        let out = seg(lines);
        assert!(
            out.iter().any(|p| p == "SUMMARY"),
            "heading not isolated in {out:?}"
        );
        assert_eq!(out.len(), if lines[1] == "SUMMARY" { 3 } else { 2 });
    }
}

#[test]
fn test_short_caps_lines_are_continuations() {
    // Three characters is not enough for a heading.
    assert_eq!(seg(&["see", "FAQ", "below"]), vec!["see FAQ below"]);
}

#[test]
fn test_list_marker_beats_heading() {
    assert_eq!(classify_line("1. INTRODUCTION"), LineKind::ListMarker);
    assert_eq!(
        seg(&["1. INTRODUCTION", "the opening words"]),
        vec!["1. INTRODUCTION the opening words"]
    );
}

#[test]
fn test_abbreviation_starts_new_paragraph() {
    // A standalone letter followed by a period counts as a marker anywhere.
    assert_eq!(
        seg(&["the report was", "written by J. Smith", "last year"]),
        vec!["the report was", "written by J. Smith last year"]
    );
}

#[test]
fn test_non_ascii_heading_uses_unicode_uppercase() {
    assert_eq!(classify_line("ÉTUDE GÉNÉRALE"), LineKind::Heading);
    assert_eq!(classify_line("Étude générale"), LineKind::Continuation);
}

// ── Line reconstruction ──────────────────────────────────────────────────────

#[test]
fn test_lines_follow_emission_order_not_position() {
    // Baseline 500 sits above 100 on the page, but emission order wins.
    let fragments = frags(&[("bottom", 100.0), ("top", 500.0), ("bottom again", 100.0)]);
    assert_eq!(reconstruct_lines(&fragments), "bottom\ntop\nbottom again");
}

#[test]
fn test_near_baselines_split_unless_tolerance_given() {
    let fragments = frags(&[("sub", 100.0), ("script", 100.4), ("next", 120.0)]);
    assert_eq!(reconstruct_lines(&fragments), "sub\nscript\nnext");
    assert_eq!(
        reconstruct_lines_with(&fragments, BaselineMatch::Tolerance(0.5)),
        "subscript\nnext"
    );
}

#[test]
fn test_fragments_from_lenient_json() {
    let json = r#"[
        {"text": "Name:", "baselineY": 700},
        {"text": 42, "baselineY": 700},
        {"baselineY": 700},
        {"text": " Alice", "baselineY": 700},
        {"text": "Address", "baselineY": 680}
    ]"#;
    let fragments: Vec<TextFragment> = serde_json::from_str(json).unwrap();
    assert_eq!(reconstruct_lines(&fragments), "Name: Alice\nAddress");
}

#[test]
fn test_pages_joined_then_segmented() {
    let page1 = reconstruct_lines(&frags(&[
        ("OVERVIEW", 700.0),
        ("The product ships", 680.0),
    ]));
    let page2 = reconstruct_lines(&frags(&[("in two sizes.", 700.0)]));

    // A single line break between pages lets the paragraph continue.
    let doc = [page1, page2].join("\n");
    assert_eq!(
        segment_paragraphs(&doc),
        vec!["OVERVIEW", "The product ships in two sizes."]
    );
}
