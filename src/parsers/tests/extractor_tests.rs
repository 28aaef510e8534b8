use crate::config::ExtractorConfig;
use crate::parsers::text::{MAX_LENGTH, TRUNCATION_MARKER};
use crate::parsers::{ContentSource, Extractor};
use crate::results::PageDocument;

fn page(html: &str) -> PageDocument {
    PageDocument::new("https://example.com/article", html)
}

#[test]
fn test_main_element_wins_over_page_chrome() {
    let doc = page(
        "<html><head><title>Example Article</title></head><body>\
         <nav>Home | About</nav>\
         <main><h1>Headline</h1><p>First paragraph.</p><p>Second paragraph.</p></main>\
         <footer>Copyright 2024</footer>\
         </body></html>",
    );

    let (snapshot, source) = Extractor::default().extract_with_source(&doc);

    assert_eq!(source, ContentSource::MainContent("main"));
    assert_eq!(
        snapshot.text(),
        "Headline\n\nFirst paragraph.\n\nSecond paragraph."
    );
    assert_eq!(snapshot.title(), "Example Article");
    assert_eq!(snapshot.url(), "https://example.com/article");
}

#[test]
fn test_falls_back_to_body() {
    let doc = page("<html><body><span>Just</span> <span>some text</span></body></html>");

    let (snapshot, source) = Extractor::default().extract_with_source(&doc);

    assert_eq!(source, ContentSource::Body);
    assert_eq!(snapshot.text(), "Just some text");
    assert_eq!(snapshot.title(), "");
}

#[test]
fn test_non_content_elements_are_removed() {
    let doc = page(
        "<html><head><style>body { color: red; }</style></head><body>\
         <script>var tracking = 1;</script>\
         <p>Visible text</p>\
         <noscript>Enable JavaScript</noscript>\
         <iframe src=\"https://ads.example.com\"></iframe>\
         <svg><text>Logo</text></svg>\
         </body></html>",
    );

    let snapshot = Extractor::default().extract(&doc);

    assert_eq!(snapshot.text(), "Visible text");
}

#[test]
fn test_layout_chrome_kept_by_default() {
    let doc = page(
        "<html><body><header>Site name</header><p>Story</p><aside>Related</aside></body></html>",
    );

    let snapshot = Extractor::default().extract(&doc);
    assert!(snapshot.text().contains("Site name"));
    assert!(snapshot.text().contains("Related"));

    let stripping = Extractor::new(ExtractorConfig {
        strip_layout_chrome: true,
        ..ExtractorConfig::default()
    });
    let snapshot = stripping.extract(&doc);
    assert_eq!(snapshot.text(), "Story");
}

#[test]
fn test_selector_priority_beats_document_order() {
    let doc = page(
        "<html><body>\
         <div class=\"content\">Sidebar teaser</div>\
         <article><p>The real article.</p></article>\
         </body></html>",
    );

    let (snapshot, source) = Extractor::default().extract_with_source(&doc);

    assert_eq!(source, ContentSource::MainContent("article"));
    assert_eq!(snapshot.text(), "The real article.");
}

#[test]
fn test_role_main_and_class_selectors() {
    let doc = page("<html><body><p>Intro</p><div role=\"main\">Role content</div></body></html>");
    let (snapshot, source) = Extractor::default().extract_with_source(&doc);
    assert_eq!(source, ContentSource::MainContent("[role=\"main\"]"));
    assert_eq!(snapshot.text(), "Role content");

    let doc = page("<html><body><p>Intro</p><div id=\"content\">Id content</div></body></html>");
    let (snapshot, source) = Extractor::default().extract_with_source(&doc);
    assert_eq!(source, ContentSource::MainContent("#content"));
    assert_eq!(snapshot.text(), "Id content");
}

#[test]
fn test_hidden_elements_are_skipped() {
    let doc = page(
        "<html><body><main>\
         <p>Shown</p>\
         <p hidden>Hidden attribute</p>\
         <div style=\"display: none\">Hidden style</div>\
         <span>Also shown</span>\
         </main></body></html>",
    );

    let snapshot = Extractor::default().extract(&doc);

    assert_eq!(snapshot.text(), "Shown\n\nAlso shown");
}

#[test]
fn test_inline_breaks_and_table_cells() {
    let doc = page(
        "<html><body><main>\
         <div>line one<br>line two</div>\
         <table><tr><td>a</td><td>b</td></tr></table>\
         </main></body></html>",
    );

    let snapshot = Extractor::default().extract(&doc);

    assert_eq!(snapshot.text(), "line one line two\n\na b");
}

#[test]
fn test_source_formatting_whitespace_collapses() {
    let doc = page(
        "<html><body><main>\n    <p>\n      Lots   of\n      space\n    </p>\n  </main></body></html>",
    );

    let snapshot = Extractor::default().extract(&doc);

    assert_eq!(snapshot.text(), "Lots of space");
}

#[test]
fn test_title_whitespace_is_collapsed() {
    let doc = page("<html><head><title>\n  My   Page\n</title></head><body>x</body></html>");

    let snapshot = Extractor::default().extract(&doc);

    assert_eq!(snapshot.title(), "My Page");
}

#[test]
fn test_long_text_is_truncated_to_budget() {
    let body = "a".repeat(150_000);
    let doc = page(&format!("<html><body><main>{}</main></body></html>", body));

    let snapshot = Extractor::default().extract(&doc);

    assert_eq!(
        snapshot.text().chars().count(),
        MAX_LENGTH + TRUNCATION_MARKER.len()
    );
    assert!(snapshot.text().ends_with("..."));
}

#[test]
fn test_text_at_budget_is_not_marked() {
    let body = "b".repeat(MAX_LENGTH);
    let doc = page(&format!("<html><body><main>{}</main></body></html>", body));

    let snapshot = Extractor::default().extract(&doc);

    assert_eq!(snapshot.text().chars().count(), MAX_LENGTH);
    assert!(!snapshot.text().ends_with("..."));
}

#[test]
fn test_custom_max_length() {
    let extractor = Extractor::new(ExtractorConfig {
        max_length: 5,
        ..ExtractorConfig::default()
    });
    let doc = page("<html><body><p>Hello, world!</p></body></html>");

    let snapshot = extractor.extract(&doc);

    assert_eq!(snapshot.text(), "Hello...");
}

#[test]
fn test_cut_between_paragraphs_leaves_no_lone_line_break() {
    let extractor = Extractor::new(ExtractorConfig {
        max_length: 4,
        ..ExtractorConfig::default()
    });
    let doc = page("<html><body><p>abc</p><p>def</p></body></html>");

    let snapshot = extractor.extract(&doc);

    assert_eq!(snapshot.text(), "abc ...");
    assert_eq!(snapshot.text().chars().count(), 4 + TRUNCATION_MARKER.len());
}

#[test]
fn test_repeated_extraction_is_identical() {
    let doc = page(
        "<html><head><title>Same</title></head><body>\
         <script>x()</script><nav>Menu</nav><main><p>Stable</p></main>\
         </body></html>",
    );
    let extractor = Extractor::default();

    let first = extractor.extract(&doc);
    let second = extractor.extract(&doc);

    assert_eq!(first, second);
    // The source markup is untouched by pruning
    assert!(doc.html.contains("<script>x()</script>"));
}

#[test]
fn test_empty_document() {
    let doc = page("");

    let snapshot = Extractor::default().extract(&doc);

    assert_eq!(snapshot.text(), "");
    assert_eq!(snapshot.title(), "");
    assert_eq!(snapshot.url(), "https://example.com/article");
}
