use scraper::{ElementRef, Html, Node, Selector};
use std::sync::LazyLock;

/// Tags that never carry readable content
pub const NON_CONTENT_TAGS: &[&str] = &["script", "style", "noscript", "iframe", "svg"];

/// Page chrome that surrounds the content on most sites
pub const LAYOUT_CHROME_TAGS: &[&str] = &["nav", "footer", "header", "aside"];

/// Main-content candidates, highest priority first
pub const MAIN_CONTENT_SELECTORS: &[&str] = &[
    "main",
    "article",
    "[role=\"main\"]",
    ".content",
    "#content",
    ".post",
    ".article",
];

static BODY: LazyLock<Selector> = LazyLock::new(|| parse_selector("body"));
static TITLE: LazyLock<Selector> = LazyLock::new(|| parse_selector("title"));
static MAIN_CONTENT: LazyLock<Vec<(&'static str, Selector)>> = LazyLock::new(|| {
    MAIN_CONTENT_SELECTORS
        .iter()
        .map(|css| (*css, parse_selector(css)))
        .collect()
});

fn parse_selector(css: &str) -> Selector {
    Selector::parse(css).expect("built-in selector is valid")
}

/// Parses serialized markup into a private tree that can be pruned freely
pub fn parse_document(html: &str) -> Html {
    Html::parse_document(html)
}

/// Detaches every element with one of the given tag names, returns how many were removed
pub fn remove_elements(doc: &mut Html, tags: &[&str]) -> usize {
    if tags.is_empty() {
        return 0;
    }

    let selector = match Selector::parse(&tags.join(", ")) {
        Ok(selector) => selector,
        Err(e) => {
            ::log::warn!("Skipping removal of {:?}: {}", tags, e);
            return 0;
        }
    };

    let ids = doc.select(&selector).map(|el| el.id()).collect::<Vec<_>>();
    for id in &ids {
        if let Some(mut node) = doc.tree.get_mut(*id) {
            node.detach();
        }
    }

    ::log::debug!("Removed {} elements matching {:?}", ids.len(), tags);
    ids.len()
}

/// Finds the main-content element, trying each candidate selector in priority order
pub fn find_main_content(doc: &Html) -> Option<(&'static str, ElementRef<'_>)> {
    MAIN_CONTENT
        .iter()
        .find_map(|(css, selector)| doc.select(selector).next().map(|el| (*css, el)))
}

/// The document body, if the markup produced one
pub fn body(doc: &Html) -> Option<ElementRef<'_>> {
    doc.select(&BODY).next()
}

/// Document title with whitespace collapsed, empty when there is none
pub fn document_title(doc: &Html) -> String {
    doc.select(&TITLE)
        .next()
        .map(|title| {
            title
                .text()
                .flat_map(str::split_whitespace)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}

/// Renders the text a reader would see inside `element`.
///
/// Source formatting whitespace collapses to spaces, block boundaries become
/// line breaks and paragraphs are wrapped in blank lines. The output still
/// needs [`super::text::normalize_whitespace`].
pub fn rendered_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    render_children(element, false, &mut out);
    out
}

fn render_children(element: ElementRef<'_>, preformatted: bool, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let text: &str = text;
                if preformatted {
                    out.push_str(text);
                } else {
                    out.extend(text.chars().map(|ch| if ch.is_whitespace() { ' ' } else { ch }));
                }
            }
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    render_element(child, preformatted, out);
                }
            }
            _ => {}
        }
    }
}

fn render_element(element: ElementRef<'_>, preformatted: bool, out: &mut String) {
    let value = element.value();
    if is_hidden(element) {
        return;
    }

    let name = value.name();
    match name {
        "br" => out.push('\n'),
        "template" => {}
        "td" | "th" => {
            render_children(element, preformatted, out);
            out.push(' ');
        }
        _ => {
            let breaks = line_breaks(name);
            push_breaks(out, breaks);
            render_children(element, preformatted || name == "pre", out);
            push_breaks(out, breaks);
        }
    }
}

fn is_hidden(element: ElementRef<'_>) -> bool {
    let value = element.value();
    if value.attr("hidden").is_some() {
        return true;
    }

    value
        .attr("style")
        .map(|style| {
            style
                .chars()
                .filter(|ch| !ch.is_whitespace())
                .collect::<String>()
                .to_ascii_lowercase()
                .contains("display:none")
        })
        .unwrap_or(false)
}

/// Line breaks required around an element of the given tag
fn line_breaks(name: &str) -> usize {
    match name {
        "p" => 2,
        "address" | "article" | "aside" | "blockquote" | "caption" | "center" | "dd"
        | "details" | "dialog" | "dir" | "div" | "dl" | "dt" | "fieldset" | "figcaption"
        | "figure" | "footer" | "form" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "header"
        | "hgroup" | "hr" | "legend" | "li" | "main" | "menu" | "nav" | "ol" | "pre"
        | "section" | "summary" | "table" | "tbody" | "tfoot" | "thead" | "tr" | "ul" => 1,
        _ => 0,
    }
}

fn push_breaks(out: &mut String, breaks: usize) {
    for _ in 0..breaks {
        out.push('\n');
    }
}
