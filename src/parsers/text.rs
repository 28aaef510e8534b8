use regex::Regex;
use std::sync::LazyLock;

/// Marker appended to text cut at the length budget
pub const TRUNCATION_MARKER: &str = "...";

/// Default length budget in characters
pub const MAX_LENGTH: usize = 100_000;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Normalizes whitespace in rendered page text
///
/// - A whitespace run holding two or more line breaks becomes one blank line
/// - Any other whitespace run becomes a single space
/// - Leading and trailing whitespace is removed
///
/// Applying it to its own output returns the output unchanged.
pub fn normalize_whitespace(text: &str) -> String {
    let collapsed = WHITESPACE_RUN.replace_all(text, |caps: &regex::Captures| {
        let run = &caps[0];
        if run.matches('\n').count() >= 2 {
            "\n\n"
        } else {
            " "
        }
    });

    collapsed.trim().to_string()
}

/// Cuts text to `max_length` characters, appending the truncation marker when cut
pub fn truncate(text: String, max_length: usize) -> String {
    match text.char_indices().nth(max_length) {
        Some((byte_offset, _)) => {
            ::log::debug!(
                "Truncating extracted text to {} characters",
                max_length
            );
            let mut cut = text;
            cut.truncate(byte_offset);
            // A cut inside a paragraph break leaves half of it behind
            if cut.ends_with('\n') && !cut.ends_with("\n\n") {
                cut.pop();
                cut.push(' ');
            }
            cut.push_str(TRUNCATION_MARKER);
            cut
        }
        None => text,
    }
}
