//! Whitespace normalization for extracted text.

/// Normalize extracted text before it reaches downstream chunking.
///
/// Strips non-whitespace control characters, collapses runs of spaces and
/// tabs within a line, reduces any run of blank lines to a single paragraph
/// break, and trims leading/trailing whitespace. Single line breaks inside a
/// paragraph are preserved.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_pending = false;

    for raw_line in text.lines() {
        let filtered: String = raw_line.chars().filter(|c| !c.is_control() || *c == '\t').collect();
        let words: Vec<&str> = filtered.split_whitespace().collect();

        if words.is_empty() {
            blank_pending = !out.is_empty();
            continue;
        }
        if !out.is_empty() {
            out.push_str(if blank_pending { "\n\n" } else { "\n" });
        }
        out.push_str(&words.join(" "));
        blank_pending = false;
    }

    out
}
