//! Page-text cleanup applied before chunking.
//!
//! pdfium hands back the raw text layer: Windows line endings, soft hyphens,
//! zero-width joiners, NUL padding from broken encoders, and long runs of
//! blank lines where a page had figures. None of it carries meaning but all
//! of it costs tokens, so it is removed here with cheap deterministic rules.
//!
//! Rules run in this order: line endings first so later rules only see `\n`,
//! invisible characters before whitespace trimming so a line holding only a
//! zero-width space becomes blank and collapses with its neighbours.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply every cleanup rule to one page of extracted text.
///
/// 1. Normalise line endings (CRLF / CR → LF)
/// 2. Strip invisible Unicode and control characters (keeps `\n` and `\t`)
/// 3. Trim trailing whitespace per line
/// 4. Collapse 3+ consecutive blank lines down to 2
/// 5. Trim the page
pub fn clean_page_text(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = remove_invisible_chars(&s);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    s.trim().to_string()
}

// ── Rule 1: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 2: Strip invisible characters ───────────────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input
        .chars()
        .filter(|&c| {
            !matches!(
                c,
                '\u{200B}' // zero-width space
                    | '\u{200C}' // zero-width non-joiner
                    | '\u{200D}' // zero-width joiner
                    | '\u{2060}' // word joiner
                    | '\u{FEFF}' // BOM
                    | '\u{00AD}' // soft hyphen
                    | '\u{FFFE}'
                    | '\u{FFFF}'
            ) && (!c.is_control() || c == '\n' || c == '\t')
        })
        .collect()
}

// ── Rule 3: Trim trailing whitespace per line ────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 4: Collapse excessive blank lines ───────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{4,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n\n").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalise_line_endings() {
        assert_eq!(normalise_line_endings("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn test_remove_invisible() {
        let input = "hello\u{200B}world\u{FEFF}foo\u{00AD}bar\u{0}";
        assert_eq!(remove_invisible_chars(input), "helloworldfoobar");
    }

    #[test]
    fn test_keeps_tabs_and_newlines() {
        assert_eq!(remove_invisible_chars("a\tb\nc"), "a\tb\nc");
    }

    #[test]
    fn test_collapse_blank_lines() {
        assert_eq!(collapse_blank_lines("a\n\n\n\n\n\nb"), "a\n\n\nb");
        assert_eq!(collapse_blank_lines("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_zero_width_line_becomes_blank() {
        let input = "Title\r\n\u{200B}\r\n\r\n\r\n\r\nBody   \r\n";
        assert_eq!(clean_page_text(input), "Title\n\n\nBody");
    }

    #[test]
    fn test_whitespace_page_is_empty() {
        assert_eq!(clean_page_text(" \r\n\t\n\u{FEFF} "), "");
    }

    #[test]
    fn test_non_latin_text_untouched() {
        let input = "文書の要約\n第二行";
        assert_eq!(clean_page_text(input), input);
    }
}
