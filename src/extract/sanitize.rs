//! Expression-string sanitizer
//!
//! Report expressions arrive as Java expression text, frequently split
//! across lines with string-literal concatenation. The sanitizer reduces
//! them to a single normalized form before they land in the tables:
//!
//! 1. CRLF line breaks become LF
//! 2. A literal broken across lines (`"..." +` newline `"..."`, in either
//!    order) collapses to a plain newline
//! 3. Adjacent quoted literals joined by `+` merge into one literal
//! 4. Every line is trimmed and blank lines are dropped
//! 5. A fully quoted single-line value loses its quotes
//!
//! Concatenation with non-literal operands (`"x" + $P{y}`) is left verbatim;
//! only literal-to-literal joins are rewritten. CSV quoting and escaping is
//! the writer's job, not the sanitizer's.

use regex::Regex;
use std::sync::LazyLock;

static LINE_JOIN: LazyLock<Regex> = LazyLock::new(|| {
    // `"` <break> `+ "` or `" +` <break> `"` - a literal continued on the next line
    Regex::new(r#""[ \t]*\n[ \t]*\+[ \t]*"|"[ \t]*\+[ \t]*\n[ \t]*""#)
        .expect("Invalid line-join regex")
});

static LITERAL_JOIN: LazyLock<Regex> = LazyLock::new(|| {
    // `" + "` on one line - two adjacent literals
    Regex::new(r#""[ \t]*\+[ \t]*""#).expect("Invalid literal-join regex")
});

/// Normalize an expression string. Returns an empty string for empty input.
pub fn sanitize_expression(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }

    let value = value.replace("\r\n", "\n");
    let value = LINE_JOIN.replace_all(&value, "\n");
    let value = LITERAL_JOIN.replace_all(&value, "");

    let trimmed: Vec<&str> = value
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let result = trimmed.join("\n");

    unquote_single_line(&result)
}

/// Strip enclosing quotes from a single-line value that is one whole quoted
/// literal, e.g. `"Monthly Report"` -> `Monthly Report`.
fn unquote_single_line(value: &str) -> String {
    if !value.contains('\n')
        && value.len() >= 2
        && value.starts_with('"')
        && value.ends_with('"')
        && !value[1..value.len() - 1].contains('"')
    {
        value[1..value.len() - 1].to_string()
    } else {
        value.to_string()
    }
}
