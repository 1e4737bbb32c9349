//! Text helpers for the matching engine.
//!
//! All field offsets in this crate are character counts, not byte indices;
//! the helpers here do the conversions and the case-insensitive comparisons
//! the engine needs. Owned copies that feed controller state go through the
//! fallible `try_*` helpers so an allocation failure degrades a single
//! keystroke instead of aborting the process.

use std::collections::TryReserveError;

/// Number of characters in `s`.
pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte index of the character at `char_offset`, clamped to the end.
pub(crate) fn byte_offset(s: &str, char_offset: usize) -> usize {
    s.char_indices()
        .nth(char_offset)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Case-insensitive prefix test, folding one character at a time.
///
/// `true` when `candidate` starts with `query` under per-character lowercase
/// folding. An empty query matches everything.
pub(crate) fn prefix_matches(candidate: &str, query: &str) -> bool {
    let mut candidate_chars = candidate.chars();
    for qc in query.chars() {
        match candidate_chars.next() {
            Some(cc) if cc.to_lowercase().eq(qc.to_lowercase()) => {}
            _ => return false,
        }
    }
    true
}

/// Check if `ch` breaks a word (whitespace or ASCII punctuation).
fn is_word_break(ch: char) -> bool {
    ch.is_whitespace() || ch.is_ascii_punctuation()
}

/// Character offset where the word before `pos` starts.
///
/// Scans backward from `pos` (a character offset) for a position whose
/// preceding character breaks a word and whose own character is
/// alphanumeric. Falls back to 0 when no such transition exists.
pub(crate) fn word_start_before(text: &str, pos: usize) -> usize {
    let chars: Vec<char> = text.chars().collect();
    let mut idx = pos.min(chars.len());
    while idx > 0 {
        idx -= 1;
        if idx == 0 {
            return 0;
        }
        if is_word_break(chars[idx - 1]) && chars[idx].is_alphanumeric() {
            return idx;
        }
    }
    0
}

/// Copy `s` into a freshly reserved owned string.
pub(crate) fn try_copy(s: &str) -> Result<String, TryReserveError> {
    let mut out = String::new();
    out.try_reserve_exact(s.len())?;
    out.push_str(s);
    Ok(out)
}

/// Concatenate `a` and `b` into a freshly reserved owned string.
pub(crate) fn try_concat(a: &str, b: &str) -> Result<String, TryReserveError> {
    let mut out = String::new();
    out.try_reserve_exact(a.len() + b.len())?;
    out.push_str(a);
    out.push_str(b);
    Ok(out)
}

/// Substitute `value` for the `%s` insertion point in `template`.
///
/// Templates carry one insertion point; a template without one is returned
/// unchanged.
pub(crate) fn expand_template(template: &str, value: &str) -> Result<String, TryReserveError> {
    match template.find("%s") {
        Some(at) => {
            let mut out = String::new();
            out.try_reserve_exact(template.len() - 2 + value.len())?;
            out.push_str(&template[..at]);
            out.push_str(value);
            out.push_str(&template[at + 2..]);
            Ok(out)
        }
        None => try_copy(template),
    }
}
