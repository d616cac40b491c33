//! Content policy for generated text.
//!
//! Raw provider output is normalized and bounded here before anything is
//! posted. Lengths are counted in `char`s, not bytes.

use crate::error::PolicyError;

/// Marker appended when text is cut to fit.
pub const ELLIPSIS: &str = "...";

/// Character limits applied to every post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthLimits {
    pub max_len: usize,
    /// Minimum for fact-backed topics.
    pub min_len: usize,
}

impl Default for LengthLimits {
    fn default() -> Self {
        Self {
            max_len: 280,
            min_len: 100,
        }
    }
}

/// Normalize `raw` and check it against the limits.
///
/// Trims whitespace and every layer of enclosing double quotes, truncates to
/// `max_len` (first `max_len - 3` chars plus `...`), then rejects empty or
/// too-short text.
///
/// # Examples
///
/// ```ignore
/// let text = validate("  \"Liverpool beat Everton 2-1!\"  ", 280, None).unwrap();
/// assert_eq!(text, "Liverpool beat Everton 2-1!");
/// ```
pub fn validate(raw: &str, max_len: usize, min_len: Option<usize>) -> Result<String, PolicyError> {
    let text = strip_enclosing_quotes(raw);

    if text.is_empty() {
        return Err(PolicyError::EmptyResponse);
    }

    let text = truncate_with_ellipsis(text, max_len);

    if let Some(min) = min_len {
        let len = text.chars().count();
        if len < min {
            return Err(PolicyError::TooShort { len, min });
        }
    }

    Ok(text)
}

/// Cut `text` to `max_len` chars, ending in [`ELLIPSIS`] when it was longer.
pub fn truncate_with_ellipsis(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let keep = max_len.saturating_sub(ELLIPSIS.len());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Peel matched `"…"` and `“…”` pairs, trimming between layers, until the
/// text is no longer enclosed. Single quotes are left alone.
fn strip_enclosing_quotes(mut text: &str) -> &str {
    const PAIRS: [(char, char); 2] = [('"', '"'), ('\u{201C}', '\u{201D}')];

    loop {
        text = text.trim();
        let inner = PAIRS.iter().find_map(|&(open, close)| {
            text.strip_prefix(open).and_then(|rest| rest.strip_suffix(close))
        });
        match inner {
            Some(inner) => text = inner,
            None => return text,
        }
    }
}
