//! Word counting — whitespace-delimited tokens, nothing fancier.

/// Count whitespace-delimited tokens in `text`.
///
/// Runs of whitespace (space, tab, newline) collapse to one separator and
/// leading/trailing whitespace is ignored, so empty or all-whitespace
/// input counts zero. Punctuation stays attached to its token.
pub fn count_words(text: &str) -> u32 {
    text.split_whitespace().count() as u32
}
