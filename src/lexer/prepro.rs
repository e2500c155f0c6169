use regex::{Captures, Regex};

lazy_static::lazy_static! {
    /// Non-greedy `/* ... */` span; may cross lines, does not nest
    static ref BLOCK_COMMENT: Regex = Regex::new(r"(?s)/\*.*?\*/").unwrap();
}

/// Blanks out every `/* ... */` block comment in the source text
///
/// Each comment character becomes a space and newlines are kept, so tokens
/// after a comment keep their original line and column. Line comments are
/// not recognised. An unclosed `/*` is left in place and later rejected by
/// the parser.
pub fn strip_comments(source: &str) -> String {
    BLOCK_COMMENT
        .replace_all(source, |caps: &Captures| {
            caps[0]
                .chars()
                .map(|c| if c == '\n' { '\n' } else { ' ' })
                .collect::<String>()
        })
        .into_owned()
}
