/// Flattens text into a single line.
///
/// Newlines and the whitespace around them become one space, any remaining
/// whitespace run becomes one space, and the ends are trimmed.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
