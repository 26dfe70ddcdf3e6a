/// Replaces CRLF and lone CR with LF, and every tab with a single space.
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n").replace('\t', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crlf_and_cr() {
        assert_eq!(normalize_newlines("a\r\nb\rc\nd"), "a\nb\nc\nd");
    }

    #[test]
    fn test_crcrlf_yields_two_lines() {
        assert_eq!(normalize_newlines("a\r\r\nb"), "a\n\nb");
    }

    #[test]
    fn test_tabs_become_spaces() {
        assert_eq!(normalize_newlines("\tindented\tcell"), " indented cell");
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(normalize_newlines("nothing to do"), "nothing to do");
        assert_eq!(normalize_newlines(""), "");
    }
}
