//! Command token splitting.

/// Splits `text` at its first whitespace run.
///
/// Returns the text before the run and the text after it. Nothing else is
/// trimmed: leading whitespace yields an empty first token, and whitespace
/// inside the remainder is kept verbatim.
///
/// ```rust
/// use courier_framework::split_first_token;
///
/// assert_eq!(split_first_token("deploy  api now"), ("deploy", "api now"));
/// assert_eq!(split_first_token("deploy"), ("deploy", ""));
/// ```
pub fn split_first_token(text: &str) -> (&str, &str) {
    match text.find(char::is_whitespace) {
        Some(start) => (&text[..start], text[start..].trim_start()),
        None => (text, ""),
    }
}

/// Returns true if `token` can ever equal a first token produced by
/// [`split_first_token`].
pub fn is_valid_command_token(token: &str) -> bool {
    !token.is_empty() && !token.contains(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_simple() {
        assert_eq!(split_first_token("foo bar baz"), ("foo", "bar baz"));
    }

    #[test]
    fn test_split_single_token() {
        assert_eq!(split_first_token("foo"), ("foo", ""));
        assert_eq!(split_first_token(""), ("", ""));
    }

    #[test]
    fn test_split_consumes_whole_run() {
        assert_eq!(split_first_token("foo \t\n bar"), ("foo", "bar"));
        assert_eq!(split_first_token("foo   "), ("foo", ""));
    }

    #[test]
    fn test_split_keeps_inner_whitespace() {
        assert_eq!(split_first_token("foo bar  baz "), ("foo", "bar  baz "));
    }

    #[test]
    fn test_split_leading_whitespace() {
        assert_eq!(split_first_token("  foo bar"), ("", "foo bar"));
    }

    #[test]
    fn test_split_is_case_preserving() {
        assert_eq!(split_first_token("Foo BAR"), ("Foo", "BAR"));
    }

    #[test]
    fn test_valid_command_tokens() {
        assert!(is_valid_command_token("deploy"));
        assert!(is_valid_command_token("!help"));
        assert!(!is_valid_command_token(""));
        assert!(!is_valid_command_token("two words"));
        assert!(!is_valid_command_token("tab\t"));
    }
}
