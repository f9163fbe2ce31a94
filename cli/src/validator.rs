use reedline::{ValidationResult, Validator};

/// Net number of open `{` in `buffer`, ignoring strings and `//` comments.
///
/// Returns `None` for an unterminated string.
pub fn brace_depth(buffer: &str) -> Option<usize> {
    let mut depth: isize = 0;
    let mut chars = buffer.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => loop {
                match chars.next() {
                    Some('"') => break,
                    Some(_) => {}
                    None => return None,
                }
            },
            '/' if chars.peek() == Some(&'/') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '{' => depth += 1,
            '}' => depth -= 1,
            _ => {}
        }
    }
    Some(depth.max(0) as usize)
}

/// Keeps reading lines while a block or string is still open.
pub struct BlockValidator;

impl Validator for BlockValidator {
    fn validate(&self, line: &str) -> ValidationResult {
        match brace_depth(line) {
            Some(0) => ValidationResult::Complete,
            _ => ValidationResult::Incomplete,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brace_depth() {
        assert_eq!(brace_depth("print 1."), Some(0));
        assert_eq!(brace_depth("until x > 3 {"), Some(1));
        assert_eq!(brace_depth("if a { if b {"), Some(2));
        assert_eq!(brace_depth("if a { print 1. }"), Some(0));
        assert_eq!(brace_depth("}}"), Some(0));
    }

    #[test]
    fn test_strings_and_comments_are_ignored() {
        assert_eq!(brace_depth("print \"{\"."), Some(0));
        assert_eq!(brace_depth("print 1. // {"), Some(0));
        assert_eq!(brace_depth("print \"open"), None);
    }
}
