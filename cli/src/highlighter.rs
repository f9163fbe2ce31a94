use nu_ansi_term::{Color, Style};
use reedline::StyledText;

const KEYWORDS: &[&str] = &[
    "add", "all", "at", "break", "clearscreen", "copy", "declare", "delete", "edit", "else",
    "file", "for", "from", "if", "in", "is", "list", "lock", "log", "off", "on", "parameter",
    "print", "reboot", "remove", "rename", "run", "set", "shutdown", "stage", "switch", "then",
    "to", "toggle", "unlock", "unset", "until", "volume", "wait", "when",
];

const OPERATORS: &[&str] = &["and", "or", "not", "true", "false"];

#[derive(Debug, Clone, Copy, PartialEq)]
enum Class {
    Plain,
    Keyword,
    Constant,
    Number,
    String,
    Comment,
}

impl Class {
    fn style(self) -> Style {
        match self {
            Class::Plain => Style::new().fg(Color::White),
            Class::Keyword => Style::new().fg(Color::Magenta),
            Class::Constant => Style::new().fg(Color::Cyan),
            Class::Number => Style::new().fg(Color::Cyan),
            Class::String => Style::new().fg(Color::Green),
            Class::Comment => Style::new().fg(Color::DarkGray),
        }
    }
}

fn classify_word(word: &str) -> Class {
    let lower = word.to_ascii_lowercase();
    if KEYWORDS.contains(&lower.as_str()) {
        Class::Keyword
    } else if OPERATORS.contains(&lower.as_str()) {
        Class::Constant
    } else if word.starts_with(|c: char| c.is_ascii_digit()) {
        Class::Number
    } else {
        Class::Plain
    }
}

/// Split a line into classified runs. Concatenating the runs gives back
/// the line.
fn tokenize(line: &str) -> Vec<(Class, &str)> {
    let mut runs = Vec::new();
    let bytes = line.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let start = i;
        let class = match bytes[i] {
            b'"' => {
                i += 1;
                while i < bytes.len() && bytes[i] != b'"' {
                    i += 1;
                }
                i = (i + 1).min(bytes.len());
                Class::String
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                i = bytes.len();
                Class::Comment
            }
            b if b.is_ascii_alphanumeric() || b == b'_' => {
                // A period followed by a digit belongs to a number.
                while i < bytes.len()
                    && (bytes[i].is_ascii_alphanumeric()
                        || bytes[i] == b'_'
                        || (bytes[i] == b'.'
                            && bytes[start].is_ascii_digit()
                            && bytes.get(i + 1).is_some_and(u8::is_ascii_digit)))
                {
                    i += 1;
                }
                classify_word(&line[start..i])
            }
            _ => {
                i += line[i..].chars().next().map_or(1, char::len_utf8);
                Class::Plain
            }
        };
        runs.push((class, &line[start..i]));
    }
    runs
}

/// Keyword highlighting for the REPL prompt.
pub struct KerboHighlighter;

impl reedline::Highlighter for KerboHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut output = StyledText::new();
        for (class, text) in tokenize(line) {
            output.push((class.style(), text.to_string()));
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_round_trips_line() {
        let line = "SET x TO 1.5 + \"a b\". // done";
        let joined: String = tokenize(line).iter().map(|(_, text)| *text).collect();
        assert_eq!(joined, line);
    }

    #[test]
    fn test_classes() {
        let runs = tokenize("lock throttle to 0.5. print \"hi\".");
        let classes: Vec<_> = runs
            .iter()
            .filter(|(_, text)| !text.trim().is_empty() && *text != ".")
            .map(|(class, text)| (*class, *text))
            .collect();
        assert_eq!(
            classes,
            vec![
                (Class::Keyword, "lock"),
                (Class::Plain, "throttle"),
                (Class::Keyword, "to"),
                (Class::Number, "0.5"),
                (Class::Keyword, "print"),
                (Class::String, "\"hi\""),
            ]
        );
    }
}
