//! Description normalization for the control file
//!
//! The synopsis must be a single line; the extended description is a
//! sequence of continuation lines, each starting with a space, where a lone
//! `.` stands for a blank line.

/// Maximum width of a wrapped extended description line, excluding indent
pub const WRAP_WIDTH: usize = 80;

/// Indent placed in front of every extended description line
pub const WRAP_INDENT: &str = " ";

/// Replace every run of line breaks with a single space
pub fn normalize_description(description: &str) -> String {
    let mut normalized = String::with_capacity(description.len());
    let mut in_break = false;

    for c in description.chars() {
        if c == '\r' || c == '\n' {
            if !in_break {
                normalized.push(' ');
                in_break = true;
            }
        } else {
            normalized.push(c);
            in_break = false;
        }
    }

    normalized
}

/// Turn free text into a control file extended description
///
/// Line endings are normalized, empty lines become `.` and every line is
/// word-wrapped to [`WRAP_WIDTH`] columns with a [`WRAP_INDENT`] prefix.
pub fn normalize_extended_description(description: &str) -> String {
    description
        .replace("\r\n", "\n")
        .split('\n')
        .map(|line| if line.trim().is_empty() { "." } else { line })
        .map(|line| wrap_line(line, WRAP_WIDTH, WRAP_INDENT))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Greedy word wrap of a single line
///
/// Whitespace runs collapse to one space. Words longer than `width` are
/// split so that no output line exceeds `width` characters plus the indent.
pub fn wrap_line(line: &str, width: usize, indent: &str) -> String {
    let width = width.max(1);
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in line.split_whitespace().flat_map(|word| split_long_word(word, width)) {
        let word_len = word.chars().count();
        if current_len > 0 && current_len + 1 + word_len > width {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(&word);
        current_len += word_len;
    }
    lines.push(current);

    lines
        .iter()
        .map(|l| format!("{indent}{l}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn split_long_word(word: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    chars.chunks(width).map(|chunk| chunk.iter().collect()).collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_normalize_description_collapses_breaks() {
        assert_eq!(normalize_description("one\ntwo"), "one two");
        assert_eq!(normalize_description("one\r\ntwo\n\n\nthree"), "one two three");
        assert_eq!(normalize_description("single line"), "single line");
    }

    #[test]
    fn test_extended_description_single_line() {
        assert_eq!(
            normalize_extended_description("An example directory structure to work with pkg-deb"),
            " An example directory structure to work with pkg-deb"
        );
    }

    #[test]
    fn test_extended_description_blank_lines() {
        assert_eq!(
            normalize_extended_description("First paragraph.\n\nSecond paragraph."),
            " First paragraph.\n .\n Second paragraph."
        );
        assert_eq!(normalize_extended_description("a\r\n\r\nb"), " a\n .\n b");
    }

    #[test]
    fn test_extended_description_wraps_long_lines() {
        let text = "word ".repeat(40);
        let wrapped = normalize_extended_description(text.trim());
        let lines: Vec<&str> = wrapped.lines().collect();

        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.starts_with(' '));
            assert!(line.chars().count() <= WRAP_WIDTH + 1, "line too long: {line:?}");
        }
        // No words are lost
        assert_eq!(wrapped.split_whitespace().count(), 40);
    }

    #[test]
    fn test_wrap_splits_overlong_words() {
        let word = "x".repeat(200);
        let wrapped = wrap_line(&word, 80, " ");
        let lines: Vec<&str> = wrapped.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].len(), 81);
        assert_eq!(lines[2].len(), 41);
    }

    proptest! {
        #[test]
        fn extended_lines_never_exceed_width(text in "[a-zA-Z .,\n]{0,600}") {
            let normalized = normalize_extended_description(&text);
            for line in normalized.split('\n') {
                prop_assert!(line.starts_with(' '));
                prop_assert!(line.chars().count() <= WRAP_WIDTH + 1);
                prop_assert!(line.trim() != "");
            }
        }

        #[test]
        fn description_is_single_line(text in "(?s).{0,200}") {
            let normalized = normalize_description(&text);
            prop_assert!(!normalized.contains('\n'));
            prop_assert!(!normalized.contains('\r'));
        }
    }
}
