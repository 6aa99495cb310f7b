//! String utilities for the domain layer.

/// Collapse whitespace runs into single spaces and truncate to `max_chars`
/// characters, appending an ellipsis when anything was cut.
///
/// Used for one-line previews of message content (contact lists, logs).
pub fn preview(s: &str, max_chars: usize) -> String {
    let collapsed = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }
    let kept: String = collapsed.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", kept.trim_end())
}

/// Trimmed copy of `s`, or `None` when nothing but whitespace remains.
pub fn non_blank(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_short_text_is_unchanged() {
        assert_eq!(preview("hello", 10), "hello");
    }

    #[test]
    fn test_preview_collapses_newlines() {
        assert_eq!(preview("line one\n\nline   two", 40), "line one line two");
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        assert_eq!(preview("今天有什么安排吗", 5), "今天有什…");
        assert_eq!(preview("hello world", 6), "hello…");
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank("  key  "), Some("key"));
        assert_eq!(non_blank(" \t\n"), None);
    }
}
