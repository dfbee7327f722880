/// Cut `text` to `max_chars` characters, marking the cut with `...`
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_unchanged() {
        assert_eq!(truncate_text("rome", 40), "rome");
        assert_eq!(truncate_text("", 40), "");
    }

    #[test]
    fn test_long_text_cut() {
        let label = "a".repeat(41);
        assert_eq!(truncate_text(&label, 40), format!("{}...", "a".repeat(40)));
        assert_eq!(truncate_text(&"a".repeat(40), 40), "a".repeat(40));
    }

    #[test]
    fn test_cut_respects_char_boundaries() {
        assert_eq!(truncate_text("नमस्ते दुनिया", 3), "नमस...");
    }
}
