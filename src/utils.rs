// src/utils.rs

/// Strips control characters a streamed reply could smuggle into the
/// terminal, keeping newlines and tabs.
pub fn sanitize_markup(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_newlines_and_tabs_but_drops_escapes() {
        let raw = "line one\n\tindented\u{1b}[31m red?\r";
        assert_eq!(sanitize_markup(raw), "line one\n\tindented[31m red?");
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(sanitize_markup("The limit is 65 mph."), "The limit is 65 mph.");
    }
}
