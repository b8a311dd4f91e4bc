//! Text normalization applied to every extracted document

use regex::Regex;

pub struct TextProcessor {
    newline_runs: Regex,
    whitespace_runs: Regex,
}

impl Default for TextProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextProcessor {
    pub fn new() -> Self {
        let newline_runs = Regex::new(r"\n+").expect("Invalid newline regex");
        let whitespace_runs = Regex::new(r"\s{2,}").expect("Invalid whitespace regex");

        Self {
            newline_runs,
            whitespace_runs,
        }
    }

    /// Normalize raw extracted text.
    ///
    /// The steps run in a fixed order: newline runs collapse to one newline,
    /// then any run of two or more whitespace characters becomes one space,
    /// then the result is trimmed. A newline next to other whitespace is
    /// therefore folded into a space by the second step.
    pub fn normalize(&self, text: &str) -> String {
        let collapsed = self.newline_runs.replace_all(text, "\n");
        let spaced = self.whitespace_runs.replace_all(&collapsed, " ");
        spaced.trim().to_string()
    }

    /// First `max_chars` characters, cut back to a word boundary.
    pub fn preview(text: &str, max_chars: usize) -> String {
        if text.chars().count() <= max_chars {
            return text.to_string();
        }

        let truncated: String = text.chars().take(max_chars).collect();
        let cut = truncated.rfind(char::is_whitespace).unwrap_or(truncated.len());
        format!("{}...", truncated[..cut].trim_end())
    }

    pub fn word_count(text: &str) -> usize {
        text.split_whitespace().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newline_runs_collapse() {
        let processor = TextProcessor::new();
        assert_eq!(processor.normalize("a\n\n\nb"), "a\nb");
    }

    #[test]
    fn test_space_runs_collapse() {
        let processor = TextProcessor::new();
        assert_eq!(processor.normalize("a    b"), "a b");
        assert_eq!(processor.normalize("a\t\tb"), "a b");
        assert_eq!(processor.normalize("a b"), "a b");
    }

    #[test]
    fn test_trims_ends() {
        let processor = TextProcessor::new();
        assert_eq!(processor.normalize("\n\n  Jane Doe  \n"), "Jane Doe");
        assert_eq!(processor.normalize(" \n \t "), "");
    }

    #[test]
    fn test_newline_next_to_spaces_becomes_space() {
        let processor = TextProcessor::new();
        assert_eq!(processor.normalize("Skills \n\nRust"), "Skills Rust");
        assert_eq!(processor.normalize("Skills\nRust"), "Skills\nRust");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let processor = TextProcessor::new();
        let once = processor.normalize("Jane\n\n\nDoe   Senior  \n Engineer\n");
        assert_eq!(processor.normalize(&once), once);
    }

    #[test]
    fn test_preview_cuts_on_word_boundary() {
        let text = "Senior Python engineer with AWS";
        assert_eq!(TextProcessor::preview(text, 100), text);
        assert_eq!(TextProcessor::preview(text, 16), "Senior Python...");
    }
}
