//! Repair prompt construction.

/// Default number of trailing diagnostic characters kept in a prompt.
pub const DEFAULT_DIAGNOSTIC_TAIL: usize = 1500;

const PERSONA: &str = "Act as a Senior Engineer. Fix this code.";
const INSTRUCTION: &str = "INSTRUCTION: Return ONLY the complete fixed code inside a single fenced code block (```). No explanations.";

/// Builds one textual prompt per repair request.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    diagnostic_tail: usize,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_DIAGNOSTIC_TAIL)
    }
}

impl PromptBuilder {
    pub fn new(diagnostic_tail: usize) -> Self {
        Self { diagnostic_tail }
    }

    /// Persona, tail-truncated diagnostic, full source, fenced-output instruction.
    pub fn build(&self, source: &str, diagnostic: &str) -> String {
        format!(
            "{}\nERROR: {}\nCODE:\n{}\n{}",
            PERSONA,
            tail_chars(diagnostic, self.diagnostic_tail),
            source,
            INSTRUCTION
        )
    }
}

/// The last `max` characters of `text`, on a char boundary.
pub fn tail_chars(text: &str, max: usize) -> &str {
    let count = text.chars().count();
    if count <= max {
        return text;
    }
    match text.char_indices().nth(count - max) {
        Some((idx, _)) => &text[idx..],
        None => text,
    }
}

/// The first `max` characters of `text`, on a char boundary.
pub fn head_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_layout() {
        let prompt = PromptBuilder::default().build("print(x)", "NameError: name 'x' is not defined");
        assert!(prompt.starts_with(PERSONA));
        assert!(prompt.contains("ERROR: NameError: name 'x' is not defined"));
        assert!(prompt.contains("CODE:\nprint(x)\n"));
        assert!(prompt.ends_with(INSTRUCTION));
    }

    #[test]
    fn test_diagnostic_keeps_tail() {
        let diagnostic = format!("{}{}", "a".repeat(5000), "LAST LINE");
        let prompt = PromptBuilder::new(20).build("code", &diagnostic);
        assert!(prompt.contains("ERROR: aaaaaaaaaaaLAST LINE\n"));
        assert!(!prompt.contains(&"a".repeat(12)));
    }

    #[test]
    fn test_source_not_truncated() {
        let source = "x = 1\n".repeat(2000);
        let prompt = PromptBuilder::new(10).build(&source, "err");
        assert!(prompt.contains(&source));
    }

    #[test]
    fn test_tail_chars_multibyte() {
        assert_eq!(tail_chars("héllo wörld", 5), "wörld");
        assert_eq!(tail_chars("short", 10), "short");
        assert_eq!(tail_chars("", 3), "");
    }

    #[test]
    fn test_head_chars_multibyte() {
        assert_eq!(head_chars("héllo wörld", 5), "héllo");
        assert_eq!(head_chars("ab", 10), "ab");
    }
}
