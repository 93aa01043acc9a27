/// Removes a markdown code fence wrapping the whole response, if present.
///
/// The opening fence may carry an info string (```` ```markdown ````).
/// Text that is not fully enclosed, or whose body contains another fence
/// line, is returned trimmed but otherwise intact.
pub fn strip_code_fence(text: &str) -> String {
    let trimmed = text.trim();

    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };

    let Some((info, body)) = rest.split_once('\n') else {
        return trimmed.to_string();
    };

    if info.trim().contains(char::is_whitespace) || info.contains('`') {
        return trimmed.to_string();
    }

    let Some(inner) = body.trim_end().strip_suffix("```") else {
        return trimmed.to_string();
    };

    // Several fenced blocks, not one wrapper.
    if inner.lines().any(|line| line.trim_start().starts_with("```")) {
        return trimmed.to_string();
    }

    inner.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_markdown_fence() {
        let text = "```markdown\n## Purpose\nParses input.\n```";
        assert_eq!(strip_code_fence(text), "## Purpose\nParses input.");
    }

    #[test]
    fn test_strips_bare_fence_with_surrounding_whitespace() {
        let text = "\n  ```\n## Purpose\n\nThing\n```  \n";
        assert_eq!(strip_code_fence(text), "## Purpose\n\nThing");
    }

    #[test]
    fn test_unfenced_text_is_trimmed_only() {
        assert_eq!(strip_code_fence("  ## Purpose\nok\n"), "## Purpose\nok");
    }

    #[test]
    fn test_inner_code_blocks_are_kept() {
        let text = "## Purpose\n\n```rust\nfn main() {}\n```";
        assert_eq!(strip_code_fence(text), text);
    }

    #[test]
    fn test_unterminated_fence_is_kept() {
        let text = "```markdown\n## Purpose\nno closing fence";
        assert_eq!(strip_code_fence(text), text);
    }

    #[test]
    fn test_separate_leading_and_trailing_blocks_are_kept() {
        let text = "```python\na = 1\n```\nBoth helpers share state.\n```python\nb = 2\n```";
        assert_eq!(strip_code_fence(text), text);
    }

    #[test]
    fn test_single_line_fence_is_kept() {
        assert_eq!(strip_code_fence("```inline```"), "```inline```");
    }
}
