//! Request text sent to the summarization service.

/// System instruction shared by every file summary request.
pub const INSTRUCTION: &str = "You are an expert software engineering assistant. \
Your task is to analyze individual source code files and provide a concise, high-level summary.

Your entire response MUST be in markdown format.
Do NOT wrap your response in a markdown code block (i.e., do not use ```markdown).
Structure your response with the following headers: '## Purpose', '## Key Components', and '## Potential Complexities'.";

pub const TRUNCATION_MARKER: &str = "\n... (file truncated)";

/// Cuts `content` to at most `max_chars` characters and appends the marker.
pub fn truncate(content: &str, max_chars: usize) -> std::borrow::Cow<'_, str> {
    match content.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => {
            std::borrow::Cow::Owned(format!("{}{}", &content[..byte_idx], TRUNCATION_MARKER))
        }
        None => std::borrow::Cow::Borrowed(content),
    }
}

pub fn build_user_prompt(relative_path: &str, content: &str) -> String {
    format!(
        "Analyze this file: `{}`\n\n```\n{}\n```",
        relative_path, content
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_content_untouched() {
        assert_eq!(truncate("abc", 3), "abc");
    }

    #[test]
    fn test_long_content_truncated_with_marker() {
        assert_eq!(truncate("abcdef", 4), format!("abcd{}", TRUNCATION_MARKER));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        assert_eq!(truncate("ééé", 2), format!("éé{}", TRUNCATION_MARKER));
    }

    #[test]
    fn test_build_user_prompt() {
        assert_eq!(
            build_user_prompt("src/a.py", "print(1)"),
            "Analyze this file: `src/a.py`\n\n```\nprint(1)\n```"
        );
    }
}
