//! Pull the Python code block out of a model response.

use regex::Regex;
use std::sync::LazyLock;

/// First fenced block labelled `python` or `py` (any case). The body is
/// matched lazily and the whitespace around it is left outside the capture.
static PYTHON_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)```(?:python|py)\s*([\s\S]+?)\s*```").expect("valid code block pattern")
});

/// Return the body of the first Python fenced block in `response`, or the
/// whole response when there is none.
pub fn extract_code(response: &str) -> &str {
    PYTHON_BLOCK
        .captures(response)
        .and_then(|caps| caps.get(1))
        .map_or(response, |body| body.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_block_after_explanation() {
        let response = "Explanation...\n```python\ndef f(): return 1\n```";
        assert_eq!(extract_code(response), "def f(): return 1");
    }

    #[test]
    fn falls_back_to_raw_text() {
        let response = "def f(): return 1";
        assert_eq!(extract_code(response), response);
    }

    #[test]
    fn label_is_case_insensitive() {
        assert_eq!(extract_code("```PYTHON\nx = 1\n```"), "x = 1");
        assert_eq!(extract_code("```Py\nx = 2\n```"), "x = 2");
    }

    #[test]
    fn first_of_several_blocks_wins() {
        let response = "```python\nfirst()\n```\nthen\n```python\nsecond()\n```";
        assert_eq!(extract_code(response), "first()");
    }

    #[test]
    fn unlabelled_fence_is_not_a_match() {
        let response = "```\nprint('hi')\n```";
        assert_eq!(extract_code(response), response);
    }

    #[test]
    fn whitespace_only_block_is_returned_as_captured() {
        // The lazy body needs one character, so a single newline survives.
        assert_eq!(extract_code("```python\n```"), "\n");
    }

    #[test]
    fn extraction_is_idempotent_on_the_same_response() {
        let response = "Sure:\n```python\n    return a + b\n```\nDone.";
        let first = extract_code(response);
        let second = extract_code(response);
        assert_eq!(first, second);
        assert_eq!(first, "return a + b");
    }
}
