//! Map one batched generation response back onto its markers.

/// Split a batched response into exactly `expected` outputs.
///
/// Lines are trimmed and blank lines dropped, so a stray separator line
/// never shifts the mapping. Surviving lines are taken positionally; missing
/// slots become empty strings. Never fails.
pub fn demultiplex(raw: &str, expected: usize) -> Vec<String> {
    let mut outputs: Vec<String> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(expected)
        .map(str::to_string)
        .collect();
    outputs.resize(expected, String::new());
    outputs
}

/// Remove one code fence wrapping a whole batched response.
///
/// Must run before [`demultiplex`]: once the response is split, the fence
/// lines would take the first and last output slots.
pub fn strip_response_fence(raw: &str) -> &str {
    strip_code_fence(raw.trim())
}

/// Math wrappers a generator sometimes adds despite being told not to,
/// longest first so `$$` is tried before `$`.
const MATH_WRAPPERS: &[(&str, &str)] = &[("$$", "$$"), ("\\[", "\\]"), ("\\(", "\\)"), ("$", "$")];

/// Trim a generated math expression and strip one surrounding code fence
/// and one surrounding math-delimiter pair.
///
/// A wrapper is only stripped when the opening token does not reappear
/// inside, so `$a$ + $b$` is left alone.
pub fn clean_expression(text: &str) -> String {
    let mut s = strip_code_fence(text.trim()).trim();
    for &(open, close) in MATH_WRAPPERS {
        if s.len() < open.len() + close.len() {
            continue;
        }
        if let Some(inner) = s.strip_prefix(open).and_then(|r| r.strip_suffix(close)) {
            if !inner.contains(open) {
                s = inner.trim();
                break;
            }
        }
    }
    s.to_string()
}

fn strip_code_fence(s: &str) -> &str {
    const FENCE: &str = "```";
    let Some(inner) = s
        .strip_prefix(FENCE)
        .and_then(|r| r.strip_suffix(FENCE))
    else {
        return s;
    };
    // Drop the info string (```latex) on the opening line.
    match inner.find('\n') {
        Some(pos) => &inner[pos + 1..],
        None => inner,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_response_keeps_positions() {
        let raw = "```latex\n\\alpha\n\\beta\n```\n";
        assert_eq!(
            demultiplex(strip_response_fence(raw), 2),
            vec!["\\alpha", "\\beta"]
        );
        assert_eq!(strip_response_fence("  a\nb  "), "a\nb");
    }

    #[test]
    fn exact_count_is_positional() {
        assert_eq!(demultiplex("a\nb\nc", 3), vec!["a", "b", "c"]);
    }

    #[test]
    fn lines_are_trimmed() {
        assert_eq!(demultiplex("  x^2 \r\n\ty ", 2), vec!["x^2", "y"]);
    }

    #[test]
    fn blank_lines_do_not_shift_mapping() {
        assert_eq!(
            demultiplex("\n\\alpha\n\n   \n\\beta\n\n", 2),
            vec!["\\alpha", "\\beta"]
        );
    }

    #[test]
    fn short_response_pads_with_empty() {
        assert_eq!(demultiplex("only", 3), vec!["only", "", ""]);
        assert_eq!(demultiplex("", 2), vec!["", ""]);
    }

    #[test]
    fn long_response_is_truncated() {
        assert_eq!(demultiplex("a\nb\nc\nd", 2), vec!["a", "b"]);
    }

    #[test]
    fn zero_expected_is_empty() {
        assert!(demultiplex("a\nb", 0).is_empty());
    }

    #[test]
    fn always_returns_expected_length() {
        let responses = ["", "\n\n", "a", "a\n\nb\n\nc\n\nd\ne\nf", "   x   "];
        for raw in responses {
            for n in 0..6 {
                assert_eq!(demultiplex(raw, n).len(), n, "raw {raw:?}, n {n}");
            }
        }
    }

    #[test]
    fn clean_strips_one_math_wrapper() {
        assert_eq!(clean_expression(" $x^2$ "), "x^2");
        assert_eq!(clean_expression("$$\\int f$$"), "\\int f");
        assert_eq!(clean_expression("\\[ a + b \\]"), "a + b");
        assert_eq!(clean_expression("\\(\\alpha\\)"), "\\alpha");
    }

    #[test]
    fn clean_leaves_multiple_inline_segments() {
        assert_eq!(clean_expression("$a$ + $b$"), "$a$ + $b$");
    }

    #[test]
    fn clean_strips_code_fence() {
        assert_eq!(clean_expression("```latex\n\\frac{1}{2}\n```"), "\\frac{1}{2}");
        assert_eq!(clean_expression("```\n$x$\n```"), "x");
    }

    #[test]
    fn clean_leaves_plain_expression() {
        assert_eq!(clean_expression("\\mathcal{N}(0,1)"), "\\mathcal{N}(0,1)");
        assert_eq!(clean_expression("   "), "");
        assert_eq!(clean_expression("$"), "$");
    }
}
