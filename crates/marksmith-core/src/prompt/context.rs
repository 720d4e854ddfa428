//! Preceding-lines context window.

/// Join the lines immediately before `line_index`, at most `count` of them.
///
/// A `count` of zero or less disables the window.
pub fn preceding_context<S: AsRef<str>>(lines: &[S], line_index: usize, count: i64) -> String {
    if count <= 0 {
        return String::new();
    }
    let end = line_index.min(lines.len());
    let wanted = usize::try_from(count).unwrap_or(usize::MAX);
    let start = end.saturating_sub(wanted);
    join_preceding(&lines[start..end])
}

/// Join already-windowed lines with `\n`.
pub fn join_preceding<S: AsRef<str>>(lines: &[S]) -> String {
    lines
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Vec<&'static str> {
        vec!["one", "two", "three", "four"]
    }

    #[test]
    fn zero_count_is_empty() {
        assert_eq!(preceding_context(&doc(), 3, 0), "");
    }

    #[test]
    fn negative_count_is_treated_as_zero() {
        assert_eq!(preceding_context(&doc(), 3, -4), "");
    }

    #[test]
    fn window_takes_nearest_lines() {
        assert_eq!(preceding_context(&doc(), 3, 2), "two\nthree");
    }

    #[test]
    fn large_count_takes_everything_in_order() {
        assert_eq!(preceding_context(&doc(), 3, 3), "one\ntwo\nthree");
        assert_eq!(preceding_context(&doc(), 3, 100), "one\ntwo\nthree");
        assert_eq!(preceding_context(&doc(), 3, i64::MAX), "one\ntwo\nthree");
    }

    #[test]
    fn first_line_has_no_context() {
        assert_eq!(preceding_context(&doc(), 0, 5), "");
    }

    #[test]
    fn index_past_end_is_clamped() {
        assert_eq!(preceding_context(&doc(), 10, 1), "four");
    }
}
