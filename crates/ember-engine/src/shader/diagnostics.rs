/// Upper bound on a stored compile/link diagnostic, in bytes.
///
/// Diagnostics must stay complete enough to act on (never cut below a few
/// hundred characters) while a pathological transcript cannot balloon the
/// error value.
pub const MAX_DIAGNOSTIC_LEN: usize = 4096;

/// Truncates a diagnostic transcript to [`MAX_DIAGNOSTIC_LEN`] bytes.
///
/// Truncation lands on a char boundary and appends a marker so a clipped
/// log is never mistaken for a complete one.
pub(crate) fn truncate_log(mut log: String) -> String {
    if log.len() <= MAX_DIAGNOSTIC_LEN {
        return log;
    }

    let mut cut = MAX_DIAGNOSTIC_LEN;
    while !log.is_char_boundary(cut) {
        cut -= 1;
    }
    log.truncate(cut);
    log.push_str("\n… (diagnostic truncated)");
    log
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_logs_pass_through_unchanged() {
        let log = "error: expected ';'".to_string();
        assert_eq!(truncate_log(log.clone()), log);
    }

    #[test]
    fn long_logs_are_bounded_and_marked() {
        let log = "x".repeat(MAX_DIAGNOSTIC_LEN * 2);
        let truncated = truncate_log(log);
        assert!(truncated.len() < MAX_DIAGNOSTIC_LEN + 64);
        assert!(truncated.ends_with("(diagnostic truncated)"));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        // Multi-byte characters straddling the cut must not split.
        let log = "é".repeat(MAX_DIAGNOSTIC_LEN);
        let truncated = truncate_log(log);
        assert!(truncated.is_char_boundary(truncated.len()));
    }

    #[test]
    fn bound_is_not_below_a_few_hundred_chars() {
        assert!(MAX_DIAGNOSTIC_LEN >= 512);
    }
}
