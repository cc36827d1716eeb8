//! The answer/citation string protocol.
//!
//! The service returns `{ answer, sources }`, but the display contract is a
//! single text blob: the answer joined to the first citation with a literal
//! delimiter. `compose_payload` builds that blob on receipt and
//! `parse_answer` splits it back into display elements. Both directions are
//! reproduced exactly as the upstream contract behaves, including the
//! truncation to one citation.

/// Boundary between the freeform answer and the citation block.
pub const SOURCE_DELIMITER: &str = "\n\nSource(s):\n- ";

/// Leading label stripped from the answer segment for emphasized display.
const ANSWER_LABEL: &str = "answer:";

/// A bot payload split into display elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAnswer {
    /// Human-readable answer text.
    pub answer: String,
    /// True when a leading `Answer:` label was stripped and should be
    /// re-rendered emphasized by the display surface.
    pub labeled: bool,
    /// The citation block from the delimiter onward, trimmed. Opaque text:
    /// rendered verbatim, never interpreted as markup.
    pub sources: Option<String>,
}

/// Split a raw bot payload into answer and citation block.
///
/// Deterministic and stateless. The answer segment is only trimmed when a
/// delimiter is found; without one the text passes through untouched, so
/// re-parsing a parsed answer yields itself.
pub fn parse_answer(raw: &str) -> ParsedAnswer {
    let (segment, sources) = match raw.find(SOURCE_DELIMITER) {
        Some(idx) => (
            raw[..idx].trim(),
            Some(raw[idx..].trim().to_string()),
        ),
        None => (raw, None),
    };

    match strip_answer_label(segment) {
        Some(rest) => ParsedAnswer {
            answer: rest.to_string(),
            labeled: true,
            sources,
        },
        None => ParsedAnswer {
            answer: segment.to_string(),
            labeled: false,
            sources,
        },
    }
}

/// Join an answer and its citations into the combined payload.
///
/// Only the first citation is carried; the rest are discarded. This is the
/// upstream wire contract, not a choice made here.
pub fn compose_payload(answer: &str, sources: &[String]) -> String {
    match sources.first() {
        Some(first) => format!("{}{}{}", answer, SOURCE_DELIMITER, first.trim()),
        None => answer.to_string(),
    }
}

/// Strip a case-insensitive leading `Answer:` label plus any following
/// whitespace (newlines included). Returns the trimmed remainder, or `None`
/// when the label is absent or nothing follows it — an answer that is only
/// the label is left alone rather than rendered empty.
fn strip_answer_label(segment: &str) -> Option<&str> {
    let head = segment.get(..ANSWER_LABEL.len())?;
    if !head.eq_ignore_ascii_case(ANSWER_LABEL) {
        return None;
    }
    let rest = segment[ANSWER_LABEL.len()..].trim();
    if rest.is_empty() {
        None
    } else {
        Some(rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labeled_answer_with_sources() {
        let parsed = parse_answer("Answer: X\n\nSource(s):\n- Y");
        assert_eq!(parsed.answer, "X");
        assert!(parsed.labeled);
        assert_eq!(parsed.sources.as_deref(), Some("Source(s):\n- Y"));
    }

    #[test]
    fn test_no_delimiter_passes_through() {
        let parsed = parse_answer("X");
        assert_eq!(parsed.answer, "X");
        assert!(!parsed.labeled);
        assert!(parsed.sources.is_none());
    }

    #[test]
    fn test_reparse_is_identity() {
        let first = parse_answer("Answer: the total is $500\n\nSource(s):\n- p.3");
        let second = parse_answer(&first.answer);
        assert_eq!(second.answer, first.answer);
        assert!(!second.labeled);
        assert!(second.sources.is_none());
    }

    #[test]
    fn test_label_is_case_insensitive() {
        for raw in ["answer: X", "ANSWER: X", "AnSwEr: X"] {
            let parsed = parse_answer(raw);
            assert_eq!(parsed.answer, "X", "input: {raw}");
            assert!(parsed.labeled, "input: {raw}");
        }
    }

    #[test]
    fn test_label_spans_newlines() {
        let parsed = parse_answer("Answer:\n  \nthe details follow");
        assert_eq!(parsed.answer, "the details follow");
        assert!(parsed.labeled);
    }

    #[test]
    fn test_bare_label_stays_unlabeled() {
        let parsed = parse_answer("Answer:");
        assert_eq!(parsed.answer, "Answer:");
        assert!(!parsed.labeled);

        let parsed = parse_answer("Answer:   \n ");
        assert_eq!(parsed.answer, "Answer:   \n ");
        assert!(!parsed.labeled);
    }

    #[test]
    fn test_label_not_at_start_is_ignored() {
        let parsed = parse_answer("  Answer: X");
        assert_eq!(parsed.answer, "  Answer: X");
        assert!(!parsed.labeled);
    }

    #[test]
    fn test_answer_segment_trimmed_only_with_delimiter() {
        let parsed = parse_answer("  X  \n\nSource(s):\n- Y");
        assert_eq!(parsed.answer, "X");

        let parsed = parse_answer("  X  ");
        assert_eq!(parsed.answer, "  X  ");
    }

    #[test]
    fn test_delimiter_at_start_yields_empty_answer() {
        let parsed = parse_answer("\n\nSource(s):\n- Y");
        assert_eq!(parsed.answer, "");
        assert!(!parsed.labeled);
        assert_eq!(parsed.sources.as_deref(), Some("Source(s):\n- Y"));
    }

    #[test]
    fn test_multibyte_prefix_does_not_panic() {
        let parsed = parse_answer("ВОПРОС: X");
        assert_eq!(parsed.answer, "ВОПРОС: X");
        assert!(!parsed.labeled);
    }

    #[test]
    fn test_compose_without_sources() {
        assert_eq!(compose_payload("X", &[]), "X");
    }

    #[test]
    fn test_compose_truncates_to_first_source() {
        let sources = vec!["p.3 ".to_string(), "p.7".to_string()];
        assert_eq!(compose_payload("X", &sources), "X\n\nSource(s):\n- p.3");
    }

    #[test]
    fn test_compose_then_parse_round_trip() {
        let sources = vec!["p.3".to_string()];
        let raw = compose_payload("Answer: $500", &sources);
        let parsed = parse_answer(&raw);
        assert_eq!(parsed.answer, "$500");
        assert!(parsed.labeled);
        assert_eq!(parsed.sources.as_deref(), Some("Source(s):\n- p.3"));
    }
}
