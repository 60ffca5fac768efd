//! Inline citation markers from grounding spans.
//!
//! Spans are applied from the highest `end_index` down. An insertion only shifts
//! characters at or after its own offset, so every offset still waiting to be
//! applied stays valid.

use log::warn;
use thiserror::Error;

use crate::features::grounding::provider::GroundingSupport;

/// Insert point (character offset into the text) and the chunks it cites
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationSpan {
    pub end_index: usize,
    pub chunk_indices: Vec<usize>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CitationError {
    #[error("grounding support {0} has no segment")]
    MissingSegment(usize),

    #[error("grounding support {0} has no end index")]
    MissingEndIndex(usize),

    #[error("grounding support {0} has no chunk indices")]
    MissingChunkIndices(usize),

    #[error("grounding support {0} has negative end index {1}")]
    NegativeEndIndex(usize, i64),

    #[error("grounding support {0} references negative chunk index {1}")]
    NegativeChunkIndex(usize, i64),
}

/// Convert raw provider supports into spans. Any malformed support fails the whole set.
pub fn spans_from_supports(supports: &[GroundingSupport]) -> Result<Vec<CitationSpan>, CitationError> {
    supports
        .iter()
        .enumerate()
        .map(|(position, support)| {
            let segment = support
                .segment
                .as_ref()
                .ok_or(CitationError::MissingSegment(position))?;
            let end_index = segment
                .end_index
                .ok_or(CitationError::MissingEndIndex(position))?;
            let end_index = usize::try_from(end_index)
                .map_err(|_| CitationError::NegativeEndIndex(position, end_index))?;

            let chunk_indices = support
                .grounding_chunk_indices
                .as_deref()
                .ok_or(CitationError::MissingChunkIndices(position))?
                .iter()
                .map(|&index| {
                    usize::try_from(index)
                        .map_err(|_| CitationError::NegativeChunkIndex(position, index))
                })
                .collect::<Result<Vec<_>, _>>()?;

            Ok(CitationSpan {
                end_index,
                chunk_indices,
            })
        })
        .collect()
}

/// Insert `[n]` markers (1-based) at each span's end. Chunk indices at or past
/// `chunk_count` are dropped; offsets past the end of the text append.
pub fn reconcile(text: &str, spans: &[CitationSpan], chunk_count: usize) -> String {
    if spans.is_empty() {
        return text.to_string();
    }

    let mut ordered: Vec<&CitationSpan> = spans.iter().collect();
    ordered.sort_by(|a, b| b.end_index.cmp(&a.end_index));

    let mut result = text.to_string();
    for span in ordered {
        let marker: String = span
            .chunk_indices
            .iter()
            .filter(|&&index| index < chunk_count)
            .map(|index| format!("[{}]", index + 1))
            .collect();

        if marker.is_empty() {
            continue;
        }

        let at = byte_offset(&result, span.end_index);
        result.insert_str(at, &marker);
    }

    result
}

/// Best-effort reconciliation straight from provider metadata. Any fault returns
/// the text untouched.
pub fn reconcile_supports(
    text: &str,
    supports: Option<&[GroundingSupport]>,
    chunk_count: usize,
) -> String {
    let Some(supports) = supports else {
        return text.to_string();
    };

    match spans_from_supports(supports) {
        Ok(spans) => reconcile(text, &spans, chunk_count),
        Err(e) => {
            warn!("Skipping citation markers: {e}");
            text.to_string()
        }
    }
}

fn byte_offset(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map(|(offset, _)| offset)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::grounding::provider::Segment;
    use proptest::prelude::*;

    fn span(end_index: usize, chunk_indices: &[usize]) -> CitationSpan {
        CitationSpan {
            end_index,
            chunk_indices: chunk_indices.to_vec(),
        }
    }

    fn support(end_index: Option<i64>, chunks: &[i64]) -> GroundingSupport {
        GroundingSupport {
            segment: Some(Segment {
                start_index: Some(0),
                end_index,
                text: None,
            }),
            grounding_chunk_indices: Some(chunks.to_vec()),
        }
    }

    #[test]
    fn test_empty_spans_is_identity() {
        assert_eq!(reconcile("unchanged text", &[], 3), "unchanged text");
        assert_eq!(reconcile_supports("unchanged text", None, 3), "unchanged text");
        assert_eq!(reconcile_supports("unchanged text", Some(&[]), 3), "unchanged text");
    }

    #[test]
    fn test_solar_power_example() {
        let out = reconcile("Solar power is good", &[span(20, &[0, 1])], 2);
        assert_eq!(out, "Solar power is good[1][2]");
    }

    #[test]
    fn test_markers_land_at_original_positions_regardless_of_input_order() {
        let text = "0123456789";
        let ascending = [span(5, &[1]), span(10, &[0])];
        let descending = [span(10, &[0]), span(5, &[1])];

        let expected = "01234[2]56789[1]";
        assert_eq!(reconcile(text, &ascending, 2), expected);
        assert_eq!(reconcile(text, &descending, 2), expected);
        assert_eq!(expected.len(), 10 + "[1]".len() + "[2]".len());
    }

    #[test]
    fn test_out_of_range_chunks_are_dropped() {
        let out = reconcile("abc", &[span(3, &[0, 5, 2])], 3);
        assert_eq!(out, "abc[1][3]");
        assert!(!out.contains("[6]"));

        // Nothing left to cite leaves the text alone
        assert_eq!(reconcile("abc", &[span(1, &[7])], 3), "abc");
    }

    #[test]
    fn test_characters_outside_markers_are_untouched() {
        let text = "Wind is cheap. Storage is improving. Grids adapt.";
        let spans = [span(36, &[1]), span(14, &[0]), span(49, &[0, 1])];
        let out = reconcile(text, &spans, 2);

        let stripped = out.replace("[1]", "").replace("[2]", "");
        assert_eq!(stripped, text);
        assert_eq!(out, "Wind is cheap.[1] Storage is improving.[2] Grids adapt.[1][2]");
    }

    #[test]
    fn test_offsets_are_characters_not_bytes() {
        let out = reconcile("Café über", &[span(4, &[0])], 1);
        assert_eq!(out, "Café[1] über");
    }

    #[test]
    fn test_equal_offsets_keep_both_markers() {
        // Equal offsets are inserted in input order at the same point, so the later span reads first
        assert_eq!(reconcile("abc", &[span(3, &[0]), span(3, &[1])], 2), "abc[2][1]");
        assert_eq!(reconcile("abc", &[span(3, &[1]), span(3, &[0])], 2), "abc[1][2]");
    }

    #[test]
    fn test_supports_convert_to_spans() {
        let spans = spans_from_supports(&[support(Some(4), &[0, 2]), support(Some(9), &[])]).unwrap();
        assert_eq!(spans, vec![span(4, &[0, 2]), span(9, &[])]);
    }

    #[test]
    fn test_malformed_support_returns_original_text() {
        let text = "Original text stays.";

        let missing_end = [support(Some(8), &[0]), support(None, &[0])];
        assert_eq!(spans_from_supports(&missing_end), Err(CitationError::MissingEndIndex(1)));
        assert_eq!(reconcile_supports(text, Some(&missing_end), 1), text);

        let negative_chunk = [support(Some(8), &[-1])];
        assert_eq!(reconcile_supports(text, Some(&negative_chunk), 1), text);

        let no_segment = [GroundingSupport {
            segment: None,
            grounding_chunk_indices: Some(vec![0]),
        }];
        assert_eq!(spans_from_supports(&no_segment), Err(CitationError::MissingSegment(0)));
        assert_eq!(reconcile_supports(text, Some(&no_segment), 1), text);
    }

    #[test]
    fn test_missing_chunk_indices_returns_original_text() {
        let supports = [
            support(Some(3), &[0]),
            GroundingSupport {
                segment: Some(Segment {
                    start_index: Some(0),
                    end_index: Some(5),
                    text: None,
                }),
                grounding_chunk_indices: None,
            },
        ];

        assert_eq!(
            spans_from_supports(&supports),
            Err(CitationError::MissingChunkIndices(1))
        );
        assert_eq!(reconcile_supports("abcdef", Some(&supports), 1), "abcdef");
    }

    #[test]
    fn test_reconcile_supports_happy_path() {
        let out = reconcile_supports("Solar power is good", Some(&[support(Some(20), &[0, 1])]), 2);
        assert_eq!(out, "Solar power is good[1][2]");
    }

    fn strip_markers(text: &str) -> String {
        let mut out = String::new();
        let mut in_marker = false;
        for ch in text.chars() {
            match ch {
                '[' => in_marker = true,
                ']' => in_marker = false,
                _ if !in_marker => out.push(ch),
                _ => {}
            }
        }
        out
    }

    /// Expected output built position by position rather than by insertion
    fn marked_by_position(text: &str, spans: &[CitationSpan], chunk_count: usize) -> String {
        let chars: Vec<char> = text.chars().collect();
        let mut out = String::new();

        for position in 0..=chars.len() {
            for span in spans
                .iter()
                .rev()
                .filter(|s| s.end_index.min(chars.len()) == position)
            {
                for index in span.chunk_indices.iter().filter(|&&i| i < chunk_count) {
                    out.push_str(&format!("[{}]", index + 1));
                }
            }
            if let Some(ch) = chars.get(position) {
                out.push(*ch);
            }
        }

        out
    }

    fn span_strategy() -> impl Strategy<Value = CitationSpan> {
        (0usize..48, prop::collection::vec(0usize..5, 0..4)).prop_map(
            |(end_index, chunk_indices)| CitationSpan {
                end_index,
                chunk_indices,
            },
        )
    }

    proptest! {
        #[test]
        fn test_markers_land_at_their_character_offsets(
            text in "[a-zA-Z0-9 .,éüß中]{0,40}",
            spans in prop::collection::vec(span_strategy(), 0..8).prop_shuffle(),
            chunk_count in 0usize..5,
        ) {
            let out = reconcile(&text, &spans, chunk_count);
            prop_assert_eq!(strip_markers(&out), text.clone());
            prop_assert_eq!(out, marked_by_position(&text, &spans, chunk_count));
        }
    }
}
