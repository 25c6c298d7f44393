//! Character-budget chunking for LLM prompts.
//!
//! Long documents are cut into ordered chunks that each fit the model's input budget:
//!
//! - Semantic boundaries: `semchunk-rs` proposes segments split on paragraph, line, sentence,
//!   and word boundaries, measured in characters. The segmenter only sees an ASCII shadow of the
//!   text with one byte per source character, so its byte arithmetic never lands inside a
//!   multibyte character.
//! - Exact coverage: proposed segments are anchored back onto the source text. Separator text
//!   the segmenter dropped is reattached to a neighbouring chunk, and anything still above the
//!   budget is cut at character boundaries. Chunks are therefore contiguous slices of the
//!   source; removing each chunk's overlap prefix and concatenating restores the input.
//! - Overlap: every chunk after the first repeats up to `overlap` characters of the text before
//!   it, starting on a word boundary when one is available, without exceeding the budget.

use semchunk_rs::Chunker;

use super::types::{Chunk, ChunkingError};

type Span = (usize, usize);

/// Split `text` into chunks of at most `chunk_size` characters overlapping by up to `overlap`.
///
/// Returns no chunks for blank input and a single chunk equal to the input when it already fits.
pub fn chunk_text(
    text: &str,
    chunk_size: usize,
    overlap: usize,
) -> Result<Vec<Chunk>, ChunkingError> {
    if chunk_size == 0 {
        return Err(ChunkingError::InvalidChunkSize);
    }
    if overlap >= chunk_size {
        return Err(ChunkingError::InvalidOverlap {
            overlap,
            chunk_size,
        });
    }
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    if char_count(text) <= chunk_size {
        return Ok(vec![Chunk {
            text: text.to_string(),
            start: 0,
            overlap: 0,
        }]);
    }

    let shadow = ascii_shadow(text);
    let segments = semantic_segments(&shadow, chunk_size);
    let anchored = to_byte_spans(text, &anchor_segments(&shadow, &segments));
    let covered = cover_gaps(text, &anchored, chunk_size);
    let spans = split_oversized(text, covered, chunk_size);
    tracing::debug!(
        segments = segments.len(),
        chunks = spans.len(),
        chunk_size,
        overlap,
        "Chunked document"
    );
    Ok(apply_overlap(text, &spans, chunk_size, overlap))
}

fn char_count(text: &str) -> usize {
    text.chars().count()
}

/// Replace every non-ASCII character with one ASCII stand-in of the same role.
///
/// Character offsets in the shadow equal byte offsets, and equal character offsets in `text`.
fn ascii_shadow(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            c if c.is_ascii() => c,
            c if c.is_whitespace() => ' ',
            '。' | '．' | '｡' => '.',
            '，' | '、' | '､' => ',',
            '！' => '!',
            '？' => '?',
            '；' => ';',
            '：' => ':',
            '…' => '.',
            _ => 'x',
        })
        .collect()
}

/// Convert character spans into byte spans of `text`.
fn to_byte_spans(text: &str, char_spans: &[Span]) -> Vec<Span> {
    let mut offsets: Vec<usize> = text.char_indices().map(|(offset, _)| offset).collect();
    offsets.push(text.len());
    char_spans
        .iter()
        .map(|&(start, end)| (offsets[start], offsets[end]))
        .collect()
}

fn semantic_segments(text: &str, chunk_size: usize) -> Vec<String> {
    let chunker = Chunker::new(chunk_size, Box::new(|segment: &str| char_count(segment)));
    chunker.chunk(text)
}

/// Locate each proposed segment in the source, in order, as byte spans.
///
/// Segments that cannot be found are skipped; their text is picked up as gap text later.
fn anchor_segments(text: &str, segments: &[String]) -> Vec<Span> {
    let mut spans = Vec::with_capacity(segments.len());
    let mut cursor = 0;

    for segment in segments {
        match locate(&text[cursor..], segment) {
            Some((offset, len)) => {
                let start = cursor + offset;
                spans.push((start, start + len));
                cursor = start + len;
            }
            None => {
                tracing::debug!(
                    cursor,
                    segment_chars = char_count(segment),
                    "Segment not found in source; merging into neighbours"
                );
            }
        }
    }

    spans
}

fn locate(haystack: &str, segment: &str) -> Option<(usize, usize)> {
    if segment.is_empty() {
        return None;
    }
    if let Some(offset) = haystack.find(segment) {
        return Some((offset, segment.len()));
    }
    let trimmed = segment.trim();
    if trimmed.is_empty() {
        return None;
    }
    haystack.find(trimmed).map(|offset| (offset, trimmed.len()))
}

/// Turn anchored spans into contiguous spans covering the whole text.
///
/// Gap text between two segments goes to the earlier chunk when it fits there, otherwise to the
/// later one. Leading and trailing gaps stay with the first and last chunk.
fn cover_gaps(text: &str, anchored: &[Span], chunk_size: usize) -> Vec<Span> {
    if anchored.is_empty() {
        return vec![(0, text.len())];
    }

    let mut spans = Vec::with_capacity(anchored.len());
    let mut start = 0;

    for (index, &(_, segment_end)) in anchored.iter().enumerate() {
        let end = match anchored.get(index + 1) {
            None => text.len(),
            Some(&(next_start, next_end)) => {
                if char_count(&text[start..next_start]) <= chunk_size {
                    next_start
                } else if char_count(&text[segment_end..next_end]) <= chunk_size {
                    segment_end
                } else {
                    next_start
                }
            }
        };
        if end > start {
            spans.push((start, end));
            start = end;
        }
    }

    spans
}

/// Cut any span longer than `chunk_size` characters at character boundaries.
fn split_oversized(text: &str, spans: Vec<Span>, chunk_size: usize) -> Vec<Span> {
    let mut result = Vec::with_capacity(spans.len());
    for (mut start, end) in spans {
        while let Some((offset, _)) = text[start..end].char_indices().nth(chunk_size) {
            result.push((start, start + offset));
            start += offset;
        }
        result.push((start, end));
    }
    result
}

fn apply_overlap(text: &str, spans: &[Span], chunk_size: usize, overlap: usize) -> Vec<Chunk> {
    let mut chunks = Vec::with_capacity(spans.len());
    let mut char_offset = 0;

    for (index, &(start, end)) in spans.iter().enumerate() {
        let fresh_chars = char_count(&text[start..end]);
        let (chunk_start, shared) = if index == 0 {
            (start, 0)
        } else {
            let budget = overlap.min(chunk_size.saturating_sub(fresh_chars));
            overlap_start(text, spans[index - 1].0, start, budget)
        };

        chunks.push(Chunk {
            text: text[chunk_start..end].to_string(),
            start: char_offset - shared,
            overlap: shared,
        });
        char_offset += fresh_chars;
    }

    chunks
}

/// Find where an overlap of at most `budget` characters before `boundary` should begin.
///
/// Never reaches before `floor`, the start of the previous chunk. Returns the byte offset and
/// the number of characters shared with the previous chunk.
fn overlap_start(text: &str, floor: usize, boundary: usize, budget: usize) -> (usize, usize) {
    if budget == 0 {
        return (boundary, 0);
    }

    let window = &text[floor..boundary];
    let begin = window
        .char_indices()
        .rev()
        .nth(budget - 1)
        .map(|(offset, _)| floor + offset)
        .unwrap_or(floor);

    let start = if begin == floor || text[..begin].ends_with(char::is_whitespace) {
        begin
    } else {
        snap_to_word_start(text, begin, boundary).unwrap_or(begin)
    };

    (start, char_count(&text[start..boundary]))
}

fn snap_to_word_start(text: &str, begin: usize, boundary: usize) -> Option<usize> {
    let candidate = &text[begin..boundary];
    let whitespace = candidate.find(char::is_whitespace)?;
    let rest = candidate[whitespace..].trim_start();
    if rest.is_empty() {
        return None;
    }
    Some(boundary - rest.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reassemble(chunks: &[Chunk]) -> String {
        chunks.iter().map(Chunk::fresh_text).collect()
    }

    fn assert_chunk_invariants(text: &str, chunks: &[Chunk], chunk_size: usize, overlap: usize) {
        assert!(!chunks.is_empty());
        assert_eq!(chunks[0].overlap, 0);
        for chunk in chunks {
            assert!(chunk.char_len() <= chunk_size, "chunk too long: {}", chunk.char_len());
            assert!(chunk.overlap <= overlap);
            let expected: String = text
                .chars()
                .skip(chunk.start)
                .take(chunk.char_len())
                .collect();
            assert_eq!(chunk.text, expected, "chunk is not a slice of the source");
        }
        assert_eq!(reassemble(chunks), text);
    }

    fn long_document() -> String {
        let sentence = "The quarterly report covers revenue, churn, and hiring across regions. ";
        let paragraph = sentence.repeat(8);
        (0..24)
            .map(|index| format!("Section {index}. {paragraph}"))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    #[test]
    fn short_text_is_a_single_identical_chunk() {
        let text = "Hello world.";
        let chunks = chunk_text(text, 4000, 200).expect("chunks");
        assert_eq!(
            chunks,
            vec![Chunk {
                text: text.to_string(),
                start: 0,
                overlap: 0
            }]
        );
    }

    #[test]
    fn text_exactly_at_budget_is_not_split() {
        let text = "a".repeat(4000);
        let chunks = chunk_text(&text, 4000, 200).expect("chunks");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, text);
    }

    #[test]
    fn blank_text_produces_no_chunks() {
        assert!(chunk_text("", 4000, 200).expect("chunks").is_empty());
        assert!(chunk_text(" \n\t ", 4000, 200).expect("chunks").is_empty());
    }

    #[test]
    fn rejects_zero_chunk_size() {
        let error = chunk_text("hello", 0, 0).unwrap_err();
        assert!(matches!(error, ChunkingError::InvalidChunkSize));
    }

    #[test]
    fn rejects_overlap_not_smaller_than_chunk_size() {
        let error = chunk_text("hello", 10, 10).unwrap_err();
        assert!(matches!(error, ChunkingError::InvalidOverlap { .. }));
    }

    #[test]
    fn long_text_respects_budget_and_reassembles() {
        let text = long_document();
        assert!(text.chars().count() > 10_000);
        let chunks = chunk_text(&text, 4000, 200).expect("chunks");
        assert!(chunks.len() >= 3);
        assert_chunk_invariants(&text, &chunks, 4000, 200);
        assert!(chunks.iter().skip(1).any(|chunk| chunk.overlap > 0));
    }

    #[test]
    fn text_without_separators_is_cut_at_character_boundaries() {
        let text = "x".repeat(9_500);
        let chunks = chunk_text(&text, 4000, 200).expect("chunks");
        assert_chunk_invariants(&text, &chunks, 4000, 200);
    }

    #[test]
    fn multibyte_text_is_measured_in_characters() {
        let text = "Grüße aus Köln — ünïcödé wörds ".repeat(400);
        let chunks = chunk_text(&text, 500, 50).expect("chunks");
        assert!(chunks.len() > 1);
        assert_chunk_invariants(&text, &chunks, 500, 50);
    }

    #[test]
    fn cjk_text_without_spaces_is_chunked() {
        let text = "本报告总结了各地区的收入增长情况。".repeat(300);
        assert!(text.chars().count() > 4000);
        let chunks = chunk_text(&text, 4000, 200).expect("chunks");
        assert!(chunks.len() > 1);
        assert_chunk_invariants(&text, &chunks, 4000, 200);
    }

    #[test]
    fn mixed_scripts_and_emoji_are_chunked() {
        let pieces = ["é", "字", "🦀", "ab", " ", "。", "\n\n", ".", "ü", "，"];
        let text: String = (0..6_000)
            .map(|index| pieces[(index * 7 + index / 13) % pieces.len()])
            .collect();
        for (size, overlap) in [(4000, 200), (97, 11)] {
            let chunks = chunk_text(&text, size, overlap).expect("chunks");
            assert_chunk_invariants(&text, &chunks, size, overlap);
        }
        let crabs = "🦀".repeat(900);
        let chunks = chunk_text(&crabs, 256, 16).expect("chunks");
        assert_chunk_invariants(&crabs, &chunks, 256, 16);
    }

    #[test]
    fn ascii_shadow_keeps_one_byte_per_character() {
        let text = "收入。Grüße 🦀\u{3000}end";
        let shadow = ascii_shadow(text);
        assert!(shadow.is_ascii());
        assert_eq!(shadow.len(), text.chars().count());
        assert_eq!(shadow, "xx.Grxxe x end");
        assert_eq!(to_byte_spans(text, &[(0, 3), (3, 8)]), vec![(0, 9), (9, 16)]);
    }

    #[test]
    fn small_budget_keeps_order_and_coverage() {
        let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa";
        let chunks = chunk_text(text, 12, 4).expect("chunks");
        assert_chunk_invariants(text, &chunks, 12, 4);
    }

    #[test]
    fn overlap_starts_on_word_boundary() {
        let text = "one two three four";
        let (start, shared) = overlap_start(text, 0, 14, 7);
        assert_eq!(&text[start..14], "three ");
        assert_eq!(shared, 6);
    }

    #[test]
    fn overlap_without_whitespace_keeps_character_window() {
        let text = "abcdefghij";
        let (start, shared) = overlap_start(text, 0, 8, 3);
        assert_eq!(&text[start..8], "fgh");
        assert_eq!(shared, 3);
    }

    #[test]
    fn cover_gaps_assigns_separators_to_neighbours() {
        let text = "aaaa\n\nbbbb\n\ncccc";
        let anchored = vec![(0, 4), (6, 10), (12, 16)];
        let spans = cover_gaps(text, &anchored, 6);
        assert_eq!(spans, vec![(0, 6), (6, 12), (12, 16)]);
    }
}
