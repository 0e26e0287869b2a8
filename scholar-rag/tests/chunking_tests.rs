//! Property tests for recursive chunking bounds and overlap.

use proptest::prelude::*;
use scholar_rag::chunking::{Chunker, RecursiveChunker};
use scholar_rag::document::{CHUNK_OVERLAP_KEY, CHUNK_SIZE_KEY, SOURCE_KEY, SourceText};

/// Chunk size and an overlap strictly smaller than it.
fn arb_params() -> impl Strategy<Value = (usize, usize)> {
    (1usize..80).prop_flat_map(|size| (Just(size), 0..size))
}

/// Text mixing words, sentence ends, line and paragraph breaks.
fn arb_structured_text() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        prop_oneof![
            "[a-zA-Z]{1,12}",
            Just(" ".to_string()),
            Just(". ".to_string()),
            Just("\n".to_string()),
            Just("\n\n".to_string()),
            "[éü日本]{1,4}",
        ],
        0..120,
    )
    .prop_map(|parts| parts.concat())
}

/// Short words joined by single spaces, sentence ends, line and paragraph
/// breaks.
fn arb_prose() -> impl Strategy<Value = String> {
    proptest::collection::vec(("[a-z]{1,8}", prop_oneof![Just(" "), Just(". "), Just("\n"), Just("\n\n")]), 1..80)
        .prop_map(|parts| parts.into_iter().map(|(word, separator)| format!("{word}{separator}")).collect())
}

/// Length of the longest suffix of `prev` that `next` starts with.
fn shared_span(prev: &[char], next: &[char]) -> usize {
    (0..=prev.len().min(next.len())).rev().find(|&n| prev[prev.len() - n..] == next[..n]).unwrap_or(0)
}

/// **Chunk size bound**
/// *For any* `chunk_size > chunk_overlap >= 0` and any text, no chunk exceeds
/// `chunk_size` characters, and no chunk is empty or padded with whitespace.
mod prop_chunk_size_bound {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn chunks_never_exceed_chunk_size(
            (size, overlap) in arb_params(),
            text in arb_structured_text(),
        ) {
            let chunker = RecursiveChunker::new(size, overlap);
            for chunk in chunker.split_text(&text) {
                prop_assert!(chunk.chars().count() <= size, "{:?} longer than {}", chunk, size);
                prop_assert!(!chunk.is_empty());
                prop_assert_eq!(chunk.trim(), chunk.as_str());
            }
        }

        #[test]
        fn every_chunk_is_a_substring_of_the_input(
            (size, overlap) in arb_params(),
            text in arb_structured_text(),
        ) {
            let chunker = RecursiveChunker::new(size, overlap);
            for chunk in chunker.split_text(&text) {
                prop_assert!(text.contains(&chunk));
            }
        }
    }
}

/// **Chunk overlap**
/// *For any* separator-free text, adjacent chunks share exactly
/// `chunk_overlap` characters and stitching them back together restores the
/// input.
mod prop_chunk_overlap {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn adjacent_chunks_share_overlap(
            (size, overlap) in arb_params(),
            text in "[a-z]{0,300}",
        ) {
            let chunker = RecursiveChunker::new(size, overlap);
            let chunks: Vec<Vec<char>> =
                chunker.split_text(&text).iter().map(|c| c.chars().collect()).collect();

            for pair in chunks.windows(2) {
                let (prev, next) = (&pair[0], &pair[1]);
                prop_assert_eq!(prev.len(), size);
                prop_assert_eq!(&prev[size - overlap..], &next[..overlap]);
            }

            let mut stitched: String = chunks.first().map(|c| c.iter().collect()).unwrap_or_default();
            for chunk in chunks.iter().skip(1) {
                stitched.extend(&chunk[overlap..]);
            }
            prop_assert_eq!(stitched, text);
        }
    }
}

/// **Overlap across separators**
/// *For any* prose whose words are shorter than the chunk size, each chunk
/// opens with at least the last `min(chunk_overlap, len(previous))`
/// characters of the chunk before it, wherever the break falls.
mod prop_overlap_across_separators {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn adjacent_chunks_share_overlap_in_prose(
            (size, overlap) in (20usize..80).prop_flat_map(|size| (Just(size), 0..=size / 2)),
            text in arb_prose(),
        ) {
            let chunker = RecursiveChunker::new(size, overlap);
            let chunks: Vec<Vec<char>> =
                chunker.split_text(&text).iter().map(|c| c.chars().collect()).collect();

            for pair in chunks.windows(2) {
                let (prev, next) = (&pair[0], &pair[1]);
                let want = overlap.min(prev.len());
                prop_assert!(
                    shared_span(prev, next) >= want,
                    "{:?} -> {:?} share fewer than {} chars",
                    prev.iter().collect::<String>(),
                    next.iter().collect::<String>(),
                    want
                );
                prop_assert!(next.len() <= size);
            }
        }
    }
}

#[test]
fn word_breaks_keep_overlap() {
    let chunker = RecursiveChunker::new(20, 5);

    let chunks = chunker.split_text("abcdefghij klmnopqrst uvwxyzabcd efghijklmn");

    assert!(chunks.len() > 1);
    for pair in chunks.windows(2) {
        let prev: Vec<char> = pair[0].chars().collect();
        let next: Vec<char> = pair[1].chars().collect();
        assert!(shared_span(&prev, &next) >= 5, "{:?} -> {:?}", pair[0], pair[1]);
        assert!(next.len() <= 20);
    }
}

#[test]
fn prefers_paragraph_breaks_over_sentences() {
    let text = "First paragraph. It has two sentences.\n\nSecond paragraph is here.";
    let chunker = RecursiveChunker::new(40, 0);

    let chunks = chunker.split_text(text);

    assert_eq!(
        chunks,
        vec![
            "First paragraph. It has two sentences.".to_string(),
            "Second paragraph is here.".to_string(),
        ]
    );
}

#[test]
fn chunks_carry_source_and_parameters() {
    let source = SourceText::new("alpha beta gamma delta", "papers/a.txt").with_metadata("page", "3");
    let chunker = RecursiveChunker::new(11, 5);

    let chunks = chunker.chunk(&source);

    assert!(chunks.len() > 1);
    for chunk in &chunks {
        assert_eq!(chunk.metadata[SOURCE_KEY], "papers/a.txt");
        assert_eq!(chunk.metadata["page"], "3");
        assert_eq!(chunk.metadata[CHUNK_SIZE_KEY], "11");
        assert_eq!(chunk.metadata[CHUNK_OVERLAP_KEY], "5");
    }
}
