//! Fixed-size word-window chunker.
//!
//! Splits each extracted page into non-overlapping windows of at most
//! `max_words` whitespace-separated words. Windows that come out empty
//! are dropped, and a page that extracts to no text yields no chunks.
//! Ordering within the document is preserved through `section_heading`
//! (`page_1`, `page_2`, …, 1-based).
//!
//! Boundaries are deterministic: the same pages and `max_words` always
//! produce the same chunk texts. Chunk ids are fresh v4 UUIDs, so ids
//! differ between runs while content does not.

use uuid::Uuid;

use crate::models::Chunk;

/// Split a document's pages into bounded word windows.
///
/// Every produced chunk starts with `usage_count = 0` and no
/// `original_id`; those only apply to the structured ingest path.
pub fn chunk_pages(
    source_doc_id: &str,
    pages: &[String],
    max_words: usize,
    journal: &str,
    publish_year: i32,
) -> Vec<Chunk> {
    // A zero-word window can hold nothing; `slice::chunks` would panic.
    if max_words == 0 {
        return Vec::new();
    }

    let mut chunks = Vec::new();

    for (page_index, page) in pages.iter().enumerate() {
        let words: Vec<&str> = page.split_whitespace().collect();

        for window in words.chunks(max_words) {
            let text = window.join(" ");
            if text.trim().is_empty() {
                continue;
            }
            chunks.push(Chunk {
                id: Uuid::new_v4().to_string(),
                original_id: None,
                source_doc_id: source_doc_id.to_string(),
                section_heading: format!("page_{}", page_index + 1),
                journal: journal.to_string(),
                publish_year,
                attributes: Vec::new(),
                usage_count: 0,
                text,
            });
        }
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn respects_max_words() {
        let page = (0..23).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ");
        let chunks = chunk_pages("doc", &pages(&[&page]), 10, "unknown", 0);
        assert_eq!(chunks.len(), 3);
        for chunk in &chunks {
            assert!(chunk.text.split_whitespace().count() <= 10);
        }
    }

    #[test]
    fn concatenation_reproduces_word_sequence() {
        let page = "alpha beta gamma delta epsilon zeta eta theta iota";
        let chunks = chunk_pages("doc", &pages(&[page]), 4, "unknown", 0);
        let rejoined = chunks
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(rejoined, page);
    }

    #[test]
    fn empty_page_yields_no_chunks() {
        let chunks = chunk_pages("doc", &pages(&["", "   \n\t ", "one two"]), 500, "j", 2020);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].section_heading, "page_3");
    }

    #[test]
    fn headings_are_one_based_in_page_order() {
        let chunks = chunk_pages("doc", &pages(&["first page", "second page"]), 500, "j", 0);
        assert_eq!(chunks[0].section_heading, "page_1");
        assert_eq!(chunks[1].section_heading, "page_2");
    }

    #[test]
    fn deterministic_boundaries() {
        let page = (0..57).map(|i| format!("token{}", i)).collect::<Vec<_>>().join(" ");
        let a = chunk_pages("doc", &pages(&[&page]), 12, "j", 0);
        let b = chunk_pages("doc", &pages(&[&page]), 12, "j", 0);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.text, y.text);
            assert_eq!(x.section_heading, y.section_heading);
        }
    }

    #[test]
    fn zero_max_words_yields_no_chunks() {
        let chunks = chunk_pages("doc", &pages(&["some words here"]), 0, "j", 0);
        assert!(chunks.is_empty());
    }

    #[test]
    fn fresh_metadata_defaults() {
        let chunks = chunk_pages("paper.pdf", &pages(&["some text"]), 500, "Nature", 2021);
        assert_eq!(chunks[0].usage_count, 0);
        assert!(chunks[0].original_id.is_none());
        assert_eq!(chunks[0].journal, "Nature");
        assert_eq!(chunks[0].publish_year, 2021);
        assert_eq!(chunks[0].source_doc_id, "paper.pdf");
    }
}
