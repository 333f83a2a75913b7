//! Candidate deduplication.
//!
//! Candidates arrive from multiple queries and sources, often with repeats.
//! The title is the identity: the first occurrence wins entirely and later
//! duplicates are discarded without field merging, so the survivor is not
//! necessarily the best-scored duplicate. Candidates with an empty title
//! cannot be deduplicated safely and are dropped.

use std::collections::HashSet;

use litscout_shared::Publication;

/// Collapse an ordered candidate sequence to unique titles, preserving
/// first-seen order.
pub fn dedup_by_title(candidates: Vec<Publication>) -> Vec<Publication> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut unique = Vec::new();

    for candidate in candidates {
        if candidate.title.is_empty() {
            continue;
        }
        if seen.insert(candidate.title.clone()) {
            unique.push(candidate);
        }
    }

    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use litscout_shared::Source;

    fn publication(title: &str, source: Source) -> Publication {
        Publication::new(title, vec![], 2023, "", "https://example.org/p", source)
    }

    #[test]
    fn first_occurrence_wins() {
        let candidates = vec![
            publication("A", Source::Arxiv),
            publication("B", Source::Pmc),
            publication("A", Source::Biorxiv),
        ];

        let unique = dedup_by_title(candidates);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].title, "A");
        // The first "A" came from arXiv; the bioRxiv repeat was discarded.
        assert_eq!(unique[0].source, Source::Arxiv);
        assert_eq!(unique[1].title, "B");
    }

    #[test]
    fn empty_titles_are_dropped() {
        let candidates = vec![
            publication("", Source::Arxiv),
            publication("Real title", Source::Pmc),
            publication("", Source::Biorxiv),
        ];

        let unique = dedup_by_title(candidates);
        assert_eq!(unique.len(), 1);
        assert_eq!(unique[0].title, "Real title");
    }

    #[test]
    fn order_is_first_seen() {
        let candidates = vec![
            publication("C", Source::Arxiv),
            publication("A", Source::Arxiv),
            publication("B", Source::Arxiv),
            publication("A", Source::Pmc),
            publication("C", Source::Pmc),
        ];

        let titles: Vec<String> = dedup_by_title(candidates)
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["C", "A", "B"]);
    }
}
