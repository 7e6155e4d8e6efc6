//! Aho-Corasick gazetteer for dictionary matching.
//!
//! Linear-time matching of curated alias tables against section text, with
//! ASCII case folding, word-boundary checks on both ends, and overlap
//! removal keeping the longest match.

use aho_corasick::{AhoCorasick, MatchKind};

/// A compiled alias → canonical-name table.
pub struct Gazetteer {
    automaton: AhoCorasick,
    canonicals: Vec<&'static str>,
}

/// One dictionary hit in a text.
#[derive(Debug, Clone)]
pub struct GazetteerHit<'t> {
    pub text: &'t str,
    pub canonical: &'static str,
    pub start: usize,
    pub end: usize,
}

impl Gazetteer {
    /// Compile an (alias, canonical) table. The tables are static curated
    /// data; a malformed table is a programmer error.
    pub fn new(entries: &[(&'static str, &'static str)]) -> Self {
        let patterns: Vec<&str> = entries.iter().map(|(alias, _)| *alias).collect();
        let automaton = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostLongest)
            .ascii_case_insensitive(true)
            .build(&patterns)
            .expect("failed to build gazetteer automaton from static table");
        Self {
            automaton,
            canonicals: entries.iter().map(|(_, canonical)| *canonical).collect(),
        }
    }

    /// All word-bounded dictionary hits, longest-match-wins on overlap.
    pub fn find<'t>(&self, text: &'t str) -> Vec<GazetteerHit<'t>> {
        let mut hits: Vec<GazetteerHit<'t>> = Vec::new();
        for mat in self.automaton.find_iter(text) {
            if !word_bounded(text, mat.start(), mat.end()) {
                continue;
            }
            hits.push(GazetteerHit {
                text: &text[mat.start()..mat.end()],
                canonical: self.canonicals[mat.pattern().as_usize()],
                start: mat.start(),
                end: mat.end(),
            });
        }
        remove_overlapping(hits)
    }
}

/// The next `len` bytes of context after a hit, with the end snapped down
/// to a char boundary so a multi-byte character in the window cannot make
/// the slice panic.
pub fn tail_window(text: &str, start: usize, len: usize) -> &str {
    let mut end = text.len().min(start.saturating_add(len));
    while end > start && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[start..end]
}

/// A hit must not sit inside a larger alphanumeric token ("SIMULATION"
/// must never yield SIM).
pub fn word_bounded(text: &str, start: usize, end: usize) -> bool {
    let bytes = text.as_bytes();
    let before_ok = start == 0 || !bytes[start - 1].is_ascii_alphanumeric();
    let after_ok = end == bytes.len() || !bytes[end].is_ascii_alphanumeric();
    before_ok && after_ok
}

fn remove_overlapping(mut hits: Vec<GazetteerHit<'_>>) -> Vec<GazetteerHit<'_>> {
    if hits.is_empty() {
        return hits;
    }
    hits.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then_with(|| (b.end - b.start).cmp(&(a.end - a.start)))
    });

    let mut result = Vec::new();
    let mut last_end = 0;
    for hit in hits {
        if hit.start >= last_end {
            last_end = hit.end;
            result.push(hit);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dyes() -> Gazetteer {
        Gazetteer::new(&[
            ("DAPI", "DAPI"),
            ("GFP", "GFP"),
            ("green fluorescent protein", "GFP"),
        ])
    }

    #[test]
    fn case_insensitive_word_bounded_matching() {
        let hits = dyes().find("Nuclei were stained with dapi.");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].canonical, "DAPI");
        assert_eq!(hits[0].text, "dapi");
    }

    #[test]
    fn embedded_tokens_do_not_match() {
        assert!(dyes().find("the eGFPx construct").is_empty());
        assert!(dyes().find("DAPIxyz").is_empty());
    }

    #[test]
    fn longest_alias_wins() {
        let hits = dyes().find("tagged with green fluorescent protein");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text, "green fluorescent protein");
        assert_eq!(hits[0].canonical, "GFP");
    }

    #[test]
    fn tail_window_snaps_to_char_boundary() {
        let text = "DAPI at 0.5 µg/ml";
        // A window end inside the two-byte µ backs off to the boundary.
        let micro = text.find('µ').unwrap();
        assert_eq!(tail_window(text, 4, micro + 1 - 4), " at 0.5 ");
        assert_eq!(tail_window(text, 4, 200), " at 0.5 µg/ml");
        assert_eq!(tail_window(text, text.len(), 10), "");
    }
}
