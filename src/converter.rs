//! Applies learned merge rules to a single pretokenized segment.
//!
//! The working sequence starts as one symbol per character. Each pass finds
//! the adjacent pair with the lowest merge rank, merges its leftmost
//! occurrence, and rescans. Merging one occurrence at a time keeps the result
//! identical to the order in which training applied the rules.
//!
//! A pass is linear in the segment length, so a segment costs O(n²) in the
//! worst case. Segments are natural-language words and results are cached by
//! the tokenizer, so this stays cheap in practice.

use crate::{merges::MergeTable, types::MergeRank};

/// Converts segments into subword symbols using a merge table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BPEConverter {
    merges: MergeTable,
}

impl BPEConverter {
    pub fn new(merges: MergeTable) -> Self {
        Self { merges }
    }

    pub fn merges(&self) -> &MergeTable {
        &self.merges
    }

    /// Splits `segment` into characters and merges them as far as the
    /// learned rules allow.
    ///
    /// # Example
    ///
    /// ```
    /// use bpetok::{BPEConverter, MergeTable};
    ///
    /// let converter = BPEConverter::new(MergeTable::from_pairs([("e", "s"), ("es", "t")]));
    /// assert_eq!(converter.encode_segment("best"), vec!["b", "est"]);
    /// ```
    pub fn encode_segment(&self, segment: &str) -> Vec<String> {
        self.merge_symbols(segment.chars().map(String::from).collect())
    }

    /// Merges an existing symbol sequence until no learned pair remains.
    ///
    /// Running this on its own output is a no-op.
    pub fn merge_symbols(&self, mut symbols: Vec<String>) -> Vec<String> {
        while symbols.len() > 1 {
            let Some((_rank, pos)) = self.best_merge(&symbols) else {
                break;
            };
            let right = symbols.remove(pos + 1);
            symbols[pos].push_str(&right);
        }
        symbols
    }

    /// Lowest-rank pair in `symbols`, leftmost position on ties.
    fn best_merge(&self, symbols: &[String]) -> Option<(MergeRank, usize)> {
        symbols
            .windows(2)
            .enumerate()
            .filter_map(|(pos, w)| self.merges.rank(&w[0], &w[1]).map(|rank| (rank, pos)))
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn converter(pairs: &[(&str, &str)]) -> BPEConverter {
        BPEConverter::new(MergeTable::from_pairs(pairs.iter().copied()))
    }

    fn symbols(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_basic_encoding() {
        let conv = converter(&[("a", "b"), ("ab", "a")]);
        assert_eq!(conv.encode_segment("aba"), symbols(&["aba"]));
    }

    #[test]
    fn test_single_char_no_change() {
        let conv = converter(&[("a", "b")]);
        assert_eq!(conv.encode_segment("z"), symbols(&["z"]));
    }

    #[test]
    fn test_empty_segment() {
        let conv = converter(&[("a", "b")]);
        assert!(conv.encode_segment("").is_empty());
    }

    #[test]
    fn test_no_merge_rules_apply() {
        let conv = converter(&[("x", "y")]);
        assert_eq!(conv.encode_segment("abcd"), symbols(&["a", "b", "c", "d"]));
    }

    #[test]
    fn test_rank_beats_position() {
        // ("c","d") was learned first, so it wins even though ("a","b") is further left.
        let conv = converter(&[("c", "d"), ("b", "c"), ("a", "b")]);
        assert_eq!(conv.encode_segment("abcd"), symbols(&["ab", "cd"]));
    }

    #[test]
    fn test_tie_break_by_position() {
        let conv = converter(&[("a", "a")]);
        assert_eq!(conv.encode_segment("aaa"), symbols(&["aa", "a"]));
    }

    #[test]
    fn test_nested_merges() {
        let conv = converter(&[("a", "b"), ("c", "d"), ("ab", "cd")]);
        assert_eq!(conv.encode_segment("abcd"), symbols(&["abcd"]));
    }

    #[test]
    fn test_multiple_disjoint_merges() {
        let conv = converter(&[("a", "a"), ("b", "b")]);
        assert_eq!(conv.encode_segment("aabb"), symbols(&["aa", "bb"]));
    }

    #[test]
    fn test_unicode_characters() {
        let conv = converter(&[("é", "t")]);
        assert_eq!(conv.encode_segment("été"), symbols(&["ét", "é"]));
    }

    #[test]
    fn test_merging_is_idempotent() {
        let conv = converter(&[("l", "o"), ("lo", "w"), ("e", "r"), ("low", "er")]);
        for word in ["lower", "lowest", "slower", "flow"] {
            let once = conv.encode_segment(word);
            let twice = conv.merge_symbols(once.clone());
            assert_eq!(once, twice, "re-merging {word:?} changed the result");
        }
    }

    #[test]
    fn test_output_concatenates_to_input() {
        let conv = converter(&[("n", "a"), ("na", "n"), ("b", "a")]);
        let out = conv.encode_segment("banana");
        assert_eq!(out.concat(), "banana");
    }
}
