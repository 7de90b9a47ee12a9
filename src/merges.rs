//! Ordered merge rules plus a rank index for O(1) priority lookup.
//!
//! The ordered list is the source of truth (it is what gets persisted); the
//! rank index is derived from it and is what the encoder consults.

use std::collections::HashMap;

use crate::types::{MergeRank, SymbolPair};

/// One learned merge: `left` + `right` → `merged`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRule {
    pub left: String,
    pub right: String,
    pub merged: String,
}

impl MergeRule {
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        let pair = SymbolPair(left.into(), right.into());
        let merged = pair.merged();
        let SymbolPair(left, right) = pair;
        Self {
            left,
            right,
            merged,
        }
    }
}

/// Merge rules in learned order with a derived rank index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeTable {
    rules: Vec<MergeRule>,
    /// left → right → rank.
    ///
    /// Nested so that lookups can borrow `&str` halves without building an
    /// owned pair key.
    ranks: HashMap<String, HashMap<String, MergeRank>>,
}

impl MergeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from `(left, right)` pairs; iteration order is rank order.
    pub fn from_pairs<I, L, R>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (L, R)>,
        L: Into<String>,
        R: Into<String>,
    {
        let mut table = Self::new();
        for (left, right) in pairs {
            table.push(left, right);
        }
        table
    }

    /// Appends a rule with the next rank and returns that rank.
    ///
    /// A pair that is already present keeps its original (higher-priority) rank.
    pub fn push(&mut self, left: impl Into<String>, right: impl Into<String>) -> MergeRank {
        let rule = MergeRule::new(left, right);
        if let Some(rank) = self.rank(&rule.left, &rule.right) {
            return rank;
        }

        let rank = self.rules.len();
        self.ranks
            .entry(rule.left.clone())
            .or_default()
            .insert(rule.right.clone(), rank);
        self.rules.push(rule);
        rank
    }

    /// Rank of the pair, if it is a learned merge.
    #[inline]
    pub fn rank(&self, left: &str, right: &str) -> Option<MergeRank> {
        self.ranks.get(left)?.get(right).copied()
    }

    pub fn rule(&self, rank: MergeRank) -> Option<&MergeRule> {
        self.rules.get(rank)
    }

    /// Rules in rank order.
    pub fn rules(&self) -> &[MergeRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranks_follow_insertion_order() {
        let table = MergeTable::from_pairs([("e", "s"), ("es", "t")]);
        assert_eq!(table.rank("e", "s"), Some(0));
        assert_eq!(table.rank("es", "t"), Some(1));
        assert_eq!(table.rank("s", "t"), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_rule_records_merged_symbol() {
        let table = MergeTable::from_pairs([("l", "o"), ("lo", "w")]);
        let rule = table.rule(1).expect("rank 1 should exist");
        assert_eq!(rule.merged, "low");
    }

    #[test]
    fn test_duplicate_pair_keeps_first_rank() {
        let mut table = MergeTable::new();
        table.push("a", "b");
        table.push("b", "c");
        assert_eq!(table.push("a", "b"), 0);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_same_merged_symbol_from_different_pairs() {
        // ("a","bc") and ("ab","c") both produce "abc" but are distinct rules.
        let table = MergeTable::from_pairs([("a", "bc"), ("ab", "c")]);
        assert_eq!(table.rank("a", "bc"), Some(0));
        assert_eq!(table.rank("ab", "c"), Some(1));
    }

    #[test]
    fn test_rebuilt_index_matches() {
        let original = MergeTable::from_pairs([("x", "y"), ("xy", "z"), ("q", "q")]);
        let rebuilt = MergeTable::from_pairs(
            original
                .rules()
                .iter()
                .map(|r| (r.left.clone(), r.right.clone())),
        );
        assert_eq!(original, rebuilt);
    }
}
