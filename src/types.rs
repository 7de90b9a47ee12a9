//! Type aliases and shared types for BPE training and encoding.
//!
//! These type aliases provide semantic clarity throughout the codebase.

/// Represents a token identifier in the vocabulary.
///
/// Ids are dense and assigned in registration order: the base alphabet first,
/// then the special tokens, then one id per learned merge.
pub type Token = usize;

/// Merge rank indicates when a merge rule was learned during training.
///
/// Lower values represent earlier merges (0 = first merge) and are applied
/// first during encoding.
pub type MergeRank = usize;

/// Frequency count for symbol pairs during training.
pub(crate) type PairFreq = usize;

/// A pair of adjacent symbols.
///
/// Derived ordering compares `left` first, then `right`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolPair(pub String, pub String);

impl SymbolPair {
    /// The symbol produced by merging this pair.
    pub fn merged(&self) -> String {
        let mut merged = String::with_capacity(self.0.len() + self.1.len());
        merged.push_str(&self.0);
        merged.push_str(&self.1);
        merged
    }
}
