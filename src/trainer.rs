//! Vocabulary training by repeated most-frequent-pair merging.
//!
//! Each round counts every adjacent symbol pair across all training words,
//! picks the most frequent one, registers the concatenation as a new symbol,
//! and rewrites every word. Equal counts are broken by the lexicographically
//! smallest `(left, right)` pair so a given corpus always trains identically.
//!
//! This is the straightforward O(merges × corpus) form; identical words are
//! collapsed into one entry with a count, which keeps the per-round cost
//! proportional to the number of distinct words.

use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet, HashMap},
};

use crate::{
    error::TrainError,
    merges::MergeTable,
    pretokenizer::Pretokenizer,
    progress::progress_bar,
    types::{MergeRank, PairFreq},
    vocab::Vocabulary,
};

/// Training options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainerConfig {
    /// Upper bound on the number of merges to learn.
    pub max_merges: usize,
    /// Stop once the best pair occurs fewer times than this.
    ///
    /// The default of 1 stops only when no pair is left at all.
    pub min_pair_frequency: usize,
    /// Render a progress bar over the merge rounds.
    pub show_progress: bool,
}

impl TrainerConfig {
    pub fn new(max_merges: usize) -> Self {
        Self {
            max_merges,
            ..Self::default()
        }
    }
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            max_merges: 0,
            min_pair_frequency: 1,
            show_progress: false,
        }
    }
}

/// A distinct training word and how often it occurred.
#[derive(Debug, Clone)]
struct Word {
    symbols: Vec<String>,
    count: usize,
}

/// A candidate pair for the next merge.
#[derive(Debug, PartialEq, Eq)]
struct PairCandidate<'a> {
    freq: PairFreq,
    left: &'a str,
    right: &'a str,
}

impl PartialOrd for PairCandidate<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Highest frequency is greatest; among equal frequencies the
/// lexicographically smaller pair is greatest.
impl Ord for PairCandidate<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.freq
            .cmp(&other.freq)
            .then_with(|| other.left.cmp(self.left))
            .then_with(|| other.right.cmp(self.right))
    }
}

/// BPE trainer state.
///
/// Owns the growing vocabulary and merge table until [`BPETrainer::finish`]
/// hands them over.
#[derive(Debug)]
pub struct BPETrainer {
    words: Vec<Word>,
    vocab: Vocabulary,
    merges: MergeTable,
    min_pair_frequency: usize,
}

impl BPETrainer {
    /// Prepares a trainer from a raw corpus.
    ///
    /// Every string is split with `pretokenizer`. Every character seen
    /// (whitespace included) joins the base alphabet, registered in sorted
    /// order ahead of the special tokens. Only non-whitespace segments take
    /// part in pair counting.
    pub fn from_corpus<S: AsRef<str>>(corpus: &[S], pretokenizer: &Pretokenizer) -> Self {
        let mut alphabet: BTreeSet<char> = BTreeSet::new();
        // BTreeMap keeps word order independent of hashing.
        let mut word_counts: BTreeMap<&str, usize> = BTreeMap::new();

        for text in corpus {
            for segment in pretokenizer.split(text.as_ref()) {
                alphabet.extend(segment.text.chars());
                if !segment.is_whitespace() {
                    *word_counts.entry(segment.text).or_insert(0) += 1;
                }
            }
        }

        let words = word_counts
            .into_iter()
            .map(|(text, count)| Word {
                symbols: text.chars().map(String::from).collect(),
                count,
            })
            .collect();

        Self {
            words,
            vocab: Vocabulary::with_alphabet(alphabet.into_iter().map(String::from)),
            merges: MergeTable::new(),
            min_pair_frequency: 1,
        }
    }

    /// Performs one merge.
    ///
    /// Returns true if a merge was performed, false if no eligible pair remains.
    pub fn merge_step(&mut self) -> bool {
        let Some((left, right, freq)) = self.best_pair() else {
            return false;
        };

        let rank = self.merges.push(left.as_str(), right.as_str());
        let merged = format!("{left}{right}");
        let id = self.vocab.register(merged.as_str());

        log::debug!("merge #{rank}: ({left:?}, {right:?}) x{freq} -> {merged:?} (id {id})");

        for word in &mut self.words {
            apply_merge(&mut word.symbols, &left, &right, &merged);
        }

        true
    }

    /// Runs up to `config.max_merges` merge rounds.
    ///
    /// Returns the number of merges actually learned, which is smaller when
    /// the corpus runs out of pairs.
    ///
    /// # Errors
    ///
    /// Returns [`TrainError::ProgressBarSetup`] if the progress bar template fails.
    pub fn train(&mut self, config: &TrainerConfig) -> Result<usize, TrainError> {
        self.min_pair_frequency = config.min_pair_frequency.max(1);
        let pb = progress_bar(config.max_merges as u64, "Learning merges", config.show_progress)?;

        log::info!(
            "training: {} distinct words, alphabet of {}, up to {} merges",
            self.words.len(),
            self.vocab.len(),
            config.max_merges
        );

        let mut learned = 0;
        for _ in 0..config.max_merges {
            if !self.merge_step() {
                log::info!("no more pairs to merge after {learned} merges");
                break;
            }
            learned += 1;
            pb.inc(1);
        }
        pb.finish_and_clear();

        log::info!(
            "training finished: {learned} merges, vocabulary size {}",
            self.vocab.len()
        );
        Ok(learned)
    }

    /// Learned merges as `((left, right), rank)` in learned order.
    pub fn merge_history(&self) -> Vec<((String, String), MergeRank)> {
        self.merges
            .rules()
            .iter()
            .enumerate()
            .map(|(rank, rule)| ((rule.left.clone(), rule.right.clone()), rank))
            .collect()
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn merges(&self) -> &MergeTable {
        &self.merges
    }

    /// Current symbol sequences of the training words, in word order.
    pub fn segmentations(&self) -> Vec<Vec<String>> {
        self.words.iter().map(|w| w.symbols.clone()).collect()
    }

    /// Consumes the trainer, yielding the trained vocabulary and merge table.
    pub fn finish(self) -> (Vocabulary, MergeTable) {
        (self.vocab, self.merges)
    }

    /// Counts adjacent pairs across all words, weighted by word count.
    fn count_pairs(&self) -> HashMap<(&str, &str), PairFreq> {
        let mut pair_freqs: HashMap<(&str, &str), PairFreq> = HashMap::new();
        for word in &self.words {
            for w in word.symbols.windows(2) {
                *pair_freqs
                    .entry((w[0].as_str(), w[1].as_str()))
                    .or_insert(0) += word.count;
            }
        }
        pair_freqs
    }

    /// The most frequent pair (ties broken lexicographically), if it meets
    /// the minimum frequency.
    fn best_pair(&self) -> Option<(String, String, PairFreq)> {
        let best = self
            .count_pairs()
            .into_iter()
            .map(|((left, right), freq)| PairCandidate { freq, left, right })
            .max()?;

        if best.freq < self.min_pair_frequency {
            return None;
        }
        Some((best.left.to_string(), best.right.to_string(), best.freq))
    }
}

/// Replaces every non-overlapping left-to-right occurrence of `(left, right)`.
fn apply_merge(symbols: &mut Vec<String>, left: &str, right: &str, merged: &str) {
    if symbols.len() < 2 {
        return;
    }

    let mut out = Vec::with_capacity(symbols.len());
    let mut read_idx = 0;

    while read_idx < symbols.len() {
        if read_idx + 1 < symbols.len() && symbols[read_idx] == left && symbols[read_idx + 1] == right
        {
            out.push(merged.to_string());
            read_idx += 2;
        } else {
            out.push(std::mem::take(&mut symbols[read_idx]));
            read_idx += 1;
        }
    }

    *symbols = out;
}
