//! Public tokenizer: training, text → ids and ids → text.
//!
//! Encoding pipeline:
//! 1. Pretokenizer splits text into word, punctuation and whitespace runs.
//! 2. Each non-whitespace run is merged into subword symbols (cached per run).
//! 3. Each symbol is looked up in the vocabulary; unknown symbols fall back
//!    to their characters, and unknown characters to `<unk>`.
//!
//! Encoding and decoding never fail. Batch variants run on Rayon and only
//! fail if their progress bar cannot be set up.

use std::sync::Arc;

use indicatif::ParallelProgressIterator;
use rayon::prelude::*;

use crate::{
    cache::{CacheStats, EncodeCache},
    config::{TokenizerConfig, WhitespaceMode},
    converter::BPEConverter,
    error::{DecodeError, EncodeError, TokenizerInitError, TrainError},
    merges::MergeTable,
    pretokenizer::Pretokenizer,
    progress::progress_bar,
    trainer::{BPETrainer, TrainerConfig},
    types::Token,
    vocab::{SpecialToken, Vocabulary},
};

/// BPE tokenizer owning its vocabulary, merge table and encode cache.
///
/// The vocabulary and merges are only replaced wholesale by
/// [`BPETokenizer::train`] (which needs `&mut self`), so `&self` methods can
/// be shared freely across threads.
#[derive(Debug)]
pub struct BPETokenizer {
    config: TokenizerConfig,
    pretokenizer: Pretokenizer,
    vocab: Vocabulary,
    converter: BPEConverter,
    cache: EncodeCache,
}

impl BPETokenizer {
    /// Creates an untrained tokenizer whose vocabulary holds only the
    /// special tokens.
    ///
    /// # Errors
    ///
    /// Returns [`TokenizerInitError::InvalidPattern`] if `config.pattern`
    /// fails to compile.
    pub fn new(config: TokenizerConfig) -> Result<Self, TokenizerInitError> {
        Self::from_parts(config, Vocabulary::default(), MergeTable::new())
    }

    /// Assembles a tokenizer from an existing vocabulary and merge table.
    ///
    /// # Errors
    ///
    /// Returns [`TokenizerInitError::InvalidPattern`] if `config.pattern`
    /// fails to compile.
    pub fn from_parts(
        config: TokenizerConfig,
        vocab: Vocabulary,
        merges: MergeTable,
    ) -> Result<Self, TokenizerInitError> {
        let pretokenizer = Pretokenizer::new(&config.pattern)?;

        for rule in merges.rules() {
            if !vocab.contains(&rule.merged) {
                log::warn!(
                    "merge ({:?}, {:?}) produces {:?}, which is not in the vocabulary",
                    rule.left,
                    rule.right,
                    rule.merged
                );
            }
        }

        let cache = EncodeCache::new(config.cache_capacity);
        Ok(Self {
            config,
            pretokenizer,
            vocab,
            converter: BPEConverter::new(merges),
            cache,
        })
    }

    /// Trains a fresh vocabulary and merge table on `corpus`, learning at
    /// most `max_merges` merges.
    ///
    /// Training always starts over: the previous vocabulary, merges and
    /// cache are discarded, never extended.
    ///
    /// # Returns
    ///
    /// The number of merges learned.
    ///
    /// # Errors
    ///
    /// See [`BPETokenizer::train_with`].
    pub fn train<S: AsRef<str>>(
        &mut self,
        corpus: &[S],
        max_merges: usize,
    ) -> Result<usize, TrainError> {
        self.train_with(corpus, &TrainerConfig::new(max_merges))
    }

    /// Like [`BPETokenizer::train`] with full trainer options.
    ///
    /// # Errors
    ///
    /// Returns [`TrainError::ProgressBarSetup`] if the progress bar template fails.
    pub fn train_with<S: AsRef<str>>(
        &mut self,
        corpus: &[S],
        trainer_config: &TrainerConfig,
    ) -> Result<usize, TrainError> {
        let mut trainer = BPETrainer::from_corpus(corpus, &self.pretokenizer);
        let learned = trainer.train(trainer_config)?;
        let (vocab, merges) = trainer.finish();

        self.vocab = vocab;
        self.converter = BPEConverter::new(merges);
        self.cache = EncodeCache::new(self.config.cache_capacity);

        Ok(learned)
    }

    /// Encodes `text` into token ids.
    ///
    /// # Arguments
    ///
    /// * `text` - Input text of any length.
    ///
    /// # Returns
    ///
    /// Ids of the subword symbols of every segment, in order. Empty or
    /// whitespace-only text yields an empty sequence. Characters outside the
    /// vocabulary become `<unk>`.
    pub fn encode(&self, text: &str) -> Vec<Token> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let mut ids = Vec::with_capacity(text.len() / 2);

        for segment in self.pretokenizer.split(text) {
            if segment.is_whitespace() {
                self.push_whitespace(segment.text, &mut ids);
                continue;
            }

            let symbols = self.segment_symbols(segment.text);
            for symbol in symbols.iter() {
                self.push_symbol(symbol, &mut ids);
            }
        }

        ids
    }

    /// Encodes `text` and appends the end-of-sequence id.
    pub fn encode_with_eos(&self, text: &str) -> Vec<Token> {
        let mut ids = self.encode(text);
        ids.push(self.special_token_id(SpecialToken::Eos));
        ids
    }

    /// Encodes many texts in parallel using Rayon.
    ///
    /// Results are in the same order as `texts`.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::ProgressBarSetup`] if the progress bar template fails.
    pub fn encode_batch(
        &self,
        texts: &[&str],
        show_progress: bool,
    ) -> Result<Vec<Vec<Token>>, EncodeError> {
        let pb = progress_bar(texts.len() as u64, "Encoding texts", show_progress)?;

        Ok(texts
            .par_iter()
            .progress_with(pb)
            .map(|text| self.encode(text))
            .collect())
    }

    /// Decodes ids back into text by concatenating their symbols.
    ///
    /// Ids with no symbol decode as `<unk>`. No separators are inserted.
    pub fn decode(&self, ids: &[Token]) -> String {
        let unk = self.unk_symbol();
        let mut text = String::with_capacity(ids.len() * 4);
        for &id in ids {
            text.push_str(self.vocab.symbol_of(id).unwrap_or(unk));
        }
        text
    }

    /// Decodes many id sequences in parallel using Rayon.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::ProgressBarSetup`] if the progress bar template fails.
    pub fn decode_batch(
        &self,
        id_seqs: &[&[Token]],
        show_progress: bool,
    ) -> Result<Vec<String>, DecodeError> {
        let pb = progress_bar(id_seqs.len() as u64, "Decoding tokens", show_progress)?;

        Ok(id_seqs
            .par_iter()
            .progress_with(pb)
            .map(|ids| self.decode(ids))
            .collect())
    }

    /// Number of registered symbols; ids are `0..vocab_size()`.
    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }

    /// Id of a special token.
    ///
    /// # Arguments
    ///
    /// * `token` - Which special token to look up.
    ///
    /// # Returns
    ///
    /// The id recorded when the token was registered. Trained tokenizers
    /// place the specials right after the base alphabet; an untrained one
    /// holds only the specials, at ids 0, 1 and 2.
    pub fn special_token_id(&self, token: SpecialToken) -> Token {
        self.vocab.special_id(token)
    }

    /// Symbol text for `id`, or `None` if the id is out of range.
    pub fn token_to_symbol(&self, id: Token) -> Option<&str> {
        self.vocab.symbol_of(id)
    }

    /// Id of `symbol`, or `None` if it is not registered.
    pub fn symbol_to_token(&self, symbol: &str) -> Option<Token> {
        self.vocab.id_of(symbol)
    }

    /// The current vocabulary.
    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Learned merge rules in rank order.
    pub fn merges(&self) -> &MergeTable {
        self.converter.merges()
    }

    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    /// Snapshot of the encode cache counters.
    ///
    /// # Returns
    ///
    /// Hits, misses (one merge computation each) and stored segments since
    /// the last training run or [`BPETokenizer::clear_cache`].
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drops cached segments and resets the counters.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Subword symbols of one non-whitespace segment, from the cache when possible.
    fn segment_symbols(&self, segment: &str) -> Arc<[String]> {
        self.cache
            .get_or_compute(segment, |s| self.converter.encode_segment(s))
    }

    fn push_symbol(&self, symbol: &str, ids: &mut Vec<Token>) {
        match self.vocab.id_of(symbol) {
            Some(id) => ids.push(id),
            None => self.push_chars(symbol, ids),
        }
    }

    /// One id per character, `<unk>` for characters outside the vocabulary.
    fn push_chars(&self, symbol: &str, ids: &mut Vec<Token>) {
        let unk = self.special_token_id(SpecialToken::Unk);
        let mut buf = [0u8; 4];
        for c in symbol.chars() {
            let ch: &str = c.encode_utf8(&mut buf);
            ids.push(self.vocab.id_of(ch).unwrap_or(unk));
        }
    }

    fn push_whitespace(&self, run: &str, ids: &mut Vec<Token>) {
        if let Some(id) = self.vocab.id_of(run) {
            ids.push(id);
            return;
        }
        match self.config.whitespace {
            WhitespaceMode::Registered => {}
            WhitespaceMode::CharFallback => self.push_chars(run, ids),
        }
    }

    fn unk_symbol(&self) -> &str {
        self.vocab
            .symbol_of(self.special_token_id(SpecialToken::Unk))
            .unwrap_or(SpecialToken::Unk.symbol())
    }
}
