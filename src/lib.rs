//! Subword BPE tokenizer.
//!
//! Trains a vocabulary of subword symbols from a text corpus by repeatedly
//! merging the most frequent adjacent pair, then encodes text into dense
//! integer ids and decodes ids back into text.
//!
//! ```
//! use bpetok::{BPETokenizer, SpecialToken, TokenizerConfig};
//!
//! let mut tokenizer = BPETokenizer::new(TokenizerConfig::default())?;
//! tokenizer.train(&["low", "lower", "newest", "widest"], 2)?;
//!
//! let ids = tokenizer.encode("lowest");
//! assert_eq!(tokenizer.decode(&ids), "lowest");
//!
//! let unk = tokenizer.special_token_id(SpecialToken::Unk);
//! assert_eq!(tokenizer.decode(&[unk, unk]), "<unk><unk>");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! With the `python` feature the crate also builds a PyO3 extension module.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(unused_must_use)]

mod cache;
mod config;
mod converter;
mod error;
mod merges;
mod persistence;
mod pretokenizer;
mod progress;
mod tokenizer;
mod trainer;
mod types;
mod vocab;

#[cfg(feature = "python")]
mod python;

pub use cache::{CacheStats, DEFAULT_CACHE_CAPACITY};
pub use config::{TokenizerConfig, WhitespaceMode};
pub use converter::BPEConverter;
pub use error::{
    DecodeError, EncodeError, LoadError, SaveError, TokenizerInitError, TrainError,
    UnknownSpecialToken,
};
pub use merges::{MergeRule, MergeTable};
pub use persistence::{
    CONFIG_FILE, MERGES_FILE, VOCAB_FILE, load_merges, load_vocab, save_merges, save_vocab,
};
pub use pretokenizer::{DEFAULT_PATTERN, Pretokenizer, Segment, SegmentKind};
pub use tokenizer::BPETokenizer;
pub use trainer::{BPETrainer, TrainerConfig};
pub use types::{MergeRank, SymbolPair, Token};
pub use vocab::{EOS_SYMBOL, PAD_SYMBOL, SpecialToken, SpecialTokens, UNK_SYMBOL, Vocabulary};
