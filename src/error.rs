//! Error types for tokenizer construction, training, batch processing and persistence.
//!
//! Single-text `encode` and `decode` never fail; only setup, batch helpers
//! (progress bar) and file I/O surface errors.

use std::{io, path::PathBuf};

use indicatif::style::TemplateError;
use thiserror::Error;

/// Errors that can occur when initializing a tokenizer.
#[derive(Debug, Error)]
pub enum TokenizerInitError {
    /// The pretokenizer regex pattern failed to compile.
    #[error("invalid split pattern: {0}")]
    InvalidPattern(#[from] fancy_regex::Error),
}

/// Errors that can occur during batch encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Progress bar template string was invalid.
    #[error("template parsing failed: {0}")]
    ProgressBarSetup(#[from] TemplateError),
}

/// Errors that can occur during batch decoding.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Progress bar template string was invalid.
    #[error("template parsing failed: {0}")]
    ProgressBarSetup(#[from] TemplateError),
}

/// Errors that can occur during training.
#[derive(Debug, Error)]
pub enum TrainError {
    /// Progress bar template string was invalid.
    #[error("template parsing failed: {0}")]
    ProgressBarSetup(#[from] TemplateError),
}

/// A special-token name that does not match any reserved token.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown special token: {0:?} (expected \"unk\", \"pad\" or \"eos\")")]
pub struct UnknownSpecialToken(pub String);

/// Errors that can occur when loading a persisted tokenizer.
///
/// Loading is the one place a hard failure is reported: a vocabulary that
/// does not match its merges would silently corrupt every id downstream.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A required file does not exist.
    #[error("missing tokenizer file: {}", path.display())]
    MissingFile { path: PathBuf },
    /// A file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A JSON file could not be parsed.
    #[error("failed to parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// A merges line is not a two-element array of strings.
    #[error("malformed merge on line {line}: {reason}")]
    MalformedMerge { line: usize, reason: String },
    /// Two ids map to the same symbol.
    #[error("symbol {symbol:?} is assigned more than one id")]
    DuplicateSymbol { symbol: String },
    /// Vocabulary ids are not dense.
    #[error("vocabulary has no symbol for id {id}")]
    IdGap { id: usize },
    /// A reserved special token is not in the vocabulary.
    #[error("special token {token:?} is missing from the vocabulary")]
    MissingSpecialToken { token: String },
    /// The persisted split pattern failed to compile.
    #[error("invalid split pattern: {0}")]
    InvalidPattern(#[from] fancy_regex::Error),
}

/// Errors that can occur when saving a tokenizer.
#[derive(Debug, Error)]
pub enum SaveError {
    /// A file or directory could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A value could not be serialized.
    #[error("failed to serialize {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
