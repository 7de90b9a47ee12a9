//! Tokenizer configuration.
//!
//! Persisted next to the vocabulary so that the segmentation used at encode
//! time always matches the one used during training.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{cache::DEFAULT_CACHE_CAPACITY, pretokenizer::DEFAULT_PATTERN};

/// How whitespace segments are turned into ids.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WhitespaceMode {
    /// Emit the run's id if the exact run is a registered symbol, otherwise
    /// emit nothing for it.
    #[default]
    Registered,
    /// Emit the run's id if registered, otherwise one id per character with
    /// `<unk>` for unregistered characters. Spacing survives a round trip
    /// whenever the characters were seen in training.
    CharFallback,
}

impl fmt::Display for WhitespaceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registered => f.write_str("registered"),
            Self::CharFallback => f.write_str("char_fallback"),
        }
    }
}

impl FromStr for WhitespaceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "registered" => Ok(Self::Registered),
            "char_fallback" => Ok(Self::CharFallback),
            _ => Err(format!(
                "invalid whitespace mode: {s:?} (expected \"registered\" or \"char_fallback\")"
            )),
        }
    }
}

/// Encode-side settings of a tokenizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    /// Pretokenizer split pattern.
    pub pattern: String,
    /// Whitespace segment policy.
    pub whitespace: WhitespaceMode,
    /// Maximum number of cached segments; `0` disables the cache.
    pub cache_capacity: usize,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.to_string(),
            whitespace: WhitespaceMode::default(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}
