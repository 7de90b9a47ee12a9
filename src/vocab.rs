//! Bidirectional symbol <-> id mapping with a named special-token registry.
//!
//! Ids are dense and handed out in insertion order. The vocabulary only ever
//! grows by appending; nothing is removed or renumbered.

use std::{collections::HashMap, fmt, str::FromStr};

use crate::{
    error::{LoadError, UnknownSpecialToken},
    types::Token,
};

/// Textual form of the unknown-token symbol.
pub const UNK_SYMBOL: &str = "<unk>";
/// Textual form of the padding symbol.
pub const PAD_SYMBOL: &str = "<pad>";
/// Textual form of the end-of-sequence symbol.
pub const EOS_SYMBOL: &str = "<eos>";

/// Reserved vocabulary entries with a fixed role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialToken {
    Unk,
    Pad,
    Eos,
}

impl SpecialToken {
    /// All special tokens in registration order.
    pub const ALL: [SpecialToken; 3] = [SpecialToken::Unk, SpecialToken::Pad, SpecialToken::Eos];

    /// The symbol registered in the vocabulary for this token.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Unk => UNK_SYMBOL,
            Self::Pad => PAD_SYMBOL,
            Self::Eos => EOS_SYMBOL,
        }
    }
}

impl fmt::Display for SpecialToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for SpecialToken {
    type Err = UnknownSpecialToken;

    /// Parses either the short name (`"unk"`, `"pad"`, `"eos"`, case-insensitive)
    /// or the registered symbol (`"<unk>"`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unk" | UNK_SYMBOL => Ok(Self::Unk),
            "pad" | PAD_SYMBOL => Ok(Self::Pad),
            "eos" | EOS_SYMBOL => Ok(Self::Eos),
            _ => Err(UnknownSpecialToken(s.to_string())),
        }
    }
}

/// Ids of the special tokens, captured when they were registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialTokens {
    pub unk: Token,
    pub pad: Token,
    pub eos: Token,
}

impl SpecialTokens {
    /// Id recorded for `token`.
    pub fn id(&self, token: SpecialToken) -> Token {
        match token {
            SpecialToken::Unk => self.unk,
            SpecialToken::Pad => self.pad,
            SpecialToken::Eos => self.eos,
        }
    }
}

/// Subword vocabulary.
///
/// Invariant: `symbols[id]` and `ids[symbol]` are inverse of each other and
/// cover exactly `[0, len)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    /// Forward lookup: symbol → id.
    ids: HashMap<String, Token>,
    /// Reverse lookup: id → symbol.
    symbols: Vec<String>,
    /// Special token ids recorded at registration time.
    specials: SpecialTokens,
}

impl Vocabulary {
    /// Creates a vocabulary holding `alphabet` (in iteration order) followed
    /// by the special tokens.
    ///
    /// Duplicate alphabet entries are registered once.
    pub fn with_alphabet<I, S>(alphabet: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ids = HashMap::new();
        let mut symbols = Vec::new();

        for symbol in alphabet {
            insert_symbol(&mut ids, &mut symbols, symbol.into());
        }

        let specials = SpecialTokens {
            unk: insert_symbol(&mut ids, &mut symbols, UNK_SYMBOL.to_string()),
            pad: insert_symbol(&mut ids, &mut symbols, PAD_SYMBOL.to_string()),
            eos: insert_symbol(&mut ids, &mut symbols, EOS_SYMBOL.to_string()),
        };

        Self {
            ids,
            symbols,
            specials,
        }
    }

    /// Rebuilds a vocabulary from persisted `(symbol, id)` entries.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::DuplicateSymbol`] if two ids share a symbol or an id
    /// appears twice, [`LoadError::IdGap`] if the ids are not exactly
    /// `0..entries` (an id at or past the entry count leaves a gap below it),
    /// and [`LoadError::MissingSpecialToken`] if a reserved token is absent.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (String, Token)>,
    ) -> Result<Self, LoadError> {
        let entries: Vec<(String, Token)> = entries.into_iter().collect();
        // Dense ids over n entries must be exactly `0..n`.
        let mut slots: Vec<Option<String>> = vec![None; entries.len()];
        let mut ids = HashMap::with_capacity(entries.len());

        for (symbol, id) in entries {
            if ids.insert(symbol.clone(), id).is_some() {
                return Err(LoadError::DuplicateSymbol { symbol });
            }
            // An id past the end leaves a hole below it, reported as a gap.
            let Some(slot) = slots.get_mut(id) else {
                continue;
            };
            if slot.is_some() {
                return Err(LoadError::DuplicateSymbol { symbol });
            }
            *slot = Some(symbol);
        }

        let mut symbols = Vec::with_capacity(slots.len());
        for (id, slot) in slots.into_iter().enumerate() {
            match slot {
                Some(symbol) => symbols.push(symbol),
                None => return Err(LoadError::IdGap { id }),
            }
        }

        let special_id = |token: SpecialToken| {
            ids.get(token.symbol())
                .copied()
                .ok_or_else(|| LoadError::MissingSpecialToken {
                    token: token.symbol().to_string(),
                })
        };
        let specials = SpecialTokens {
            unk: special_id(SpecialToken::Unk)?,
            pad: special_id(SpecialToken::Pad)?,
            eos: special_id(SpecialToken::Eos)?,
        };

        Ok(Self {
            ids,
            symbols,
            specials,
        })
    }

    /// Registers `symbol`, returning its id.
    ///
    /// Already-registered symbols keep their id; new ones get the next id.
    pub fn register(&mut self, symbol: impl Into<String>) -> Token {
        insert_symbol(&mut self.ids, &mut self.symbols, symbol.into())
    }

    /// Number of registered symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Looks up the id of `symbol`.
    ///
    /// # Arguments
    ///
    /// * `symbol` - Exact symbol text, e.g. `"es"` or `"<unk>"`.
    ///
    /// # Returns
    ///
    /// The symbol's id, or `None` if it was never registered.
    pub fn id_of(&self, symbol: &str) -> Option<Token> {
        self.ids.get(symbol).copied()
    }

    /// Looks up the symbol registered under `id`.
    ///
    /// # Returns
    ///
    /// The symbol text, or `None` if `id` is not below [`Vocabulary::len`].
    pub fn symbol_of(&self, id: Token) -> Option<&str> {
        self.symbols.get(id).map(String::as_str)
    }

    /// Whether `symbol` is registered.
    pub fn contains(&self, symbol: &str) -> bool {
        self.ids.contains_key(symbol)
    }

    /// Ids of all three special tokens.
    pub fn specials(&self) -> SpecialTokens {
        self.specials
    }

    /// Id of one special token.
    pub fn special_id(&self, token: SpecialToken) -> Token {
        self.specials.id(token)
    }

    /// Iterates `(id, symbol)` in id order.
    pub fn iter(&self) -> impl Iterator<Item = (Token, &str)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(id, symbol)| (id, symbol.as_str()))
    }
}

impl Default for Vocabulary {
    /// A vocabulary holding only the special tokens.
    fn default() -> Self {
        Self::with_alphabet(std::iter::empty::<String>())
    }
}

fn insert_symbol(
    ids: &mut HashMap<String, Token>,
    symbols: &mut Vec<String>,
    symbol: String,
) -> Token {
    if let Some(&id) = ids.get(&symbol) {
        return id;
    }
    let id = symbols.len();
    ids.insert(symbol.clone(), id);
    symbols.push(symbol);
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabet_then_specials() {
        let vocab = Vocabulary::with_alphabet(["a", "b"]);
        assert_eq!(vocab.id_of("a"), Some(0));
        assert_eq!(vocab.id_of("b"), Some(1));
        assert_eq!(vocab.specials().unk, 2);
        assert_eq!(vocab.specials().pad, 3);
        assert_eq!(vocab.specials().eos, 4);
        assert_eq!(vocab.len(), 5);
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut vocab = Vocabulary::default();
        let first = vocab.register("ab");
        let again = vocab.register("ab");
        assert_eq!(first, again);
        assert_eq!(vocab.len(), 4);
    }

    #[test]
    fn test_register_appends_sequential_ids() {
        let mut vocab = Vocabulary::with_alphabet(["x"]);
        let before = vocab.len();
        assert_eq!(vocab.register("xx"), before);
        assert_eq!(vocab.register("xxx"), before + 1);
        assert_eq!(vocab.symbol_of(before), Some("xx"));
    }

    #[test]
    fn test_duplicate_alphabet_registered_once() {
        let vocab = Vocabulary::with_alphabet(["a", "a", "b"]);
        assert_eq!(vocab.id_of("b"), Some(1));
        assert_eq!(vocab.len(), 5);
    }

    #[test]
    fn test_lookup_absent() {
        let vocab = Vocabulary::default();
        assert_eq!(vocab.id_of("zz"), None);
        assert_eq!(vocab.symbol_of(99), None);
    }

    #[test]
    fn test_from_entries_round_trip() {
        let vocab = Vocabulary::with_alphabet(["h", "i"]);
        let entries: Vec<(String, Token)> =
            vocab.iter().map(|(id, s)| (s.to_string(), id)).collect();
        let rebuilt = Vocabulary::from_entries(entries).expect("entries should be valid");
        assert_eq!(rebuilt, vocab);
    }

    #[test]
    fn test_from_entries_rejects_gap() {
        let entries = vec![
            (UNK_SYMBOL.to_string(), 0),
            (PAD_SYMBOL.to_string(), 1),
            (EOS_SYMBOL.to_string(), 3),
        ];
        let result = Vocabulary::from_entries(entries);
        assert!(matches!(result, Err(LoadError::IdGap { id: 2 })));
    }

    #[test]
    fn test_from_entries_rejects_huge_id() {
        let entries = vec![
            (UNK_SYMBOL.to_string(), 0),
            (PAD_SYMBOL.to_string(), 1),
            (EOS_SYMBOL.to_string(), 2),
            ("a".to_string(), usize::MAX),
        ];
        let result = Vocabulary::from_entries(entries);
        assert!(matches!(result, Err(LoadError::IdGap { id: 3 })));
    }

    #[test]
    fn test_from_entries_rejects_id_past_end() {
        let entries = vec![
            ("a".to_string(), u32::MAX as usize),
            (UNK_SYMBOL.to_string(), 0),
        ];
        let result = Vocabulary::from_entries(entries);
        assert!(matches!(result, Err(LoadError::IdGap { id: 1 })));
    }

    #[test]
    fn test_from_entries_rejects_repeated_symbol() {
        let entries = vec![
            (UNK_SYMBOL.to_string(), 0),
            ("a".to_string(), 1),
            ("a".to_string(), 2),
        ];
        match Vocabulary::from_entries(entries) {
            Err(LoadError::DuplicateSymbol { symbol }) => assert_eq!(symbol, "a"),
            other => panic!("expected DuplicateSymbol, got {other:?}"),
        }
    }

    #[test]
    fn test_from_entries_rejects_shared_id() {
        let entries = vec![("a".to_string(), 0), ("b".to_string(), 0)];
        let result = Vocabulary::from_entries(entries);
        assert!(matches!(result, Err(LoadError::DuplicateSymbol { .. })));
    }

    #[test]
    fn test_from_entries_requires_specials() {
        let entries = vec![("a".to_string(), 0), (UNK_SYMBOL.to_string(), 1)];
        let result = Vocabulary::from_entries(entries);
        match result {
            Err(LoadError::MissingSpecialToken { token }) => assert_eq!(token, PAD_SYMBOL),
            other => panic!("expected MissingSpecialToken, got {other:?}"),
        }
    }

    #[test]
    fn test_special_token_from_str() {
        assert_eq!("unk".parse::<SpecialToken>(), Ok(SpecialToken::Unk));
        assert_eq!("PAD".parse::<SpecialToken>(), Ok(SpecialToken::Pad));
        assert_eq!("<eos>".parse::<SpecialToken>(), Ok(SpecialToken::Eos));
        assert!("bos".parse::<SpecialToken>().is_err());
    }
}
