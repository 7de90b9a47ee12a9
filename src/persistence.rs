//! Save/load a tokenizer as a directory of plain-text files.
//!
//! Layout:
//! - `vocab.json`: JSON object `symbol -> id`, written in id order.
//! - `merges.txt`: a `#version` header, then one merge per line as a JSON
//!   array `["left","right"]`. Line order is rank order.
//! - `tokenizer_config.json`: the [`TokenizerConfig`]; optional on load.

use std::{
    fmt, fs,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{MapAccess, Visitor},
};

use crate::{
    config::TokenizerConfig,
    error::{LoadError, SaveError, TokenizerInitError},
    merges::MergeTable,
    tokenizer::BPETokenizer,
    types::Token,
    vocab::Vocabulary,
};

pub const VOCAB_FILE: &str = "vocab.json";
pub const MERGES_FILE: &str = "merges.txt";
pub const CONFIG_FILE: &str = "tokenizer_config.json";

const MERGES_HEADER: &str = "#version: bpetok 1";

/// Serializes a vocabulary as a map in id order.
struct VocabFile<'a>(&'a Vocabulary);

impl Serialize for VocabFile<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(id, symbol)| (symbol, id)))
    }
}

/// `symbol -> id` pairs in file order.
///
/// Read through a map visitor rather than into a `HashMap` so a symbol that
/// appears twice reaches [`Vocabulary::from_entries`] instead of silently
/// keeping its last id.
struct VocabEntries(Vec<(String, Token)>);

impl<'de> Deserialize<'de> for VocabEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = VocabEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object mapping symbols to ids")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, Token>()? {
                    entries.push(entry);
                }
                Ok(VocabEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

impl BPETokenizer {
    /// Writes the vocabulary, merges and config into `dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`SaveError::Io`] if the directory or a file cannot be written,
    /// or [`SaveError::Json`] if serialization fails.
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<(), SaveError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|source| SaveError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        save_vocab(self.vocab(), &dir.join(VOCAB_FILE))?;
        save_merges(self.merges(), &dir.join(MERGES_FILE))?;
        save_config(self.config(), &dir.join(CONFIG_FILE))?;

        log::info!(
            "saved tokenizer to {}: {} symbols, {} merges",
            dir.display(),
            self.vocab_size(),
            self.merges().len()
        );
        Ok(())
    }

    /// Loads a tokenizer saved by [`BPETokenizer::save`].
    ///
    /// The rank index is rebuilt from merge order exactly as training builds it.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] naming the missing file or the parse failure.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, LoadError> {
        let dir = dir.as_ref();

        let vocab = load_vocab(&dir.join(VOCAB_FILE))?;
        let merges = load_merges(&dir.join(MERGES_FILE))?;
        let config = load_config(&dir.join(CONFIG_FILE))?;

        log::info!(
            "loaded tokenizer from {}: {} symbols, {} merges",
            dir.display(),
            vocab.len(),
            merges.len()
        );

        Self::from_parts(config, vocab, merges).map_err(|e| match e {
            TokenizerInitError::InvalidPattern(e) => LoadError::InvalidPattern(e),
        })
    }
}

/// Writes `vocab` as a JSON object in id order.
pub fn save_vocab(vocab: &Vocabulary, path: &Path) -> Result<(), SaveError> {
    let json = serde_json::to_string_pretty(&VocabFile(vocab)).map_err(|source| SaveError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| SaveError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes `merges` one pair per line, in rank order.
pub fn save_merges(merges: &MergeTable, path: &Path) -> Result<(), SaveError> {
    let io_err = |source| SaveError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = fs::File::create(path).map_err(io_err)?;
    let mut out = BufWriter::new(file);
    writeln!(out, "{MERGES_HEADER}").map_err(io_err)?;

    for rule in merges.rules() {
        let line = serde_json::to_string(&[&rule.left, &rule.right]).map_err(|source| {
            SaveError::Json {
                path: path.to_path_buf(),
                source,
            }
        })?;
        writeln!(out, "{line}").map_err(io_err)?;
    }

    out.flush().map_err(io_err)
}

fn save_config(config: &TokenizerConfig, path: &Path) -> Result<(), SaveError> {
    let json = serde_json::to_string_pretty(config).map_err(|source| SaveError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| SaveError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a `symbol -> id` JSON object.
///
/// # Errors
///
/// Returns [`LoadError::MissingFile`] or [`LoadError::Io`] if the file cannot
/// be read, [`LoadError::Json`] if it is not a symbol-to-id object, and the
/// [`Vocabulary::from_entries`] errors if the ids are not a dense `0..n`
/// over unique symbols.
pub fn load_vocab(path: &Path) -> Result<Vocabulary, LoadError> {
    let content = read_required(path)?;
    let VocabEntries(entries) =
        serde_json::from_str(&content).map_err(|source| LoadError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    Vocabulary::from_entries(entries)
}

/// Reads a merges file; line order defines rank.
pub fn load_merges(path: &Path) -> Result<MergeTable, LoadError> {
    let content = read_required(path)?;
    parse_merges(&content)
}

fn parse_merges(content: &str) -> Result<MergeTable, LoadError> {
    let mut merges = MergeTable::new();

    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let pair: Vec<String> =
            serde_json::from_str(line).map_err(|e| LoadError::MalformedMerge {
                line: line_no,
                reason: e.to_string(),
            })?;
        let [left, right]: [String; 2] =
            pair.try_into().map_err(|p: Vec<String>| LoadError::MalformedMerge {
                line: line_no,
                reason: format!("expected 2 symbols, found {}", p.len()),
            })?;
        if left.is_empty() || right.is_empty() {
            return Err(LoadError::MalformedMerge {
                line: line_no,
                reason: "empty symbol".to_string(),
            });
        }

        let before = merges.len();
        merges.push(left, right);
        if merges.len() == before {
            return Err(LoadError::MalformedMerge {
                line: line_no,
                reason: "duplicate merge".to_string(),
            });
        }
    }

    Ok(merges)
}

fn load_config(path: &Path) -> Result<TokenizerConfig, LoadError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::info!("{} not found, using default config", path.display());
            return Ok(TokenizerConfig::default());
        }
        Err(source) => {
            return Err(LoadError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    serde_json::from_str(&content).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn read_required(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            LoadError::MissingFile {
                path: PathBuf::from(path),
            }
        } else {
            LoadError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}
