//! PyO3 bindings, built with the `python` feature.

use std::collections::HashMap;

use pyo3::{
    exceptions::{PyIOError, PyRuntimeError, PyValueError},
    prelude::*,
};

use crate::{
    BPETokenizer, DEFAULT_CACHE_CAPACITY, DEFAULT_PATTERN, LoadError, SpecialToken, Token,
    TokenizerConfig, TrainerConfig, WhitespaceMode,
};

/// Python wrapper for the BPE tokenizer.
#[pyclass(name = "Tokenizer")]
pub struct PyTokenizer {
    tokenizer: BPETokenizer,
}

#[pymethods]
impl PyTokenizer {
    #[new]
    #[pyo3(signature = (pattern=None, whitespace="registered", cache_capacity=DEFAULT_CACHE_CAPACITY))]
    fn new(pattern: Option<String>, whitespace: &str, cache_capacity: usize) -> PyResult<Self> {
        let whitespace: WhitespaceMode = whitespace.parse().map_err(PyValueError::new_err)?;
        let config = TokenizerConfig {
            pattern: pattern.unwrap_or_else(|| DEFAULT_PATTERN.to_string()),
            whitespace,
            cache_capacity,
        };
        let tokenizer =
            BPETokenizer::new(config).map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(Self { tokenizer })
    }

    /// Trains from scratch; returns the number of merges learned.
    #[pyo3(signature = (corpus, max_merges, min_pair_frequency=1, show_progress=false))]
    fn train(
        &mut self,
        py: Python<'_>,
        corpus: Vec<String>,
        max_merges: usize,
        min_pair_frequency: usize,
        show_progress: bool,
    ) -> PyResult<usize> {
        let config = TrainerConfig {
            max_merges,
            min_pair_frequency,
            show_progress,
        };
        let tokenizer = &mut self.tokenizer;
        py.allow_threads(|| tokenizer.train_with(&corpus, &config))
            .map_err(|e| PyRuntimeError::new_err(e.to_string()))
    }

    fn encode(&self, text: &str) -> Vec<Token> {
        self.tokenizer.encode(text)
    }

    fn encode_with_eos(&self, text: &str) -> Vec<Token> {
        self.tokenizer.encode_with_eos(text)
    }

    #[pyo3(signature = (texts, show_progress=false))]
    fn encode_batch(
        &self,
        py: Python<'_>,
        texts: Vec<String>,
        show_progress: bool,
    ) -> PyResult<Vec<Vec<Token>>> {
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        py.allow_threads(|| self.tokenizer.encode_batch(&refs, show_progress))
            .map_err(|e| PyRuntimeError::new_err(e.to_string()))
    }

    fn decode(&self, ids: Vec<Token>) -> String {
        self.tokenizer.decode(&ids)
    }

    fn vocab_size(&self) -> usize {
        self.tokenizer.vocab_size()
    }

    /// Id of `"unk"`, `"pad"` or `"eos"`.
    fn special_token_id(&self, name: &str) -> PyResult<Token> {
        let token: SpecialToken = name
            .parse()
            .map_err(|e: crate::UnknownSpecialToken| PyValueError::new_err(e.to_string()))?;
        Ok(self.tokenizer.special_token_id(token))
    }

    /// Mapping of special-token symbol to id.
    fn special_tokens(&self) -> HashMap<&'static str, Token> {
        SpecialToken::ALL
            .into_iter()
            .map(|t| (t.symbol(), self.tokenizer.special_token_id(t)))
            .collect()
    }

    fn save(&self, folder: &str) -> PyResult<()> {
        self.tokenizer
            .save(folder)
            .map_err(|e| PyIOError::new_err(e.to_string()))
    }

    #[staticmethod]
    fn load(folder: &str) -> PyResult<Self> {
        let tokenizer = BPETokenizer::load(folder).map_err(|e| match e {
            LoadError::MissingFile { .. } | LoadError::Io { .. } => {
                PyIOError::new_err(e.to_string())
            }
            _ => PyValueError::new_err(e.to_string()),
        })?;
        Ok(Self { tokenizer })
    }
}

#[pymodule]
fn _bpetok(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Forwards Rust `log` records to Python's `logging`.
    pyo3_log::init();
    m.add_class::<PyTokenizer>()?;
    Ok(())
}
