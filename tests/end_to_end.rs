use bpetok::{BPETokenizer, LoadError, SpecialToken, TokenizerConfig, WhitespaceMode};

const CORPUS: &[&str] = &[
    "the quick brown fox jumps over the lazy dog",
    "the lazy dog sleeps, the quick fox runs!",
    "foxes and dogs: friends or foes?",
];

fn train(config: TokenizerConfig, max_merges: usize) -> BPETokenizer {
    let mut tokenizer = BPETokenizer::new(config).expect("config should be valid");
    tokenizer
        .train(CORPUS, max_merges)
        .expect("training should succeed");
    tokenizer
}

#[test]
fn train_save_load_encode() {
    let tokenizer = train(TokenizerConfig::default(), 40);
    let dir = tempfile::tempdir().expect("tempdir should be created");
    tokenizer.save(dir.path()).expect("save should succeed");

    let reloaded = BPETokenizer::load(dir.path()).expect("load should succeed");
    assert_eq!(reloaded.vocab_size(), tokenizer.vocab_size());
    for text in CORPUS {
        assert_eq!(reloaded.encode(text), tokenizer.encode(text));
    }
    for token in SpecialToken::ALL {
        assert_eq!(
            reloaded.special_token_id(token),
            tokenizer.special_token_id(token)
        );
    }
}

#[test]
fn corpus_round_trips() {
    let tokenizer = train(TokenizerConfig::default(), 40);
    let unk = tokenizer.special_token_id(SpecialToken::Unk);
    for text in CORPUS {
        let ids = tokenizer.encode(text);
        assert!(!ids.contains(&unk));
        assert_eq!(&tokenizer.decode(&ids), text);
    }
}

#[test]
fn merges_compress_training_text() {
    let untrained = train(TokenizerConfig::default(), 0);
    let trained = train(TokenizerConfig::default(), 40);
    let text = CORPUS[0];
    assert!(trained.encode(text).len() < untrained.encode(text).len());
}

#[test]
fn vocabulary_grows_monotonically() {
    let sizes: Vec<usize> = (0..30)
        .map(|n| train(TokenizerConfig::default(), n).vocab_size())
        .collect();
    assert!(sizes.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn char_fallback_keeps_unseen_spacing() {
    let config = TokenizerConfig {
        whitespace: WhitespaceMode::CharFallback,
        ..TokenizerConfig::default()
    };
    let tokenizer = train(config, 20);
    let text = "the  lazy   fox";
    assert_eq!(tokenizer.decode(&tokenizer.encode(text)), text);
}

#[test]
fn load_from_empty_directory_fails() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    assert!(matches!(
        BPETokenizer::load(dir.path()),
        Err(LoadError::MissingFile { .. })
    ));
}
