use bpetok::{BPETokenizer, SpecialToken, TokenizerConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let corpus = ["low", "lower", "newest", "widest"];

    let mut tokenizer = BPETokenizer::new(TokenizerConfig::default())?;
    let learned = tokenizer.train(&corpus, 10)?;

    println!("Learned {learned} merges, vocabulary size {}", tokenizer.vocab_size());
    for (rank, rule) in tokenizer.merges().rules().iter().enumerate() {
        println!("  #{rank}: {:?} + {:?} -> {:?}", rule.left, rule.right, rule.merged);
    }

    for text in ["lowest", "wider newer", "hi🙂"] {
        let ids = tokenizer.encode(text);
        let pieces: Vec<&str> = ids
            .iter()
            .map(|&id| tokenizer.token_to_symbol(id).unwrap_or("?"))
            .collect();
        println!("\n{text:?}\n  ids:     {ids:?}\n  pieces:  {pieces:?}\n  decoded: {:?}", tokenizer.decode(&ids));
    }

    println!(
        "\n<unk>={} <pad>={} <eos>={}",
        tokenizer.special_token_id(SpecialToken::Unk),
        tokenizer.special_token_id(SpecialToken::Pad),
        tokenizer.special_token_id(SpecialToken::Eos),
    );
    println!("cache: {:?}", tokenizer.cache_stats());

    Ok(())
}
