//! Splits raw text into coarse segments before BPE runs inside each one.
//!
//! The default pattern partitions characters into three classes: letters and
//! digits, whitespace, and everything else. Each segment is a maximal run of
//! one class. The same splitter is used for training and encoding so both
//! phases see identical boundaries.

use fancy_regex::{Regex, RegexBuilder};

use crate::error::TokenizerInitError;

/// Default split pattern: word runs, whitespace runs, punctuation/symbol runs.
pub const DEFAULT_PATTERN: &str = r"[\p{L}\p{N}]+|\s+|[^\p{L}\p{N}\s]+";

/// Letter/digit test on a segment's first character, using the same classes
/// as [`DEFAULT_PATTERN`].
const WORD_START: &str = r"^[\p{L}\p{N}]";

/// Character class of a segment, decided by its first character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    Word,
    Punctuation,
    Whitespace,
}

/// A slice of the input produced by [`Pretokenizer::split`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub kind: SegmentKind,
}

impl Segment<'_> {
    pub fn is_whitespace(&self) -> bool {
        self.kind == SegmentKind::Whitespace
    }
}

/// Regex-driven pretokenizer.
#[derive(Debug, Clone)]
pub struct Pretokenizer {
    pattern: Regex,
    word_start: Regex,
}

impl Pretokenizer {
    /// Compiles a pretokenizer from a split pattern.
    ///
    /// Text not covered by any match is dropped, so custom patterns should
    /// match every character (as [`DEFAULT_PATTERN`] does).
    ///
    /// # Errors
    ///
    /// Returns [`TokenizerInitError::InvalidPattern`] if `pattern` fails to compile.
    pub fn new(pattern: &str) -> Result<Self, TokenizerInitError> {
        Self::from_regex(Regex::new(pattern)?)
    }

    /// Like [`Pretokenizer::new`], with an explicit cap on backtracking steps
    /// per match attempt.
    ///
    /// # Arguments
    ///
    /// * `pattern` - Split pattern.
    /// * `limit` - Backtracking steps allowed before a match attempt fails.
    ///
    /// # Errors
    ///
    /// Returns [`TokenizerInitError::InvalidPattern`] if `pattern` fails to compile.
    pub fn with_backtrack_limit(pattern: &str, limit: usize) -> Result<Self, TokenizerInitError> {
        Self::from_regex(RegexBuilder::new(pattern).backtrack_limit(limit).build()?)
    }

    fn from_regex(pattern: Regex) -> Result<Self, TokenizerInitError> {
        Ok(Self {
            pattern,
            word_start: Regex::new(WORD_START)?,
        })
    }

    /// The split pattern source.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Classifies `chunk` by its first character.
    ///
    /// Whitespace is Unicode `White_Space`, as for `\s`. Letters and digits
    /// use the split pattern's `\p{L}\p{N}` classes, so combining marks are
    /// punctuation.
    fn kind_of(&self, chunk: &str) -> SegmentKind {
        match chunk.chars().next() {
            Some(c) if c.is_whitespace() => SegmentKind::Whitespace,
            Some(_) if self.word_start.is_match(chunk).unwrap_or(false) => SegmentKind::Word,
            _ => SegmentKind::Punctuation,
        }
    }

    /// Splits `text` into ordered segments.
    ///
    /// Never fails: if the regex engine gives up part way (e.g. a custom
    /// pattern hits the backtracking limit) the unscanned remainder becomes a
    /// single final segment.
    pub fn split<'a>(&self, text: &'a str) -> Vec<Segment<'a>> {
        let mut segments = Vec::new();
        let mut scanned = 0;

        for mat in self.pattern.find_iter(text) {
            match mat {
                Ok(m) => {
                    let chunk = m.as_str();
                    scanned = m.end();
                    if chunk.is_empty() {
                        continue;
                    }
                    segments.push(Segment {
                        text: chunk,
                        kind: self.kind_of(chunk),
                    });
                }
                Err(e) => {
                    log::warn!("split pattern failed at byte {scanned}: {e}; keeping remainder whole");
                    let rest = &text[scanned..];
                    if !rest.is_empty() {
                        segments.push(Segment {
                            text: rest,
                            kind: self.kind_of(rest),
                        });
                    }
                    break;
                }
            }
        }

        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_pretokenizer() -> Pretokenizer {
        Pretokenizer::new(DEFAULT_PATTERN).expect("default pattern should compile")
    }

    fn texts<'a>(segments: &[Segment<'a>]) -> Vec<&'a str> {
        segments.iter().map(|s| s.text).collect()
    }

    #[test]
    fn test_three_classes() {
        let pre = default_pretokenizer();
        let segments = pre.split("hello, world!!  ok");
        assert_eq!(
            texts(&segments),
            vec!["hello", ",", " ", "world", "!!", "  ", "ok"]
        );
        assert_eq!(segments[0].kind, SegmentKind::Word);
        assert_eq!(segments[1].kind, SegmentKind::Punctuation);
        assert_eq!(segments[2].kind, SegmentKind::Whitespace);
    }

    #[test]
    fn test_digits_are_word_characters() {
        let pre = default_pretokenizer();
        assert_eq!(texts(&pre.split("abc123 4x")), vec!["abc123", " ", "4x"]);
    }

    #[test]
    fn test_unicode_letters_and_symbols() {
        let pre = default_pretokenizer();
        let segments = pre.split("héllo🙂");
        assert_eq!(texts(&segments), vec!["héllo", "🙂"]);
        assert_eq!(segments[1].kind, SegmentKind::Punctuation);
    }

    #[test]
    fn test_combining_marks_are_punctuation() {
        let pre = default_pretokenizer();
        // U+093F is a spacing mark: alphabetic to `char`, but neither \p{L} nor \p{N}.
        let segments = pre.split("\u{915}\u{93F}");
        assert_eq!(texts(&segments), vec!["\u{915}", "\u{93F}"]);
        assert_eq!(segments[0].kind, SegmentKind::Word);
        assert_eq!(segments[1].kind, SegmentKind::Punctuation);
    }

    #[test]
    fn test_backtrack_limit_keeps_remainder_whole() {
        let pre = Pretokenizer::with_backtrack_limit(r"(a|b|ab)*(?=c)|\s+|\S+", 1_000)
            .expect("pattern should compile");
        let hard = "ab".repeat(30);
        let text = format!("xy {hard}");

        let segments = pre.split(&text);
        assert_eq!(texts(&segments), vec!["xy", " ", hard.as_str()]);
        assert_eq!(segments[1].kind, SegmentKind::Whitespace);
        assert_eq!(segments[2].kind, SegmentKind::Word);
    }

    #[test]
    fn test_mixed_whitespace_run() {
        let pre = default_pretokenizer();
        let segments = pre.split("a \t\nb");
        assert_eq!(texts(&segments), vec!["a", " \t\n", "b"]);
        assert!(segments[1].is_whitespace());
    }

    #[test]
    fn test_concatenation_reproduces_input() {
        let pre = default_pretokenizer();
        let text = "It's 3:45pm -- time for tea?";
        let joined: String = pre.split(text).iter().map(|s| s.text).collect();
        assert_eq!(joined, text);
    }

    #[test]
    fn test_empty_text() {
        let pre = default_pretokenizer();
        assert!(pre.split("").is_empty());
    }

    #[test]
    fn test_invalid_pattern() {
        let result = Pretokenizer::new("(unclosed");
        assert!(matches!(result, Err(TokenizerInitError::InvalidPattern(_))));
    }

    #[test]
    fn test_custom_pattern_drops_gaps() {
        let pre = Pretokenizer::new(r"\S+").expect("pattern should compile");
        assert_eq!(texts(&pre.split("ab cd")), vec!["ab", "cd"]);
    }
}
