//! Chinese-aware tokenizer for the message index.
//!
//! `tokenize` turns text into a deduplicated, order-preserving list of index terms:
//! segmented words (minus stopwords) followed by character bigrams of the compacted text.
//! Bigrams make every 2+ character substring retrievable even when it does not line up with
//! a segmentation boundary.

use std::collections::HashSet;
use std::sync::Arc;

use jieba_rs::Jieba;
use once_cell::sync::Lazy;

/// Chinese function words dropped from segmented tokens (bigrams keep them).
pub const DEFAULT_STOPWORDS: [&str; 10] = ["的", "了", "和", "是", "在", "就", "都", "而", "及", "与"];

/// Word segmentation capability. Must be deterministic for identical input and keep no
/// state between calls.
pub trait Segmenter: Send + Sync {
    fn segment(&self, text: &str) -> Vec<String>;
}

/// Global jieba instance; the dictionary is loaded once on first use.
static JIEBA: Lazy<Jieba> = Lazy::new(Jieba::new);

/// [`Segmenter`] backed by jieba precise mode with HMM for unknown words.
#[derive(Debug, Default, Clone, Copy)]
pub struct JiebaSegmenter;

impl Segmenter for JiebaSegmenter {
    fn segment(&self, text: &str) -> Vec<String> {
        JIEBA
            .cut(text, true)
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

/// CJK unified ideographs, extensions A through F, and compatibility ideographs.
fn is_cjk_ideograph(c: char) -> bool {
    matches!(c,
        '\u{4e00}'..='\u{9fff}'
        | '\u{3400}'..='\u{4dbf}'
        | '\u{20000}'..='\u{2a6df}'
        | '\u{2a700}'..='\u{2ebef}'
        | '\u{f900}'..='\u{faff}'
        | '\u{2f800}'..='\u{2fa1f}'
    )
}

/// Lowercases, collapses every run of characters that are neither alphanumeric nor CJK
/// ideographs into one space, and trims.
pub fn normalize_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut normalized = String::with_capacity(lowered.len());
    let mut pending_space = false;

    for c in lowered.chars() {
        if c.is_alphanumeric() || is_cjk_ideograph(c) {
            if pending_space && !normalized.is_empty() {
                normalized.push(' ');
            }
            pending_space = false;
            normalized.push(c);
        } else {
            pending_space = true;
        }
    }

    normalized
}

pub struct Tokenizer {
    segmenter: Arc<dyn Segmenter>,
    stopwords: HashSet<String>,
}

impl Tokenizer {
    pub fn new<I, S>(segmenter: Arc<dyn Segmenter>, stopwords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segmenter,
            stopwords: stopwords.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_default_stopwords(segmenter: Arc<dyn Segmenter>) -> Self {
        Self::new(segmenter, DEFAULT_STOPWORDS)
    }

    /// Returns word tokens then bigrams, first occurrence kept. Empty when the text has
    /// nothing indexable (blank, punctuation or emoji only).
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let normalized = normalize_text(text);
        if normalized.is_empty() {
            return Vec::new();
        }

        let words = self
            .segmenter
            .segment(&normalized)
            .into_iter()
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty() && !self.stopwords.contains(w));

        let compact: Vec<char> = normalized.chars().filter(|c| !c.is_whitespace()).collect();
        let bigrams = compact.windows(2).map(|pair| pair.iter().collect::<String>());

        let mut seen = HashSet::new();
        words
            .chain(bigrams)
            .filter(|token| seen.insert(token.clone()))
            .collect()
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::with_default_stopwords(Arc::new(JiebaSegmenter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Splits on whitespace only, so composition logic can be checked without a dictionary.
    struct WhitespaceSegmenter;

    impl Segmenter for WhitespaceSegmenter {
        fn segment(&self, text: &str) -> Vec<String> {
            text.split(' ').map(str::to_string).collect()
        }
    }

    fn whitespace_tokenizer() -> Tokenizer {
        Tokenizer::with_default_stopwords(Arc::new(WhitespaceSegmenter))
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_collapses_separators() {
        assert_eq!(normalize_text("Hello, World!!  你好…世界"), "hello world 你好 世界");
        assert_eq!(normalize_text("  --Rust--  "), "rust");
        assert_eq!(normalize_text("a_b-c"), "a b c");
        assert_eq!(normalize_text("第3版"), "第3版");
    }

    #[test]
    fn test_normalize_drops_everything_unindexable() {
        assert_eq!(normalize_text(""), "");
        assert_eq!(normalize_text(" \t\n "), "");
        assert_eq!(normalize_text("😀🎉!!"), "");
    }

    #[test]
    fn test_empty_input_yields_no_tokens() {
        let tokenizer = whitespace_tokenizer();
        assert!(tokenizer.tokenize("").is_empty());
        assert!(tokenizer.tokenize("    ").is_empty());
        assert!(tokenizer.tokenize("😀😀😀").is_empty());
    }

    #[test]
    fn test_single_character_has_no_bigrams() {
        let tokenizer = whitespace_tokenizer();
        assert_eq!(tokenizer.tokenize("好"), strings(&["好"]));
        assert_eq!(tokenizer.tokenize("！好！"), strings(&["好"]));
    }

    #[test]
    fn test_stopwords_dropped_from_words_but_kept_in_bigrams() {
        let tokenizer = whitespace_tokenizer();
        assert_eq!(
            tokenizer.tokenize("我 的 书"),
            strings(&["我", "书", "我的", "的书"])
        );
    }

    #[test]
    fn test_words_precede_bigrams_and_duplicates_removed() {
        let tokenizer = whitespace_tokenizer();
        assert_eq!(tokenizer.tokenize("你好"), strings(&["你好"]));
        assert_eq!(tokenizer.tokenize("ab ab"), strings(&["ab", "ba"]));
        assert_eq!(
            tokenizer.tokenize("Rust编程"),
            strings(&["rust编程", "ru", "us", "st", "t编", "编程"])
        );
    }

    #[test]
    fn test_bigrams_span_removed_whitespace() {
        let tokenizer = whitespace_tokenizer();
        assert_eq!(
            tokenizer.tokenize("你好 世界"),
            strings(&["你好", "世界", "好世"])
        );
    }

    #[test]
    fn test_custom_stopwords() {
        let tokenizer = Tokenizer::new(Arc::new(WhitespaceSegmenter), ["hello"]);
        assert_eq!(tokenizer.tokenize("hello"), strings(&["he", "el", "ll", "lo"]));
    }

    #[test]
    fn test_jieba_tokenize_is_deterministic() {
        let tokenizer = Tokenizer::default();
        let text = "今天的天气真不错，我们去公园散步吧";
        let first = tokenizer.tokenize(text);
        let second = tokenizer.tokenize(text);
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn test_jieba_tokenize_covers_substrings() {
        let tokenizer = Tokenizer::default();
        let tokens = tokenizer.tokenize("你好世界");
        assert!(tokens.contains(&"你好".to_string()));
        assert!(tokens.contains(&"好世".to_string()));
        assert!(tokens.contains(&"世界".to_string()));
        assert!(!tokens.iter().any(|t| t.trim().is_empty()));
    }

    #[test]
    fn test_jieba_drops_stopwords() {
        let tokenizer = Tokenizer::default();
        let tokens = tokenizer.tokenize("我的书");
        assert!(!tokens.contains(&"的".to_string()));
        assert!(tokens.contains(&"的书".to_string()));
    }
}
