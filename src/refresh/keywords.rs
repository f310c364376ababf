use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

pub const TOP_KEYWORDS: usize = 10;
const MIN_WORD_CHARS: usize = 4;

static PUNCT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid punctuation regex"));

static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
        "is", "are", "was", "were", "be", "been", "being", "have", "has", "had", "do", "does",
        "did", "will", "would", "could", "should", "may", "might", "can", "this", "that",
        "these", "those",
    ]
    .into_iter()
    .collect()
});

/// Most frequent words of `text`, highest count first; ties keep first-seen order.
pub fn extract_keywords(text: &str) -> Vec<(String, usize)> {
    let lowered = text.to_lowercase();
    let cleaned = PUNCT_RE.replace_all(&lowered, "");

    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for word in cleaned.split_whitespace() {
        if word.chars().count() < MIN_WORD_CHARS || STOP_WORDS.contains(word) { continue; }
        let n = counts.entry(word.to_string()).or_insert(0);
        if *n == 0 { order.push(word.to_string()); }
        *n += 1;
    }

    let mut ranked: Vec<(String, usize)> = order
        .into_iter()
        .map(|w| { let n = counts[&w]; (w, n) })
        .collect();
    // stable sort keeps first-seen order among equal counts
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(TOP_KEYWORDS);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_and_ranks_words() {
        let kw = extract_keywords("Rust rust RUST! Crabs love rust, crabs.");
        assert_eq!(kw[0], ("rust".to_string(), 4));
        assert_eq!(kw[1], ("crabs".to_string(), 2));
        assert_eq!(kw[2], ("love".to_string(), 1));
    }

    #[test]
    fn drops_short_and_stop_words() {
        let kw = extract_keywords("the cat and those dogs were being silly");
        let words: Vec<&str> = kw.iter().map(|(w, _)| w.as_str()).collect();
        assert_eq!(words, vec!["dogs", "silly"]);
    }

    #[test]
    fn keeps_at_most_ten_with_stable_ties() {
        let text = "alpha bravo charlie delta echoo foxtrot gamma hotel india juliet kilo lima";
        let kw = extract_keywords(text);
        assert_eq!(kw.len(), TOP_KEYWORDS);
        assert_eq!(kw.first().map(|(w, _)| w.as_str()), Some("alpha"));
        assert_eq!(kw.last().map(|(w, _)| w.as_str()), Some("juliet"));
    }

    #[test]
    fn punctuation_is_removed_not_split() {
        let kw = extract_keywords("don't co-op");
        let words: Vec<&str> = kw.iter().map(|(w, _)| w.as_str()).collect();
        assert_eq!(words, vec!["dont", "coop"]);
    }

    #[test]
    fn empty_text_has_no_keywords() {
        assert!(extract_keywords("").is_empty());
        assert!(extract_keywords("   ... !!! ").is_empty());
    }
}
