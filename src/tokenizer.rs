//! Query tokenizer: lower-case, whitespace-collapsed word tokens, with the
//! lexicon's two-word phrases ("a bit", "a lot") kept as single tokens.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::lexicon::JOINED_PHRASES;

// \w and \s are Unicode-aware in the regex crate.
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").expect("punctuation regex"));

/// Joiner must be a word character so punctuation stripping keeps it.
const JOINER: char = '_';

/// Split raw query text into tokens. Pure and deterministic; may return an empty vector.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut text = WHITESPACE_RUN.replace_all(&lowered, " ").into_owned();

    for phrase in JOINED_PHRASES {
        if text.contains(phrase) {
            text = text.replace(phrase, &phrase.replace(' ', &JOINER.to_string()));
        }
    }

    let stripped = NON_WORD.replace_all(&text, "");
    stripped
        .split_whitespace()
        .map(|t| t.replace(JOINER, " "))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_strips_punctuation() {
        assert_eq!(
            tokenize("Find LOW-risk, green stocks!"),
            vec!["find", "lowrisk", "green", "stocks"]
        );
    }

    #[test]
    fn keeps_joined_phrases() {
        assert_eq!(
            tokenize("I care  a lot about\tcarbon, a bit about risk"),
            vec!["i", "care", "a lot", "about", "carbon", "a bit", "about", "risk"]
        );
    }

    #[test]
    fn phrase_join_survives_whitespace_runs() {
        // runs collapse before the phrase rewrite
        assert_eq!(tokenize("a   lot"), vec!["a lot"]);
    }

    #[test]
    fn empty_and_punctuation_only_inputs() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   ").is_empty());
        assert!(tokenize("?!...").is_empty());
    }

    #[test]
    fn order_is_preserved() {
        assert_eq!(tokenize("b a c"), vec!["b", "a", "c"]);
    }
}
