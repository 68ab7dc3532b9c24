//! Keyword sentiment scoring.
//!
//! A text is split on word boundaries, lower-cased, and each token is looked
//! up in two fixed keyword sets. The score is
//! `(positive_hits - negative_hits) / max(token_count, 1)`, which always lies
//! in `[-1, 1]`. Matching is exact: no stemming, no partial words.

/// Words that pull the score up.
pub const POSITIVE_WORDS: &[&str] = &[
    "build",
    "create",
    "curiosity",
    "curious",
    "exciting",
    "happy",
    "joy",
    "love",
    "passion",
];

/// Words that pull the score down.
pub const NEGATIVE_WORDS: &[&str] = &[
    "angry",
    "anxiety",
    "anxious",
    "chaos",
    "conflict",
    "error",
    "fail",
    "fear",
    "issue",
    "problem",
    "sad",
    "stress",
];

/// Lower bound of a sentiment score.
pub const SENTIMENT_MIN: f64 = -1.0;

/// Upper bound of a sentiment score.
pub const SENTIMENT_MAX: f64 = 1.0;

/// Hit counts behind a sentiment score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LexiconHits {
    pub positive: usize,
    pub negative: usize,
    pub tokens: usize,
}

impl LexiconHits {
    /// The normalized score in `[-1, 1]`.
    pub fn score(&self) -> f64 {
        let net = self.positive as f64 - self.negative as f64;
        (net / self.tokens.max(1) as f64).clamp(SENTIMENT_MIN, SENTIMENT_MAX)
    }
}

/// Split text into lower-case word tokens.
///
/// Any character that is not alphanumeric or `_` is a boundary.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Count lexicon hits in a text.
pub fn count_hits(text: &str) -> LexiconHits {
    let tokens = tokenize(text);
    let positive = tokens
        .iter()
        .filter(|t| POSITIVE_WORDS.contains(&t.as_str()))
        .count();
    let negative = tokens
        .iter()
        .filter(|t| NEGATIVE_WORDS.contains(&t.as_str()))
        .count();

    LexiconHits {
        positive,
        negative,
        tokens: tokens.len(),
    }
}

/// Score a text. Missing text scores a neutral `0.0`.
pub fn score_text(text: Option<&str>) -> f64 {
    match text {
        Some(text) => count_hits(text).score(),
        None => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("Hello, World! it's  fine"),
            vec!["hello", "world", "it", "s", "fine"]
        );
        assert!(tokenize("").is_empty());
        assert!(tokenize(" ... ").is_empty());
    }

    #[test]
    fn test_reference_description() {
        let hits = count_hits("This project explores joy and curiosity");
        assert_eq!(hits.positive, 2);
        assert_eq!(hits.negative, 0);
        assert_eq!(hits.tokens, 6);
        assert!((hits.score() - 2.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_case_insensitive_exact_match() {
        assert_eq!(count_hits("JOY Joy joy").positive, 3);
        // no stemming
        assert_eq!(count_hits("joyful loving creates").positive, 0);
    }

    #[test]
    fn test_negative_and_mixed() {
        assert_eq!(score_text(Some("fail")), -1.0);
        assert_eq!(score_text(Some("love and fear")), 0.0);
        assert!((score_text(Some("problem problem build")) + 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_and_empty_text_is_neutral() {
        assert_eq!(score_text(None), 0.0);
        assert_eq!(score_text(Some("")), 0.0);
    }

    #[test]
    fn test_score_is_bounded_and_stable() {
        let samples = [
            "joy joy joy joy",
            "fear, anxiety; chaos!",
            "Neutral words only here",
            "build create love passion happy curious exciting joy",
        ];

        for text in samples {
            let first = score_text(Some(text));
            assert!((SENTIMENT_MIN..=SENTIMENT_MAX).contains(&first));
            assert_eq!(first, score_text(Some(text)));
        }
    }
}
