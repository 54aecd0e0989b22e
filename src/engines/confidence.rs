//! Text-only confidence estimate for engines that report no per-glyph scores
//!
//! Garbled recognition output has tell-tale shapes: exotic symbols, runs of
//! single-letter "words", odd whitespace density and long repeated runs.

/// Weighted quality score in 0.0..=1.0
pub(crate) fn estimate(text: &str) -> f32 {
    let stats = TextStats::collect(text);
    if stats.chars == 0 {
        return 0.0;
    }
    if text.len() < 5 {
        // Too short to judge
        return 0.5;
    }

    let score = 0.40 * stats.symbol_score()
        + 0.30 * word_length_score(text)
        + 0.15 * stats.whitespace_score()
        + 0.15 * stats.repetition_score();
    score.clamp(0.0, 1.0)
}

#[derive(Debug, Default)]
struct TextStats {
    chars: usize,
    letters: usize,
    exotic: usize,
    whitespace: usize,
    longest_run: usize,
}

impl TextStats {
    fn collect(text: &str) -> Self {
        let mut stats = TextStats::default();
        let mut run = 0;
        let mut prev = None;

        for c in text.chars() {
            stats.chars += 1;
            if c.is_alphabetic() {
                stats.letters += 1;
            }
            if c.is_whitespace() {
                stats.whitespace += 1;
            } else if !c.is_alphanumeric() && !c.is_ascii_punctuation() {
                stats.exotic += 1;
            }

            run = if prev == Some(c) && !c.is_whitespace() { run + 1 } else { 1 };
            stats.longest_run = stats.longest_run.max(run);
            prev = Some(c);
        }

        stats
    }

    fn ratio(&self, count: usize) -> f32 {
        count as f32 / self.chars as f32
    }

    /// Few exotic symbols and a healthy share of letters
    fn symbol_score(&self) -> f32 {
        let exotic_penalty = 1.0 - (self.ratio(self.exotic) * 10.0).min(1.0);
        let letter_score = (self.ratio(self.letters) * 1.5).min(1.0);
        exotic_penalty * 0.6 + letter_score * 0.4
    }

    /// Prose sits around 10-25% whitespace
    fn whitespace_score(&self) -> f32 {
        match (self.ratio(self.whitespace) * 100.0) as usize {
            0..=5 => 0.5,
            6..=10 => 0.8,
            11..=25 => 1.0,
            26..=40 => 0.7,
            _ => 0.3,
        }
    }

    fn repetition_score(&self) -> f32 {
        match self.longest_run {
            0..=3 => 1.0,
            4..=5 => 0.8,
            6..=10 => 0.5,
            _ => 0.2,
        }
    }
}

/// Average word length near 4-8, with a penalty for single-character words
fn word_length_score(text: &str) -> f32 {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return 0.5;
    }

    let avg_len = words.iter().map(|w| w.len()).sum::<usize>() as f32 / words.len() as f32;
    let avg_score = match avg_len as usize {
        0..=1 => 0.3,
        2..=3 => 0.7,
        4..=8 => 1.0,
        9..=12 => 0.8,
        _ => 0.4,
    };

    let singles = words.iter().filter(|w| w.len() == 1).count() as f32 / words.len() as f32;
    avg_score * (1.0 - (singles * 1.5).min(0.5))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_short_text() {
        assert_eq!(estimate(""), 0.0);
        assert_eq!(estimate("Hi"), 0.5);
    }

    #[test]
    fn test_clean_sentence_scores_high() {
        let confidence = estimate("The quick brown fox jumps over the lazy dog.");
        assert!(confidence > 0.75, "Expected > 0.75, got {}", confidence);
    }

    #[test]
    fn test_garbled_symbols_score_low() {
        let confidence = estimate("§±®©¥€£¢¤");
        assert!(confidence < 0.5, "Expected < 0.5, got {}", confidence);
    }

    #[test]
    fn test_single_letter_words_score_lower() {
        let confidence = estimate("a b c d e f g h i j k l m n o p");
        assert!(confidence < 0.7, "Expected < 0.7, got {}", confidence);
    }

    #[test]
    fn test_repeated_runs_are_penalized() {
        assert_eq!(TextStats::collect("Hello World").repetition_score(), 1.0);
        assert!(TextStats::collect("Hellooooo World").repetition_score() < 1.0);
        assert!(estimate("Hello aaaaaaaaaaaa World") < 0.9);
    }
}
