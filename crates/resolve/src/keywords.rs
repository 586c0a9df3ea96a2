use crate::similarity::similarity;

/// Score an input string against one canonical value's trigger keywords.
///
/// Signals, strongest first: exact keyword equality (1.0, short-circuit),
/// keyword contained in input (0.95), input contained in keyword (0.85), and
/// word-pair similarity above 0.8 scaled by 0.9. The word-level pass is what
/// lets "salaries" line up with a "salary" trigger without a full-string
/// edit distance dragging the score under the threshold.
pub fn score_keywords(input: &str, keywords: &[String]) -> f32 {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return 0.0;
    }
    let input_words: Vec<&str> = input.split_whitespace().collect();

    let mut best = 0.0f32;
    for keyword in keywords {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() {
            continue;
        }
        if input == keyword {
            return 1.0;
        }
        if input.contains(&keyword) {
            best = best.max(0.95);
        } else if keyword.contains(&input) {
            best = best.max(0.85);
        }
        for input_word in &input_words {
            for keyword_word in keyword.split_whitespace() {
                let sim = similarity(input_word, keyword_word);
                if sim > 0.8 {
                    best = best.max(sim * 0.9);
                }
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kw(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn exact_keyword_is_one() {
        assert_eq!(score_keywords("rent", &kw(&["rent", "rental"])), 1.0);
        assert_eq!(score_keywords("  RENT ", &kw(&["rent"])), 1.0);
    }

    #[test]
    fn self_match_is_one_for_any_keyword() {
        for k in ["cash", "bank transfer", "เงินสด"] {
            assert_eq!(score_keywords(k, &kw(&[k])), 1.0);
        }
    }

    #[test]
    fn keyword_inside_input_scores_095() {
        let score = score_keywords("paid the rent today", &kw(&["rent"]));
        assert_eq!(score, 0.95);
    }

    #[test]
    fn input_inside_keyword_scores_085() {
        let score = score_keywords("prompt", &kw(&["promptpay"]));
        // Containment gives 0.85; the word-similarity signal (0.9 * 0.9)
        // stays below it.
        assert_eq!(score, 0.85);
    }

    #[test]
    fn word_similarity_bridges_inflections() {
        // Neither full string contains the other; "wage" vs "wages" at the
        // word level hits the 0.9 containment score, scaled to 0.81.
        let score = score_keywords("monthly wage", &kw(&["wages"]));
        assert!(score > 0.8, "score was {score}");
        assert!(score < 0.85, "score was {score}");
    }

    #[test]
    fn no_signal_is_zero() {
        assert_eq!(score_keywords("gardening", &kw(&["promptpay"])), 0.0);
        assert_eq!(score_keywords("anything", &[]), 0.0);
    }

    #[test]
    fn empty_input_is_zero() {
        assert_eq!(score_keywords("", &kw(&["rent"])), 0.0);
        assert_eq!(score_keywords("   ", &kw(&["rent"])), 0.0);
    }

    #[test]
    fn best_signal_wins_across_keywords() {
        // "rental" is an exact word hit via substring (0.95), beating the
        // weaker similarity signal from "rent".
        let score = score_keywords("rental for june", &kw(&["rent", "rental"]));
        assert_eq!(score, 0.95);
    }
}
