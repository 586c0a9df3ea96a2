use serde::Serialize;

use satang_core::{CanonicalOptionSet, FieldKind};

use crate::keywords::score_keywords;
use crate::similarity::similarity;

/// Confidence at or above this bar counts as a firm match.
pub const MATCH_THRESHOLD: f32 = 0.8;

/// Confidence assigned to a field default when the input carried no signal.
const DEFAULT_CONFIDENCE: f32 = 0.5;

/// Outcome of resolving free text against one canonical option list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub value: String,
    /// Heuristic score in `[0, 1]`; not a calibrated probability.
    pub confidence: f32,
    /// True iff `confidence >= 0.8`.
    pub matched: bool,
    /// True whenever the value is a sub-threshold guess or a default; the
    /// caller should route these to human review.
    pub requires_review: bool,
}

impl MatchResult {
    fn new(value: impl Into<String>, confidence: f32) -> Self {
        let matched = confidence >= MATCH_THRESHOLD;
        MatchResult {
            value: value.into(),
            confidence,
            matched,
            requires_review: !matched,
        }
    }
}

/// Resolves free text to canonical dropdown values.
///
/// Pure and stateless over an immutable option set; safe to share across
/// threads. Matching runs exact → keyword table → whole-string similarity,
/// keeping the best score. A sub-threshold best guess is returned as-is with
/// `matched = false` so the caller can surface "needs review" at the nearest
/// candidate; only a zero-signal input falls back to the field default.
pub struct OptionMatcher<'a> {
    options: &'a CanonicalOptionSet,
}

impl<'a> OptionMatcher<'a> {
    pub fn new(options: &'a CanonicalOptionSet) -> Self {
        Self { options }
    }

    pub fn match_property(&self, text: &str, comment: Option<&str>) -> MatchResult {
        self.resolve(FieldKind::Property, text, comment)
    }

    pub fn match_category(&self, text: &str, comment: Option<&str>) -> MatchResult {
        self.resolve(FieldKind::Category, text, comment)
    }

    pub fn match_payment(&self, text: &str, comment: Option<&str>) -> MatchResult {
        self.resolve(FieldKind::Payment, text, comment)
    }

    pub fn resolve(&self, kind: FieldKind, text: &str, comment: Option<&str>) -> MatchResult {
        let search = combine(text, comment);
        if search.is_empty() {
            return MatchResult::new(kind.default_value(), DEFAULT_CONFIDENCE);
        }
        let search_lower = search.to_lowercase();

        // Exact pass: case-insensitive equality against the option list.
        for value in self.options.values(kind) {
            if value.trim().to_lowercase() == search_lower {
                return MatchResult::new(value.clone(), 1.0);
            }
        }

        let mut best_value: Option<&str> = None;
        let mut best = 0.0f32;

        // Keyword pass.
        for (value, keywords) in self.options.keywords(kind) {
            let score = score_keywords(&search, keywords);
            if score > best {
                best = score;
                best_value = Some(value.as_str());
            }
        }

        // Similarity pass covers values with no keyword entry at all.
        for value in self.options.values(kind) {
            let score = similarity(&search, value);
            if score > best {
                best = score;
                best_value = Some(value.as_str());
            }
        }

        match best_value {
            Some(value) if best > 0.0 => MatchResult::new(value, best),
            _ => MatchResult::new(kind.default_value(), DEFAULT_CONFIDENCE),
        }
    }
}

fn combine(text: &str, comment: Option<&str>) -> String {
    match comment.map(str::trim).filter(|c| !c.is_empty()) {
        Some(comment) => format!("{} {}", text.trim(), comment).trim().to_string(),
        None => text.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use satang_core::CanonicalOptionSet;

    fn fixture() -> CanonicalOptionSet {
        CanonicalOptionSet::builtin()
    }

    #[test]
    fn exact_round_trip_for_every_canonical_value() {
        let options = fixture();
        let matcher = OptionMatcher::new(&options);
        for kind in [FieldKind::Property, FieldKind::Category, FieldKind::Payment] {
            for value in options.values(kind) {
                let result = matcher.resolve(kind, value, None);
                assert_eq!(result.value, *value);
                assert_eq!(result.confidence, 1.0);
                assert!(result.matched);
                assert!(!result.requires_review);
            }
        }
    }

    #[test]
    fn exact_match_is_case_insensitive() {
        let options = fixture();
        let matcher = OptionMatcher::new(&options);
        let result = matcher.match_payment("promptpay", None);
        assert_eq!(result.value, "PromptPay");
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn keyword_pass_resolves_trigger_words() {
        let options = fixture();
        let matcher = OptionMatcher::new(&options);
        let result = matcher.match_category("tenant payment for june", None);
        assert_eq!(result.value, "Rental Income");
        assert!(result.matched);
    }

    #[test]
    fn comment_supplies_disambiguating_context() {
        let options = fixture();
        let matcher = OptionMatcher::new(&options);
        let result = matcher.match_property("receipt 1042", Some("alesia pool pump"));
        assert_eq!(result.value, "Alesia House");
        assert!(result.matched);
    }

    #[test]
    fn empty_input_returns_field_default() {
        let options = fixture();
        let matcher = OptionMatcher::new(&options);

        let property = matcher.match_property("", None);
        assert_eq!(property.value, "Sia Moon");
        let category = matcher.match_category("  ", None);
        assert_eq!(category.value, "Uncategorized");
        let payment = matcher.match_payment("", Some("  "));
        assert_eq!(payment.value, "Cash");

        for result in [property, category, payment] {
            assert_eq!(result.confidence, 0.5);
            assert!(!result.matched);
            assert!(result.requires_review);
        }
    }

    #[test]
    fn zero_signal_input_returns_field_default() {
        let options = fixture();
        let matcher = OptionMatcher::new(&options);
        // A run of a character that appears in no payment value or trigger
        // scores zero everywhere: no keyword hits, and the edit distance to
        // every option equals the longer length.
        let result = matcher.match_payment("ฆฆฆฆฆฆฆฆฆฆฆฆฆฆฆฆ", None);
        assert_eq!(result.value, "Cash");
        assert_eq!(result.confidence, 0.5);
        assert!(!result.matched);
        assert!(result.requires_review);
    }

    #[test]
    fn sub_threshold_guess_is_preserved_not_defaulted() {
        let options = fixture();
        let matcher = OptionMatcher::new(&options);
        // "kasikrn" vs the "kasikorn" trigger: word similarity 7/8 = 0.875,
        // scaled by 0.9 → 0.7875. Below the bar, so the nearest guess comes
        // back unmatched with its own confidence instead of the default.
        let result = matcher.match_payment("kasikrn", None);
        assert_eq!(result.value, "Bank Transfer");
        assert!(result.confidence < MATCH_THRESHOLD);
        assert!(result.confidence > 0.5);
        assert!(!result.matched);
        assert!(result.requires_review);
    }

    #[test]
    fn match_result_serializes_for_the_boundary() {
        let options = fixture();
        let matcher = OptionMatcher::new(&options);
        let json = serde_json::to_value(matcher.match_payment("cash", None)).unwrap();
        assert_eq!(json["value"], "Cash");
        assert_eq!(json["confidence"], 1.0);
        assert_eq!(json["matched"], true);
        assert_eq!(json["requires_review"], false);
    }

    #[test]
    fn resolution_is_deterministic() {
        let options = fixture();
        let matcher = OptionMatcher::new(&options);
        let a = matcher.match_category("water bill lanna", None);
        let b = matcher.match_category("water bill lanna", None);
        assert_eq!(a, b);
    }

    #[test]
    fn fixture_option_set_can_be_swapped() {
        let custom = CanonicalOptionSet::from_toml(
            r#"
            properties = ["Villa A"]
            operation_categories = ["Food", "Uncategorized"]
            payment_methods = ["Cash"]

            [category_keywords]
            Food = ["noodles", "lunch"]
            "#,
        )
        .unwrap();
        let matcher = OptionMatcher::new(&custom);
        let result = matcher.match_category("lunch with the crew", None);
        assert_eq!(result.value, "Food");
        assert!(result.matched);
    }
}
