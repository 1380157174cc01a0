use serde::Deserialize;
use std::collections::BTreeSet;

use crate::core::terms::{normalize, prepare_terms, stem_phrase, usable_ingredients};
use crate::models::{ProductRecord, SafetyVerdict, UserProfile, Verdict};

/// How user terms are compared against ingredient text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Case-insensitive substring
    #[default]
    Substring,
    /// Substring, plus punctuation folding and plural stemming on both sides
    Normalized,
}

/// Outcome of matching a single term list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermMatch {
    /// Ingredient text was missing or blank
    Unknown,
    /// Matched terms in the user's spelling; empty means nothing was found
    Checked(BTreeSet<String>),
}

impl TermMatch {
    pub fn matched(&self) -> BTreeSet<String> {
        match self {
            TermMatch::Unknown => BTreeSet::new(),
            TermMatch::Checked(terms) => terms.clone(),
        }
    }
}

/// Pre-processed ingredient text, built once per check
struct Haystack {
    lower: String,
    stemmed: Option<String>,
}

impl Haystack {
    fn new(text: &str, mode: MatchMode) -> Self {
        let stemmed = match mode {
            MatchMode::Substring => None,
            MatchMode::Normalized => Some(stem_phrase(&normalize(text))),
        };

        Self {
            lower: text.to_lowercase(),
            stemmed,
        }
    }

    fn contains(&self, term: &str) -> bool {
        if self.lower.contains(&term.to_lowercase()) {
            return true;
        }

        match &self.stemmed {
            Some(stemmed) => {
                let needle = stem_phrase(&normalize(term));
                !needle.is_empty() && stemmed.contains(&needle)
            }
            None => false,
        }
    }
}

/// Compares product ingredients with a user's allergy and condition terms
///
/// Ingredient text that is missing or blank always produces
/// [`Verdict::Unknown`], even for a profile with no terms, so an absent
/// ingredient list is never reported as safe.
#[derive(Debug, Clone, Copy, Default)]
pub struct SafetyMatcher {
    mode: MatchMode,
}

impl SafetyMatcher {
    pub fn new(mode: MatchMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Match one term list against ingredient text
    pub fn match_terms<S: AsRef<str>>(&self, ingredients: Option<&str>, terms: &[S]) -> TermMatch {
        let Some(text) = usable_ingredients(ingredients) else {
            return TermMatch::Unknown;
        };

        let haystack = Haystack::new(text, self.mode);
        let matched = prepare_terms(terms)
            .into_iter()
            .filter(|term| haystack.contains(term))
            .collect();

        TermMatch::Checked(matched)
    }

    /// Check ingredient text against allergy and condition lists
    pub fn evaluate<S: AsRef<str>>(
        &self,
        ingredients: Option<&str>,
        allergies: &[S],
        conditions: &[S],
    ) -> SafetyVerdict {
        let Some(text) = usable_ingredients(ingredients) else {
            return SafetyVerdict::unknown();
        };

        let haystack = Haystack::new(text, self.mode);
        let find = |terms: &[S]| -> BTreeSet<String> {
            prepare_terms(terms)
                .into_iter()
                .filter(|term| haystack.contains(term))
                .collect()
        };

        let matched_allergies = find(allergies);
        let matched_conditions = find(conditions);

        let verdict = if matched_allergies.is_empty() && matched_conditions.is_empty() {
            Verdict::Safe
        } else {
            Verdict::Unsafe
        };

        SafetyVerdict {
            verdict,
            matched_allergies,
            matched_conditions,
        }
    }

    /// Check a fetched product against a stored profile
    pub fn check(&self, product: &ProductRecord, profile: &UserProfile) -> SafetyVerdict {
        let verdict = self.evaluate(
            product.ingredients.as_deref(),
            profile.allergies.as_slice(),
            profile.health_conditions.as_slice(),
        );

        tracing::debug!(
            barcode = %product.barcode,
            user_id = profile.id,
            verdict = ?verdict.verdict,
            matched = verdict.matched_allergies.len() + verdict.matched_conditions.len(),
            "Evaluated product safety"
        );

        verdict
    }
}
