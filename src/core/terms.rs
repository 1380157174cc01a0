use std::collections::HashSet;

/// Clean a user-supplied term list
///
/// Terms are trimmed, blank entries dropped and duplicates removed
/// case-insensitively. The first spelling of a duplicate is kept.
pub fn prepare_terms<S: AsRef<str>>(terms: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();

    terms
        .iter()
        .map(|t| t.as_ref().trim())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.to_lowercase()))
        .map(str::to_string)
        .collect()
}

/// Returns the ingredient text if it carries anything to check against
#[inline]
pub fn usable_ingredients(ingredients: Option<&str>) -> Option<&str> {
    ingredients.map(str::trim).filter(|text| !text.is_empty())
}

/// Lowercase, fold punctuation to spaces and collapse whitespace
pub fn normalize(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Reduce a simple English plural to its singular form
///
/// Only the common suffixes are handled ("berries" -> "berr",
/// "peaches" -> "peach", "peanuts" -> "peanut"). Short words are left alone.
pub fn stem_word(word: &str) -> &str {
    if word.len() <= 3 {
        return word;
    }

    if let Some(base) = word.strip_suffix("ies") {
        if base.len() >= 2 {
            // "berries" -> "berr", still a substring of "berry"
            return base;
        }
    }

    for suffix in ["ches", "shes", "sses", "xes", "zes"] {
        if word.ends_with(suffix) {
            return &word[..word.len() - 2];
        }
    }

    if word.ends_with('s') && !word.ends_with("ss") && !word.ends_with("us") {
        return &word[..word.len() - 1];
    }

    word
}

/// Stem every word of a normalized phrase
pub fn stem_phrase(normalized: &str) -> String {
    normalized
        .split_whitespace()
        .map(stem_word)
        .collect::<Vec<_>>()
        .join(" ")
}
