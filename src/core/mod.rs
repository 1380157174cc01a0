// Core algorithm exports
pub mod matcher;
pub mod suggestions;
pub mod terms;

pub use matcher::{MatchMode, SafetyMatcher, TermMatch};
pub use suggestions::{SUGGESTED_ALLERGIES, SUGGESTED_HEALTH_CONDITIONS};
pub use terms::{normalize, prepare_terms, stem_word};
