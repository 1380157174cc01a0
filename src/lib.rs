//! SafeScan - barcode product safety checker
//!
//! Scans a product barcode, fetches the product from Open Food Facts and
//! compares its ingredients with the allergies and health conditions stored
//! in the user's profile.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{MatchMode, SafetyMatcher, TermMatch};
pub use models::{ProductRecord, SafetyVerdict, UserProfile, Verdict};
