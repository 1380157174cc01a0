// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{DecodedBarcode, NewProfile, ProductRecord, ProfileUpdate, SafetyVerdict, UserProfile, Verdict};
pub use requests::{LoginRequest, RegisterRequest, SafetyCheckRequest, UpdateProfileRequest};
pub use responses::{ErrorResponse, HealthResponse, LoginResponse, SafetyReport, ScanResponse, SuggestionsResponse};
