// Service exports
pub mod barcode;
pub mod openfoodfacts;
pub mod profile_store;
pub mod session;

pub use barcode::{BarcodeDecoder, DecodeError, RxingDecoder};
pub use openfoodfacts::{LookupError, LookupOutcome, ProductClient};
pub use profile_store::{ProfileStore, ProfileStoreError};
pub use session::{Claims, Session, TokenError, TokenService};
