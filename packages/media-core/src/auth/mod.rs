pub mod authorizer;
pub mod cache;
pub mod keyset;
pub mod source;
pub mod verifier;

pub use authorizer::{extract_token, AuthFailure, Authorizer};
pub use cache::CachedKeySource;
pub use keyset::KeySet;
pub use source::{JwksFetcher, KeySetSource, StaticKeySource};
pub use verifier::{verify, VerificationResult, ACCEPTED_ALGORITHMS};
