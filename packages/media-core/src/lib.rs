pub mod auth;
pub mod constants;
pub mod errors;
pub mod pipeline;
pub mod storage;
pub mod transform;
pub mod validation;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

// 公開API
pub use auth::{
    AuthFailure, Authorizer, CachedKeySource, JwksFetcher, KeySet, KeySetSource, StaticKeySource,
    VerificationResult,
};
pub use constants::{CANONICAL_CONTENT_TYPE, DEFAULT_QUALITY, MAX_DIMENSION, MAX_PIXELS};
pub use errors::{DecodeError, FetchError, StorageError, TransformError};
pub use pipeline::{Failure, Pipeline, PipelineResponse, RetrieveQuery};
pub use storage::{MemoryObjectStore, ObjectBody, ObjectStore};
pub use transform::{ImageNormalizer, NormalizedImage, TransformParams};
pub use validation::{validate_key, validate_params};
