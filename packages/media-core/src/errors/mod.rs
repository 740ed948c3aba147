mod types;

pub use types::{DecodeError, FetchError, StorageError, TransformError};
