pub mod gateway;
pub mod memory;

pub use gateway::{read_body, ObjectBody, ObjectStore};
pub use memory::{MemoryObjectStore, StoredObject};
// StorageError は errors モジュールで定義済み
pub use crate::errors::StorageError;
