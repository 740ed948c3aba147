use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};

use crate::auth::{Authorizer, StaticKeySource};
use crate::errors::StorageError;
use crate::storage::{MemoryObjectStore, ObjectBody, ObjectStore};
use crate::testutil::primary_key_set;

/// 呼び出しを数えながら MemoryObjectStore に委譲し、指定に応じて失敗するストア
#[derive(Default)]
pub struct FakeStore {
    pub inner: MemoryObjectStore,
    pub puts: AtomicUsize,
    pub gets: AtomicUsize,
    pub fail_put: bool,
    pub fail_get: bool,
    pub broken_body: bool,
}

impl FakeStore {
    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), StorageError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail_put {
            return Err(StorageError::Internal("put failed".to_string()));
        }
        self.inner.put(key, body, content_type).await
    }

    async fn get(&self, key: &str) -> Result<ObjectBody, StorageError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.fail_get {
            return Err(StorageError::Forbidden);
        }
        if self.broken_body {
            self.inner.object(key).ok_or_else(|| StorageError::NotFound {
                key: key.to_string(),
            })?;
            return Ok(stream::iter(vec![
                Ok(Bytes::from_static(b"\xFF\xD8")),
                Err(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "body cut short")),
            ])
            .boxed());
        }
        self.inner.get(key).await
    }
}

pub fn test_authorizer() -> Authorizer {
    Authorizer::new(Arc::new(StaticKeySource::new(primary_key_set())))
}
