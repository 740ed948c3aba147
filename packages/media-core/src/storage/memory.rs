use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use parking_lot::RwLock;

use crate::errors::StorageError;
use crate::storage::gateway::{ObjectBody, ObjectStore};

/// メモリ上に保存されたオブジェクト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Bytes,
    pub content_type: String,
}

/// インメモリのオブジェクトストア
///
/// テストとローカル開発用。データは永続化されない。
/// Clone しても同じデータを共有する
#[derive(Debug, Clone, Default)]
pub struct MemoryObjectStore {
    objects: Arc<RwLock<HashMap<String, StoredObject>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 保存済みオブジェクトを直接参照する
    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects.read().get(key).cloned()
    }

    /// 書き込み経由を通さずにオブジェクトを配置する
    pub fn insert(&self, key: impl Into<String>, body: impl Into<Bytes>, content_type: &str) {
        self.objects.write().insert(
            key.into(),
            StoredObject {
                body: body.into(),
                content_type: content_type.to_string(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), StorageError> {
        self.insert(key, body, content_type);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<ObjectBody, StorageError> {
        let object = self.object(key).ok_or_else(|| StorageError::NotFound {
            key: key.to_string(),
        })?;

        Ok(stream::once(async move { Ok(object.body) }).boxed())
    }
}
