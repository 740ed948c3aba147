use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::region::Region;

use crate::config::S3Settings;
use media_core::storage::{ObjectBody, ObjectStore};
use media_core::StorageError;

/// S3 互換ストレージのクライアント
///
/// 認証情報は AWS の標準的な探索順（環境変数・プロファイル・インスタンスメタデータ）で取得する
#[derive(Clone)]
pub struct S3ObjectStore {
    bucket: Bucket,
}

impl S3ObjectStore {
    pub fn new(settings: &S3Settings) -> Result<Self, StorageError> {
        let credentials =
            Credentials::default().map_err(|e| StorageError::Internal(e.to_string()))?;
        Self::with_credentials(settings, credentials)
    }

    pub fn with_credentials(
        settings: &S3Settings,
        credentials: Credentials,
    ) -> Result<Self, StorageError> {
        let region = match &settings.endpoint {
            Some(endpoint) => Region::Custom {
                region: settings.region.clone(),
                endpoint: endpoint.trim_end_matches('/').to_string(),
            },
            None => settings
                .region
                .parse()
                .map_err(|e| StorageError::Internal(format!("invalid region: {e}")))?,
        };
        let mut bucket = Bucket::new(&settings.bucket, region, credentials)
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        if settings.endpoint.is_some() {
            bucket = bucket.with_path_style();
        }

        tracing::info!(
            bucket = %settings.bucket,
            region = %settings.region,
            endpoint = ?settings.endpoint,
            "S3 storage configured"
        );
        Ok(Self { bucket })
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), StorageError> {
        let response = self
            .bucket
            .put_object_with_content_type(key, &body, content_type)
            .await
            .map_err(|e| map_s3_error(e, key))?;

        match response.status_code() {
            status if (200..300).contains(&status) => Ok(()),
            status => Err(status_error(status, key)),
        }
    }

    async fn get(&self, key: &str) -> Result<ObjectBody, StorageError> {
        let response = self
            .bucket
            .get_object(key)
            .await
            .map_err(|e| map_s3_error(e, key))?;

        match response.status_code() {
            status if (200..300).contains(&status) => {}
            status => return Err(status_error(status, key)),
        }

        let data = Bytes::copy_from_slice(response.as_slice());
        Ok(stream::once(async move { Ok(data) }).boxed())
    }
}

fn status_error(status: u16, key: &str) -> StorageError {
    match status {
        404 => StorageError::NotFound {
            key: key.to_string(),
        },
        403 => StorageError::Forbidden,
        status => StorageError::Internal(format!("unexpected status: {status}")),
    }
}

fn map_s3_error(err: S3Error, key: &str) -> StorageError {
    match err {
        S3Error::HttpFailWithBody(status, _) => status_error(status, key),
        other => StorageError::Internal(other.to_string()),
    }
}
