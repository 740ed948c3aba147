use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;

use crate::constants::CANONICAL_CONTENT_TYPE;
use crate::errors::StorageError;
use crate::pipeline::{Failure, Pipeline, PipelineResponse};
use crate::storage::read_body;

/// 取得リクエストのクエリパラメータ（`?name=...&rotate=true`）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RetrieveQuery {
    pub name: Option<String>,
    pub rotate: Option<String>,
}

/// 検証済みの取得リクエスト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrieveRequest {
    pub name: String,
    pub rotate: bool,
}

impl RetrieveQuery {
    /// `name` が無ければ `MissingName`。`rotate` は文字列 `"true"` のときだけ有効
    pub fn validate(self) -> Result<RetrieveRequest, Failure> {
        let name = match self.name {
            Some(name) if !name.is_empty() => name,
            _ => return Err(Failure::MissingName),
        };

        Ok(RetrieveRequest {
            name,
            rotate: self.rotate.as_deref() == Some("true"),
        })
    }
}

impl Pipeline {
    /// 保存済みの画像を base64 で返す。`rotate=true` なら180度回転・リサイズしてから返す
    pub async fn retrieve(&self, authorization: Option<&str>, query: RetrieveQuery) -> PipelineResponse {
        match self.run_retrieve(authorization, query).await {
            Ok(encoded) => PipelineResponse::ok(CANONICAL_CONTENT_TYPE, encoded),
            Err(failure) => failure.into(),
        }
    }

    async fn run_retrieve(&self, authorization: Option<&str>, query: RetrieveQuery) -> Result<String, Failure> {
        if self.protect_retrieve {
            self.authorize(authorization).await?;
        }

        let request = query.validate().inspect_err(|_| {
            tracing::warn!("retrieve request without name");
        })?;

        let body = self.store.get(&request.name).await.map_err(|e| match e {
            StorageError::NotFound { .. } => {
                tracing::warn!(name = %request.name, "image not found");
                Failure::NotFound {
                    name: request.name.clone(),
                }
            }
            other => {
                tracing::error!(name = %request.name, error = %other, "failed to retrieve image");
                Failure::RetrieveFailed
            }
        })?;

        let bytes = read_body(body).await.map_err(|e| {
            tracing::error!(name = %request.name, error = %e, "failed to read object body");
            Failure::ReadFailed
        })?;

        let bytes = if request.rotate {
            let transformed = self.normalizer.transform(&bytes).map_err(|e| {
                tracing::error!(name = %request.name, error = %e, "failed to rotate and resize image");
                Failure::TransformFailed
            })?;
            transformed.into_bytes()
        } else {
            bytes
        };

        tracing::info!(
            name = %request.name,
            rotate = request.rotate,
            size = bytes.len(),
            "image retrieved"
        );
        Ok(STANDARD.encode(&bytes))
    }
}
