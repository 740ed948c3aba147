use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use serde::Deserialize;

use crate::pipeline::{Failure, Pipeline, PipelineResponse};
use crate::validation::validate_key;

pub const INGEST_OK_MESSAGE: &str = "Image received, is valid, and has been uploaded to S3.";

/// 取り込みリクエストの JSON 本文
///
/// `imageData` は標準 base64（パディングあり）でエンコードされた画像バイト列
#[derive(Debug, Deserialize)]
struct IngestPayload {
    #[serde(rename = "imageData", default)]
    image_data: Option<String>,
    #[serde(rename = "imageName", default)]
    image_name: Option<String>,
}

/// 本文の検証を通過した取り込みリクエスト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestRequest {
    pub image: Bytes,
    pub name: String,
}

impl IngestRequest {
    /// 本文をパースし、構造を検証する
    ///
    /// - JSON として読めない、または `imageData` が base64 でない: `InvalidBody`
    /// - 画像・名前のどちらかが空、または名前がキーとして使えない: `InvalidBodyStructure`
    pub fn parse(body: &[u8]) -> Result<Self, Failure> {
        // トップレベルの null はフィールドがすべて欠けているのと同じ扱い
        let payload = serde_json::from_slice::<Option<IngestPayload>>(body)
            .map_err(|e| {
                tracing::warn!(error = %e, "failed to parse ingest body");
                Failure::InvalidBody
            })?
            .unwrap_or(IngestPayload {
                image_data: None,
                image_name: None,
            });

        let image = match payload.image_data.as_deref() {
            Some(encoded) => STANDARD.decode(encoded).map_err(|e| {
                tracing::warn!(error = %e, "imageData is not valid base64");
                Failure::InvalidBody
            })?,
            None => Vec::new(),
        };
        let name = payload.image_name.unwrap_or_default();

        if image.is_empty() || name.is_empty() {
            tracing::warn!(
                image_len = image.len(),
                has_name = !name.is_empty(),
                "ingest body is missing imageData or imageName"
            );
            return Err(Failure::InvalidBodyStructure);
        }
        if let Err(e) = validate_key(&name) {
            tracing::warn!(error = %e, "imageName is not a usable object key");
            return Err(Failure::InvalidBodyStructure);
        }

        Ok(Self {
            image: Bytes::from(image),
            name,
        })
    }
}

impl Pipeline {
    /// 画像を受け取り、検証・正規化してストアに保存する
    ///
    /// `authorization` は Authorization ヘッダの値。`body` は JSON 本文
    pub async fn ingest(&self, authorization: Option<&str>, body: &[u8]) -> PipelineResponse {
        match self.run_ingest(authorization, body).await {
            Ok(()) => PipelineResponse::message(200, INGEST_OK_MESSAGE),
            Err(failure) => failure.into(),
        }
    }

    async fn run_ingest(&self, authorization: Option<&str>, body: &[u8]) -> Result<(), Failure> {
        self.authorize(authorization).await?;

        let request = IngestRequest::parse(body)?;

        let normalized = self.normalizer.normalize(&request.image).map_err(|e| {
            tracing::warn!(name = %request.name, error = %e, "rejected invalid image");
            Failure::InvalidImage
        })?;
        let (width, height) = normalized.dimensions();
        let content_type = normalized.content_type();

        self.store
            .put(&request.name, normalized.into_bytes(), content_type)
            .await
            .map_err(|e| {
                tracing::error!(name = %request.name, error = %e, "failed to upload image");
                Failure::UploadFailed
            })?;

        tracing::info!(name = %request.name, width, height, "image uploaded");
        Ok(())
    }
}
