//! 取り込み（ingest）と取得（retrieve）のリクエスト処理
//!
//! 各リクエストは次の状態を一方向に 1 度だけ通過する:
//!
//! ```text
//! Received → (Authorized) → BodyValidated → ContentValidated → StoreOperationComplete → Responded
//!     └────────────┴──────────────┴─────────────────┴──────────────────┴──→ Failed(kind)
//! ```
//!
//! どこで失敗しても [`Failure`] に変換され、固定のステータス・本文で応答する。
//! 内部でのリトライは行わない。

pub mod failure;
pub mod ingest;
pub mod response;
pub mod retrieve;

#[cfg(test)]
mod fakes;

use std::sync::Arc;

use crate::auth::{AuthFailure, Authorizer};
use crate::storage::ObjectStore;
use crate::transform::ImageNormalizer;

pub use failure::Failure;
pub use ingest::{IngestRequest, INGEST_OK_MESSAGE};
pub use response::{PipelineResponse, JSON_CONTENT_TYPE};
pub use retrieve::{RetrieveQuery, RetrieveRequest};

/// リクエスト処理に必要な依存をまとめたもの
///
/// プロセス起動時に 1 度だけ組み立て、全リクエストで共有する（内部状態は変更しない）
#[derive(Clone)]
pub struct Pipeline {
    store: Arc<dyn ObjectStore>,
    normalizer: ImageNormalizer,
    authorizer: Option<Authorizer>,
    protect_retrieve: bool,
}

impl Pipeline {
    /// 認可なしのパイプラインを作成する
    pub fn new(store: Arc<dyn ObjectStore>, normalizer: ImageNormalizer) -> Self {
        Self {
            store,
            normalizer,
            authorizer: None,
            protect_retrieve: false,
        }
    }

    /// 取り込みにトークン検証を要求する
    pub fn with_authorizer(mut self, authorizer: Authorizer) -> Self {
        self.authorizer = Some(authorizer);
        self
    }

    /// 取得にもトークン検証を要求する（authorizer が設定されている場合のみ有効）
    pub fn with_protected_retrieve(mut self, enabled: bool) -> Self {
        self.protect_retrieve = enabled;
        self
    }

    pub fn auth_enabled(&self) -> bool {
        self.authorizer.is_some()
    }

    async fn authorize(&self, authorization: Option<&str>) -> Result<(), Failure> {
        let Some(authorizer) = &self.authorizer else {
            return Ok(());
        };

        authorizer.authorize(authorization).await.map_err(|err| match err {
            AuthFailure::Rejected(result) => {
                tracing::warn!(reason = %result, "request rejected by token verification");
                Failure::Unauthorized
            }
            AuthFailure::KeySetUnavailable(err) => {
                tracing::error!(error = %err, "failed to fetch key set");
                Failure::KeySetUnavailable
            }
        })
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("normalizer", &self.normalizer)
            .field("auth_enabled", &self.auth_enabled())
            .field("protect_retrieve", &self.protect_retrieve)
            .finish_non_exhaustive()
    }
}
