use std::sync::Arc;

use crate::auth::source::KeySetSource;
use crate::auth::verifier::{verify, VerificationResult};
use crate::errors::FetchError;

/// 認可に失敗した理由
#[derive(Debug, thiserror::Error)]
pub enum AuthFailure {
    /// トークンが無い・不正（401 に対応）
    #[error("token rejected: {0}")]
    Rejected(VerificationResult),

    /// 鍵セットが取得できず検証できなかった（5xx に対応）
    #[error("key set unavailable: {0}")]
    KeySetUnavailable(#[from] FetchError),
}

/// Authorization ヘッダの値から検証対象のトークンを取り出す
///
/// `Bearer ` プレフィックス（大文字小文字は区別しない）があれば取り除く
pub fn extract_token(header_value: &str) -> &str {
    let value = header_value.trim();
    match value.get(..7) {
        Some(prefix) if prefix.eq_ignore_ascii_case("bearer ") => value[7..].trim_start(),
        _ => value,
    }
}

/// Authorization ヘッダ → 鍵セット取得 → トークン検証 をまとめたもの
#[derive(Clone)]
pub struct Authorizer {
    source: Arc<dyn KeySetSource>,
}

impl Authorizer {
    pub fn new(source: Arc<dyn KeySetSource>) -> Self {
        Self { source }
    }

    /// リクエストの Authorization ヘッダを検証する
    ///
    /// キャッシュ済みの鍵セットに kid が無かった場合だけ、キャッシュを破棄して 1 度だけ取り直す
    pub async fn authorize(&self, authorization: Option<&str>) -> Result<(), AuthFailure> {
        let Some(header_value) = authorization else {
            return Err(AuthFailure::Rejected(VerificationResult::MissingHeader));
        };
        let token = extract_token(header_value);

        let key_set = self.source.fetch().await?;
        let mut result = verify(token, &key_set);

        if result == VerificationResult::KeyNotFound && self.source.invalidate().await {
            tracing::info!("unknown kid with cached key set, refetching");
            let key_set = self.source.fetch().await?;
            result = verify(token, &key_set);
        }

        match result {
            VerificationResult::Valid => Ok(()),
            rejected => Err(AuthFailure::Rejected(rejected)),
        }
    }
}

impl std::fmt::Debug for Authorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authorizer").finish_non_exhaustive()
    }
}
