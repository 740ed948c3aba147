use std::time::Duration;

use async_trait::async_trait;

use crate::auth::keyset::KeySet;
use crate::errors::FetchError;

/// 鍵セットの取得元
#[async_trait]
pub trait KeySetSource: Send + Sync {
    /// 鍵セットを取得する（1 回の呼び出しにつき 1 回だけ試行し、リトライしない）
    async fn fetch(&self) -> Result<KeySet, FetchError>;

    /// キャッシュを破棄する。破棄すべき状態があった場合は true を返す
    ///
    /// キャッシュを持たない取得元では何もしない
    async fn invalidate(&self) -> bool {
        false
    }
}

/// JWKS エンドポイントから鍵セットを取得するクライアント
#[derive(Debug, Clone)]
pub struct JwksFetcher {
    client: reqwest::Client,
    url: String,
}

impl JwksFetcher {
    /// リクエストタイムアウト付きでクライアントを作成する
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Request(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl KeySetSource for JwksFetcher {
    async fn fetch(&self) -> Result<KeySet, FetchError> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %self.url, status = %status, "unexpected response from JWKS endpoint");
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let key_set = KeySet::from_jwks_json(&body)?;

        tracing::debug!(url = %self.url, keys = key_set.len(), "fetched key set");
        Ok(key_set)
    }
}

/// 固定の鍵セットを返す取得元（ローカル開発・テスト用）
#[derive(Debug, Clone, Default)]
pub struct StaticKeySource {
    key_set: KeySet,
}

impl StaticKeySource {
    pub fn new(key_set: KeySet) -> Self {
        Self { key_set }
    }
}

#[async_trait]
impl KeySetSource for StaticKeySource {
    async fn fetch(&self) -> Result<KeySet, FetchError> {
        Ok(self.key_set.clone())
    }
}
