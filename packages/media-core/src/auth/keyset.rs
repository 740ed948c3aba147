use std::collections::HashMap;

use jsonwebtoken::DecodingKey;
use jsonwebtoken::jwk::{AlgorithmParameters, Jwk};
use serde::Deserialize;

use crate::errors::FetchError;

/// kid → 検証用公開鍵 のマップ
///
/// JWKS ドキュメントから構築する。RSA 鍵かつ kid を持つものだけを登録し、
/// それ以外（EC 鍵、kid なし、パース不能）は読み飛ばす
#[derive(Clone, Default)]
pub struct KeySet {
    keys: HashMap<String, DecodingKey>,
}

/// JWKS ドキュメントの外枠。個々の鍵は後から 1 つずつパースする
#[derive(Deserialize)]
struct RawJwkSet {
    keys: Vec<serde_json::Value>,
}

impl KeySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// JWKS の JSON バイト列から鍵セットを作成する
    ///
    /// 外枠（`{"keys": [...]}`）が壊れている場合のみエラー
    pub fn from_jwks_json(data: &[u8]) -> Result<Self, FetchError> {
        let raw: RawJwkSet =
            serde_json::from_slice(data).map_err(|e| FetchError::Malformed(e.to_string()))?;

        let mut set = Self::new();
        for value in raw.keys {
            match serde_json::from_value::<Jwk>(value) {
                Ok(jwk) => set.add_jwk(&jwk),
                Err(e) => tracing::warn!(error = %e, "skipping unparseable JWK"),
            }
        }

        Ok(set)
    }

    /// JWK を 1 つ登録する（RSA 以外・kid なしは無視）
    pub fn add_jwk(&mut self, jwk: &Jwk) {
        let Some(kid) = jwk.common.key_id.as_deref().filter(|kid| !kid.is_empty()) else {
            tracing::debug!("skipping JWK without kid");
            return;
        };

        let AlgorithmParameters::RSA(rsa) = &jwk.algorithm else {
            tracing::debug!(kid = %kid, "skipping non-RSA JWK");
            return;
        };

        match DecodingKey::from_rsa_components(&rsa.n, &rsa.e) {
            Ok(key) => {
                self.keys.entry(kid.to_string()).or_insert(key);
            }
            Err(e) => tracing::warn!(kid = %kid, error = %e, "skipping invalid RSA JWK"),
        }
    }

    pub fn get(&self, kid: &str) -> Option<&DecodingKey> {
        self.keys.get(kid)
    }

    pub fn contains(&self, kid: &str) -> bool {
        self.keys.contains_key(kid)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl std::fmt::Debug for KeySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeySet")
            .field("kids", &self.keys.keys().collect::<Vec<_>>())
            .finish()
    }
}
