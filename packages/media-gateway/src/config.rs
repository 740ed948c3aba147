use std::net::SocketAddr;
use std::time::Duration;

use media_core::constants::{DEFAULT_TARGET_HEIGHT, DEFAULT_TARGET_WIDTH};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_JWKS_TIMEOUT_SECS: u64 = 5;
const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Settings {
    pub bucket: String,
    pub region: String,
    /// 指定時は path style でアクセスする（MinIO など）
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    S3(S3Settings),
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSettings {
    /// 未設定なら取り込みの認可を行わない
    pub jwks_url: Option<String>,
    pub timeout: Duration,
    /// 0 ならキャッシュしない（リクエストごとに取得）
    pub cache_ttl: Duration,
    pub protect_retrieve: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub storage: StorageBackend,
    pub auth: AuthSettings,
    pub rotate_width: u32,
    pub rotate_height: u32,
    pub max_body_bytes: usize,
}

impl AppConfig {
    /// 環境変数（`.env` があれば先に読み込む）から設定を組み立てる
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // 空文字は未設定と同じ扱い
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bind_addr: SocketAddr = parse_or(&var, "BIND_ADDR", DEFAULT_BIND_ADDR.parse().ok())?;

        let storage = match var("STORAGE_BACKEND").as_deref().unwrap_or("s3") {
            "s3" => StorageBackend::S3(S3Settings {
                bucket: var("S3_BUCKET_NAME").ok_or(ConfigError::Missing("S3_BUCKET_NAME"))?,
                region: var("AWS_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
                endpoint: var("S3_ENDPOINT"),
            }),
            "memory" => StorageBackend::Memory,
            other => {
                return Err(ConfigError::Invalid {
                    name: "STORAGE_BACKEND",
                    value: other.to_string(),
                });
            }
        };

        let auth = AuthSettings {
            jwks_url: var("JWKS_URL"),
            timeout: Duration::from_secs(parse_or(
                &var,
                "JWKS_TIMEOUT_SECS",
                Some(DEFAULT_JWKS_TIMEOUT_SECS),
            )?),
            cache_ttl: Duration::from_secs(parse_or(&var, "JWKS_CACHE_TTL_SECS", Some(0))?),
            protect_retrieve: parse_or(&var, "PROTECT_RETRIEVE", Some(false))?,
        };

        Ok(Self {
            bind_addr,
            storage,
            auth,
            rotate_width: parse_or(&var, "ROTATE_WIDTH", Some(DEFAULT_TARGET_WIDTH))?,
            rotate_height: parse_or(&var, "ROTATE_HEIGHT", Some(DEFAULT_TARGET_HEIGHT))?,
            max_body_bytes: parse_or(&var, "MAX_BODY_BYTES", Some(DEFAULT_MAX_BODY_BYTES))?,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: Option<T>,
) -> Result<T, ConfigError> {
    match var(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => default.ok_or(ConfigError::Missing(name)),
    }
}
