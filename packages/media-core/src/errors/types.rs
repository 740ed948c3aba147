use thiserror::Error;

/// 画像デコード（正規化）エラー
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unrecognized image format")]
    UnrecognizedFormat,

    #[error("corrupt {format} data: {reason}")]
    Corrupt { format: String, reason: String },

    #[error("image resolution exceeds maximum ({width}x{height})")]
    TooLarge { width: u32, height: u32 },

    #[error("re-encode failed: {0}")]
    Reencode(String),
}

/// 画像変換（回転・リサイズ）エラー
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error("image resolution exceeds maximum ({width}x{height})")]
    ResolutionTooLarge { width: u32, height: u32 },

    #[error("processing failed: {0}")]
    ProcessingFailed(String),
}

/// ストレージアクセスエラー
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object not found: {key}")]
    NotFound { key: String },

    #[error("access denied")]
    Forbidden,

    #[error("storage error: {0}")]
    Internal(String),
}

/// 鍵セット（JWKS）取得エラー
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("key set request failed: {0}")]
    Request(String),

    #[error("key set request timed out")]
    Timeout,

    #[error("key set endpoint returned status {0}")]
    Status(u16),

    #[error("malformed key set: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = err.status() {
            FetchError::Status(status.as_u16())
        } else if err.is_decode() {
            FetchError::Malformed(err.to_string())
        } else {
            FetchError::Request(err.to_string())
        }
    }
}
