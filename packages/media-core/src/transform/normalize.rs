use bytes::Bytes;

use crate::constants::{CANONICAL_CONTENT_TYPE, DEFAULT_QUALITY};
use crate::errors::{DecodeError, TransformError};
use crate::transform::{decode_image, encode_jpeg, resize_exact, TransformParams};

/// 正規化済み画像（常に JPEG としてデコード可能）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedImage {
    bytes: Bytes,
    width: u32,
    height: u32,
}

impl NormalizedImage {
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn content_type(&self) -> &'static str {
        CANONICAL_CONTENT_TYPE
    }
}

/// 画像正規化器
///
/// - `normalize`: 任意の対応フォーマットをデコードし、JPEG に再エンコードする（取り込み用）
/// - `transform`: 180度回転 → 固定サイズへリサイズ → JPEG エンコード（取得時の rotate 用）
///
/// どちらもメモリ上のバイト列に対する純粋な変換で、副作用を持たない。
#[derive(Debug, Clone, Default)]
pub struct ImageNormalizer {
    params: TransformParams,
}

impl ImageNormalizer {
    pub fn new(params: TransformParams) -> Self {
        Self { params }
    }

    /// 画像を JPEG に正規化する
    pub fn normalize(&self, raw: &[u8]) -> Result<NormalizedImage, DecodeError> {
        let (img, source_format) = decode_image(raw)?;
        tracing::debug!(
            format = ?source_format,
            width = img.width(),
            height = img.height(),
            "decoded image for normalization"
        );

        let bytes = encode_jpeg(&img, DEFAULT_QUALITY)
            .map_err(|e| DecodeError::Reencode(e.to_string()))?;

        Ok(NormalizedImage {
            bytes: Bytes::from(bytes),
            width: img.width(),
            height: img.height(),
        })
    }

    /// 画像を180度回転し、固定サイズにリサイズして JPEG で返す
    ///
    /// 出力サイズは元画像のアスペクト比に関係なく `params` の幅・高さになる
    pub fn transform(&self, raw: &[u8]) -> Result<NormalizedImage, TransformError> {
        let (img, _) = decode_image(raw)?;

        let rotated = img.rotate180();
        let resized = resize_exact(&rotated, self.params.width, self.params.height)?;

        let bytes = encode_jpeg(&resized, self.params.quality)
            .map_err(|e| TransformError::ProcessingFailed(format!("JPEG encode failed: {e}")))?;

        Ok(NormalizedImage {
            bytes: Bytes::from(bytes),
            width: self.params.width,
            height: self.params.height,
        })
    }
}
