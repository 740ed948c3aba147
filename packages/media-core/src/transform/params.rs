use crate::constants::{DEFAULT_QUALITY, DEFAULT_TARGET_HEIGHT, DEFAULT_TARGET_WIDTH};
use crate::errors::TransformError;
use crate::validation::validate_params;

/// 回転＋リサイズ変換のパラメータ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformParams {
    pub width: u32,
    pub height: u32,
    pub quality: u8,
}

impl TransformParams {
    /// 検証済みパラメータを作成（quality 省略時はデフォルト品質）
    pub fn new(width: u32, height: u32, quality: Option<u8>) -> Result<Self, TransformError> {
        let quality = quality.unwrap_or(DEFAULT_QUALITY);
        validate_params(width, height, quality)?;

        Ok(Self {
            width,
            height,
            quality,
        })
    }
}

impl Default for TransformParams {
    fn default() -> Self {
        Self {
            width: DEFAULT_TARGET_WIDTH,
            height: DEFAULT_TARGET_HEIGHT,
            quality: DEFAULT_QUALITY,
        }
    }
}
