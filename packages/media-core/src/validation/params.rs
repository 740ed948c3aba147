use crate::constants::MAX_DIMENSION;
use crate::errors::TransformError;

/// 回転＋リサイズの出力パラメータを検証する
///
/// 設定値（ROTATE_WIDTH / ROTATE_HEIGHT）から組み立てるため、起動時に 1 度だけ呼ばれる
pub fn validate_params(width: u32, height: u32, quality: u8) -> Result<(), TransformError> {
    check_range("width", width, MAX_DIMENSION)?;
    check_range("height", height, MAX_DIMENSION)?;
    check_range("quality", u32::from(quality), 100)
}

fn check_range(name: &str, value: u32, max: u32) -> Result<(), TransformError> {
    if (1..=max).contains(&value) {
        Ok(())
    } else {
        Err(TransformError::InvalidParams(format!(
            "{name} must be 1-{max}, got {value}"
        )))
    }
}
