use crate::constants::MAX_PIXELS;
use crate::errors::DecodeError;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;

/// 画像バイト列をデコードし、DynamicImage と判定されたフォーマットを返す
///
/// フォーマットはファイル名ではなく先頭バイト（マジックナンバー）から判定する
pub fn decode_image(data: &[u8]) -> Result<(DynamicImage, ImageFormat), DecodeError> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|_| DecodeError::UnrecognizedFormat)?;

    let format = reader.format().ok_or(DecodeError::UnrecognizedFormat)?;

    let img = reader.decode().map_err(|e| DecodeError::Corrupt {
        format: format!("{format:?}"),
        reason: e.to_string(),
    })?;

    validate_source_dimensions(img.width(), img.height())?;

    Ok((img, format))
}

/// ソース画像の総ピクセル数を検証し、メモリ枯渇を防ぐ
fn validate_source_dimensions(width: u32, height: u32) -> Result<(), DecodeError> {
    let total_pixels = width as u64 * height as u64;
    if total_pixels > MAX_PIXELS {
        return Err(DecodeError::TooLarge { width, height });
    }
    Ok(())
}
