use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use std::io::Cursor;

/// 画像を JPEG にエンコードする
///
/// JPEG はアルファチャンネルを持たないため RGB8 に変換してから書き出す。
/// 同じラスタ・同じ品質なら出力バイト列は常に同一になる。
pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    img.to_rgb8().write_with_encoder(encoder)?;

    Ok(buf.into_inner())
}
