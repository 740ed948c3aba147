use crate::constants::MAX_PIXELS;
use crate::errors::TransformError;
use fast_image_resize::{images::Image, FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::{DynamicImage, RgbImage};

/// 画像を指定サイズちょうどにリサイズする
///
/// アスペクト比は維持しない（出力は常に target_w x target_h の RGB8）。
/// 縦横比の違う画像は引き伸ばされる
pub fn resize_exact(
    img: &DynamicImage,
    target_w: u32,
    target_h: u32,
) -> Result<DynamicImage, TransformError> {
    check_target(target_w, target_h)?;

    // JPEG で出力するのでアルファは捨てる
    let rgb_img = img.to_rgb8();
    if rgb_img.dimensions() == (target_w, target_h) {
        return Ok(DynamicImage::ImageRgb8(rgb_img));
    }

    let (src_w, src_h) = rgb_img.dimensions();
    let src_image = Image::from_vec_u8(src_w, src_h, rgb_img.into_raw(), PixelType::U8x3)
        .map_err(|e| TransformError::ProcessingFailed(format!("failed to create source image: {e}")))?;
    let mut dst_image = Image::new(target_w, target_h, PixelType::U8x3);

    // 拡大・縮小どちらも Lanczos3
    Resizer::new()
        .resize(
            &src_image,
            &mut dst_image,
            &ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Lanczos3)),
        )
        .map_err(|e| TransformError::ProcessingFailed(format!("resize failed: {e}")))?;

    RgbImage::from_raw(target_w, target_h, dst_image.into_vec())
        .map(DynamicImage::ImageRgb8)
        .ok_or_else(|| TransformError::ProcessingFailed("failed to convert resized image".to_string()))
}

/// 出力サイズの検証（0 や巨大なサイズはバッファを確保する前に弾く）
fn check_target(target_w: u32, target_h: u32) -> Result<(), TransformError> {
    if target_w == 0 || target_h == 0 {
        return Err(TransformError::InvalidParams(format!(
            "target size must be non-zero, got {target_w}x{target_h}"
        )));
    }
    if target_w as u64 * target_h as u64 > MAX_PIXELS {
        return Err(TransformError::ResolutionTooLarge {
            width: target_w,
            height: target_h,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, Rgba, RgbaImage};

    #[test]
    fn test_resize_ignores_aspect_ratio() {
        let img = DynamicImage::new_rgb8(1080, 1080);
        let resized = resize_exact(&img, 1280, 720).unwrap();

        assert_eq!((resized.width(), resized.height()), (1280, 720));
    }

    #[test]
    fn test_resize_downscale() {
        let img = DynamicImage::new_rgb8(1000, 500);
        let resized = resize_exact(&img, 100, 100).unwrap();
        assert_eq!((resized.width(), resized.height()), (100, 100));
    }

    #[test]
    fn test_same_size_keeps_pixels() {
        let raster = RgbImage::from_fn(16, 8, |x, y| Rgb([x as u8 * 10, y as u8 * 20, 7]));
        let resized = resize_exact(&DynamicImage::ImageRgb8(raster.clone()), 16, 8).unwrap();

        assert_eq!(resized.to_rgb8(), raster);
    }

    #[test]
    fn test_alpha_is_dropped() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 128])));
        let resized = resize_exact(&img, 20, 20).unwrap();

        assert!(matches!(resized, DynamicImage::ImageRgb8(_)));
        assert!(resized.to_rgb8().get_pixel(10, 10)[0] >= 250);
    }

    #[test]
    fn test_zero_target_rejected() {
        let img = DynamicImage::new_rgb8(10, 10);
        assert!(matches!(
            resize_exact(&img, 0, 720),
            Err(TransformError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_resize_exceeds_max_pixels() {
        let img = DynamicImage::new_rgb8(100, 100);
        let result = resize_exact(&img, 100000, 100000);

        match result.unwrap_err() {
            TransformError::ResolutionTooLarge { width, height } => {
                assert_eq!(width, 100000);
                assert_eq!(height, 100000);
            }
            _ => panic!("expected ResolutionTooLarge error"),
        }
    }
}
