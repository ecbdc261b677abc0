//! Avatar rasterization.
//!
//! Avatars are fetched as whatever the CDN serves (usually JPEG) and
//! rendered into a fixed-size square PNG for the classifier. Accounts with
//! no avatar get a 1×1 white PNG; the prompt tells the classifier to
//! disregard it as a placeholder rather than read it as signal.

use image::ImageFormat;
use image::imageops::FilterType;
use sortinghat_core::error::ProfileError;

/// Decode raw image bytes and resize to a `size`×`size` PNG.
pub fn rasterize(bytes: &[u8], size: u32) -> Result<Vec<u8>, ProfileError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| ProfileError::AvatarDecode(format!("decode: {e}")))?;

    let resized = img.resize_exact(size, size, FilterType::Triangle);

    let mut out = Vec::new();
    resized
        .write_to(&mut std::io::Cursor::new(&mut out), ImageFormat::Png)
        .map_err(|e| ProfileError::AvatarDecode(format!("encode: {e}")))?;
    Ok(out)
}

/// The documented fallback for avatar-less profiles: a 1×1 white PNG.
///
/// Deliberately distinguishable from any real avatar by its size.
pub fn placeholder_png() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(1, 1, image::Rgb([255, 255, 255]));
    let mut out = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut std::io::Cursor::new(&mut out), ImageFormat::Png)
        .expect("encoding a 1x1 PNG into memory cannot fail");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_jpeg(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([10, 120, 200]));
        let mut out = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut std::io::Cursor::new(&mut out), ImageFormat::Jpeg)
            .unwrap();
        out
    }

    #[test]
    fn rasterize_resizes_to_square() {
        let jpeg = sample_jpeg(300, 200);
        let png = rasterize(&jpeg, 100).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.width(), 100);
        assert_eq!(decoded.height(), 100);
    }

    #[test]
    fn rasterize_rejects_garbage() {
        let err = rasterize(b"not an image", 100);
        assert!(matches!(err, Err(ProfileError::AvatarDecode(_))));
    }

    #[test]
    fn placeholder_is_one_by_one_white() {
        let png = placeholder_png();
        let decoded = image::load_from_memory(&png).unwrap().to_rgb8();
        assert_eq!(decoded.width(), 1);
        assert_eq!(decoded.height(), 1);
        assert_eq!(decoded.get_pixel(0, 0).0, [255, 255, 255]);
    }
}
