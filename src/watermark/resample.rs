//! Emblem resampling with fast-image-resize.
//!
//! Emblem assets are typically much smaller than the tile target; nearest or
//! bilinear resampling produces visible aliasing once the result is tiled,
//! so resampling uses a Lanczos3 convolution.

use super::error::WatermarkError;
use super::params::WatermarkParams;
use fast_image_resize::{FilterType, Image, PixelType, ResizeAlg, Resizer};
use image::{DynamicImage, RgbaImage};
use std::num::NonZeroU32;

/// Resample the emblem to the target tile dimensions using Lanczos3.
pub fn resample_emblem(
    emblem: &DynamicImage,
    target_w: u32,
    target_h: u32,
) -> Result<RgbaImage, WatermarkError> {
    let src_width = NonZeroU32::new(emblem.width())
        .ok_or_else(|| WatermarkError::ResampleError("source width is 0".to_string()))?;
    let src_height = NonZeroU32::new(emblem.height())
        .ok_or_else(|| WatermarkError::ResampleError("source height is 0".to_string()))?;
    let dst_width = NonZeroU32::new(target_w)
        .ok_or_else(|| WatermarkError::ResampleError("target width is 0".to_string()))?;
    let dst_height = NonZeroU32::new(target_h)
        .ok_or_else(|| WatermarkError::ResampleError("target height is 0".to_string()))?;

    let src_image = Image::from_vec_u8(
        src_width,
        src_height,
        emblem.to_rgba8().into_raw(),
        PixelType::U8x4,
    )
    .map_err(|e| WatermarkError::ResampleError(format!("failed to create source image: {e:?}")))?;

    let mut dst_image = Image::new(dst_width, dst_height, PixelType::U8x4);

    let mut resizer = Resizer::new(ResizeAlg::Convolution(FilterType::Lanczos3));
    resizer
        .resize(&src_image.view(), &mut dst_image.view_mut())
        .map_err(|e| WatermarkError::ResampleError(format!("resize operation failed: {e:?}")))?;

    RgbaImage::from_raw(target_w, target_h, dst_image.into_vec())
        .ok_or_else(|| WatermarkError::ResampleError("failed to build output buffer".to_string()))
}

/// Scale every alpha byte of the tile by the opacity factor, in place.
///
/// Applied uniformly even when the emblem carries no transparency of its
/// own: opacity is a presentation parameter independent of the source
/// asset's alpha channel.
pub fn apply_opacity(tile: &mut RgbaImage, params: &WatermarkParams) {
    for pixel in tile.pixels_mut() {
        pixel[3] = params.scaled_alpha(pixel[3]);
    }
}
