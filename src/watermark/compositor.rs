//! Tiling and alpha compositing of the emblem overlay.
//!
//! Tiles are placed on a grid anchored at (0,0), stepping by the resampled
//! emblem's dimensions; partial tiles at the right and bottom edges are
//! clipped to the image bounds, not padded or centered. Blending uses the
//! Porter-Duff "over" operator with the watermark on top, preserving any
//! alpha the submitted image carries beneath.

use super::error::WatermarkError;
use super::params::WatermarkParams;
use super::resample::{apply_opacity, resample_emblem};
use image::codecs::png::PngEncoder;
use image::{ColorType, DynamicImage, ImageEncoder, Rgba, RgbaImage};

/// Encoded composite plus the suggested delivery filename. Produced exactly
/// once per successful run; ownership passes to the delivery sink.
#[derive(Debug, Clone)]
pub struct CompositeResult {
    /// PNG-encoded image bytes.
    pub data: Vec<u8>,
    /// `vouched_` + the original attachment filename.
    pub filename: String,
}

/// Grid positions for tiles covering a `base_w` x `base_h` canvas.
fn tile_positions(base_w: u32, base_h: u32, tile_w: u32, tile_h: u32) -> Vec<(u32, u32)> {
    let mut positions = Vec::new();
    let mut x = 0;
    while x < base_w {
        let mut y = 0;
        while y < base_h {
            positions.push((x, y));
            y += tile_h;
        }
        x += tile_w;
    }
    positions
}

/// Blend two pixels with the Porter-Duff "over" operator.
///
/// The tile's alpha already carries the opacity factor, so no extra scaling
/// happens here.
fn blend_pixels(background: Rgba<u8>, foreground: Rgba<u8>) -> Rgba<u8> {
    let fg_alpha = foreground[3] as f32 / 255.0;
    let bg_alpha = background[3] as f32 / 255.0;

    let out_alpha = fg_alpha + bg_alpha * (1.0 - fg_alpha);

    if out_alpha < 0.001 {
        return Rgba([0, 0, 0, 0]);
    }

    let blend_channel = |fg: u8, bg: u8| -> u8 {
        let fg_f = fg as f32 / 255.0;
        let bg_f = bg as f32 / 255.0;
        let result = (fg_f * fg_alpha + bg_f * bg_alpha * (1.0 - fg_alpha)) / out_alpha;
        (result * 255.0).clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend_channel(foreground[0], background[0]),
        blend_channel(foreground[1], background[1]),
        blend_channel(foreground[2], background[2]),
        (out_alpha * 255.0) as u8,
    ])
}

/// Blend one tile onto the target at (x, y), clipped to the target bounds.
fn blend_tile(target: &mut RgbaImage, tile: &RgbaImage, x: u32, y: u32) {
    let x_end = (x + tile.width()).min(target.width());
    let y_end = (y + tile.height()).min(target.height());

    for ty in y..y_end {
        for tx in x..x_end {
            let tile_pixel = *tile.get_pixel(tx - x, ty - y);
            let target_pixel = *target.get_pixel(tx, ty);
            target.put_pixel(tx, ty, blend_pixels(target_pixel, tile_pixel));
        }
    }
}

/// Blend the tiled, opacity-adjusted emblem into the submitted image.
///
/// Both inputs are normalized to RGBA8 first, discarding indexed palettes
/// and profile metadata. The output always matches the submitted image's
/// dimensions.
pub fn composite(
    base: &DynamicImage,
    emblem: &DynamicImage,
    params: &WatermarkParams,
) -> Result<RgbaImage, WatermarkError> {
    let mut canvas = base.to_rgba8();

    let (tile_w, tile_h) = params.tile_size(canvas.width(), emblem.width(), emblem.height());
    let mut tile = resample_emblem(emblem, tile_w, tile_h)?;
    apply_opacity(&mut tile, params);

    for (x, y) in tile_positions(canvas.width(), canvas.height(), tile_w, tile_h) {
        blend_tile(&mut canvas, &tile, x, y);
    }

    Ok(canvas)
}

/// Encode the composited image losslessly to PNG.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, WatermarkError> {
    let mut data = Vec::new();
    PngEncoder::new(&mut data)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ColorType::Rgba8,
        )
        .map_err(|e| WatermarkError::EncodeError(e.to_string()))?;
    Ok(data)
}

/// Delivery filename for a composite derived from `original`.
pub fn output_filename(original: &str) -> String {
    format!("vouched_{original}")
}

/// Full compositor run: composite, encode, name.
pub fn watermark(
    base: &DynamicImage,
    emblem: &DynamicImage,
    params: &WatermarkParams,
    original_filename: &str,
) -> Result<CompositeResult, WatermarkError> {
    let canvas = composite(base, emblem, params)?;
    let data = encode_png(&canvas)?;

    Ok(CompositeResult {
        data,
        filename: output_filename(original_filename),
    })
}
