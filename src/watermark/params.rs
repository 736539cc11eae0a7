//! Tunable watermark parameters and the geometry derived from them.
//!
//! Deployments vary only in these three knobs (observed divisors of 3 and 6,
//! opacities of 0.5, 0.25, 0.2); the algorithm is identical everywhere, so
//! the variation lives in configuration rather than code.

/// The two-and-a-half tunable knobs of the compositor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatermarkParams {
    /// The tile width is the submitted image width divided by this
    /// (integer floor division).
    pub width_divisor: u32,
    /// Lower bound on the tile width in pixels, so emblems stay legible on
    /// very small screenshots.
    pub width_floor: u32,
    /// Multiplicative factor applied to the emblem's alpha channel, in [0, 1].
    pub opacity: f32,
}

impl Default for WatermarkParams {
    fn default() -> Self {
        Self {
            width_divisor: 3,
            width_floor: 100,
            opacity: 0.5,
        }
    }
}

impl WatermarkParams {
    /// Target tile width for a submitted image of the given width:
    /// `max(base_width / width_divisor, width_floor)`.
    pub fn tile_width(&self, base_width: u32) -> u32 {
        (base_width / self.width_divisor.max(1)).max(self.width_floor)
    }

    /// Target tile dimensions, preserving the emblem's aspect ratio. The
    /// height is rounded to the nearest integer pixel, minimum 1.
    pub fn tile_size(&self, base_width: u32, emblem_width: u32, emblem_height: u32) -> (u32, u32) {
        let width = self.tile_width(base_width);
        let height =
            ((width as f64) * (emblem_height as f64) / (emblem_width as f64)).round() as u32;
        (width, height.max(1))
    }

    /// Scale one alpha byte by the opacity factor.
    ///
    /// Rounding is half-away-from-zero via `f32::round`, so a fully opaque
    /// byte at opacity 0.5 yields 128 (255 × 0.5 = 127.5 → 128). This is the
    /// documented, consistent choice for the whole deployment.
    pub fn scaled_alpha(&self, alpha: u8) -> u8 {
        (alpha as f32 * self.opacity.clamp(0.0, 1.0)).round() as u8
    }
}
