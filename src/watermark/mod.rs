//! Watermark compositing: derive a tiled overlay from the community emblem
//! and blend it into the submitted image.
//!
//! The whole module is a deterministic pure transformation: two decoded
//! images plus [`WatermarkParams`] in, one encoded PNG out. Same inputs and
//! parameters always produce the same bytes.
//!
//! Pipeline stages:
//!
//! 1. Normalize both images to RGBA8.
//! 2. Compute the tile size from the submitted image width (with a legibility
//!    floor) and the emblem's aspect ratio.
//! 3. Resample the emblem with Lanczos3.
//! 4. Scale the emblem's alpha channel by the opacity factor.
//! 5. Tile from (0,0), clipping partial tiles at the right/bottom edges.
//! 6. Alpha-composite with the Porter-Duff "over" operator.
//! 7. Encode losslessly to PNG, filename prefixed with `vouched_`.

pub mod compositor;
pub mod error;
pub mod params;
pub mod resample;

pub use compositor::{composite, watermark, CompositeResult};
pub use error::WatermarkError;
pub use params::WatermarkParams;
pub use resample::resample_emblem;
