//! Mean shift image segmentation front-ends.
//!
//! The pixel-level mean shift algorithm lives behind the
//! [`SegmentationEngine`] trait. This crate validates requests, hands the
//! engine a packed RGB or grayscale buffer, and copies the mean colour
//! image, the label map and the region count back into caller-owned buffers:
//!
//! - [`array::segment`] for `ndarray` arrays, returning new arrays;
//! - [`matrix::segment_into`] for pre-allocated BGR matrices, returning `-1`
//!   on rejected input;
//! - [`imageops::segment_image`] for `image::DynamicImage`.
//!
//! For details on the algorithm: D. Comaniciu, P. Meer, "Mean shift: A robust
//! approach toward feature space analysis", IEEE Transactions on Pattern
//! Analysis and Machine Intelligence, May 2002.

pub mod array;
pub mod errors;
pub mod imageops;
pub mod matrix;
pub mod params;
pub mod regions;
pub mod segmenter;
pub mod traits;

pub mod mocks;

pub use array::{segment, Segmentation};
pub use errors::{MeanShiftError, Result};
pub use matrix::{segment_into, try_segment_into, Depth, Mat, MatBuffer};
pub use params::{SegmentParams, SpeedUpLevel, SPEEDUP_HIGH, SPEEDUP_MEDIUM, SPEEDUP_NO};
pub use regions::{RegionData, Regions};
pub use segmenter::Segmenter;
pub use traits::*;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
