//! Front-end for n-dimensional arrays.
//!
//! Accepts a 2-D (grayscale) or `rows x cols x 3` (RGB) array of any numeric
//! element type whose values fit losslessly in `u8`, and returns freshly
//! allocated outputs owned by the caller.

use ndarray::prelude::*;
use ndarray::Data;
use num_traits::NumCast;
use tracing::debug;

use crate::errors::{MeanShiftError, Result};
use crate::params::SegmentParams;
use crate::regions::Regions;
use crate::traits::{ChannelMode, SegmentationEngine};

const RANK_REASON: &str =
    "Array must be 2 dimensional (gray scale image) or 3 dimensional (RGB color image)";

/// Outputs of one segmentation request.
#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation<D: Dimension = IxDyn> {
    /// Image with the same shape as the input where each pixel holds the mean
    /// colour (or gray level) of its region.
    pub segmented: Array<u8, D>,
    /// Region index of each pixel, in `0..region_count`.
    pub labels: Array2<i32>,
    pub region_count: usize,
}

impl<D: Dimension> Segmentation<D> {
    pub fn into_parts(self) -> (Array<u8, D>, Array2<i32>, usize) {
        (self.segmented, self.labels, self.region_count)
    }
}

/// Segments `image` with the mean shift engine.
///
/// Parameters are validated first, then the input is coerced to `u8` and its
/// shape checked; any failure returns before the engine is touched. The input
/// is never modified.
pub fn segment<E, S, D, T>(
    engine: &mut E,
    image: &ArrayBase<S, D>,
    params: &SegmentParams,
) -> Result<Segmentation<D>>
where
    E: SegmentationEngine + ?Sized,
    S: Data<Elem = T>,
    D: Dimension,
    T: Copy + NumCast + PartialEq,
{
    let validated = params.validate()?;
    let pixels = coerce_pixels(image)?;
    let (mode, rows, cols) = channel_layout(image.shape())?;

    debug!(rows, cols, ?mode, speed_up = %validated.speed_up, "segmenting array");

    engine.define_image(&pixels, mode, rows, cols);

    let mut segmented = vec![0u8; pixels.len()];
    let mut labels = vec![0i32; rows * cols];
    drop(pixels);

    engine.segment(
        validated.spatial_radius,
        validated.range_radius,
        validated.min_density,
        validated.speed_up,
    );
    engine.results(&mut segmented);

    let region_count = {
        let regions = Regions::take(engine);
        regions.copy_labels_into(&mut labels)?;
        regions.region_count()?
    };

    debug!(region_count, "segmentation finished");

    Ok(Segmentation {
        segmented: Array::from_shape_vec(image.raw_dim(), segmented)?,
        labels: Array2::from_shape_vec((rows, cols), labels)?,
        region_count,
    })
}

/// Copies the array into a packed row-major `u8` buffer.
///
/// Every element must survive the round trip through `u8` unchanged, so
/// `-1`, `256` or `0.5` are refused rather than wrapped or truncated.
pub fn coerce_pixels<S, D, T>(image: &ArrayBase<S, D>) -> Result<Vec<u8>>
where
    S: Data<Elem = T>,
    D: Dimension,
    T: Copy + NumCast + PartialEq,
{
    image
        .iter()
        .map(|&value| {
            num_traits::cast::<T, u8>(value)
                .filter(|&byte| <T as NumCast>::from(byte) == Some(value))
        })
        .collect::<Option<Vec<u8>>>()
        .ok_or_else(|| MeanShiftError::Coercion {
            reason: "array elements must be representable as 8-bit unsigned integers".to_string(),
        })
}

/// Channel mode and spatial size for an accepted array shape.
pub fn channel_layout(shape: &[usize]) -> Result<(ChannelMode, usize, usize)> {
    match *shape {
        [rows, cols] => Ok((ChannelMode::Grayscale, rows, cols)),
        [rows, cols, 3] => Ok((ChannelMode::Color, rows, cols)),
        _ => Err(MeanShiftError::Shape {
            expected: RANK_REASON.to_string(),
            actual: shape.to_vec(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::MockEngine;

    #[test]
    fn test_channel_layout() -> Result<()> {
        assert_eq!(channel_layout(&[4, 5])?, (ChannelMode::Grayscale, 4, 5));
        assert_eq!(channel_layout(&[4, 5, 3])?, (ChannelMode::Color, 4, 5));
        assert!(channel_layout(&[4]).is_err());
        assert!(channel_layout(&[4, 5, 4]).is_err());
        assert!(channel_layout(&[1, 4, 5, 3]).is_err());
        Ok(())
    }

    #[test]
    fn test_coerce_lossless_values() -> Result<()> {
        let floats = array![[0.0f64, 255.0], [17.0, 3.0]];
        assert_eq!(coerce_pixels(&floats)?, vec![0, 255, 17, 3]);

        let ints = array![[-1i32, 4]];
        assert!(coerce_pixels(&ints).is_err());

        let fractional = array![[0.5f32]];
        assert!(coerce_pixels(&fractional).is_err());

        let wide = array![[256u16]];
        assert!(coerce_pixels(&wide).is_err());
        Ok(())
    }

    #[test]
    fn test_coerce_follows_logical_order() -> Result<()> {
        let image = array![[1u8, 2], [3, 4]];
        let transposed = image.t();
        assert_eq!(coerce_pixels(&transposed)?, vec![1, 3, 2, 4]);
        Ok(())
    }

    #[test]
    fn test_segment_gray_zeros() -> Result<()> {
        let mut engine = MockEngine::new();
        let image = Array2::<u8>::zeros((4, 4));

        let (segmented, labels, region_count) =
            segment(&mut engine, &image, &SegmentParams::new(2, 5.0, 10))?.into_parts();

        assert_eq!(region_count, 1);
        assert_eq!(segmented, image);
        assert!(labels.iter().all(|&l| l == 0));
        assert_eq!(engine.log().lock().outstanding_regions(), 0);
        Ok(())
    }

    #[test]
    fn test_invalid_speed_up_skips_engine() {
        let mut engine = MockEngine::new();
        let image = Array2::<u8>::zeros((2, 2));
        let params = SegmentParams::new(1, 1.0, 1).with_speed_up(3);

        let err = segment(&mut engine, &image, &params).unwrap_err();
        assert!(matches!(err, MeanShiftError::Validation { .. }));
        assert!(engine.log().lock().untouched());
    }
}
