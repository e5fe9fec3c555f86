use image::{DynamicImage, GrayImage, RgbImage};
use ndarray::prelude::*;
use nshare::AsNdarray3;
use tracing::debug;

use crate::array;
use crate::errors::{MeanShiftError, Result};
use crate::params::SegmentParams;
use crate::traits::SegmentationEngine;

/// Segmentation of an `image` crate image.
#[derive(Debug, Clone)]
pub struct SegmentedImage {
    /// Mean colour image, `ImageLuma8` for grayscale input and `ImageRgb8` otherwise.
    pub image: DynamicImage,
    pub labels: Array2<i32>,
    pub region_count: usize,
}

/// Segments a decoded image.
///
/// 8-bit grayscale images are segmented as grayscale; every other pixel
/// format is converted to 8-bit RGB first, dropping any alpha channel.
pub fn segment_image<E>(
    engine: &mut E,
    image: &DynamicImage,
    params: &SegmentParams,
) -> Result<SegmentedImage>
where
    E: SegmentationEngine + ?Sized,
{
    match image {
        DynamicImage::ImageLuma8(gray) => segment_gray(engine, gray, params),
        other => segment_rgb(engine, &other.to_rgb8(), params),
    }
}

fn segment_gray<E>(
    engine: &mut E,
    gray: &GrayImage,
    params: &SegmentParams,
) -> Result<SegmentedImage>
where
    E: SegmentationEngine + ?Sized,
{
    let (width, height) = gray.dimensions();
    let shape = (height as usize, width as usize);
    let view = ArrayView2::from_shape(shape, gray.as_raw().as_slice())?;

    let (segmented, labels, region_count) = array::segment(engine, &view, params)?.into_parts();
    let image = GrayImage::from_raw(width, height, segmented.into_raw_vec_and_offset().0)
        .ok_or_else(|| buffer_mismatch("grayscale result"))?;

    debug!(width, height, region_count, "segmented grayscale image");
    Ok(SegmentedImage {
        image: DynamicImage::ImageLuma8(image),
        labels,
        region_count,
    })
}

fn segment_rgb<E>(
    engine: &mut E,
    rgb: &RgbImage,
    params: &SegmentParams,
) -> Result<SegmentedImage>
where
    E: SegmentationEngine + ?Sized,
{
    let (width, height) = rgb.dimensions();
    // channel-first view, reordered to rows x cols x channels
    let view = rgb.as_ndarray3().permuted_axes([1, 2, 0]);

    let (segmented, labels, region_count) = array::segment(engine, &view, params)?.into_parts();
    let image = RgbImage::from_raw(width, height, segmented.into_raw_vec_and_offset().0)
        .ok_or_else(|| buffer_mismatch("colour result"))?;

    debug!(width, height, region_count, "segmented colour image");
    Ok(SegmentedImage {
        image: DynamicImage::ImageRgb8(image),
        labels,
        region_count,
    })
}

fn buffer_mismatch(operation: &str) -> MeanShiftError {
    MeanShiftError::Image {
        operation: operation.to_string(),
        source: "buffer size does not match image dimensions".into(),
    }
}
