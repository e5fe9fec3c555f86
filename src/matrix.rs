//! Front-end for pre-allocated host matrices in OpenCV's conventions.
//!
//! Colour matrices are BGR. Results are written into matrices owned by the
//! caller, and failures are reported as a `-1` region count by
//! [`segment_into`].

#[cfg(feature = "opencv")]
mod cv;

use tracing::{debug, warn};

use crate::errors::{MeanShiftError, Result};
use crate::imageops::{bgr_to_rgb_into, swap_red_blue};
use crate::params::SegmentParams;
use crate::regions::Regions;
use crate::traits::{ChannelMode, SegmentationEngine};

/// Per-channel element type of a matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Depth {
    U8,
    S8,
    U16,
    S16,
    S32,
    F32,
    F64,
}

impl Depth {
    pub const fn bits(self) -> usize {
        match self {
            Self::U8 | Self::S8 => 8,
            Self::U16 | Self::S16 => 16,
            Self::S32 | Self::F32 => 32,
            Self::F64 => 64,
        }
    }

    pub const fn bytes(self) -> usize {
        self.bits() / 8
    }
}

/// Read/write access to a host matrix.
pub trait MatBuffer {
    fn rows(&self) -> usize;
    fn cols(&self) -> usize;
    /// `None` for element types this crate does not know.
    fn depth(&self) -> Option<Depth>;
    fn channels(&self) -> usize;
    /// Packed row-major bytes, or `None` when the matrix is not continuous.
    fn data(&self) -> Option<&[u8]>;
    fn data_mut(&mut self) -> Option<&mut [u8]>;
}

/// Owned, continuous, row-major matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mat {
    rows: usize,
    cols: usize,
    depth: Depth,
    channels: usize,
    data: Vec<u8>,
}

impl Mat {
    /// Zero-filled matrix.
    pub fn new(rows: usize, cols: usize, depth: Depth, channels: usize) -> Self {
        Self {
            rows,
            cols,
            depth,
            channels,
            data: vec![0; rows * cols * channels * depth.bytes()],
        }
    }

    /// 8-bit matrix over existing pixel bytes.
    pub fn from_bytes(rows: usize, cols: usize, channels: usize, data: Vec<u8>) -> Result<Self> {
        let expected = rows * cols * channels;
        if data.len() != expected {
            return Err(MeanShiftError::matrix(format!(
                "{} bytes given for a {rows}x{cols}x{channels} matrix of {expected} bytes",
                data.len()
            )));
        }
        Ok(Self {
            rows,
            cols,
            depth: Depth::U8,
            channels,
            data,
        })
    }

    /// Single-channel 32-bit matrix holding `labels`.
    pub fn from_labels(rows: usize, cols: usize, labels: &[i32]) -> Result<Self> {
        if labels.len() != rows * cols {
            return Err(MeanShiftError::matrix(format!(
                "{} labels given for a {rows}x{cols} matrix",
                labels.len()
            )));
        }
        Ok(Self {
            rows,
            cols,
            depth: Depth::S32,
            channels: 1,
            data: labels.iter().flat_map(|label| label.to_ne_bytes()).collect(),
        })
    }

    /// Label values of a single-channel 32-bit matrix.
    pub fn labels(&self) -> Option<Vec<i32>> {
        if self.depth != Depth::S32 || self.channels != 1 {
            return None;
        }
        Some(
            self.data
                .chunks_exact(4)
                .map(|chunk| i32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
                .collect(),
        )
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl MatBuffer for Mat {
    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn depth(&self) -> Option<Depth> {
        Some(self.depth)
    }

    fn channels(&self) -> usize {
        self.channels
    }

    fn data(&self) -> Option<&[u8]> {
        Some(&self.data)
    }

    fn data_mut(&mut self) -> Option<&mut [u8]> {
        Some(&mut self.data)
    }
}

/// Segments `input` into the caller's matrices and returns the region count,
/// or `-1` when the matrices or parameters are rejected.
///
/// See [`try_segment_into`] for the checks. The reason for a `-1` is logged
/// at warn level.
pub fn segment_into<E, I, O, L>(
    engine: &mut E,
    input: Option<&I>,
    out_mean: Option<&mut O>,
    out_labels: Option<&mut L>,
    params: &SegmentParams,
) -> i32
where
    E: SegmentationEngine + ?Sized,
    I: MatBuffer + ?Sized,
    O: MatBuffer + ?Sized,
    L: MatBuffer + ?Sized,
{
    match try_segment_into(engine, input, out_mean, out_labels, params) {
        Ok(region_count) => i32::try_from(region_count).unwrap_or(i32::MAX),
        Err(err) => {
            warn!(%err, "matrix segmentation rejected");
            -1
        }
    }
}

/// Segments `input` and writes the mean colour image into `out_mean` and the
/// region labels into `out_labels`.
///
/// Rejected before the engine runs:
/// - a missing matrix;
/// - `out_mean` whose depth or channel count differs from `input`;
/// - `out_labels` that is not single-channel `S32`;
/// - `input` that is not 8-bit with 1 or 3 channels;
/// - outputs whose size differs from `input`, or non-continuous matrices;
/// - a negative spatial or range radius.
///
/// Speed-up values outside 0..=2 run with the high tier. For 3-channel input,
/// `out_mean` first receives the RGB version of `input`, which the engine
/// copies, and is then overwritten by the result and swapped back to BGR.
pub fn try_segment_into<E, I, O, L>(
    engine: &mut E,
    input: Option<&I>,
    out_mean: Option<&mut O>,
    out_labels: Option<&mut L>,
    params: &SegmentParams,
) -> Result<usize>
where
    E: SegmentationEngine + ?Sized,
    I: MatBuffer + ?Sized,
    O: MatBuffer + ?Sized,
    L: MatBuffer + ?Sized,
{
    let input = input.ok_or_else(|| MeanShiftError::matrix("input matrix is missing"))?;
    let out_mean = out_mean.ok_or_else(|| MeanShiftError::matrix("mean colour matrix is missing"))?;
    let out_labels = out_labels.ok_or_else(|| MeanShiftError::matrix("label matrix is missing"))?;

    let (mode, rows, cols) = check_layout(input, &*out_mean, &*out_labels)?;
    let validated = params.validate_lenient()?;

    let pixels = continuous(input.data(), "input")?;
    let mean = continuous(out_mean.data_mut(), "mean colour")?;
    let label_bytes = continuous(out_labels.data_mut(), "label")?;

    let pixel_len = rows * cols * mode.channels();
    if pixels.len() != pixel_len
        || mean.len() != pixel_len
        || label_bytes.len() != rows * cols * 4
    {
        return Err(MeanShiftError::matrix("matrix data does not match its dimensions"));
    }

    debug!(rows, cols, ?mode, speed_up = %validated.speed_up, "segmenting matrix");

    match mode {
        ChannelMode::Color => {
            bgr_to_rgb_into(pixels, mean);
            engine.define_image(mean, mode, rows, cols);
        }
        ChannelMode::Grayscale => engine.define_image(pixels, mode, rows, cols),
    }

    engine.segment(
        validated.spatial_radius,
        validated.range_radius,
        validated.min_density,
        validated.speed_up,
    );
    engine.results(mean);

    if mode == ChannelMode::Color {
        swap_red_blue(mean);
    }

    let regions = Regions::take(engine);
    regions.copy_labels_into_bytes(label_bytes)?;

    let region_count = regions.region_count()?;
    debug!(region_count, "matrix segmentation finished");
    Ok(region_count)
}

fn check_layout<I, O, L>(
    input: &I,
    out_mean: &O,
    out_labels: &L,
) -> Result<(ChannelMode, usize, usize)>
where
    I: MatBuffer + ?Sized,
    O: MatBuffer + ?Sized,
    L: MatBuffer + ?Sized,
{
    let depth = input.depth();
    if out_mean.depth() != depth || out_mean.channels() != input.channels() {
        return Err(MeanShiftError::matrix(format!(
            "mean colour matrix is {:?}x{}, input is {:?}x{}",
            out_mean.depth(),
            out_mean.channels(),
            depth,
            input.channels()
        )));
    }

    if out_labels.depth() != Some(Depth::S32) || out_labels.channels() != 1 {
        return Err(MeanShiftError::matrix(
            "label matrix must hold one signed 32-bit integer per pixel",
        ));
    }

    let mode = ChannelMode::from_channels(input.channels())
        .filter(|_| depth == Some(Depth::U8))
        .ok_or_else(|| MeanShiftError::matrix("input matrix must be 8-bit with 1 or 3 channels"))?;

    let (rows, cols) = (input.rows(), input.cols());
    if (out_mean.rows(), out_mean.cols()) != (rows, cols)
        || (out_labels.rows(), out_labels.cols()) != (rows, cols)
    {
        return Err(MeanShiftError::matrix(format!(
            "output matrices must be {rows}x{cols} like the input"
        )));
    }

    Ok((mode, rows, cols))
}

fn continuous<T>(data: Option<T>, name: &str) -> Result<T> {
    data.ok_or_else(|| MeanShiftError::matrix(format!("{name} matrix is not continuous")))
}
