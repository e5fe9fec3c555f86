use crate::params::SpeedUpLevel;
use crate::regions::RegionData;

/// Pixel layout of an image handed to the engine. Colour images are always RGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelMode {
    Grayscale,
    Color,
}

impl ChannelMode {
    pub const fn channels(self) -> usize {
        match self {
            Self::Grayscale => 1,
            Self::Color => 3,
        }
    }

    pub const fn from_channels(channels: usize) -> Option<Self> {
        match channels {
            1 => Some(Self::Grayscale),
            3 => Some(Self::Color),
            _ => None,
        }
    }
}

/// The mean shift segmentation engine.
///
/// The front-ends in this crate only marshal buffers in and out of an engine;
/// the mode seeking itself lives behind this trait. One request drives the
/// methods in order: `define_image`, `segment`, `results`, `regions`, and
/// finally `release_regions` for the data returned by `regions`.
pub trait SegmentationEngine {
    /// Registers a packed, row-major pixel buffer. The engine keeps its own copy.
    fn define_image(&mut self, pixels: &[u8], mode: ChannelMode, rows: usize, cols: usize);

    /// Runs the segmentation on the registered image.
    fn segment(
        &mut self,
        spatial_radius: u32,
        range_radius: f32,
        min_density: u32,
        speed_up: SpeedUpLevel,
    );

    /// Writes the mean colour (or mean gray) image into `out`, which has the
    /// registered image's shape and channel mode.
    fn results(&self, out: &mut [u8]);

    /// Hands over the label map, the region modes and the per-mode point counts.
    fn regions(&mut self) -> RegionData;

    /// Takes back data previously returned by [`SegmentationEngine::regions`].
    fn release_regions(&mut self, regions: RegionData) {
        drop(regions);
    }
}
