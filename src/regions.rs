use std::ops::Deref;

use crate::errors::{MeanShiftError, Result};
use crate::traits::SegmentationEngine;

/// Region description allocated by the engine for one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionData {
    /// One region index per pixel, row-major.
    pub labels: Box<[i32]>,
    /// Mode of each region, `channels` values per region.
    pub modes: Box<[f32]>,
    /// Number of pixels attached to each mode.
    pub mode_point_counts: Box<[i32]>,
    pub region_count: i32,
}

/// Scoped handle over engine-owned region data.
///
/// The data goes back to the engine through
/// [`SegmentationEngine::release_regions`] when the handle is dropped, so it
/// is released exactly once whatever path the copy-out takes.
pub struct Regions<'e, E: SegmentationEngine + ?Sized> {
    engine: &'e mut E,
    data: Option<RegionData>,
}

impl<'e, E: SegmentationEngine + ?Sized> Regions<'e, E> {
    pub fn take(engine: &'e mut E) -> Self {
        let data = engine.regions();
        Self {
            engine,
            data: Some(data),
        }
    }

    pub fn data(&self) -> &RegionData {
        // Only `drop` empties the slot
        self.data.as_ref().unwrap_or_else(|| unreachable!())
    }

    pub fn labels(&self) -> &[i32] {
        &self.data().labels
    }

    pub fn modes(&self) -> &[f32] {
        &self.data().modes
    }

    pub fn mode_point_counts(&self) -> &[i32] {
        &self.data().mode_point_counts
    }

    /// Region count as reported by the engine, rejected when negative.
    pub fn region_count(&self) -> Result<usize> {
        let count = self.data().region_count;
        usize::try_from(count)
            .map_err(|_| MeanShiftError::engine(format!("negative region count {count}")))
    }

    /// Copies the label map into `out`, which must hold exactly one slot per pixel.
    pub fn copy_labels_into(&self, out: &mut [i32]) -> Result<()> {
        let labels = self.checked_labels(out.len())?;
        out.copy_from_slice(labels);
        Ok(())
    }

    /// Writes the label map into `out` as native-endian `i32` values, four
    /// bytes per pixel.
    pub fn copy_labels_into_bytes(&self, out: &mut [u8]) -> Result<()> {
        let labels = self.checked_labels(out.len() / 4)?;
        if out.len() % 4 != 0 {
            return Err(MeanShiftError::engine(format!(
                "label byte buffer of {} bytes is not a whole number of values",
                out.len()
            )));
        }
        for (chunk, label) in out.chunks_exact_mut(4).zip(labels) {
            chunk.copy_from_slice(&label.to_ne_bytes());
        }
        Ok(())
    }

    fn checked_labels(&self, expected: usize) -> Result<&[i32]> {
        let labels = self.labels();
        if labels.len() != expected {
            return Err(MeanShiftError::engine(format!(
                "label buffer holds {} values, expected {expected}",
                labels.len()
            )));
        }
        Ok(labels)
    }
}

impl<E: SegmentationEngine + ?Sized> Deref for Regions<'_, E> {
    type Target = RegionData;

    fn deref(&self) -> &RegionData {
        self.data()
    }
}

impl<E: SegmentationEngine + ?Sized> Drop for Regions<'_, E> {
    fn drop(&mut self) {
        if let Some(data) = self.data.take() {
            self.engine.release_regions(data);
        }
    }
}
