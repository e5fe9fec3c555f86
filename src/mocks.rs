use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::params::SpeedUpLevel;
use crate::regions::RegionData;
use crate::traits::{ChannelMode, SegmentationEngine};

/// Image registered through `define_image`, as the engine saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinedImage {
    pub pixels: Vec<u8>,
    pub mode: ChannelMode,
    pub rows: usize,
    pub cols: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentCall {
    pub spatial_radius: u32,
    pub range_radius: f32,
    pub min_density: u32,
    pub speed_up: SpeedUpLevel,
}

/// Call record shared between a [`MockEngine`] and the test inspecting it.
#[derive(Debug, Default)]
pub struct EngineLog {
    pub defined: Vec<DefinedImage>,
    pub segment_calls: Vec<SegmentCall>,
    pub results_calls: usize,
    pub regions_allocated: usize,
    pub regions_released: usize,
}

impl EngineLog {
    /// True when no engine method has been called at all.
    pub fn untouched(&self) -> bool {
        self.defined.is_empty()
            && self.segment_calls.is_empty()
            && self.results_calls == 0
            && self.regions_allocated == 0
    }

    pub fn outstanding_regions(&self) -> usize {
        self.regions_allocated - self.regions_released
    }
}

/// Deterministic stand-in engine for tests.
///
/// Segments by flat zones: 4-connected pixels with identical values form one
/// region, numbered in raster order. Radii, density and speed-up are recorded
/// but do not change the output.
#[derive(Debug, Default)]
pub struct MockEngine {
    image: Option<DefinedImage>,
    labels: Vec<i32>,
    modes: Vec<f32>,
    point_counts: Vec<i32>,
    means: Vec<u8>,
    forced_region_count: Option<i32>,
    log: Arc<Mutex<EngineLog>>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> Arc<Mutex<EngineLog>> {
        Arc::clone(&self.log)
    }

    /// Overrides the region count reported by `regions`.
    pub fn force_region_count(&mut self, count: i32) {
        self.forced_region_count = Some(count);
    }

    fn label_flat_zones(image: &DefinedImage) -> (Vec<i32>, usize) {
        let channels = image.mode.channels();
        let (rows, cols) = (image.rows, image.cols);
        let pixel = |index: usize| &image.pixels[index * channels..(index + 1) * channels];

        let mut labels = vec![-1i32; rows * cols];
        let mut next_label = 0i32;
        let mut queue = VecDeque::new();

        for start in 0..rows * cols {
            if labels[start] >= 0 {
                continue;
            }
            labels[start] = next_label;
            queue.push_back(start);

            while let Some(index) = queue.pop_front() {
                let (y, x) = (index / cols, index % cols);
                let neighbours = [
                    (y > 0).then(|| index - cols),
                    (y + 1 < rows).then(|| index + cols),
                    (x > 0).then(|| index - 1),
                    (x + 1 < cols).then(|| index + 1),
                ];
                for neighbour in neighbours.into_iter().flatten() {
                    if labels[neighbour] < 0 && pixel(neighbour) == pixel(index) {
                        labels[neighbour] = next_label;
                        queue.push_back(neighbour);
                    }
                }
            }
            next_label += 1;
        }

        (labels, next_label as usize)
    }
}

impl SegmentationEngine for MockEngine {
    fn define_image(&mut self, pixels: &[u8], mode: ChannelMode, rows: usize, cols: usize) {
        let image = DefinedImage {
            pixels: pixels.to_vec(),
            mode,
            rows,
            cols,
        };
        self.log.lock().defined.push(image.clone());
        self.image = Some(image);
    }

    fn segment(
        &mut self,
        spatial_radius: u32,
        range_radius: f32,
        min_density: u32,
        speed_up: SpeedUpLevel,
    ) {
        self.log.lock().segment_calls.push(SegmentCall {
            spatial_radius,
            range_radius,
            min_density,
            speed_up,
        });

        let Some(image) = self.image.as_ref() else {
            return;
        };
        let channels = image.mode.channels();
        let (labels, region_count) = Self::label_flat_zones(image);

        let mut sums = vec![0u64; region_count * channels];
        let mut counts = vec![0i32; region_count];
        for (index, &label) in labels.iter().enumerate() {
            let label = label as usize;
            counts[label] += 1;
            for c in 0..channels {
                sums[label * channels + c] += u64::from(image.pixels[index * channels + c]);
            }
        }

        self.modes = sums
            .iter()
            .enumerate()
            .map(|(i, &sum)| sum as f32 / counts[i / channels] as f32)
            .collect();
        self.means = labels
            .iter()
            .flat_map(|&label| {
                let start = label as usize * channels;
                self.modes[start..start + channels]
                    .iter()
                    .map(|m| m.round() as u8)
            })
            .collect();
        self.point_counts = counts;
        self.labels = labels;
    }

    fn results(&self, out: &mut [u8]) {
        self.log.lock().results_calls += 1;
        for (dst, src) in out.iter_mut().zip(&self.means) {
            *dst = *src;
        }
    }

    fn regions(&mut self) -> RegionData {
        self.log.lock().regions_allocated += 1;
        RegionData {
            labels: self.labels.clone().into_boxed_slice(),
            modes: self.modes.clone().into_boxed_slice(),
            mode_point_counts: self.point_counts.clone().into_boxed_slice(),
            region_count: self
                .forced_region_count
                .unwrap_or(self.point_counts.len() as i32),
        }
    }

    fn release_regions(&mut self, regions: RegionData) {
        self.log.lock().regions_released += 1;
        drop(regions);
    }
}
