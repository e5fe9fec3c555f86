use std::fmt;

use ndarray::{ArrayBase, Data, Dimension};
use num_traits::NumCast;

use crate::array::{self, Segmentation};
use crate::errors::{MeanShiftError, Result};
use crate::params::{
    check_range_radius, check_spatial_radius, SegmentParams, SpeedUpLevel, SPEEDUP_HIGH,
};
use crate::traits::SegmentationEngine;

/// Reusable parameter set for repeated segmentation calls.
///
/// Each setter validates its value, and `segment` refuses to run until the
/// spatial radius, range radius and minimum density have all been set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segmenter {
    spatial_radius: Option<i32>,
    range_radius: Option<f64>,
    min_density: Option<u32>,
    speed_up: u32,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self {
            spatial_radius: None,
            range_radius: None,
            min_density: None,
            speed_up: SPEEDUP_HIGH,
        }
    }
}

impl Segmenter {
    pub fn new(spatial_radius: i32, range_radius: f64, min_density: i64) -> Result<Self> {
        let mut segmenter = Self::default();
        segmenter.set_spatial_radius(spatial_radius)?;
        segmenter.set_range_radius(range_radius)?;
        segmenter.set_min_density(min_density)?;
        Ok(segmenter)
    }

    pub fn with_speed_up(mut self, speed_up: u32) -> Result<Self> {
        self.set_speed_up(speed_up)?;
        Ok(self)
    }

    pub const fn spatial_radius(&self) -> Option<i32> {
        self.spatial_radius
    }

    pub fn set_spatial_radius(&mut self, value: i32) -> Result<()> {
        check_spatial_radius(value)?;
        self.spatial_radius = Some(value);
        Ok(())
    }

    pub const fn range_radius(&self) -> Option<f64> {
        self.range_radius
    }

    pub fn set_range_radius(&mut self, value: f64) -> Result<()> {
        check_range_radius(value)?;
        self.range_radius = Some(value);
        Ok(())
    }

    pub const fn min_density(&self) -> Option<u32> {
        self.min_density
    }

    pub fn set_min_density(&mut self, value: i64) -> Result<()> {
        let value = u32::try_from(value).map_err(|_| {
            MeanShiftError::validation(
                "min_density",
                "Minimum density must be greater or equal to zero",
            )
        })?;
        self.min_density = Some(value);
        Ok(())
    }

    pub const fn speed_up(&self) -> u32 {
        self.speed_up
    }

    pub fn set_speed_up(&mut self, value: u32) -> Result<()> {
        self.speed_up = SpeedUpLevel::try_from(value)?.as_raw();
        Ok(())
    }

    /// Parameters for one request, or a configuration error naming the first
    /// missing value.
    pub fn params(&self) -> Result<SegmentParams> {
        let missing = |message: &str| MeanShiftError::Configuration {
            message: message.to_string(),
        };
        let spatial_radius = self
            .spatial_radius
            .ok_or_else(|| missing("Spatial radius has not been set"))?;
        let range_radius = self
            .range_radius
            .ok_or_else(|| missing("Range radius has not been set"))?;
        let min_density = self
            .min_density
            .ok_or_else(|| missing("Minimum density has not been set"))?;

        Ok(SegmentParams::new(spatial_radius, range_radius, min_density)
            .with_speed_up(self.speed_up))
    }

    pub fn segment<E, S, D, T>(
        &self,
        engine: &mut E,
        image: &ArrayBase<S, D>,
    ) -> Result<Segmentation<D>>
    where
        E: SegmentationEngine + ?Sized,
        S: Data<Elem = T>,
        D: Dimension,
        T: Copy + NumCast + PartialEq,
    {
        array::segment(engine, image, &self.params()?)
    }
}

struct Unset<'a, T>(&'a Option<T>);

impl<T: fmt::Display> fmt::Display for Unset<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => value.fmt(f),
            None => f.write_str("None"),
        }
    }
}

impl fmt::Display for Segmenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Segmenter: spatial_radius={}, range_radius={}, min_density={}, speedup_level={}>",
            Unset(&self.spatial_radius),
            Unset(&self.range_radius),
            Unset(&self.min_density),
            self.speed_up
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::MockEngine;
    use ndarray::Array2;

    #[test]
    fn test_setters_validate() {
        let mut segmenter = Segmenter::default();
        assert!(segmenter.set_spatial_radius(-1).is_err());
        assert!(segmenter.set_range_radius(-0.1).is_err());
        assert!(segmenter.set_range_radius(f64::INFINITY).is_err());
        assert!(segmenter.set_min_density(-5).is_err());
        assert!(segmenter.set_speed_up(3).is_err());
        assert_eq!(segmenter, Segmenter::default());
    }

    #[test]
    fn test_setter_errors_match_request_validation() {
        let mut segmenter = Segmenter::default();
        let setter = segmenter.set_spatial_radius(-3).unwrap_err();
        let request = SegmentParams::new(-3, 1.0, 0).validate().unwrap_err();
        assert_eq!(setter.to_string(), request.to_string());

        let setter = segmenter.set_range_radius(-2.0).unwrap_err();
        let request = SegmentParams::new(1, -2.0, 0).validate().unwrap_err();
        assert_eq!(setter.to_string(), request.to_string());
    }

    #[test]
    fn test_unset_parameters_are_reported() {
        let mut engine = MockEngine::new();
        let image = Array2::<u8>::zeros((2, 2));
        let mut segmenter = Segmenter::default();

        let err = segmenter.segment(&mut engine, &image).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: Spatial radius has not been set"
        );

        segmenter.set_spatial_radius(3).unwrap();
        segmenter.set_range_radius(4.0).unwrap();
        let err = segmenter.segment(&mut engine, &image).unwrap_err();
        assert!(err.to_string().contains("Minimum density"));
        assert!(engine.log().lock().untouched());
    }

    #[test]
    fn test_segment_delegates() -> Result<()> {
        let mut engine = MockEngine::new();
        let image = Array2::<u8>::from_elem((3, 3), 42);
        let segmenter = Segmenter::new(6, 4.5, 50)?.with_speed_up(1)?;

        let result = segmenter.segment(&mut engine, &image)?;
        assert_eq!(result.region_count, 1);

        let log = engine.log();
        let log = log.lock();
        assert_eq!(log.segment_calls[0].speed_up, SpeedUpLevel::Medium);
        assert_eq!(log.segment_calls[0].min_density, 50);
        Ok(())
    }

    #[test]
    fn test_display() -> Result<()> {
        assert_eq!(
            Segmenter::default().to_string(),
            "<Segmenter: spatial_radius=None, range_radius=None, min_density=None, speedup_level=2>"
        );
        assert_eq!(
            Segmenter::new(6, 4.5, 50)?.to_string(),
            "<Segmenter: spatial_radius=6, range_radius=4.5, min_density=50, speedup_level=2>"
        );
        Ok(())
    }
}
