use std::fmt;

use crate::errors::{MeanShiftError, Result};

/// No filtering optimization.
pub const SPEEDUP_NO: u32 = 0;
/// Medium filtering optimization.
pub const SPEEDUP_MEDIUM: u32 = 1;
/// High filtering optimization (default).
pub const SPEEDUP_HIGH: u32 = 2;

const SPATIAL_RADIUS_REASON: &str = "Spatial radius must be greater or equal to zero";
const RANGE_RADIUS_REASON: &str = "Range radius must be greater or equal to zero";
const RANGE_RADIUS_FINITE_REASON: &str = "Range radius must fit in a finite 32-bit float";
const SPEED_UP_REASON: &str =
    "Speedup level must be 0 (no speedup), 1 (medium speedup), or 2 (high speedup)";

/// Speed-up tier handed to the engine. Higher tiers trade accuracy for runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SpeedUpLevel {
    None,
    Medium,
    #[default]
    High,
}

impl SpeedUpLevel {
    /// Lenient mapping used once validation has run: anything outside 0..=2
    /// falls back to `High`.
    pub const fn from_raw(value: u32) -> Self {
        match value {
            SPEEDUP_NO => Self::None,
            SPEEDUP_MEDIUM => Self::Medium,
            _ => Self::High,
        }
    }

    pub const fn as_raw(self) -> u32 {
        match self {
            Self::None => SPEEDUP_NO,
            Self::Medium => SPEEDUP_MEDIUM,
            Self::High => SPEEDUP_HIGH,
        }
    }
}

impl TryFrom<u32> for SpeedUpLevel {
    type Error = MeanShiftError;

    fn try_from(value: u32) -> Result<Self> {
        if value > SPEEDUP_HIGH {
            return Err(MeanShiftError::validation("speed_up", SPEED_UP_REASON));
        }
        Ok(Self::from_raw(value))
    }
}

impl fmt::Display for SpeedUpLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Medium => "medium",
            Self::High => "high",
        };
        f.write_str(name)
    }
}

/// Caller-facing segmentation parameters.
///
/// Values are kept as the caller supplied them (signed radii, raw speed-up
/// integer) so that every façade validates through the same path before the
/// engine sees anything.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentParams {
    /// Spatial radius of the search window, in pixels.
    pub spatial_radius: i32,
    /// Range radius of the search window, in colour units.
    pub range_radius: f64,
    /// Minimum point density of a region in the segmented image.
    pub min_density: u32,
    /// Speed-up level, see [`SPEEDUP_NO`], [`SPEEDUP_MEDIUM`], [`SPEEDUP_HIGH`].
    pub speed_up: u32,
}

impl Default for SegmentParams {
    fn default() -> Self {
        Self::new(0, 0.0, 0)
    }
}

impl SegmentParams {
    pub const fn new(spatial_radius: i32, range_radius: f64, min_density: u32) -> Self {
        Self {
            spatial_radius,
            range_radius,
            min_density,
            speed_up: SPEEDUP_HIGH,
        }
    }

    pub const fn with_speed_up(mut self, speed_up: u32) -> Self {
        self.speed_up = speed_up;
        self
    }

    /// Full validation: radii first, then the speed-up level.
    pub fn validate(&self) -> Result<ValidatedParams> {
        let (spatial_radius, range_radius) = self.validate_radii()?;
        let speed_up = SpeedUpLevel::try_from(self.speed_up)?;

        Ok(ValidatedParams {
            spatial_radius,
            range_radius,
            min_density: self.min_density,
            speed_up,
        })
    }

    /// Radius checks only. The speed-up level is mapped leniently.
    pub fn validate_lenient(&self) -> Result<ValidatedParams> {
        let (spatial_radius, range_radius) = self.validate_radii()?;

        Ok(ValidatedParams {
            spatial_radius,
            range_radius,
            min_density: self.min_density,
            speed_up: SpeedUpLevel::from_raw(self.speed_up),
        })
    }

    pub fn validate_radii(&self) -> Result<(u32, f32)> {
        Ok((
            check_spatial_radius(self.spatial_radius)?,
            check_range_radius(self.range_radius)?,
        ))
    }
}

/// Spatial radius as the engine takes it, rejected when negative.
pub fn check_spatial_radius(value: i32) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| MeanShiftError::validation("spatial_radius", SPATIAL_RADIUS_REASON))
}

/// Range radius narrowed to `f32`.
///
/// NaN and negative values are rejected, and so is anything that is not
/// finite once narrowed (infinity, or a finite `f64` above `f32::MAX`).
pub fn check_range_radius(value: f64) -> Result<f32> {
    if value.is_nan() || value < 0.0 {
        return Err(MeanShiftError::validation("range_radius", RANGE_RADIUS_REASON));
    }
    let narrowed = value as f32;
    if !narrowed.is_finite() {
        return Err(MeanShiftError::validation("range_radius", RANGE_RADIUS_FINITE_REASON));
    }
    Ok(narrowed)
}

/// Parameters in the exact form the engine consumes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidatedParams {
    pub spatial_radius: u32,
    pub range_radius: f32,
    pub min_density: u32,
    pub speed_up: SpeedUpLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_up_strict_mapping() -> Result<()> {
        assert_eq!(SpeedUpLevel::try_from(0)?, SpeedUpLevel::None);
        assert_eq!(SpeedUpLevel::try_from(1)?, SpeedUpLevel::Medium);
        assert_eq!(SpeedUpLevel::try_from(2)?, SpeedUpLevel::High);
        assert!(SpeedUpLevel::try_from(3).is_err());
        Ok(())
    }

    #[test]
    fn test_speed_up_fallback() {
        assert_eq!(SpeedUpLevel::from_raw(3), SpeedUpLevel::High);
        assert_eq!(SpeedUpLevel::from_raw(u32::MAX), SpeedUpLevel::High);
        assert_eq!(SpeedUpLevel::from_raw(1).as_raw(), SPEEDUP_MEDIUM);
    }

    #[test]
    fn test_default_speed_up_is_high() {
        let params = SegmentParams::new(2, 5.0, 10);
        assert_eq!(params.speed_up, SPEEDUP_HIGH);
        assert_eq!(SpeedUpLevel::default(), SpeedUpLevel::High);
    }

    #[test]
    fn test_validate_rejects_negative_radii() {
        let err = SegmentParams::new(-1, 5.0, 10).validate().unwrap_err();
        assert!(
            matches!(err, MeanShiftError::Validation { ref field, .. } if field == "spatial_radius")
        );

        let err = SegmentParams::new(1, -0.5, 10).validate().unwrap_err();
        assert!(
            matches!(err, MeanShiftError::Validation { ref field, .. } if field == "range_radius")
        );

        let err = SegmentParams::new(1, f64::NAN, 10).validate().unwrap_err();
        assert!(
            matches!(err, MeanShiftError::Validation { ref field, .. } if field == "range_radius")
        );
    }

    #[test]
    fn test_range_radius_must_stay_finite() {
        for value in [f64::INFINITY, f64::MAX, 1e39] {
            let err = SegmentParams::new(1, value, 10).validate_lenient().unwrap_err();
            assert!(
                matches!(err, MeanShiftError::Validation { ref field, .. } if field == "range_radius")
            );
        }
        assert_eq!(check_range_radius(f64::from(f32::MAX)).ok(), Some(f32::MAX));
    }

    #[test]
    fn test_validate_checks_radii_before_speed_up() {
        let err = SegmentParams::new(-1, 5.0, 10)
            .with_speed_up(9)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("Spatial radius"));
    }

    #[test]
    fn test_validate_lenient_accepts_any_speed_up() -> Result<()> {
        let validated = SegmentParams::new(3, 4.5, 7)
            .with_speed_up(7)
            .validate_lenient()?;
        assert_eq!(validated.speed_up, SpeedUpLevel::High);
        assert_eq!(validated.spatial_radius, 3);
        assert_eq!(validated.range_radius, 4.5);
        assert_eq!(validated.min_density, 7);
        Ok(())
    }
}
