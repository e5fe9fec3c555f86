use thiserror::Error;

/// Structured error types for the mean shift front-ends.
///
/// Every variant is raised before the segmentation engine is invoked, except
/// `Engine`, which reports an engine that broke its output contract.
#[derive(Error, Debug)]
pub enum MeanShiftError {
    #[error("Validation error: {field} {reason}")]
    Validation { field: String, reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Shape error: {expected} (got shape {actual:?})")]
    Shape { expected: String, actual: Vec<usize> },

    #[error("Coercion error: {reason}")]
    Coercion { reason: String },

    #[error("Allocation error: {operation} failed")]
    Allocation {
        operation: String,
        #[source]
        source: ndarray::ShapeError,
    },

    #[error("Matrix error: {reason}")]
    Matrix { reason: String },

    #[error("Engine error: {reason}")]
    Engine { reason: String },

    #[error("Image error: {operation} failed")]
    Image {
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

pub type Result<T> = std::result::Result<T, MeanShiftError>;

impl MeanShiftError {
    pub(crate) fn validation(field: &str, reason: &str) -> Self {
        Self::Validation {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn matrix(reason: impl Into<String>) -> Self {
        Self::Matrix {
            reason: reason.into(),
        }
    }

    pub(crate) fn engine(reason: impl Into<String>) -> Self {
        Self::Engine {
            reason: reason.into(),
        }
    }
}

/// Output buffers are built from shape + vec, so a shape error means the
/// output could not be allocated with the requested layout.
impl From<ndarray::ShapeError> for MeanShiftError {
    fn from(err: ndarray::ShapeError) -> Self {
        Self::Allocation {
            operation: "output buffer allocation".to_string(),
            source: err,
        }
    }
}

impl From<image::ImageError> for MeanShiftError {
    fn from(err: image::ImageError) -> Self {
        Self::Image {
            operation: "image conversion".to_string(),
            source: Box::new(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message() {
        let err = MeanShiftError::validation(
            "spatial_radius",
            "Spatial radius must be greater or equal to zero",
        );
        assert_eq!(
            err.to_string(),
            "Validation error: spatial_radius Spatial radius must be greater or equal to zero"
        );
    }

    #[test]
    fn test_shape_error_converts_to_allocation() {
        let shape_err = ndarray::Array2::<u8>::from_shape_vec((2, 2), vec![0; 3]).unwrap_err();
        let err: MeanShiftError = shape_err.into();
        assert!(matches!(err, MeanShiftError::Allocation { .. }));
    }
}
