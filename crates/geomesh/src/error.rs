//! # Mesh Construction Errors
//!
//! Every operation in this crate is a deterministic pure computation, so
//! there are no transient failures: an error always means the caller broke
//! an input contract.

/// Errors from reference-frame, tessellation and terrain operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeoMeshError {
    /// Non-finite numbers, zero/negative dimensions, length mismatches
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A geometry variant was supplied where a different kind is required
    #[error("Invalid geometry kind: expected {expected}, got {found}")]
    InvalidGeometryKind {
        expected: &'static str,
        found: &'static str,
    },
}

impl GeoMeshError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        GeoMeshError::InvalidInput(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, GeoMeshError>;

/// Fail with `InvalidInput` unless every value is finite
pub(crate) fn ensure_finite(what: &str, values: &[f64]) -> Result<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(GeoMeshError::invalid(format!("{what} must be finite, got {values:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_finite() {
        assert!(ensure_finite("origin", &[13.0, 52.0]).is_ok());
        assert!(matches!(
            ensure_finite("origin", &[f64::NAN, 52.0]),
            Err(GeoMeshError::InvalidInput(_))
        ));
        assert!(ensure_finite("origin", &[0.0, f64::INFINITY]).is_err());
    }

    #[test]
    fn test_display() {
        let err = GeoMeshError::InvalidGeometryKind { expected: "Polygon", found: "Point" };
        assert_eq!(err.to_string(), "Invalid geometry kind: expected Polygon, got Point");
    }
}
