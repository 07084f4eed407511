//! Error types for voronoi map generation

use std::fmt;

/// Errors that can occur during map generation or queries
#[derive(Debug, Clone)]
pub enum VoronoiError {
    /// Configuration validation failed
    InvalidConfig(String),
    /// No sites were supplied to the diagram computation
    NoSites,
    /// Generation failed due to geometry issues
    GenerationFailed(String),
    /// Requested cell ID does not exist
    CellNotFound(u32),
}

impl fmt::Display for VoronoiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoronoiError::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
            VoronoiError::NoSites => write!(f, "no sites supplied"),
            VoronoiError::GenerationFailed(msg) => write!(f, "generation failed: {}", msg),
            VoronoiError::CellNotFound(id) => write!(f, "cell not found: {}", id),
        }
    }
}

impl std::error::Error for VoronoiError {}

/// Result type alias for voronoi operations
pub type Result<T> = std::result::Result<T, VoronoiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VoronoiError::InvalidConfig("width must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "invalid configuration: width must be positive"
        );

        let err = VoronoiError::NoSites;
        assert_eq!(err.to_string(), "no sites supplied");

        let err = VoronoiError::CellNotFound(42);
        assert_eq!(err.to_string(), "cell not found: 42");
    }
}
