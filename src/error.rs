//! Error types for pagemark library.

use std::io;
use thiserror::Error;

/// Result type alias for pagemark operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while rendering, measuring or exporting pages.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The measurement surface is not mounted, detached, or has no width.
    #[error("Measurement unavailable: {0}")]
    MeasurementUnavailable(String),

    /// Rendered markup could not be tokenised into block elements.
    #[error("Malformed markup: {0}")]
    MalformedMarkup(String),

    /// Document frontmatter could not be parsed.
    #[error("Frontmatter error: {0}")]
    Frontmatter(String),

    /// Error while rendering document content or print output.
    #[error("Rendering error: {0}")]
    Render(String),

    /// The page format name is not one of the supported formats.
    #[error("Unknown page format: {0} (expected \"A4\" or \"Letter\")")]
    UnknownPageFormat(String),

    /// A theme token is out of range.
    #[error("Invalid theme: {0}")]
    InvalidTheme(String),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::MalformedMarkup(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Frontmatter(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnknownPageFormat("A5".into());
        assert_eq!(
            err.to_string(),
            "Unknown page format: A5 (expected \"A4\" or \"Letter\")"
        );

        let err = Error::MeasurementUnavailable("surface has zero width".into());
        assert_eq!(
            err.to_string(),
            "Measurement unavailable: surface has zero width"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_err = serde_yaml::from_str::<Vec<u32>>("[1, two").unwrap_err();
        let err: Error = yaml_err.into();
        assert!(matches!(err, Error::Frontmatter(_)));
    }
}
