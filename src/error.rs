//! Error types for melody analysis

use std::fmt;
use std::io;

/// Errors that can occur while turning a melody file into notes
#[derive(Debug)]
pub enum AnalysisError {
    /// Reading audio or writing notes failed
    Io(io::Error),

    /// The audio container or codec could not be decoded
    Decoding(String),

    /// Invalid input parameters (empty audio, zero sample rate, ...)
    InvalidInput(String),

    /// FFT or resampling failure
    Processing(String),

    /// Note sequence could not be encoded or decoded as JSON
    Serialization(serde_json::Error),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::Io(err) => write!(f, "I/O error: {}", err),
            AnalysisError::Decoding(msg) => write!(f, "Decoding error: {}", msg),
            AnalysisError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AnalysisError::Processing(msg) => write!(f, "Processing error: {}", msg),
            AnalysisError::Serialization(err) => write!(f, "Serialization error: {}", err),
        }
    }
}

impl std::error::Error for AnalysisError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AnalysisError::Io(err) => Some(err),
            AnalysisError::Serialization(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for AnalysisError {
    fn from(err: io::Error) -> Self {
        AnalysisError::Io(err)
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        AnalysisError::Serialization(err)
    }
}

impl From<hound::Error> for AnalysisError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(err) => AnalysisError::Io(err),
            other => AnalysisError::Decoding(other.to_string()),
        }
    }
}

impl From<symphonia::core::errors::Error> for AnalysisError {
    fn from(err: symphonia::core::errors::Error) -> Self {
        match err {
            symphonia::core::errors::Error::IoError(err) => AnalysisError::Io(err),
            other => AnalysisError::Decoding(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind() {
        let err = AnalysisError::InvalidInput("Empty audio samples".to_string());
        assert_eq!(err.to_string(), "Invalid input: Empty audio samples");

        let err = AnalysisError::Decoding("bad header".to_string());
        assert_eq!(err.to_string(), "Decoding error: bad header");
    }

    #[test]
    fn test_io_errors_keep_source() {
        let err: AnalysisError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        assert!(matches!(err, AnalysisError::Io(_)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_hound_io_error_maps_to_io() {
        let err: AnalysisError =
            hound::Error::IoError(io::Error::new(io::ErrorKind::NotFound, "missing")).into();
        assert!(matches!(err, AnalysisError::Io(_)));

        let err: AnalysisError = hound::Error::FormatError("no RIFF tag found").into();
        assert!(matches!(err, AnalysisError::Decoding(_)));
    }
}
