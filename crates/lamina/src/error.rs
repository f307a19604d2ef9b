//! Error types for lamina.
//!
//! All fallible operations in the crate return [`Result`], built on a single
//! [`LaminaError`] enum:
//!
//! - Use `thiserror` for automatic `Error` trait implementation
//! - Preserve error chains with `#[source]` attributes
//! - Include context in error messages (file paths, page numbers, etc.)
//!
//! # Error Handling Philosophy
//!
//! **System errors MUST always bubble up unchanged:**
//! - `LaminaError::Io` (from `std::io::Error`) - file system errors, permission errors
//! - These indicate real system problems and are never wrapped or suppressed
//!
//! **Application errors are wrapped with context:**
//! - `Validation` - bad input roots, out-of-range page indices
//! - `Parse` - corrupt or unreadable documents; fatal to that one document
//! - `Inference` - layout model failures; same isolation as `Parse`
//! - `Storage` - asset or artifact persistence failures; fatal to that document
//!
//! `Parse`, `Inference` and `Storage` errors are isolated at the batch
//! boundary: they are logged with file-identifying context, count the file as
//! failed, and never abort sibling files.
use thiserror::Error;

/// Result type alias using `LaminaError`.
pub type Result<T> = std::result::Result<T, LaminaError>;

/// Main error type for all lamina operations.
#[derive(Debug, Error)]
pub enum LaminaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Parse error: {message}")]
    Parse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Inference error: {message}")]
    Inference {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for LaminaError {
    fn from(err: serde_json::Error) -> Self {
        LaminaError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(feature = "pdf")]
impl From<crate::pdf::error::PdfError> for LaminaError {
    fn from(err: crate::pdf::error::PdfError) -> Self {
        LaminaError::Parse {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

macro_rules! error_constructor {
    ($name:ident, $name_with_source:ident, $variant:ident) => {
        #[doc = concat!("Create a `", stringify!($variant), "` error.")]
        pub fn $name<S: Into<String>>(message: S) -> Self {
            Self::$variant {
                message: message.into(),
                source: None,
            }
        }

        #[doc = concat!("Create a `", stringify!($variant), "` error with a source.")]
        pub fn $name_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
            message: S,
            source: E,
        ) -> Self {
            Self::$variant {
                message: message.into(),
                source: Some(Box::new(source)),
            }
        }
    };
}

impl LaminaError {
    error_constructor!(validation, validation_with_source, Validation);
    error_constructor!(parse, parse_with_source, Parse);
    error_constructor!(inference, inference_with_source, Inference);
    error_constructor!(storage, storage_with_source, Storage);
    error_constructor!(serialization, serialization_with_source, Serialization);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: LaminaError = io_err.into();
        assert!(matches!(err, LaminaError::Io(_)));
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn test_validation_error() {
        let err = LaminaError::validation("invalid input root");
        assert_eq!(err.to_string(), "Validation error: invalid input root");
    }

    #[test]
    fn test_parse_error_with_source() {
        let source = std::io::Error::new(std::io::ErrorKind::InvalidData, "bad xref");
        let err = LaminaError::parse_with_source("corrupt document", source);
        assert_eq!(err.to_string(), "Parse error: corrupt document");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_inference_error() {
        let err = LaminaError::inference("model rejected tensor shape");
        assert_eq!(err.to_string(), "Inference error: model rejected tensor shape");
    }

    #[test]
    fn test_storage_error_with_source() {
        let source = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "cannot write");
        let err = LaminaError::storage_with_source("asset write failed", source);
        assert_eq!(err.to_string(), "Storage error: asset write failed");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: LaminaError = json_err.into();
        assert!(matches!(err, LaminaError::Serialization { .. }));
        assert!(err.to_string().contains("Serialization error"));
    }

    #[test]
    fn test_unsupported_format_error() {
        let err = LaminaError::UnsupportedFormat("application/x-unknown".to_string());
        assert_eq!(err.to_string(), "Unsupported format: application/x-unknown");
    }

    #[test]
    fn test_io_error_bubbles_unchanged() {
        fn read_file() -> Result<Vec<u8>> {
            let content = std::fs::read("/nonexistent/file.bin")?;
            Ok(content)
        }

        let result = read_file();
        assert!(matches!(result.unwrap_err(), LaminaError::Io(_)));
    }
}
