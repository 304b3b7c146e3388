//! Error types for the catalog crate.

use thiserror::Error;

/// Errors that can occur while loading or validating the static catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// I/O error occurred while reading a data file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A data file exists but is not valid JSON for the expected shape
    ///
    /// This variant stores the file name so a broken deployment can be
    /// traced back to the offending file quickly
    #[error("Parse error in {file}: {reason}")]
    ParseError { file: String, reason: String },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Referenced entity doesn't exist (e.g., curated pack without a genre)
    #[error("Missing reference: {entity} with id {id}")]
    MissingReference { entity: String, id: String },

    /// Data validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CatalogError::ParseError {
            file: "genres.json".to_string(),
            reason: "expected value".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Parse error in genres.json: expected value"
        );

        let err = CatalogError::InvalidValue {
            field: "mood weight".to_string(),
            value: "-1".to_string(),
        };
        assert!(err.to_string().contains("mood weight"));
    }

    #[test]
    fn test_io_error_conversion() {
        fn open_missing() -> Result<String> {
            let contents = std::fs::read_to_string("/definitely/not/here.json")?;
            Ok(contents)
        }

        match open_missing() {
            Err(CatalogError::IoError(_)) => {}
            other => panic!("expected IoError, got {:?}", other),
        }
    }
}
