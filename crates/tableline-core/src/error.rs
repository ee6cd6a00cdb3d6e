//! Error type shared by every pipeline stage

use std::path::PathBuf;

/// Error from loading, validating, merging or publishing restaurant records.
///
/// Every variant is terminal for a run: the pipeline performs no local
/// recovery, so each one carries enough context (offending value, identifier
/// or path) to diagnose the input without re-running.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Source file missing or unreadable.
    #[error("cannot read {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Structural input does not match the declared schema.
    #[error("schema violation: {0}")]
    SchemaViolation(String),

    /// Malformed document or row.
    #[error("decode error: {0}")]
    Decode(String),

    /// A token outside the closed vocabulary of an enumerated field.
    #[error("unknown {kind} {value:?}")]
    UnknownEnumValue { kind: &'static str, value: String },

    /// Content row whose identifier has no structural record.
    #[error("unknown restaurant with ID {0}")]
    UnmatchedIdentifier(i64),

    /// Structural record that never received content attributes.
    #[error("restaurant with ID {0} has no content row")]
    IncompleteRecord(i64),

    /// Search index call failed.
    #[error("publisher: {0}")]
    Publisher(String),
}

impl PipelineError {
    pub fn unknown_payment_option(value: &str) -> Self {
        Self::UnknownEnumValue {
            kind: "payment option",
            value: value.to_string(),
        }
    }

    pub fn unknown_price_range(value: &str) -> Self {
        Self::UnknownEnumValue {
            kind: "price range",
            value: value.to_string(),
        }
    }

    /// Short label for the error kind, logged by the CLI when a run fails.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FileAccess { .. } => "file_access",
            Self::SchemaViolation(_) => "schema_violation",
            Self::Decode(_) => "decode",
            Self::UnknownEnumValue { .. } => "unknown_enum_value",
            Self::UnmatchedIdentifier(_) => "unmatched_identifier",
            Self::IncompleteRecord(_) => "incomplete_record",
            Self::Publisher(_) => "publisher",
        }
    }
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;

    #[test]
    fn display_unknown_payment_option_quotes_value() {
        let err = PipelineError::unknown_payment_option("Bitcoin");
        assert_eq!(format!("{err}"), r#"unknown payment option "Bitcoin""#);
    }

    #[test]
    fn display_unknown_price_range_quotes_value() {
        let err = PipelineError::unknown_price_range("$100+");
        assert_eq!(format!("{err}"), r#"unknown price range "$100+""#);
    }

    #[test]
    fn display_unmatched_identifier() {
        let err = PipelineError::UnmatchedIdentifier(3);
        assert_eq!(format!("{err}"), "unknown restaurant with ID 3");
    }

    #[test]
    fn display_file_access_includes_path() {
        let err = PipelineError::FileAccess {
            path: PathBuf::from("/data/list.json"),
            source: std::io::Error::new(ErrorKind::NotFound, "not found"),
        };
        let msg = format!("{err}");
        assert!(msg.contains("/data/list.json"));
        assert!(msg.contains("not found"));
    }

    #[test]
    fn kind_labels() {
        assert_eq!(PipelineError::Decode("x".into()).kind(), "decode");
        assert_eq!(
            PipelineError::unknown_price_range("x").kind(),
            "unknown_enum_value"
        );
        assert_eq!(PipelineError::Publisher("x".into()).kind(), "publisher");
    }
}
