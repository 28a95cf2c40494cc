use thiserror::Error;

/// Broad classification of a fatal run failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No usable date axis.
    Configuration,
    /// Empty source.
    DataIntegrity,
    /// Malformed input.
    InvalidInput,
}

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("no date columns found among {columns} columns (positional fallback included)")]
    NoDateColumns { columns: usize },

    #[error("input table has no rows")]
    EmptyInput,

    #[error("required column {0:?} not found in header row")]
    MissingColumn(String),
}

impl TransformError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoDateColumns { .. } => ErrorKind::Configuration,
            Self::EmptyInput => ErrorKind::DataIntegrity,
            Self::MissingColumn(_) => ErrorKind::InvalidInput,
        }
    }
}

pub type TransformResult<T> = Result<T, TransformError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_are_distinct() {
        assert_eq!(TransformError::NoDateColumns { columns: 3 }.kind(), ErrorKind::Configuration);
        assert_eq!(TransformError::EmptyInput.kind(), ErrorKind::DataIntegrity);
        assert_eq!(
            TransformError::MissingColumn("Tariff".into()).kind(),
            ErrorKind::InvalidInput
        );
    }

    #[test]
    fn test_message_names_column() {
        let msg = TransformError::MissingColumn("Tarifa".into()).to_string();
        assert!(msg.contains("Tarifa"));
    }
}
