//! Error taxonomy for the ReadNext engine
//!
//! Index and shape errors are detected eagerly at API boundaries. Numeric
//! degeneracies (zero-norm rows, empty neighborhoods) are not errors; they
//! resolve to documented fallback values in the components that hit them.

/// Errors produced by the rating prediction engine.
#[derive(Debug, thiserror::Error)]
pub enum ReadNextError {
    /// A user or item index outside the declared dense range.
    #[error("{axis} index {index} out of range (size {len})")]
    InvalidIndex {
        axis: &'static str,
        index: usize,
        len: usize,
    },

    /// The factor trainer was handed an empty training set.
    #[error("training set is empty")]
    NoTrainingData,

    /// Two sequences or matrix dimensions that must agree do not.
    #[error("length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    /// Configuration value failed parsing or validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, ReadNextError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_index_message() {
        let err = ReadNextError::InvalidIndex {
            axis: "user",
            index: 7,
            len: 3,
        };
        assert_eq!(err.to_string(), "user index 7 out of range (size 3)");
    }

    #[test]
    fn test_length_mismatch_message() {
        let err = ReadNextError::LengthMismatch { left: 5, right: 4 };
        assert_eq!(err.to_string(), "length mismatch: 5 vs 4");
    }

    #[test]
    fn test_no_training_data_message() {
        assert_eq!(
            ReadNextError::NoTrainingData.to_string(),
            "training set is empty"
        );
    }
}
