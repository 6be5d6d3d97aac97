use thiserror::Error;

use crate::shape::Shape;

/// Recoverable failures surfaced to the caller.
///
/// Programmer errors such as mismatched kernel operands or out-of-range
/// indices are not represented here; those abort through the assertion
/// macros in [`crate::macros`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TensorError {
    #[error("inconsistent dimensions. expected: {expected}, received: {received}")]
    InconsistentDimensions { expected: Shape, received: Shape },

    #[error("space out of range: offset {offset} + len {len} exceeds {available}")]
    OutOfRange {
        offset: usize,
        len: usize,
        available: usize,
    },

    #[error("memory handling violation: {why}")]
    MemoryViolation { why: String },

    #[error("failed to perform {op}: {why}")]
    InvalidOp { op: &'static str, why: String },
}

pub type Result<T> = std::result::Result<T, TensorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failure() {
        let err = TensorError::OutOfRange {
            offset: 4,
            len: 3,
            available: 6,
        };
        assert_eq!(
            err.to_string(),
            "space out of range: offset 4 + len 3 exceeds 6"
        );

        let err = TensorError::InconsistentDimensions {
            expected: Shape::from((2, 3)),
            received: Shape::from((2, 1)),
        };
        assert_eq!(
            err.to_string(),
            "inconsistent dimensions. expected: Shape(2, 3), received: Shape(2, 1)"
        );
    }
}
