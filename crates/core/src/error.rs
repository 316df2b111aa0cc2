//! Error types raised by the gameplay rules.

use thiserror::Error;

/// Raised when a rules function receives arguments that indicate a
/// programming error in the caller. These are never retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// `weighted_random` was called without any items.
    #[error("weighted selection requires at least one item")]
    EmptyItems,
    /// Items and weights are not paired one-to-one.
    #[error("weighted selection got {items} items but {weights} weights")]
    LengthMismatch {
        /// Number of items supplied.
        items: usize,
        /// Number of weights supplied.
        weights: usize,
    },
    /// A weight was negative, NaN or infinite.
    #[error("weight at index {index} must be a finite, non-negative number")]
    InvalidWeight {
        /// Index of the offending weight.
        index: usize,
    },
    /// Every weight was zero, so nothing can be selected.
    #[error("weighted selection requires at least one positive weight")]
    ZeroTotalWeight,
}
