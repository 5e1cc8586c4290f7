//! Error types for the Crest core crate.

use std::fmt;

/// Top-level error type for crest-core operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CoreError {
    /// Range arithmetic failed.
    Range(RangeError),
    /// Balance algebra failed.
    Balance(BalanceError),
    /// Timeline data is malformed.
    Timeline(TimelineError),
    /// Serialization or deserialization failed.
    Serialization(SerializationError),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::Range(e) => write!(f, "range error: {}", e),
            CoreError::Balance(e) => write!(f, "balance error: {}", e),
            CoreError::Timeline(e) => write!(f, "timeline error: {}", e),
            CoreError::Serialization(e) => write!(f, "serialization error: {}", e),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<RangeError> for CoreError {
    fn from(e: RangeError) -> Self {
        CoreError::Range(e)
    }
}

impl From<BalanceError> for CoreError {
    fn from(e: BalanceError) -> Self {
        CoreError::Balance(e)
    }
}

impl From<TimelineError> for CoreError {
    fn from(e: TimelineError) -> Self {
        CoreError::Timeline(e)
    }
}

impl From<SerializationError> for CoreError {
    fn from(e: SerializationError) -> Self {
        CoreError::Serialization(e)
    }
}

/// Errors from closed-interval arithmetic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RangeError {
    /// `end` is less than `start`.
    InvalidBounds {
        /// The offending lower bound.
        start: u64,
        /// The offending upper bound.
        end: u64,
    },
    /// An offset pushed a bound past `u64::MAX`.
    Overflow,
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeError::InvalidBounds { start, end } => {
                write!(f, "invalid range bounds: start {} > end {}", start, end)
            }
            RangeError::Overflow => write!(f, "range offset overflows u64"),
        }
    }
}

impl std::error::Error for RangeError {}

/// Errors from balance algebra.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BalanceError {
    /// A subtraction would take a region below zero.
    InsufficientBalance {
        /// Amount the operation needed.
        needed: u64,
        /// Amount actually present on the region.
        available: u64,
    },
    /// An addition overflowed the amount type.
    AmountOverflow,
}

impl fmt::Display for BalanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BalanceError::InsufficientBalance { needed, available } => {
                write!(
                    f,
                    "insufficient balance: needed {}, available {}",
                    needed, available
                )
            }
            BalanceError::AmountOverflow => write!(f, "balance amount overflows u64"),
        }
    }
}

impl std::error::Error for BalanceError {}

/// Errors from timeline validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TimelineError {
    /// Two timeline entries claim the same instant.
    OverlappingTimes {
        /// An instant covered by more than one entry.
        instant: u64,
    },
}

impl fmt::Display for TimelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimelineError::OverlappingTimes { instant } => {
                write!(f, "timeline entries overlap at instant {}", instant)
            }
        }
    }
}

impl std::error::Error for TimelineError {}

/// Errors related to serialization and deserialization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SerializationError {
    /// Failed to encode data to bytes.
    EncodeFailed(String),
    /// Failed to decode data from bytes.
    DecodeFailed(String),
}

impl fmt::Display for SerializationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerializationError::EncodeFailed(msg) => write!(f, "encode failed: {}", msg),
            SerializationError::DecodeFailed(msg) => write!(f, "decode failed: {}", msg),
        }
    }
}

impl std::error::Error for SerializationError {}
