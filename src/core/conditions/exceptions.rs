//! General crypto-condition exceptions.

use thiserror_no_std::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum XRPLConditionException {
    #[error("Unexpected tag (expected {expected:#04X}, found {found:#04X})")]
    UnexpectedTag { expected: u8, found: u8 },
    #[error("Unexpected end of input")]
    UnexpectedEndOfInput,
    #[error("Indefinite lengths are not allowed")]
    IndefiniteLength,
    #[error("Length overflow")]
    LengthOverflow,
    #[error("Trailing bytes after the outer element")]
    TrailingBytes,
    #[error("Serialized form exceeds {limit} bytes")]
    TooLong { limit: usize },
    #[error("Fingerprint must be 32 bytes, found {found}")]
    BadFingerprintLength { found: usize },
    #[error("Preimage exceeds {limit} bytes")]
    PreimageTooLong { limit: usize },
    #[error("The fulfillment does not satisfy the condition")]
    ConditionMismatch,
}

#[cfg(feature = "std")]
impl alloc::error::Error for XRPLConditionException {}
