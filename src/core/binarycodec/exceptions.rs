//! General binary codec exceptions.

use thiserror_no_std::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum XRPLBinaryCodecException {
    #[error("Unexpected end of bytes")]
    UnexpectedEndOfBytes,
    #[error("Unknown field (type {type_code}, field {field_code})")]
    UnknownField { type_code: u8, field_code: u8 },
    #[error("Field out of canonical order (type {type_code}, field {field_code})")]
    FieldOutOfOrder { type_code: u8, field_code: u8 },
    #[error("Missing required field `{name}`")]
    MissingField { name: &'static str },
    #[error("Unexpected ledger entry type {found:#06X}")]
    UnexpectedLedgerEntryType { found: u16 },
    #[error("Invalid variable length prefix")]
    InvalidVariableLengthPrefix,
    #[error("Variable length field exceeds {max} bytes")]
    VariableLengthTooLong { max: usize },
    #[error("Unexpected variable length payload (expected {expected}, found {found})")]
    UnexpectedPayloadLength { expected: usize, found: usize },
    #[error("Payload is not a multiple of {multiple} bytes")]
    InvalidLengthMultiple { multiple: usize },
    #[error("Amount bits are not a native quantity")]
    InvalidAmountBits,
    #[error("Unexpected end marker {found:#04X}")]
    UnexpectedMarker { found: u8 },
}

#[cfg(feature = "std")]
impl alloc::error::Error for XRPLBinaryCodecException {}
