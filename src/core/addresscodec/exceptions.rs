//! General address codec exceptions.

use thiserror_no_std::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum XRPLAddressCodecException {
    #[error("Invalid encoding prefix")]
    InvalidEncodingPrefix,
    #[error("Unexpected payload length (expected {expected}, found {found})")]
    UnexpectedPayloadLength { expected: usize, found: usize },
    #[error("Base58 decode error: {0}")]
    Base58DecodeError(#[from] bs58::decode::Error),
}

#[cfg(feature = "std")]
impl alloc::error::Error for XRPLAddressCodecException {}
