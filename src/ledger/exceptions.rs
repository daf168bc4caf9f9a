//! General ledger state exceptions.

use thiserror_no_std::Error;

use crate::core::binarycodec::exceptions::XRPLBinaryCodecException;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum XRPLLedgerException {
    #[error("Entry already exists")]
    EntryExists,
    #[error("Entry not found")]
    EntryNotFound,
    #[error("Malformed entry: {0}")]
    MalformedEntry(#[from] XRPLBinaryCodecException),
}

#[cfg(feature = "std")]
impl alloc::error::Error for XRPLLedgerException {}
