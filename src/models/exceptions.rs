//! General model exceptions.

use thiserror_no_std::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum XRPLModelException {
    #[error("Expected {expected} bytes, found {found}")]
    UnexpectedLength { expected: usize, found: usize },
    #[error("Invalid hex encoding")]
    InvalidHex,
}

#[cfg(feature = "std")]
impl alloc::error::Error for XRPLModelException {}
