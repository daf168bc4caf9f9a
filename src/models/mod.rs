//! Top-level modules for the models package.

pub mod exceptions;
#[allow(clippy::too_many_arguments)]
pub mod ledger;
#[allow(clippy::too_many_arguments)]
pub mod transactions;

use core::fmt;

use alloc::string::String;

use crate::constants::{ACCOUNT_ID_LENGTH, LEDGER_KEY_LENGTH};
use crate::core::addresscodec::{decode_classic_address, encode_classic_address};
use crate::core::addresscodec::exceptions::XRPLAddressCodecException;
use crate::models::exceptions::XRPLModelException;

/// Quantity of the native asset, in drops.
pub type Drops = u64;

/// A 20-byte account identifier. The textual form is a base58check
/// classic address beginning with `r`; the all-zero id is reserved
/// as "no account".
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AccountId(pub [u8; ACCOUNT_ID_LENGTH]);

impl AccountId {
    /// The reserved "no account" id.
    pub const ZERO: AccountId = AccountId([0; ACCOUNT_ID_LENGTH]);

    /// Decodes a classic address into an account id.
    pub fn from_address(address: &str) -> Result<Self, XRPLAddressCodecException> {
        let decoded = decode_classic_address(address)?;
        let mut bytes = [0; ACCOUNT_ID_LENGTH];
        bytes.copy_from_slice(&decoded);

        Ok(AccountId(bytes))
    }

    /// Returns the classic address encoding of this account id.
    pub fn to_address(&self) -> String {
        encode_classic_address(&self.0)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; ACCOUNT_ID_LENGTH]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.to_address())
    }
}

impl From<[u8; ACCOUNT_ID_LENGTH]> for AccountId {
    fn from(bytes: [u8; ACCOUNT_ID_LENGTH]) -> Self {
        AccountId(bytes)
    }
}

/// A 32-byte ledger entry key, derived by the keylet functions.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LedgerKey(pub [u8; LEDGER_KEY_LENGTH]);

impl LedgerKey {
    /// Parses a ledger key from its 64-character hex form.
    pub fn from_hex(value: &str) -> Result<Self, XRPLModelException> {
        let decoded = hex::decode(value).map_err(|_| XRPLModelException::InvalidHex)?;

        if decoded.len() != LEDGER_KEY_LENGTH {
            return Err(XRPLModelException::UnexpectedLength {
                expected: LEDGER_KEY_LENGTH,
                found: decoded.len(),
            });
        }

        let mut bytes = [0; LEDGER_KEY_LENGTH];
        bytes.copy_from_slice(&decoded);

        Ok(LedgerKey(bytes))
    }

    /// Returns the uppercase hex form of this key.
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for LedgerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LedgerKey({})", self.to_hex())
    }
}

impl From<[u8; LEDGER_KEY_LENGTH]> for LedgerKey {
    fn from(bytes: [u8; LEDGER_KEY_LENGTH]) -> Self {
        LedgerKey(bytes)
    }
}

/// Parses a drops quantity from its decimal string transport form.
/// Signs, separators and non-digits are rejected.
pub fn parse_drops(value: &str) -> Option<Drops> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    value.parse::<Drops>().ok()
}
