//! Typed ledger entries and their canonical byte codecs.

pub mod account_root;
pub mod credential;
pub mod deposit_preauth;
pub mod directory_node;
pub mod escrow;
pub mod pay_channel;

pub use account_root::AccountRoot;
pub use credential::Credential;
pub use deposit_preauth::{CredentialRef, DepositPreauth};
pub use directory_node::DirectoryNode;
pub use escrow::Escrow;
pub use pay_channel::PayChannel;

use alloc::vec::Vec;

use strum_macros::Display;

use crate::core::binarycodec::exceptions::XRPLBinaryCodecException;
use crate::core::binarycodec::fields::{field, FieldId};
use crate::core::binarycodec::BinaryParser;

/// Enum containing the different ledger entry types, with their
/// canonical type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[repr(u16)]
pub enum LedgerEntryType {
    AccountRoot = 0x0061,
    DirectoryNode = 0x0064,
    DepositPreauth = 0x0070,
    Escrow = 0x0075,
    PayChannel = 0x0078,
    Credential = 0x0081,
}

/// A ledger entry with a canonical binary form. `decode(encode(entry))`
/// round-trips exactly; absent optional fields stay absent.
pub trait SerializedLedgerEntry: Sized {
    const ENTRY_TYPE: LedgerEntryType;

    fn to_bytes(&self) -> Vec<u8>;

    fn from_bytes(bytes: &[u8]) -> Result<Self, XRPLBinaryCodecException>;
}

/// Reads the next field header, enforcing canonical field order.
pub(crate) fn next_field(
    parser: &mut BinaryParser<'_>,
    last: &mut Option<FieldId>,
) -> Result<FieldId, XRPLBinaryCodecException> {
    let field_id = parser.read_field_id()?;

    if let Some(previous) = *last {
        if field_id <= previous {
            return Err(XRPLBinaryCodecException::FieldOutOfOrder {
                type_code: field_id.type_code,
                field_code: field_id.field_code,
            });
        }
    }
    *last = Some(field_id);

    Ok(field_id)
}

/// Reads and checks the leading `LedgerEntryType` field.
pub(crate) fn expect_entry_type(
    parser: &mut BinaryParser<'_>,
    expected: LedgerEntryType,
) -> Result<(), XRPLBinaryCodecException> {
    let field_id = parser.read_field_id()?;
    if field_id != field::LEDGER_ENTRY_TYPE {
        return Err(XRPLBinaryCodecException::UnknownField {
            type_code: field_id.type_code,
            field_code: field_id.field_code,
        });
    }

    let found = parser.read_uint16()?;
    if found != expected as u16 {
        return Err(XRPLBinaryCodecException::UnexpectedLedgerEntryType { found });
    }

    Ok(())
}

/// Shorthand for the missing-field decode error.
pub(crate) fn missing(name: &'static str) -> XRPLBinaryCodecException {
    XRPLBinaryCodecException::MissingField { name }
}
