//! The `AccountRoot` ledger entry: one per funded account, holding its
//! balance, sequence, flags and the owner count that drives the
//! reserve requirement.

use alloc::vec::Vec;

use crate::core::binarycodec::exceptions::XRPLBinaryCodecException;
use crate::core::binarycodec::fields::{field, FieldId};
use crate::core::binarycodec::{BinaryParser, BinarySerializer};
use crate::models::ledger::{expect_entry_type, missing, next_field};
use crate::models::ledger::{LedgerEntryType, SerializedLedgerEntry};
use crate::models::{AccountId, Drops};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AccountRoot {
    pub account: AccountId,
    pub balance: Drops,
    pub sequence: u32,
    pub owner_count: u32,
    pub flags: u32,
    pub previous_txn_id: [u8; 32],
    pub previous_txn_lgr_seq: u32,
}

impl AccountRoot {
    /// Returns whether an account flag bit is set.
    pub fn has_flag(&self, flag: u32) -> bool {
        self.flags & flag != 0
    }
}

impl SerializedLedgerEntry for AccountRoot {
    const ENTRY_TYPE: LedgerEntryType = LedgerEntryType::AccountRoot;

    fn to_bytes(&self) -> Vec<u8> {
        let mut serializer = BinarySerializer::new();

        serializer.write_uint16(field::LEDGER_ENTRY_TYPE, Self::ENTRY_TYPE as u16);
        serializer.write_uint32(field::FLAGS, self.flags);
        serializer.write_uint32(field::SEQUENCE, self.sequence);
        serializer.write_uint32(field::PREVIOUS_TXN_LGR_SEQ, self.previous_txn_lgr_seq);
        serializer.write_uint32(field::OWNER_COUNT, self.owner_count);
        serializer.write_hash256(field::PREVIOUS_TXN_ID, &self.previous_txn_id);
        serializer.write_amount(field::BALANCE, self.balance);
        serializer.write_account_id(field::ACCOUNT, &self.account);

        serializer.into_bytes()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, XRPLBinaryCodecException> {
        let mut parser = BinaryParser::new(bytes);
        expect_entry_type(&mut parser, Self::ENTRY_TYPE)?;

        let mut last: Option<FieldId> = Some(field::LEDGER_ENTRY_TYPE);
        let mut flags = None;
        let mut sequence = None;
        let mut previous_txn_lgr_seq = None;
        let mut owner_count = None;
        let mut previous_txn_id = None;
        let mut balance = None;
        let mut account = None;

        while !parser.is_done() {
            match next_field(&mut parser, &mut last)? {
                field::FLAGS => flags = Some(parser.read_uint32()?),
                field::SEQUENCE => sequence = Some(parser.read_uint32()?),
                field::PREVIOUS_TXN_LGR_SEQ => {
                    previous_txn_lgr_seq = Some(parser.read_uint32()?)
                }
                field::OWNER_COUNT => owner_count = Some(parser.read_uint32()?),
                field::PREVIOUS_TXN_ID => previous_txn_id = Some(parser.read_hash256()?),
                field::BALANCE => balance = Some(parser.read_amount()?),
                field::ACCOUNT => account = Some(parser.read_account_id()?),
                unknown => {
                    return Err(XRPLBinaryCodecException::UnknownField {
                        type_code: unknown.type_code,
                        field_code: unknown.field_code,
                    })
                }
            }
        }

        Ok(AccountRoot {
            account: account.ok_or(missing("Account"))?,
            balance: balance.ok_or(missing("Balance"))?,
            sequence: sequence.ok_or(missing("Sequence"))?,
            owner_count: owner_count.ok_or(missing("OwnerCount"))?,
            flags: flags.ok_or(missing("Flags"))?,
            previous_txn_id: previous_txn_id.ok_or(missing("PreviousTxnID"))?,
            previous_txn_lgr_seq: previous_txn_lgr_seq.ok_or(missing("PreviousTxnLgrSeq"))?,
        })
    }
}
