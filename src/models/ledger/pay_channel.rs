//! The `PayChannel` ledger entry: a unidirectional channel from
//! `account` to `destination`. `balance` is the amount delivered so
//! far; it only grows while the channel exists, and the undelivered
//! remainder returns to the owner when the channel closes.

use alloc::vec::Vec;

use crate::core::binarycodec::exceptions::XRPLBinaryCodecException;
use crate::core::binarycodec::fields::{field, FieldId};
use crate::core::binarycodec::{BinaryParser, BinarySerializer};
use crate::models::ledger::{expect_entry_type, missing, next_field};
use crate::models::ledger::{LedgerEntryType, SerializedLedgerEntry};
use crate::models::{AccountId, Drops};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PayChannel {
    pub account: AccountId,
    pub destination: AccountId,
    /// Total funds allocated to the channel.
    pub amount: Drops,
    /// Funds already delivered to the destination.
    pub balance: Drops,
    pub settle_delay: u32,
    /// The claim signing key, in its 33- or 65-byte transport form.
    pub public_key: Vec<u8>,
    /// Immutable closing time set at creation.
    pub cancel_after: Option<u32>,
    /// Mutable closing time scheduled by the owner.
    pub expiration: Option<u32>,
    pub source_tag: Option<u32>,
    pub destination_tag: Option<u32>,
    pub flags: u32,
    pub owner_node: u64,
    /// Page hint in the destination's directory; present exactly when
    /// the channel is cross-account.
    pub destination_node: Option<u64>,
    pub previous_txn_id: [u8; 32],
    pub previous_txn_lgr_seq: u32,
}

impl PayChannel {
    /// Whether the channel has hit its cancel or expiration time.
    pub fn is_closing(&self, close_time: u32) -> bool {
        let cancelled = self
            .cancel_after
            .map(|cancel_after| close_time >= cancel_after)
            .unwrap_or(false);
        let expired = self
            .expiration
            .map(|expiration| close_time >= expiration)
            .unwrap_or(false);

        cancelled || expired
    }
}

impl SerializedLedgerEntry for PayChannel {
    const ENTRY_TYPE: LedgerEntryType = LedgerEntryType::PayChannel;

    fn to_bytes(&self) -> Vec<u8> {
        let mut serializer = BinarySerializer::new();

        serializer.write_uint16(field::LEDGER_ENTRY_TYPE, Self::ENTRY_TYPE as u16);
        serializer.write_uint32(field::FLAGS, self.flags);
        if let Some(source_tag) = self.source_tag {
            serializer.write_uint32(field::SOURCE_TAG, source_tag);
        }
        serializer.write_uint32(field::PREVIOUS_TXN_LGR_SEQ, self.previous_txn_lgr_seq);
        if let Some(expiration) = self.expiration {
            serializer.write_uint32(field::EXPIRATION, expiration);
        }
        if let Some(destination_tag) = self.destination_tag {
            serializer.write_uint32(field::DESTINATION_TAG, destination_tag);
        }
        if let Some(cancel_after) = self.cancel_after {
            serializer.write_uint32(field::CANCEL_AFTER, cancel_after);
        }
        serializer.write_uint32(field::SETTLE_DELAY, self.settle_delay);
        serializer.write_uint64(field::OWNER_NODE, self.owner_node);
        if let Some(destination_node) = self.destination_node {
            serializer.write_uint64(field::DESTINATION_NODE, destination_node);
        }
        serializer.write_hash256(field::PREVIOUS_TXN_ID, &self.previous_txn_id);
        serializer.write_amount(field::AMOUNT, self.amount);
        serializer.write_amount(field::BALANCE, self.balance);
        serializer.write_blob(field::PUBLIC_KEY, &self.public_key);
        serializer.write_account_id(field::ACCOUNT, &self.account);
        serializer.write_account_id(field::DESTINATION, &self.destination);

        serializer.into_bytes()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, XRPLBinaryCodecException> {
        let mut parser = BinaryParser::new(bytes);
        expect_entry_type(&mut parser, Self::ENTRY_TYPE)?;

        let mut last: Option<FieldId> = Some(field::LEDGER_ENTRY_TYPE);
        let mut flags = None;
        let mut source_tag = None;
        let mut previous_txn_lgr_seq = None;
        let mut expiration = None;
        let mut destination_tag = None;
        let mut cancel_after = None;
        let mut settle_delay = None;
        let mut owner_node = None;
        let mut destination_node = None;
        let mut previous_txn_id = None;
        let mut amount = None;
        let mut balance = None;
        let mut public_key = None;
        let mut account = None;
        let mut destination = None;

        while !parser.is_done() {
            match next_field(&mut parser, &mut last)? {
                field::FLAGS => flags = Some(parser.read_uint32()?),
                field::SOURCE_TAG => source_tag = Some(parser.read_uint32()?),
                field::PREVIOUS_TXN_LGR_SEQ => {
                    previous_txn_lgr_seq = Some(parser.read_uint32()?)
                }
                field::EXPIRATION => expiration = Some(parser.read_uint32()?),
                field::DESTINATION_TAG => destination_tag = Some(parser.read_uint32()?),
                field::CANCEL_AFTER => cancel_after = Some(parser.read_uint32()?),
                field::SETTLE_DELAY => settle_delay = Some(parser.read_uint32()?),
                field::OWNER_NODE => owner_node = Some(parser.read_uint64()?),
                field::DESTINATION_NODE => destination_node = Some(parser.read_uint64()?),
                field::PREVIOUS_TXN_ID => previous_txn_id = Some(parser.read_hash256()?),
                field::AMOUNT => amount = Some(parser.read_amount()?),
                field::BALANCE => balance = Some(parser.read_amount()?),
                field::PUBLIC_KEY => public_key = Some(parser.read_blob()?),
                field::ACCOUNT => account = Some(parser.read_account_id()?),
                field::DESTINATION => destination = Some(parser.read_account_id()?),
                unknown => {
                    return Err(XRPLBinaryCodecException::UnknownField {
                        type_code: unknown.type_code,
                        field_code: unknown.field_code,
                    })
                }
            }
        }

        Ok(PayChannel {
            account: account.ok_or(missing("Account"))?,
            destination: destination.ok_or(missing("Destination"))?,
            amount: amount.ok_or(missing("Amount"))?,
            balance: balance.ok_or(missing("Balance"))?,
            settle_delay: settle_delay.ok_or(missing("SettleDelay"))?,
            public_key: public_key.ok_or(missing("PublicKey"))?,
            cancel_after,
            expiration,
            source_tag,
            destination_tag,
            flags: flags.ok_or(missing("Flags"))?,
            owner_node: owner_node.ok_or(missing("OwnerNode"))?,
            destination_node,
            previous_txn_id: previous_txn_id.ok_or(missing("PreviousTxnID"))?,
            previous_txn_lgr_seq: previous_txn_lgr_seq.ok_or(missing("PreviousTxnLgrSeq"))?,
        })
    }
}
