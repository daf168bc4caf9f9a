//! The `DirectoryNode` ledger entry: one page of an owner directory.
//! A directory is a chain of pages starting at the root (page zero);
//! each page holds up to 32 entry keys and links forward to the next
//! page. Only the root carries the owner.

use alloc::vec::Vec;

use crate::core::binarycodec::exceptions::XRPLBinaryCodecException;
use crate::core::binarycodec::fields::{field, FieldId};
use crate::core::binarycodec::{BinaryParser, BinarySerializer};
use crate::models::ledger::{expect_entry_type, missing, next_field};
use crate::models::ledger::{LedgerEntryType, SerializedLedgerEntry};
use crate::models::{AccountId, LedgerKey};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DirectoryNode {
    pub flags: u32,
    /// The contents of this page: the keys of the entries it indexes.
    pub indexes: Vec<LedgerKey>,
    /// The page number of the next page, when this page is not the
    /// tail.
    pub index_next: Option<u64>,
    /// The owning account. Present on the root page only.
    pub owner: Option<AccountId>,
    /// The key of the directory's root page.
    pub root_index: LedgerKey,
}

impl SerializedLedgerEntry for DirectoryNode {
    const ENTRY_TYPE: LedgerEntryType = LedgerEntryType::DirectoryNode;

    fn to_bytes(&self) -> Vec<u8> {
        let mut serializer = BinarySerializer::new();

        serializer.write_uint16(field::LEDGER_ENTRY_TYPE, Self::ENTRY_TYPE as u16);
        serializer.write_uint32(field::FLAGS, self.flags);
        if let Some(index_next) = self.index_next {
            serializer.write_uint64(field::INDEX_NEXT, index_next);
        }
        serializer.write_hash256(field::ROOT_INDEX, &self.root_index.0);
        if let Some(owner) = &self.owner {
            serializer.write_account_id(field::OWNER, owner);
        }
        serializer.write_vector256(field::INDEXES, &self.indexes);

        serializer.into_bytes()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, XRPLBinaryCodecException> {
        let mut parser = BinaryParser::new(bytes);
        expect_entry_type(&mut parser, Self::ENTRY_TYPE)?;

        let mut last: Option<FieldId> = Some(field::LEDGER_ENTRY_TYPE);
        let mut flags = None;
        let mut index_next = None;
        let mut root_index = None;
        let mut owner = None;
        let mut indexes = None;

        while !parser.is_done() {
            match next_field(&mut parser, &mut last)? {
                field::FLAGS => flags = Some(parser.read_uint32()?),
                field::INDEX_NEXT => index_next = Some(parser.read_uint64()?),
                field::ROOT_INDEX => root_index = Some(LedgerKey(parser.read_hash256()?)),
                field::OWNER => owner = Some(parser.read_account_id()?),
                field::INDEXES => indexes = Some(parser.read_vector256()?),
                unknown => {
                    return Err(XRPLBinaryCodecException::UnknownField {
                        type_code: unknown.type_code,
                        field_code: unknown.field_code,
                    })
                }
            }
        }

        Ok(DirectoryNode {
            flags: flags.ok_or(missing("Flags"))?,
            indexes: indexes.ok_or(missing("Indexes"))?,
            index_next,
            owner,
            root_index: root_index.ok_or(missing("RootIndex"))?,
        })
    }
}
