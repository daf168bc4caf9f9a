//! The `Credential` ledger entry: an attestation about `subject` made
//! by `issuer`, keyed by the pair plus the credential type. The entry
//! sits in the issuer's owner directory and, for cross-account
//! credentials, the subject's too; the accepted flag decides which of
//! the two owns the reserve slot.

use alloc::vec::Vec;

use crate::constants::credential_flags::LSF_ACCEPTED;
use crate::core::binarycodec::exceptions::XRPLBinaryCodecException;
use crate::core::binarycodec::fields::{field, FieldId};
use crate::core::binarycodec::{BinaryParser, BinarySerializer};
use crate::models::ledger::{expect_entry_type, missing, next_field};
use crate::models::ledger::{LedgerEntryType, SerializedLedgerEntry};
use crate::models::AccountId;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Credential {
    pub subject: AccountId,
    pub issuer: AccountId,
    pub credential_type: Vec<u8>,
    pub uri: Option<Vec<u8>>,
    pub expiration: Option<u32>,
    pub flags: u32,
    pub issuer_node: u64,
    pub subject_node: u64,
    pub previous_txn_id: [u8; 32],
    pub previous_txn_lgr_seq: u32,
}

impl Credential {
    pub fn is_accepted(&self) -> bool {
        self.flags & LSF_ACCEPTED != 0
    }

    /// The account whose reserve the credential counts against:
    /// the subject once accepted, the issuer before that.
    pub fn owner(&self) -> &AccountId {
        if self.is_accepted() {
            &self.subject
        } else {
            &self.issuer
        }
    }

    /// Whether the credential has expired as of `close_time`.
    pub fn is_expired(&self, close_time: u32) -> bool {
        self.expiration
            .map(|expiration| close_time > expiration)
            .unwrap_or(false)
    }
}

impl SerializedLedgerEntry for Credential {
    const ENTRY_TYPE: LedgerEntryType = LedgerEntryType::Credential;

    fn to_bytes(&self) -> Vec<u8> {
        let mut serializer = BinarySerializer::new();

        serializer.write_uint16(field::LEDGER_ENTRY_TYPE, Self::ENTRY_TYPE as u16);
        serializer.write_uint32(field::FLAGS, self.flags);
        serializer.write_uint32(field::PREVIOUS_TXN_LGR_SEQ, self.previous_txn_lgr_seq);
        if let Some(expiration) = self.expiration {
            serializer.write_uint32(field::EXPIRATION, expiration);
        }
        serializer.write_uint64(field::ISSUER_NODE, self.issuer_node);
        serializer.write_uint64(field::SUBJECT_NODE, self.subject_node);
        serializer.write_hash256(field::PREVIOUS_TXN_ID, &self.previous_txn_id);
        if let Some(uri) = &self.uri {
            serializer.write_blob(field::URI, uri);
        }
        serializer.write_blob(field::CREDENTIAL_TYPE, &self.credential_type);
        serializer.write_account_id(field::ISSUER, &self.issuer);
        serializer.write_account_id(field::SUBJECT, &self.subject);

        serializer.into_bytes()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, XRPLBinaryCodecException> {
        let mut parser = BinaryParser::new(bytes);
        expect_entry_type(&mut parser, Self::ENTRY_TYPE)?;

        let mut last: Option<FieldId> = Some(field::LEDGER_ENTRY_TYPE);
        let mut flags = None;
        let mut previous_txn_lgr_seq = None;
        let mut expiration = None;
        let mut issuer_node = None;
        let mut subject_node = None;
        let mut previous_txn_id = None;
        let mut uri = None;
        let mut credential_type = None;
        let mut issuer = None;
        let mut subject = None;

        while !parser.is_done() {
            match next_field(&mut parser, &mut last)? {
                field::FLAGS => flags = Some(parser.read_uint32()?),
                field::PREVIOUS_TXN_LGR_SEQ => {
                    previous_txn_lgr_seq = Some(parser.read_uint32()?)
                }
                field::EXPIRATION => expiration = Some(parser.read_uint32()?),
                field::ISSUER_NODE => issuer_node = Some(parser.read_uint64()?),
                field::SUBJECT_NODE => subject_node = Some(parser.read_uint64()?),
                field::PREVIOUS_TXN_ID => previous_txn_id = Some(parser.read_hash256()?),
                field::URI => uri = Some(parser.read_blob()?),
                field::CREDENTIAL_TYPE => credential_type = Some(parser.read_blob()?),
                field::ISSUER => issuer = Some(parser.read_account_id()?),
                field::SUBJECT => subject = Some(parser.read_account_id()?),
                unknown => {
                    return Err(XRPLBinaryCodecException::UnknownField {
                        type_code: unknown.type_code,
                        field_code: unknown.field_code,
                    })
                }
            }
        }

        Ok(Credential {
            subject: subject.ok_or(missing("Subject"))?,
            issuer: issuer.ok_or(missing("Issuer"))?,
            credential_type: credential_type.ok_or(missing("CredentialType"))?,
            uri,
            expiration,
            flags: flags.ok_or(missing("Flags"))?,
            issuer_node: issuer_node.ok_or(missing("IssuerNode"))?,
            subject_node: subject_node.ok_or(missing("SubjectNode"))?,
            previous_txn_id: previous_txn_id.ok_or(missing("PreviousTxnID"))?,
            previous_txn_lgr_seq: previous_txn_lgr_seq.ok_or(missing("PreviousTxnLgrSeq"))?,
        })
    }
}
