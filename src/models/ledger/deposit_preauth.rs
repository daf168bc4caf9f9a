//! The `DepositPreauth` ledger entry: a preauthorization granted by
//! `account`, either to a single authorized account or to the holders
//! of a sorted set of credentials. The credential-set form keys on the
//! sorted pairs, so the set's identity is order-independent.

use alloc::vec::Vec;

use crate::core::binarycodec::exceptions::XRPLBinaryCodecException;
use crate::core::binarycodec::fields::{field, FieldId};
use crate::core::binarycodec::{BinaryParser, BinarySerializer, OBJECT_END_MARKER};
use crate::core::binarycodec::ARRAY_END_MARKER;
use crate::models::ledger::{expect_entry_type, missing, next_field};
use crate::models::ledger::{LedgerEntryType, SerializedLedgerEntry};
use crate::models::AccountId;

/// An (issuer, credential type) pair. The derived ordering — issuer
/// bytes, then type bytes — is the canonical sort order for
/// credential-set preauthorizations.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CredentialRef {
    pub issuer: AccountId,
    pub credential_type: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DepositPreauth {
    pub account: AccountId,
    /// The authorized account, for the account-based form.
    pub authorize: Option<AccountId>,
    /// The authorized credential set in sorted order, for the
    /// credential-based form.
    pub authorize_credentials: Option<Vec<CredentialRef>>,
    pub owner_node: u64,
    pub previous_txn_id: [u8; 32],
    pub previous_txn_lgr_seq: u32,
}

impl SerializedLedgerEntry for DepositPreauth {
    const ENTRY_TYPE: LedgerEntryType = LedgerEntryType::DepositPreauth;

    fn to_bytes(&self) -> Vec<u8> {
        let mut serializer = BinarySerializer::new();

        serializer.write_uint16(field::LEDGER_ENTRY_TYPE, Self::ENTRY_TYPE as u16);
        serializer.write_uint32(field::FLAGS, 0);
        serializer.write_uint32(field::PREVIOUS_TXN_LGR_SEQ, self.previous_txn_lgr_seq);
        serializer.write_uint64(field::OWNER_NODE, self.owner_node);
        serializer.write_hash256(field::PREVIOUS_TXN_ID, &self.previous_txn_id);
        serializer.write_account_id(field::ACCOUNT, &self.account);
        if let Some(authorize) = &self.authorize {
            serializer.write_account_id(field::AUTHORIZE, authorize);
        }
        if let Some(credentials) = &self.authorize_credentials {
            serializer.begin_array(field::AUTHORIZE_CREDENTIALS);
            for credential in credentials {
                serializer.begin_object(field::CREDENTIAL);
                serializer.write_blob(field::CREDENTIAL_TYPE, &credential.credential_type);
                serializer.write_account_id(field::ISSUER, &credential.issuer);
                serializer.end_object();
            }
            serializer.end_array();
        }

        serializer.into_bytes()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, XRPLBinaryCodecException> {
        let mut parser = BinaryParser::new(bytes);
        expect_entry_type(&mut parser, Self::ENTRY_TYPE)?;

        let mut last: Option<FieldId> = Some(field::LEDGER_ENTRY_TYPE);
        let mut previous_txn_lgr_seq = None;
        let mut owner_node = None;
        let mut previous_txn_id = None;
        let mut account = None;
        let mut authorize = None;
        let mut authorize_credentials = None;

        while !parser.is_done() {
            match next_field(&mut parser, &mut last)? {
                field::FLAGS => {
                    parser.read_uint32()?;
                }
                field::PREVIOUS_TXN_LGR_SEQ => {
                    previous_txn_lgr_seq = Some(parser.read_uint32()?)
                }
                field::OWNER_NODE => owner_node = Some(parser.read_uint64()?),
                field::PREVIOUS_TXN_ID => previous_txn_id = Some(parser.read_hash256()?),
                field::ACCOUNT => account = Some(parser.read_account_id()?),
                field::AUTHORIZE => authorize = Some(parser.read_account_id()?),
                field::AUTHORIZE_CREDENTIALS => {
                    authorize_credentials = Some(read_credential_array(&mut parser)?)
                }
                unknown => {
                    return Err(XRPLBinaryCodecException::UnknownField {
                        type_code: unknown.type_code,
                        field_code: unknown.field_code,
                    })
                }
            }
        }

        Ok(DepositPreauth {
            account: account.ok_or(missing("Account"))?,
            authorize,
            authorize_credentials,
            owner_node: owner_node.ok_or(missing("OwnerNode"))?,
            previous_txn_id: previous_txn_id.ok_or(missing("PreviousTxnID"))?,
            previous_txn_lgr_seq: previous_txn_lgr_seq.ok_or(missing("PreviousTxnLgrSeq"))?,
        })
    }
}

fn read_credential_array(
    parser: &mut BinaryParser<'_>,
) -> Result<Vec<CredentialRef>, XRPLBinaryCodecException> {
    let mut credentials = Vec::new();

    loop {
        if parser.peek() == Some(ARRAY_END_MARKER) {
            parser.read_marker(ARRAY_END_MARKER)?;
            return Ok(credentials);
        }

        let element = parser.read_field_id()?;
        if element != field::CREDENTIAL {
            return Err(XRPLBinaryCodecException::UnknownField {
                type_code: element.type_code,
                field_code: element.field_code,
            });
        }

        let mut last: Option<FieldId> = None;
        let mut credential_type = None;
        let mut issuer = None;

        while parser.peek() != Some(OBJECT_END_MARKER) {
            match next_field(parser, &mut last)? {
                field::CREDENTIAL_TYPE => credential_type = Some(parser.read_blob()?),
                field::ISSUER => issuer = Some(parser.read_account_id()?),
                unknown => {
                    return Err(XRPLBinaryCodecException::UnknownField {
                        type_code: unknown.type_code,
                        field_code: unknown.field_code,
                    })
                }
            }
        }
        parser.read_marker(OBJECT_END_MARKER)?;

        credentials.push(CredentialRef {
            issuer: issuer.ok_or(missing("Issuer"))?,
            credential_type: credential_type.ok_or(missing("CredentialType"))?,
        });
    }
}
