use alloc::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::models::transactions::{CommonFields, TransactionType};

/// Issues a credential about a subject account. The credential only
/// counts for authorization once the subject accepts it; a credential
/// issued to oneself is accepted immediately.
///
/// See CredentialCreate:
/// `<https://xrpl.org/docs/references/protocol/transactions/types/credentialcreate>`
#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct CredentialCreate<'a> {
    /// The base fields for all transaction models.
    #[serde(flatten)]
    pub common_fields: CommonFields<'a>,
    /// The account the credential is about.
    pub subject: Cow<'a, str>,
    /// Hex value identifying the kind of credential, 1 to 64 bytes.
    pub credential_type: Cow<'a, str>,
    /// Time, in seconds since the Ripple Epoch, after which the
    /// credential no longer counts.
    pub expiration: Option<u32>,
    /// Hex value of an arbitrary additional reference, 1 to 256 bytes.
    #[serde(rename = "URI")]
    pub uri: Option<Cow<'a, str>>,
}

impl<'a> CredentialCreate<'a> {
    pub fn new(
        account: Cow<'a, str>,
        subject: Cow<'a, str>,
        credential_type: Cow<'a, str>,
        expiration: Option<u32>,
        uri: Option<Cow<'a, str>>,
    ) -> Self {
        Self {
            common_fields: CommonFields::new(
                account,
                TransactionType::CredentialCreate,
                None,
                None,
            ),
            subject,
            credential_type,
            expiration,
            uri,
        }
    }
}
