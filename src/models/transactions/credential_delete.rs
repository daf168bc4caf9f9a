use alloc::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::models::transactions::{CommonFields, TransactionType};

/// Removes a credential. The subject and issuer may always delete it;
/// anyone may once it has expired. Omitted Subject or Issuer fields
/// default to the sending account.
///
/// See CredentialDelete:
/// `<https://xrpl.org/docs/references/protocol/transactions/types/credentialdelete>`
#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct CredentialDelete<'a> {
    /// The base fields for all transaction models.
    #[serde(flatten)]
    pub common_fields: CommonFields<'a>,
    /// The account the credential is about. Defaults to the sender.
    pub subject: Option<Cow<'a, str>>,
    /// The account that issued the credential. Defaults to the sender.
    pub issuer: Option<Cow<'a, str>>,
    /// Hex value identifying the kind of credential, 1 to 64 bytes.
    pub credential_type: Cow<'a, str>,
}

impl<'a> CredentialDelete<'a> {
    pub fn new(
        account: Cow<'a, str>,
        subject: Option<Cow<'a, str>>,
        issuer: Option<Cow<'a, str>>,
        credential_type: Cow<'a, str>,
    ) -> Self {
        Self {
            common_fields: CommonFields::new(
                account,
                TransactionType::CredentialDelete,
                None,
                None,
            ),
            subject,
            issuer,
            credential_type,
        }
    }
}
