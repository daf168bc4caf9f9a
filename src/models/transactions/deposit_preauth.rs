use alloc::borrow::Cow;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::models::transactions::{CommonFields, TransactionType};

/// An (issuer, credential type) pair inside an authorization array.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct Credential<'a> {
    /// The account that issued the credential.
    pub issuer: Cow<'a, str>,
    /// Hex value identifying the kind of credential.
    pub credential_type: Cow<'a, str>,
}

/// The array wrapper object around a [`Credential`].
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct AuthorizeCredential<'a> {
    pub credential: Credential<'a>,
}

/// A DepositPreauth transaction grants or revokes preauthorization to
/// deliver payments to the sender, either for a single account or for
/// the holders of a set of credentials. Exactly one of the four fields
/// must be present.
///
/// See DepositPreauth:
/// `<https://xrpl.org/docs/references/protocol/transactions/types/depositpreauth>`
#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct DepositPreauth<'a> {
    /// The base fields for all transaction models.
    #[serde(flatten)]
    pub common_fields: CommonFields<'a>,
    /// The XRP Ledger address of the sender to preauthorize.
    pub authorize: Option<Cow<'a, str>>,
    /// The XRP Ledger address of a sender whose preauthorization should be revoked.
    pub unauthorize: Option<Cow<'a, str>>,
    /// The credential set to preauthorize, 1 to 8 unique pairs.
    pub authorize_credentials: Option<Vec<AuthorizeCredential<'a>>>,
    /// The credential set whose preauthorization should be revoked.
    pub unauthorize_credentials: Option<Vec<AuthorizeCredential<'a>>>,
}

impl<'a> DepositPreauth<'a> {
    pub fn new(
        account: Cow<'a, str>,
        authorize: Option<Cow<'a, str>>,
        unauthorize: Option<Cow<'a, str>>,
        authorize_credentials: Option<Vec<AuthorizeCredential<'a>>>,
        unauthorize_credentials: Option<Vec<AuthorizeCredential<'a>>>,
    ) -> Self {
        Self {
            common_fields: CommonFields::new(
                account,
                TransactionType::DepositPreauth,
                None,
                None,
            ),
            authorize,
            unauthorize,
            authorize_credentials,
            unauthorize_credentials,
        }
    }
}
