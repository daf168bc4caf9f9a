use alloc::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::models::transactions::{CommonFields, TransactionType};

/// Accepts a credential issued to the sending account, moving the
/// reserve slot from the issuer to the subject.
///
/// See CredentialAccept:
/// `<https://xrpl.org/docs/references/protocol/transactions/types/credentialaccept>`
#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct CredentialAccept<'a> {
    /// The base fields for all transaction models.
    #[serde(flatten)]
    pub common_fields: CommonFields<'a>,
    /// The account that issued the credential.
    pub issuer: Cow<'a, str>,
    /// Hex value identifying the kind of credential, 1 to 64 bytes.
    pub credential_type: Cow<'a, str>,
}

impl<'a> CredentialAccept<'a> {
    pub fn new(account: Cow<'a, str>, issuer: Cow<'a, str>, credential_type: Cow<'a, str>) -> Self {
        Self {
            common_fields: CommonFields::new(
                account,
                TransactionType::CredentialAccept,
                None,
                None,
            ),
            issuer,
            credential_type,
        }
    }
}

#[cfg(test)]
mod test_serde {
    use super::*;

    #[test]
    fn test_serialize() {
        let credential_accept = CredentialAccept::new(
            "rf1BiGeXwwQoi8Z2ueFYTEXSwuJYfV2Jpn".into(),
            "rU4EE1FskCPJw5QkLx1iGgdWiJa6HeqYyb".into(),
            "4B5943".into(),
        );
        let expected = r#"{"Account":"rf1BiGeXwwQoi8Z2ueFYTEXSwuJYfV2Jpn","TransactionType":"CredentialAccept","Issuer":"rU4EE1FskCPJw5QkLx1iGgdWiJa6HeqYyb","CredentialType":"4B5943"}"#;

        assert_eq!(expected, serde_json::to_string(&credential_accept).unwrap());
        assert_eq!(credential_accept, serde_json::from_str(expected).unwrap());
    }
}
