use alloc::borrow::Cow;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::models::transactions::{CommonFields, TransactionType};

/// Delivers XRP from a held payment to the recipient.
///
/// See EscrowFinish:
/// `<https://xrpl.org/escrowfinish.html>`
#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct EscrowFinish<'a> {
    /// The base fields for all transaction models.
    #[serde(flatten)]
    pub common_fields: CommonFields<'a>,
    /// Address of the source account that funded the held payment.
    pub owner: Cow<'a, str>,
    /// Transaction sequence of the EscrowCreate transaction that
    /// created the held payment to finish.
    pub offer_sequence: u32,
    /// Hex value matching the previously-supplied PREIMAGE-SHA-256
    /// crypto-condition of the held payment.
    pub condition: Option<Cow<'a, str>>,
    /// Hex value of the PREIMAGE-SHA-256 crypto-condition fulfillment
    /// matching the held payment's Condition.
    pub fulfillment: Option<Cow<'a, str>>,
    /// Credentials presented to authorize the deposit, as ledger
    /// entry ids.
    #[serde(rename = "CredentialIDs")]
    pub credential_ids: Option<Vec<Cow<'a, str>>>,
}

impl<'a> EscrowFinish<'a> {
    pub fn new(
        account: Cow<'a, str>,
        owner: Cow<'a, str>,
        offer_sequence: u32,
        condition: Option<Cow<'a, str>>,
        fulfillment: Option<Cow<'a, str>>,
        credential_ids: Option<Vec<Cow<'a, str>>>,
    ) -> Self {
        Self {
            common_fields: CommonFields::new(account, TransactionType::EscrowFinish, None, None),
            owner,
            offer_sequence,
            condition,
            fulfillment,
            credential_ids,
        }
    }
}
