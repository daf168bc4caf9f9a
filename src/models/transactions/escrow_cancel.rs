use alloc::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::models::transactions::{CommonFields, TransactionType};

/// Returns escrowed XRP to the sender after the escrow's cancel time
/// has passed.
///
/// See EscrowCancel:
/// `<https://xrpl.org/escrowcancel.html>`
#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct EscrowCancel<'a> {
    /// The base fields for all transaction models.
    #[serde(flatten)]
    pub common_fields: CommonFields<'a>,
    /// Address of the source account that funded the held payment.
    pub owner: Cow<'a, str>,
    /// Transaction sequence of the EscrowCreate transaction that
    /// created the held payment to cancel.
    pub offer_sequence: u32,
}

impl<'a> EscrowCancel<'a> {
    pub fn new(account: Cow<'a, str>, owner: Cow<'a, str>, offer_sequence: u32) -> Self {
        Self {
            common_fields: CommonFields::new(account, TransactionType::EscrowCancel, None, None),
            owner,
            offer_sequence,
        }
    }
}
