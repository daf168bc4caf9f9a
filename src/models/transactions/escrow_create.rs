use alloc::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::models::transactions::{CommonFields, TransactionType};

/// Creates an Escrow, which sequesters XRP until the escrow process
/// either finishes or is canceled.
///
/// See EscrowCreate:
/// `<https://xrpl.org/escrowcreate.html>`
#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct EscrowCreate<'a> {
    /// The base fields for all transaction models.
    #[serde(flatten)]
    pub common_fields: CommonFields<'a>,
    /// Amount of XRP, in drops, to deduct from the sender's balance
    /// and escrow.
    pub amount: Cow<'a, str>,
    /// Address to receive escrowed XRP.
    pub destination: Cow<'a, str>,
    /// Arbitrary tag to further specify the destination for this
    /// escrowed payment.
    pub destination_tag: Option<u32>,
    /// The time, in seconds since the Ripple Epoch, when this escrow
    /// expires. After this time the funds can only return to the
    /// sender.
    pub cancel_after: Option<u32>,
    /// The time, in seconds since the Ripple Epoch, when the escrowed
    /// XRP can be released to the recipient.
    pub finish_after: Option<u32>,
    /// Hex value representing a PREIMAGE-SHA-256 crypto-condition.
    /// The funds can only be delivered to the recipient if this
    /// condition is fulfilled.
    pub condition: Option<Cow<'a, str>>,
}

impl<'a> EscrowCreate<'a> {
    pub fn new(
        account: Cow<'a, str>,
        amount: Cow<'a, str>,
        destination: Cow<'a, str>,
        destination_tag: Option<u32>,
        cancel_after: Option<u32>,
        finish_after: Option<u32>,
        condition: Option<Cow<'a, str>>,
    ) -> Self {
        Self {
            common_fields: CommonFields::new(account, TransactionType::EscrowCreate, None, None),
            amount,
            destination,
            destination_tag,
            cancel_after,
            finish_after,
            condition,
        }
    }
}
