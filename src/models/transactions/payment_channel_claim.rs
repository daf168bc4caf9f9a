use alloc::borrow::Cow;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use serde_with::skip_serializing_none;
use strum_macros::{AsRefStr, Display, EnumIter};

use crate::models::transactions::{CommonFields, TransactionType};

/// Transactions of the PaymentChannelClaim type support additional
/// values in the Flags field. This enum represents those options.
///
/// See PaymentChannelClaim flags:
/// `<https://xrpl.org/docs/references/protocol/transactions/types/paymentchannelclaim>`
#[derive(
    Debug, Eq, PartialEq, Copy, Clone, Serialize_repr, Deserialize_repr, Display, AsRefStr, EnumIter,
)]
#[repr(u32)]
pub enum PaymentChannelClaimFlag {
    /// Clear the channel's Expiration time. Only the source address of
    /// the payment channel can use this flag.
    TfRenew = 0x00010000,
    /// Request to close the channel. The destination closes
    /// immediately; the source closes immediately only once the
    /// channel is dry, and otherwise schedules the close one
    /// SettleDelay after the previous ledger's close time.
    TfClose = 0x00020000,
}

/// Claim XRP from a payment channel, adjust
/// the payment channel's expiration, or both.
///
/// See PaymentChannelClaim:
/// `<https://xrpl.org/docs/references/protocol/transactions/types/paymentchannelclaim>`
#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct PaymentChannelClaim<'a> {
    /// The base fields for all transaction models.
    #[serde(flatten)]
    pub common_fields: CommonFields<'a>,
    /// The unique ID of the channel, as a 64-character hexadecimal
    /// string.
    pub channel: Cow<'a, str>,
    /// Total amount of XRP, in drops, delivered by this channel after
    /// processing this claim. Required to deliver XRP.
    pub balance: Option<Cow<'a, str>>,
    /// The amount of XRP, in drops, authorized by the Signature. This
    /// must be at least as much as the Balance being claimed.
    pub amount: Option<Cow<'a, str>>,
    /// The signature of this claim, as hexadecimal. Required unless
    /// the sender of the transaction is the source address of the
    /// channel.
    pub signature: Option<Cow<'a, str>>,
    /// The public key the claim signature verifies under, in
    /// hexadecimal. Must match the channel's PublicKey.
    pub public_key: Option<Cow<'a, str>>,
    /// Credentials presented to authorize the deposit, as ledger
    /// entry ids.
    #[serde(rename = "CredentialIDs")]
    pub credential_ids: Option<Vec<Cow<'a, str>>>,
}

impl<'a> PaymentChannelClaim<'a> {
    pub fn new(
        account: Cow<'a, str>,
        channel: Cow<'a, str>,
        balance: Option<Cow<'a, str>>,
        amount: Option<Cow<'a, str>>,
        signature: Option<Cow<'a, str>>,
        public_key: Option<Cow<'a, str>>,
        credential_ids: Option<Vec<Cow<'a, str>>>,
    ) -> Self {
        Self {
            common_fields: CommonFields::new(
                account,
                TransactionType::PaymentChannelClaim,
                None,
                None,
            ),
            channel,
            balance,
            amount,
            signature,
            public_key,
            credential_ids,
        }
    }

    /// Returns the same claim with the given flag set.
    pub fn with_flag(mut self, flag: PaymentChannelClaimFlag) -> Self {
        self.common_fields.flags = Some(self.common_fields.flags() | flag as u32);
        self
    }
}
