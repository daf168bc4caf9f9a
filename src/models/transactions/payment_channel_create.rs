use alloc::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::models::transactions::{CommonFields, TransactionType};

/// Creates a unidirectional channel and funds it with XRP.
///
/// See PaymentChannelCreate:
/// `<https://xrpl.org/paymentchannelcreate.html>`
#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct PaymentChannelCreate<'a> {
    /// The base fields for all transaction models.
    #[serde(flatten)]
    pub common_fields: CommonFields<'a>,
    /// Amount of XRP, in drops, to set aside in this channel.
    pub amount: Cow<'a, str>,
    /// Address to receive XRP claims against this channel.
    pub destination: Cow<'a, str>,
    /// Amount of time, in seconds, the source address must wait before
    /// closing the channel if it has unclaimed XRP.
    pub settle_delay: u32,
    /// The public key of the key pair the source will use to sign
    /// claims against this channel, in hexadecimal.
    pub public_key: Cow<'a, str>,
    /// The time, in seconds since the Ripple Epoch, when this channel
    /// expires. This value is immutable.
    pub cancel_after: Option<u32>,
    /// Arbitrary tag to further specify the destination.
    pub destination_tag: Option<u32>,
}

impl<'a> PaymentChannelCreate<'a> {
    pub fn new(
        account: Cow<'a, str>,
        amount: Cow<'a, str>,
        destination: Cow<'a, str>,
        settle_delay: u32,
        public_key: Cow<'a, str>,
        cancel_after: Option<u32>,
        destination_tag: Option<u32>,
    ) -> Self {
        Self {
            common_fields: CommonFields::new(
                account,
                TransactionType::PaymentChannelCreate,
                None,
                None,
            ),
            amount,
            destination,
            settle_delay,
            public_key,
            cancel_after,
            destination_tag,
        }
    }
}
