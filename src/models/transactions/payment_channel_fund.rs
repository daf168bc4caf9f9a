use alloc::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::models::transactions::{CommonFields, TransactionType};

/// Adds additional XRP to an open channel and optionally updates its
/// expiration time. Only the channel's source address may fund it.
///
/// See PaymentChannelFund:
/// `<https://xrpl.org/paymentchannelfund.html>`
#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct PaymentChannelFund<'a> {
    /// The base fields for all transaction models.
    #[serde(flatten)]
    pub common_fields: CommonFields<'a>,
    /// The unique ID of the channel to fund, as a 64-character
    /// hexadecimal string.
    pub channel: Cow<'a, str>,
    /// Amount of XRP, in drops, to add to the channel.
    pub amount: Cow<'a, str>,
    /// New Expiration time to set for the channel, in seconds since
    /// the Ripple Epoch. Cannot be sooner than the close time of the
    /// previous ledger plus the channel's SettleDelay.
    pub expiration: Option<u32>,
}

impl<'a> PaymentChannelFund<'a> {
    pub fn new(
        account: Cow<'a, str>,
        channel: Cow<'a, str>,
        amount: Cow<'a, str>,
        expiration: Option<u32>,
    ) -> Self {
        Self {
            common_fields: CommonFields::new(
                account,
                TransactionType::PaymentChannelFund,
                None,
                None,
            ),
            channel,
            amount,
            expiration,
        }
    }
}

#[cfg(test)]
mod test_serde {
    use super::*;

    #[test]
    fn test_serialize() {
        let payment_channel_fund = PaymentChannelFund::new(
            "rf1BiGeXwwQoi8Z2ueFYTEXSwuJYfV2Jpn".into(),
            "96F76F27D8A327FC48753167EC04A46AA0E382E6F57F32FD12274144D00F1797".into(),
            "200000".into(),
            Some(543171558),
        );
        let expected = r#"{"Account":"rf1BiGeXwwQoi8Z2ueFYTEXSwuJYfV2Jpn","TransactionType":"PaymentChannelFund","Channel":"96F76F27D8A327FC48753167EC04A46AA0E382E6F57F32FD12274144D00F1797","Amount":"200000","Expiration":543171558}"#;

        assert_eq!(
            expected,
            serde_json::to_string(&payment_channel_fund).unwrap()
        );
        assert_eq!(
            payment_channel_fund,
            serde_json::from_str(expected).unwrap()
        );
    }
}
