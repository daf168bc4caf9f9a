//! Transaction models for the ten supported transaction types.

pub mod credential_accept;
pub mod credential_create;
pub mod credential_delete;
pub mod deposit_preauth;
pub mod escrow_cancel;
pub mod escrow_create;
pub mod escrow_finish;
pub mod payment_channel_claim;
pub mod payment_channel_create;
pub mod payment_channel_fund;

pub use credential_accept::CredentialAccept;
pub use credential_create::CredentialCreate;
pub use credential_delete::CredentialDelete;
pub use deposit_preauth::DepositPreauth;
pub use escrow_cancel::EscrowCancel;
pub use escrow_create::EscrowCreate;
pub use escrow_finish::EscrowFinish;
pub use payment_channel_claim::PaymentChannelClaim;
pub use payment_channel_create::PaymentChannelCreate;
pub use payment_channel_fund::PaymentChannelFund;

use alloc::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use strum_macros::Display;

/// The `tfFullyCanonicalSig` bit, accepted on every transaction type.
pub const TF_FULLY_CANONICAL_SIG: u32 = 0x8000_0000;

/// Enum containing the different Transaction types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Display, PartialEq, Eq, Hash)]
pub enum TransactionType {
    CredentialAccept,
    CredentialCreate,
    CredentialDelete,
    DepositPreauth,
    EscrowCancel,
    EscrowCreate,
    EscrowFinish,
    PaymentChannelClaim,
    PaymentChannelCreate,
    PaymentChannelFund,
}

/// The base fields shared by all transaction models.
///
/// See Transaction Common Fields:
/// `<https://xrpl.org/transaction-common-fields.html>`
#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct CommonFields<'a> {
    /// The unique address of the account that initiated the transaction.
    pub account: Cow<'a, str>,
    /// The type of transaction.
    pub transaction_type: TransactionType,
    /// Integer amount of XRP, in drops, destroyed as the transaction
    /// cost. Charged by the outer transport; carried for fidelity.
    pub fee: Option<Cow<'a, str>>,
    /// Set of bit-flags for this transaction.
    pub flags: Option<u32>,
    /// Highest ledger index this transaction can appear in.
    pub last_ledger_sequence: Option<u32>,
    /// The sequence number of the account sending the transaction.
    pub sequence: Option<u32>,
    /// Hex representation of the public key that corresponds to the
    /// private key used to sign this transaction.
    pub signing_pub_key: Option<Cow<'a, str>>,
    /// Arbitrary integer identifying a sender or reason.
    pub source_tag: Option<u32>,
    /// The signature that verifies this transaction as originating
    /// from the account it says it is from.
    pub txn_signature: Option<Cow<'a, str>>,
}

impl<'a> CommonFields<'a> {
    pub fn new(
        account: Cow<'a, str>,
        transaction_type: TransactionType,
        sequence: Option<u32>,
        source_tag: Option<u32>,
    ) -> Self {
        CommonFields {
            account,
            transaction_type,
            fee: None,
            flags: None,
            last_ledger_sequence: None,
            sequence,
            signing_pub_key: None,
            source_tag,
            txn_signature: None,
        }
    }

    /// The transaction flags, defaulting to none set.
    pub fn flags(&self) -> u32 {
        self.flags.unwrap_or(0)
    }
}
