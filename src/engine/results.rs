//! The closed set of transaction result codes.
//!
//! Codes fall into five classes, keyed by prefix:
//!
//! - `tes`: applied and committed.
//! - `tem`: malformed; never committed, never retried.
//! - `tef`: fatal or internal; never committed.
//! - `ter`: retryable; reserved for the outer transport, the apply
//!   engines never emit one.
//! - `tec`: claimed failure; the fee commits, everything else rolls
//!   back unless the engine opts into applying on `tec`.

use strum_macros::{AsRefStr, Display};

/// Enum containing the different transaction result codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
pub enum TransactionResult {
    #[strum(serialize = "tesSUCCESS")]
    TesSuccess,

    #[strum(serialize = "temARRAY_EMPTY")]
    TemArrayEmpty,
    #[strum(serialize = "temARRAY_TOO_LARGE")]
    TemArrayTooLarge,
    #[strum(serialize = "temBAD_AMOUNT")]
    TemBadAmount,
    #[strum(serialize = "temBAD_EXPIRATION")]
    TemBadExpiration,
    #[strum(serialize = "temBAD_SIGNATURE")]
    TemBadSignature,
    #[strum(serialize = "temBAD_SIGNER")]
    TemBadSigner,
    #[strum(serialize = "temBAD_SRC_ACCOUNT")]
    TemBadSrcAccount,
    #[strum(serialize = "temCANNOT_PREAUTH_SELF")]
    TemCannotPreauthSelf,
    #[strum(serialize = "temDISABLED")]
    TemDisabled,
    #[strum(serialize = "temDST_IS_SRC")]
    TemDstIsSrc,
    #[strum(serialize = "temDST_NEEDED")]
    TemDstNeeded,
    #[strum(serialize = "temINVALID")]
    TemInvalid,
    #[strum(serialize = "temINVALID_FLAG")]
    TemInvalidFlag,
    #[strum(serialize = "temMALFORMED")]
    TemMalformed,
    #[strum(serialize = "temUNKNOWN")]
    TemUnknown,

    #[strum(serialize = "tefBAD_LEDGER")]
    TefBadLedger,
    #[strum(serialize = "tefINTERNAL")]
    TefInternal,

    #[strum(serialize = "terNO_ACCOUNT")]
    TerNoAccount,
    #[strum(serialize = "terRETRY")]
    TerRetry,

    #[strum(serialize = "tecBAD_CREDENTIALS")]
    TecBadCredentials,
    #[strum(serialize = "tecCRYPTOCONDITION_ERROR")]
    TecCryptoconditionError,
    #[strum(serialize = "tecDST_TAG_NEEDED")]
    TecDstTagNeeded,
    #[strum(serialize = "tecDUPLICATE")]
    TecDuplicate,
    #[strum(serialize = "tecEXPIRED")]
    TecExpired,
    #[strum(serialize = "tecINSUFFICIENT_RESERVE")]
    TecInsufficientReserve,
    #[strum(serialize = "tecNO_DST")]
    TecNoDst,
    #[strum(serialize = "tecNO_ENTRY")]
    TecNoEntry,
    #[strum(serialize = "tecNO_ISSUER")]
    TecNoIssuer,
    #[strum(serialize = "tecNO_PERMISSION")]
    TecNoPermission,
    #[strum(serialize = "tecNO_TARGET")]
    TecNoTarget,
    #[strum(serialize = "tecUNFUNDED")]
    TecUnfunded,
    #[strum(serialize = "tecUNFUNDED_PAYMENT")]
    TecUnfundedPayment,
}

impl TransactionResult {
    pub fn is_success(&self) -> bool {
        *self == TransactionResult::TesSuccess
    }

    pub fn is_tem(&self) -> bool {
        self.as_ref().starts_with("tem")
    }

    pub fn is_tef(&self) -> bool {
        self.as_ref().starts_with("tef")
    }

    pub fn is_retry(&self) -> bool {
        self.as_ref().starts_with("ter")
    }

    pub fn is_tec(&self) -> bool {
        self.as_ref().starts_with("tec")
    }

    /// Whether the outer driver writes anything to the ledger for this
    /// result: the full change set on success, at least the fee on a
    /// claimed failure.
    pub fn commits(&self) -> bool {
        self.is_success() || self.is_tec()
    }
}
