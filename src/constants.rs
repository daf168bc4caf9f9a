//! Collection of public constants for the ledger core.

/// Length of an account id.
pub const ACCOUNT_ID_LENGTH: usize = 20;

/// Length of a ledger entry key.
pub const LEDGER_KEY_LENGTH: usize = 32;

/// Maximum serialized length of a PREIMAGE-SHA-256 condition.
pub const MAX_CONDITION_LENGTH: usize = 128;

/// Maximum serialized length of a PREIMAGE-SHA-256 fulfillment.
pub const MAX_FULFILLMENT_LENGTH: usize = 256;

/// Maximum length of a fulfillment preimage.
pub const MAX_PREIMAGE_LENGTH: usize = 128;

/// Maximum length of a credential type, in bytes.
pub const MAX_CREDENTIAL_TYPE_LENGTH: usize = 64;

/// Maximum length of a credential URI, in bytes.
pub const MAX_CREDENTIAL_URI_LENGTH: usize = 256;

/// Maximum number of elements in a credential array
/// (`CredentialIDs`, `AuthorizeCredentials`, `UnauthorizeCredentials`).
pub const MAX_CREDENTIAL_ARRAY_LENGTH: usize = 8;

/// Number of entry keys a single owner-directory page can hold.
pub const DIR_NODE_MAX_ENTRIES: usize = 32;

/// Hash prefix of a payment channel claim signing message, `CLM\0`.
pub const PAYCHAN_CLAIM_PREFIX: [u8; 4] = [0x43, 0x4C, 0x4D, 0x00];

/// Key spaces for ledger entry identifier derivation. Each entry kind
/// hashes its inputs under its own two-byte tag, so identical inputs
/// in two spaces can never collide.
pub mod space {
    pub const ACCOUNT: u16 = 0x0061;
    pub const OWNER_DIR: u16 = 0x004F;
    pub const DIR_NODE: u16 = 0x0064;
    pub const ESCROW: u16 = 0x0075;
    pub const PAY_CHANNEL: u16 = 0x0078;
    pub const DEPOSIT_PREAUTH: u16 = 0x0070;
    pub const DEPOSIT_PREAUTH_CREDENTIALS: u16 = 0x0050;
    pub const CREDENTIAL: u16 = 0x0044;
}

/// AccountRoot flag bits consumed by the apply engines.
pub mod account_flags {
    /// Incoming payments must carry a destination tag.
    pub const LSF_REQUIRE_DEST_TAG: u32 = 0x0002_0000;
    /// The account discourages receiving the native asset.
    pub const LSF_DISALLOW_XRP: u32 = 0x0008_0000;
    /// Deposits require preauthorization.
    pub const LSF_DEPOSIT_AUTH: u32 = 0x0100_0000;
}

/// Credential entry flag bits.
pub mod credential_flags {
    /// The subject has accepted the credential.
    pub const LSF_ACCEPTED: u32 = 0x0001_0000;
}
