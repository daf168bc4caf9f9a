//! Address codec constants.

use bs58::Alphabet;

/// The dictionary used for XRPL base58 encodings.
pub const XRPL_ALPHABET: Alphabet = *bs58::Alphabet::RIPPLE;
