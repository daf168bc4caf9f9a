//! This module encodes and decodes classic addresses.

pub mod exceptions;
pub mod utils;

use alloc::string::String;
use alloc::vec;

use crate::constants::ACCOUNT_ID_LENGTH;
use crate::core::addresscodec::exceptions::XRPLAddressCodecException;
use crate::core::addresscodec::utils::XRPL_ALPHABET;

/// base58 encodings: https://xrpl.org/base58-encodings.html
/// Account address (20 bytes)
const CLASSIC_ADDRESS_PREFIX: [u8; 1] = [0x0];

/// Returns the classic address encoding of an account id
/// as a base58 string.
pub fn encode_classic_address(bytes: &[u8; ACCOUNT_ID_LENGTH]) -> String {
    let mut payload = vec![];

    payload.extend_from_slice(&CLASSIC_ADDRESS_PREFIX);
    payload.extend_from_slice(bytes);

    bs58::encode(payload)
        .with_alphabet(&XRPL_ALPHABET)
        .with_check()
        .into_string()
}

/// Returns the decoded account id bytes of a classic address.
pub fn decode_classic_address(
    classic_address: &str,
) -> Result<[u8; ACCOUNT_ID_LENGTH], XRPLAddressCodecException> {
    let decoded = bs58::decode(classic_address)
        .with_alphabet(&XRPL_ALPHABET)
        .with_check(None)
        .into_vec()?;

    if decoded.first() != Some(&CLASSIC_ADDRESS_PREFIX[0]) {
        return Err(XRPLAddressCodecException::InvalidEncodingPrefix);
    }

    let payload = &decoded[CLASSIC_ADDRESS_PREFIX.len()..];

    payload
        .try_into()
        .map_err(|_| XRPLAddressCodecException::UnexpectedPayloadLength {
            expected: ACCOUNT_ID_LENGTH,
            found: payload.len(),
        })
}

/// Returns whether `classic_address` is a valid classic address.
pub fn is_valid_classic_address(classic_address: &str) -> bool {
    decode_classic_address(classic_address).is_ok()
}
