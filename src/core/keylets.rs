//! Ledger entry identifier derivation.
//!
//! Every entry key is the SHA-512-half of a two-byte key space tag
//! followed by the entry's ordered inputs. Distinct spaces keep equal
//! inputs from ever colliding across entry kinds.

use alloc::vec::Vec;

use crate::constants::space;
use crate::core::crypto::sha512_first_half;
use crate::models::ledger::deposit_preauth::CredentialRef;
use crate::models::{AccountId, LedgerKey};

fn keylet(space_tag: u16, parts: &[&[u8]]) -> LedgerKey {
    let mut buffer: Vec<u8> = Vec::with_capacity(2 + parts.iter().map(|p| p.len()).sum::<usize>());

    buffer.extend_from_slice(&space_tag.to_be_bytes());
    for part in parts {
        buffer.extend_from_slice(part);
    }

    LedgerKey(sha512_first_half(&buffer))
}

/// The key of an account's root entry.
pub fn account(id: &AccountId) -> LedgerKey {
    keylet(space::ACCOUNT, &[id.as_bytes()])
}

/// The key of an account's owner directory root page.
pub fn owner_dir(owner: &AccountId) -> LedgerKey {
    keylet(space::OWNER_DIR, &[owner.as_bytes()])
}

/// The key of directory page `page` under `root`. Page zero is the
/// root itself.
pub fn dir_page(root: &LedgerKey, page: u64) -> LedgerKey {
    if page == 0 {
        *root
    } else {
        keylet(space::DIR_NODE, &[root.as_bytes(), &page.to_be_bytes()])
    }
}

/// The key of an escrow created by `owner` with sequence `sequence`.
pub fn escrow(owner: &AccountId, sequence: u32) -> LedgerKey {
    keylet(
        space::ESCROW,
        &[owner.as_bytes(), &sequence.to_be_bytes()],
    )
}

/// The key of a payment channel.
pub fn pay_channel(owner: &AccountId, destination: &AccountId, sequence: u32) -> LedgerKey {
    keylet(
        space::PAY_CHANNEL,
        &[
            owner.as_bytes(),
            destination.as_bytes(),
            &sequence.to_be_bytes(),
        ],
    )
}

/// The key of a credential issued to `subject` by `issuer`.
pub fn credential(subject: &AccountId, issuer: &AccountId, credential_type: &[u8]) -> LedgerKey {
    keylet(
        space::CREDENTIAL,
        &[subject.as_bytes(), issuer.as_bytes(), credential_type],
    )
}

/// The key of an account-based deposit preauthorization.
pub fn deposit_preauth(owner: &AccountId, authorized: &AccountId) -> LedgerKey {
    keylet(
        space::DEPOSIT_PREAUTH,
        &[owner.as_bytes(), authorized.as_bytes()],
    )
}

/// The key of a credential-set deposit preauthorization. The
/// credentials must already be in canonical sorted order; the key
/// binds the sorted set, so reordering the caller's input would
/// silently address a different entry.
pub fn deposit_preauth_credentials(
    owner: &AccountId,
    credentials: &[CredentialRef],
) -> LedgerKey {
    debug_assert!(credentials.windows(2).all(|w| w[0] < w[1]));

    let mut parts: Vec<&[u8]> = Vec::with_capacity(1 + credentials.len() * 2);
    parts.push(owner.as_bytes());
    for credential in credentials {
        parts.push(credential.issuer.as_bytes());
        parts.push(&credential.credential_type);
    }

    keylet(space::DEPOSIT_PREAUTH_CREDENTIALS, &parts)
}

#[cfg(test)]
mod test {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;

    fn account_id(fill: u8) -> AccountId {
        AccountId([fill; 20])
    }

    #[test]
    fn test_spaces_are_distinct() {
        let id = account_id(0x11);

        assert_ne!(account(&id), owner_dir(&id));
        assert_ne!(
            deposit_preauth(&id, &account_id(0x22)),
            credential(&id, &account_id(0x22), b"")
        );
    }

    #[test]
    fn test_inputs_are_ordered() {
        let a = account_id(0x11);
        let b = account_id(0x22);

        assert_ne!(pay_channel(&a, &b, 7), pay_channel(&b, &a, 7));
        assert_ne!(escrow(&a, 7), escrow(&a, 8));
        assert_eq!(escrow(&a, 7), escrow(&a, 7));
    }

    #[test]
    fn test_dir_page_zero_is_root() {
        let root = owner_dir(&account_id(0x33));

        assert_eq!(root, dir_page(&root, 0));
        assert_ne!(root, dir_page(&root, 1));
        assert_ne!(dir_page(&root, 1), dir_page(&root, 2));
    }

    #[test]
    fn test_preauth_credentials_key_binds_sorted_set() {
        let owner = account_id(0x44);
        let first = CredentialRef {
            issuer: account_id(0x55),
            credential_type: b"KYC".to_vec(),
        };
        let second = CredentialRef {
            issuer: account_id(0x66),
            credential_type: b"AML".to_vec(),
        };

        let mut forward: Vec<CredentialRef> = vec![first.clone(), second.clone()];
        forward.sort();
        let mut reversed: Vec<CredentialRef> = vec![second, first];
        reversed.sort();

        assert_eq!(
            deposit_preauth_credentials(&owner, &forward),
            deposit_preauth_credentials(&owner, &reversed)
        );
    }
}
