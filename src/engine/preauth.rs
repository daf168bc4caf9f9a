//! Credential validation and deposit preauthorization checks shared
//! by EscrowFinish and PaymentChannelClaim.

use alloc::borrow::Cow;
use alloc::vec::Vec;

use crate::core::keylets;
use crate::engine::apply::{adjust_owner_count, read_entry};
use crate::engine::context::ApplyContext;
use crate::engine::results::TransactionResult;
use crate::ledger::directory::dir_remove;
use crate::models::ledger::{Credential, CredentialRef};
use crate::models::{AccountId, LedgerKey};

/// Validates the credentials a sender presents by ledger entry id:
/// each must exist, be about the sender, and be accepted. Expired
/// credentials are deleted on sight and the whole presentation fails
/// with `tecEXPIRED`; whether those deletions survive the failure is
/// the engine's `applies_on_tec` decision.
pub(crate) fn verify_presented_credentials(
    ctx: &mut ApplyContext<'_>,
    credential_ids: &[Cow<'_, str>],
) -> Result<(), TransactionResult> {
    let mut any_expired = false;

    for id in credential_ids {
        let key = LedgerKey::from_hex(id).map_err(|_| TransactionResult::TefInternal)?;
        let credential: Credential = match read_entry(&*ctx.view, &key)? {
            Some(credential) => credential,
            None => return Err(TransactionResult::TecBadCredentials),
        };

        if credential.subject != ctx.account_id {
            return Err(TransactionResult::TecBadCredentials);
        }

        if credential.is_expired(ctx.close_time()) {
            delete_credential(ctx, &key, &credential)?;
            any_expired = true;
            continue;
        }

        if !credential.is_accepted() {
            return Err(TransactionResult::TecBadCredentials);
        }
    }

    if any_expired {
        return Err(TransactionResult::TecExpired);
    }

    Ok(())
}

/// Deletes a credential entry: both directory references, the owning
/// account's reserve slot, and the entry itself.
pub(crate) fn delete_credential(
    ctx: &mut ApplyContext<'_>,
    key: &LedgerKey,
    credential: &Credential,
) -> Result<(), TransactionResult> {
    dir_remove(
        &mut *ctx.view,
        &credential.issuer,
        credential.issuer_node,
        key,
        true,
    )
    .map_err(|_| TransactionResult::TefBadLedger)?;

    if credential.subject != credential.issuer {
        dir_remove(
            &mut *ctx.view,
            &credential.subject,
            credential.subject_node,
            key,
            true,
        )
        .map_err(|_| TransactionResult::TefBadLedger)?;
    }

    let owner = *credential.owner();
    adjust_owner_count(ctx, &owner, -1)?;

    ctx.view
        .erase(key)
        .map_err(|_| TransactionResult::TefBadLedger)?;

    Ok(())
}

/// Whether `destination` has preauthorized deposits from the sender:
/// either an account-based preauthorization, or a credential-set
/// preauthorization matching the presented (already validated)
/// credentials.
pub(crate) fn has_deposit_authorization(
    ctx: &ApplyContext<'_>,
    destination: &AccountId,
    credential_ids: Option<&[Cow<'_, str>]>,
) -> Result<bool, TransactionResult> {
    if ctx
        .view
        .exists(&keylets::deposit_preauth(destination, &ctx.account_id))
    {
        return Ok(true);
    }

    let ids = match credential_ids {
        Some(ids) if !ids.is_empty() => ids,
        _ => return Ok(false),
    };

    let mut references: Vec<CredentialRef> = Vec::with_capacity(ids.len());
    for id in ids {
        let key = LedgerKey::from_hex(id).map_err(|_| TransactionResult::TefInternal)?;
        let credential: Credential =
            read_entry(&*ctx.view, &key)?.ok_or(TransactionResult::TefInternal)?;
        references.push(CredentialRef {
            issuer: credential.issuer,
            credential_type: credential.credential_type,
        });
    }
    references.sort();

    Ok(ctx
        .view
        .exists(&keylets::deposit_preauth_credentials(destination, &references)))
}
