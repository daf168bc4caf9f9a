//! The per-family apply engines and their shared plumbing.
//!
//! Engines follow one discipline for the sender's AccountRoot: the
//! outer driver writes `ctx.account` back after apply, so any change
//! to the sender goes through `ctx.account`, never through the view.
//! The `credit` and `adjust_owner_count` helpers pick the right path
//! per account.

pub mod credentials;
pub mod deposit_preauth;
pub mod escrow;
pub mod payment_channel;

use alloc::vec::Vec;

use crate::engine::context::{ApplyConfig, ApplyContext};
use crate::engine::results::TransactionResult;
use crate::ledger::view::LedgerView;
use crate::models::ledger::{AccountRoot, SerializedLedgerEntry};
use crate::models::transactions::CommonFields;
use crate::models::{parse_drops, AccountId, Drops, LedgerKey};
use crate::core::keylets;

/// Folds an engine's internal result into the single returned code.
pub(crate) fn outcome(result: Result<TransactionResult, TransactionResult>) -> TransactionResult {
    match result {
        Ok(code) | Err(code) => code,
    }
}

/// Folds a preflight result into the single returned code.
pub(crate) fn preflight_outcome(result: Result<(), TransactionResult>) -> TransactionResult {
    match result {
        Ok(()) => TransactionResult::TesSuccess,
        Err(code) => code,
    }
}

/// Shared preflight rule: the source account decodes and is not the
/// reserved zero id.
pub(crate) fn preflight_common(common: &CommonFields<'_>) -> Result<(), TransactionResult> {
    let account = AccountId::from_address(&common.account)
        .map_err(|_| TransactionResult::TemBadSrcAccount)?;

    if account.is_zero() {
        return Err(TransactionResult::TemBadSrcAccount);
    }

    Ok(())
}

/// Shared preflight rule: no flag bits outside the allowed mask.
pub(crate) fn check_flag_mask(
    common: &CommonFields<'_>,
    allowed: u32,
) -> Result<(), TransactionResult> {
    if common.flags() & !allowed != 0 {
        return Err(TransactionResult::TemInvalidFlag);
    }

    Ok(())
}

/// Decodes an account field during apply.
pub(crate) fn decode_account(value: &str) -> Result<AccountId, TransactionResult> {
    AccountId::from_address(value).map_err(|_| TransactionResult::TemInvalid)
}

/// Decodes a hex transport field in preflight, enforcing byte bounds.
pub(crate) fn decode_hex_bounded(
    value: &str,
    min: usize,
    max: usize,
) -> Result<Vec<u8>, TransactionResult> {
    let bytes = hex::decode(value).map_err(|_| TransactionResult::TemMalformed)?;

    if bytes.len() < min || bytes.len() > max {
        return Err(TransactionResult::TemMalformed);
    }

    Ok(bytes)
}

/// Parses a strictly positive native amount in preflight.
pub(crate) fn parse_positive_amount(value: &str) -> Result<Drops, TransactionResult> {
    match parse_drops(value) {
        Some(drops) if drops > 0 => Ok(drops),
        _ => Err(TransactionResult::TemBadAmount),
    }
}

/// Re-parses a field already validated by preflight; a failure here is
/// an engine invariant violation, not a user error.
pub(crate) fn reparse_hex(value: &str) -> Result<Vec<u8>, TransactionResult> {
    hex::decode(value).map_err(|_| TransactionResult::TefInternal)
}

pub(crate) fn reparse_amount(value: &str) -> Result<Drops, TransactionResult> {
    parse_drops(value).ok_or(TransactionResult::TefInternal)
}

/// Loads an AccountRoot by account id, if present.
pub(crate) fn load_account_root(
    view: &dyn LedgerView,
    id: &AccountId,
) -> Result<Option<AccountRoot>, TransactionResult> {
    match view.read(&keylets::account(id)) {
        Some(bytes) => AccountRoot::from_bytes(&bytes)
            .map(Some)
            .map_err(|_| TransactionResult::TefBadLedger),
        None => Ok(None),
    }
}

/// Stamps and updates an AccountRoot other than the sender's.
pub(crate) fn write_account_root(
    view: &mut dyn LedgerView,
    config: &ApplyConfig,
    account: &mut AccountRoot,
) -> Result<(), TransactionResult> {
    account.previous_txn_id = config.tx_id;
    account.previous_txn_lgr_seq = config.ledger_sequence;

    view.update(&keylets::account(&account.account), account.to_bytes())
        .map_err(|_| TransactionResult::TefBadLedger)
}

/// Credits `to` with `amount`, mutating `ctx.account` directly when
/// the target is the sender.
pub(crate) fn credit(
    ctx: &mut ApplyContext<'_>,
    to: &AccountId,
    amount: Drops,
) -> Result<(), TransactionResult> {
    if *to == ctx.account_id {
        ctx.account.balance = ctx
            .account
            .balance
            .checked_add(amount)
            .ok_or(TransactionResult::TefInternal)?;

        return Ok(());
    }

    let mut account =
        load_account_root(&*ctx.view, to)?.ok_or(TransactionResult::TefInternal)?;
    account.balance = account
        .balance
        .checked_add(amount)
        .ok_or(TransactionResult::TefInternal)?;

    write_account_root(&mut *ctx.view, ctx.config, &mut account)
}

/// Adjusts an account's owner count, mutating `ctx.account` directly
/// when the target is the sender.
pub(crate) fn adjust_owner_count(
    ctx: &mut ApplyContext<'_>,
    id: &AccountId,
    delta: i32,
) -> Result<(), TransactionResult> {
    if *id == ctx.account_id {
        ctx.account.owner_count = apply_count_delta(ctx.account.owner_count, delta)?;

        return Ok(());
    }

    let mut account =
        load_account_root(&*ctx.view, id)?.ok_or(TransactionResult::TefInternal)?;
    account.owner_count = apply_count_delta(account.owner_count, delta)?;

    write_account_root(&mut *ctx.view, ctx.config, &mut account)
}

fn apply_count_delta(count: u32, delta: i32) -> Result<u32, TransactionResult> {
    let adjusted = if delta >= 0 {
        count.checked_add(delta as u32)
    } else {
        count.checked_sub(delta.unsigned_abs())
    };

    adjusted.ok_or(TransactionResult::TefInternal)
}

/// Debits the sender's (already fee-reduced) balance.
pub(crate) fn debit_sender(
    ctx: &mut ApplyContext<'_>,
    amount: Drops,
) -> Result<(), TransactionResult> {
    ctx.account.balance = ctx
        .account
        .balance
        .checked_sub(amount)
        .ok_or(TransactionResult::TefInternal)?;

    Ok(())
}

/// Reads a typed entry from the view, if present.
pub(crate) fn read_entry<T: SerializedLedgerEntry>(
    view: &dyn LedgerView,
    key: &LedgerKey,
) -> Result<Option<T>, TransactionResult> {
    match view.read(key) {
        Some(bytes) => T::from_bytes(&bytes)
            .map(Some)
            .map_err(|_| TransactionResult::TefBadLedger),
        None => Ok(None),
    }
}

/// Inserts a freshly created typed entry.
pub(crate) fn insert_entry<T: SerializedLedgerEntry>(
    view: &mut dyn LedgerView,
    key: &LedgerKey,
    entry: &T,
) -> Result<(), TransactionResult> {
    view.insert(key, entry.to_bytes())
        .map_err(|_| TransactionResult::TefBadLedger)
}

/// Rewrites an existing typed entry.
pub(crate) fn update_entry<T: SerializedLedgerEntry>(
    view: &mut dyn LedgerView,
    key: &LedgerKey,
    entry: &T,
) -> Result<(), TransactionResult> {
    view.update(key, entry.to_bytes())
        .map_err(|_| TransactionResult::TefBadLedger)
}

/// Erases an entry that must exist.
pub(crate) fn erase_entry(
    view: &mut dyn LedgerView,
    key: &LedgerKey,
) -> Result<(), TransactionResult> {
    view.erase(key).map_err(|_| TransactionResult::TefBadLedger)
}
