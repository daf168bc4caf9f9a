//! The transaction application engine: dispatch, two-phase execution,
//! and the commit rules around the fee.
//!
//! Application is strictly sequential; one apply owns its context and
//! staged view for its whole (synchronous) duration. `apply_to_ledger`
//! is the reference driver modeling the outer transport: it charges
//! the fee, hands the dispatcher a staged view, and commits or
//! discards the staged changes according to the result class.

pub mod apply;
pub mod context;
pub mod dispatcher;
pub mod preauth;
pub mod results;
pub mod rules;

#[cfg(test)]
pub(crate) mod testing;

use alloc::vec::Vec;

use serde_json::Value;

use crate::core::keylets;
use crate::engine::context::{ApplyConfig, ApplyContext};
use crate::engine::results::TransactionResult;
use crate::engine::rules::Rules;
use crate::ledger::view::{InMemoryLedger, LedgerView, StagedView};
use crate::models::ledger::{AccountRoot, SerializedLedgerEntry};
use crate::models::AccountId;

/// Applies one parsed transaction to the ledger.
///
/// On success the staged changes and the updated source account
/// commit. On a `tec` result only the fee (and, for engines that apply
/// on `tec`, their staged changes) commits. Anything else leaves the
/// ledger untouched.
pub fn apply_to_ledger(
    tx: &Value,
    ledger: &mut InMemoryLedger,
    config: &ApplyConfig,
    rules: Rules,
) -> TransactionResult {
    let transactor = match dispatcher::dispatch(tx) {
        Ok(transactor) => transactor,
        Err(code) => return code,
    };

    let preflighted = transactor.preflight(&rules);
    if !preflighted.is_success() {
        return preflighted;
    }

    let account_id = match AccountId::from_address(&transactor.common().account) {
        Ok(account_id) => account_id,
        Err(_) => return TransactionResult::TefInternal,
    };
    let account_key = keylets::account(&account_id);
    let mut account = match ledger.read(&account_key) {
        Some(bytes) => match AccountRoot::from_bytes(&bytes) {
            Ok(account) => account,
            Err(_) => return TransactionResult::TefBadLedger,
        },
        None => return TransactionResult::TerNoAccount,
    };

    // The fee comes off before apply; reserve checks measure against
    // the prior balance.
    account.balance = match account.balance.checked_sub(config.base_fee) {
        Some(balance) => balance,
        None => return TransactionResult::TerRetry,
    };
    let sequence = transactor.common().sequence.unwrap_or(account.sequence);

    let mut staged = StagedView::new(&*ledger);
    let mut ctx = ApplyContext {
        account_id,
        account: account.clone(),
        view: &mut staged,
        config,
        rules,
        sequence,
    };
    let result = transactor.apply(&mut ctx);
    let applied_account = ctx.account;

    let mut committed = if result.is_success()
        || (result.is_tec() && transactor.applies_on_tec())
    {
        let changes: Vec<_> = staged.into_changes().collect();
        ledger.apply_changes(changes);
        applied_account
    } else if result.is_tec() {
        // Claimed failure: the staged work is discarded, the fee
        // stands.
        account
    } else {
        return result;
    };

    committed.sequence = sequence.saturating_add(1);
    committed.previous_txn_id = config.tx_id;
    committed.previous_txn_lgr_seq = config.ledger_sequence;
    if ledger.update(&account_key, committed.to_bytes()).is_err() {
        return TransactionResult::TefBadLedger;
    }

    result
}
