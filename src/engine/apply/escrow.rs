//! Apply engines for the escrow family: create, finish, cancel.

use crate::constants::account_flags::{LSF_DEPOSIT_AUTH, LSF_DISALLOW_XRP, LSF_REQUIRE_DEST_TAG};
use crate::constants::{MAX_CONDITION_LENGTH, MAX_FULFILLMENT_LENGTH};
use crate::core::conditions;
use crate::core::keylets;
use crate::engine::apply::{
    adjust_owner_count, check_flag_mask, credit, debit_sender, decode_account,
    decode_hex_bounded, erase_entry, insert_entry, load_account_root, outcome,
    parse_positive_amount, preflight_common, preflight_outcome, read_entry, reparse_amount,
    reparse_hex,
};
use crate::engine::context::ApplyContext;
use crate::engine::dispatcher::{deserialize_factory, Transactor, TxRegistry};
use crate::engine::preauth::{has_deposit_authorization, verify_presented_credentials};
use crate::engine::results::TransactionResult;
use crate::engine::rules::{Amendment, Rules};
use crate::ledger::directory::{dir_insert, dir_remove};
use crate::models::ledger::Escrow as EscrowEntry;
use crate::models::transactions::{
    CommonFields, EscrowCancel, EscrowCreate, EscrowFinish, TransactionType,
    TF_FULLY_CANONICAL_SIG,
};
use crate::models::AccountId;

pub(crate) fn register(registry: &mut TxRegistry) {
    registry.register(
        TransactionType::EscrowCreate,
        deserialize_factory::<EscrowCreate<'static>>,
    );
    registry.register(
        TransactionType::EscrowFinish,
        deserialize_factory::<EscrowFinish<'static>>,
    );
    registry.register(
        TransactionType::EscrowCancel,
        deserialize_factory::<EscrowCancel<'static>>,
    );
}

fn preflight_family(common: &CommonFields<'_>, rules: &Rules) -> Result<(), TransactionResult> {
    preflight_common(common)?;
    if rules.enabled(Amendment::Fix1543) {
        check_flag_mask(common, TF_FULLY_CANONICAL_SIG)?;
    }

    Ok(())
}

/// Validates a credential-id array in preflight: non-empty, capped,
/// unique, every element a 32-byte hex key.
pub(crate) fn validate_credential_ids(
    credential_ids: &[alloc::borrow::Cow<'_, str>],
) -> Result<(), TransactionResult> {
    use alloc::collections::BTreeSet;

    use crate::constants::MAX_CREDENTIAL_ARRAY_LENGTH;
    use crate::models::LedgerKey;

    if credential_ids.is_empty() {
        return Err(TransactionResult::TemArrayEmpty);
    }
    if credential_ids.len() > MAX_CREDENTIAL_ARRAY_LENGTH {
        return Err(TransactionResult::TemArrayTooLarge);
    }

    let mut seen: BTreeSet<LedgerKey> = BTreeSet::new();
    for id in credential_ids {
        let key = LedgerKey::from_hex(id).map_err(|_| TransactionResult::TemMalformed)?;
        if !seen.insert(key) {
            return Err(TransactionResult::TemMalformed);
        }
    }

    Ok(())
}

impl Transactor for EscrowCreate<'static> {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::EscrowCreate
    }

    fn common(&self) -> &CommonFields<'_> {
        &self.common_fields
    }

    fn preflight(&self, rules: &Rules) -> TransactionResult {
        preflight_outcome(self.run_preflight(rules))
    }

    fn apply(&self, ctx: &mut ApplyContext<'_>) -> TransactionResult {
        outcome(self.run_apply(ctx))
    }
}

impl EscrowCreate<'static> {
    fn run_preflight(&self, rules: &Rules) -> Result<(), TransactionResult> {
        preflight_family(&self.common_fields, rules)?;

        parse_positive_amount(&self.amount)?;

        if self.destination.is_empty() {
            return Err(TransactionResult::TemDstNeeded);
        }

        if self.cancel_after.is_none() && self.finish_after.is_none() {
            return Err(TransactionResult::TemBadExpiration);
        }
        if let (Some(cancel_after), Some(finish_after)) = (self.cancel_after, self.finish_after) {
            if cancel_after <= finish_after {
                return Err(TransactionResult::TemBadExpiration);
            }
        }

        if rules.enabled(Amendment::Fix1571)
            && self.finish_after.is_none()
            && self.condition.is_none()
        {
            return Err(TransactionResult::TemMalformed);
        }

        if let Some(condition) = &self.condition {
            let bytes = hex::decode(condition.as_ref())
                .map_err(|_| TransactionResult::TemMalformed)?;
            conditions::parse_condition(&bytes).map_err(|_| TransactionResult::TemMalformed)?;
        }

        Ok(())
    }

    fn run_apply(
        &self,
        ctx: &mut ApplyContext<'_>,
    ) -> Result<TransactionResult, TransactionResult> {
        let close_time = ctx.close_time();

        // A gate that has already passed at creation could never be
        // satisfied in order.
        for gate in [self.cancel_after, self.finish_after].into_iter().flatten() {
            let passed = if ctx.rules.enabled(Amendment::Fix1571) {
                close_time > gate
            } else {
                close_time >= gate
            };
            if passed {
                return Err(TransactionResult::TecNoPermission);
            }
        }

        let destination = decode_account(&self.destination)?;
        let destination_root = load_account_root(&*ctx.view, &destination)?
            .ok_or(TransactionResult::TecNoDst)?;

        if destination_root.has_flag(LSF_REQUIRE_DEST_TAG) && self.destination_tag.is_none() {
            return Err(TransactionResult::TecDstTagNeeded);
        }
        if !ctx.rules.enabled(Amendment::DepositAuth)
            && destination_root.has_flag(LSF_DISALLOW_XRP)
        {
            return Err(TransactionResult::TecNoTarget);
        }

        let amount = reparse_amount(&self.amount)?;
        let reserve = ctx.config.reserve(ctx.account.owner_count + 1);
        if ctx.prior_balance() < reserve {
            return Err(TransactionResult::TecInsufficientReserve);
        }
        if ctx.prior_balance() < reserve.saturating_add(amount) {
            return Err(TransactionResult::TecUnfunded);
        }

        let condition = match &self.condition {
            Some(condition) => Some(reparse_hex(condition)?),
            None => None,
        };

        debit_sender(ctx, amount)?;

        let sender = ctx.account_id;
        let key = keylets::escrow(&sender, ctx.sequence);
        let mut escrow = EscrowEntry {
            account: sender,
            destination,
            amount,
            condition,
            cancel_after: self.cancel_after,
            finish_after: self.finish_after,
            source_tag: self.common_fields.source_tag,
            destination_tag: self.destination_tag,
            flags: 0,
            owner_node: 0,
            destination_node: None,
            previous_txn_id: ctx.config.tx_id,
            previous_txn_lgr_seq: ctx.config.ledger_sequence,
        };

        escrow.owner_node = dir_insert(&mut *ctx.view, &sender, &key)
            .map_err(|_| TransactionResult::TefBadLedger)?;
        if destination != sender {
            escrow.destination_node = Some(
                dir_insert(&mut *ctx.view, &destination, &key)
                    .map_err(|_| TransactionResult::TefBadLedger)?,
            );
            adjust_owner_count(ctx, &destination, 1)?;
        }

        insert_entry(&mut *ctx.view, &key, &escrow)?;
        adjust_owner_count(ctx, &sender, 1)?;

        Ok(TransactionResult::TesSuccess)
    }
}

impl Transactor for EscrowFinish<'static> {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::EscrowFinish
    }

    fn common(&self) -> &CommonFields<'_> {
        &self.common_fields
    }

    fn preflight(&self, rules: &Rules) -> TransactionResult {
        preflight_outcome(self.run_preflight(rules))
    }

    fn apply(&self, ctx: &mut ApplyContext<'_>) -> TransactionResult {
        outcome(self.run_apply(ctx))
    }
}

impl EscrowFinish<'static> {
    fn run_preflight(&self, rules: &Rules) -> Result<(), TransactionResult> {
        preflight_family(&self.common_fields, rules)?;

        AccountId::from_address(&self.owner).map_err(|_| TransactionResult::TemMalformed)?;

        if self.condition.is_some() != self.fulfillment.is_some() {
            return Err(TransactionResult::TemMalformed);
        }
        if let Some(condition) = &self.condition {
            decode_hex_bounded(condition, 1, MAX_CONDITION_LENGTH)?;
        }
        if let Some(fulfillment) = &self.fulfillment {
            decode_hex_bounded(fulfillment, 1, MAX_FULFILLMENT_LENGTH)?;
        }

        if let Some(credential_ids) = &self.credential_ids {
            if !rules.enabled(Amendment::Credentials) {
                return Err(TransactionResult::TemDisabled);
            }
            validate_credential_ids(credential_ids)?;
        }

        Ok(())
    }

    fn run_apply(
        &self,
        ctx: &mut ApplyContext<'_>,
    ) -> Result<TransactionResult, TransactionResult> {
        if let Some(credential_ids) = &self.credential_ids {
            verify_presented_credentials(ctx, credential_ids)?;
        }

        let owner = decode_account(&self.owner)?;
        let key = keylets::escrow(&owner, self.offer_sequence);
        let escrow: EscrowEntry =
            read_entry(&*ctx.view, &key)?.ok_or(TransactionResult::TecNoTarget)?;

        let close_time = ctx.close_time();
        if let Some(finish_after) = escrow.finish_after {
            if close_time <= finish_after {
                return Err(TransactionResult::TecNoPermission);
            }
        }
        if let Some(cancel_after) = escrow.cancel_after {
            // Pre-fix1571 the cancel gate trips one second early; kept
            // for bug compatibility.
            let cancellable = if ctx.rules.enabled(Amendment::Fix1571) {
                close_time > cancel_after
            } else {
                close_time >= cancel_after
            };
            if cancellable {
                return Err(TransactionResult::TecNoPermission);
            }
        }

        self.check_condition(&escrow)?;

        let destination = escrow.destination;
        let destination_root = load_account_root(&*ctx.view, &destination)?
            .ok_or(TransactionResult::TecNoDst)?;

        if ctx.rules.enabled(Amendment::DepositAuth)
            && destination_root.has_flag(LSF_DEPOSIT_AUTH)
            && ctx.account_id != destination
        {
            let authorized = has_deposit_authorization(
                ctx,
                &destination,
                self.credential_ids.as_deref(),
            )?;
            if !authorized {
                return Err(TransactionResult::TecNoPermission);
            }
        }

        credit(ctx, &destination, escrow.amount)?;

        dir_remove(&mut *ctx.view, &escrow.account, escrow.owner_node, &key, true)
            .map_err(|_| TransactionResult::TefBadLedger)?;
        if let Some(destination_node) = escrow.destination_node {
            dir_remove(&mut *ctx.view, &destination, destination_node, &key, true)
                .map_err(|_| TransactionResult::TefBadLedger)?;
        }

        erase_entry(&mut *ctx.view, &key)?;
        adjust_owner_count(ctx, &escrow.account, -1)?;
        if escrow.account != destination {
            adjust_owner_count(ctx, &destination, -1)?;
        }

        Ok(TransactionResult::TesSuccess)
    }

    /// Reconciles the transaction's condition with the escrow's: both
    /// absent, or both present, byte-equal and satisfied by the
    /// supplied fulfillment.
    fn check_condition(&self, escrow: &EscrowEntry) -> Result<(), TransactionResult> {
        let stored = match &escrow.condition {
            None => {
                if self.condition.is_some() {
                    return Err(TransactionResult::TecCryptoconditionError);
                }
                return Ok(());
            }
            Some(stored) => stored,
        };

        let supplied = self
            .condition
            .as_ref()
            .ok_or(TransactionResult::TecCryptoconditionError)?;
        let supplied = hex::decode(supplied.as_ref())
            .map_err(|_| TransactionResult::TecCryptoconditionError)?;
        if supplied != *stored {
            return Err(TransactionResult::TecCryptoconditionError);
        }

        let fulfillment = self
            .fulfillment
            .as_ref()
            .ok_or(TransactionResult::TecCryptoconditionError)?;
        let fulfillment = hex::decode(fulfillment.as_ref())
            .map_err(|_| TransactionResult::TecCryptoconditionError)?;
        if fulfillment.is_empty() {
            return Err(TransactionResult::TecCryptoconditionError);
        }

        conditions::verify(&fulfillment, stored)
            .map_err(|_| TransactionResult::TecCryptoconditionError)
    }
}

impl Transactor for EscrowCancel<'static> {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::EscrowCancel
    }

    fn common(&self) -> &CommonFields<'_> {
        &self.common_fields
    }

    fn preflight(&self, rules: &Rules) -> TransactionResult {
        preflight_outcome(self.run_preflight(rules))
    }

    fn apply(&self, ctx: &mut ApplyContext<'_>) -> TransactionResult {
        outcome(self.run_apply(ctx))
    }
}

impl EscrowCancel<'static> {
    fn run_preflight(&self, rules: &Rules) -> Result<(), TransactionResult> {
        preflight_family(&self.common_fields, rules)?;
        AccountId::from_address(&self.owner).map_err(|_| TransactionResult::TemMalformed)?;

        Ok(())
    }

    fn run_apply(
        &self,
        ctx: &mut ApplyContext<'_>,
    ) -> Result<TransactionResult, TransactionResult> {
        let owner = decode_account(&self.owner)?;
        let key = keylets::escrow(&owner, self.offer_sequence);
        let escrow: EscrowEntry =
            read_entry(&*ctx.view, &key)?.ok_or(TransactionResult::TecNoTarget)?;

        let cancellable = escrow
            .cancel_after
            .map(|cancel_after| ctx.close_time() > cancel_after)
            .unwrap_or(false);
        if !cancellable {
            return Err(TransactionResult::TecNoPermission);
        }

        credit(ctx, &escrow.account, escrow.amount)?;

        dir_remove(&mut *ctx.view, &escrow.account, escrow.owner_node, &key, true)
            .map_err(|_| TransactionResult::TefBadLedger)?;
        if let Some(destination_node) = escrow.destination_node {
            dir_remove(
                &mut *ctx.view,
                &escrow.destination,
                destination_node,
                &key,
                true,
            )
            .map_err(|_| TransactionResult::TefBadLedger)?;
        }

        erase_entry(&mut *ctx.view, &key)?;
        adjust_owner_count(ctx, &escrow.account, -1)?;
        if escrow.account != escrow.destination {
            adjust_owner_count(ctx, &escrow.destination, -1)?;
        }

        Ok(TransactionResult::TesSuccess)
    }
}

#[cfg(test)]
mod test {
    use alloc::borrow::Cow;
    use alloc::vec;

    use serde_json::to_value;

    use super::*;
    use crate::constants::account_flags::LSF_DEPOSIT_AUTH;
    use crate::engine::testing::{TestEnv, ALICE, BOB, CAROL, CLOSE_TIME, DEFAULT_BALANCE};
    use crate::ledger::view::LedgerView;
    use crate::models::ledger::SerializedLedgerEntry;
    use crate::models::transactions::deposit_preauth::{AuthorizeCredential, Credential};
    use crate::models::transactions::{CredentialAccept, CredentialCreate, DepositPreauth};

    const CONDITION_AAA: &str =
        "A02580209834876DCFB05CB167A5C24953EBA58C4AC89B1ADF57F28F2F9D09AF107EE8F0810103";
    const FULFILLMENT_AAA: &str = "A0058003616161";
    const FULFILLMENT_BBB: &str = "A0058003626262";

    fn create(
        account: &'static str,
        destination: &'static str,
        amount: &'static str,
    ) -> EscrowCreate<'static> {
        EscrowCreate::new(
            account.into(),
            amount.into(),
            destination.into(),
            None,
            None,
            Some(CLOSE_TIME + 100),
            None,
        )
    }

    fn finish(
        account: &'static str,
        owner: &'static str,
        offer_sequence: u32,
    ) -> EscrowFinish<'static> {
        EscrowFinish::new(account.into(), owner.into(), offer_sequence, None, None, None)
    }

    fn escrow_exists(env: &TestEnv, owner: &str, sequence: u32) -> bool {
        env.ledger
            .exists(&keylets::escrow(&env.account_id(owner), sequence))
    }

    #[test]
    fn test_create_and_finish_cross_account() {
        let mut env = TestEnv::new();
        env.fund(ALICE);
        env.fund(BOB);
        let sequence = env.account(ALICE).sequence;

        assert_eq!(
            TransactionResult::TesSuccess,
            env.apply(to_value(create(ALICE, BOB, "10000")).unwrap())
        );
        assert_eq!(DEFAULT_BALANCE - 10_000 - env.config.base_fee, env.balance(ALICE));
        assert_eq!(1, env.owner_count(ALICE));
        assert_eq!(1, env.owner_count(BOB));
        assert!(escrow_exists(&env, ALICE, sequence));

        env.set_close_time(CLOSE_TIME + 101);
        assert_eq!(
            TransactionResult::TesSuccess,
            env.apply(to_value(finish(BOB, ALICE, sequence)).unwrap())
        );
        assert_eq!(
            DEFAULT_BALANCE + 10_000 - env.config.base_fee,
            env.balance(BOB)
        );
        assert_eq!(0, env.owner_count(ALICE));
        assert_eq!(0, env.owner_count(BOB));
        assert!(!escrow_exists(&env, ALICE, sequence));
        assert!(!env.has_owner_dir(ALICE));
        assert!(!env.has_owner_dir(BOB));
    }

    #[test]
    fn test_finish_time_gate_is_strict() {
        let mut env = TestEnv::new();
        env.fund(ALICE);
        env.fund(BOB);
        let sequence = env.account(ALICE).sequence;
        env.apply(to_value(create(ALICE, BOB, "10000")).unwrap());

        // At exactly the finish time the gate is still closed.
        env.set_close_time(CLOSE_TIME + 100);
        assert_eq!(
            TransactionResult::TecNoPermission,
            env.apply(to_value(finish(BOB, ALICE, sequence)).unwrap())
        );

        env.set_close_time(CLOSE_TIME + 101);
        assert_eq!(
            TransactionResult::TesSuccess,
            env.apply(to_value(finish(BOB, ALICE, sequence)).unwrap())
        );
    }

    #[test]
    fn test_finish_cancel_gate_bug_compatibility() {
        // Finish at close == cancel_after: allowed under fix1571,
        // refused before it.
        for (fix1571, expected) in [
            (true, TransactionResult::TesSuccess),
            (false, TransactionResult::TecNoPermission),
        ] {
            let mut env = TestEnv::new();
            if !fix1571 {
                env.rules = Rules::all().without(Amendment::Fix1571);
            }
            env.fund(ALICE);
            env.fund(BOB);
            let sequence = env.account(ALICE).sequence;

            let mut tx = create(ALICE, BOB, "10000");
            tx.finish_after = Some(CLOSE_TIME + 10);
            tx.cancel_after = Some(CLOSE_TIME + 20);
            assert_eq!(TransactionResult::TesSuccess, env.apply(to_value(tx).unwrap()));

            env.set_close_time(CLOSE_TIME + 20);
            assert_eq!(
                expected,
                env.apply(to_value(finish(BOB, ALICE, sequence)).unwrap()),
                "fix1571: {fix1571}"
            );
        }
    }

    #[test]
    fn test_finish_with_condition() {
        let mut env = TestEnv::new();
        env.fund(ALICE);
        env.fund(BOB);
        let sequence = env.account(ALICE).sequence;

        let mut tx = create(ALICE, BOB, "10000");
        tx.condition = Some(CONDITION_AAA.into());
        assert_eq!(TransactionResult::TesSuccess, env.apply(to_value(tx).unwrap()));
        env.set_close_time(CLOSE_TIME + 101);

        // The wrong preimage claims the fee and leaves the escrow.
        let mut bad = finish(BOB, ALICE, sequence);
        bad.condition = Some(CONDITION_AAA.into());
        bad.fulfillment = Some(FULFILLMENT_BBB.into());
        assert_eq!(
            TransactionResult::TecCryptoconditionError,
            env.apply(to_value(bad).unwrap())
        );
        assert!(escrow_exists(&env, ALICE, sequence));

        // Omitting the condition entirely is also a condition error.
        assert_eq!(
            TransactionResult::TecCryptoconditionError,
            env.apply(to_value(finish(BOB, ALICE, sequence)).unwrap())
        );

        let mut good = finish(BOB, ALICE, sequence);
        good.condition = Some(CONDITION_AAA.into());
        good.fulfillment = Some(FULFILLMENT_AAA.into());
        assert_eq!(TransactionResult::TesSuccess, env.apply(to_value(good).unwrap()));
        assert!(!escrow_exists(&env, ALICE, sequence));
    }

    #[test]
    fn test_finish_rejects_unexpected_condition() {
        let mut env = TestEnv::new();
        env.fund(ALICE);
        env.fund(BOB);
        let sequence = env.account(ALICE).sequence;
        env.apply(to_value(create(ALICE, BOB, "10000")).unwrap());
        env.set_close_time(CLOSE_TIME + 101);

        let mut tx = finish(BOB, ALICE, sequence);
        tx.condition = Some(CONDITION_AAA.into());
        tx.fulfillment = Some(FULFILLMENT_AAA.into());
        assert_eq!(
            TransactionResult::TecCryptoconditionError,
            env.apply(to_value(tx).unwrap())
        );
    }

    #[test]
    fn test_condition_and_fulfillment_travel_together() {
        let mut env = TestEnv::new();
        env.fund(ALICE);
        env.fund(BOB);

        let mut tx = finish(BOB, ALICE, 1);
        tx.condition = Some(CONDITION_AAA.into());
        assert_eq!(
            TransactionResult::TemMalformed,
            env.apply(to_value(tx).unwrap())
        );

        let mut tx = finish(BOB, ALICE, 1);
        tx.fulfillment = Some(FULFILLMENT_AAA.into());
        assert_eq!(
            TransactionResult::TemMalformed,
            env.apply(to_value(tx).unwrap())
        );
    }

    #[test]
    fn test_create_validation() {
        let mut env = TestEnv::new();
        env.fund(ALICE);
        env.fund(BOB);

        let mut tx = create(ALICE, BOB, "0");
        tx.amount = "0".into();
        assert_eq!(TransactionResult::TemBadAmount, env.apply(to_value(tx).unwrap()));

        let mut tx = create(ALICE, BOB, "10000");
        tx.finish_after = None;
        tx.cancel_after = None;
        assert_eq!(
            TransactionResult::TemBadExpiration,
            env.apply(to_value(tx).unwrap())
        );

        let mut tx = create(ALICE, BOB, "10000");
        tx.finish_after = Some(CLOSE_TIME + 100);
        tx.cancel_after = Some(CLOSE_TIME + 100);
        assert_eq!(
            TransactionResult::TemBadExpiration,
            env.apply(to_value(tx).unwrap())
        );

        // Without fix1571 a cancel-only escrow is allowed.
        let mut tx = create(ALICE, BOB, "10000");
        tx.finish_after = None;
        tx.cancel_after = Some(CLOSE_TIME + 100);
        assert_eq!(TransactionResult::TemMalformed, env.apply(to_value(tx.clone()).unwrap()));
        env.rules = Rules::all().without(Amendment::Fix1571);
        assert_eq!(TransactionResult::TesSuccess, env.apply(to_value(tx).unwrap()));
    }

    #[test]
    fn test_create_gates_already_passed() {
        let mut env = TestEnv::new();
        env.fund(ALICE);
        env.fund(BOB);

        let mut tx = create(ALICE, BOB, "10000");
        tx.finish_after = Some(CLOSE_TIME - 1);
        assert_eq!(
            TransactionResult::TecNoPermission,
            env.apply(to_value(tx).unwrap())
        );

        // Equality is allowed under fix1571, refused before it.
        let mut tx = create(ALICE, BOB, "10000");
        tx.finish_after = Some(CLOSE_TIME);
        assert_eq!(TransactionResult::TesSuccess, env.apply(to_value(tx.clone()).unwrap()));

        env.rules = Rules::all().without(Amendment::Fix1571);
        assert_eq!(
            TransactionResult::TecNoPermission,
            env.apply(to_value(tx).unwrap())
        );
    }

    #[test]
    fn test_create_funding_checks() {
        let mut env = TestEnv::new();
        env.fund_with(ALICE, 20_000_000);
        env.fund(BOB);

        assert_eq!(
            TransactionResult::TecUnfunded,
            env.apply(to_value(create(ALICE, BOB, "10000000")).unwrap())
        );

        env.fund_with(CAROL, 11_000_000);
        assert_eq!(
            TransactionResult::TecInsufficientReserve,
            env.apply(to_value(create(CAROL, BOB, "100")).unwrap())
        );
    }

    #[test]
    fn test_create_destination_checks() {
        let mut env = TestEnv::new();
        env.fund(ALICE);

        assert_eq!(
            TransactionResult::TecNoDst,
            env.apply(to_value(create(ALICE, BOB, "10000")).unwrap())
        );

        env.fund(BOB);
        env.set_account_flag(BOB, crate::constants::account_flags::LSF_REQUIRE_DEST_TAG);
        assert_eq!(
            TransactionResult::TecDstTagNeeded,
            env.apply(to_value(create(ALICE, BOB, "10000")).unwrap())
        );
        let mut tx = create(ALICE, BOB, "10000");
        tx.destination_tag = Some(7);
        assert_eq!(TransactionResult::TesSuccess, env.apply(to_value(tx).unwrap()));
    }

    #[test]
    fn test_create_disallow_xrp_bug_compatibility() {
        let mut env = TestEnv::new();
        env.fund(ALICE);
        env.fund(BOB);
        env.set_account_flag(BOB, LSF_DISALLOW_XRP);

        // Advisory only once DepositAuth is active.
        assert_eq!(
            TransactionResult::TesSuccess,
            env.apply(to_value(create(ALICE, BOB, "10000")).unwrap())
        );

        env.rules = Rules::all().without(Amendment::DepositAuth);
        assert_eq!(
            TransactionResult::TecNoTarget,
            env.apply(to_value(create(ALICE, BOB, "10000")).unwrap())
        );
    }

    #[test]
    fn test_finish_deposit_auth() {
        let mut env = TestEnv::new();
        env.fund(ALICE);
        env.fund(BOB);
        env.set_account_flag(BOB, LSF_DEPOSIT_AUTH);
        let sequence = env.account(ALICE).sequence;
        env.apply(to_value(create(ALICE, BOB, "10000")).unwrap());
        env.set_close_time(CLOSE_TIME + 101);

        assert_eq!(
            TransactionResult::TecNoPermission,
            env.apply(to_value(finish(ALICE, ALICE, sequence)).unwrap())
        );

        // An account preauthorization from the destination opens the
        // gate.
        let preauth = DepositPreauth::new(BOB.into(), Some(ALICE.into()), None, None, None);
        assert_eq!(TransactionResult::TesSuccess, env.apply(to_value(preauth).unwrap()));
        assert_eq!(
            TransactionResult::TesSuccess,
            env.apply(to_value(finish(ALICE, ALICE, sequence)).unwrap())
        );
    }

    #[test]
    fn test_finish_credential_preauth() {
        let mut env = TestEnv::new();
        env.fund(ALICE);
        env.fund(BOB);
        env.fund(CAROL);
        env.set_account_flag(BOB, LSF_DEPOSIT_AUTH);
        let sequence = env.account(ALICE).sequence;
        env.apply(to_value(create(ALICE, BOB, "10000")).unwrap());
        env.set_close_time(CLOSE_TIME + 101);

        // The destination trusts holders of Carol's KYC credential.
        let grant = DepositPreauth::new(
            BOB.into(),
            None,
            None,
            Some(vec![AuthorizeCredential {
                credential: Credential {
                    issuer: CAROL.into(),
                    credential_type: Cow::from("4B5943"),
                },
            }]),
            None,
        );
        assert_eq!(TransactionResult::TesSuccess, env.apply(to_value(grant).unwrap()));

        let issue = CredentialCreate::new(
            CAROL.into(),
            ALICE.into(),
            "4B5943".into(),
            None,
            None,
        );
        assert_eq!(TransactionResult::TesSuccess, env.apply(to_value(issue).unwrap()));
        let accept = CredentialAccept::new(ALICE.into(), CAROL.into(), "4B5943".into());
        assert_eq!(TransactionResult::TesSuccess, env.apply(to_value(accept).unwrap()));

        let credential_key = keylets::credential(
            &env.account_id(ALICE),
            &env.account_id(CAROL),
            &[0x4B, 0x59, 0x43],
        );
        let mut tx = finish(ALICE, ALICE, sequence);
        tx.credential_ids = Some(vec![Cow::from(credential_key.to_hex())]);
        assert_eq!(TransactionResult::TesSuccess, env.apply(to_value(tx).unwrap()));
        // The escrow slot is released; the accepted credential stays.
        assert_eq!(1, env.owner_count(ALICE));
    }

    #[test]
    fn test_finish_missing_escrow() {
        let mut env = TestEnv::new();
        env.fund(ALICE);
        env.fund(BOB);

        assert_eq!(
            TransactionResult::TecNoTarget,
            env.apply(to_value(finish(BOB, ALICE, 99)).unwrap())
        );
    }

    #[test]
    fn test_cancel_gate_and_refund() {
        let mut env = TestEnv::new();
        env.fund(ALICE);
        env.fund(BOB);
        let sequence = env.account(ALICE).sequence;

        let mut tx = create(ALICE, BOB, "10000");
        tx.finish_after = Some(CLOSE_TIME + 10);
        tx.cancel_after = Some(CLOSE_TIME + 20);
        env.apply(to_value(tx).unwrap());
        let balance_after_create = env.balance(ALICE);

        let cancel = EscrowCancel::new(BOB.into(), ALICE.into(), sequence);
        // Not cancellable at or before the cancel time.
        env.set_close_time(CLOSE_TIME + 20);
        assert_eq!(
            TransactionResult::TecNoPermission,
            env.apply(to_value(cancel.clone()).unwrap())
        );

        env.set_close_time(CLOSE_TIME + 21);
        assert_eq!(TransactionResult::TesSuccess, env.apply(to_value(cancel).unwrap()));
        assert_eq!(balance_after_create + 10_000, env.balance(ALICE));
        assert_eq!(0, env.owner_count(ALICE));
        assert_eq!(0, env.owner_count(BOB));
        assert!(!escrow_exists(&env, ALICE, sequence));
    }

    #[test]
    fn test_cancel_without_cancel_after() {
        let mut env = TestEnv::new();
        env.fund(ALICE);
        env.fund(BOB);
        let sequence = env.account(ALICE).sequence;
        env.apply(to_value(create(ALICE, BOB, "10000")).unwrap());

        env.set_close_time(CLOSE_TIME + 10_000);
        assert_eq!(
            TransactionResult::TecNoPermission,
            env.apply(to_value(EscrowCancel::new(ALICE.into(), ALICE.into(), sequence)).unwrap())
        );
    }

    #[test]
    fn test_self_escrow_bookkeeping() {
        let mut env = TestEnv::new();
        env.fund(ALICE);
        let sequence = env.account(ALICE).sequence;

        env.apply(to_value(create(ALICE, ALICE, "10000")).unwrap());
        assert_eq!(1, env.owner_count(ALICE));

        env.set_close_time(CLOSE_TIME + 101);
        assert_eq!(
            TransactionResult::TesSuccess,
            env.apply(to_value(finish(ALICE, ALICE, sequence)).unwrap())
        );
        assert_eq!(0, env.owner_count(ALICE));
        // Only the fees left the account.
        assert_eq!(
            DEFAULT_BALANCE - 2 * env.config.base_fee,
            env.balance(ALICE)
        );
    }

    #[test]
    fn test_balances_conserve_across_transfer() {
        let mut env = TestEnv::new();
        env.fund(ALICE);
        env.fund(BOB);
        let sequence = env.account(ALICE).sequence;

        env.apply(to_value(create(ALICE, BOB, "25000")).unwrap());
        env.set_close_time(CLOSE_TIME + 101);
        env.apply(to_value(finish(BOB, ALICE, sequence)).unwrap());

        // Two fees burned, 25k moved from Alice to Bob.
        assert_eq!(
            2 * DEFAULT_BALANCE - 2 * env.config.base_fee,
            env.balance(ALICE) + env.balance(BOB)
        );
        assert_eq!(DEFAULT_BALANCE - 25_000 - env.config.base_fee, env.balance(ALICE));
    }
}
