//! Apply engines for the credential family: create, accept, delete.

use crate::constants::credential_flags::LSF_ACCEPTED;
use crate::constants::{MAX_CREDENTIAL_TYPE_LENGTH, MAX_CREDENTIAL_URI_LENGTH};
use crate::core::keylets;
use crate::engine::apply::{
    adjust_owner_count, check_flag_mask, decode_account, decode_hex_bounded, insert_entry,
    load_account_root, outcome, preflight_common, preflight_outcome, read_entry, reparse_hex,
    update_entry,
};
use crate::engine::context::ApplyContext;
use crate::engine::dispatcher::{deserialize_factory, Transactor, TxRegistry};
use crate::engine::preauth::delete_credential;
use crate::engine::results::TransactionResult;
use crate::engine::rules::{Amendment, Rules};
use crate::ledger::directory::dir_insert;
use crate::models::ledger::Credential as CredentialEntry;
use crate::models::transactions::{
    CommonFields, CredentialAccept, CredentialCreate, CredentialDelete, TransactionType,
    TF_FULLY_CANONICAL_SIG,
};
use crate::models::AccountId;

pub(crate) fn register(registry: &mut TxRegistry) {
    registry.register(
        TransactionType::CredentialCreate,
        deserialize_factory::<CredentialCreate<'static>>,
    );
    registry.register(
        TransactionType::CredentialAccept,
        deserialize_factory::<CredentialAccept<'static>>,
    );
    registry.register(
        TransactionType::CredentialDelete,
        deserialize_factory::<CredentialDelete<'static>>,
    );
}

fn preflight_family(common: &CommonFields<'_>, rules: &Rules) -> Result<(), TransactionResult> {
    if !rules.enabled(Amendment::Credentials) {
        return Err(TransactionResult::TemDisabled);
    }
    preflight_common(common)?;
    check_flag_mask(common, TF_FULLY_CANONICAL_SIG)
}

impl Transactor for CredentialCreate<'static> {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::CredentialCreate
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

impl CredentialCreate<'static> {
    fn run_preflight(&self, rules: &Rules) -> Result<(), TransactionResult> {
        preflight_family(&self.common_fields, rules)?;

        let subject = AccountId::from_address(&self.subject)
            .map_err(|_| TransactionResult::TemMalformed)?;
        if subject.is_zero() {
            return Err(TransactionResult::TemMalformed);
        }

        decode_hex_bounded(&self.credential_type, 1, MAX_CREDENTIAL_TYPE_LENGTH)?;
        if let Some(uri) = &self.uri {
            decode_hex_bounded(uri, 1, MAX_CREDENTIAL_URI_LENGTH)?;
        }

        Ok(())
    }

    fn run_apply(
        &self,
        ctx: &mut ApplyContext<'_>,
    ) -> Result<TransactionResult, TransactionResult> {
        let subject = decode_account(&self.subject)?;
        let credential_type = reparse_hex(&self.credential_type)?;

        if load_account_root(&*ctx.view, &subject)?.is_none() {
            return Err(TransactionResult::TecNoTarget);
        }

        let key = keylets::credential(&subject, &ctx.account_id, &credential_type);
        if ctx.view.exists(&key) {
            return Err(TransactionResult::TecDuplicate);
        }

        if let Some(expiration) = self.expiration {
            if ctx.close_time() > expiration {
                return Err(TransactionResult::TecExpired);
            }
        }

        if ctx.prior_balance() < ctx.config.reserve(ctx.account.owner_count + 1) {
            return Err(TransactionResult::TecInsufficientReserve);
        }

        let uri = match &self.uri {
            Some(uri) => Some(reparse_hex(uri)?),
            None => None,
        };

        // A self-issued credential needs no acceptance step.
        let sender = ctx.account_id;
        let mut credential = CredentialEntry {
            subject,
            issuer: sender,
            credential_type,
            uri,
            expiration: self.expiration,
            flags: if subject == sender { LSF_ACCEPTED } else { 0 },
            issuer_node: 0,
            subject_node: 0,
            previous_txn_id: ctx.config.tx_id,
            previous_txn_lgr_seq: ctx.config.ledger_sequence,
        };

        credential.issuer_node = dir_insert(&mut *ctx.view, &sender, &key)
            .map_err(|_| TransactionResult::TefBadLedger)?;
        if subject != sender {
            credential.subject_node = dir_insert(&mut *ctx.view, &subject, &key)
                .map_err(|_| TransactionResult::TefBadLedger)?;
        }

        insert_entry(&mut *ctx.view, &key, &credential)?;
        adjust_owner_count(ctx, &sender, 1)?;

        Ok(TransactionResult::TesSuccess)
    }
}

impl Transactor for CredentialAccept<'static> {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::CredentialAccept
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

impl CredentialAccept<'static> {
    fn run_preflight(&self, rules: &Rules) -> Result<(), TransactionResult> {
        preflight_family(&self.common_fields, rules)?;

        let issuer = AccountId::from_address(&self.issuer)
            .map_err(|_| TransactionResult::TemMalformed)?;
        if issuer.is_zero() {
            return Err(TransactionResult::TemMalformed);
        }

        decode_hex_bounded(&self.credential_type, 1, MAX_CREDENTIAL_TYPE_LENGTH)?;

        Ok(())
    }

    fn run_apply(
        &self,
        ctx: &mut ApplyContext<'_>,
    ) -> Result<TransactionResult, TransactionResult> {
        let issuer = decode_account(&self.issuer)?;
        let credential_type = reparse_hex(&self.credential_type)?;

        let key = keylets::credential(&ctx.account_id, &issuer, &credential_type);
        let mut credential: CredentialEntry =
            read_entry(&*ctx.view, &key)?.ok_or(TransactionResult::TecNoEntry)?;

        if credential.subject != ctx.account_id {
            return Err(TransactionResult::TecBadCredentials);
        }
        if credential.is_accepted() {
            return Err(TransactionResult::TecDuplicate);
        }

        if credential.is_expired(ctx.close_time()) {
            delete_credential(ctx, &key, &credential)?;
            return Err(TransactionResult::TecExpired);
        }

        // Acceptance moves the reserve slot from the issuer to the
        // subject; the directory references were placed at creation.
        let sender = ctx.account_id;
        if sender != issuer {
            if ctx.prior_balance() < ctx.config.reserve(ctx.account.owner_count + 1) {
                return Err(TransactionResult::TecInsufficientReserve);
            }
            adjust_owner_count(ctx, &issuer, -1)?;
            adjust_owner_count(ctx, &sender, 1)?;
        }

        credential.flags |= LSF_ACCEPTED;
        credential.previous_txn_id = ctx.config.tx_id;
        credential.previous_txn_lgr_seq = ctx.config.ledger_sequence;
        update_entry(&mut *ctx.view, &key, &credential)?;

        Ok(TransactionResult::TesSuccess)
    }
}

impl Transactor for CredentialDelete<'static> {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::CredentialDelete
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

impl CredentialDelete<'static> {
    fn run_preflight(&self, rules: &Rules) -> Result<(), TransactionResult> {
        preflight_family(&self.common_fields, rules)?;

        if self.subject.is_none() && self.issuer.is_none() {
            return Err(TransactionResult::TemMalformed);
        }

        for account in [&self.subject, &self.issuer].into_iter().flatten() {
            let decoded = AccountId::from_address(account)
                .map_err(|_| TransactionResult::TemMalformed)?;
            if decoded.is_zero() {
                return Err(TransactionResult::TemMalformed);
            }
        }

        decode_hex_bounded(&self.credential_type, 1, MAX_CREDENTIAL_TYPE_LENGTH)?;

        Ok(())
    }

    fn run_apply(
        &self,
        ctx: &mut ApplyContext<'_>,
    ) -> Result<TransactionResult, TransactionResult> {
        let sender = ctx.account_id;
        let subject = match &self.subject {
            Some(subject) => decode_account(subject)?,
            None => sender,
        };
        let issuer = match &self.issuer {
            Some(issuer) => decode_account(issuer)?,
            None => sender,
        };
        let credential_type = reparse_hex(&self.credential_type)?;

        let key = keylets::credential(&subject, &issuer, &credential_type);
        let credential: CredentialEntry =
            read_entry(&*ctx.view, &key)?.ok_or(TransactionResult::TecNoEntry)?;

        // The parties may always delete; strangers only once expired.
        let expired = credential.is_expired(ctx.close_time());
        if sender != subject && sender != issuer && !expired {
            return Err(TransactionResult::TecNoPermission);
        }

        delete_credential(ctx, &key, &credential)?;

        Ok(TransactionResult::TesSuccess)
    }
}

#[cfg(test)]
mod test {
    use serde_json::to_value;

    use super::*;
    use crate::engine::testing::{TestEnv, ALICE, BOB, CAROL, CLOSE_TIME, DEFAULT_BALANCE};
    use crate::ledger::view::LedgerView;
    use crate::models::ledger::SerializedLedgerEntry;
    use crate::models::transactions::{CredentialAccept, CredentialCreate, CredentialDelete};

    fn create(account: &'static str, subject: &'static str) -> CredentialCreate<'static> {
        CredentialCreate::new(account.into(), subject.into(), "AB".into(), None, None)
    }

    fn read_credential(
        env: &TestEnv,
        subject: &str,
        issuer: &str,
    ) -> Option<CredentialEntry> {
        let key = keylets::credential(
            &env.account_id(subject),
            &env.account_id(issuer),
            &[0xAB],
        );
        env.ledger
            .read(&key)
            .map(|bytes| CredentialEntry::from_bytes(&bytes).unwrap())
    }

    #[test]
    fn test_self_issued_credential_is_auto_accepted() {
        let mut env = TestEnv::new();
        env.fund(ALICE);

        assert_eq!(
            TransactionResult::TesSuccess,
            env.apply(to_value(create(ALICE, ALICE)).unwrap())
        );

        let credential = read_credential(&env, ALICE, ALICE).unwrap();
        assert!(credential.is_accepted());
        assert_eq!(1, env.owner_count(ALICE));
        assert!(env.has_owner_dir(ALICE));

        // Accepting an already-accepted credential is a duplicate, and
        // the fee is still charged.
        let balance_before = env.balance(ALICE);
        assert_eq!(
            TransactionResult::TecDuplicate,
            env.apply(
                to_value(CredentialAccept::new(ALICE.into(), ALICE.into(), "AB".into())).unwrap()
            )
        );
        assert_eq!(balance_before - env.config.base_fee, env.balance(ALICE));
    }

    #[test]
    fn test_cross_account_lifecycle() {
        let mut env = TestEnv::new();
        env.fund(ALICE);
        env.fund(BOB);

        // Create: the issuer pays for the slot, both directories hold
        // the key.
        assert_eq!(
            TransactionResult::TesSuccess,
            env.apply(to_value(create(ALICE, BOB)).unwrap())
        );
        let credential = read_credential(&env, BOB, ALICE).unwrap();
        assert!(!credential.is_accepted());
        assert_eq!(&env.account_id(ALICE), credential.owner());
        assert_eq!(1, env.owner_count(ALICE));
        assert_eq!(0, env.owner_count(BOB));
        assert!(env.has_owner_dir(ALICE));
        assert!(env.has_owner_dir(BOB));

        // Accept: the slot moves from issuer to subject.
        assert_eq!(
            TransactionResult::TesSuccess,
            env.apply(
                to_value(CredentialAccept::new(BOB.into(), ALICE.into(), "AB".into())).unwrap()
            )
        );
        let credential = read_credential(&env, BOB, ALICE).unwrap();
        assert!(credential.is_accepted());
        assert_eq!(0, env.owner_count(ALICE));
        assert_eq!(1, env.owner_count(BOB));

        // Delete by the subject: everything unwinds.
        assert_eq!(
            TransactionResult::TesSuccess,
            env.apply(
                to_value(CredentialDelete::new(
                    BOB.into(),
                    None,
                    Some(ALICE.into()),
                    "AB".into()
                ))
                .unwrap()
            )
        );
        assert!(read_credential(&env, BOB, ALICE).is_none());
        assert_eq!(0, env.owner_count(ALICE));
        assert_eq!(0, env.owner_count(BOB));
        assert!(!env.has_owner_dir(ALICE));
        assert!(!env.has_owner_dir(BOB));
        // Only the two account roots remain.
        assert_eq!(2, env.entry_count());
    }

    #[test]
    fn test_create_requires_existing_subject() {
        let mut env = TestEnv::new();
        env.fund(ALICE);

        assert_eq!(
            TransactionResult::TecNoTarget,
            env.apply(to_value(create(ALICE, BOB)).unwrap())
        );
    }

    #[test]
    fn test_create_duplicate() {
        let mut env = TestEnv::new();
        env.fund(ALICE);
        env.fund(BOB);

        env.apply(to_value(create(ALICE, BOB)).unwrap());
        assert_eq!(
            TransactionResult::TecDuplicate,
            env.apply(to_value(create(ALICE, BOB)).unwrap())
        );
    }

    #[test]
    fn test_create_expired() {
        let mut env = TestEnv::new();
        env.fund(ALICE);
        env.fund(BOB);

        let mut tx = create(ALICE, BOB);
        tx.expiration = Some(CLOSE_TIME - 1);
        assert_eq!(
            TransactionResult::TecExpired,
            env.apply(to_value(tx).unwrap())
        );
        assert!(read_credential(&env, BOB, ALICE).is_none());
        assert_eq!(DEFAULT_BALANCE - env.config.base_fee, env.balance(ALICE));
    }

    #[test]
    fn test_create_insufficient_reserve() {
        let mut env = TestEnv::new();
        env.fund_with(ALICE, 11_000_000);
        env.fund(BOB);

        assert_eq!(
            TransactionResult::TecInsufficientReserve,
            env.apply(to_value(create(ALICE, BOB)).unwrap())
        );
    }

    #[test]
    fn test_credential_type_bounds() {
        let mut env = TestEnv::new();
        env.fund(ALICE);

        let mut tx = create(ALICE, ALICE);
        tx.credential_type = hex::encode(alloc::vec![0x41u8; 64]).into();
        assert_eq!(TransactionResult::TesSuccess, env.apply(to_value(tx).unwrap()));

        let mut tx = create(ALICE, ALICE);
        tx.credential_type = hex::encode(alloc::vec![0x41u8; 65]).into();
        assert_eq!(
            TransactionResult::TemMalformed,
            env.apply(to_value(tx).unwrap())
        );

        let mut tx = create(ALICE, ALICE);
        tx.credential_type = "".into();
        assert_eq!(
            TransactionResult::TemMalformed,
            env.apply(to_value(tx).unwrap())
        );
    }

    #[test]
    fn test_uri_bounds() {
        let mut env = TestEnv::new();
        env.fund(ALICE);

        let mut tx = create(ALICE, ALICE);
        tx.uri = Some(hex::encode(alloc::vec![0x61u8; 256]).into());
        assert_eq!(TransactionResult::TesSuccess, env.apply(to_value(tx).unwrap()));

        let mut tx = create(ALICE, ALICE);
        tx.credential_type = "AC".into();
        tx.uri = Some(hex::encode(alloc::vec![0x61u8; 257]).into());
        assert_eq!(
            TransactionResult::TemMalformed,
            env.apply(to_value(tx).unwrap())
        );
    }

    #[test]
    fn test_family_disabled_without_amendment() {
        let mut env = TestEnv::new();
        env.fund(ALICE);
        env.rules = Rules::all().without(Amendment::Credentials);

        assert_eq!(
            TransactionResult::TemDisabled,
            env.apply(to_value(create(ALICE, ALICE)).unwrap())
        );
    }

    #[test]
    fn test_accept_missing_credential() {
        let mut env = TestEnv::new();
        env.fund(ALICE);
        env.fund(BOB);

        assert_eq!(
            TransactionResult::TecNoEntry,
            env.apply(
                to_value(CredentialAccept::new(BOB.into(), ALICE.into(), "AB".into())).unwrap()
            )
        );
    }

    #[test]
    fn test_delete_permissions() {
        let mut env = TestEnv::new();
        env.fund(ALICE);
        env.fund(BOB);
        env.fund(CAROL);

        let mut tx = create(ALICE, BOB);
        tx.expiration = Some(CLOSE_TIME + 100);
        env.apply(to_value(tx.clone()).unwrap());

        // A stranger may not delete a live credential.
        let delete = CredentialDelete::new(
            CAROL.into(),
            Some(BOB.into()),
            Some(ALICE.into()),
            "AB".into(),
        );
        assert_eq!(
            TransactionResult::TecNoPermission,
            env.apply(to_value(delete.clone()).unwrap())
        );

        // Once expired, anyone may.
        env.set_close_time(CLOSE_TIME + 200);
        assert_eq!(TransactionResult::TesSuccess, env.apply(to_value(delete).unwrap()));
        assert_eq!(0, env.owner_count(ALICE));
        assert_eq!(0, env.owner_count(BOB));
    }

    #[test]
    fn test_delete_requires_subject_or_issuer_field() {
        let mut env = TestEnv::new();
        env.fund(ALICE);

        assert_eq!(
            TransactionResult::TemMalformed,
            env.apply(
                to_value(CredentialDelete::new(ALICE.into(), None, None, "AB".into())).unwrap()
            )
        );
    }
}
