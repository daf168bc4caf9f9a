//! Apply engine for DepositPreauth: account-based and credential-set
//! based grants and revocations, one mode per transaction.

use alloc::collections::BTreeSet;
use alloc::vec::Vec;

use crate::constants::{MAX_CREDENTIAL_ARRAY_LENGTH, MAX_CREDENTIAL_TYPE_LENGTH};
use crate::core::crypto::sha512_first_half;
use crate::core::keylets;
use crate::engine::apply::{
    adjust_owner_count, check_flag_mask, decode_account, decode_hex_bounded, insert_entry,
    load_account_root, outcome, preflight_common, preflight_outcome, read_entry, reparse_hex,
};
use crate::engine::context::ApplyContext;
use crate::engine::dispatcher::{deserialize_factory, Transactor, TxRegistry};
use crate::engine::results::TransactionResult;
use crate::engine::rules::{Amendment, Rules};
use crate::ledger::directory::{dir_insert, dir_remove};
use crate::models::ledger::{CredentialRef, DepositPreauth as DepositPreauthEntry};
use crate::models::transactions::deposit_preauth::AuthorizeCredential;
use crate::models::transactions::{
    CommonFields, DepositPreauth, TransactionType, TF_FULLY_CANONICAL_SIG,
};
use crate::models::{AccountId, LedgerKey};

pub(crate) fn register(registry: &mut TxRegistry) {
    registry.register(
        TransactionType::DepositPreauth,
        deserialize_factory::<DepositPreauth<'static>>,
    );
}

impl Transactor for DepositPreauth<'static> {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::DepositPreauth
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

fn validate_credential_array(
    credentials: &[AuthorizeCredential<'_>],
) -> Result<(), TransactionResult> {
    if credentials.is_empty() {
        return Err(TransactionResult::TemArrayEmpty);
    }
    if credentials.len() > MAX_CREDENTIAL_ARRAY_LENGTH {
        return Err(TransactionResult::TemArrayTooLarge);
    }

    let mut seen: BTreeSet<[u8; 32]> = BTreeSet::new();
    for wrapper in credentials {
        let credential = &wrapper.credential;
        let issuer = AccountId::from_address(&credential.issuer)
            .map_err(|_| TransactionResult::TemMalformed)?;
        if issuer.is_zero() {
            return Err(TransactionResult::TemMalformed);
        }
        let credential_type =
            decode_hex_bounded(&credential.credential_type, 1, MAX_CREDENTIAL_TYPE_LENGTH)?;

        let mut preimage = Vec::with_capacity(issuer.as_bytes().len() + credential_type.len());
        preimage.extend_from_slice(issuer.as_bytes());
        preimage.extend_from_slice(&credential_type);
        if !seen.insert(sha512_first_half(&preimage)) {
            return Err(TransactionResult::TemMalformed);
        }
    }

    Ok(())
}

/// Decodes, sorts and dedup-checks a credential array during apply.
/// Preflight already vetted the fields, so emerging duplicates are an
/// internal fault.
fn sorted_credential_refs(
    credentials: &[AuthorizeCredential<'_>],
) -> Result<Vec<CredentialRef>, TransactionResult> {
    let mut references: Vec<CredentialRef> = Vec::with_capacity(credentials.len());
    for wrapper in credentials {
        references.push(CredentialRef {
            issuer: decode_account(&wrapper.credential.issuer)?,
            credential_type: reparse_hex(&wrapper.credential.credential_type)?,
        });
    }

    references.sort();
    if references.windows(2).any(|pair| pair[0] == pair[1]) {
        return Err(TransactionResult::TefInternal);
    }

    Ok(references)
}

impl DepositPreauth<'static> {
    fn run_preflight(&self, rules: &Rules) -> Result<(), TransactionResult> {
        if (self.authorize_credentials.is_some() || self.unauthorize_credentials.is_some())
            && !rules.enabled(Amendment::Credentials)
        {
            return Err(TransactionResult::TemDisabled);
        }

        preflight_common(&self.common_fields)?;
        check_flag_mask(&self.common_fields, TF_FULLY_CANONICAL_SIG)?;

        let modes = [
            self.authorize.is_some(),
            self.unauthorize.is_some(),
            self.authorize_credentials.is_some(),
            self.unauthorize_credentials.is_some(),
        ];
        if modes.iter().filter(|present| **present).count() != 1 {
            return Err(TransactionResult::TemMalformed);
        }

        if let Some(authorize) = &self.authorize {
            let authorized = AccountId::from_address(authorize)
                .map_err(|_| TransactionResult::TemMalformed)?;
            if authorized.is_zero() {
                return Err(TransactionResult::TemMalformed);
            }
            if authorize.as_ref() == self.common_fields.account.as_ref() {
                return Err(TransactionResult::TemCannotPreauthSelf);
            }
        }

        if let Some(unauthorize) = &self.unauthorize {
            let unauthorized = AccountId::from_address(unauthorize)
                .map_err(|_| TransactionResult::TemMalformed)?;
            if unauthorized.is_zero() {
                return Err(TransactionResult::TemMalformed);
            }
        }

        if let Some(credentials) = &self.authorize_credentials {
            validate_credential_array(credentials)?;
        }
        if let Some(credentials) = &self.unauthorize_credentials {
            validate_credential_array(credentials)?;
        }

        Ok(())
    }

    fn run_apply(
        &self,
        ctx: &mut ApplyContext<'_>,
    ) -> Result<TransactionResult, TransactionResult> {
        if let Some(authorize) = &self.authorize {
            let authorized = decode_account(authorize)?;
            if load_account_root(&*ctx.view, &authorized)?.is_none() {
                return Err(TransactionResult::TecNoTarget);
            }

            let key = keylets::deposit_preauth(&ctx.account_id, &authorized);
            return self.grant(ctx, key, Some(authorized), None);
        }

        if let Some(unauthorize) = &self.unauthorize {
            let unauthorized = decode_account(unauthorize)?;
            let key = keylets::deposit_preauth(&ctx.account_id, &unauthorized);
            return self.revoke(ctx, key);
        }

        if let Some(credentials) = &self.authorize_credentials {
            let references = sorted_credential_refs(credentials)?;
            for reference in &references {
                if load_account_root(&*ctx.view, &reference.issuer)?.is_none() {
                    return Err(TransactionResult::TecNoIssuer);
                }
            }

            let key = keylets::deposit_preauth_credentials(&ctx.account_id, &references);
            return self.grant(ctx, key, None, Some(references));
        }

        if let Some(credentials) = &self.unauthorize_credentials {
            let references = sorted_credential_refs(credentials)?;
            let key = keylets::deposit_preauth_credentials(&ctx.account_id, &references);
            return self.revoke(ctx, key);
        }

        // Preflight guarantees exactly one mode.
        Err(TransactionResult::TefInternal)
    }

    fn grant(
        &self,
        ctx: &mut ApplyContext<'_>,
        key: LedgerKey,
        authorize: Option<AccountId>,
        authorize_credentials: Option<Vec<CredentialRef>>,
    ) -> Result<TransactionResult, TransactionResult> {
        if ctx.view.exists(&key) {
            return Err(TransactionResult::TecDuplicate);
        }
        if ctx.prior_balance() < ctx.config.reserve(ctx.account.owner_count + 1) {
            return Err(TransactionResult::TecInsufficientReserve);
        }

        let sender = ctx.account_id;
        let owner_node = dir_insert(&mut *ctx.view, &sender, &key)
            .map_err(|_| TransactionResult::TefBadLedger)?;

        let entry = DepositPreauthEntry {
            account: sender,
            authorize,
            authorize_credentials,
            owner_node,
            previous_txn_id: ctx.config.tx_id,
            previous_txn_lgr_seq: ctx.config.ledger_sequence,
        };
        insert_entry(&mut *ctx.view, &key, &entry)?;
        adjust_owner_count(ctx, &sender, 1)?;

        Ok(TransactionResult::TesSuccess)
    }

    fn revoke(
        &self,
        ctx: &mut ApplyContext<'_>,
        key: LedgerKey,
    ) -> Result<TransactionResult, TransactionResult> {
        let entry: DepositPreauthEntry =
            read_entry(&*ctx.view, &key)?.ok_or(TransactionResult::TecNoEntry)?;

        let sender = ctx.account_id;
        dir_remove(&mut *ctx.view, &sender, entry.owner_node, &key, true)
            .map_err(|_| TransactionResult::TefBadLedger)?;
        ctx.view
            .erase(&key)
            .map_err(|_| TransactionResult::TefBadLedger)?;
        adjust_owner_count(ctx, &sender, -1)?;

        Ok(TransactionResult::TesSuccess)
    }
}

#[cfg(test)]
mod test {
    use alloc::borrow::Cow;
    use alloc::vec;
    use alloc::vec::Vec;

    use serde_json::to_value;

    use super::*;
    use crate::engine::testing::{TestEnv, ALICE, BOB, CAROL, DAVE};
    use crate::ledger::view::LedgerView;
    use crate::models::transactions::deposit_preauth::Credential;

    fn authorize(account: &'static str, target: &'static str) -> DepositPreauth<'static> {
        DepositPreauth::new(account.into(), Some(target.into()), None, None, None)
    }

    fn unauthorize(account: &'static str, target: &'static str) -> DepositPreauth<'static> {
        DepositPreauth::new(account.into(), None, Some(target.into()), None, None)
    }

    fn credential_array(
        pairs: &[(&'static str, &'static str)],
    ) -> Vec<AuthorizeCredential<'static>> {
        pairs
            .iter()
            .map(|(issuer, credential_type)| AuthorizeCredential {
                credential: Credential {
                    issuer: Cow::from(*issuer),
                    credential_type: Cow::from(*credential_type),
                },
            })
            .collect()
    }

    #[test]
    fn test_authorize_and_unauthorize_account() {
        let mut env = TestEnv::new();
        env.fund(ALICE);
        env.fund(BOB);

        assert_eq!(
            TransactionResult::TesSuccess,
            env.apply(to_value(authorize(ALICE, BOB)).unwrap())
        );
        assert_eq!(1, env.owner_count(ALICE));
        let key = keylets::deposit_preauth(&env.account_id(ALICE), &env.account_id(BOB));
        assert!(env.ledger.exists(&key));

        assert_eq!(
            TransactionResult::TecDuplicate,
            env.apply(to_value(authorize(ALICE, BOB)).unwrap())
        );

        assert_eq!(
            TransactionResult::TesSuccess,
            env.apply(to_value(unauthorize(ALICE, BOB)).unwrap())
        );
        assert_eq!(0, env.owner_count(ALICE));
        assert!(!env.ledger.exists(&key));
        assert!(!env.has_owner_dir(ALICE));
    }

    #[test]
    fn test_unauthorize_missing_entry() {
        let mut env = TestEnv::new();
        env.fund(ALICE);

        assert_eq!(
            TransactionResult::TecNoEntry,
            env.apply(to_value(unauthorize(ALICE, BOB)).unwrap())
        );
    }

    #[test]
    fn test_authorize_self_is_malformed() {
        let mut env = TestEnv::new();
        env.fund(ALICE);

        assert_eq!(
            TransactionResult::TemCannotPreauthSelf,
            env.apply(to_value(authorize(ALICE, ALICE)).unwrap())
        );
    }

    #[test]
    fn test_authorize_missing_target() {
        let mut env = TestEnv::new();
        env.fund(ALICE);

        assert_eq!(
            TransactionResult::TecNoTarget,
            env.apply(to_value(authorize(ALICE, BOB)).unwrap())
        );
    }

    #[test]
    fn test_exactly_one_mode_required() {
        let mut env = TestEnv::new();
        env.fund(ALICE);
        env.fund(BOB);

        let none = DepositPreauth::new(ALICE.into(), None, None, None, None);
        assert_eq!(
            TransactionResult::TemMalformed,
            env.apply(to_value(none).unwrap())
        );

        let both = DepositPreauth::new(
            ALICE.into(),
            Some(BOB.into()),
            Some(BOB.into()),
            None,
            None,
        );
        assert_eq!(
            TransactionResult::TemMalformed,
            env.apply(to_value(both).unwrap())
        );
    }

    #[test]
    fn test_credential_set_permutation_stability() {
        let mut env = TestEnv::new();
        env.fund(ALICE);
        env.fund(CAROL);
        env.fund(DAVE);

        let grant = DepositPreauth::new(
            ALICE.into(),
            None,
            None,
            Some(credential_array(&[(CAROL, "4B5943"), (DAVE, "414D4C")])),
            None,
        );
        assert_eq!(TransactionResult::TesSuccess, env.apply(to_value(grant).unwrap()));
        assert_eq!(1, env.owner_count(ALICE));
        let entries_after_grant = env.entry_count();

        // Revoking in the opposite order addresses the same entry.
        let revoke = DepositPreauth::new(
            ALICE.into(),
            None,
            None,
            None,
            Some(credential_array(&[(DAVE, "414D4C"), (CAROL, "4B5943")])),
        );
        assert_eq!(TransactionResult::TesSuccess, env.apply(to_value(revoke).unwrap()));
        assert_eq!(0, env.owner_count(ALICE));
        // The preauth entry and the emptied directory page are gone.
        assert_eq!(entries_after_grant - 2, env.entry_count());
    }

    #[test]
    fn test_credential_array_bounds() {
        let mut env = TestEnv::new();
        env.fund(ALICE);
        env.fund(CAROL);

        let empty = DepositPreauth::new(ALICE.into(), None, None, Some(vec![]), None);
        assert_eq!(
            TransactionResult::TemArrayEmpty,
            env.apply(to_value(empty).unwrap())
        );

        let mut nine = Vec::new();
        for index in 0..9u8 {
            nine.push(AuthorizeCredential {
                credential: Credential {
                    issuer: Cow::from(CAROL),
                    credential_type: Cow::from(hex::encode([index + 1])),
                },
            });
        }
        let too_large = DepositPreauth::new(ALICE.into(), None, None, Some(nine.clone()), None);
        assert_eq!(
            TransactionResult::TemArrayTooLarge,
            env.apply(to_value(too_large).unwrap())
        );

        nine.truncate(8);
        let at_cap = DepositPreauth::new(ALICE.into(), None, None, Some(nine), None);
        assert_eq!(TransactionResult::TesSuccess, env.apply(to_value(at_cap).unwrap()));
    }

    #[test]
    fn test_credential_array_duplicates_rejected() {
        let mut env = TestEnv::new();
        env.fund(ALICE);
        env.fund(CAROL);

        let duplicated = DepositPreauth::new(
            ALICE.into(),
            None,
            None,
            Some(credential_array(&[(CAROL, "4B5943"), (CAROL, "4B5943")])),
            None,
        );
        assert_eq!(
            TransactionResult::TemMalformed,
            env.apply(to_value(duplicated).unwrap())
        );
    }

    #[test]
    fn test_credential_set_requires_existing_issuers() {
        let mut env = TestEnv::new();
        env.fund(ALICE);
        env.fund(CAROL);

        let grant = DepositPreauth::new(
            ALICE.into(),
            None,
            None,
            Some(credential_array(&[(CAROL, "4B5943"), (DAVE, "414D4C")])),
            None,
        );
        assert_eq!(TransactionResult::TecNoIssuer, env.apply(to_value(grant).unwrap()));
    }

    #[test]
    fn test_credential_modes_gated_by_amendment() {
        let mut env = TestEnv::new();
        env.fund(ALICE);
        env.fund(CAROL);
        env.rules = Rules::all().without(Amendment::Credentials);

        let grant = DepositPreauth::new(
            ALICE.into(),
            None,
            None,
            Some(credential_array(&[(CAROL, "4B5943")])),
            None,
        );
        assert_eq!(TransactionResult::TemDisabled, env.apply(to_value(grant).unwrap()));

        // Account-based preauthorization is untouched by the gate.
        env.fund(BOB);
        assert_eq!(
            TransactionResult::TesSuccess,
            env.apply(to_value(authorize(ALICE, BOB)).unwrap())
        );
    }
}
