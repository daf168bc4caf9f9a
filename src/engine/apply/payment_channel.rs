//! Apply engines for the payment channel family: create, fund, claim.

use crate::constants::account_flags::{LSF_DEPOSIT_AUTH, LSF_DISALLOW_XRP, LSF_REQUIRE_DEST_TAG};
use crate::core::crypto::{is_valid_claim_signature, is_valid_key_shape};
use crate::core::keylets;
use crate::engine::apply::escrow::validate_credential_ids;
use crate::engine::apply::{
    adjust_owner_count, check_flag_mask, credit, debit_sender, decode_account, erase_entry,
    insert_entry, load_account_root, outcome, parse_positive_amount, preflight_common,
    preflight_outcome, read_entry, reparse_amount, reparse_hex, update_entry,
};
use crate::engine::context::ApplyContext;
use crate::engine::dispatcher::{deserialize_factory, Transactor, TxRegistry};
use crate::engine::preauth::{has_deposit_authorization, verify_presented_credentials};
use crate::engine::results::TransactionResult;
use crate::engine::rules::{Amendment, Rules};
use crate::ledger::directory::{dir_insert, dir_remove};
use crate::models::ledger::PayChannel as PayChannelEntry;
use crate::models::parse_drops;
use crate::models::transactions::payment_channel_claim::PaymentChannelClaimFlag;
use crate::models::transactions::{
    CommonFields, PaymentChannelClaim, PaymentChannelCreate, PaymentChannelFund, TransactionType,
    TF_FULLY_CANONICAL_SIG,
};
use crate::models::{Drops, LedgerKey};

pub(crate) fn register(registry: &mut TxRegistry) {
    registry.register(
        TransactionType::PaymentChannelCreate,
        deserialize_factory::<PaymentChannelCreate<'static>>,
    );
    registry.register(
        TransactionType::PaymentChannelFund,
        deserialize_factory::<PaymentChannelFund<'static>>,
    );
    registry.register(
        TransactionType::PaymentChannelClaim,
        deserialize_factory::<PaymentChannelClaim<'static>>,
    );
}

fn preflight_family(
    common: &CommonFields<'_>,
    rules: &Rules,
    allowed_flags: u32,
) -> Result<(), TransactionResult> {
    if !rules.enabled(Amendment::PayChan) {
        return Err(TransactionResult::TemDisabled);
    }
    preflight_common(common)?;
    if rules.enabled(Amendment::Fix1543) {
        check_flag_mask(common, allowed_flags)?;
    }

    Ok(())
}

/// Removes a channel from the ledger, returning the undelivered
/// remainder to the owner.
fn close_channel(
    ctx: &mut ApplyContext<'_>,
    key: &LedgerKey,
    channel: &PayChannelEntry,
) -> Result<TransactionResult, TransactionResult> {
    dir_remove(&mut *ctx.view, &channel.account, channel.owner_node, key, true)
        .map_err(|_| TransactionResult::TefBadLedger)?;
    if let Some(destination_node) = channel.destination_node {
        dir_remove(
            &mut *ctx.view,
            &channel.destination,
            destination_node,
            key,
            true,
        )
        .map_err(|_| TransactionResult::TefBadLedger)?;
        adjust_owner_count(ctx, &channel.destination, -1)?;
    }

    let remainder = channel
        .amount
        .checked_sub(channel.balance)
        .ok_or(TransactionResult::TefBadLedger)?;
    credit(ctx, &channel.account, remainder)?;
    adjust_owner_count(ctx, &channel.account, -1)?;

    erase_entry(&mut *ctx.view, key)?;

    Ok(TransactionResult::TesSuccess)
}

impl Transactor for PaymentChannelCreate<'static> {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::PaymentChannelCreate
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

impl PaymentChannelCreate<'static> {
    fn run_preflight(&self, rules: &Rules) -> Result<(), TransactionResult> {
        preflight_family(&self.common_fields, rules, TF_FULLY_CANONICAL_SIG)?;

        parse_positive_amount(&self.amount)?;

        if self.destination.as_ref() == self.common_fields.account.as_ref() {
            return Err(TransactionResult::TemDstIsSrc);
        }

        let public_key =
            hex::decode(self.public_key.as_ref()).map_err(|_| TransactionResult::TemMalformed)?;
        if !is_valid_key_shape(&public_key) {
            return Err(TransactionResult::TemMalformed);
        }

        Ok(())
    }

    fn run_apply(
        &self,
        ctx: &mut ApplyContext<'_>,
    ) -> Result<TransactionResult, TransactionResult> {
        let amount = reparse_amount(&self.amount)?;

        let reserve = ctx.config.reserve(ctx.account.owner_count + 1);
        if ctx.prior_balance() < reserve {
            return Err(TransactionResult::TecInsufficientReserve);
        }
        if ctx.prior_balance() < reserve.saturating_add(amount) {
            return Err(TransactionResult::TecUnfunded);
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

        debit_sender(ctx, amount)?;

        let sender = ctx.account_id;
        let key = keylets::pay_channel(&sender, &destination, ctx.sequence);
        let mut channel = PayChannelEntry {
            account: sender,
            destination,
            amount,
            balance: 0,
            settle_delay: self.settle_delay,
            public_key: reparse_hex(&self.public_key)?,
            cancel_after: self.cancel_after,
            expiration: None,
            source_tag: self.common_fields.source_tag,
            destination_tag: self.destination_tag,
            flags: 0,
            owner_node: 0,
            destination_node: None,
            previous_txn_id: ctx.config.tx_id,
            previous_txn_lgr_seq: ctx.config.ledger_sequence,
        };

        channel.owner_node = dir_insert(&mut *ctx.view, &sender, &key)
            .map_err(|_| TransactionResult::TefBadLedger)?;
        channel.destination_node = Some(
            dir_insert(&mut *ctx.view, &destination, &key)
                .map_err(|_| TransactionResult::TefBadLedger)?,
        );
        adjust_owner_count(ctx, &destination, 1)?;

        insert_entry(&mut *ctx.view, &key, &channel)?;
        adjust_owner_count(ctx, &sender, 1)?;

        Ok(TransactionResult::TesSuccess)
    }
}

impl Transactor for PaymentChannelFund<'static> {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::PaymentChannelFund
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

impl PaymentChannelFund<'static> {
    fn run_preflight(&self, rules: &Rules) -> Result<(), TransactionResult> {
        preflight_family(&self.common_fields, rules, TF_FULLY_CANONICAL_SIG)?;

        LedgerKey::from_hex(&self.channel).map_err(|_| TransactionResult::TemMalformed)?;
        parse_positive_amount(&self.amount)?;

        Ok(())
    }

    fn run_apply(
        &self,
        ctx: &mut ApplyContext<'_>,
    ) -> Result<TransactionResult, TransactionResult> {
        let key = LedgerKey::from_hex(&self.channel).map_err(|_| TransactionResult::TefInternal)?;
        let mut channel: PayChannelEntry =
            read_entry(&*ctx.view, &key)?.ok_or(TransactionResult::TecNoEntry)?;

        if channel.is_closing(ctx.close_time()) {
            return close_channel(ctx, &key, &channel);
        }

        if channel.account != ctx.account_id {
            return Err(TransactionResult::TecNoPermission);
        }

        if let Some(requested) = self.expiration {
            // A new expiration can never land inside the settle delay,
            // no matter what the channel currently carries.
            let floor = ctx.close_time().saturating_add(channel.settle_delay);
            if requested < floor {
                return Err(TransactionResult::TemBadExpiration);
            }
            channel.expiration = Some(requested);
        }

        let amount = reparse_amount(&self.amount)?;
        let reserve = ctx.config.reserve(ctx.account.owner_count);
        if ctx.prior_balance() < reserve {
            return Err(TransactionResult::TecInsufficientReserve);
        }
        if ctx.prior_balance() < reserve.saturating_add(amount) {
            return Err(TransactionResult::TecUnfunded);
        }

        if load_account_root(&*ctx.view, &channel.destination)?.is_none() {
            return Err(TransactionResult::TecNoDst);
        }

        debit_sender(ctx, amount)?;
        channel.amount = channel
            .amount
            .checked_add(amount)
            .ok_or(TransactionResult::TefInternal)?;
        channel.previous_txn_id = ctx.config.tx_id;
        channel.previous_txn_lgr_seq = ctx.config.ledger_sequence;
        update_channel(ctx, &key, &channel)?;

        Ok(TransactionResult::TesSuccess)
    }
}

fn update_channel(
    ctx: &mut ApplyContext<'_>,
    key: &LedgerKey,
    channel: &PayChannelEntry,
) -> Result<(), TransactionResult> {
    update_entry(&mut *ctx.view, key, channel)
}

impl Transactor for PaymentChannelClaim<'static> {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::PaymentChannelClaim
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

    /// Expired-credential deletions made while validating the
    /// presented credentials commit alongside the fee.
    fn applies_on_tec(&self) -> bool {
        true
    }
}

impl PaymentChannelClaim<'static> {
    fn renew_requested(&self) -> bool {
        self.common_fields.flags() & PaymentChannelClaimFlag::TfRenew as u32 != 0
    }

    fn close_requested(&self) -> bool {
        self.common_fields.flags() & PaymentChannelClaimFlag::TfClose as u32 != 0
    }

    fn run_preflight(&self, rules: &Rules) -> Result<(), TransactionResult> {
        let allowed = TF_FULLY_CANONICAL_SIG
            | PaymentChannelClaimFlag::TfRenew as u32
            | PaymentChannelClaimFlag::TfClose as u32;
        preflight_family(&self.common_fields, rules, allowed)?;

        LedgerKey::from_hex(&self.channel).map_err(|_| TransactionResult::TemMalformed)?;

        if self.renew_requested() && self.close_requested() {
            return Err(TransactionResult::TemMalformed);
        }

        let balance = match &self.balance {
            Some(balance) => Some(parse_positive_amount(balance)?),
            None => None,
        };
        let amount = match &self.amount {
            Some(amount) => Some(parse_positive_amount(amount)?),
            None => None,
        };
        if let (Some(balance), Some(amount)) = (balance, amount) {
            if balance > amount {
                return Err(TransactionResult::TemBadAmount);
            }
        }

        if let Some(signature) = &self.signature {
            if self.balance.is_none() {
                return Err(TransactionResult::TemMalformed);
            }
            hex::decode(signature.as_ref()).map_err(|_| TransactionResult::TemMalformed)?;

            let public_key = self
                .public_key
                .as_ref()
                .ok_or(TransactionResult::TemMalformed)?;
            let public_key =
                hex::decode(public_key.as_ref()).map_err(|_| TransactionResult::TemMalformed)?;
            if !is_valid_key_shape(&public_key) {
                return Err(TransactionResult::TemMalformed);
            }
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

        let key = LedgerKey::from_hex(&self.channel).map_err(|_| TransactionResult::TefInternal)?;
        let mut channel: PayChannelEntry =
            read_entry(&*ctx.view, &key)?.ok_or(TransactionResult::TecNoTarget)?;

        if channel.is_closing(ctx.close_time()) {
            return close_channel(ctx, &key, &channel);
        }

        let sender = ctx.account_id;
        let is_owner = sender == channel.account;
        let is_destination = sender == channel.destination;
        if !is_owner && !is_destination {
            return Err(TransactionResult::TecNoPermission);
        }

        if let Some(balance) = &self.balance {
            let balance = parse_drops(balance).ok_or(TransactionResult::TefInternal)?;
            self.claim(ctx, &key, &mut channel, balance, is_owner, is_destination)?;
        }

        if self.renew_requested() {
            if !is_owner {
                return Err(TransactionResult::TecNoPermission);
            }
            channel.expiration = None;
        }

        if self.close_requested() {
            // The destination closes unconditionally; the owner only
            // immediately once the channel is dry, and otherwise
            // schedules the close one settle delay out.
            if is_destination || channel.balance == channel.amount {
                return close_channel(ctx, &key, &channel);
            }

            let scheduled = ctx.close_time().saturating_add(channel.settle_delay);
            channel.expiration = Some(match channel.expiration {
                Some(current) => current.min(scheduled),
                None => scheduled,
            });
        }

        channel.previous_txn_id = ctx.config.tx_id;
        channel.previous_txn_lgr_seq = ctx.config.ledger_sequence;
        update_channel(ctx, &key, &channel)?;

        Ok(TransactionResult::TesSuccess)
    }

    fn claim(
        &self,
        ctx: &mut ApplyContext<'_>,
        key: &LedgerKey,
        channel: &mut PayChannelEntry,
        balance: Drops,
        is_owner: bool,
        is_destination: bool,
    ) -> Result<(), TransactionResult> {
        // The destination cannot take funds without the owner's
        // signed authorization.
        if is_destination && self.signature.is_none() {
            return Err(TransactionResult::TemBadSignature);
        }

        if let Some(signature) = &self.signature {
            let authorized = match &self.amount {
                Some(amount) => parse_drops(amount).ok_or(TransactionResult::TefInternal)?,
                None => balance,
            };
            if balance > authorized {
                return Err(TransactionResult::TemBadAmount);
            }

            let public_key = self
                .public_key
                .as_ref()
                .ok_or(TransactionResult::TefInternal)?;
            let public_key = reparse_hex(public_key)?;
            if public_key != channel.public_key {
                return Err(TransactionResult::TemBadSigner);
            }

            let signature = reparse_hex(signature)?;
            if !is_valid_claim_signature(&public_key, &signature, &key.0, authorized) {
                return Err(TransactionResult::TemBadSignature);
            }
        }

        if balance > channel.amount {
            return Err(TransactionResult::TecUnfundedPayment);
        }
        if balance <= channel.balance {
            return Err(TransactionResult::TecUnfundedPayment);
        }

        let destination = channel.destination;
        let destination_root = load_account_root(&*ctx.view, &destination)?
            .ok_or(TransactionResult::TecNoDst)?;

        // Pre-DepositAuth the DisallowXRP advisory flag was enforced
        // on deliveries pushed by the owner; kept for bug
        // compatibility.
        if !ctx.rules.enabled(Amendment::DepositAuth)
            && is_owner
            && destination_root.has_flag(LSF_DISALLOW_XRP)
        {
            return Err(TransactionResult::TecNoTarget);
        }

        if ctx.rules.enabled(Amendment::DepositAuth)
            && destination_root.has_flag(LSF_DEPOSIT_AUTH)
            && !is_destination
        {
            let authorized =
                has_deposit_authorization(ctx, &destination, self.credential_ids.as_deref())?;
            if !authorized {
                return Err(TransactionResult::TecNoPermission);
            }
        }

        let delivered = balance
            .checked_sub(channel.balance)
            .ok_or(TransactionResult::TefInternal)?;
        credit(ctx, &destination, delivered)?;
        channel.balance = balance;

        Ok(())
    }
}
