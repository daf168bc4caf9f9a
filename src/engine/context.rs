//! The per-apply execution context.

use crate::engine::rules::Rules;
use crate::ledger::view::LedgerView;
use crate::models::ledger::AccountRoot;
use crate::models::{AccountId, Drops};

/// Ledger-level configuration fixed for the duration of one apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyConfig {
    /// Close time of the parent ledger, in seconds since the Ripple
    /// Epoch. All time gates compare against this.
    pub parent_close_time: u32,
    /// The transaction cost already deducted from the source account's
    /// balance before apply.
    pub base_fee: Drops,
    /// Reserve floor for an account with no owned entries.
    pub base_reserve: Drops,
    /// Additional reserve per owned entry.
    pub owner_reserve: Drops,
    /// Sequence of the ledger under construction; stamped on touched
    /// entries.
    pub ledger_sequence: u32,
    /// Id of the applying transaction; stamped on touched entries.
    pub tx_id: [u8; 32],
}

impl Default for ApplyConfig {
    fn default() -> Self {
        ApplyConfig {
            parent_close_time: 0,
            base_fee: 10,
            base_reserve: 10_000_000,
            owner_reserve: 2_000_000,
            ledger_sequence: 1,
            tx_id: [0; 32],
        }
    }
}

impl ApplyConfig {
    /// The minimum balance for an account owning `owner_count`
    /// entries.
    pub fn reserve(&self, owner_count: u32) -> Drops {
        self.base_reserve
            .saturating_add(self.owner_reserve.saturating_mul(owner_count as u64))
    }
}

/// Everything an apply engine sees: the sender's decoded id, its
/// mutable AccountRoot, the staged view, the ledger configuration and
/// the active amendments.
///
/// The outer driver writes `account` back after apply, so engines must
/// mutate the sender's AccountRoot here and never through the view; a
/// view-level write to it would be overwritten.
pub struct ApplyContext<'a> {
    pub account_id: AccountId,
    pub account: AccountRoot,
    pub view: &'a mut dyn LedgerView,
    pub config: &'a ApplyConfig,
    pub rules: Rules,
    /// The transaction's sequence number, used to derive the keys of
    /// created entries.
    pub sequence: u32,
}

impl ApplyContext<'_> {
    /// The sender's balance before the fee was deducted; reserve
    /// checks measure against this.
    pub fn prior_balance(&self) -> Drops {
        self.account.balance.saturating_add(self.config.base_fee)
    }

    pub fn close_time(&self) -> u32 {
        self.config.parent_close_time
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_reserve_scales_with_owner_count() {
        let config = ApplyConfig::default();

        assert_eq!(10_000_000, config.reserve(0));
        assert_eq!(12_000_000, config.reserve(1));
        assert_eq!(26_000_000, config.reserve(8));
    }
}
