//! Shared fixtures for the apply engine tests.

use serde_json::Value;

use crate::core::keylets;
use crate::engine::apply_to_ledger;
use crate::engine::context::ApplyConfig;
use crate::engine::results::TransactionResult;
use crate::engine::rules::Rules;
use crate::ledger::view::{InMemoryLedger, LedgerView};
use crate::models::ledger::{AccountRoot, SerializedLedgerEntry};
use crate::models::{AccountId, Drops};

pub(crate) const CLOSE_TIME: u32 = 600_000_000;
pub(crate) const DEFAULT_BALANCE: Drops = 100_000_000;

pub(crate) const ALICE: &str = "rf1BiGeXwwQoi8Z2ueFYTEXSwuJYfV2Jpn";
pub(crate) const BOB: &str = "rsA2LpzuawewSBQXkiju3YQTMzW13pAAdW";
pub(crate) const CAROL: &str = "rU4EE1FskCPJw5QkLx1iGgdWiJa6HeqYyb";
pub(crate) const DAVE: &str = "rEhxGqkqPPSxQ3P25J66ft5TwpzV14k2de";

/// A ledger plus its apply configuration and amendment set.
pub(crate) struct TestEnv {
    pub ledger: InMemoryLedger,
    pub config: ApplyConfig,
    pub rules: Rules,
}

impl TestEnv {
    pub fn new() -> Self {
        TestEnv {
            ledger: InMemoryLedger::new(),
            config: ApplyConfig {
                parent_close_time: CLOSE_TIME,
                ..ApplyConfig::default()
            },
            rules: Rules::all(),
        }
    }

    pub fn fund(&mut self, address: &str) {
        self.fund_with(address, DEFAULT_BALANCE);
    }

    pub fn fund_with(&mut self, address: &str, balance: Drops) {
        let id = AccountId::from_address(address).unwrap();
        let root = AccountRoot {
            account: id,
            balance,
            sequence: 1,
            ..AccountRoot::default()
        };
        self.ledger
            .insert(&keylets::account(&id), root.to_bytes())
            .unwrap();
    }

    pub fn set_account_flag(&mut self, address: &str, flag: u32) {
        let mut root = self.account(address);
        root.flags |= flag;
        let id = AccountId::from_address(address).unwrap();
        self.ledger
            .update(&keylets::account(&id), root.to_bytes())
            .unwrap();
    }

    pub fn set_close_time(&mut self, close_time: u32) {
        self.config.parent_close_time = close_time;
    }

    pub fn apply(&mut self, tx: Value) -> TransactionResult {
        apply_to_ledger(&tx, &mut self.ledger, &self.config, self.rules)
    }

    pub fn account(&self, address: &str) -> AccountRoot {
        let id = AccountId::from_address(address).unwrap();
        AccountRoot::from_bytes(&self.ledger.read(&keylets::account(&id)).unwrap()).unwrap()
    }

    pub fn account_id(&self, address: &str) -> AccountId {
        AccountId::from_address(address).unwrap()
    }

    pub fn balance(&self, address: &str) -> Drops {
        self.account(address).balance
    }

    pub fn owner_count(&self, address: &str) -> u32 {
        self.account(address).owner_count
    }

    pub fn has_owner_dir(&self, address: &str) -> bool {
        let id = AccountId::from_address(address).unwrap();
        self.ledger.exists(&keylets::owner_dir(&id))
    }

    pub fn entry_count(&self) -> usize {
        self.ledger.len()
    }
}
