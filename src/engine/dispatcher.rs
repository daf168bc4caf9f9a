//! The transaction dispatcher.
//!
//! A process-wide registry maps each transaction type to a factory for
//! its typed model. The registry is built once at first use — each
//! family contributes its entries — and is read-only afterwards. The
//! two-phase pipeline runs the stateless preflight first and the
//! stateful apply only once preflight passes.

use alloc::boxed::Box;

use hashbrown::HashMap;
use lazy_static::lazy_static;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::engine::apply;
use crate::engine::context::ApplyContext;
use crate::engine::results::TransactionResult;
use crate::engine::rules::Rules;
use crate::models::transactions::{CommonFields, TransactionType};

/// One registered transaction: its stateless and stateful phases plus
/// the commit metadata the outer driver needs.
pub trait Transactor {
    fn transaction_type(&self) -> TransactionType;

    fn common(&self) -> &CommonFields<'_>;

    /// Stateless, signature-free field validation. Returns
    /// `tesSUCCESS` or a `tem` code.
    fn preflight(&self, rules: &Rules) -> TransactionResult;

    /// Stateful check-and-mutate against the context's view.
    fn apply(&self, ctx: &mut ApplyContext<'_>) -> TransactionResult;

    /// Whether this engine's staged changes commit alongside the fee
    /// when apply returns a `tec` code.
    fn applies_on_tec(&self) -> bool {
        false
    }
}

/// Builds a boxed transactor from a parsed transaction value.
pub type TxFactory = fn(&Value) -> Result<Box<dyn Transactor>, TransactionResult>;

/// The type-tag-to-factory registry.
#[derive(Default)]
pub struct TxRegistry {
    factories: HashMap<TransactionType, TxFactory>,
}

impl TxRegistry {
    pub fn new() -> Self {
        TxRegistry::default()
    }

    pub fn register(&mut self, transaction_type: TransactionType, factory: TxFactory) {
        let replaced = self.factories.insert(transaction_type, factory);
        debug_assert!(replaced.is_none(), "duplicate registration");
    }

    fn factory(&self, transaction_type: &TransactionType) -> Option<&TxFactory> {
        self.factories.get(transaction_type)
    }
}

/// The shared deserialization factory: every model in the registry is
/// a serde round-trippable struct.
pub(crate) fn deserialize_factory<T>(value: &Value) -> Result<Box<dyn Transactor>, TransactionResult>
where
    T: DeserializeOwned + Transactor + 'static,
{
    match serde_json::from_value::<T>(value.clone()) {
        Ok(transaction) => Ok(Box::new(transaction)),
        Err(_) => Err(TransactionResult::TemMalformed),
    }
}

lazy_static! {
    static ref REGISTRY: TxRegistry = {
        let mut registry = TxRegistry::new();
        apply::credentials::register(&mut registry);
        apply::deposit_preauth::register(&mut registry);
        apply::escrow::register(&mut registry);
        apply::payment_channel::register(&mut registry);
        registry
    };
}

/// Instantiates the typed transaction for a parsed JSON transaction.
pub fn dispatch(tx: &Value) -> Result<Box<dyn Transactor>, TransactionResult> {
    let type_value = tx
        .get("TransactionType")
        .ok_or(TransactionResult::TemMalformed)?;
    let transaction_type: TransactionType =
        serde_json::from_value(type_value.clone()).map_err(|_| TransactionResult::TemUnknown)?;

    let factory = REGISTRY
        .factory(&transaction_type)
        .ok_or(TransactionResult::TemUnknown)?;

    factory(tx)
}

/// The stateless phase.
pub fn preflight(tx: &dyn Transactor, rules: &Rules) -> TransactionResult {
    tx.preflight(rules)
}

/// The two-phase pipeline: preflight, then apply.
pub fn apply(tx: &dyn Transactor, ctx: &mut ApplyContext<'_>) -> TransactionResult {
    let preflighted = tx.preflight(&ctx.rules);
    if !preflighted.is_success() {
        return preflighted;
    }

    tx.apply(ctx)
}
