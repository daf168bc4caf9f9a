//! A mutable, scoped view over ledger state.
//!
//! `StagedView` buffers writes over a read-only base. Reads within the
//! same apply observe earlier writes (read-your-writes); committing or
//! discarding the staged changes is the caller's decision after the
//! apply returns.

use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::ledger::exceptions::XRPLLedgerException;
use crate::models::LedgerKey;

/// Scoped read/write/erase over keyed entry bytes.
pub trait LedgerView {
    fn read(&self, key: &LedgerKey) -> Option<Vec<u8>>;

    fn exists(&self, key: &LedgerKey) -> bool;

    fn insert(&mut self, key: &LedgerKey, value: Vec<u8>) -> Result<(), XRPLLedgerException>;

    fn update(&mut self, key: &LedgerKey, value: Vec<u8>) -> Result<(), XRPLLedgerException>;

    fn erase(&mut self, key: &LedgerKey) -> Result<(), XRPLLedgerException>;
}

/// Plain map-backed ledger state, the commit target of staged views.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    entries: HashMap<LedgerKey, Vec<u8>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        InMemoryLedger::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Applies a change set produced by [`StagedView::into_changes`]:
    /// `Some` upserts the value, `None` removes the key.
    pub fn apply_changes(
        &mut self,
        changes: impl IntoIterator<Item = (LedgerKey, Option<Vec<u8>>)>,
    ) {
        for (key, change) in changes {
            match change {
                Some(value) => {
                    self.entries.insert(key, value);
                }
                None => {
                    self.entries.remove(&key);
                }
            }
        }
    }
}

impl LedgerView for InMemoryLedger {
    fn read(&self, key: &LedgerKey) -> Option<Vec<u8>> {
        self.entries.get(key).cloned()
    }

    fn exists(&self, key: &LedgerKey) -> bool {
        self.entries.contains_key(key)
    }

    fn insert(&mut self, key: &LedgerKey, value: Vec<u8>) -> Result<(), XRPLLedgerException> {
        if self.entries.contains_key(key) {
            return Err(XRPLLedgerException::EntryExists);
        }
        self.entries.insert(*key, value);

        Ok(())
    }

    fn update(&mut self, key: &LedgerKey, value: Vec<u8>) -> Result<(), XRPLLedgerException> {
        if !self.entries.contains_key(key) {
            return Err(XRPLLedgerException::EntryNotFound);
        }
        self.entries.insert(*key, value);

        Ok(())
    }

    fn erase(&mut self, key: &LedgerKey) -> Result<(), XRPLLedgerException> {
        self.entries
            .remove(key)
            .map(|_| ())
            .ok_or(XRPLLedgerException::EntryNotFound)
    }
}

/// A write buffer over a base view. `Some` marks an upserted value,
/// `None` a staged erasure.
#[derive(Debug)]
pub struct StagedView<'a, V: LedgerView> {
    base: &'a V,
    staged: HashMap<LedgerKey, Option<Vec<u8>>>,
}

impl<'a, V: LedgerView> StagedView<'a, V> {
    pub fn new(base: &'a V) -> Self {
        StagedView {
            base,
            staged: HashMap::new(),
        }
    }

    /// Consumes the view and returns the staged change set.
    pub fn into_changes(self) -> impl Iterator<Item = (LedgerKey, Option<Vec<u8>>)> {
        self.staged.into_iter()
    }
}

impl<V: LedgerView> LedgerView for StagedView<'_, V> {
    fn read(&self, key: &LedgerKey) -> Option<Vec<u8>> {
        match self.staged.get(key) {
            Some(Some(value)) => Some(value.clone()),
            Some(None) => None,
            None => self.base.read(key),
        }
    }

    fn exists(&self, key: &LedgerKey) -> bool {
        match self.staged.get(key) {
            Some(staged) => staged.is_some(),
            None => self.base.exists(key),
        }
    }

    fn insert(&mut self, key: &LedgerKey, value: Vec<u8>) -> Result<(), XRPLLedgerException> {
        if self.exists(key) {
            return Err(XRPLLedgerException::EntryExists);
        }
        self.staged.insert(*key, Some(value));

        Ok(())
    }

    fn update(&mut self, key: &LedgerKey, value: Vec<u8>) -> Result<(), XRPLLedgerException> {
        if !self.exists(key) {
            return Err(XRPLLedgerException::EntryNotFound);
        }
        self.staged.insert(*key, Some(value));

        Ok(())
    }

    fn erase(&mut self, key: &LedgerKey) -> Result<(), XRPLLedgerException> {
        if !self.exists(key) {
            return Err(XRPLLedgerException::EntryNotFound);
        }

        if self.base.exists(key) {
            self.staged.insert(*key, None);
        } else {
            // Created and erased within the same apply; nothing to
            // carry to the base.
            self.staged.remove(key);
        }

        Ok(())
    }
}
