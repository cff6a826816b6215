#![forbid(unsafe_code)]

use super::super::StoreError;
use rusqlite::{Connection, Transaction};

/// One versioned, ordered schema/data transformation.
///
/// Change sets are immutable once shipped: the catalog only ever grows, and a
/// shipped body is never edited (its DDL is a frozen snapshot of the schema
/// shape at that point in history).
pub struct ChangeSet {
    /// Epoch-milliseconds version key. Strictly increasing across the
    /// catalog, globally unique, defines application order.
    pub id: i64,
    pub name: &'static str,
    pub forward: Forward,
    pub backward: Backward,
    /// Rewrites every row of a large table. The engine announces this to the
    /// operator before running, since it may take tens of minutes against a
    /// production-sized database.
    pub slow: bool,
}

pub enum Forward {
    /// Runs inside one transaction together with the ledger entry: either
    /// both the schema change and the history record persist, or neither.
    Atomic(fn(&Transaction<'_>) -> Result<(), StoreError>),
    /// Runs outside any transaction (long bulk rewrites against a live
    /// table). The body must converge when re-run after a partial failure:
    /// predicate-scoped updates, `IF NOT EXISTS` DDL. The ledger entry is
    /// recorded only after the body reports success.
    NonAtomic(fn(&Connection, &mut dyn FnMut(&str)) -> Result<(), StoreError>),
}

pub enum Backward {
    Atomic(fn(&Transaction<'_>) -> Result<(), StoreError>),
    /// The forward operation destroyed information (column drop). Declared,
    /// never approximated; revert reports `NoBackwardSupported`.
    Unsupported,
}

impl ChangeSet {
    pub fn is_atomic(&self) -> bool {
        matches!(self.forward, Forward::Atomic(_))
    }

    pub fn supports_backward(&self) -> bool {
        matches!(self.backward, Backward::Atomic(_))
    }
}

impl std::fmt::Debug for ChangeSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeSet")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("atomic", &self.is_atomic())
            .field("supports_backward", &self.supports_backward())
            .field("slow", &self.slow)
            .finish()
    }
}
