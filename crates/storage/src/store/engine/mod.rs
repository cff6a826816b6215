#![forbid(unsafe_code)]

//! Versioned schema-migration engine.
//!
//! The engine applies an ordered catalog of [`ChangeSet`]s exactly once each,
//! in version order, recording history in the `schema_history` ledger. It is
//! single-threaded relative to itself; the caller guarantees single-leader
//! invocation (concurrent unsynchronized runs against the same database are
//! undefined behavior and must be prevented by the host, e.g. with an
//! advisory lock).

mod changeset;
mod ledger;

pub use changeset::{Backward, ChangeSet, Forward};

use super::StoreError;
use rusqlite::Connection;
use std::collections::BTreeSet;

/// Applied version keys, ascending. Operator/diagnostic surface.
pub fn applied_change_set_ids(conn: &Connection) -> Result<Vec<i64>, StoreError> {
    ledger::ensure_history_table(conn)?;
    ledger::applied_ids(conn)
}

/// Change sets not yet recorded in the ledger, ascending by id.
///
/// Fails with `OrderingViolation` when the ledger is not a prefix of the
/// catalog order: an applied id above an unapplied one (gap), or an applied
/// id the catalog does not know. Both mean ledger corruption and are fatal.
pub fn pending<'a>(
    conn: &Connection,
    catalog: &'a [ChangeSet],
) -> Result<Vec<&'a ChangeSet>, StoreError> {
    validate_catalog(catalog)?;
    ledger::ensure_history_table(conn)?;
    let applied = ledger::applied_ids(conn)?;

    let known: BTreeSet<i64> = catalog.iter().map(|change_set| change_set.id).collect();
    for id in &applied {
        if !known.contains(id) {
            return Err(StoreError::OrderingViolation {
                detail: format!("ledger records change set {id} which the catalog does not know"),
            });
        }
    }

    let applied: BTreeSet<i64> = applied.into_iter().collect();
    let todo: Vec<&ChangeSet> = catalog
        .iter()
        .filter(|change_set| !applied.contains(&change_set.id))
        .collect();

    if let (Some(highest_applied), Some(lowest_pending)) =
        (applied.iter().next_back(), todo.first())
    {
        if *highest_applied > lowest_pending.id {
            return Err(StoreError::OrderingViolation {
                detail: format!(
                    "change set {} is applied but {} ({}) below it is not",
                    highest_applied, lowest_pending.id, lowest_pending.name
                ),
            });
        }
    }

    Ok(todo)
}

/// Apply one change set and record its ledger entry.
///
/// Atomic bodies run in one transaction with the ledger write; on any error
/// the transaction rolls back entirely. Non-atomic bodies run against the
/// bare connection and get their ledger entry only after reporting success.
/// A partial failure leaves progress behind, and the body's idempotency is
/// what makes restart-and-retry safe.
pub fn apply(
    conn: &mut Connection,
    change_set: &ChangeSet,
    progress: &mut dyn FnMut(&str),
) -> Result<(), StoreError> {
    if change_set.slow {
        progress(&format!(
            "{} ({}): slow change set, rewrites whole tables; expect minutes on a large database",
            change_set.name, change_set.id
        ));
    }

    let wrap = |cause: StoreError| StoreError::Apply {
        change_set_id: change_set.id,
        name: change_set.name,
        cause: Box::new(cause),
    };

    match change_set.forward {
        Forward::Atomic(forward) => {
            let tx = conn.transaction()?;
            forward(&tx).map_err(wrap)?;
            ledger::record_applied(&tx, change_set.id, now_ms())?;
            tx.commit()?;
        }
        Forward::NonAtomic(forward) => {
            forward(conn, progress).map_err(wrap)?;
            ledger::record_applied(conn, change_set.id, now_ms())?;
        }
    }

    progress(&format!("applied {} ({})", change_set.name, change_set.id));
    Ok(())
}

/// Apply every pending change set in order, stopping at the first failure.
/// Returns how many were applied.
pub fn apply_all(
    conn: &mut Connection,
    catalog: &[ChangeSet],
    progress: &mut dyn FnMut(&str),
) -> Result<usize, StoreError> {
    let todo = pending(conn, catalog)?;
    let mut applied = 0usize;
    for change_set in todo {
        apply(conn, change_set, progress)?;
        applied += 1;
    }
    Ok(applied)
}

/// Revert the most recently applied change set: run its backward operation
/// and remove the single most recent ledger entry, in one transaction.
///
/// Returns the reverted id, or `None` when the ledger is empty. Fails with
/// `NoBackwardSupported` (mutating nothing) when the change set declares no
/// inverse.
pub fn revert_last(
    conn: &mut Connection,
    catalog: &[ChangeSet],
    progress: &mut dyn FnMut(&str),
) -> Result<Option<i64>, StoreError> {
    validate_catalog(catalog)?;
    ledger::ensure_history_table(conn)?;
    let Some(last) = ledger::applied_ids(conn)?.pop() else {
        return Ok(None);
    };
    let Some(change_set) = catalog
        .iter()
        .find(|change_set| change_set.id == last)
    else {
        return Err(StoreError::OrderingViolation {
            detail: format!("ledger records change set {last} which the catalog does not know"),
        });
    };

    let Backward::Atomic(backward) = change_set.backward else {
        return Err(StoreError::NoBackwardSupported {
            change_set_id: change_set.id,
        });
    };

    let tx = conn.transaction()?;
    backward(&tx).map_err(|cause| StoreError::Revert {
        change_set_id: change_set.id,
        name: change_set.name,
        cause: Box::new(cause),
    })?;
    ledger::remove_applied(&tx, change_set.id)?;
    tx.commit()?;

    progress(&format!(
        "reverted {} ({})",
        change_set.name, change_set.id
    ));
    Ok(Some(change_set.id))
}

fn validate_catalog(catalog: &[ChangeSet]) -> Result<(), StoreError> {
    let mut names = BTreeSet::new();
    for change_set in catalog {
        if !names.insert(change_set.name) {
            return Err(StoreError::CatalogInvalid("duplicate change set name"));
        }
    }
    for pair in catalog.windows(2) {
        if pair[0].id >= pair[1].id {
            return Err(StoreError::CatalogInvalid(
                "change set ids must be strictly ascending",
            ));
        }
    }
    Ok(())
}

pub(in crate::store) fn now_ms() -> i64 {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    now.as_millis() as i64
}
