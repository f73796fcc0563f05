//! Before/after distance diffing.

use hashbrown::HashMap;

use crate::model::*;

/// Persisted rows keyed by ordered pair.
pub type RowIndex = HashMap<Pair, Link>;

/// Diff two distance snapshots into a changeset.
///
/// Pairs are compared by `(source, target)` only:
/// - after-only pairs become rows to create, or an update of the stale row
///   when storage already holds one for that pair;
/// - before-only pairs are deleted when a row exists for them;
/// - pairs present on both sides with a different level are updated by id
///   (or created if no row exists yet); unchanged pairs are dropped.
pub fn diff(before: &DistanceMap, after: &DistanceMap, rows: &RowIndex) -> Changeset {
    let mut cs = Changeset::new();

    for ((source, target), level) in after.iter() {
        if before.get(source, target) == Some(level) {
            continue;
        }
        match rows.get(&(source, target)) {
            Some(row) if row.level == level => {}
            Some(row) => cs.updated.push(Link { level, ..*row }),
            None => cs.created.push(NewLink { source, target, level }),
        }
    }

    for ((source, target), _) in before.iter() {
        if after.contains(source, target) {
            continue;
        }
        if let Some(row) = rows.get(&(source, target)) {
            cs.deleted.push(row.id);
        }
    }

    cs.normalize();
    cs
}
