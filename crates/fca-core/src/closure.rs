//! NextClosure enumeration of concepts and of the canonical implication base.

use crate::table::{IncidenceTable, IndexSet};

/// The lectically next set closed under `close`, or `None` after the last one.
pub(crate) fn next_closure<F>(current: &IndexSet, size: usize, close: F) -> Option<IndexSet>
where
    F: Fn(&IndexSet) -> IndexSet,
{
    for i in (0..size).rev() {
        if current.contains(&i) {
            continue;
        }
        let mut base: IndexSet = current.range(..i).copied().collect();
        base.insert(i);
        let candidate = close(&base);
        if candidate.range(..i).all(|m| current.contains(m)) {
            return Some(candidate);
        }
    }
    None
}

/// All concept intents in lectic order.
pub(crate) fn intents(table: &IncidenceTable) -> Vec<IndexSet> {
    let size = table.attribute_count();
    let mut current = table.closure(&IndexSet::new());
    let mut found = vec![current.clone()];
    while let Some(next) = next_closure(&current, size, |set| table.closure(set)) {
        found.push(next.clone());
        current = next;
    }
    found
}

/// An implication over attribute indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IndexImplication {
    pub premise: IndexSet,
    pub conclusion: IndexSet,
}

/// Closure of `set` under the implications whose premise is a proper subset.
///
/// Sets closed under this operator are exactly the intents and pseudo-intents.
fn pseudo_closure(set: &IndexSet, base: &[IndexImplication]) -> IndexSet {
    let mut closed = set.clone();
    loop {
        let mut changed = false;
        for implication in base {
            if implication.premise.is_subset(&closed)
                && implication.premise != closed
                && !implication.conclusion.is_subset(&closed)
            {
                closed.extend(implication.conclusion.iter().copied());
                changed = true;
            }
        }
        if !changed {
            return closed;
        }
    }
}

/// The Duquenne-Guigues base: one implication per pseudo-intent.
pub(crate) fn canonical_base(table: &IncidenceTable) -> Vec<IndexImplication> {
    let size = table.attribute_count();
    let mut base: Vec<IndexImplication> = Vec::new();
    let mut current = IndexSet::new();
    loop {
        let closed = table.closure(&current);
        if closed != current {
            base.push(IndexImplication {
                premise: current.clone(),
                conclusion: closed.difference(&current).copied().collect(),
            });
        }
        match next_closure(&current, size, |set| pseudo_closure(set, &base)) {
            Some(next) => current = next,
            None => return base,
        }
    }
}
