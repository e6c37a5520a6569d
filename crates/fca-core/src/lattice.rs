//! Covering relation and association basis over a set of concepts.

use fca_model::{AssociationParams, AssociationRule, Concept, Lattice};

/// Computes the `(lower, upper)` covering pairs of `concepts`.
pub fn covering_relation(concepts: &[Concept]) -> Vec<(usize, usize)> {
    let below = |i: usize, j: usize| {
        i != j && concepts[i].extent.len() < concepts[j].extent.len()
            && concepts[i].extent.is_subset(&concepts[j].extent)
    };
    let mut covers = Vec::new();
    for lower in 0..concepts.len() {
        for upper in 0..concepts.len() {
            if !below(lower, upper) {
                continue;
            }
            let direct = (0..concepts.len()).all(|k| !(below(lower, k) && below(k, upper)));
            if direct {
                covers.push((lower, upper));
            }
        }
    }
    covers
}

pub fn build_lattice(concepts: &[Concept]) -> Lattice {
    Lattice::new(concepts.to_vec(), covering_relation(concepts))
}

/// Luxenburger basis: one candidate rule per lattice cover.
///
/// For a cover with upper concept `A` and lower concept `B` the rule is
/// `intent(A) ==> intent(B) \ intent(A)`. Exact rules are left to the
/// implication base.
pub fn association_basis(
    lattice: &Lattice,
    object_count: usize,
    params: AssociationParams,
) -> Vec<AssociationRule> {
    if object_count == 0 {
        return Vec::new();
    }
    let concepts = lattice.concepts();
    let mut rules: Vec<AssociationRule> = lattice
        .covers()
        .iter()
        .filter_map(|&(lower, upper)| {
            let upper = &concepts[upper];
            let lower = &concepts[lower];
            let premise_count = upper.extent.len();
            if premise_count == 0 {
                return None;
            }
            let rule_count = lower.extent.len();
            let support = rule_count as f64 / object_count as f64;
            let confidence = rule_count as f64 / premise_count as f64;
            if support < params.min_support
                || confidence < params.min_confidence
                || confidence >= 1.0
            {
                return None;
            }
            Some(AssociationRule {
                premise: upper.intent.clone(),
                consequent: lower.intent.difference(&upper.intent).cloned().collect(),
                premise_count,
                rule_count,
                support,
                confidence,
            })
        })
        .collect();
    rules.sort_by(|a, b| {
        b.confidence
            .total_cmp(&a.confidence)
            .then_with(|| a.premise.cmp(&b.premise))
            .then_with(|| a.consequent.cmp(&b.consequent))
    });
    rules
}
