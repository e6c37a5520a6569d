//! Mining entry points.
//!
//! [`ConceptMiner`] is the seam between the session and whatever library
//! derives concepts and rules. [`NextClosureMiner`] is the bundled
//! implementation; it is exact and adequate for hand-edited tables.

use fca_model::{AssociationParams, AssociationRule, Concept, FormalContext, Implication, Lattice};
use tracing::debug;

use crate::closure::{canonical_base, intents};
use crate::lattice::{association_basis, build_lattice};
use crate::table::IncidenceTable;

/// Derives concepts and rules from the considered part of a context.
pub trait ConceptMiner: Send + Sync {
    fn concepts(&self, context: &FormalContext) -> Vec<Concept>;

    fn lattice(&self, concepts: &[Concept]) -> Lattice;

    fn implications(&self, context: &FormalContext) -> Vec<Implication>;

    fn associations(
        &self,
        context: &FormalContext,
        lattice: &Lattice,
        params: AssociationParams,
    ) -> Vec<AssociationRule>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NextClosureMiner;

impl ConceptMiner for NextClosureMiner {
    fn concepts(&self, context: &FormalContext) -> Vec<Concept> {
        let table = IncidenceTable::from_context(context);
        let concepts: Vec<Concept> = intents(&table)
            .into_iter()
            .map(|intent| {
                let extent = table.extent(&intent);
                Concept::new(table.object_names(&extent), table.attribute_names(&intent))
            })
            .collect();
        debug!(concepts = concepts.len(), "enumerated concepts");
        concepts
    }

    fn lattice(&self, concepts: &[Concept]) -> Lattice {
        let lattice = build_lattice(concepts);
        debug!(edges = lattice.covers().len(), "built covering relation");
        lattice
    }

    fn implications(&self, context: &FormalContext) -> Vec<Implication> {
        let table = IncidenceTable::from_context(context);
        let base: Vec<Implication> = canonical_base(&table)
            .into_iter()
            .map(|implication| Implication {
                support: table.extent(&implication.premise).len(),
                premise: table.attribute_names(&implication.premise),
                conclusion: table.attribute_names(&implication.conclusion),
            })
            .collect();
        debug!(implications = base.len(), "computed canonical base");
        base
    }

    fn associations(
        &self,
        context: &FormalContext,
        lattice: &Lattice,
        params: AssociationParams,
    ) -> Vec<AssociationRule> {
        let object_count = IncidenceTable::from_context(context).object_count();
        let rules = association_basis(lattice, object_count, params);
        debug!(
            rules = rules.len(),
            min_support = params.min_support,
            min_confidence = params.min_confidence,
            "computed association basis"
        );
        rules
    }
}
