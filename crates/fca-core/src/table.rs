//! Index-encoded view of a formal context with the derivation operators.

use std::collections::BTreeSet;

use fca_model::FormalContext;

pub(crate) type IndexSet = BTreeSet<usize>;

/// Objects and attributes replaced by their positions.
///
/// Built from the considered part of a context only.
#[derive(Debug, Clone)]
pub(crate) struct IncidenceTable {
    attributes: Vec<String>,
    objects: Vec<String>,
    rows: Vec<IndexSet>,
}

impl IncidenceTable {
    pub(crate) fn from_context(context: &FormalContext) -> Self {
        let view = context.considered_view();
        let attributes = view.attributes().to_vec();
        let rows = view
            .objects()
            .iter()
            .map(|object| {
                attributes
                    .iter()
                    .enumerate()
                    .filter(|(_, a)| object.has(a))
                    .map(|(i, _)| i)
                    .collect()
            })
            .collect();
        let objects = view.objects().iter().map(|o| o.name.clone()).collect();
        Self {
            attributes,
            objects,
            rows,
        }
    }

    pub(crate) fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    pub(crate) fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Objects having every attribute in `attributes`.
    pub(crate) fn extent(&self, attributes: &IndexSet) -> IndexSet {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| attributes.is_subset(row))
            .map(|(g, _)| g)
            .collect()
    }

    /// Attributes shared by every object in `objects`.
    pub(crate) fn intent(&self, objects: &IndexSet) -> IndexSet {
        let mut shared: IndexSet = (0..self.attributes.len()).collect();
        for &g in objects {
            shared.retain(|m| self.rows[g].contains(m));
        }
        shared
    }

    pub(crate) fn closure(&self, attributes: &IndexSet) -> IndexSet {
        self.intent(&self.extent(attributes))
    }

    pub(crate) fn attribute_names(&self, set: &IndexSet) -> BTreeSet<String> {
        set.iter().map(|&m| self.attributes[m].clone()).collect()
    }

    pub(crate) fn object_names(&self, set: &IndexSet) -> BTreeSet<String> {
        set.iter().map(|&g| self.objects[g].clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fca_model::example_context;

    #[test]
    fn closure_of_contradictory_attributes_is_everything() {
        let table = IncidenceTable::from_context(&example_context());
        // female + male
        let set: IndexSet = [0, 3].into_iter().collect();
        assert!(table.extent(&set).is_empty());
        assert_eq!(table.closure(&set).len(), 4);
    }

    #[test]
    fn unconsidered_attributes_are_dropped() {
        let mut context = example_context();
        context.set_attribute_considered("male", false).unwrap();
        let table = IncidenceTable::from_context(&context);
        assert_eq!(table.attribute_count(), 3);
        assert_eq!(table.object_count(), 4);
    }
}
