//! Terminal rendering of contexts and derived results.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use fca_model::{AssociationRule, Concept, FormalContext, Implication, Lattice, RuleKind, format_set};
use fca_session::SessionOptions;

/// Object rows against attribute columns, `X` where the incidence holds.
///
/// Elements excluded from calculations are dimmed.
pub fn context_table(context: &FormalContext) -> Table {
    let mut table = Table::new();
    let mut header = vec![header_cell("Object")];
    header.extend(context.attributes().iter().map(|attribute| {
        if context.is_attribute_considered(attribute) {
            header_cell(attribute)
        } else {
            dim_cell(attribute)
        }
    }));
    table.set_header(header);
    apply_table_style(&mut table);
    for column in 1..=context.attribute_count() {
        align_column(&mut table, column, CellAlignment::Center);
    }
    for object in context.objects() {
        let considered = context.is_object_considered(&object.name);
        let mut row = vec![if considered {
            Cell::new(&object.name)
        } else {
            dim_cell(&object.name)
        }];
        row.extend(context.attributes().iter().map(|attribute| {
            if object.has(attribute) {
                Cell::new("X").add_attribute(Attribute::Bold)
            } else {
                dim_cell("")
            }
        }));
        table.add_row(row);
    }
    table
}

pub fn concepts_table(concepts: &[Concept]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Extent"),
        header_cell("Intent"),
        header_cell("Support"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for (index, concept) in concepts.iter().enumerate() {
        table.add_row(vec![
            dim_cell(index),
            Cell::new(format_set(&concept.extent)),
            Cell::new(format_set(&concept.intent)),
            Cell::new(concept.extent.len()),
        ]);
    }
    table
}

/// One row per concept with the indices of its neighbours.
pub fn lattice_table(lattice: &Lattice) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Intent"),
        header_cell("Upper covers"),
        header_cell("Lower covers"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    let top = lattice.top();
    let bottom = lattice.bottom();
    for (index, concept) in lattice.concepts().iter().enumerate() {
        let mut label = index.to_string();
        if top == Some(index) {
            label.push_str(" (top)");
        } else if bottom == Some(index) {
            label.push_str(" (bottom)");
        }
        table.add_row(vec![
            dim_cell(label),
            Cell::new(format_set(&concept.intent)),
            Cell::new(join_indices(lattice.upper_covers(index))),
            Cell::new(join_indices(lattice.lower_covers(index))),
        ]);
    }
    table
}

pub fn association_table(rules: &[AssociationRule]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Premise"),
        header_cell("Consequent"),
        header_cell("Support"),
        header_cell("Confidence"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for rule in rules {
        let color = match rule.kind() {
            RuleKind::Exact => Color::Green,
            RuleKind::ExactWithoutSupport => Color::DarkGrey,
            RuleKind::Inexact => Color::Yellow,
        };
        table.add_row(vec![
            Cell::new(format_set(&rule.premise)),
            Cell::new(format_set(&rule.consequent)),
            Cell::new(format!("{:.2}", rule.support)),
            Cell::new(format!("{:.2}", rule.confidence)).fg(color),
        ]);
    }
    table
}

pub fn options_table(options: &SessionOptions) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Option"), header_cell("Value")]);
    apply_table_style(&mut table);
    let geometry = options.geometry;
    table.add_row(vec![
        Cell::new("Window"),
        Cell::new(format!(
            "{}x{} at ({}, {})",
            geometry.w, geometry.h, geometry.x, geometry.y
        )),
    ]);
    table.add_row(vec![
        Cell::new("Last opened"),
        match &options.last_opened {
            Some(path) => Cell::new(path.display()),
            None => dim_cell("-"),
        },
    ]);
    for (slot, path) in options.recent.paths().iter().enumerate() {
        table.add_row(vec![
            dim_cell(format!("Recent {slot}")),
            Cell::new(path.display()),
        ]);
    }
    table
}

/// The canonical base in its textual form, one implication per line.
pub fn implication_lines(implications: &[Implication]) -> String {
    join_lines(implications)
}

pub fn association_lines(rules: &[AssociationRule]) -> String {
    join_lines(rules)
}

fn join_lines<T: ToString>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

fn join_indices(indices: impl Iterator<Item = usize>) -> String {
    indices
        .map(|index| format!("{index}"))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

#[cfg(test)]
mod tests {
    use fca_core::{ConceptMiner, NextClosureMiner};
    use fca_model::example_context;

    use super::*;

    #[test]
    fn canonical_base_lines() {
        let base = NextClosureMiner.implications(&example_context());
        insta::assert_snapshot!(implication_lines(&base), @r"
        < 0 > {adult, juvenile} ==> {female, male};
        < 0 > {female, male} ==> {adult, juvenile};
        ");
    }

    #[test]
    fn context_table_marks_incidences() {
        let mut table = context_table(&example_context());
        table.force_no_tty();
        let rendered = table.to_string();
        assert!(rendered.contains("girl"));
        assert!(rendered.contains("juvenile"));
        assert_eq!(rendered.matches('X').count(), 8);
    }

    #[test]
    fn empty_rules_render_empty() {
        assert_eq!(association_lines(&[]), "");
    }
}
