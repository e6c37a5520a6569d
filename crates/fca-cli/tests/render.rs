//! Rendering of derived results for the example context.

use fca_cli::render::{association_lines, association_table, lattice_table};
use fca_core::{ConceptMiner, NextClosureMiner};
use fca_model::{AssociationParams, example_context};

#[test]
fn default_association_basis_lines() {
    let context = example_context();
    let miner = NextClosureMiner;
    let lattice = miner.lattice(&miner.concepts(&context));
    let rules = miner.associations(&context, &lattice, AssociationParams::default());
    insta::assert_snapshot!(association_lines(&rules), @r"
    < 4 > {} =[0.50]=> < 2 > {adult};
    < 4 > {} =[0.50]=> < 2 > {female};
    < 4 > {} =[0.50]=> < 2 > {juvenile};
    < 4 > {} =[0.50]=> < 2 > {male};
    < 2 > {adult} =[0.50]=> < 1 > {female};
    < 2 > {adult} =[0.50]=> < 1 > {male};
    < 2 > {female} =[0.50]=> < 1 > {adult};
    < 2 > {female} =[0.50]=> < 1 > {juvenile};
    < 2 > {juvenile} =[0.50]=> < 1 > {female};
    < 2 > {juvenile} =[0.50]=> < 1 > {male};
    < 2 > {male} =[0.50]=> < 1 > {adult};
    < 2 > {male} =[0.50]=> < 1 > {juvenile};
    ");
}

#[test]
fn association_table_lists_every_rule() {
    let context = example_context();
    let miner = NextClosureMiner;
    let lattice = miner.lattice(&miner.concepts(&context));
    let params = AssociationParams::new(0.3, 0.5).unwrap();
    let rules = miner.associations(&context, &lattice, params);
    assert_eq!(rules.len(), 4);
    let mut table = association_table(&rules);
    table.force_no_tty();
    let rendered = table.to_string();
    assert_eq!(rendered.matches("0.50").count(), 8);
}

#[test]
fn lattice_table_marks_top_and_bottom() {
    let miner = NextClosureMiner;
    let lattice = miner.lattice(&miner.concepts(&example_context()));
    assert_eq!(lattice.len(), 10);
    let mut table = lattice_table(&lattice);
    table.force_no_tty();
    let rendered = table.to_string();
    assert!(rendered.contains("(top)"));
    assert!(rendered.contains("(bottom)"));
}
