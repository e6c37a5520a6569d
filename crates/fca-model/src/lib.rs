pub mod concept;
pub mod context;
pub mod error;
pub mod rules;

pub use concept::{Concept, Lattice};
pub use context::{FormalContext, FullObject};
pub use error::{ModelError, Result};
pub use rules::{AssociationParams, AssociationRule, Implication, RuleKind, format_set};

/// The four-person example shown on first start.
pub fn example_context() -> FormalContext {
    let mut context = FormalContext::new();
    let objects = [
        FullObject::new("girl", ["female", "juvenile"]),
        FullObject::new("woman", ["female", "adult"]),
        FullObject::new("boy", ["male", "juvenile"]),
        FullObject::new("man", ["male", "adult"]),
    ];
    // Static data, both calls succeed.
    let built = context
        .add_attributes(["female", "juvenile", "adult", "male"])
        .and_then(|()| context.add_objects(objects));
    debug_assert!(built.is_ok());
    context
}
