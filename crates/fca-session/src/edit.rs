//! Structural edits recorded in the undo history.

use std::collections::BTreeSet;

use fca_model::{FormalContext, FullObject};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    AddObject {
        name: String,
        intent: BTreeSet<String>,
    },
    RemoveObject { name: String },
    RenameObject { old: String, new: String },
    AddAttribute { name: String },
    RemoveAttribute { name: String },
    RenameAttribute { old: String, new: String },
    SetIncidence {
        object: String,
        attribute: String,
        value: bool,
    },
    ToggleIncidence { object: String, attribute: String },
}

impl Edit {
    /// Applies the edit. On error `context` is left untouched.
    pub fn apply(&self, context: &mut FormalContext) -> Result<()> {
        match self {
            Self::AddObject { name, intent } => {
                context.add_object(FullObject::new(name.clone(), intent.iter().cloned()))?;
            }
            Self::RemoveObject { name } => {
                context.remove_object(name)?;
            }
            Self::RenameObject { old, new } => context.rename_object(old, new.clone())?,
            Self::AddAttribute { name } => context.add_attribute(name.clone())?,
            Self::RemoveAttribute { name } => context.remove_attribute(name)?,
            Self::RenameAttribute { old, new } => context.rename_attribute(old, new.clone())?,
            Self::SetIncidence {
                object,
                attribute,
                value,
            } => {
                context.set_incidence(object, attribute, *value)?;
            }
            Self::ToggleIncidence { object, attribute } => {
                context.toggle_incidence(object, attribute)?;
            }
        }
        Ok(())
    }

    /// History label, e.g. "rename attribute adult".
    pub fn label(&self) -> String {
        match self {
            Self::AddObject { name, .. } => format!("add object {name}"),
            Self::RemoveObject { name } => format!("remove object {name}"),
            Self::RenameObject { old, .. } => format!("rename object {old}"),
            Self::AddAttribute { name } => format!("add attribute {name}"),
            Self::RemoveAttribute { name } => format!("remove attribute {name}"),
            Self::RenameAttribute { old, .. } => format!("rename attribute {old}"),
            Self::SetIncidence {
                object, attribute, ..
            }
            | Self::ToggleIncidence { object, attribute } => {
                format!("change {object} / {attribute}")
            }
        }
    }
}
