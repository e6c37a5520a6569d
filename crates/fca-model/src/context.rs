//! Formal context: objects, attributes and the incidence relation.
//!
//! A [`FormalContext`] keeps attributes and objects in insertion order (the
//! order a table editor displays them). Every mutating method keeps the
//! context well formed: names are unique and every intent entry refers to an
//! existing attribute. Contexts obtained through deserialization bypass these
//! checks and must be checked with [`FormalContext::validate`].
//!
//! Besides the incidence relation a live context carries transient
//! "not considered" markings: objects or attributes the user temporarily hides
//! from derivation. They are not part of the incidence relation and are
//! ignored by [`FormalContext::same_incidence`] and serialization.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// An object together with the attributes it has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullObject {
    pub name: String,
    #[serde(default)]
    pub intent: BTreeSet<String>,
}

impl FullObject {
    pub fn new<I, S>(name: impl Into<String>, intent: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            intent: intent.into_iter().map(Into::into).collect(),
        }
    }

    pub fn has(&self, attribute: &str) -> bool {
        self.intent.contains(attribute)
    }
}

/// Editable object × attribute table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormalContext {
    #[serde(default)]
    attributes: Vec<String>,
    #[serde(default)]
    objects: Vec<FullObject>,
    #[serde(skip)]
    unconsidered_objects: BTreeSet<String>,
    #[serde(skip)]
    unconsidered_attributes: BTreeSet<String>,
}

impl FormalContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty table with generated names (`obj1..`, `attr1..`) and no crosses.
    pub fn with_size(rows: usize, columns: usize) -> Self {
        let attributes: Vec<String> = (1..=columns).map(|i| format!("attr{i}")).collect();
        let objects = (1..=rows)
            .map(|i| FullObject {
                name: format!("obj{i}"),
                intent: BTreeSet::new(),
            })
            .collect();
        Self {
            attributes,
            objects,
            ..Self::default()
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    pub fn objects(&self) -> &[FullObject] {
        &self.objects
    }

    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a == name)
    }

    pub fn has_object(&self, name: &str) -> bool {
        self.object(name).is_some()
    }

    pub fn object(&self, name: &str) -> Option<&FullObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    /// Returns true if `object` has `attribute`. Unknown names yield false.
    pub fn has_incidence(&self, object: &str, attribute: &str) -> bool {
        self.object(object).is_some_and(|o| o.has(attribute))
    }

    /// Number of crosses in the table.
    pub fn incidence_count(&self) -> usize {
        self.objects.iter().map(|o| o.intent.len()).sum()
    }

    /// Number of objects having every attribute in `attributes`.
    pub fn support_count(&self, attributes: &BTreeSet<String>) -> usize {
        self.objects
            .iter()
            .filter(|o| attributes.is_subset(&o.intent))
            .count()
    }

    /// Compares the incidence relations of two contexts, ignoring display
    /// order and considered-markings.
    pub fn same_incidence(&self, other: &FormalContext) -> bool {
        let lhs: BTreeSet<&String> = self.attributes.iter().collect();
        let rhs: BTreeSet<&String> = other.attributes.iter().collect();
        if lhs != rhs || self.objects.len() != other.objects.len() {
            return false;
        }
        let lhs: BTreeMap<&String, &BTreeSet<String>> =
            self.objects.iter().map(|o| (&o.name, &o.intent)).collect();
        let rhs: BTreeMap<&String, &BTreeSet<String>> =
            other.objects.iter().map(|o| (&o.name, &o.intent)).collect();
        lhs == rhs
    }

    /// Checks name uniqueness and that every intent entry is a known attribute.
    pub fn validate(&self) -> Result<()> {
        let mut attributes = BTreeSet::new();
        for attribute in &self.attributes {
            if !attributes.insert(attribute.as_str()) {
                return Err(ModelError::DuplicateAttribute(attribute.clone()));
            }
        }
        let mut objects = BTreeSet::new();
        for object in &self.objects {
            if !objects.insert(object.name.as_str()) {
                return Err(ModelError::DuplicateObject(object.name.clone()));
            }
            if let Some(attribute) = object
                .intent
                .iter()
                .find(|a| !attributes.contains(a.as_str()))
            {
                return Err(ModelError::DanglingIncidence {
                    object: object.name.clone(),
                    attribute: attribute.clone(),
                });
            }
        }
        Ok(())
    }

    // ========================================================================
    // Structural edits
    // ========================================================================

    pub fn add_attribute(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if self.has_attribute(&name) {
            return Err(ModelError::DuplicateAttribute(name));
        }
        self.attributes.push(name);
        Ok(())
    }

    pub fn add_attributes<I, S>(&mut self, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.add_attribute(name)?;
        }
        Ok(())
    }

    /// Adds an object. Every attribute in its intent must already exist.
    pub fn add_object(&mut self, object: FullObject) -> Result<()> {
        if self.has_object(&object.name) {
            return Err(ModelError::DuplicateObject(object.name));
        }
        if let Some(unknown) = object.intent.iter().find(|a| !self.has_attribute(a)) {
            return Err(ModelError::UnknownAttribute(unknown.clone()));
        }
        self.objects.push(object);
        Ok(())
    }

    pub fn add_objects<I>(&mut self, objects: I) -> Result<()>
    where
        I: IntoIterator<Item = FullObject>,
    {
        for object in objects {
            self.add_object(object)?;
        }
        Ok(())
    }

    pub fn remove_object(&mut self, name: &str) -> Result<FullObject> {
        let index = self.object_index(name)?;
        self.unconsidered_objects.remove(name);
        Ok(self.objects.remove(index))
    }

    /// Removes an attribute and every cross in its column.
    pub fn remove_attribute(&mut self, name: &str) -> Result<()> {
        let index = self
            .attributes
            .iter()
            .position(|a| a == name)
            .ok_or_else(|| ModelError::UnknownAttribute(name.to_string()))?;
        self.attributes.remove(index);
        for object in &mut self.objects {
            object.intent.remove(name);
        }
        self.unconsidered_attributes.remove(name);
        Ok(())
    }

    pub fn rename_object(&mut self, old: &str, new: impl Into<String>) -> Result<()> {
        let new = new.into();
        let index = self.object_index(old)?;
        if old == new {
            return Ok(());
        }
        if self.has_object(&new) {
            return Err(ModelError::DuplicateObject(new));
        }
        if self.unconsidered_objects.remove(old) {
            self.unconsidered_objects.insert(new.clone());
        }
        self.objects[index].name = new;
        Ok(())
    }

    pub fn rename_attribute(&mut self, old: &str, new: impl Into<String>) -> Result<()> {
        let new = new.into();
        let index = self
            .attributes
            .iter()
            .position(|a| a == old)
            .ok_or_else(|| ModelError::UnknownAttribute(old.to_string()))?;
        if old == new {
            return Ok(());
        }
        if self.has_attribute(&new) {
            return Err(ModelError::DuplicateAttribute(new));
        }
        for object in &mut self.objects {
            if object.intent.remove(old) {
                object.intent.insert(new.clone());
            }
        }
        if self.unconsidered_attributes.remove(old) {
            self.unconsidered_attributes.insert(new.clone());
        }
        self.attributes[index] = new;
        Ok(())
    }

    /// Sets or clears a cross. Returns true if the table changed.
    pub fn set_incidence(&mut self, object: &str, attribute: &str, value: bool) -> Result<bool> {
        if !self.has_attribute(attribute) {
            return Err(ModelError::UnknownAttribute(attribute.to_string()));
        }
        let index = self.object_index(object)?;
        let intent = &mut self.objects[index].intent;
        Ok(if value {
            intent.insert(attribute.to_string())
        } else {
            intent.remove(attribute)
        })
    }

    /// Flips a cross and returns its new value.
    pub fn toggle_incidence(&mut self, object: &str, attribute: &str) -> Result<bool> {
        let value = !self.has_incidence(object, attribute);
        self.set_incidence(object, attribute, value)?;
        Ok(value)
    }

    fn object_index(&self, name: &str) -> Result<usize> {
        self.objects
            .iter()
            .position(|o| o.name == name)
            .ok_or_else(|| ModelError::UnknownObject(name.to_string()))
    }

    // ========================================================================
    // Considered-markings
    // ========================================================================

    pub fn is_object_considered(&self, name: &str) -> bool {
        !self.unconsidered_objects.contains(name)
    }

    pub fn is_attribute_considered(&self, name: &str) -> bool {
        !self.unconsidered_attributes.contains(name)
    }

    pub fn set_object_considered(&mut self, name: &str, considered: bool) -> Result<()> {
        self.object_index(name)?;
        if considered {
            self.unconsidered_objects.remove(name);
        } else {
            self.unconsidered_objects.insert(name.to_string());
        }
        Ok(())
    }

    pub fn set_attribute_considered(&mut self, name: &str, considered: bool) -> Result<()> {
        if !self.has_attribute(name) {
            return Err(ModelError::UnknownAttribute(name.to_string()));
        }
        if considered {
            self.unconsidered_attributes.remove(name);
        } else {
            self.unconsidered_attributes.insert(name.to_string());
        }
        Ok(())
    }

    pub fn has_unconsidered(&self) -> bool {
        !self.unconsidered_objects.is_empty() || !self.unconsidered_attributes.is_empty()
    }

    pub fn clear_considered(&mut self) {
        self.unconsidered_objects.clear();
        self.unconsidered_attributes.clear();
    }

    /// The sub-context of considered objects and attributes only.
    pub fn considered_view(&self) -> FormalContext {
        if !self.has_unconsidered() {
            let mut copy = self.clone();
            copy.clear_considered();
            return copy;
        }
        let attributes: Vec<String> = self
            .attributes
            .iter()
            .filter(|a| self.is_attribute_considered(a))
            .cloned()
            .collect();
        let objects = self
            .objects
            .iter()
            .filter(|o| self.is_object_considered(&o.name))
            .map(|o| FullObject {
                name: o.name.clone(),
                intent: o
                    .intent
                    .iter()
                    .filter(|a| self.is_attribute_considered(a))
                    .cloned()
                    .collect(),
            })
            .collect();
        FormalContext {
            attributes,
            objects,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn family() -> FormalContext {
        let mut ctx = FormalContext::new();
        ctx.add_attributes(["female", "juvenile", "adult", "male"])
            .unwrap();
        ctx.add_objects([
            FullObject::new("girl", ["female", "juvenile"]),
            FullObject::new("woman", ["female", "adult"]),
        ])
        .unwrap();
        ctx
    }

    #[test]
    fn rejects_unknown_attribute_in_intent() {
        let mut ctx = family();
        let err = ctx
            .add_object(FullObject::new("robot", ["metal"]))
            .unwrap_err();
        assert_eq!(err, ModelError::UnknownAttribute("metal".to_string()));
        assert_eq!(ctx.object_count(), 2);
    }

    #[test]
    fn rename_attribute_rewrites_intents() {
        let mut ctx = family();
        ctx.rename_attribute("adult", "grown-up").unwrap();
        assert!(ctx.has_incidence("woman", "grown-up"));
        assert!(!ctx.has_incidence("woman", "adult"));
        assert_eq!(ctx.attributes()[2], "grown-up");
    }

    #[test]
    fn remove_attribute_clears_column() {
        let mut ctx = family();
        ctx.remove_attribute("female").unwrap();
        assert_eq!(ctx.incidence_count(), 2);
        assert!(ctx.validate().is_ok());
    }

    #[test]
    fn considered_view_drops_hidden_elements() {
        let mut ctx = family();
        ctx.set_attribute_considered("juvenile", false).unwrap();
        ctx.set_object_considered("woman", false).unwrap();
        let view = ctx.considered_view();
        assert_eq!(view.attribute_count(), 3);
        assert_eq!(view.object_count(), 1);
        assert!(!view.has_incidence("girl", "juvenile"));
        assert!(!view.has_unconsidered());
    }

    #[test]
    fn markings_do_not_affect_incidence_equality() {
        let plain = family();
        let mut marked = family();
        marked.set_attribute_considered("male", false).unwrap();
        assert!(plain.same_incidence(&marked));
    }

    #[test]
    fn validate_reports_dangling_incidence() {
        let json = r#"{"attributes":["a"],"objects":[{"name":"x","intent":["b"]}]}"#;
        let ctx: FormalContext = serde_json::from_str(json).unwrap();
        assert_eq!(
            ctx.validate().unwrap_err(),
            ModelError::DanglingIncidence {
                object: "x".to_string(),
                attribute: "b".to_string(),
            }
        );
    }
}
