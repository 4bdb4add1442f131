//! Named, typed parameter slots shared by entities, events and actions.
//!
//! Every concrete variant registers its schema once at construction through
//! `ParamBag::add`. After that the set of names is fixed: values can be read
//! and replaced, but a slot never changes kind and is never removed.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::input::Key;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamKind {
    Int,
    Real,
    Bool,
    Text,
    Key,
}

impl ParamKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Real => "real",
            Self::Bool => "bool",
            Self::Text => "text",
            Self::Key => "key",
        }
    }
}

impl std::fmt::Display for ParamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    Int(i64),
    Real(f64),
    Bool(bool),
    Text(String),
    Key(Key),
}

impl ParamValue {
    pub fn kind(&self) -> ParamKind {
        match self {
            Self::Int(_) => ParamKind::Int,
            Self::Real(_) => ParamKind::Real,
            Self::Bool(_) => ParamKind::Bool,
            Self::Text(_) => ParamKind::Text,
            Self::Key(_) => ParamKind::Key,
        }
    }
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Real(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
            Self::Key(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Key> for ParamValue {
    fn from(v: Key) -> Self {
        Self::Key(v)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    kind: ParamKind,
    value: ParamValue,
}

impl Parameter {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    pub fn value(&self) -> &ParamValue {
        &self.value
    }
}

/// Insertion-ordered parameter map. Small enough that a linear scan beats
/// hashing, and the order keeps serialization stable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamBag {
    owner: String,
    params: Vec<Parameter>,
}

impl ParamBag {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            params: Vec::new(),
        }
    }

    /// Builds a bag from a fixed schema declared in code. A repeated name in
    /// the schema is a programming error and only the first slot is kept.
    pub fn with_schema(owner: impl Into<String>, schema: Vec<(&str, ParamValue)>) -> Self {
        let mut bag = Self::new(owner);
        for (name, default) in schema {
            if let Err(err) = bag.add(name, default) {
                debug_assert!(false, "bad parameter schema for {}: {err}", bag.owner);
                log::error!("Bad parameter schema for {}: {err}", bag.owner);
            }
        }
        bag
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Registers a slot. The default value fixes the declared kind.
    pub fn add(&mut self, name: &str, default: impl Into<ParamValue>) -> EngineResult<()> {
        if self.params.iter().any(|p| p.name == name) {
            return Err(EngineError::DuplicateParameter {
                name: name.to_string(),
            });
        }
        let value = default.into();
        self.params.push(Parameter {
            name: name.to_string(),
            kind: value.kind(),
            value,
        });
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.params.iter().any(|p| p.name == name)
    }

    pub fn kind_of(&self, name: &str) -> EngineResult<ParamKind> {
        Ok(self.slot(name)?.kind)
    }

    pub fn get(&self, name: &str) -> EngineResult<&ParamValue> {
        Ok(&self.slot(name)?.value)
    }

    pub fn set(&mut self, name: &str, value: impl Into<ParamValue>) -> EngineResult<()> {
        let value = value.into();
        let owner = self.owner.clone();
        let slot = self
            .params
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| EngineError::ParameterNotFound {
                owner,
                name: name.to_string(),
            })?;
        if slot.kind != value.kind() {
            return Err(EngineError::TypeMismatch {
                name: name.to_string(),
                expected: slot.kind,
                found: value.kind(),
            });
        }
        slot.value = value;
        Ok(())
    }

    pub fn int(&self, name: &str) -> EngineResult<i64> {
        match self.get(name)? {
            ParamValue::Int(v) => Ok(*v),
            other => Err(self.mismatch(name, ParamKind::Int, other)),
        }
    }

    pub fn real(&self, name: &str) -> EngineResult<f64> {
        match self.get(name)? {
            ParamValue::Real(v) => Ok(*v),
            other => Err(self.mismatch(name, ParamKind::Real, other)),
        }
    }

    pub fn boolean(&self, name: &str) -> EngineResult<bool> {
        match self.get(name)? {
            ParamValue::Bool(v) => Ok(*v),
            other => Err(self.mismatch(name, ParamKind::Bool, other)),
        }
    }

    pub fn text(&self, name: &str) -> EngineResult<&str> {
        match self.get(name)? {
            ParamValue::Text(v) => Ok(v),
            other => Err(self.mismatch(name, ParamKind::Text, other)),
        }
    }

    pub fn key(&self, name: &str) -> EngineResult<Key> {
        match self.get(name)? {
            ParamValue::Key(v) => Ok(*v),
            other => Err(self.mismatch(name, ParamKind::Key, other)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    fn slot(&self, name: &str) -> EngineResult<&Parameter> {
        self.params
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| EngineError::ParameterNotFound {
                owner: self.owner.clone(),
                name: name.to_string(),
            })
    }

    fn mismatch(&self, name: &str, expected: ParamKind, found: &ParamValue) -> EngineError {
        EngineError::TypeMismatch {
            name: name.to_string(),
            expected,
            found: found.kind(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bag() -> ParamBag {
        let mut bag = ParamBag::new("Jump");
        bag.add("Initial Jump Speed", 0.0).expect("add speed");
        bag.add("Times", 1_i64).expect("add times");
        bag.add("Label", "Always").expect("add label");
        bag
    }

    #[test]
    fn add_rejects_duplicate_names() {
        let mut bag = sample_bag();
        let err = bag.add("Times", 2_i64).expect_err("duplicate must fail");
        assert!(matches!(err, EngineError::DuplicateParameter { .. }));
        assert_eq!(bag.len(), 3);
    }

    #[test]
    fn get_unknown_name_fails() {
        let bag = sample_bag();
        let err = bag.get("Nope").expect_err("unknown param");
        match err {
            EngineError::ParameterNotFound { owner, name } => {
                assert_eq!(owner, "Jump");
                assert_eq!(name, "Nope");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn set_with_wrong_kind_fails_and_keeps_value() {
        let mut bag = sample_bag();
        let err = bag
            .set("Initial Jump Speed", 4_i64)
            .expect_err("int into real slot");
        assert!(matches!(
            err,
            EngineError::TypeMismatch {
                expected: ParamKind::Real,
                found: ParamKind::Int,
                ..
            }
        ));
        assert_eq!(bag.real("Initial Jump Speed").expect("real"), 0.0);
    }

    #[test]
    fn set_and_typed_get() {
        let mut bag = sample_bag();
        bag.set("Initial Jump Speed", 7.5).expect("set real");
        bag.set("Label", "3").expect("set text");
        assert_eq!(bag.real("Initial Jump Speed").expect("real"), 7.5);
        assert_eq!(bag.text("Label").expect("text"), "3");
        assert!(bag.int("Label").is_err());
    }

    #[test]
    fn clone_is_independent() {
        let original = sample_bag();
        let mut copy = original.clone();
        copy.set("Times", 9_i64).expect("set");
        assert_eq!(original.int("Times").expect("int"), 1);
        assert_eq!(copy.int("Times").expect("int"), 9);
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let bag = sample_bag();
        let names: Vec<&str> = bag.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["Initial Jump Speed", "Times", "Label"]);
    }

    #[test]
    fn key_values_are_their_own_kind() {
        let mut bag = ParamBag::new("KeyPress");
        bag.add("Key", Key::Unbound).expect("add key");
        bag.set("Key", Key::Space).expect("set key");
        assert_eq!(bag.key("Key").expect("key"), Key::Space);
        assert!(bag.set("Key", "Space").is_err());
    }
}
