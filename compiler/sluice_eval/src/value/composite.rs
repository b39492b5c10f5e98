//! Composite value payloads.

use sluice_ir::Symbol;
use sluice_types::{BasicType, MonoType, PropertyType};

use super::Value;

#[derive(Clone, Debug)]
pub struct ArrayValue {
    pub ty: MonoType,
    pub elements: Vec<Value>,
}

impl ArrayValue {
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.elements.get(index)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// A record. Property names are unique and keep their first position.
#[derive(Clone, Debug)]
pub struct ObjectValue {
    ty: MonoType,
    properties: Vec<(Symbol, Value)>,
}

impl ObjectValue {
    pub fn new(properties: Vec<(Symbol, Value)>) -> Self {
        let mut unique: Vec<(Symbol, Value)> = Vec::with_capacity(properties.len());
        for (name, value) in properties {
            match unique.iter_mut().find(|(n, _)| *n == name) {
                Some(slot) => slot.1 = value,
                None => unique.push((name, value)),
            }
        }
        let props: Vec<PropertyType> = unique
            .iter()
            .map(|(name, value)| PropertyType::new(name.clone(), value.ty()))
            .collect();
        ObjectValue {
            ty: MonoType::new_object(&props),
            properties: unique,
        }
    }

    pub fn ty(&self) -> &MonoType {
        &self.ty
    }

    pub fn properties(&self) -> &[(Symbol, Value)] {
        &self.properties
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties
            .iter()
            .find(|(n, _)| n.as_str() == name)
            .map(|(_, v)| v)
    }
}

/// An immutable dictionary with entries sorted by key.
#[derive(Clone, Debug)]
pub struct DictValue {
    pub ty: MonoType,
    entries: Vec<(Value, Value)>,
}

impl DictValue {
    pub fn new(ty: MonoType, entries: Vec<(Value, Value)>) -> Self {
        let mut dict = DictValue {
            ty,
            entries: Vec::with_capacity(entries.len()),
        };
        for (key, value) in entries {
            dict.put(key, value);
        }
        dict
    }

    fn search(&self, key: &Value) -> Result<usize, usize> {
        self.entries.binary_search_by(|(k, _)| k.compare_keys(key))
    }

    fn put(&mut self, key: Value, value: Value) {
        match self.search(&key) {
            Ok(i) => self.entries[i].1 = value,
            Err(i) => self.entries.insert(i, (key, value)),
        }
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.search(key).ok().map(|i| &self.entries[i].1)
    }

    /// A copy with `key` bound to `value`, typed `ty`.
    #[must_use]
    pub fn insert(&self, ty: MonoType, key: Value, value: Value) -> Self {
        let mut dict = DictValue {
            ty,
            entries: self.entries.clone(),
        };
        dict.put(key, value);
        dict
    }

    /// A copy without `key`, typed `ty`.
    #[must_use]
    pub fn remove(&self, ty: MonoType, key: &Value) -> Self {
        let mut entries = self.entries.clone();
        if let Ok(i) = self.search(key) {
            entries.remove(i);
        }
        DictValue { ty, entries }
    }

    pub fn entries(&self) -> &[(Value, Value)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct VectorValue {
    pub elem: BasicType,
    pub values: Vec<Value>,
}
