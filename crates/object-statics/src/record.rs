//! Ordinary records: own properties, prototype link and extensibility.
//!
//! Own properties live in an `IndexMap` so insertion order is the
//! enumeration order for non-index string keys and for symbols.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::descriptor::{PartialDescriptor, PropertyDescriptor};
use crate::error::RecordError;
use crate::value::{PropertyKey, RecordHandle, Value};

/// Integrity classification of a record, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrityLevel {
    /// Not extensible, every property non-configurable and data properties
    /// non-writable.
    Frozen,
    /// Not extensible, every property non-configurable.
    Sealed,
    /// Not extensible but some property is still configurable.
    NonExtensible,
    /// New keys may be added.
    Extensible,
}

impl IntegrityLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Frozen => "frozen",
            Self::Sealed => "sealed",
            Self::NonExtensible => "non_extensible",
            Self::Extensible => "extensible",
        }
    }
}

/// An ordinary record with internal slots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrdinaryRecord {
    /// Prototype link (`None` ends the chain).
    pub prototype: Option<RecordHandle>,
    /// Extensibility flag; once false it never flips back.
    pub extensible: bool,
    /// Own properties in insertion order.
    pub properties: IndexMap<PropertyKey, PropertyDescriptor>,
}

impl Default for OrdinaryRecord {
    fn default() -> Self {
        Self {
            prototype: None,
            extensible: true,
            properties: IndexMap::new(),
        }
    }
}

impl OrdinaryRecord {
    pub fn with_prototype(proto: Option<RecordHandle>) -> Self {
        Self {
            prototype: proto,
            ..Self::default()
        }
    }

    pub fn get_own_property(&self, key: &PropertyKey) -> Option<&PropertyDescriptor> {
        self.properties.get(key)
    }

    pub fn has_own_property(&self, key: &PropertyKey) -> bool {
        self.properties.contains_key(key)
    }

    /// Define or update an own property.
    ///
    /// A new key needs an extensible record. An existing non-configurable
    /// key only accepts a descriptor that leaves it identical.
    pub fn define_own_property(
        &mut self,
        key: PropertyKey,
        desc: PartialDescriptor,
    ) -> Result<(), RecordError> {
        match self.properties.get(&key) {
            Some(current) => {
                let merged = desc.apply_to(Some(current));
                if !current.is_configurable() && !merged.same_as(current) {
                    return Err(RecordError::immutable(
                        "redefine",
                        &key,
                        "property is not configurable",
                    ));
                }
                self.properties.insert(key, merged);
            }
            None => {
                if !self.extensible {
                    return Err(RecordError::immutable(
                        "define",
                        &key,
                        "record is not extensible",
                    ));
                }
                self.properties.insert(key, desc.complete());
            }
        }
        Ok(())
    }

    /// Store a fresh writable/enumerable/configurable data property at the
    /// end of the insertion order, replacing any previous entry for `key`.
    pub(crate) fn put_last(&mut self, key: PropertyKey, value: Value) {
        self.properties.shift_remove(&key);
        self.properties.insert(key, PropertyDescriptor::data(value));
    }

    /// Remove an own property. Absent keys succeed vacuously.
    pub fn delete(&mut self, key: &PropertyKey) -> Result<(), RecordError> {
        match self.properties.get(key) {
            None => Ok(()),
            Some(desc) if !desc.is_configurable() => Err(RecordError::immutable(
                "delete",
                key,
                "property is not configurable",
            )),
            Some(_) => {
                self.properties.shift_remove(key);
                Ok(())
            }
        }
    }

    /// Own keys: array indices ascending, then other strings in insertion
    /// order, then symbols in insertion order.
    pub fn own_property_keys(&self) -> Vec<PropertyKey> {
        let mut index_keys: Vec<(u32, &PropertyKey)> = Vec::new();
        let mut str_keys: Vec<&PropertyKey> = Vec::new();
        let mut sym_keys: Vec<&PropertyKey> = Vec::new();

        for key in self.properties.keys() {
            if let Some(n) = key.array_index() {
                index_keys.push((n, key));
            } else if key.is_symbol() {
                sym_keys.push(key);
            } else {
                str_keys.push(key);
            }
        }

        index_keys.sort_by_key(|(n, _)| *n);
        index_keys
            .into_iter()
            .map(|(_, k)| k)
            .chain(str_keys)
            .chain(sym_keys)
            .cloned()
            .collect()
    }

    pub fn prevent_extensions(&mut self) {
        self.extensible = false;
    }

    /// Non-extensible, every property non-configurable and non-writable.
    pub fn freeze(&mut self) {
        self.extensible = false;
        for desc in self.properties.values_mut() {
            desc.set_non_configurable();
            desc.set_non_writable();
        }
    }

    /// Non-extensible, every property non-configurable; writability kept.
    pub fn seal(&mut self) {
        self.extensible = false;
        for desc in self.properties.values_mut() {
            desc.set_non_configurable();
        }
    }

    pub fn is_frozen(&self) -> bool {
        !self.extensible
            && self
                .properties
                .values()
                .all(|d| !d.is_configurable() && !d.is_writable())
    }

    pub fn is_sealed(&self) -> bool {
        !self.extensible && self.properties.values().all(|d| !d.is_configurable())
    }

    pub fn integrity_level(&self) -> IntegrityLevel {
        if self.extensible {
            IntegrityLevel::Extensible
        } else if self.is_frozen() {
            IntegrityLevel::Frozen
        } else if self.is_sealed() {
            IntegrityLevel::Sealed
        } else {
            IntegrityLevel::NonExtensible
        }
    }
}
