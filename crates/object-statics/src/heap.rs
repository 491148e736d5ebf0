//! The record heap and the static operations over it.
//!
//! Records are stored in an arena and referenced by [`RecordHandle`]; a
//! prototype link is just a handle, so lookup through the chain is an
//! explicit loop over own properties, capped at [`MAX_PROTOTYPE_CHAIN_DEPTH`]
//! and checked for cycles.
//!
//! Writes follow strict-mode semantics: a rejected assignment, deletion or
//! definition is an error, never a silent no-op.

use std::collections::BTreeSet;

use crate::descriptor::{DescriptorInit, PartialDescriptor, PropertyDescriptor};
use crate::error::RecordError;
use crate::record::{IntegrityLevel, OrdinaryRecord};
use crate::value::{FunctionId, PropertyKey, RecordHandle, SymbolId, Value};

/// Maximum prototype chain depth followed by lookups.
pub const MAX_PROTOTYPE_CHAIN_DEPTH: u32 = 1024;

/// Native function body. `this` is the record the function was reached
/// through.
pub type NativeFn = fn(&mut RecordHeap, RecordHandle, &[Value]) -> Result<Value, RecordError>;

/// Entry in the native function table.
#[derive(Clone)]
pub struct NativeFunction {
    pub name: String,
    pub body: NativeFn,
}

impl std::fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Arena of records plus the symbol and native function tables.
#[derive(Debug, Clone)]
pub struct RecordHeap {
    records: Vec<OrdinaryRecord>,
    symbols: Vec<Option<String>>,
    functions: Vec<NativeFunction>,
    object_prototype: RecordHandle,
}

impl Default for RecordHeap {
    fn default() -> Self {
        Self::new()
    }
}

fn object_to_string(
    _heap: &mut RecordHeap,
    _this: RecordHandle,
    _args: &[Value],
) -> Result<Value, RecordError> {
    Ok(Value::str("[object Object]"))
}

impl RecordHeap {
    /// Create a heap holding the shared object prototype (with a
    /// non-enumerable `toString`) that literal records inherit from.
    pub fn new() -> Self {
        let mut heap = Self {
            records: vec![OrdinaryRecord::default()],
            symbols: Vec::new(),
            functions: Vec::new(),
            object_prototype: RecordHandle(0),
        };
        let to_string = heap.register_function("toString", object_to_string);
        let proto = heap.object_prototype;
        if let Some(rec) = heap.records.get_mut(proto.0 as usize) {
            rec.properties.insert(
                PropertyKey::from("toString"),
                PropertyDescriptor::Data {
                    value: Value::Function(to_string),
                    writable: true,
                    enumerable: false,
                    configurable: true,
                },
            );
        }
        heap
    }

    /// The prototype shared by literal records and [`RecordHeap::from_entries`].
    pub fn object_prototype(&self) -> RecordHandle {
        self.object_prototype
    }

    // -- Allocation ---------------------------------------------------------

    /// Allocate an empty record with the given prototype.
    pub fn alloc(&mut self, proto: Option<RecordHandle>) -> RecordHandle {
        let handle = RecordHandle(self.records.len() as u32);
        self.records.push(OrdinaryRecord::with_prototype(proto));
        handle
    }

    /// Allocate an empty record with no prototype.
    pub fn alloc_plain(&mut self) -> RecordHandle {
        self.alloc(None)
    }

    /// Allocate a record literal: object prototype, default data properties
    /// in the given order.
    pub fn literal<K, V>(&mut self, props: impl IntoIterator<Item = (K, V)>) -> RecordHandle
    where
        K: Into<PropertyKey>,
        V: Into<Value>,
    {
        let handle = self.alloc(Some(self.object_prototype));
        if let Some(rec) = self.records.get_mut(handle.0 as usize) {
            for (key, value) in props {
                rec.properties
                    .insert(key.into(), PropertyDescriptor::data(value.into()));
            }
        }
        handle
    }

    /// Allocate a unique symbol.
    pub fn alloc_symbol(&mut self, description: Option<&str>) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(description.map(str::to_string));
        id
    }

    pub fn symbol_description(&self, id: SymbolId) -> Option<&str> {
        self.symbols.get(id.0 as usize).and_then(|d| d.as_deref())
    }

    /// Key as shown in messages: strings verbatim, symbols as
    /// `Symbol(description)`.
    pub fn key_label(&self, key: &PropertyKey) -> String {
        match key {
            PropertyKey::String(s) => s.clone(),
            PropertyKey::Symbol(id) => {
                format!("Symbol({})", self.symbol_description(*id).unwrap_or(""))
            }
        }
    }

    /// Records raise errors without heap access, so symbol keys arrive as
    /// ids; swap in the description.
    fn relabel(&self, key: &PropertyKey, err: RecordError) -> RecordError {
        match err {
            RecordError::ImmutableViolation {
                operation,
                key: shown,
                detail,
            } if key.is_symbol() && shown == key.to_string() => RecordError::ImmutableViolation {
                operation,
                key: self.key_label(key),
                detail,
            },
            other => other,
        }
    }

    pub fn register_function(&mut self, name: &str, body: NativeFn) -> FunctionId {
        let id = FunctionId(self.functions.len() as u32);
        self.functions.push(NativeFunction {
            name: name.to_string(),
            body,
        });
        id
    }

    pub fn function_name(&self, id: FunctionId) -> Option<&str> {
        self.functions.get(id.0 as usize).map(|f| f.name.as_str())
    }

    pub fn call_function(
        &mut self,
        id: FunctionId,
        this: RecordHandle,
        args: &[Value],
    ) -> Result<Value, RecordError> {
        let body = self
            .functions
            .get(id.0 as usize)
            .map(|f| f.body)
            .ok_or(RecordError::FunctionNotFound(id))?;
        body(self, this, args)
    }

    pub fn get(&self, handle: RecordHandle) -> Result<&OrdinaryRecord, RecordError> {
        self.records
            .get(handle.0 as usize)
            .ok_or(RecordError::RecordNotFound(handle))
    }

    pub fn get_mut(&mut self, handle: RecordHandle) -> Result<&mut OrdinaryRecord, RecordError> {
        self.records
            .get_mut(handle.0 as usize)
            .ok_or(RecordError::RecordNotFound(handle))
    }

    /// Number of records, including the object prototype.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    // -- Lookup ---------------------------------------------------------------

    /// Find `key` on `handle` or along its prototype chain; returns the
    /// record that owns it with a copy of its descriptor.
    pub fn lookup(
        &self,
        handle: RecordHandle,
        key: &PropertyKey,
    ) -> Result<Option<(RecordHandle, PropertyDescriptor)>, RecordError> {
        let mut current = Some(handle);
        let mut depth: u32 = 0;
        let mut visited = BTreeSet::new();

        while let Some(h) = current {
            if depth > MAX_PROTOTYPE_CHAIN_DEPTH {
                return Err(RecordError::PrototypeChainTooDeep {
                    depth,
                    max: MAX_PROTOTYPE_CHAIN_DEPTH,
                });
            }
            if !visited.insert(h) {
                return Err(RecordError::PrototypeCycle { record: handle });
            }
            let rec = self.get(h)?;
            if let Some(desc) = rec.get_own_property(key) {
                return Ok(Some((h, desc.clone())));
            }
            current = rec.prototype;
            depth += 1;
        }
        Ok(None)
    }

    /// Read a property through the chain. Getters run with `this = handle`.
    pub fn get_property(
        &mut self,
        handle: RecordHandle,
        key: &PropertyKey,
    ) -> Result<Value, RecordError> {
        match self.lookup(handle, key)? {
            Some((_, PropertyDescriptor::Data { value, .. })) => Ok(value),
            Some((_, PropertyDescriptor::Accessor { get: Some(g), .. })) => {
                self.call_function(g, handle, &[])
            }
            Some((_, PropertyDescriptor::Accessor { get: None, .. })) | None => {
                Ok(Value::Undefined)
            }
        }
    }

    /// Assign a property.
    ///
    /// Own writable data is overwritten in place; inherited setters run with
    /// `this = handle`; otherwise a new default data property is added.
    pub fn set_property(
        &mut self,
        handle: RecordHandle,
        key: PropertyKey,
        value: Value,
    ) -> Result<(), RecordError> {
        let label = key.clone();
        let result = self.store_property(handle, key, value);
        result.map_err(|err| self.relabel(&label, err))
    }

    fn store_property(
        &mut self,
        handle: RecordHandle,
        key: PropertyKey,
        value: Value,
    ) -> Result<(), RecordError> {
        match self.lookup(handle, &key)? {
            Some((owner, PropertyDescriptor::Data { writable, .. })) => {
                if !writable {
                    let detail = if owner == handle {
                        "property is not writable"
                    } else {
                        "inherited property is not writable"
                    };
                    return Err(RecordError::immutable("set", &key, detail));
                }
                let rec = self.get_mut(handle)?;
                if owner == handle {
                    if let Some(PropertyDescriptor::Data { value: slot, .. }) =
                        rec.properties.get_mut(&key)
                    {
                        *slot = value;
                    }
                    return Ok(());
                }
                add_own_data(rec, key, value)
            }
            Some((_, PropertyDescriptor::Accessor { set: Some(s), .. })) => {
                self.call_function(s, handle, &[value]).map(|_| ())
            }
            Some((_, PropertyDescriptor::Accessor { set: None, .. })) => Err(
                RecordError::immutable("set", &key, "accessor property has no setter"),
            ),
            None => add_own_data(self.get_mut(handle)?, key, value),
        }
    }

    /// Generic membership: own keys or anything reachable via the prototype.
    pub fn has_property(&self, handle: RecordHandle, key: &PropertyKey) -> Result<bool, RecordError> {
        Ok(self.lookup(handle, key)?.is_some())
    }

    /// Own membership only, enumerable or not.
    pub fn has_own(&self, handle: RecordHandle, key: &PropertyKey) -> Result<bool, RecordError> {
        Ok(self.get(handle)?.has_own_property(key))
    }

    pub fn delete_property(
        &mut self,
        handle: RecordHandle,
        key: &PropertyKey,
    ) -> Result<(), RecordError> {
        let result = self.get_mut(handle)?.delete(key);
        result.map_err(|err| self.relabel(key, err))
    }

    /// Look `key` up through the chain and call it with `this = handle`.
    pub fn call_method(
        &mut self,
        handle: RecordHandle,
        key: &PropertyKey,
        args: &[Value],
    ) -> Result<Value, RecordError> {
        let callee = self.get_property(handle, key)?;
        match callee.as_function() {
            Some(id) => self.call_function(id, handle, args),
            None => Err(RecordError::NotCallable {
                key: self.key_label(key),
                type_name: callee.type_name().to_string(),
            }),
        }
    }

    // -- Prototype ----------------------------------------------------------

    pub fn get_prototype_of(&self, handle: RecordHandle) -> Result<Option<RecordHandle>, RecordError> {
        Ok(self.get(handle)?.prototype)
    }

    /// Replace the prototype link.
    ///
    /// Setting the current value always succeeds. A non-extensible record's
    /// prototype is otherwise fixed, and a link that would loop back to the
    /// record is rejected.
    pub fn set_prototype_of(
        &mut self,
        handle: RecordHandle,
        proto: Option<RecordHandle>,
    ) -> Result<(), RecordError> {
        let rec = self.get(handle)?;
        if rec.prototype == proto {
            return Ok(());
        }
        if !rec.extensible {
            return Err(RecordError::immutable(
                "set prototype of",
                handle,
                "record is not extensible",
            ));
        }

        let mut current = proto;
        let mut depth: u32 = 0;
        while let Some(h) = current {
            if h == handle {
                return Err(RecordError::PrototypeCycle { record: handle });
            }
            if depth > MAX_PROTOTYPE_CHAIN_DEPTH {
                return Err(RecordError::PrototypeChainTooDeep {
                    depth,
                    max: MAX_PROTOTYPE_CHAIN_DEPTH,
                });
            }
            current = self.get(h)?.prototype;
            depth += 1;
        }

        self.get_mut(handle)?.prototype = proto;
        Ok(())
    }

    // -- Integrity ----------------------------------------------------------

    pub fn is_extensible(&self, handle: RecordHandle) -> Result<bool, RecordError> {
        Ok(self.get(handle)?.extensible)
    }

    pub fn prevent_extensions(&mut self, handle: RecordHandle) -> Result<(), RecordError> {
        self.get_mut(handle)?.prevent_extensions();
        Ok(())
    }

    pub fn freeze(&mut self, handle: RecordHandle) -> Result<(), RecordError> {
        self.get_mut(handle)?.freeze();
        Ok(())
    }

    pub fn seal(&mut self, handle: RecordHandle) -> Result<(), RecordError> {
        self.get_mut(handle)?.seal();
        Ok(())
    }

    pub fn is_frozen(&self, handle: RecordHandle) -> Result<bool, RecordError> {
        Ok(self.get(handle)?.is_frozen())
    }

    pub fn is_sealed(&self, handle: RecordHandle) -> Result<bool, RecordError> {
        Ok(self.get(handle)?.is_sealed())
    }

    pub fn integrity_level(&self, handle: RecordHandle) -> Result<IntegrityLevel, RecordError> {
        Ok(self.get(handle)?.integrity_level())
    }

    // -- Descriptors ----------------------------------------------------------

    pub fn define_property(
        &mut self,
        handle: RecordHandle,
        key: PropertyKey,
        desc: &DescriptorInit,
    ) -> Result<(), RecordError> {
        let partial = desc.validate()?;
        let label = key.clone();
        let result = self.get_mut(handle)?.define_own_property(key, partial);
        result.map_err(|err| self.relabel(&label, err))
    }

    /// Define several properties. Every descriptor is validated before the
    /// first definition; definitions then run in order and stop at the
    /// first rejection.
    pub fn define_properties(
        &mut self,
        handle: RecordHandle,
        props: Vec<(PropertyKey, DescriptorInit)>,
    ) -> Result<(), RecordError> {
        let validated = self.validate_all(props)?;
        self.get(handle)?;
        self.define_validated(handle, validated)
    }

    pub fn get_own_property_descriptor(
        &self,
        handle: RecordHandle,
        key: &PropertyKey,
    ) -> Result<Option<PropertyDescriptor>, RecordError> {
        Ok(self.get(handle)?.get_own_property(key).cloned())
    }

    /// Every own key, strings then symbols, with its descriptor.
    pub fn get_own_property_descriptors(
        &self,
        handle: RecordHandle,
    ) -> Result<Vec<(PropertyKey, PropertyDescriptor)>, RecordError> {
        let rec = self.get(handle)?;
        Ok(rec
            .own_property_keys()
            .into_iter()
            .filter_map(|k| rec.get_own_property(&k).cloned().map(|d| (k, d)))
            .collect())
    }

    // -- Enumeration ----------------------------------------------------------

    /// Every own key in own-key order, enumerable or not.
    pub fn own_keys(&self, handle: RecordHandle) -> Result<Vec<PropertyKey>, RecordError> {
        Ok(self.get(handle)?.own_property_keys())
    }

    /// Own enumerable keys in own-key order, symbols included.
    fn enumerable_own_keys(&self, handle: RecordHandle) -> Result<Vec<PropertyKey>, RecordError> {
        let rec = self.get(handle)?;
        Ok(rec
            .own_property_keys()
            .into_iter()
            .filter(|k| rec.get_own_property(k).is_some_and(|d| d.is_enumerable()))
            .collect())
    }

    /// Own enumerable string keys.
    pub fn keys(&self, handle: RecordHandle) -> Result<Vec<String>, RecordError> {
        Ok(self
            .enumerable_own_keys(handle)?
            .into_iter()
            .filter_map(|k| match k {
                PropertyKey::String(s) => Some(s),
                PropertyKey::Symbol(_) => None,
            })
            .collect())
    }

    /// Own enumerable string-keyed values; getters are invoked.
    pub fn values(&mut self, handle: RecordHandle) -> Result<Vec<Value>, RecordError> {
        Ok(self.entries(handle)?.into_iter().map(|(_, v)| v).collect())
    }

    /// Own enumerable string-keyed `(key, value)` pairs; getters are invoked.
    pub fn entries(&mut self, handle: RecordHandle) -> Result<Vec<(String, Value)>, RecordError> {
        let keys = self.keys(handle)?;
        let mut result = Vec::with_capacity(keys.len());
        for key in keys {
            let prop = PropertyKey::String(key);
            // An earlier getter may have deleted or hidden this key.
            let listed = self
                .get(handle)?
                .get_own_property(&prop)
                .is_some_and(PropertyDescriptor::is_enumerable);
            if !listed {
                continue;
            }
            let value = self.get_property(handle, &prop)?;
            if let PropertyKey::String(key) = prop {
                result.push((key, value));
            }
        }
        Ok(result)
    }

    pub fn get_own_property_names(&self, handle: RecordHandle) -> Result<Vec<String>, RecordError> {
        Ok(self
            .get(handle)?
            .own_property_keys()
            .into_iter()
            .filter_map(|k| match k {
                PropertyKey::String(s) => Some(s),
                PropertyKey::Symbol(_) => None,
            })
            .collect())
    }

    pub fn get_own_property_symbols(
        &self,
        handle: RecordHandle,
    ) -> Result<Vec<SymbolId>, RecordError> {
        Ok(self
            .get(handle)?
            .own_property_keys()
            .into_iter()
            .filter_map(|k| match k {
                PropertyKey::Symbol(id) => Some(id),
                PropertyKey::String(_) => None,
            })
            .collect())
    }

    // -- Construction and copying --------------------------------------------

    /// Copy own enumerable properties (strings, then symbols) of each
    /// source onto `target`, in order, and return `target`.
    pub fn assign(
        &mut self,
        target: RecordHandle,
        sources: &[RecordHandle],
    ) -> Result<RecordHandle, RecordError> {
        self.get(target)?;
        for &src in sources {
            for key in self.enumerable_own_keys(src)? {
                let value = self.get_property(src, &key)?;
                self.set_property(target, key, value)?;
            }
        }
        Ok(target)
    }

    /// Allocate a record with `proto` and the described own properties.
    /// Nothing is allocated when a descriptor is invalid.
    pub fn create(
        &mut self,
        proto: Option<RecordHandle>,
        props: Option<Vec<(PropertyKey, DescriptorInit)>>,
    ) -> Result<RecordHandle, RecordError> {
        if let Some(p) = proto {
            self.get(p)?;
        }
        let validated = self.validate_all(props.unwrap_or_default())?;
        let handle = self.alloc(proto);
        self.define_validated(handle, validated)?;
        Ok(handle)
    }

    /// Build a record from pairs. A repeated key takes the later value and
    /// moves to the position of its last write.
    pub fn from_entries<K, V>(&mut self, pairs: impl IntoIterator<Item = (K, V)>) -> RecordHandle
    where
        K: Into<PropertyKey>,
        V: Into<Value>,
    {
        let handle = self.alloc(Some(self.object_prototype));
        if let Some(rec) = self.records.get_mut(handle.0 as usize) {
            for (key, value) in pairs {
                rec.put_last(key.into(), value.into());
            }
        }
        handle
    }

    /// SameValue identity.
    pub fn identity(a: &Value, b: &Value) -> bool {
        a.same_value(b)
    }

    fn define_validated(
        &mut self,
        handle: RecordHandle,
        validated: Vec<(PropertyKey, PartialDescriptor)>,
    ) -> Result<(), RecordError> {
        for (key, partial) in validated {
            let label = key.clone();
            let result = self.get_mut(handle)?.define_own_property(key, partial);
            result.map_err(|err| self.relabel(&label, err))?;
        }
        Ok(())
    }

    fn validate_all(
        &self,
        props: Vec<(PropertyKey, DescriptorInit)>,
    ) -> Result<Vec<(PropertyKey, PartialDescriptor)>, RecordError> {
        props
            .into_iter()
            .map(|(key, init)| match init.validate() {
                Ok(partial) => Ok((key, partial)),
                Err(RecordError::InvalidDescriptor { detail }) => {
                    Err(RecordError::InvalidDescriptor {
                        detail: format!("`{}`: {detail}", self.key_label(&key)),
                    })
                }
                Err(other) => Err(other),
            })
            .collect()
    }
}

fn add_own_data(rec: &mut OrdinaryRecord, key: PropertyKey, value: Value) -> Result<(), RecordError> {
    if !rec.extensible {
        return Err(RecordError::immutable(
            "add",
            &key,
            "record is not extensible",
        ));
    }
    rec.properties.insert(key, PropertyDescriptor::data(value));
    Ok(())
}
