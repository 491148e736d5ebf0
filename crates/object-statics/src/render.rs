//! Console-style rendering of values, sequences, records and descriptors.
//!
//! Output follows the familiar inspector layout: `{ a: 1, b: 'x' }`,
//! `[ 'a', 'b' ]`, `[Function: greet]`, `Symbol(tag)`. Only enumerable own
//! properties of a record are shown, string keys before symbol keys.
//! Accessors are shown as `[Getter]`/`[Setter]`/`[Getter/Setter]` and are
//! never invoked. Everything renders on one line.

use std::collections::BTreeSet;

use crate::descriptor::PropertyDescriptor;
use crate::heap::RecordHeap;
use crate::value::{FunctionId, PropertyKey, RecordHandle, SymbolId, Value, number_to_string};

/// Records nested deeper than this collapse to `[Object]`.
pub const MAX_RENDER_DEPTH: usize = 2;

/// Renders against the heap that owns the handles.
#[derive(Debug, Clone, Copy)]
pub struct Renderer<'h> {
    heap: &'h RecordHeap,
}

impl<'h> Renderer<'h> {
    pub fn new(heap: &'h RecordHeap) -> Self {
        Self { heap }
    }

    /// Top-level rendering: strings print bare, everything else as
    /// [`Renderer::inspect`].
    pub fn display(&self, value: &Value) -> String {
        match value {
            Value::Str(s) => s.clone(),
            other => self.inspect(other),
        }
    }

    /// Nested rendering: strings are quoted.
    pub fn inspect(&self, value: &Value) -> String {
        let mut visiting = BTreeSet::new();
        self.inspect_at(value, 0, &mut visiting)
    }

    pub fn list(&self, items: &[Value]) -> String {
        bracket(items.iter().map(|v| self.inspect(v)))
    }

    pub fn string_list<S: AsRef<str>>(&self, items: &[S]) -> String {
        bracket(items.iter().map(|s| quote(s.as_ref())))
    }

    pub fn symbol_list(&self, ids: &[SymbolId]) -> String {
        bracket(ids.iter().map(|id| self.symbol(*id)))
    }

    /// `[ [ 'key', value ], ... ]`
    pub fn entries(&self, pairs: &[(String, Value)]) -> String {
        bracket(
            pairs
                .iter()
                .map(|(k, v)| format!("[ {}, {} ]", quote(k), self.inspect(v))),
        )
    }

    pub fn symbol(&self, id: SymbolId) -> String {
        self.heap.key_label(&PropertyKey::Symbol(id))
    }

    pub fn key(&self, key: &PropertyKey) -> String {
        match key {
            PropertyKey::String(s) if is_identifier(s) => s.clone(),
            PropertyKey::String(s) => quote(s),
            PropertyKey::Symbol(id) => format!("[{}]", self.symbol(*id)),
        }
    }

    pub fn function(&self, id: FunctionId) -> String {
        match self.heap.function_name(id) {
            Some(name) if !name.is_empty() => format!("[Function: {name}]"),
            _ => "[Function (anonymous)]".to_string(),
        }
    }

    /// `{ value: 42, writable: false, enumerable: true, configurable: false }`
    pub fn descriptor(&self, desc: &PropertyDescriptor) -> String {
        match desc {
            PropertyDescriptor::Data {
                value,
                writable,
                enumerable,
                configurable,
            } => format!(
                "{{ value: {}, writable: {writable}, enumerable: {enumerable}, configurable: {configurable} }}",
                self.inspect(value)
            ),
            PropertyDescriptor::Accessor {
                get,
                set,
                enumerable,
                configurable,
            } => format!(
                "{{ get: {}, set: {}, enumerable: {enumerable}, configurable: {configurable} }}",
                self.optional_function(*get),
                self.optional_function(*set)
            ),
        }
    }

    pub fn descriptors(&self, descs: &[(PropertyKey, PropertyDescriptor)]) -> String {
        brace(
            descs
                .iter()
                .map(|(k, d)| format!("{}: {}", self.key(k), self.descriptor(d))),
        )
    }

    fn optional_function(&self, id: Option<FunctionId>) -> String {
        id.map_or_else(|| "undefined".to_string(), |f| self.function(f))
    }

    fn inspect_at(
        &self,
        value: &Value,
        depth: usize,
        visiting: &mut BTreeSet<RecordHandle>,
    ) -> String {
        match value {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) if *n == 0.0 && n.is_sign_negative() => "-0".to_string(),
            Value::Number(n) => number_to_string(*n),
            Value::Str(s) => quote(s),
            Value::Symbol(id) => self.symbol(*id),
            Value::Function(id) => self.function(*id),
            Value::Record(h) => self.record_at(*h, depth, visiting),
        }
    }

    fn record_at(
        &self,
        handle: RecordHandle,
        depth: usize,
        visiting: &mut BTreeSet<RecordHandle>,
    ) -> String {
        let Ok(rec) = self.heap.get(handle) else {
            return format!("<dangling {handle}>");
        };
        if visiting.contains(&handle) {
            return "[Circular]".to_string();
        }
        let prefix = if rec.prototype.is_none() {
            "[Object: null prototype] "
        } else {
            ""
        };
        if depth > MAX_RENDER_DEPTH {
            return format!("{prefix}[Object]");
        }

        visiting.insert(handle);
        let fields: Vec<String> = rec
            .own_property_keys()
            .iter()
            .filter_map(|k| rec.get_own_property(k).map(|d| (k, d)))
            .filter(|(_, d)| d.is_enumerable())
            .map(|(k, d)| {
                let shown = match d {
                    PropertyDescriptor::Data { value, .. } => {
                        self.inspect_at(value, depth + 1, visiting)
                    }
                    PropertyDescriptor::Accessor { get, set, .. } => match (get, set) {
                        (Some(_), Some(_)) => "[Getter/Setter]".to_string(),
                        (Some(_), None) => "[Getter]".to_string(),
                        (None, Some(_)) => "[Setter]".to_string(),
                        (None, None) => "undefined".to_string(),
                    },
                };
                format!("{}: {shown}", self.key(k))
            })
            .collect();
        visiting.remove(&handle);

        format!("{prefix}{}", brace(fields.into_iter()))
    }
}

fn bracket(items: impl Iterator<Item = String>) -> String {
    let items: Vec<String> = items.collect();
    if items.is_empty() {
        "[]".to_string()
    } else {
        format!("[ {} ]", items.join(", "))
    }
}

fn brace(items: impl Iterator<Item = String>) -> String {
    let items: Vec<String> = items.collect();
    if items.is_empty() {
        "{}".to_string()
    } else {
        format!("{{ {} }}", items.join(", "))
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}
