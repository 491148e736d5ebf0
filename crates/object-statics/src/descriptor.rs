//! Property descriptors.
//!
//! Stored descriptors are the tagged [`PropertyDescriptor`]: a property is
//! either data or accessor, never both. Callers describe properties with the
//! loose [`DescriptorInit`], which may name any subset of fields and is
//! validated into a tagged [`PartialDescriptor`] before it touches a record.

use serde::{Deserialize, Serialize};

use crate::error::RecordError;
use crate::value::{FunctionId, Value};

// ---------------------------------------------------------------------------
// PropertyDescriptor
// ---------------------------------------------------------------------------

/// Complete descriptor stored for an own property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyDescriptor {
    /// Data descriptor: has `value` and `writable`.
    Data {
        value: Value,
        writable: bool,
        enumerable: bool,
        configurable: bool,
    },
    /// Accessor descriptor: has `get` and/or `set`.
    Accessor {
        get: Option<FunctionId>,
        set: Option<FunctionId>,
        enumerable: bool,
        configurable: bool,
    },
}

impl PropertyDescriptor {
    /// Writable, enumerable, configurable data descriptor, as created by
    /// plain assignment.
    pub fn data(value: Value) -> Self {
        Self::Data {
            value,
            writable: true,
            enumerable: true,
            configurable: true,
        }
    }

    /// Can the property be deleted or redefined?
    pub fn is_configurable(&self) -> bool {
        match self {
            Self::Data { configurable, .. } | Self::Accessor { configurable, .. } => *configurable,
        }
    }

    /// Does the property show up in keys/values/entries?
    pub fn is_enumerable(&self) -> bool {
        match self {
            Self::Data { enumerable, .. } | Self::Accessor { enumerable, .. } => *enumerable,
        }
    }

    /// Holds a value rather than a getter/setter pair.
    pub fn is_data(&self) -> bool {
        matches!(self, Self::Data { .. })
    }

    /// Holds a getter and/or setter.
    pub fn is_accessor(&self) -> bool {
        matches!(self, Self::Accessor { .. })
    }

    /// Stored value of a data descriptor.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Data { value, .. } => Some(value),
            Self::Accessor { .. } => None,
        }
    }

    /// Whether assignment may replace the value; accessors are never
    /// writable.
    pub fn is_writable(&self) -> bool {
        match self {
            Self::Data { writable, .. } => *writable,
            Self::Accessor { .. } => false,
        }
    }

    /// Getter of an accessor; `None` for data or a missing getter.
    pub fn getter(&self) -> Option<FunctionId> {
        match self {
            Self::Accessor { get, .. } => *get,
            Self::Data { .. } => None,
        }
    }

    /// Setter of an accessor; `None` for data or a missing setter.
    pub fn setter(&self) -> Option<FunctionId> {
        match self {
            Self::Accessor { set, .. } => *set,
            Self::Data { .. } => None,
        }
    }

    /// Lock the property against deletion and redefinition.
    pub fn set_non_configurable(&mut self) {
        match self {
            Self::Data { configurable, .. } | Self::Accessor { configurable, .. } => {
                *configurable = false;
            }
        }
    }

    /// Make a data property read-only; no-op for accessors.
    pub fn set_non_writable(&mut self) {
        if let Self::Data { writable, .. } = self {
            *writable = false;
        }
    }

    /// Attribute-wise identity, comparing values with SameValue.
    pub fn same_as(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::Data {
                    value: v1,
                    writable: w1,
                    enumerable: e1,
                    configurable: c1,
                },
                Self::Data {
                    value: v2,
                    writable: w2,
                    enumerable: e2,
                    configurable: c2,
                },
            ) => v1.same_value(v2) && w1 == w2 && e1 == e2 && c1 == c2,
            (Self::Accessor { .. }, Self::Accessor { .. }) => self == other,
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// DescriptorInit
// ---------------------------------------------------------------------------

/// Descriptor as written by a caller: any field may be omitted.
///
/// `get`/`set` hold values rather than function ids so that a non-callable
/// getter is representable and rejected by [`DescriptorInit::validate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DescriptorInit {
    pub value: Option<Value>,
    pub writable: Option<bool>,
    pub get: Option<Value>,
    pub set: Option<Value>,
    pub enumerable: Option<bool>,
    pub configurable: Option<bool>,
}

impl DescriptorInit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_writable(mut self, writable: bool) -> Self {
        self.writable = Some(writable);
        self
    }

    pub fn with_enumerable(mut self, enumerable: bool) -> Self {
        self.enumerable = Some(enumerable);
        self
    }

    pub fn with_configurable(mut self, configurable: bool) -> Self {
        self.configurable = Some(configurable);
        self
    }

    pub fn with_getter(mut self, get: Value) -> Self {
        self.get = Some(get);
        self
    }

    pub fn with_setter(mut self, set: Value) -> Self {
        self.set = Some(set);
        self
    }

    /// Classify into a tagged partial descriptor.
    pub fn validate(&self) -> Result<PartialDescriptor, RecordError> {
        let is_accessor = self.get.is_some() || self.set.is_some();
        let is_data = self.value.is_some() || self.writable.is_some();
        if is_accessor && is_data {
            return Err(RecordError::invalid_descriptor(
                "descriptor cannot specify both accessor (get/set) and data (value/writable) fields",
            ));
        }

        if is_accessor {
            return Ok(PartialDescriptor::Accessor {
                get: accessor_slot("getter", self.get.as_ref())?,
                set: accessor_slot("setter", self.set.as_ref())?,
                enumerable: self.enumerable,
                configurable: self.configurable,
            });
        }
        if is_data {
            return Ok(PartialDescriptor::Data {
                value: self.value.clone(),
                writable: self.writable,
                enumerable: self.enumerable,
                configurable: self.configurable,
            });
        }
        Ok(PartialDescriptor::Generic {
            enumerable: self.enumerable,
            configurable: self.configurable,
        })
    }
}

fn accessor_slot(
    role: &str,
    slot: Option<&Value>,
) -> Result<Option<Option<FunctionId>>, RecordError> {
    match slot {
        None => Ok(None),
        Some(Value::Undefined) => Ok(Some(None)),
        Some(Value::Function(id)) => Ok(Some(Some(*id))),
        Some(other) => Err(RecordError::invalid_descriptor(format!(
            "{role} must be a function or undefined, got {}",
            other.type_name()
        ))),
    }
}

impl From<PropertyDescriptor> for DescriptorInit {
    fn from(desc: PropertyDescriptor) -> Self {
        match desc {
            PropertyDescriptor::Data {
                value,
                writable,
                enumerable,
                configurable,
            } => Self {
                value: Some(value),
                writable: Some(writable),
                enumerable: Some(enumerable),
                configurable: Some(configurable),
                ..Self::default()
            },
            PropertyDescriptor::Accessor {
                get,
                set,
                enumerable,
                configurable,
            } => Self {
                get: Some(get.map_or(Value::Undefined, Value::Function)),
                set: Some(set.map_or(Value::Undefined, Value::Function)),
                enumerable: Some(enumerable),
                configurable: Some(configurable),
                ..Self::default()
            },
        }
    }
}

// ---------------------------------------------------------------------------
// PartialDescriptor
// ---------------------------------------------------------------------------

/// A validated descriptor whose unspecified fields are `None`.
///
/// For accessors the outer `Option` says whether `get`/`set` was given; the
/// inner one is `None` for an explicit `undefined`.
#[derive(Debug, Clone, PartialEq)]
pub enum PartialDescriptor {
    Generic {
        enumerable: Option<bool>,
        configurable: Option<bool>,
    },
    Data {
        value: Option<Value>,
        writable: Option<bool>,
        enumerable: Option<bool>,
        configurable: Option<bool>,
    },
    Accessor {
        get: Option<Option<FunctionId>>,
        set: Option<Option<FunctionId>>,
        enumerable: Option<bool>,
        configurable: Option<bool>,
    },
}

impl PartialDescriptor {
    fn flags(&self) -> (Option<bool>, Option<bool>) {
        match self {
            Self::Generic {
                enumerable,
                configurable,
            }
            | Self::Data {
                enumerable,
                configurable,
                ..
            }
            | Self::Accessor {
                enumerable,
                configurable,
                ..
            } => (*enumerable, *configurable),
        }
    }

    /// Descriptor for a new property: missing booleans are `false`, a
    /// missing value is `Undefined`.
    pub fn complete(self) -> PropertyDescriptor {
        self.apply_to(None)
    }

    /// Merge over an existing descriptor; unspecified fields keep the
    /// current attributes. Switching between data and accessor keeps only
    /// `enumerable`/`configurable`.
    pub fn apply_to(self, current: Option<&PropertyDescriptor>) -> PropertyDescriptor {
        let (enumerable, configurable) = self.flags();
        let enumerable = enumerable.unwrap_or_else(|| current.is_some_and(|c| c.is_enumerable()));
        let configurable =
            configurable.unwrap_or_else(|| current.is_some_and(|c| c.is_configurable()));

        match self {
            Self::Generic { .. } => match current {
                Some(PropertyDescriptor::Data {
                    value, writable, ..
                }) => PropertyDescriptor::Data {
                    value: value.clone(),
                    writable: *writable,
                    enumerable,
                    configurable,
                },
                Some(PropertyDescriptor::Accessor { get, set, .. }) => {
                    PropertyDescriptor::Accessor {
                        get: *get,
                        set: *set,
                        enumerable,
                        configurable,
                    }
                }
                None => PropertyDescriptor::Data {
                    value: Value::Undefined,
                    writable: false,
                    enumerable,
                    configurable,
                },
            },
            Self::Data {
                value, writable, ..
            } => {
                let (cur_value, cur_writable) = match current {
                    Some(PropertyDescriptor::Data {
                        value, writable, ..
                    }) => (value.clone(), *writable),
                    _ => (Value::Undefined, false),
                };
                PropertyDescriptor::Data {
                    value: value.unwrap_or(cur_value),
                    writable: writable.unwrap_or(cur_writable),
                    enumerable,
                    configurable,
                }
            }
            Self::Accessor { get, set, .. } => {
                let (cur_get, cur_set) = match current {
                    Some(PropertyDescriptor::Accessor { get, set, .. }) => (*get, *set),
                    _ => (None, None),
                };
                PropertyDescriptor::Accessor {
                    get: get.unwrap_or(cur_get),
                    set: set.unwrap_or(cur_set),
                    enumerable,
                    configurable,
                }
            }
        }
    }
}
