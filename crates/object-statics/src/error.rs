//! Record model errors with stable codes.
//!
//! Codes are append-only: an assigned code is never reused for a different
//! failure, so structured log consumers can key on them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::value::{FunctionId, RecordHandle};

/// Errors from record model operations.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum RecordError {
    /// Descriptor mixes data and accessor fields, or names a non-callable
    /// getter/setter.
    #[error("InvalidDescriptor: {detail}")]
    InvalidDescriptor { detail: String },
    /// Add/remove/mutate forbidden by extensibility or by the property's
    /// `writable`/`configurable` attributes.
    #[error("ImmutableViolation: cannot {operation} `{key}`: {detail}")]
    ImmutableViolation {
        operation: String,
        key: String,
        detail: String,
    },
    /// Setting the prototype would make the chain loop back to the record.
    #[error("PrototypeCycle: prototype chain of {record} would contain itself")]
    PrototypeCycle { record: RecordHandle },
    /// Prototype chain longer than the lookup limit.
    #[error("PrototypeChainTooDeep: depth {depth} exceeds max {max}")]
    PrototypeChainTooDeep { depth: u32, max: u32 },
    /// Handle does not belong to this heap.
    #[error("RecordNotFound: {0} not found")]
    RecordNotFound(RecordHandle),
    /// Function id does not belong to this heap.
    #[error("FunctionNotFound: {0} not found")]
    FunctionNotFound(FunctionId),
    /// Called a property whose value is not a function.
    #[error("NotCallable: `{key}` is {type_name}, not a function")]
    NotCallable { key: String, type_name: String },
}

impl RecordError {
    pub(crate) fn immutable(
        operation: &str,
        key: impl ToString,
        detail: impl Into<String>,
    ) -> Self {
        Self::ImmutableViolation {
            operation: operation.to_string(),
            key: key.to_string(),
            detail: detail.into(),
        }
    }

    pub(crate) fn invalid_descriptor(detail: impl Into<String>) -> Self {
        Self::InvalidDescriptor {
            detail: detail.into(),
        }
    }

    /// Stable error code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidDescriptor { .. } => "OS-1001",
            Self::ImmutableViolation { .. } => "OS-1002",
            Self::PrototypeCycle { .. } => "OS-1003",
            Self::PrototypeChainTooDeep { .. } => "OS-1004",
            Self::RecordNotFound(_) => "OS-1005",
            Self::FunctionNotFound(_) => "OS-1006",
            Self::NotCallable { .. } => "OS-1007",
        }
    }

    /// Errors a script would observe as a thrown `TypeError`.
    pub const fn is_type_error(&self) -> bool {
        !matches!(self, Self::RecordNotFound(_) | Self::FunctionNotFound(_))
    }
}
