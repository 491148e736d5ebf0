#![forbid(unsafe_code)]

//! Prototype-based record model: property descriptors, a prototype link, an
//! extensibility lattice (extensible, non-extensible, sealed, frozen) and the
//! static operations over them, plus a console demonstration runner.

pub mod config;
pub mod demo;
pub mod descriptor;
pub mod error;
pub mod events;
pub mod heap;
pub mod record;
pub mod render;
pub mod value;

pub use config::{ConfigError, DemoConfig, OutputFormat};
pub use demo::{DemoError, DemoReport, DemoRunner};
pub use descriptor::{DescriptorInit, PartialDescriptor, PropertyDescriptor};
pub use error::RecordError;
pub use events::{EventLog, StructuredLogEvent};
pub use heap::{MAX_PROTOTYPE_CHAIN_DEPTH, NativeFn, RecordHeap};
pub use record::{IntegrityLevel, OrdinaryRecord};
pub use render::Renderer;
pub use value::{FunctionId, PropertyKey, RecordHandle, SymbolId, Value};
