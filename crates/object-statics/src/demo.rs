//! Demonstration blocks for the record statics and the runner that executes
//! them.
//!
//! Every block builds its records on a fresh [`RecordHeap`], so blocks are
//! independent: a failure in one is recorded and the next still runs. Writes
//! that the record state forbids are executed and their rejection is printed.

use std::fmt::Display;
use std::io::Write;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::config::{ConfigError, DemoConfig, OutputFormat};
use crate::descriptor::DescriptorInit;
use crate::error::RecordError;
use crate::events::{EventLog, StructuredLogEvent};
use crate::heap::RecordHeap;
use crate::render::Renderer;
use crate::value::{PropertyKey, RecordHandle, Value};

pub const HEADER: &str = "=== OBJECT STATIC METHODS DEMONSTRATION ===";
pub const FOOTER: &str = "=== END STATIC DEMO ===";

#[derive(Debug, Error)]
pub enum DemoError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to write demo output: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode demo report: {0}")]
    Encode(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// BlockScope
// ---------------------------------------------------------------------------

/// Fresh heap plus the lines a block has produced so far.
#[derive(Debug, Default)]
pub struct BlockScope {
    pub heap: RecordHeap,
    lines: Vec<String>,
}

impl BlockScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn renderer(&self) -> Renderer<'_> {
        Renderer::new(&self.heap)
    }

    pub fn line(&mut self, text: impl Into<String>) {
        self.lines.push(text.into());
    }

    /// `label text`
    pub fn say(&mut self, label: &str, text: impl Display) {
        self.lines.push(format!("{label} {text}"));
    }

    /// `label value`, value rendered for the console.
    pub fn show(&mut self, label: &str, value: &Value) {
        let shown = self.renderer().display(value);
        self.say(label, shown);
    }

    pub fn show_record(&mut self, label: &str, handle: RecordHandle) {
        self.show(label, &Value::Record(handle));
    }

    /// Print whether a write was accepted or, with its code, rejected.
    pub fn attempt(&mut self, label: &str, result: Result<(), RecordError>) {
        match result {
            Ok(()) => self.say(label, "accepted"),
            Err(err) => self.say(label, format!("rejected ({}) {err}", err.code())),
        }
    }
}

pub type BlockFn = fn(&mut BlockScope) -> Result<(), RecordError>;

/// A named, titled demonstration block.
#[derive(Debug, Clone, Copy)]
pub struct DemoBlock {
    pub name: &'static str,
    pub title: &'static str,
    pub run: BlockFn,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockStatus {
    Passed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockOutcome {
    pub name: String,
    pub status: BlockStatus,
    pub error_code: Option<String>,
    pub error: Option<String>,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoReport {
    pub trace_id: String,
    pub blocks: Vec<BlockOutcome>,
    pub events: Vec<StructuredLogEvent>,
    pub transcript: String,
    pub transcript_sha256: String,
}

impl DemoReport {
    pub fn passed(&self) -> bool {
        self.blocks.iter().all(|b| b.status == BlockStatus::Passed)
    }

    pub fn failed_blocks(&self) -> Vec<&str> {
        self.blocks
            .iter()
            .filter(|b| b.status == BlockStatus::Failed)
            .map(|b| b.name.as_str())
            .collect()
    }

    pub fn block(&self, name: &str) -> Option<&BlockOutcome> {
        self.blocks.iter().find(|b| b.name == name)
    }
}

pub fn transcript_digest(transcript: &str) -> String {
    format!("sha256:{}", hex::encode(Sha256::digest(transcript.as_bytes())))
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct DemoRunner {
    blocks: Vec<DemoBlock>,
}

impl Default for DemoRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoRunner {
    /// Runner over the full catalog.
    pub fn new() -> Self {
        Self {
            blocks: catalog().to_vec(),
        }
    }

    pub fn with_blocks(blocks: Vec<DemoBlock>) -> Self {
        Self { blocks }
    }

    pub fn block_names(&self) -> Vec<&'static str> {
        self.blocks.iter().map(|b| b.name).collect()
    }

    /// Run the selected blocks in order.
    ///
    /// Text format streams the transcript to `out` block by block (followed
    /// by the event lines when requested); JSON format writes the whole
    /// report once at the end.
    pub fn run(&self, config: &DemoConfig, out: &mut dyn Write) -> Result<DemoReport, DemoError> {
        config.validate(&self.block_names())?;
        let streaming = config.format == OutputFormat::Text;

        let mut log = EventLog::new();
        log.emit(StructuredLogEvent::success(&config.trace_id, "run_started"));

        let mut transcript = String::new();
        let mut emit = |lines: &[String], transcript: &mut String| -> std::io::Result<()> {
            for line in lines {
                transcript.push_str(line);
                transcript.push('\n');
                if streaming {
                    writeln!(out, "{line}")?;
                }
            }
            Ok(())
        };

        emit(&[HEADER.to_string()], &mut transcript)?;

        let mut outcomes = Vec::new();
        for block in self.blocks.iter().filter(|b| config.selects(b.name)) {
            let outcome = run_block(block);
            let event = format!("block.{}", block.name);
            log.emit(match &outcome.error_code {
                Some(code) => StructuredLogEvent::failure(&config.trace_id, &event, code),
                None => StructuredLogEvent::success(&config.trace_id, &event),
            });
            emit(&outcome.lines, &mut transcript)?;
            outcomes.push(outcome);
        }

        emit(&[String::new(), FOOTER.to_string()], &mut transcript)?;
        log.emit(StructuredLogEvent::success(&config.trace_id, "run_finished"));

        if streaming && config.emit_events {
            write!(out, "{}", log.to_json_lines()?)?;
        }

        let report = DemoReport {
            trace_id: config.trace_id.clone(),
            blocks: outcomes,
            transcript_sha256: transcript_digest(&transcript),
            transcript,
            events: log.into_events(),
        };
        if config.format == OutputFormat::Json {
            serde_json::to_writer_pretty(&mut *out, &report)?;
            writeln!(out)?;
        }
        out.flush()?;
        Ok(report)
    }
}

fn run_block(block: &DemoBlock) -> BlockOutcome {
    let mut scope = BlockScope::new();
    let result = (block.run)(&mut scope);

    let mut lines = vec![String::new(), format!("--- {} ---", block.title)];
    lines.extend(scope.lines);
    match result {
        Ok(()) => BlockOutcome {
            name: block.name.to_string(),
            status: BlockStatus::Passed,
            error_code: None,
            error: None,
            lines,
        },
        Err(err) => {
            lines.push(format!("!! {} failed ({}): {err}", block.name, err.code()));
            BlockOutcome {
                name: block.name.to_string(),
                status: BlockStatus::Failed,
                error_code: Some(err.code().to_string()),
                error: Some(err.to_string()),
                lines,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

const CATALOG: &[DemoBlock] = &[
    DemoBlock {
        name: "assign",
        title: "assign - Copy properties from source records to target",
        run: assign_block,
    },
    DemoBlock {
        name: "create",
        title: "create - Create record with specified prototype",
        run: create_block,
    },
    DemoBlock {
        name: "define_property",
        title: "defineProperty - Define single property with descriptors",
        run: define_property_block,
    },
    DemoBlock {
        name: "define_properties",
        title: "defineProperties - Define multiple properties",
        run: define_properties_block,
    },
    DemoBlock {
        name: "entries",
        title: "entries - Get array of key-value pairs",
        run: entries_block,
    },
    DemoBlock {
        name: "from_entries",
        title: "fromEntries - Create record from entries",
        run: from_entries_block,
    },
    DemoBlock {
        name: "freeze",
        title: "freeze - Make record immutable",
        run: freeze_block,
    },
    DemoBlock {
        name: "get_own_property_descriptor",
        title: "getOwnPropertyDescriptor - Get property descriptor",
        run: get_own_property_descriptor_block,
    },
    DemoBlock {
        name: "get_own_property_descriptors",
        title: "getOwnPropertyDescriptors - Get all property descriptors",
        run: get_own_property_descriptors_block,
    },
    DemoBlock {
        name: "get_own_property_names",
        title: "getOwnPropertyNames - Get all own property names",
        run: get_own_property_names_block,
    },
    DemoBlock {
        name: "get_own_property_symbols",
        title: "getOwnPropertySymbols - Get symbol properties",
        run: get_own_property_symbols_block,
    },
    DemoBlock {
        name: "get_prototype_of",
        title: "getPrototypeOf - Get record prototype",
        run: get_prototype_of_block,
    },
    DemoBlock {
        name: "set_prototype_of",
        title: "setPrototypeOf - Set record prototype",
        run: set_prototype_of_block,
    },
    DemoBlock {
        name: "has_own",
        title: "hasOwn - Check if record has own property",
        run: has_own_block,
    },
    DemoBlock {
        name: "is",
        title: "is - Identity comparison",
        run: is_block,
    },
    DemoBlock {
        name: "is_extensible",
        title: "isExtensible - Check if record can be extended",
        run: is_extensible_block,
    },
    DemoBlock {
        name: "is_frozen",
        title: "isFrozen - Check if record is frozen",
        run: is_frozen_block,
    },
    DemoBlock {
        name: "is_sealed",
        title: "isSealed - Check if record is sealed",
        run: is_sealed_block,
    },
    DemoBlock {
        name: "keys",
        title: "keys - Get enumerable own property names",
        run: keys_block,
    },
    DemoBlock {
        name: "prevent_extensions",
        title: "preventExtensions - Prevent adding new properties",
        run: prevent_extensions_block,
    },
    DemoBlock {
        name: "seal",
        title: "seal - Prevent adding/removing properties",
        run: seal_block,
    },
    DemoBlock {
        name: "values",
        title: "values - Get array of property values",
        run: values_block,
    },
];

/// Every demonstration block, in presentation order.
pub fn catalog() -> &'static [DemoBlock] {
    CATALOG
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn key(s: &str) -> PropertyKey {
    PropertyKey::from(s)
}

fn greet(heap: &mut RecordHeap, this: RecordHandle, _args: &[Value]) -> Result<Value, RecordError> {
    let name = heap.get_property(this, &key("name"))?;
    Ok(Value::Str(format!("Hello, I'm {name}")))
}

fn make_sound(
    _heap: &mut RecordHeap,
    _this: RecordHandle,
    _args: &[Value],
) -> Result<Value, RecordError> {
    Ok(Value::str("Some sound"))
}

fn user(heap: &mut RecordHeap) -> RecordHandle {
    heap.literal([
        ("name", Value::str("Alice")),
        ("age", Value::from(30)),
        ("city", Value::str("NYC")),
    ])
}

fn person_proto(heap: &mut RecordHeap) -> RecordHandle {
    let greet = heap.register_function("greet", greet);
    heap.literal([("greet", Value::Function(greet))])
}

fn john(heap: &mut RecordHeap, proto: RecordHandle) -> Result<RecordHandle, RecordError> {
    heap.create(
        Some(proto),
        Some(vec![(
            key("name"),
            DescriptorInit::new().with_value("John").with_writable(true),
        )]),
    )
}

fn read_only_record(heap: &mut RecordHeap) -> Result<RecordHandle, RecordError> {
    let rec = heap.literal(Vec::<(&str, Value)>::new());
    heap.define_property(
        rec,
        key("readOnly"),
        &DescriptorInit::new()
            .with_value(42)
            .with_writable(false)
            .with_enumerable(true),
    )?;
    Ok(rec)
}

fn two_prop_record(heap: &mut RecordHeap) -> Result<RecordHandle, RecordError> {
    let rec = heap.literal(Vec::<(&str, Value)>::new());
    heap.define_properties(
        rec,
        vec![
            (
                key("prop1"),
                DescriptorInit::new()
                    .with_value("value1")
                    .with_writable(true)
                    .with_enumerable(true),
            ),
            (
                key("prop2"),
                DescriptorInit::new()
                    .with_value("value2")
                    .with_writable(false)
                    .with_enumerable(false),
            ),
        ],
    )?;
    Ok(rec)
}

fn xy(heap: &mut RecordHeap) -> RecordHandle {
    heap.literal([("x", 1), ("y", 2)])
}

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

fn assign_block(s: &mut BlockScope) -> Result<(), RecordError> {
    let target = s.heap.literal([("a", 1)]);
    let source1 = s.heap.literal([("b", 2), ("c", 3)]);
    let source2 = s.heap.literal([("d", 4)]);
    let result = s.heap.assign(target, &[source1, source2])?;
    s.show_record("Target after assign:", target);
    s.show_record("Result:", result);
    s.say("Target === Result:", target == result);
    Ok(())
}

fn create_block(s: &mut BlockScope) -> Result<(), RecordError> {
    let proto = person_proto(&mut s.heap);
    let john = john(&mut s.heap, proto)?;
    s.show_record("John record:", john);
    let greeting = s.heap.call_method(john, &key("greet"), &[])?;
    s.show("John greeting:", &greeting);
    s.say(
        "Prototype check:",
        s.heap.get_prototype_of(john)? == Some(proto),
    );
    Ok(())
}

fn define_property_block(s: &mut BlockScope) -> Result<(), RecordError> {
    let rec = read_only_record(&mut s.heap)?;
    s.show_record("Record with readOnly property:", rec);
    let value = s.heap.get_property(rec, &key("readOnly"))?;
    s.show("readOnly value:", &value);
    let write = s.heap.set_property(rec, key("readOnly"), Value::from(100));
    s.attempt("Writing readOnly = 100:", write);
    Ok(())
}

fn define_properties_block(s: &mut BlockScope) -> Result<(), RecordError> {
    let rec = two_prop_record(&mut s.heap)?;
    s.show_record("Record with multiple properties:", rec);
    let keys = s.heap.keys(rec)?;
    let shown = s.renderer().string_list(&keys);
    s.say("Enumerable properties:", shown);
    Ok(())
}

fn entries_block(s: &mut BlockScope) -> Result<(), RecordError> {
    let user = user(&mut s.heap);
    let entries = s.heap.entries(user)?;
    let shown = s.renderer().entries(&entries);
    s.say("Record entries:", shown);
    s.line("Iterating entries:");
    for (k, v) in &entries {
        let shown = s.renderer().display(v);
        s.line(format!("  {k}: {shown}"));
    }
    Ok(())
}

fn from_entries_block(s: &mut BlockScope) -> Result<(), RecordError> {
    let rec = s.heap.from_entries([("a", 1), ("b", 2), ("c", 3)]);
    s.show_record("From entries:", rec);
    let dup = s.heap.from_entries([("a", 1), ("b", 2), ("a", 3)]);
    s.show_record("Repeated key (last write wins, moves last):", dup);
    Ok(())
}

fn freeze_block(s: &mut BlockScope) -> Result<(), RecordError> {
    let frozen = xy(&mut s.heap);
    s.show_record("Before freeze:", frozen);
    s.heap.freeze(frozen)?;
    s.say("Is frozen:", s.heap.is_frozen(frozen)?);
    let write = s.heap.set_property(frozen, key("x"), Value::from(10));
    s.attempt("Writing x = 10:", write);
    s.show_record("After attempted modification:", frozen);
    Ok(())
}

fn get_own_property_descriptor_block(s: &mut BlockScope) -> Result<(), RecordError> {
    let rec = read_only_record(&mut s.heap)?;
    let shown = match s.heap.get_own_property_descriptor(rec, &key("readOnly"))? {
        Some(desc) => s.renderer().descriptor(&desc),
        None => "undefined".to_string(),
    };
    s.say("Property descriptor:", shown);
    let missing = s.heap.get_own_property_descriptor(rec, &key("toString"))?;
    s.say(
        "Inherited toString descriptor:",
        if missing.is_some() { "present" } else { "undefined" },
    );
    Ok(())
}

fn get_own_property_descriptors_block(s: &mut BlockScope) -> Result<(), RecordError> {
    let rec = two_prop_record(&mut s.heap)?;
    let descs = s.heap.get_own_property_descriptors(rec)?;
    let shown = s.renderer().descriptors(&descs);
    s.say("All property descriptors:", shown);
    Ok(())
}

fn get_own_property_names_block(s: &mut BlockScope) -> Result<(), RecordError> {
    let rec = two_prop_record(&mut s.heap)?;
    let names = s.heap.get_own_property_names(rec)?;
    let shown = s.renderer().string_list(&names);
    s.say("All property names:", shown);
    Ok(())
}

fn get_own_property_symbols_block(s: &mut BlockScope) -> Result<(), RecordError> {
    let sym1 = s.heap.alloc_symbol(Some("symbol1"));
    let _sym2 = s.heap.alloc_symbol(Some("symbol2"));
    let rec = s.heap.literal([
        (PropertyKey::Symbol(sym1), Value::str("symbol value")),
        (key("regular"), Value::str("regular value")),
    ]);
    s.show_record("Record with symbols:", rec);
    let symbols = s.heap.get_own_property_symbols(rec)?;
    let shown = s.renderer().symbol_list(&symbols);
    s.say("Symbol properties:", shown);
    let keys = s.heap.keys(rec)?;
    let shown = s.renderer().string_list(&keys);
    s.say("Regular keys (no symbols):", shown);
    Ok(())
}

fn get_prototype_of_block(s: &mut BlockScope) -> Result<(), RecordError> {
    let proto = person_proto(&mut s.heap);
    let john = john(&mut s.heap, proto)?;
    let found = s.heap.get_prototype_of(john)?;
    let shown = found.map_or(Value::Null, Value::Record);
    s.show("John's prototype:", &shown);
    s.say("Prototype is personProto:", found == Some(proto));
    Ok(())
}

fn set_prototype_of_block(s: &mut BlockScope) -> Result<(), RecordError> {
    let sound = s.heap.register_function("makeSound", make_sound);
    let animal = s.heap.literal([("makeSound", Value::Function(sound))]);
    let dog = s.heap.literal([("name", "Rex")]);
    s.heap.set_prototype_of(dog, Some(animal))?;
    s.show_record("Dog after setting prototype:", dog);
    let made = s.heap.call_method(dog, &key("makeSound"), &[])?;
    s.show("Dog can make sound:", &made);
    let cycle = s.heap.set_prototype_of(animal, Some(dog));
    s.attempt("Linking animal back to dog:", cycle);
    Ok(())
}

fn has_own_block(s: &mut BlockScope) -> Result<(), RecordError> {
    let user = user(&mut s.heap);
    s.say("user has own name:", s.heap.has_own(user, &key("name"))?);
    s.say("user has own toString:", s.heap.has_own(user, &key("toString"))?);
    s.say(
        "toString reachable through prototype:",
        s.heap.has_property(user, &key("toString"))?,
    );
    Ok(())
}

fn is_block(s: &mut BlockScope) -> Result<(), RecordError> {
    let nan = Value::Number(f64::NAN);
    let pos = Value::Number(0.0);
    let neg = Value::Number(-0.0);
    s.say("is(NaN, NaN):", RecordHeap::identity(&nan, &nan));
    s.say("NaN === NaN:", nan.strict_equals(&nan));
    s.say("is(+0, -0):", RecordHeap::identity(&pos, &neg));
    s.say("+0 === -0:", pos.strict_equals(&neg));
    Ok(())
}

fn is_extensible_block(s: &mut BlockScope) -> Result<(), RecordError> {
    let rec = s.heap.literal([("a", 1)]);
    s.say("Is extensible:", s.heap.is_extensible(rec)?);
    s.heap.prevent_extensions(rec)?;
    s.say("After preventExtensions:", s.heap.is_extensible(rec)?);
    Ok(())
}

fn is_frozen_block(s: &mut BlockScope) -> Result<(), RecordError> {
    let frozen = xy(&mut s.heap);
    s.heap.freeze(frozen)?;
    let user = user(&mut s.heap);
    s.say("Is frozen record frozen:", s.heap.is_frozen(frozen)?);
    s.say("Is regular record frozen:", s.heap.is_frozen(user)?);
    Ok(())
}

fn is_sealed_block(s: &mut BlockScope) -> Result<(), RecordError> {
    let sealed = xy(&mut s.heap);
    s.heap.seal(sealed)?;
    let user = user(&mut s.heap);
    s.say("Is sealed record sealed:", s.heap.is_sealed(sealed)?);
    s.say("Is regular record sealed:", s.heap.is_sealed(user)?);
    s.say("Integrity level:", s.heap.integrity_level(sealed)?.as_str());
    Ok(())
}

fn keys_block(s: &mut BlockScope) -> Result<(), RecordError> {
    let user = user(&mut s.heap);
    let keys = s.heap.keys(user)?;
    let shown = s.renderer().string_list(&keys);
    s.say("User keys:", shown);
    Ok(())
}

fn prevent_extensions_block(s: &mut BlockScope) -> Result<(), RecordError> {
    let rec = s.heap.literal([("existing", "value")]);
    s.heap.prevent_extensions(rec)?;
    s.say(
        "Extensible after preventExtensions:",
        s.heap.is_extensible(rec)?,
    );
    let add = s.heap.set_property(rec, key("newProp"), Value::str("new"));
    s.attempt("Adding newProp:", add);
    s.heap
        .set_property(rec, key("existing"), Value::str("updated"))?;
    s.show_record("Existing property still writable:", rec);
    Ok(())
}

fn seal_block(s: &mut BlockScope) -> Result<(), RecordError> {
    let rec = xy(&mut s.heap);
    s.heap.seal(rec)?;
    s.say("Is sealed:", s.heap.is_sealed(rec)?);
    s.heap.set_property(rec, key("x"), Value::from(10))?;
    s.show_record("After modifying sealed record:", rec);
    let delete = s.heap.delete_property(rec, &key("x"));
    s.attempt("Deleting x:", delete);
    let add = s.heap.set_property(rec, key("z"), Value::from(3));
    s.attempt("Adding z:", add);
    Ok(())
}

fn values_block(s: &mut BlockScope) -> Result<(), RecordError> {
    let user = user(&mut s.heap);
    let values = s.heap.values(user)?;
    let shown = s.renderer().list(&values);
    s.say("User values:", shown);
    Ok(())
}
