//! Integration tests for the record statics through the public heap API.
//!
//! Focus areas:
//! - Bulk copy, construction and reconstruction scenarios
//! - Integrity lattice transitions and their predicates
//! - Enumeration filters (symbols, non-enumerable keys)
//! - Own vs inherited membership
//! - Identity comparison on numbers
//! - Descriptor validation and strict failure reporting

use object_statics::{
    DescriptorInit, IntegrityLevel, PropertyDescriptor, PropertyKey, RecordError, RecordHandle,
    RecordHeap, Value,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn str_key(s: &str) -> PropertyKey {
    PropertyKey::String(s.to_string())
}

fn num(n: i32) -> Value {
    Value::from(n)
}

fn get(heap: &mut RecordHeap, rec: RecordHandle, key: &str) -> Value {
    heap.get_property(rec, &str_key(key))
        .expect("property read should succeed")
}

fn descriptors(heap: &RecordHeap, rec: RecordHandle) -> Vec<(PropertyKey, PropertyDescriptor)> {
    heap.get_own_property_descriptors(rec)
        .expect("record should exist")
}

// ===========================================================================
// 1. Bulk copy
// ===========================================================================

#[test]
fn assign_copies_sources_in_order_and_returns_target() {
    let mut heap = RecordHeap::new();
    let target = heap.literal([("a", 1)]);
    let s1 = heap.literal([("b", 2), ("c", 3)]);
    let s2 = heap.literal([("d", 4)]);

    let result = heap.assign(target, &[s1, s2]).unwrap();

    assert_eq!(result, target);
    assert_eq!(heap.keys(target).unwrap(), vec!["a", "b", "c", "d"]);
    assert_eq!(
        heap.values(target).unwrap(),
        vec![num(1), num(2), num(3), num(4)]
    );
}

#[test]
fn assign_last_source_wins_and_keeps_existing_position() {
    let mut heap = RecordHeap::new();
    let target = heap.literal([("a", 0), ("z", 0)]);
    let s1 = heap.literal([("a", 1), ("b", 1)]);
    let s2 = heap.literal([("b", 2), ("a", 2)]);

    heap.assign(target, &[s1, s2]).unwrap();

    assert_eq!(heap.keys(target).unwrap(), vec!["a", "z", "b"]);
    assert_eq!(get(&mut heap, target, "a"), num(2));
    assert_eq!(get(&mut heap, target, "b"), num(2));
}

#[test]
fn assign_skips_non_enumerable_but_copies_symbols() {
    let mut heap = RecordHeap::new();
    let sym = heap.alloc_symbol(Some("tag"));
    let source = heap.literal([(PropertyKey::Symbol(sym), num(7)), (str_key("shown"), num(1))]);
    heap.define_property(source, str_key("hidden"), &DescriptorInit::new().with_value(9))
        .unwrap();
    let target = heap.literal(Vec::<(&str, Value)>::new());

    heap.assign(target, &[source]).unwrap();

    assert!(heap.has_own(target, &str_key("shown")).unwrap());
    assert!(!heap.has_own(target, &str_key("hidden")).unwrap());
    assert!(heap.has_own(target, &PropertyKey::Symbol(sym)).unwrap());
}

#[test]
fn assign_into_frozen_target_fails() {
    let mut heap = RecordHeap::new();
    let target = heap.literal([("a", 1)]);
    let source = heap.literal([("a", 2)]);
    heap.freeze(target).unwrap();

    let err = heap.assign(target, &[source]).unwrap_err();
    assert_eq!(err.code(), "OS-1002");
    assert_eq!(get(&mut heap, target, "a"), num(1));
}

// ===========================================================================
// 2. Construction with explicit prototype
// ===========================================================================

#[test]
fn create_with_null_prototype_has_no_inherited_members() {
    let mut heap = RecordHeap::new();
    let rec = heap.create(None, None).unwrap();
    assert_eq!(heap.get_prototype_of(rec).unwrap(), None);
    assert!(!heap.has_property(rec, &str_key("toString")).unwrap());
}

#[test]
fn create_applies_descriptor_defaults() {
    let mut heap = RecordHeap::new();
    let proto = heap.literal([("kind", "base")]);
    let rec = heap
        .create(
            Some(proto),
            Some(vec![(str_key("name"), DescriptorInit::new().with_value("John"))]),
        )
        .unwrap();

    let desc = heap
        .get_own_property_descriptor(rec, &str_key("name"))
        .unwrap()
        .unwrap();
    assert!(!desc.is_writable());
    assert!(!desc.is_enumerable());
    assert!(!desc.is_configurable());
    assert!(heap.keys(rec).unwrap().is_empty());
    assert_eq!(get(&mut heap, rec, "kind"), Value::str("base"));
}

#[test]
fn create_with_unknown_prototype_fails() {
    let mut heap = RecordHeap::new();
    let before = heap.len();
    let err = heap.create(Some(RecordHandle(999)), None).unwrap_err();
    assert_eq!(err, RecordError::RecordNotFound(RecordHandle(999)));
    assert_eq!(heap.len(), before);
}

// ===========================================================================
// 3. Descriptor definition
// ===========================================================================

#[test]
fn define_property_rejects_mixed_descriptor() {
    let mut heap = RecordHeap::new();
    let rec = heap.alloc_plain();
    let err = heap
        .define_property(
            rec,
            str_key("x"),
            &DescriptorInit::new()
                .with_value(1)
                .with_getter(Value::Undefined),
        )
        .unwrap_err();
    assert_eq!(err.code(), "OS-1001");
    assert!(!heap.has_own(rec, &str_key("x")).unwrap());
}

#[test]
fn define_properties_is_all_or_nothing_on_validation() {
    let mut heap = RecordHeap::new();
    let rec = heap.alloc_plain();
    let err = heap
        .define_properties(
            rec,
            vec![
                (str_key("ok"), DescriptorInit::new().with_value(1)),
                (str_key("bad"), DescriptorInit::new().with_getter(num(3))),
            ],
        )
        .unwrap_err();
    assert!(matches!(err, RecordError::InvalidDescriptor { .. }));
    assert!(err.to_string().contains("`bad`"));
    assert!(heap.own_keys(rec).unwrap().is_empty());
}

#[test]
fn read_only_property_rejects_writes() {
    let mut heap = RecordHeap::new();
    let rec = heap.literal(Vec::<(&str, Value)>::new());
    heap.define_property(
        rec,
        str_key("readOnly"),
        &DescriptorInit::new().with_value(42).with_enumerable(true),
    )
    .unwrap();

    let err = heap
        .set_property(rec, str_key("readOnly"), num(100))
        .unwrap_err();
    assert!(matches!(err, RecordError::ImmutableViolation { .. }));
    assert_eq!(get(&mut heap, rec, "readOnly"), num(42));
}

#[test]
fn configurable_property_can_switch_to_accessor() {
    fn answer(_: &mut RecordHeap, _: RecordHandle, _: &[Value]) -> Result<Value, RecordError> {
        Ok(Value::from(42))
    }

    let mut heap = RecordHeap::new();
    let rec = heap.literal([("x", 1)]);
    let getter = heap.register_function("answer", answer);
    heap.define_property(
        rec,
        str_key("x"),
        &DescriptorInit::new().with_getter(Value::Function(getter)),
    )
    .unwrap();

    let desc = heap
        .get_own_property_descriptor(rec, &str_key("x"))
        .unwrap()
        .unwrap();
    assert!(desc.is_accessor());
    assert!(desc.is_enumerable());
    assert_eq!(get(&mut heap, rec, "x"), num(42));
    assert_eq!(heap.entries(rec).unwrap(), vec![("x".to_string(), num(42))]);
}

// ===========================================================================
// 4. Enumeration
// ===========================================================================

#[test]
fn enumeration_excludes_symbols_and_non_enumerable() {
    let mut heap = RecordHeap::new();
    let sym = heap.alloc_symbol(Some("s"));
    let rec = heap.literal([(str_key("a"), num(1)), (PropertyKey::Symbol(sym), num(2))]);
    heap.define_property(rec, str_key("h"), &DescriptorInit::new().with_value(3))
        .unwrap();

    assert_eq!(heap.keys(rec).unwrap(), vec!["a"]);
    assert_eq!(heap.values(rec).unwrap(), vec![num(1)]);
    assert_eq!(heap.entries(rec).unwrap(), vec![("a".to_string(), num(1))]);
    assert_eq!(heap.get_own_property_names(rec).unwrap(), vec!["a", "h"]);
    assert_eq!(heap.get_own_property_symbols(rec).unwrap(), vec![sym]);
}

fn delete_b(heap: &mut RecordHeap, this: RecordHandle, _: &[Value]) -> Result<Value, RecordError> {
    heap.delete_property(this, &str_key("b"))?;
    Ok(num(0))
}

fn hide_b(heap: &mut RecordHeap, this: RecordHandle, _: &[Value]) -> Result<Value, RecordError> {
    heap.define_property(this, str_key("b"), &DescriptorInit::new().with_enumerable(false))?;
    Ok(num(0))
}

/// `{ a: <getter running body>, b: 2, c: 3 }`
fn record_with_getter_on_a(
    heap: &mut RecordHeap,
    name: &str,
    body: object_statics::NativeFn,
) -> RecordHandle {
    let getter = heap.register_function(name, body);
    let rec = heap.literal(Vec::<(&str, Value)>::new());
    heap.define_property(
        rec,
        str_key("a"),
        &DescriptorInit::new()
            .with_getter(Value::Function(getter))
            .with_enumerable(true)
            .with_configurable(true),
    )
    .unwrap();
    heap.set_property(rec, str_key("b"), num(2)).unwrap();
    heap.set_property(rec, str_key("c"), num(3)).unwrap();
    rec
}

#[test]
fn entries_skip_key_deleted_by_earlier_getter() {
    let mut heap = RecordHeap::new();
    let rec = record_with_getter_on_a(&mut heap, "deleteB", delete_b);
    assert_eq!(
        heap.entries(rec).unwrap(),
        vec![("a".to_string(), num(0)), ("c".to_string(), num(3))]
    );
    assert!(!heap.has_own(rec, &str_key("b")).unwrap());
}

#[test]
fn values_skip_key_hidden_by_earlier_getter() {
    let mut heap = RecordHeap::new();
    let rec = record_with_getter_on_a(&mut heap, "hideB", hide_b);
    assert_eq!(heap.values(rec).unwrap(), vec![num(0), num(3)]);
    assert!(heap.has_own(rec, &str_key("b")).unwrap());
    assert_eq!(heap.keys(rec).unwrap(), vec!["a", "c"]);
}

#[test]
fn integer_like_keys_enumerate_first_in_ascending_order() {
    let mut heap = RecordHeap::new();
    let rec = heap.literal([("b", 1), ("10", 2), ("a", 3), ("2", 4), ("-1", 5)]);
    assert_eq!(heap.keys(rec).unwrap(), vec!["2", "10", "b", "a", "-1"]);
}

#[test]
fn errors_name_symbol_keys_by_description() {
    let mut heap = RecordHeap::new();
    let tag = heap.alloc_symbol(Some("tag"));
    let rec = heap.literal([(PropertyKey::Symbol(tag), num(1))]);
    heap.freeze(rec).unwrap();

    let set = heap
        .set_property(rec, PropertyKey::Symbol(tag), num(2))
        .unwrap_err();
    assert_eq!(
        set.to_string(),
        "ImmutableViolation: cannot set `Symbol(tag)`: property is not writable"
    );
    let delete = heap
        .delete_property(rec, &PropertyKey::Symbol(tag))
        .unwrap_err();
    assert!(delete.to_string().contains("`Symbol(tag)`"));

    let invalid = heap
        .create(
            None,
            Some(vec![(
                PropertyKey::Symbol(tag),
                DescriptorInit::new().with_setter(num(3)),
            )]),
        )
        .unwrap_err();
    assert!(invalid.to_string().contains("`Symbol(tag)`:"));
}

// ===========================================================================
// 5. Reconstruction from pairs
// ===========================================================================

#[test]
fn from_entries_builds_enumerable_record() {
    let mut heap = RecordHeap::new();
    let rec = heap.from_entries([("a", 1), ("b", 2), ("c", 3)]);
    assert_eq!(
        heap.entries(rec).unwrap(),
        vec![
            ("a".to_string(), num(1)),
            ("b".to_string(), num(2)),
            ("c".to_string(), num(3)),
        ]
    );
    assert_eq!(heap.get_prototype_of(rec).unwrap(), Some(heap.object_prototype()));
}

#[test]
fn from_entries_record_inherits_object_prototype_members() {
    let mut heap = RecordHeap::new();
    let rec = heap.from_entries([("a", 1)]);
    assert_eq!(heap.get_prototype_of(rec).unwrap(), Some(heap.object_prototype()));
    assert!(heap.has_property(rec, &str_key("toString")).unwrap());
    assert!(!heap.has_own(rec, &str_key("toString")).unwrap());
    assert_eq!(
        heap.call_method(rec, &str_key("toString"), &[]).unwrap(),
        Value::str("[object Object]")
    );
}

#[test]
fn from_entries_duplicate_key_takes_last_value_and_position() {
    let mut heap = RecordHeap::new();
    let rec = heap.from_entries([("a", 1), ("b", 2), ("a", 3)]);
    assert_eq!(
        heap.entries(rec).unwrap(),
        vec![("b".to_string(), num(2)), ("a".to_string(), num(3))]
    );
}

#[test]
fn entries_round_trip_through_from_entries() {
    let mut heap = RecordHeap::new();
    let user = heap.literal([("name", Value::str("Alice")), ("age", num(30))]);
    let pairs = heap.entries(user).unwrap();
    let copy = heap.from_entries(pairs.clone());
    assert_ne!(copy, user);
    assert_eq!(heap.entries(copy).unwrap(), pairs);
}

// ===========================================================================
// 6. Integrity lattice
// ===========================================================================

#[test]
fn freeze_is_idempotent() {
    let mut heap = RecordHeap::new();
    let rec = heap.literal([("x", 1), ("y", 2)]);

    heap.freeze(rec).unwrap();
    let once = descriptors(&heap, rec);
    heap.freeze(rec).unwrap();

    assert_eq!(descriptors(&heap, rec), once);
    assert!(!heap.is_extensible(rec).unwrap());
    assert!(heap.is_frozen(rec).unwrap());
    for (_, desc) in once {
        assert!(!desc.is_writable());
        assert!(!desc.is_configurable());
    }
}

#[test]
fn sealed_record_scenario() {
    let mut heap = RecordHeap::new();
    let rec = heap.literal([("x", 1), ("y", 2)]);
    heap.seal(rec).unwrap();

    heap.set_property(rec, str_key("x"), num(10)).unwrap();
    assert_eq!(get(&mut heap, rec, "x"), num(10));

    let add = heap.set_property(rec, str_key("z"), num(3)).unwrap_err();
    assert!(matches!(add, RecordError::ImmutableViolation { .. }));
    let delete = heap.delete_property(rec, &str_key("x")).unwrap_err();
    assert!(matches!(delete, RecordError::ImmutableViolation { .. }));

    assert!(heap.is_sealed(rec).unwrap());
    assert!(!heap.is_frozen(rec).unwrap());
    assert_eq!(heap.keys(rec).unwrap(), vec!["x", "y"]);
}

#[test]
fn prevent_extensions_keeps_existing_mutable() {
    let mut heap = RecordHeap::new();
    let rec = heap.literal([("existing", "value")]);
    heap.prevent_extensions(rec).unwrap();

    assert!(heap.set_property(rec, str_key("newProp"), num(1)).is_err());
    heap.set_property(rec, str_key("existing"), Value::str("updated"))
        .unwrap();
    heap.delete_property(rec, &str_key("existing")).unwrap();
    assert_eq!(
        heap.integrity_level(rec).unwrap(),
        IntegrityLevel::Frozen,
        "an empty non-extensible record is vacuously frozen"
    );
}

#[test]
fn integrity_levels_only_tighten() {
    let mut heap = RecordHeap::new();
    let rec = heap.literal([("x", 1)]);
    assert_eq!(heap.integrity_level(rec).unwrap(), IntegrityLevel::Extensible);
    heap.prevent_extensions(rec).unwrap();
    assert_eq!(heap.integrity_level(rec).unwrap(), IntegrityLevel::NonExtensible);
    heap.seal(rec).unwrap();
    assert_eq!(heap.integrity_level(rec).unwrap(), IntegrityLevel::Sealed);
    heap.freeze(rec).unwrap();
    assert_eq!(heap.integrity_level(rec).unwrap(), IntegrityLevel::Frozen);
    heap.seal(rec).unwrap();
    assert_eq!(heap.integrity_level(rec).unwrap(), IntegrityLevel::Frozen);
}

// ===========================================================================
// 7. Prototype access
// ===========================================================================

#[test]
fn set_prototype_of_rejects_cycle_and_non_extensible() {
    let mut heap = RecordHeap::new();
    let animal = heap.literal([("legs", 4)]);
    let dog = heap.literal([("name", "Rex")]);

    heap.set_prototype_of(dog, Some(animal)).unwrap();
    assert_eq!(get(&mut heap, dog, "legs"), num(4));

    let cycle = heap.set_prototype_of(animal, Some(dog)).unwrap_err();
    assert_eq!(cycle, RecordError::PrototypeCycle { record: animal });

    heap.prevent_extensions(dog).unwrap();
    heap.set_prototype_of(dog, Some(animal)).unwrap();
    let err = heap.set_prototype_of(dog, None).unwrap_err();
    assert_eq!(err.code(), "OS-1002");
}

// ===========================================================================
// 8. Membership and identity
// ===========================================================================

#[test]
fn has_own_ignores_prototype_chain() {
    let mut heap = RecordHeap::new();
    let proto = heap.literal([("inherited", 1)]);
    let rec = heap.create(Some(proto), None).unwrap();
    heap.set_property(rec, str_key("own"), num(2)).unwrap();

    assert!(heap.has_own(rec, &str_key("own")).unwrap());
    assert!(!heap.has_own(rec, &str_key("inherited")).unwrap());
    assert!(heap.has_property(rec, &str_key("inherited")).unwrap());
}

#[test]
fn identity_distinguishes_zeros_and_equates_nan() {
    let nan = Value::Number(f64::NAN);
    let other_nan = Value::Number(f64::from_bits(0x7ff8_0000_0000_0001));
    assert!(RecordHeap::identity(&nan, &other_nan));
    assert!(!nan.strict_equals(&nan));
    assert!(!RecordHeap::identity(&Value::Number(0.0), &Value::Number(-0.0)));
    assert!(Value::Number(0.0).strict_equals(&Value::Number(-0.0)));
}

#[test]
fn identity_matches_equality_elsewhere() {
    let mut heap = RecordHeap::new();
    let a = heap.alloc_plain();
    let b = heap.alloc_plain();
    let pairs = [
        (num(1), num(1)),
        (num(1), num(2)),
        (Value::str("x"), Value::str("x")),
        (Value::Null, Value::Undefined),
        (Value::Record(a), Value::Record(a)),
        (Value::Record(a), Value::Record(b)),
        (Value::Bool(true), Value::Bool(true)),
    ];
    for (x, y) in pairs {
        assert_eq!(RecordHeap::identity(&x, &y), x.strict_equals(&y), "{x} vs {y}");
    }
}
