use indexmap::IndexMap;
use rheo_runtime::{
    make_array_ref, set_element, tags, Context, NativeVars, NumberFormat, StdJsonStore, Unit,
    Value, ValueSlot,
};
use std::cell::RefCell;
use std::rc::Rc;

struct MockNativeVars;

impl NativeVars for MockNativeVars {
    fn get(&self, id: i32) -> Value {
        Value::Int32(id * 10)
    }
}

#[test]
fn scalar_comparison_is_reflexive() {
    let ctx = Context::new();
    let values = [
        Value::Undefined,
        Value::Null,
        Value::Boolean(true),
        Value::Int8(-5),
        Value::Uint8(200),
        Value::Int16(-3000),
        Value::Uint16(60000),
        Value::Int32(123456),
        Value::Uint32(4000000000),
        Value::Int64(-1 << 40),
        Value::Uint64(1 << 60),
        Value::float_with_unit(1.5, Unit::Volt),
        Value::double_with_unit(2.5, Unit::Ampere),
        Value::Str("abc"),
        Value::StrAsset("asset"),
        Value::Stream(7),
        Value::Date(1234.5),
        Value::Json(3),
        Value::VersionedStr {
            version: 2,
            text: "v",
        },
        Value::FlowOutput(4),
        Value::range(1, 9),
        Value::Pointer(0xdead),
        Value::enum_def(2, 1),
        Value::IpAddress(0x0100007f),
        Value::TimeZone(530),
        Value::FunctionPointer(77),
    ];
    for v in values {
        assert!(v.compare(&v.clone(), &ctx), "{v:?}");
    }
}

#[test]
fn error_values_never_compare_equal() {
    let ctx = Context::new();
    assert!(!Value::Error.compare(&Value::Error, &ctx));
    assert!(!Value::Error.compare(&Value::Int32(0), &ctx));
    assert!(!Value::Int32(0).compare(&Value::Error, &ctx));
}

#[test]
fn scalar_widths_do_not_coerce() {
    let ctx = Context::new();
    assert!(!Value::Int8(1).compare(&Value::Int16(1), &ctx));
    assert!(!Value::Int32(1).compare(&Value::Uint32(1), &ctx));
    assert!(!Value::Int32(1).compare(&Value::Int64(1), &ctx));
    assert!(!Value::Boolean(true).compare(&Value::Int32(1), &ctx));
}

#[test]
fn float_equality_is_the_unit_value_format_triple() {
    let ctx = Context::new();
    let volts = Value::float_with_unit(1.0, Unit::Volt);
    assert!(volts.compare(&Value::float_with_unit(1.0, Unit::Volt), &ctx));
    assert!(!volts.compare(&Value::float_with_unit(1.0, Unit::MilliVolt), &ctx));

    let fixed = Value::float_with_format(1.0, Unit::Volt, NumberFormat::fixed(2));
    assert!(!volts.compare(&fixed, &ctx));

    let nan = Value::float(f32::NAN);
    assert!(!nan.compare(&nan.clone(), &ctx));
}

#[test]
fn string_equality_is_content_based_across_kinds() {
    let ctx = Context::new();
    let literal = Value::Str("abc");
    let counted = Value::make_string_ref(&ctx, "abc", tags::STRING_REF);
    let asset = Value::StrAsset("abc");
    assert!(literal.compare(&counted, &ctx));
    assert!(counted.compare(&asset, &ctx));
    assert!(!literal.compare(&Value::Str("abd"), &ctx));

    let concat = Value::concatenate_strings(
        &ctx,
        &Value::Str("ab"),
        &Value::Str("c"),
        tags::STRING_CONCAT,
    );
    assert!(concat.compare(&literal, &ctx));
}

#[test]
fn array_equality_is_identity_based() {
    let ctx = Context::new();
    let a = make_array_ref(&ctx, 2, rheo_runtime::ValueKind::Int32, tags::ARRAY_REF);
    set_element(&a, 0, Value::Int32(1));
    set_element(&a, 1, Value::Int32(2));
    let b = make_array_ref(&ctx, 2, rheo_runtime::ValueKind::Int32, tags::ARRAY_REF);
    set_element(&b, 0, Value::Int32(1));
    set_element(&b, 1, Value::Int32(2));

    // Structurally identical but distinct storage.
    assert!(!a.compare(&b, &ctx));
    // A copy shares the storage.
    assert!(a.compare(&a.clone(), &ctx));
}

#[test]
fn versioned_strings_compare_by_version_only() {
    let ctx = Context::new();
    let v1a = Value::VersionedStr {
        version: 1,
        text: "a",
    };
    let v1b = Value::VersionedStr {
        version: 1,
        text: "b",
    };
    let v2a = Value::VersionedStr {
        version: 2,
        text: "a",
    };
    assert!(v1a.compare(&v1b, &ctx));
    assert!(!v1a.compare(&v2a, &ctx));
}

#[test]
fn value_pointer_resolves_before_comparison() {
    let ctx = Context::new();
    let slot: ValueSlot = Rc::new(RefCell::new(Value::Int32(3)));
    let ptr = Value::value_ptr(Rc::clone(&slot));
    assert!(ptr.compare(&Value::Int32(3), &ctx));
    assert_eq!(ptr.type_name(&ctx), "int32");

    *slot.borrow_mut() = Value::Str("now a string");
    assert_eq!(ptr.type_name(&ctx), "string");
}

#[test]
fn cyclic_value_pointers_resolve_to_undefined() {
    let ctx = Context::new();
    let slot: ValueSlot = Rc::new(RefCell::new(Value::Undefined));
    *slot.borrow_mut() = Value::value_ptr(Rc::clone(&slot));
    let ptr = Value::value_ptr(slot);
    assert!(matches!(ptr.resolve(&ctx), Value::Undefined));
}

#[test]
fn array_element_ref_denotes_the_element() {
    let ctx = Context::new();
    let array = make_array_ref(&ctx, 2, rheo_runtime::ValueKind::Int32, tags::ARRAY_REF);
    set_element(&array, 0, Value::Int32(5));
    set_element(&array, 1, Value::Int32(6));

    let element = Value::make_array_element_ref(&ctx, array.clone(), 0);
    assert!(element.compare(&Value::Int32(5), &ctx));
    assert_eq!(element.type_name(&ctx), "int32");

    // The reference tracks later writes; it does not copy.
    set_element(&array, 0, Value::Int32(50));
    assert!(element.compare(&Value::Int32(50), &ctx));

    let out_of_range = Value::make_array_element_ref(&ctx, array, 9);
    assert!(matches!(out_of_range.resolve(&ctx), Value::Undefined));
}

#[test]
fn json_member_ref_resolves_through_the_bridge() {
    let mut ctx = Context::new();
    let store = StdJsonStore::new();
    let mut members = IndexMap::new();
    members.insert("x".to_string(), Value::Int32(9));
    members.insert("name".to_string(), Value::Str("probe"));
    let doc = store.add_document(members);
    ctx.set_json_bridge(Box::new(store.clone()));

    let member = Value::make_json_member_ref(&ctx, Value::Json(doc), Value::Str("x"));
    assert!(member.compare(&Value::Int32(9), &ctx));
    assert_eq!(member.type_name(&ctx), "int32");

    let missing = Value::make_json_member_ref(&ctx, Value::Json(doc), Value::Str("absent"));
    assert!(matches!(missing.resolve(&ctx), Value::Undefined));

    assert_eq!(store.member_names(doc), ["x", "name"]);
}

#[test]
fn native_variables_are_inert_without_a_source() {
    let ctx = Context::new();
    let nv = Value::NativeVariable(4);
    assert!(!nv.compare(&nv.clone(), &ctx));
    assert!(!nv.compare(&Value::Int32(40), &ctx));
    assert_eq!(nv.to_text(&ctx), "");
    assert_eq!(nv.type_name(&ctx), "");
}

#[test]
fn native_variables_resolve_through_a_registered_source() {
    let mut ctx = Context::new();
    ctx.set_native_vars(Box::new(MockNativeVars));
    let nv = Value::NativeVariable(4);
    assert!(nv.compare(&Value::Int32(40), &ctx));
    assert_eq!(nv.to_text(&ctx), "40");
    assert_eq!(nv.type_name(&ctx), "int32");
}

#[test]
fn type_names() {
    let ctx = Context::new();
    assert_eq!(Value::Undefined.type_name(&ctx), "undefined");
    assert_eq!(Value::Null.type_name(&ctx), "null");
    assert_eq!(Value::Boolean(false).type_name(&ctx), "boolean");
    assert_eq!(Value::Int8(0).type_name(&ctx), "int8");
    assert_eq!(Value::Uint64(0).type_name(&ctx), "uint64");
    assert_eq!(Value::float(0.0).type_name(&ctx), "float");
    assert_eq!(Value::double(0.0).type_name(&ctx), "double");
    assert_eq!(Value::Str("").type_name(&ctx), "string");
    assert_eq!(
        Value::make_string_ref(&ctx, "", tags::STRING_REF).type_name(&ctx),
        "string"
    );
    assert_eq!(
        make_array_ref(&ctx, 0, rheo_runtime::ValueKind::Undefined, tags::ARRAY_REF)
            .type_name(&ctx),
        "array"
    );
    assert_eq!(Value::Stream(0).type_name(&ctx), "stream");
    assert_eq!(Value::Date(0.0).type_name(&ctx), "date");
    assert_eq!(Value::Json(0).type_name(&ctx), "json");
    assert_eq!(Value::Error.type_name(&ctx), "error");
    assert_eq!(Value::range(0, 1).type_name(&ctx), "internal");
    assert_eq!(Value::Pointer(0).type_name(&ctx), "internal");
    assert_eq!(Value::IpAddress(0).type_name(&ctx), "internal");
    assert_eq!(Value::TimeZone(0).type_name(&ctx), "internal");
    assert_eq!(Value::FunctionPointer(0).type_name(&ctx), "internal");
}
