use rheo_runtime::{
    assign_value, make_array_ref, tags, Context, JsonBridge, Unit, Value, ValueError, ValueKind,
};
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn string_parsing_tolerates_whitespace_only() {
    let ctx = Context::new();
    assert_eq!(Value::Str("42").to_int32(&ctx), Ok(42));
    assert_eq!(Value::Str("  42  ").to_int32(&ctx), Ok(42));
    assert_eq!(Value::Str("-7").to_int32(&ctx), Ok(-7));

    // Trailing non-whitespace is a failure; the best-effort default is 0.
    let err = Value::Str("42abc").to_int32(&ctx);
    assert_eq!(err, Err(ValueError::CoercionFailed));
    assert_eq!(err.unwrap_or(0), 0);
    assert_eq!(
        Value::Str("42 abc").to_int32(&ctx),
        Err(ValueError::CoercionFailed)
    );
    assert_eq!(
        Value::Str("42.5").to_int32(&ctx),
        Err(ValueError::CoercionFailed)
    );
}

#[test]
fn numeric_ladders_cover_every_scalar_source() {
    let ctx = Context::new();
    assert_eq!(Value::Boolean(true).to_int32(&ctx), Ok(1));
    assert_eq!(Value::Int8(-5).to_int32(&ctx), Ok(-5));
    assert_eq!(Value::Uint16(5000).to_int32(&ctx), Ok(5000));
    assert_eq!(Value::Int64(1 << 40).to_int64(&ctx), Ok(1 << 40));
    assert_eq!(Value::double(2.75).to_int32(&ctx), Ok(2));
    assert_eq!(Value::float(1.5).to_double(&ctx), Ok(1.5));
    assert_eq!(Value::Str("1.25").to_double(&ctx), Ok(1.25));
    assert_eq!(Value::Str("3e2").to_float(&ctx), Ok(300.0));

    // Dates convert to doubles, not to the narrower targets.
    assert_eq!(Value::Date(1234.5).to_double(&ctx), Ok(1234.5));
    assert_eq!(
        Value::Date(1234.5).to_float(&ctx),
        Err(ValueError::CoercionFailed)
    );
    assert_eq!(
        Value::Date(1234.5).to_int32(&ctx),
        Err(ValueError::CoercionFailed)
    );
}

#[test]
fn value_pointer_participates_in_every_ladder() {
    let ctx = Context::new();
    let slot = Rc::new(RefCell::new(Value::Int32(5)));
    let ptr = Value::value_ptr(slot);
    assert_eq!(ptr.to_int32(&ctx), Ok(5));
    assert_eq!(ptr.to_double(&ctx), Ok(5.0));
    assert_eq!(ptr.to_bool(&ctx), Ok(true));
}

#[test]
fn truthiness_rules() {
    let ctx = Context::new();
    assert_eq!(Value::Undefined.to_bool(&ctx), Ok(false));
    assert_eq!(Value::Null.to_bool(&ctx), Ok(false));
    assert_eq!(Value::Int32(0).to_bool(&ctx), Ok(false));
    assert_eq!(Value::Int32(-1).to_bool(&ctx), Ok(true));
    assert_eq!(Value::double(0.0).to_bool(&ctx), Ok(false));

    // Non-empty string is truthy, regardless of content.
    assert_eq!(Value::Str("0").to_bool(&ctx), Ok(true));
    assert_eq!(Value::Str("").to_bool(&ctx), Ok(false));

    let blob = Value::make_blob_ref(&ctx, &[], tags::BLOB_REF);
    assert_eq!(blob.to_bool(&ctx), Ok(false));
    let blob = Value::make_blob_ref(&ctx, &[1], tags::BLOB_REF);
    assert_eq!(blob.to_bool(&ctx), Ok(true));

    let empty = make_array_ref(&ctx, 0, ValueKind::Int32, tags::ARRAY_REF);
    assert_eq!(empty.to_bool(&ctx), Ok(false));
    let full = make_array_ref(&ctx, 1, ValueKind::Int32, tags::ARRAY_REF);
    assert_eq!(full.to_bool(&ctx), Ok(true));

    assert_eq!(Value::Json(0).to_bool(&ctx), Ok(false));
    assert_eq!(Value::Json(3).to_bool(&ctx), Ok(true));

    // No defined truthiness: failure, defaulting to false.
    let err = Value::Stream(1).to_bool(&ctx);
    assert_eq!(err, Err(ValueError::CoercionFailed));
    assert!(!err.unwrap_or(false));
}

#[test]
fn to_string_value_renders_scalars_and_passes_strings_through() {
    let ctx = Context::new();
    let s = Value::Int32(42).to_string_value(&ctx, tags::TO_STRING);
    assert_eq!(s.kind(), ValueKind::StrRef);
    assert!(s.compare(&Value::Str("42"), &ctx));

    let roundtrip = Value::Str("already text").to_string_value(&ctx, tags::TO_STRING);
    assert_eq!(roundtrip.kind(), ValueKind::Str);

    let f = Value::double(1.5).to_string_value(&ctx, tags::TO_STRING);
    assert!(f.compare(&Value::Str("1.5"), &ctx));
}

#[test]
fn assign_into_boolean_uses_truthiness() {
    let ctx = Context::new();

    let mut dst = Value::Undefined;
    assign_value(&ctx, &mut dst, &Value::Int32(7), ValueKind::Boolean);
    assert!(matches!(dst, Value::Boolean(true)));

    // "0" is a non-empty string, so it is true under the string rule.
    assign_value(&ctx, &mut dst, &Value::Str("0"), ValueKind::Boolean);
    assert!(matches!(dst, Value::Boolean(true)));

    assign_value(&ctx, &mut dst, &Value::Str(""), ValueKind::Boolean);
    assert!(matches!(dst, Value::Boolean(false)));
}

#[test]
fn assign_narrows_and_widens_integers() {
    let ctx = Context::new();
    let mut dst = Value::Undefined;
    assign_value(&ctx, &mut dst, &Value::Int32(300), ValueKind::Int8);
    assert!(matches!(dst, Value::Int8(44)));

    assign_value(&ctx, &mut dst, &Value::Str("250"), ValueKind::Uint8);
    assert!(matches!(dst, Value::Uint8(250)));

    assign_value(&ctx, &mut dst, &Value::Boolean(true), ValueKind::Int32);
    assert!(matches!(dst, Value::Int32(1)));
}

#[test]
fn assign_fallback_keeps_the_destination_unit() {
    let ctx = Context::new();
    let mut dst = Value::float_with_unit(1.0, Unit::Volt);
    // An unnamed destination kind falls back to the destination's own kind.
    assign_value(&ctx, &mut dst, &Value::Int32(2), ValueKind::Undefined);
    match dst {
        Value::Float { value, unit, .. } => {
            assert_eq!(value, 2.0);
            assert_eq!(unit, Unit::Volt);
        }
        other => panic!("expected a float, got {other:?}"),
    }
}

#[test]
fn assign_with_no_matching_rule_copies_plainly() {
    let ctx = Context::new();
    let mut dst = Value::Stream(1);
    assign_value(&ctx, &mut dst, &Value::Stream(9), ValueKind::Undefined);
    assert!(matches!(dst, Value::Stream(9)));
}

struct RecordingBridge {
    to_json_calls: Rc<RefCell<u32>>,
    from_json_calls: Rc<RefCell<u32>>,
}

impl JsonBridge for RecordingBridge {
    fn member(&self, _doc: i32, _name: &str) -> Value {
        Value::Undefined
    }

    fn to_json(&self, _value: &Value) -> Value {
        *self.to_json_calls.borrow_mut() += 1;
        Value::Json(77)
    }

    fn from_json(&self, doc: i32, kind: ValueKind) -> Value {
        *self.from_json_calls.borrow_mut() += 1;
        match kind {
            ValueKind::Int32 => Value::Int32(doc),
            _ => Value::Undefined,
        }
    }
}

#[test]
fn assign_bridges_json_both_ways() {
    let to_json_calls = Rc::new(RefCell::new(0));
    let from_json_calls = Rc::new(RefCell::new(0));
    let mut ctx = Context::new();
    ctx.set_json_bridge(Box::new(RecordingBridge {
        to_json_calls: Rc::clone(&to_json_calls),
        from_json_calls: Rc::clone(&from_json_calls),
    }));

    // Non-json source into a json destination converts through the bridge.
    let mut dst = Value::Undefined;
    assign_value(&ctx, &mut dst, &Value::Int32(5), ValueKind::Json);
    assert!(matches!(dst, Value::Json(77)));
    assert_eq!(*to_json_calls.borrow(), 1);

    // A json source already of the requested kind copies without converting.
    assign_value(&ctx, &mut dst, &Value::Json(3), ValueKind::Json);
    assert!(matches!(dst, Value::Json(3)));
    assert_eq!(*to_json_calls.borrow(), 1);

    // A json source into a concrete kind converts back out.
    assign_value(&ctx, &mut dst, &Value::Json(12), ValueKind::Int32);
    assert!(matches!(dst, Value::Int32(12)));
    assert_eq!(*from_json_calls.borrow(), 1);
}
