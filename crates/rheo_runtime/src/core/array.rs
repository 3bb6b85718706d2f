//! Array construction, element access, broadcast update, and deep copy.

use crate::context::Context;
use crate::core::arena::{tags, AllocTag};
use crate::core::heap::{cell_header_size, ArrayValue, HeapObject, ObjRef};
use crate::core::value::Value;
use crate::errors::ValueError;
use rheo_core::ValueKind;

/// Engine-owned array outside the arena budget (global variable storage).
/// Every slot defaults to null.
pub fn make_array(size: usize, element_kind: ValueKind) -> Value {
    Value::Arr(ObjRef::engine_owned(HeapObject::Array(
        ArrayValue::with_size(size, element_kind),
    )))
}

/// Reference-counted array allocated from the arena: header plus `size`
/// value slots. Returns a null-kind value when the arena is exhausted.
pub fn make_array_ref(ctx: &Context, size: usize, element_kind: ValueKind, tag: AllocTag) -> Value {
    let Ok(mut ticket) = ctx.arena().try_reserve(cell_header_size(), tag) else {
        return Value::Null;
    };
    if ticket
        .try_grow(size * std::mem::size_of::<Value>())
        .is_err()
    {
        return Value::Null;
    }
    Value::ArrRef(ObjRef::counted(
        HeapObject::Array(ArrayValue::with_size(size, element_kind)),
        ticket,
    ))
}

/// Unchecked-by-contract element write used internally. The caller
/// guarantees `index < size`; asset arrays are immutable and ignored.
pub fn set_element(array: &Value, index: usize, value: Value) {
    if let Some(cell) = array.array_obj() {
        if let HeapObject::Array(a) = &mut *cell.borrow_mut() {
            a.values[index] = value;
        }
    }
}

/// Bounds-checked element write for external boundaries.
pub fn set_element_checked(array: &Value, index: usize, value: Value) -> Result<(), ValueError> {
    let Some(cell) = array.array_obj() else {
        return Err(ValueError::InvalidHandle);
    };
    let mut obj = cell.borrow_mut();
    let HeapObject::Array(a) = &mut *obj else {
        return Err(ValueError::InvalidHandle);
    };
    let len = a.values.len();
    if index >= len {
        return Err(ValueError::IndexOutOfRange { index, len });
    }
    a.values[index] = value;
    Ok(())
}

/// Recursively overwrite matching elements of `dst` with the elements of
/// `src`, in place. Nested arrays are descended into rather than replaced,
/// so every existing alias of `dst` (and of its sub-arrays) observes the new
/// leaves without any pointer rewiring. This is the broadcast primitive used
/// when a global variable changes.
pub fn deep_update(dst: &Value, src: &Value) {
    let Some(len) = dst.array_len() else { return };
    for index in 0..len {
        let Some(src_element) = src.array_element(index) else {
            break;
        };
        match dst.array_element(index) {
            Some(dst_element)
                if matches!(dst_element.kind(), ValueKind::Arr | ValueKind::ArrRef) =>
            {
                deep_update(&dst_element, &src_element);
            }
            _ => set_element(dst, index, src_element),
        }
    }
}

/// Deep copy. Arrays are recursively cloned into a fresh counted array
/// chain; any element that clones to an error, and any allocation failure,
/// aborts the whole clone and propagates upward — a partially built
/// structure is never returned. Non-array values copy plainly.
pub fn clone_value(ctx: &Context, value: &Value) -> Value {
    if !value.kind().is_array() {
        return value.clone();
    }
    let len = value.array_len().unwrap_or(0);
    let element_kind = value.array_element_kind().unwrap_or(ValueKind::Undefined);
    let result = make_array_ref(ctx, len, element_kind, tags::ARRAY_CLONE);
    if result.is_null() {
        return result;
    }
    for index in 0..len {
        let element = value.array_element(index).unwrap_or(Value::Undefined);
        let cloned = clone_value(ctx, &element);
        if cloned.is_error() {
            return cloned;
        }
        if cloned.is_null() && element.kind().is_array() {
            // Allocation failure somewhere below.
            return Value::Null;
        }
        set_element(&result, index, cloned);
    }
    result
}
