//! Runtime value representation.
//!
//! A value is one variant of a closed sum type; the kind tag fully determines
//! how the payload is interpreted. Values are freely clonable: cloning a
//! variant that holds an [`ObjRef`] retains the shared heap object, dropping
//! it releases. Every kind-specific operation resolves indirections first,
//! which is the single seam that keeps the proxy kinds interoperable with
//! every concrete operation.

use crate::context::Context;
use crate::core::arena::{tags, AllocTag};
use crate::core::heap::{cell_header_size, AssetArray, HeapObject, ObjRef};
use rheo_core::{NumberFormat, Unit, ValueKind};
use std::cell::{Ref, RefCell};
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

/// Chains of proxies longer than this resolve to undefined. Guards against
/// value-pointer cycles.
const MAX_RESOLVE_DEPTH: usize = 32;

/// Shared mutable slot referenced by value-pointer values.
pub type ValueSlot = Rc<RefCell<Value>>;

#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Boolean(bool),
    Int8(i8),
    Uint8(u8),
    Int16(i16),
    Uint16(u16),
    Int32(i32),
    Uint32(u32),
    Int64(i64),
    Uint64(u64),
    Float {
        value: f32,
        unit: Unit,
        format: NumberFormat,
    },
    Double {
        value: f64,
        unit: Unit,
        format: NumberFormat,
    },
    /// String literal from the flow definition.
    Str(&'static str),
    /// Read-only view into static asset data.
    StrAsset(&'static str),
    /// Arena-allocated, reference-counted string.
    StrRef(ObjRef),
    /// Engine-owned array storage (global variables).
    Arr(ObjRef),
    /// Read-only array view into static asset data.
    ArrAsset(&'static AssetArray),
    /// Arena-allocated, reference-counted array.
    ArrRef(ObjRef),
    BlobRef(ObjRef),
    Stream(i32),
    /// Milliseconds since the epoch.
    Date(f64),
    /// Opaque handle into the external JSON document store.
    Json(i32),
    JsonMemberRef(ObjRef),
    ArrayElementRef(ObjRef),
    VersionedStr {
        version: u16,
        text: &'static str,
    },
    ValuePtr(ValueSlot),
    FlowOutput(u16),
    NativeVariable(i32),
    Error,
    Range {
        from: u16,
        to: u16,
    },
    Pointer(usize),
    Enum {
        value: u8,
        definition: u8,
    },
    IpAddress(u32),
    TimeZone(i16),
    FunctionPointer(u32),
}

// ============================================================================
// String and blob payload views
// ============================================================================

/// Borrowed view of a string payload, valid for any string-family kind.
pub enum StrView<'a> {
    Static(&'a str),
    Cell(Ref<'a, HeapObject>),
}

impl Deref for StrView<'_> {
    type Target = str;

    fn deref(&self) -> &str {
        match self {
            StrView::Static(s) => s,
            StrView::Cell(cell) => match &**cell {
                HeapObject::Str(s) => s.as_str(),
                _ => "",
            },
        }
    }
}

/// Borrowed view of a blob payload.
pub struct BlobView<'a>(Ref<'a, HeapObject>);

impl Deref for BlobView<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match &*self.0 {
            HeapObject::Blob(bytes) => bytes,
            _ => &[],
        }
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl Value {
    pub fn float(value: f32) -> Self {
        Self::float_with_unit(value, Unit::None)
    }

    pub fn float_with_unit(value: f32, unit: Unit) -> Self {
        Self::Float {
            value,
            unit,
            format: NumberFormat::default(),
        }
    }

    pub fn float_with_format(value: f32, unit: Unit, format: NumberFormat) -> Self {
        Self::Float {
            value,
            unit,
            format,
        }
    }

    pub fn double(value: f64) -> Self {
        Self::double_with_unit(value, Unit::None)
    }

    pub fn double_with_unit(value: f64, unit: Unit) -> Self {
        Self::Double {
            value,
            unit,
            format: NumberFormat::default(),
        }
    }

    pub fn double_with_format(value: f64, unit: Unit, format: NumberFormat) -> Self {
        Self::Double {
            value,
            unit,
            format,
        }
    }

    pub fn value_ptr(slot: ValueSlot) -> Self {
        Self::ValuePtr(slot)
    }

    pub fn range(from: u16, to: u16) -> Self {
        Self::Range { from, to }
    }

    pub fn enum_def(value: u8, definition: u8) -> Self {
        Self::Enum { value, definition }
    }

    /// Reference-counted string built from `text`. Header and payload are
    /// reserved in two phases; a payload failure rolls the header back and
    /// yields a null-kind value.
    pub fn make_string_ref(ctx: &Context, text: &str, tag: AllocTag) -> Self {
        let Ok(mut ticket) = ctx.arena().try_reserve(cell_header_size(), tag) else {
            return Value::Null;
        };
        if ticket.try_grow(text.len() + 1).is_err() {
            return Value::Null;
        }
        Value::StrRef(ObjRef::counted(HeapObject::Str(text.to_string()), ticket))
    }

    /// Reference-counted blob owning a copy of `bytes`.
    pub fn make_blob_ref(ctx: &Context, bytes: &[u8], tag: AllocTag) -> Self {
        let Ok(mut ticket) = ctx.arena().try_reserve(cell_header_size(), tag) else {
            return Value::Null;
        };
        if ticket.try_grow(bytes.len()).is_err() {
            return Value::Null;
        }
        Value::BlobRef(ObjRef::counted(
            HeapObject::Blob(bytes.to_vec().into_boxed_slice()),
            ticket,
        ))
    }

    /// Reference-counted blob concatenating two source buffers.
    pub fn make_blob_ref_concat(ctx: &Context, first: &[u8], second: &[u8], tag: AllocTag) -> Self {
        let Ok(mut ticket) = ctx.arena().try_reserve(cell_header_size(), tag) else {
            return Value::Null;
        };
        if ticket.try_grow(first.len() + second.len()).is_err() {
            return Value::Null;
        }
        let mut bytes = Vec::with_capacity(first.len() + second.len());
        bytes.extend_from_slice(first);
        bytes.extend_from_slice(second);
        Value::BlobRef(ObjRef::counted(
            HeapObject::Blob(bytes.into_boxed_slice()),
            ticket,
        ))
    }

    /// Indirection denoting the value at `index` of `array`, without copying
    /// it.
    pub fn make_array_element_ref(ctx: &Context, array: Value, index: usize) -> Self {
        let Ok(ticket) = ctx
            .arena()
            .try_reserve(cell_header_size(), tags::ARRAY_ELEMENT_REF)
        else {
            return Value::Null;
        };
        Value::ArrayElementRef(ObjRef::counted(
            HeapObject::ArrayElement { array, index },
            ticket,
        ))
    }

    /// Indirection denoting the named member of a JSON document, without
    /// eagerly materializing it.
    pub fn make_json_member_ref(ctx: &Context, json: Value, member: Value) -> Self {
        let Ok(ticket) = ctx
            .arena()
            .try_reserve(cell_header_size(), tags::JSON_MEMBER_REF)
        else {
            return Value::Null;
        };
        Value::JsonMemberRef(ObjRef::counted(
            HeapObject::JsonMember { json, member },
            ticket,
        ))
    }
}

// ============================================================================
// Kind and payload accessors
// ============================================================================

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Undefined => ValueKind::Undefined,
            Value::Null => ValueKind::Null,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Int8(_) => ValueKind::Int8,
            Value::Uint8(_) => ValueKind::Uint8,
            Value::Int16(_) => ValueKind::Int16,
            Value::Uint16(_) => ValueKind::Uint16,
            Value::Int32(_) => ValueKind::Int32,
            Value::Uint32(_) => ValueKind::Uint32,
            Value::Int64(_) => ValueKind::Int64,
            Value::Uint64(_) => ValueKind::Uint64,
            Value::Float { .. } => ValueKind::Float,
            Value::Double { .. } => ValueKind::Double,
            Value::Str(_) => ValueKind::Str,
            Value::StrAsset(_) => ValueKind::StrAsset,
            Value::StrRef(_) => ValueKind::StrRef,
            Value::Arr(_) => ValueKind::Arr,
            Value::ArrAsset(_) => ValueKind::ArrAsset,
            Value::ArrRef(_) => ValueKind::ArrRef,
            Value::BlobRef(_) => ValueKind::BlobRef,
            Value::Stream(_) => ValueKind::Stream,
            Value::Date(_) => ValueKind::Date,
            Value::Json(_) => ValueKind::Json,
            Value::JsonMemberRef(_) => ValueKind::JsonMemberRef,
            Value::ArrayElementRef(_) => ValueKind::ArrayElementRef,
            Value::VersionedStr { .. } => ValueKind::VersionedStr,
            Value::ValuePtr(_) => ValueKind::ValuePtr,
            Value::FlowOutput(_) => ValueKind::FlowOutput,
            Value::NativeVariable(_) => ValueKind::NativeVariable,
            Value::Error => ValueKind::Error,
            Value::Range { .. } => ValueKind::Range,
            Value::Pointer(_) => ValueKind::Pointer,
            Value::Enum { .. } => ValueKind::Enum,
            Value::IpAddress(_) => ValueKind::IpAddress,
            Value::TimeZone(_) => ValueKind::TimeZone,
            Value::FunctionPointer(_) => ValueKind::FunctionPointer,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error)
    }

    /// String content for the string family and versioned strings.
    pub fn as_str(&self) -> Option<StrView<'_>> {
        match self {
            Value::Str(s) | Value::StrAsset(s) => Some(StrView::Static(s)),
            Value::VersionedStr { text, .. } => Some(StrView::Static(text)),
            Value::StrRef(cell) => Some(StrView::Cell(cell.borrow())),
            _ => None,
        }
    }

    pub fn blob(&self) -> Option<BlobView<'_>> {
        match self {
            Value::BlobRef(cell) => Some(BlobView(cell.borrow())),
            _ => None,
        }
    }

    pub fn blob_len(&self) -> Option<usize> {
        self.blob().map(|b| b.len())
    }

    /// Mutable array storage cell, for the kinds that have one.
    pub fn array_obj(&self) -> Option<&ObjRef> {
        match self {
            Value::Arr(cell) | Value::ArrRef(cell) => Some(cell),
            _ => None,
        }
    }

    pub fn array_len(&self) -> Option<usize> {
        match self {
            Value::Arr(cell) | Value::ArrRef(cell) => match &*cell.borrow() {
                HeapObject::Array(a) => Some(a.len()),
                _ => None,
            },
            Value::ArrAsset(a) => Some(a.values.len()),
            _ => None,
        }
    }

    pub fn array_element_kind(&self) -> Option<ValueKind> {
        match self {
            Value::Arr(cell) | Value::ArrRef(cell) => match &*cell.borrow() {
                HeapObject::Array(a) => Some(a.element_kind),
                _ => None,
            },
            Value::ArrAsset(a) => Some(a.element_kind),
            _ => None,
        }
    }

    /// Clone of the element at `index`, for any array-family kind.
    pub fn array_element(&self, index: usize) -> Option<Value> {
        match self {
            Value::Arr(cell) | Value::ArrRef(cell) => match &*cell.borrow() {
                HeapObject::Array(a) => a.values.get(index).cloned(),
                _ => None,
            },
            Value::ArrAsset(a) => a.values.get(index).cloned(),
            _ => None,
        }
    }

    /// Address identity of the underlying array storage. Two structurally
    /// identical but distinct arrays have different identities.
    pub fn array_storage_id(&self) -> Option<usize> {
        match self {
            Value::Arr(cell) | Value::ArrRef(cell) => Some(cell.address()),
            Value::ArrAsset(a) => Some(*a as *const AssetArray as usize),
            _ => None,
        }
    }
}

// ============================================================================
// Indirection resolver
// ============================================================================

impl Value {
    /// Canonicalize proxy kinds to the concrete value they denote. Non-proxy
    /// kinds resolve to themselves. A native variable without a registered
    /// source stays inert and resolves to itself.
    pub fn resolve(&self, ctx: &Context) -> Value {
        let mut current = self.clone();
        for _ in 0..MAX_RESOLVE_DEPTH {
            match current {
                Value::ValuePtr(ref slot) => {
                    let next = slot.borrow().clone();
                    current = next;
                }
                Value::ArrayElementRef(ref cell) => {
                    let (array, index) = match &*cell.borrow() {
                        HeapObject::ArrayElement { array, index } => (array.clone(), *index),
                        _ => return Value::Undefined,
                    };
                    current = array
                        .resolve(ctx)
                        .array_element(index)
                        .unwrap_or(Value::Undefined);
                }
                Value::JsonMemberRef(ref cell) => {
                    let (json, member) = match &*cell.borrow() {
                        HeapObject::JsonMember { json, member } => (json.clone(), member.clone()),
                        _ => return Value::Undefined,
                    };
                    let doc = json.resolve(ctx);
                    let Value::Json(handle) = doc else {
                        return Value::Undefined;
                    };
                    let Some(name) = member.resolve(ctx).as_str().map(|s| s.to_string()) else {
                        return Value::Undefined;
                    };
                    current = ctx.capabilities().json.member(handle, &name);
                }
                Value::NativeVariable(id) => match ctx.capabilities().native_vars.as_deref() {
                    Some(source) => current = source.get(id),
                    None => return current,
                },
                _ => return current,
            }
        }
        Value::Undefined
    }
}

// ============================================================================
// Equality and type names
// ============================================================================

impl Value {
    /// Kind-aware equality. Indirections are resolved first; scalar kinds
    /// never coerce across widths; strings compare by content; arrays by
    /// storage identity; error values and sourceless native variables are
    /// unequal to everything, themselves included.
    pub fn compare(&self, other: &Value, ctx: &Context) -> bool {
        let a = self.resolve(ctx);
        let b = other.resolve(ctx);
        match (&a, &b) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Boolean(x), Value::Boolean(y)) => x == y,
            (Value::Int8(x), Value::Int8(y)) => x == y,
            (Value::Uint8(x), Value::Uint8(y)) => x == y,
            (Value::Int16(x), Value::Int16(y)) => x == y,
            (Value::Uint16(x), Value::Uint16(y)) => x == y,
            (Value::Int32(x), Value::Int32(y)) => x == y,
            (Value::Uint32(x), Value::Uint32(y)) => x == y,
            (Value::Int64(x), Value::Int64(y)) => x == y,
            (Value::Uint64(x), Value::Uint64(y)) => x == y,
            (
                Value::Float {
                    value: vx,
                    unit: ux,
                    format: fx,
                },
                Value::Float {
                    value: vy,
                    unit: uy,
                    format: fy,
                },
            ) => ux == uy && vx == vy && fx == fy,
            (
                Value::Double {
                    value: vx,
                    unit: ux,
                    format: fx,
                },
                Value::Double {
                    value: vy,
                    unit: uy,
                    format: fy,
                },
            ) => ux == uy && vx == vy && fx == fy,
            (Value::Error, _) | (_, Value::Error) => false,
            (Value::NativeVariable(_), _) | (_, Value::NativeVariable(_)) => false,
            _ if a.kind().is_string() && b.kind().is_string() => {
                match (a.as_str(), b.as_str()) {
                    (Some(x), Some(y)) => *x == *y,
                    (None, None) => true,
                    _ => false,
                }
            }
            _ if a.kind().is_array() && b.kind().is_array() => {
                a.array_storage_id() == b.array_storage_id()
            }
            (Value::BlobRef(x), Value::BlobRef(y)) => x.ptr_eq(y),
            (Value::Stream(x), Value::Stream(y)) => x == y,
            (Value::Date(x), Value::Date(y)) => x == y,
            (Value::Json(x), Value::Json(y)) => x == y,
            (Value::VersionedStr { version: vx, .. }, Value::VersionedStr { version: vy, .. }) => {
                vx == vy
            }
            (Value::FlowOutput(x), Value::FlowOutput(y)) => x == y,
            (Value::Range { from: fx, to: tx }, Value::Range { from: fy, to: ty }) => {
                fx == fy && tx == ty
            }
            (Value::Pointer(x), Value::Pointer(y)) => x == y,
            (
                Value::Enum {
                    value: vx,
                    definition: dx,
                },
                Value::Enum {
                    value: vy,
                    definition: dy,
                },
            ) => vx == vy && dx == dy,
            (Value::IpAddress(x), Value::IpAddress(y)) => x == y,
            (Value::TimeZone(x), Value::TimeZone(y)) => x == y,
            (Value::FunctionPointer(x), Value::FunctionPointer(y)) => x == y,
            _ => false,
        }
    }

    pub fn type_name(&self, ctx: &Context) -> &'static str {
        match self {
            Value::ValuePtr(_) | Value::ArrayElementRef(_) | Value::JsonMemberRef(_) => {
                self.resolve(ctx).type_name(ctx)
            }
            Value::NativeVariable(_) => match ctx.capabilities().native_vars.as_deref() {
                Some(_) => self.resolve(ctx).type_name(ctx),
                None => "",
            },
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Int8(_) => "int8",
            Value::Uint8(_) => "uint8",
            Value::Int16(_) => "int16",
            Value::Uint16(_) => "uint16",
            Value::Int32(_) => "int32",
            Value::Uint32(_) => "uint32",
            Value::Int64(_) => "int64",
            Value::Uint64(_) => "uint64",
            Value::Float { .. } => "float",
            Value::Double { .. } => "double",
            Value::Str(_) | Value::StrAsset(_) | Value::StrRef(_) => "string",
            Value::Arr(_) | Value::ArrAsset(_) | Value::ArrRef(_) => "array",
            Value::BlobRef(_) => "blob",
            Value::Stream(_) => "stream",
            Value::Date(_) => "date",
            Value::Json(_) => "json",
            Value::VersionedStr { .. } => "versioned-string",
            Value::Error => "error",
            Value::FlowOutput(_)
            | Value::Range { .. }
            | Value::Pointer(_)
            | Value::Enum { .. }
            | Value::IpAddress(_)
            | Value::TimeZone(_)
            | Value::FunctionPointer(_) => "internal",
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "Undefined"),
            Value::Null => write!(f, "Null"),
            Value::Boolean(b) => write!(f, "Boolean({b})"),
            Value::Int8(i) => write!(f, "Int8({i})"),
            Value::Uint8(i) => write!(f, "Uint8({i})"),
            Value::Int16(i) => write!(f, "Int16({i})"),
            Value::Uint16(i) => write!(f, "Uint16({i})"),
            Value::Int32(i) => write!(f, "Int32({i})"),
            Value::Uint32(i) => write!(f, "Uint32({i})"),
            Value::Int64(i) => write!(f, "Int64({i})"),
            Value::Uint64(i) => write!(f, "Uint64({i})"),
            Value::Float { value, unit, .. } => write!(f, "Float({value}, {unit:?})"),
            Value::Double { value, unit, .. } => write!(f, "Double({value}, {unit:?})"),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::StrAsset(s) => write!(f, "StrAsset({s:?})"),
            Value::StrRef(cell) => write!(f, "StrRef({cell:?})"),
            Value::Arr(cell) => write!(f, "Arr({cell:?})"),
            Value::ArrAsset(a) => write!(f, "ArrAsset(len={})", a.values.len()),
            Value::ArrRef(cell) => write!(f, "ArrRef({cell:?})"),
            Value::BlobRef(cell) => write!(f, "BlobRef({cell:?})"),
            Value::Stream(id) => write!(f, "Stream({id})"),
            Value::Date(ms) => write!(f, "Date({ms})"),
            Value::Json(id) => write!(f, "Json({id})"),
            Value::JsonMemberRef(cell) => write!(f, "JsonMemberRef({cell:?})"),
            Value::ArrayElementRef(cell) => write!(f, "ArrayElementRef({cell:?})"),
            Value::VersionedStr { version, text } => {
                write!(f, "VersionedStr(v{version}, {text:?})")
            }
            Value::ValuePtr(slot) => write!(f, "ValuePtr({:#x})", Rc::as_ptr(slot) as usize),
            Value::FlowOutput(i) => write!(f, "FlowOutput({i})"),
            Value::NativeVariable(id) => write!(f, "NativeVariable({id})"),
            Value::Error => write!(f, "Error"),
            Value::Range { from, to } => write!(f, "Range({from}..{to})"),
            Value::Pointer(p) => write!(f, "Pointer({p:#x})"),
            Value::Enum { value, definition } => write!(f, "Enum({value} of {definition})"),
            Value::IpAddress(ip) => write!(f, "IpAddress({ip:#010x})"),
            Value::TimeZone(tz) => write!(f, "TimeZone({tz})"),
            Value::FunctionPointer(p) => write!(f, "FunctionPointer({p})"),
        }
    }
}
