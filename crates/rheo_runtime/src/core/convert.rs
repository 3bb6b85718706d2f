//! Value coercions.
//!
//! Each conversion resolves indirections first, then applies a fixed
//! precedence ladder per target type; the first matching kind wins. String
//! inputs tolerate surrounding whitespace and fail on any other trailing
//! characters. Failure is `Err(CoercionFailed)`; the documented best-effort
//! defaults are `0`, `false`, and `NaN`.

use crate::context::Context;
use crate::core::arena::AllocTag;
use crate::core::value::Value;
use crate::errors::ValueError;
use rheo_core::ValueKind;

impl Value {
    pub fn to_bool(&self, ctx: &Context) -> Result<bool, ValueError> {
        let v = self.resolve(ctx);
        match &v {
            Value::Undefined | Value::Null => Ok(false),
            Value::Boolean(b) => Ok(*b),
            Value::Int8(i) => Ok(*i != 0),
            Value::Uint8(i) => Ok(*i != 0),
            Value::Int16(i) => Ok(*i != 0),
            Value::Uint16(i) => Ok(*i != 0),
            Value::Int32(i) => Ok(*i != 0),
            Value::Uint32(i) => Ok(*i != 0),
            Value::Int64(i) => Ok(*i != 0),
            Value::Uint64(i) => Ok(*i != 0),
            Value::Float { value, .. } => Ok(*value != 0.0),
            Value::Double { value, .. } => Ok(*value != 0.0),
            Value::Date(ms) => Ok(*ms != 0.0),
            // Non-empty string is truthy, regardless of content.
            _ if v.kind().is_string() => Ok(v.as_str().map(|s| !s.is_empty()).unwrap_or(false)),
            Value::BlobRef(_) => Ok(v.blob_len().unwrap_or(0) > 0),
            _ if v.kind().is_array() => Ok(v.array_len().unwrap_or(0) != 0),
            Value::Json(handle) => Ok(*handle != 0),
            _ => Err(ValueError::CoercionFailed),
        }
    }

    pub fn to_int32(&self, ctx: &Context) -> Result<i32, ValueError> {
        let v = self.resolve(ctx);
        match &v {
            Value::Int32(i) => Ok(*i),
            Value::Boolean(b) => Ok(*b as i32),
            Value::Uint32(i) => Ok(*i as i32),
            Value::Int8(i) => Ok(*i as i32),
            Value::Uint8(i) => Ok(*i as i32),
            Value::Int16(i) => Ok(*i as i32),
            Value::Uint16(i) => Ok(*i as i32),
            Value::Int64(i) => Ok(*i as i32),
            Value::Uint64(i) => Ok(*i as i32),
            Value::Double { value, .. } => Ok(*value as i32),
            Value::Float { value, .. } => Ok(*value as i32),
            _ if v.kind().is_string() => parse_scalar(&v.as_str().expect("string kind")),
            _ => Err(ValueError::CoercionFailed),
        }
    }

    pub fn to_int64(&self, ctx: &Context) -> Result<i64, ValueError> {
        let v = self.resolve(ctx);
        match &v {
            Value::Double { value, .. } => Ok(*value as i64),
            Value::Float { value, .. } => Ok(*value as i64),
            Value::Int8(i) => Ok(*i as i64),
            Value::Uint8(i) => Ok(*i as i64),
            Value::Int16(i) => Ok(*i as i64),
            Value::Uint16(i) => Ok(*i as i64),
            Value::Int32(i) => Ok(*i as i64),
            Value::Boolean(b) => Ok(*b as i64),
            Value::Uint32(i) => Ok(*i as i64),
            Value::Int64(i) => Ok(*i),
            Value::Uint64(i) => Ok(*i as i64),
            _ if v.kind().is_string() => parse_scalar(&v.as_str().expect("string kind")),
            _ => Err(ValueError::CoercionFailed),
        }
    }

    pub fn to_float(&self, ctx: &Context) -> Result<f32, ValueError> {
        let v = self.resolve(ctx);
        match &v {
            Value::Double { value, .. } => Ok(*value as f32),
            Value::Float { value, .. } => Ok(*value),
            Value::Int8(i) => Ok(*i as f32),
            Value::Uint8(i) => Ok(*i as f32),
            Value::Int16(i) => Ok(*i as f32),
            Value::Uint16(i) => Ok(*i as f32),
            Value::Int32(i) => Ok(*i as f32),
            Value::Boolean(b) => Ok(*b as i32 as f32),
            Value::Uint32(i) => Ok(*i as f32),
            Value::Int64(i) => Ok(*i as f32),
            Value::Uint64(i) => Ok(*i as f32),
            _ if v.kind().is_string() => parse_scalar(&v.as_str().expect("string kind")),
            _ => Err(ValueError::CoercionFailed),
        }
    }

    pub fn to_double(&self, ctx: &Context) -> Result<f64, ValueError> {
        let v = self.resolve(ctx);
        match &v {
            Value::Double { value, .. } => Ok(*value),
            Value::Float { value, .. } => Ok(*value as f64),
            Value::Int8(i) => Ok(*i as f64),
            Value::Uint8(i) => Ok(*i as f64),
            Value::Int16(i) => Ok(*i as f64),
            Value::Uint16(i) => Ok(*i as f64),
            Value::Int32(i) => Ok(*i as f64),
            Value::Boolean(b) => Ok(*b as i32 as f64),
            Value::Uint32(i) => Ok(*i as f64),
            Value::Int64(i) => Ok(*i as f64),
            Value::Uint64(i) => Ok(*i as f64),
            Value::Date(ms) => Ok(*ms),
            _ if v.kind().is_string() => parse_scalar(&v.as_str().expect("string kind")),
            _ => Err(ValueError::CoercionFailed),
        }
    }

    /// Textual form of this value as a counted string. String-family values
    /// return themselves unchanged.
    pub fn to_string_value(&self, ctx: &Context, tag: AllocTag) -> Value {
        let v = self.resolve(ctx);
        if v.kind().is_string() {
            return v;
        }
        let text = match &v {
            Value::Double { value, .. } => shortest_f64(*value),
            Value::Float { value, .. } => shortest_f32(*value),
            Value::Int8(i) => itoa::Buffer::new().format(*i).to_string(),
            Value::Uint8(i) => itoa::Buffer::new().format(*i).to_string(),
            Value::Int16(i) => itoa::Buffer::new().format(*i).to_string(),
            Value::Uint16(i) => itoa::Buffer::new().format(*i).to_string(),
            Value::Int32(i) => itoa::Buffer::new().format(*i).to_string(),
            Value::Uint32(i) => itoa::Buffer::new().format(*i).to_string(),
            Value::Int64(i) => itoa::Buffer::new().format(*i).to_string(),
            Value::Uint64(i) => itoa::Buffer::new().format(*i).to_string(),
            _ => v.to_text(ctx),
        };
        Value::make_string_ref(ctx, &text, tag)
    }

    /// Counted string holding the concatenation of two string values.
    /// Non-string operands yield a null-kind value.
    pub fn concatenate_strings(ctx: &Context, first: &Value, second: &Value, tag: AllocTag) -> Value {
        let a = first.resolve(ctx);
        let b = second.resolve(ctx);
        let (Some(sa), Some(sb)) = (a.as_str(), b.as_str()) else {
            return Value::Null;
        };
        let mut text = String::with_capacity(sa.len() + sb.len());
        text.push_str(&sa);
        text.push_str(&sb);
        Value::make_string_ref(ctx, &text, tag)
    }
}

/// Coerce `src` into `dst`, targeting `dst_kind`. A kind the ladder does not
/// name (e.g. `Undefined`) falls back to the destination's current kind, and
/// finally to a plain copy. Conversions use the best-effort defaults; JSON
/// destinations and sources bridge through the external JSON capability.
pub fn assign_value(ctx: &Context, dst: &mut Value, src: &Value, dst_kind: ValueKind) {
    // JSON on either side bridges through the external conversion
    // capability before any numeric ladder runs.
    if dst_kind == ValueKind::Json {
        *dst = match src.resolve(ctx) {
            json @ Value::Json(_) => json,
            other => ctx.capabilities().json.to_json(&other),
        };
        return;
    }
    if let Value::Json(handle) = src.resolve(ctx) {
        *dst = ctx.capabilities().json.from_json(handle, dst_kind);
        return;
    }

    if dst_kind == ValueKind::Boolean {
        *dst = Value::Boolean(src.to_bool(ctx).unwrap_or(false));
    } else if dst_kind.is_int32_or_less() {
        *dst = retype_int32(src.to_int32(ctx).unwrap_or(0), dst_kind);
    } else if dst_kind == ValueKind::Float {
        *dst = Value::float(src.to_float(ctx).unwrap_or(f32::NAN));
    } else if dst_kind == ValueKind::Double {
        *dst = Value::double(src.to_double(ctx).unwrap_or(f64::NAN));
    } else if dst_kind.is_string() {
        *dst = src.to_string_value(ctx, crate::core::arena::tags::TO_STRING);
    } else {
        match dst {
            Value::Boolean(_) => *dst = Value::Boolean(src.to_bool(ctx).unwrap_or(false)),
            _ if dst.kind().is_int32_or_less() => {
                *dst = retype_int32(src.to_int32(ctx).unwrap_or(0), dst.kind());
            }
            Value::Float { unit, format, .. } => {
                *dst = Value::float_with_format(
                    src.to_float(ctx).unwrap_or(f32::NAN),
                    *unit,
                    *format,
                );
            }
            Value::Double { unit, format, .. } => {
                *dst = Value::double_with_format(
                    src.to_double(ctx).unwrap_or(f64::NAN),
                    *unit,
                    *format,
                );
            }
            _ if dst.kind().is_string() => {
                *dst = src.to_string_value(ctx, crate::core::arena::tags::TO_STRING);
            }
            _ => *dst = src.clone(),
        }
    }
}

/// Re-wrap an int32 into the requested narrow integer kind, truncating like
/// the narrowing stores in the original.
fn retype_int32(n: i32, kind: ValueKind) -> Value {
    match kind {
        ValueKind::Boolean => Value::Boolean(n != 0),
        ValueKind::Int8 => Value::Int8(n as i8),
        ValueKind::Uint8 => Value::Uint8(n as u8),
        ValueKind::Int16 => Value::Int16(n as i16),
        ValueKind::Uint16 => Value::Uint16(n as u16),
        ValueKind::Uint32 => Value::Uint32(n as u32),
        _ => Value::Int32(n),
    }
}

/// Numeric parse with surrounding whitespace tolerated; any other trailing
/// characters fail. An all-whitespace input parses to zero, like the
/// platform parser.
fn parse_scalar<T>(s: &str) -> Result<T, ValueError>
where
    T: std::str::FromStr + Default,
{
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Ok(T::default());
    }
    trimmed.parse::<T>().map_err(|_| ValueError::CoercionFailed)
}

fn shortest_f64(value: f64) -> String {
    if value.is_finite() {
        ryu::Buffer::new().format_finite(value).to_string()
    } else {
        format!("{value}")
    }
}

fn shortest_f32(value: f32) -> String {
    if value.is_finite() {
        ryu::Buffer::new().format_finite(value).to_string()
    } else {
        format!("{value}")
    }
}
