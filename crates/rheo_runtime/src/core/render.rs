//! Deterministic, locale-free text rendering.
//!
//! Downstream UI and wire protocols depend on these strings byte for byte:
//! the unit-aware numeric renderer must not change shape across platforms,
//! so floats go through shortest-round-trip formatting and integers through
//! `itoa`, never through locale-sensitive formatting.

use crate::context::Context;
use crate::core::value::Value;
use rheo_core::{find_derived_unit, NumberFormat, Unit};
use std::fmt::Write;

impl Value {
    /// Deterministic textual rendering. Error and NaN values render as the
    /// empty string, never as `"nan"`.
    pub fn to_text(&self, ctx: &Context) -> String {
        value_to_text(self, ctx)
    }
}

fn value_to_text(value: &Value, ctx: &Context) -> String {
    let v = value.resolve(ctx);
    match &v {
        Value::Undefined | Value::Null | Value::Error => String::new(),
        Value::Boolean(b) => (if *b { "true" } else { "false" }).to_string(),
        Value::Int8(i) => itoa::Buffer::new().format(*i).to_string(),
        Value::Uint8(i) => itoa::Buffer::new().format(*i).to_string(),
        Value::Int16(i) => itoa::Buffer::new().format(*i).to_string(),
        Value::Uint16(i) => itoa::Buffer::new().format(*i).to_string(),
        Value::Int32(i) => itoa::Buffer::new().format(*i).to_string(),
        Value::Uint32(i) => itoa::Buffer::new().format(*i).to_string(),
        Value::Int64(i) => itoa::Buffer::new().format(*i).to_string(),
        Value::Uint64(i) => itoa::Buffer::new().format(*i).to_string(),
        Value::Float {
            value,
            unit,
            format,
        } => float_to_text(*value, *unit, *format, ctx.infinity_symbol()),
        Value::Double {
            value,
            unit,
            format,
        } => double_to_text(*value, *unit, *format, ctx.infinity_symbol()),
        Value::Str(_) | Value::StrAsset(_) | Value::StrRef(_) | Value::VersionedStr { .. } => {
            v.as_str().map(|s| s.to_string()).unwrap_or_default()
        }
        Value::Arr(_) | Value::ArrAsset(_) | Value::ArrRef(_) => String::new(),
        Value::BlobRef(_) => format!("blob (size={})", v.blob_len().unwrap_or(0)),
        Value::Stream(id) => format!("stream (id={id})"),
        Value::Date(ms) => ctx.capabilities().date.date_to_text(*ms),
        Value::Json(id) => format!("json (id={id})"),
        // Inert without a registered source.
        Value::NativeVariable(_) => String::new(),
        Value::Range { .. }
        | Value::Pointer(_)
        | Value::Enum { .. }
        | Value::FlowOutput(_)
        | Value::FunctionPointer(_) => String::new(),
        Value::IpAddress(ip) => ip_address_to_text(*ip),
        Value::TimeZone(tz) => time_zone_to_text(*tz),
        // Unresolvable proxies render empty.
        Value::ValuePtr(_) | Value::ArrayElementRef(_) | Value::JsonMemberRef(_) => String::new(),
    }
}

/// Unit-aware rendering of a float value.
pub fn float_to_text(
    value: f32,
    unit: Unit,
    format: NumberFormat,
    infinity_symbol: Option<&'static str>,
) -> String {
    if value.is_infinite() {
        if let Some(symbol) = infinity_symbol {
            return symbol.to_string();
        }
    }
    let mut value = value;
    let mut unit = unit;
    let mut dot_zero = format.preserve_decimal && unit.preserves_decimal();
    if value != 0.0 {
        if format.fixed_decimals.is_none() {
            let derived = find_derived_unit(value.abs() as f64, unit);
            value /= derived.factor() as f32;
            unit = derived;
        }
    } else {
        // Collapse negative zero before formatting.
        value = 0.0;
    }
    if value.is_nan() {
        return String::new();
    }

    let mut text = String::new();
    if format.less_than {
        text.push_str("< ");
        dot_zero = false;
    }
    match format.fixed_decimals {
        Some(places) => {
            let _ = write!(text, "{:.*}", places as usize, value);
        }
        None => {
            if matches!(unit, Unit::Watt | Unit::MilliWatt) {
                let _ = write!(text, "{value:.2}");
            } else if value.is_finite() {
                let mut buf = ryu::Buffer::new();
                text.push_str(buf.format_finite(value));
            } else {
                let _ = write!(text, "{value}");
            }
            trim_trailing_zeros(&mut text, dot_zero);
        }
    }
    append_unit_name(&mut text, unit);
    text
}

/// Unit-aware rendering of a double value. Same algorithm as
/// [`float_to_text`] at double precision.
pub fn double_to_text(
    value: f64,
    unit: Unit,
    format: NumberFormat,
    infinity_symbol: Option<&'static str>,
) -> String {
    if value.is_infinite() {
        if let Some(symbol) = infinity_symbol {
            return symbol.to_string();
        }
    }
    let mut value = value;
    let mut unit = unit;
    let mut dot_zero = format.preserve_decimal && unit.preserves_decimal();
    if value != 0.0 {
        if format.fixed_decimals.is_none() {
            let derived = find_derived_unit(value.abs(), unit);
            value /= derived.factor();
            unit = derived;
        }
    } else {
        value = 0.0;
    }
    if value.is_nan() {
        return String::new();
    }

    let mut text = String::new();
    if format.less_than {
        text.push_str("< ");
        dot_zero = false;
    }
    match format.fixed_decimals {
        Some(places) => {
            let _ = write!(text, "{:.*}", places as usize, value);
        }
        None => {
            if matches!(unit, Unit::Watt | Unit::MilliWatt) {
                let _ = write!(text, "{value:.2}");
            } else if value.is_finite() {
                let mut buf = ryu::Buffer::new();
                text.push_str(buf.format_finite(value));
            } else {
                let _ = write!(text, "{value}");
            }
            trim_trailing_zeros(&mut text, dot_zero);
        }
    }
    append_unit_name(&mut text, unit);
    text
}

/// Trailing-zero policy. With `dot_zero` set, integer-looking results gain
/// `.0` and a run of zeros after the point trims to exactly one digit;
/// without it, the point and every trailing zero go.
fn trim_trailing_zeros(text: &mut String, dot_zero: bool) {
    let point = text.bytes().position(|b| b == b'.');
    match point {
        None => {
            if dot_zero {
                text.push_str(".0");
            }
        }
        Some(p) if p == text.len() - 1 => {
            if dot_zero {
                text.push('0');
            } else {
                text.truncate(p);
            }
        }
        Some(p) => {
            let mut end = text.len();
            if dot_zero {
                while end > p + 2 && text.as_bytes()[end - 1] == b'0' {
                    end -= 1;
                }
            } else {
                while end > p {
                    let b = text.as_bytes()[end - 1];
                    if b != b'0' && b != b'.' {
                        break;
                    }
                    end -= 1;
                }
            }
            text.truncate(end);
        }
    }
}

fn append_unit_name(text: &mut String, unit: Unit) {
    let name = unit.name();
    if !name.is_empty() {
        text.push(' ');
        text.push_str(name);
    }
}

/// Dotted quad, low octet first.
pub fn ip_address_to_text(ip: u32) -> String {
    format!(
        "{}.{}.{}.{}",
        ip & 0xff,
        (ip >> 8) & 0xff,
        (ip >> 16) & 0xff,
        (ip >> 24) & 0xff
    )
}

/// Packed HHMM offset: `0` renders `"GMT"`, otherwise a signed `"+HH:MM"`.
pub fn time_zone_to_text(tz: i16) -> String {
    if tz == 0 {
        return "GMT".to_string();
    }
    let sign = if tz < 0 { '-' } else { '+' };
    let t = (tz as i32).abs();
    format!("{}{:02}:{:02}", sign, t / 100, t % 100)
}
