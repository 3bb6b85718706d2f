//! Boundary traits for the external collaborators, injected into the
//! context.
//!
//! The JSON document store, the native-variable table, and the date
//! presenter all live outside this core; builds without one of them fall
//! back to an inert default rather than a missing symbol.

use crate::core::value::Value;
use indexmap::IndexMap;
use rheo_core::ValueKind;
use std::cell::RefCell;
use std::rc::Rc;

/// Bidirectional bridge to the external JSON document store. Invoked only
/// from member-reference resolution and `assign_value`.
pub trait JsonBridge {
    /// The named member of a document, or undefined if absent.
    fn member(&self, doc: i32, name: &str) -> Value;
    /// Convert a concrete value into a JSON-kind value.
    fn to_json(&self, value: &Value) -> Value;
    /// Convert a document into a concrete value of the requested kind.
    fn from_json(&self, doc: i32, kind: ValueKind) -> Value;
}

/// Default bridge for builds without a JSON store: everything is undefined.
pub struct NullJsonBridge;

impl JsonBridge for NullJsonBridge {
    fn member(&self, _doc: i32, _name: &str) -> Value {
        Value::Undefined
    }

    fn to_json(&self, _value: &Value) -> Value {
        Value::Undefined
    }

    fn from_json(&self, _doc: i32, _kind: ValueKind) -> Value {
        Value::Undefined
    }
}

/// In-crate document store serving member lookups. Member order is
/// preserved, since it is observable through the bridge. Conversion between
/// whole documents and concrete values stays with the external dashboard
/// layer, so `to_json`/`from_json` resolve to undefined here.
#[derive(Clone, Default)]
pub struct StdJsonStore {
    docs: Rc<RefCell<Vec<IndexMap<String, Value>>>>,
}

impl StdJsonStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document; the returned handle is never zero.
    pub fn add_document(&self, members: IndexMap<String, Value>) -> i32 {
        let mut docs = self.docs.borrow_mut();
        docs.push(members);
        docs.len() as i32
    }

    pub fn member_names(&self, doc: i32) -> Vec<String> {
        if doc <= 0 {
            return Vec::new();
        }
        self.docs
            .borrow()
            .get(doc as usize - 1)
            .map(|members| members.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl JsonBridge for StdJsonStore {
    fn member(&self, doc: i32, name: &str) -> Value {
        if doc <= 0 {
            return Value::Undefined;
        }
        self.docs
            .borrow()
            .get(doc as usize - 1)
            .and_then(|members| members.get(name).cloned())
            .unwrap_or(Value::Undefined)
    }

    fn to_json(&self, _value: &Value) -> Value {
        Value::Undefined
    }

    fn from_json(&self, _doc: i32, _kind: ValueKind) -> Value {
        Value::Undefined
    }
}

/// Read side of the native-variable table, present only in GUI-linked
/// builds. Without a registered source the native-variable kind is inert:
/// comparisons are false, text and type name are empty.
pub trait NativeVars {
    fn get(&self, id: i32) -> Value;
}

/// Date-to-text presentation is a locale concern outside this core. The
/// default renders the raw millisecond count.
pub trait DatePresenter {
    fn date_to_text(&self, ms: f64) -> String;
}

pub struct RawMillisPresenter;

impl DatePresenter for RawMillisPresenter {
    fn date_to_text(&self, ms: f64) -> String {
        itoa::Buffer::new().format(ms as i64).to_string()
    }
}

pub struct Capabilities {
    pub json: Box<dyn JsonBridge>,
    pub native_vars: Option<Box<dyn NativeVars>>,
    pub date: Box<dyn DatePresenter>,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            json: Box::new(NullJsonBridge),
            native_vars: None,
            date: Box::new(RawMillisPresenter),
        }
    }
}
