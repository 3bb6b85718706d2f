//! Value representation and memory layer of the rheo flow engine.
//!
//! The engine steps one component at a time over a fixed, pre-allocated
//! memory region: no general-purpose heap, no garbage collector, a
//! deterministic footprint. This crate holds the tagged [`Value`] type, the
//! reference-counted heap objects behind it, the arena that backs them, and
//! the coercion and formatting rules that convert between value kinds.

#![allow(clippy::collapsible_if)]
#![allow(clippy::collapsible_else_if)]

pub mod core;
pub mod errors;
pub mod capabilities;

mod bridge;
mod context;
mod state;

// Re-exports from core/
pub use core::arena::{tags, AllocTag, Arena, TagStat, Ticket};
pub use core::array::{
    clone_value, deep_update, make_array, make_array_ref, set_element, set_element_checked,
};
pub use core::convert::assign_value;
pub use core::heap::{ArrayValue, AssetArray, ElementVec, HeapObject, ObjRef};
pub use core::render::{double_to_text, float_to_text, ip_address_to_text, time_zone_to_text};
pub use core::value::{BlobView, StrView, Value, ValueSlot};

// Re-exports from the boundary modules
pub use bridge::{Bridge, ValueId};
pub use capabilities::{
    Capabilities, DatePresenter, JsonBridge, NativeVars, NullJsonBridge, RawMillisPresenter,
    StdJsonStore,
};
pub use context::{Context, ContextConfig};
pub use errors::ValueError;
pub use state::{ComponentExecState, FlowState, StateId, StateTable};

// Core types shared with the asset tooling
pub use rheo_core::{find_derived_unit, NumberFormat, Unit, ValueKind};
