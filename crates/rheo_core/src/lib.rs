//! Core types for the rheo flow runtime.
//!
//! This crate contains the fundamental types that are independent of the
//! runtime:
//! - `ValueKind` - the closed kind enumeration every value operation matches on
//! - `Unit` - measurement units with display names and prefix tables
//! - `NumberFormat` - formatting option flags carried by numeric values

pub mod kind;
pub mod unit;

pub use kind::ValueKind;
pub use unit::{find_derived_unit, NumberFormat, Unit};
