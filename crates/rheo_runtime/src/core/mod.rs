//! Value representation and memory core.

pub mod arena;
pub mod array;
pub mod convert;
pub mod heap;
pub mod render;
pub mod value;

pub use arena::{Arena, AllocTag, TagStat, Ticket};
pub use heap::{ArrayValue, AssetArray, HeapObject, ObjRef};
pub use value::Value;
