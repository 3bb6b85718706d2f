//! Error surface shared by the arena, coercions, and the bridge.

use std::fmt;

pub mod messages {
    pub const OUT_OF_MEMORY: &str = "Out of memory";
    pub const COERCION_FAILED: &str = "Coercion failed";
    pub const INDEX_OUT_OF_BOUNDS: &str = "Index out of bounds";
    pub const INVALID_HANDLE: &str = "Invalid handle";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueError {
    /// The arena budget is exhausted. Value constructors translate this into
    /// a null-kind value; handle-based APIs surface it directly.
    OutOfMemory,
    /// A conversion could not produce a meaningful value. Callers that ignore
    /// it use the per-type defaults (`0`, `false`, `NaN`).
    CoercionFailed,
    /// Bounds-checked array access at an external boundary.
    IndexOutOfRange { index: usize, len: usize },
    /// A bridge handle that does not refer to a live slot.
    InvalidHandle,
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueError::OutOfMemory => f.write_str(messages::OUT_OF_MEMORY),
            ValueError::CoercionFailed => f.write_str(messages::COERCION_FAILED),
            ValueError::IndexOutOfRange { index, len } => {
                write!(f, "{} (index={index}, len={len})", messages::INDEX_OUT_OF_BOUNDS)
            }
            ValueError::InvalidHandle => f.write_str(messages::INVALID_HANDLE),
        }
    }
}

impl std::error::Error for ValueError {}
