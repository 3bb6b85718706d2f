//! Heap object variants and the shared-ownership wrapper.
//!
//! Every reference-counted payload lives in one cell type behind [`ObjRef`].
//! Cloning a value that holds an `ObjRef` is the retain; dropping it is the
//! release; the last drop frees the cell and its arena ticket returns the
//! bytes. Engine-owned array storage (global variables) uses the same cell
//! without a ticket.

use crate::core::arena::Ticket;
use crate::core::value::Value;
use rheo_core::ValueKind;
use smallvec::SmallVec;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

pub type ElementVec = SmallVec<[Value; 4]>;

/// Length-prefixed, in-place sequence of values.
pub struct ArrayValue {
    pub element_kind: ValueKind,
    pub values: ElementVec,
}

impl ArrayValue {
    /// New array with every slot defaulted to null.
    pub fn with_size(size: usize, element_kind: ValueKind) -> Self {
        let mut values = ElementVec::new();
        values.resize(size, Value::Null);
        Self {
            element_kind,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Immutable, address-relative array view into static asset data. Asset
/// arrays are never reference-counted and must not be freed.
pub struct AssetArray {
    pub element_kind: ValueKind,
    pub values: &'static [Value],
}

pub enum HeapObject {
    Str(String),
    Array(ArrayValue),
    Blob(Box<[u8]>),
    /// Indirection: the value at `index` of `array`.
    ArrayElement { array: Value, index: usize },
    /// Indirection: the member named by `member` of the JSON document
    /// `json`.
    JsonMember { json: Value, member: Value },
}

struct HeapCell {
    /// `None` for engine-owned storage outside the arena budget.
    ticket: Option<Ticket>,
    object: RefCell<HeapObject>,
}

/// Shared-ownership handle to a heap cell. Clone retains, drop releases,
/// the last release frees.
#[derive(Clone)]
pub struct ObjRef(Rc<HeapCell>);

impl ObjRef {
    /// Arena-counted cell. The ticket must already cover header and payload.
    pub fn counted(object: HeapObject, ticket: Ticket) -> Self {
        Self(Rc::new(HeapCell {
            ticket: Some(ticket),
            object: RefCell::new(object),
        }))
    }

    /// Engine-owned cell outside the arena budget (global variable storage).
    pub fn engine_owned(object: HeapObject) -> Self {
        Self(Rc::new(HeapCell {
            ticket: None,
            object: RefCell::new(object),
        }))
    }

    #[inline]
    pub fn borrow(&self) -> Ref<'_, HeapObject> {
        self.0.object.borrow()
    }

    #[inline]
    pub fn borrow_mut(&self) -> RefMut<'_, HeapObject> {
        self.0.object.borrow_mut()
    }

    /// Storage identity. Array equality is defined over this, not content.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Stable address of the cell for identity comparison across kinds.
    #[inline]
    pub fn address(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }

    /// Number of values currently sharing this cell.
    #[inline]
    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    /// Whether this cell draws from the arena budget.
    #[inline]
    pub fn is_counted(&self) -> bool {
        self.0.ticket.is_some()
    }
}

impl fmt::Debug for ObjRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjRef({:#x}, rc={})", self.address(), self.ref_count())
    }
}

/// Byte cost charged to the arena for one cell header.
pub(crate) fn cell_header_size() -> usize {
    std::mem::size_of::<HeapCell>()
}
