//! Fixed-capacity arena with per-call-site allocation accounting.
//!
//! The arena does not hand out raw storage; it holds the single byte budget
//! every heap object and state record must fit into. A successful
//! reservation yields a [`Ticket`] whose drop returns the bytes, so balance
//! is enforced by ownership rather than by paired free calls. Exhaustion is
//! a first-class outcome: there is no fallback allocation on the embedded
//! target.

use crate::errors::ValueError;
use ahash::RandomState;
use hashbrown::HashMap;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

pub type FastHashMap<K, V> = HashMap<K, V, RandomState>;

pub fn fast_hasher() -> RandomState {
    RandomState::with_seeds(0, 0, 0, 0)
}

pub fn fast_map_new<K: Eq + Hash, V>() -> FastHashMap<K, V> {
    HashMap::with_hasher(fast_hasher())
}

/// Opaque call-site id carried by every reservation. Diagnostics only; never
/// used for logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AllocTag(pub &'static str);

impl fmt::Display for AllocTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Call-site tags used by the value constructors in this crate.
pub mod tags {
    use super::AllocTag;

    pub const STRING_REF: AllocTag = AllocTag("string-ref");
    pub const STRING_CONCAT: AllocTag = AllocTag("string-concat");
    pub const TO_STRING: AllocTag = AllocTag("to-string");
    pub const BLOB_REF: AllocTag = AllocTag("blob-ref");
    pub const ARRAY_REF: AllocTag = AllocTag("array-ref");
    pub const ARRAY_CLONE: AllocTag = AllocTag("array-clone");
    pub const ARRAY_ELEMENT_REF: AllocTag = AllocTag("array-element-ref");
    pub const JSON_MEMBER_REF: AllocTag = AllocTag("json-member-ref");
    pub const FLOW_STATE: AllocTag = AllocTag("flow-state");
    pub const BRIDGE_STRING: AllocTag = AllocTag("bridge-string");
    pub const BRIDGE_ARRAY: AllocTag = AllocTag("bridge-array");
}

/// Live object count and byte total attributed to one tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagStat {
    pub live: usize,
    pub bytes: usize,
}

#[derive(PartialEq)]
struct ArenaInner {
    capacity: usize,
    used: Cell<usize>,
    peak: Cell<usize>,
    live: Cell<usize>,
    stats: RefCell<FastHashMap<AllocTag, TagStat>>,
}

/// Cheap clonable handle over one fixed-capacity byte budget. Passed by
/// reference into every operation that allocates; there are no process-wide
/// statics.
#[derive(Clone)]
pub struct Arena {
    inner: Rc<ArenaInner>,
}

impl Arena {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Rc::new(ArenaInner {
                capacity,
                used: Cell::new(0),
                peak: Cell::new(0),
                live: Cell::new(0),
                stats: RefCell::new(fast_map_new()),
            }),
        }
    }

    /// Reserve `bytes` for one object. The returned ticket releases them on
    /// drop.
    pub fn try_reserve(&self, bytes: usize, tag: AllocTag) -> Result<Ticket, ValueError> {
        let inner = &self.inner;
        let used = inner.used.get();
        let new_used = used.checked_add(bytes).ok_or(ValueError::OutOfMemory)?;
        if new_used > inner.capacity {
            return Err(ValueError::OutOfMemory);
        }
        inner.used.set(new_used);
        if new_used > inner.peak.get() {
            inner.peak.set(new_used);
        }
        inner.live.set(inner.live.get() + 1);
        {
            let mut stats = inner.stats.borrow_mut();
            let stat = stats.entry(tag).or_default();
            stat.live += 1;
            stat.bytes += bytes;
        }
        Ok(Ticket {
            arena: Rc::clone(inner),
            bytes,
            tag,
        })
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    pub fn used(&self) -> usize {
        self.inner.used.get()
    }

    pub fn available(&self) -> usize {
        self.inner.capacity - self.inner.used.get()
    }

    /// High-water mark over the arena's lifetime.
    pub fn peak(&self) -> usize {
        self.inner.peak.get()
    }

    /// Number of live reservations.
    pub fn live_objects(&self) -> usize {
        self.inner.live.get()
    }

    /// Live count and bytes attributed to one call-site tag.
    pub fn tag_stat(&self, tag: AllocTag) -> TagStat {
        self.inner
            .stats
            .borrow()
            .get(&tag)
            .copied()
            .unwrap_or_default()
    }

    /// Snapshot of every tag's live stats, sorted by tag name for stable
    /// diagnostics output.
    pub fn stats(&self) -> Vec<(AllocTag, TagStat)> {
        let mut out: Vec<_> = self
            .inner
            .stats
            .borrow()
            .iter()
            .map(|(tag, stat)| (*tag, *stat))
            .collect();
        out.sort_by_key(|(tag, _)| tag.0);
        out
    }
}

impl fmt::Debug for Arena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("capacity", &self.capacity())
            .field("used", &self.used())
            .field("live", &self.live_objects())
            .finish()
    }
}

/// One live reservation. Drop returns the bytes to the arena.
#[derive(PartialEq)]
pub struct Ticket {
    arena: Rc<ArenaInner>,
    bytes: usize,
    tag: AllocTag,
}

impl Ticket {
    pub fn bytes(&self) -> usize {
        self.bytes
    }

    pub fn tag(&self) -> AllocTag {
        self.tag
    }

    /// Extend this reservation by `extra` bytes. On failure the ticket is
    /// unchanged, so dropping it rolls the whole reservation back — the
    /// two-phase header/payload construction contract.
    pub fn try_grow(&mut self, extra: usize) -> Result<(), ValueError> {
        let inner = &self.arena;
        let used = inner.used.get();
        let new_used = used.checked_add(extra).ok_or(ValueError::OutOfMemory)?;
        if new_used > inner.capacity {
            return Err(ValueError::OutOfMemory);
        }
        inner.used.set(new_used);
        if new_used > inner.peak.get() {
            inner.peak.set(new_used);
        }
        if let Some(stat) = inner.stats.borrow_mut().get_mut(&self.tag) {
            stat.bytes += extra;
        }
        self.bytes += extra;
        Ok(())
    }
}

impl Drop for Ticket {
    fn drop(&mut self) {
        let inner = &self.arena;
        inner.used.set(inner.used.get().saturating_sub(self.bytes));
        inner.live.set(inner.live.get().saturating_sub(1));
        if let Some(stat) = inner.stats.borrow_mut().get_mut(&self.tag) {
            stat.live = stat.live.saturating_sub(1);
            stat.bytes = stat.bytes.saturating_sub(self.bytes);
        }
    }
}

impl fmt::Debug for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ticket")
            .field("bytes", &self.bytes)
            .field("tag", &self.tag)
            .finish()
    }
}
