//! Flow and component execution state storage.
//!
//! The engine owns the semantics of flow execution; this core holds the
//! records. A flow state lives in a slot table and its identity is the slot
//! index, a plain integer that can cross a serialization boundary. Freeing a
//! state releases every value it still owns, recursively — the cancellation
//! primitive.

use crate::core::arena::{fast_map_new, tags, Arena, FastHashMap, Ticket};
use crate::core::value::Value;
use crate::errors::ValueError;
use std::any::Any;
use std::fmt;

/// Identity of a flow state: the slot index, stable for the record's
/// lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateId(pub u32);

impl StateId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn from_index(index: usize) -> Self {
        Self(index as u32)
    }
}

/// Per-component execution state: the typed record a component keeps between
/// ticks, plus the values exchanged at resume time.
#[derive(Default)]
pub struct ComponentExecState {
    pub resume_values: Vec<Value>,
    payload: Option<Box<dyn Any>>,
}

impl ComponentExecState {
    pub fn set_payload<T: Any>(&mut self, payload: T) {
        self.payload = Some(Box::new(payload));
    }

    pub fn payload<T: Any>(&self) -> Option<&T> {
        self.payload.as_ref().and_then(|p| p.downcast_ref())
    }

    pub fn payload_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.payload.as_mut().and_then(|p| p.downcast_mut())
    }
}

/// One executing flow instance.
pub struct FlowState {
    pub flow_index: i32,
    components: FastHashMap<u32, ComponentExecState>,
    async_pending: u32,
    _ticket: Ticket,
}

impl FlowState {
    pub fn component_state(&self, component: u32) -> Option<&ComponentExecState> {
        self.components.get(&component)
    }

    pub fn component_state_mut(&mut self, component: u32) -> &mut ComponentExecState {
        self.components.entry(component).or_default()
    }

    /// Drop a component's record, releasing its values.
    pub fn free_component_state(&mut self, component: u32) {
        self.components.remove(&component);
    }

    /// Mark one component as waiting on deferred work. Asynchrony is state,
    /// not a blocking call; the component resumes on a later tick.
    pub fn start_async(&mut self) {
        self.async_pending += 1;
    }

    pub fn end_async(&mut self) {
        self.async_pending = self.async_pending.saturating_sub(1);
    }

    pub fn async_pending(&self) -> u32 {
        self.async_pending
    }
}

impl fmt::Debug for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowState")
            .field("flow_index", &self.flow_index)
            .field("components", &self.components.len())
            .field("async_pending", &self.async_pending)
            .finish()
    }
}

/// Slot table of flow states: stable indices, freed slots reused.
pub struct StateTable {
    slots: Vec<Option<FlowState>>,
    free_list: Vec<usize>,
}

impl StateTable {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// Allocate a state record, drawing its bytes from the arena.
    pub fn alloc(&mut self, arena: &Arena, flow_index: i32) -> Result<StateId, ValueError> {
        let ticket = arena.try_reserve(std::mem::size_of::<FlowState>(), tags::FLOW_STATE)?;
        let state = FlowState {
            flow_index,
            components: fast_map_new(),
            async_pending: 0,
            _ticket: ticket,
        };
        if let Some(index) = self.free_list.pop() {
            self.slots[index] = Some(state);
            Ok(StateId::from_index(index))
        } else {
            let index = self.slots.len();
            self.slots.push(Some(state));
            Ok(StateId::from_index(index))
        }
    }

    /// Discard a state, releasing every value it still owns.
    pub fn free(&mut self, id: StateId) -> Result<(), ValueError> {
        let slot = self
            .slots
            .get_mut(id.index())
            .ok_or(ValueError::InvalidHandle)?;
        if slot.take().is_none() {
            return Err(ValueError::InvalidHandle);
        }
        self.free_list.push(id.index());
        Ok(())
    }

    pub fn get(&self, id: StateId) -> Option<&FlowState> {
        self.slots.get(id.index()).and_then(|s| s.as_ref())
    }

    pub fn get_mut(&mut self, id: StateId) -> Option<&mut FlowState> {
        self.slots.get_mut(id.index()).and_then(|s| s.as_mut())
    }

    /// Number of live states.
    pub fn live(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

impl Default for StateTable {
    fn default() -> Self {
        Self::new()
    }
}
