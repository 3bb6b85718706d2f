//! Integer-handle surface for the script-hosted export layer.
//!
//! The export layer passes identity across a serialization boundary as plain
//! integers, so it never sees a `Value` directly: it creates values into a
//! slot table, refers to them by [`ValueId`], and must free every counted
//! value it allocated. This is the most constrained caller of the core — it
//! only gets the bounds-checked element setter, and handle misuse is an
//! error, never undefined behavior.

use crate::context::Context;
use crate::core::arena::tags;
use crate::core::array::{deep_update, make_array_ref, set_element_checked};
use crate::core::value::Value;
use crate::errors::ValueError;
use crate::state::StateId;
use rheo_core::ValueKind;

/// Handle to a value slot owned by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueId(pub u32);

impl ValueId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Value slot table plus the global-variable table of the loaded flow
/// definition.
pub struct Bridge {
    values: Vec<Option<Value>>,
    free_list: Vec<usize>,
    globals: Vec<Value>,
}

impl Bridge {
    pub fn new(global_count: usize) -> Self {
        Self {
            values: Vec::new(),
            free_list: Vec::new(),
            globals: vec![Value::Null; global_count],
        }
    }

    fn store(&mut self, value: Value) -> ValueId {
        if let Some(index) = self.free_list.pop() {
            self.values[index] = Some(value);
            ValueId(index as u32)
        } else {
            let index = self.values.len();
            self.values.push(Some(value));
            ValueId(index as u32)
        }
    }

    pub fn create_undefined_value(&mut self) -> ValueId {
        self.store(Value::Undefined)
    }

    pub fn create_null_value(&mut self) -> ValueId {
        self.store(Value::Null)
    }

    pub fn create_boolean_value(&mut self, value: bool) -> ValueId {
        self.store(Value::Boolean(value))
    }

    pub fn create_int_value(&mut self, value: i32) -> ValueId {
        self.store(Value::Int32(value))
    }

    pub fn create_double_value(&mut self, value: f64) -> ValueId {
        self.store(Value::double(value))
    }

    pub fn create_stream_value(&mut self, id: i32) -> ValueId {
        self.store(Value::Stream(id))
    }

    pub fn create_date_value(&mut self, ms: f64) -> ValueId {
        self.store(Value::Date(ms))
    }

    /// Counted string; fails when the arena is exhausted.
    pub fn create_string_value(
        &mut self,
        ctx: &Context,
        text: &str,
    ) -> Result<ValueId, ValueError> {
        let value = Value::make_string_ref(ctx, text, tags::BRIDGE_STRING);
        if value.is_null() {
            return Err(ValueError::OutOfMemory);
        }
        Ok(self.store(value))
    }

    /// Counted array; fails when the arena is exhausted.
    pub fn create_array_value(
        &mut self,
        ctx: &Context,
        size: usize,
        element_kind: ValueKind,
    ) -> Result<ValueId, ValueError> {
        let value = make_array_ref(ctx, size, element_kind, tags::BRIDGE_ARRAY);
        if value.is_null() {
            return Err(ValueError::OutOfMemory);
        }
        Ok(self.store(value))
    }

    pub fn value(&self, id: ValueId) -> Result<&Value, ValueError> {
        self.values
            .get(id.index())
            .and_then(|slot| slot.as_ref())
            .ok_or(ValueError::InvalidHandle)
    }

    /// Release a slot. The export layer must balance every create with one
    /// free.
    pub fn value_free(&mut self, id: ValueId) -> Result<(), ValueError> {
        let slot = self
            .values
            .get_mut(id.index())
            .ok_or(ValueError::InvalidHandle)?;
        if slot.take().is_none() {
            return Err(ValueError::InvalidHandle);
        }
        self.free_list.push(id.index());
        Ok(())
    }

    /// Number of live slots; diagnostics.
    pub fn live_values(&self) -> usize {
        self.values.iter().filter(|slot| slot.is_some()).count()
    }

    /// Bounds-checked element write into an array value.
    pub fn array_set_element(
        &mut self,
        array: ValueId,
        index: usize,
        element: ValueId,
    ) -> Result<(), ValueError> {
        let element = self.value(element)?.clone();
        let array = self.value(array)?;
        set_element_checked(array, index, element)
    }

    pub fn global(&self, index: usize) -> Result<&Value, ValueError> {
        self.globals.get(index).ok_or(ValueError::InvalidHandle)
    }

    /// Replace a global variable wholesale.
    pub fn set_global(&mut self, index: usize, value: ValueId) -> Result<(), ValueError> {
        let value = self.value(value)?.clone();
        let slot = self
            .globals
            .get_mut(index)
            .ok_or(ValueError::InvalidHandle)?;
        *slot = value;
        Ok(())
    }

    /// Broadcast an updated array-typed global into every existing alias of
    /// it, leaf by leaf, without reallocating.
    pub fn update_global(&mut self, index: usize, value: ValueId) -> Result<(), ValueError> {
        let src = self.value(value)?.clone();
        let dst = self
            .globals
            .get(index)
            .ok_or(ValueError::InvalidHandle)?;
        deep_update(dst, &src);
        Ok(())
    }

    /// Install an engine-owned value directly as a global (flow definition
    /// loading).
    pub fn install_global(&mut self, index: usize, value: Value) -> Result<(), ValueError> {
        let slot = self
            .globals
            .get_mut(index)
            .ok_or(ValueError::InvalidHandle)?;
        *slot = value;
        Ok(())
    }

    /// Index of the flow a state executes, `None` for a stale handle.
    pub fn flow_index(&self, ctx: &Context, state: StateId) -> Option<i32> {
        ctx.states().borrow().get(state).map(|s| s.flow_index)
    }

    pub fn start_async_execution(&mut self, ctx: &Context, state: StateId) -> Result<(), ValueError> {
        let mut states = ctx.states().borrow_mut();
        let flow = states.get_mut(state).ok_or(ValueError::InvalidHandle)?;
        flow.start_async();
        Ok(())
    }

    pub fn end_async_execution(&mut self, ctx: &Context, state: StateId) -> Result<(), ValueError> {
        let mut states = ctx.states().borrow_mut();
        let flow = states.get_mut(state).ok_or(ValueError::InvalidHandle)?;
        flow.end_async();
        Ok(())
    }

    /// Integer execution-state record of a component, `None` when absent.
    pub fn component_execution_state(
        &self,
        ctx: &Context,
        state: StateId,
        component: u32,
    ) -> Option<i32> {
        let states = ctx.states().borrow();
        states
            .get(state)?
            .component_state(component)?
            .payload::<i32>()
            .copied()
    }

    /// Set or clear a component's integer execution-state record.
    pub fn set_component_execution_state(
        &mut self,
        ctx: &Context,
        state: StateId,
        component: u32,
        value: Option<i32>,
    ) -> Result<(), ValueError> {
        let mut states = ctx.states().borrow_mut();
        let flow = states.get_mut(state).ok_or(ValueError::InvalidHandle)?;
        match value {
            Some(v) => flow.component_state_mut(component).set_payload(v),
            None => flow.free_component_state(component),
        }
        Ok(())
    }
}
