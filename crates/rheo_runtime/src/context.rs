//! Context object and configuration.
//!
//! The context replaces the original's process-wide memory region and hook
//! globals: one explicitly constructed object owning the arena, the
//! capability set, and the flow-state table, passed by reference into every
//! operation that allocates or resolves.

use crate::capabilities::{Capabilities, DatePresenter, JsonBridge, NativeVars};
use crate::core::arena::Arena;
use crate::state::StateTable;
use std::cell::RefCell;

/// Configuration options for a context.
#[derive(Clone, Copy, Debug)]
pub struct ContextConfig {
    /// Byte budget of the arena backing all heap objects and state records.
    pub arena_capacity: usize,
    /// Glyph rendered for infinite numeric values. `None` falls back to the
    /// platform spelling.
    pub infinity_symbol: Option<&'static str>,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            arena_capacity: 512 * 1024,
            infinity_symbol: Some("\u{221e}"),
        }
    }
}

pub struct Context {
    arena: Arena,
    capabilities: Capabilities,
    states: RefCell<StateTable>,
    infinity_symbol: Option<&'static str>,
}

impl Context {
    pub fn new() -> Self {
        Self::with_config(ContextConfig::default())
    }

    pub fn with_config(config: ContextConfig) -> Self {
        Self {
            arena: Arena::with_capacity(config.arena_capacity),
            capabilities: Capabilities::default(),
            states: RefCell::new(StateTable::new()),
            infinity_symbol: config.infinity_symbol,
        }
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn set_json_bridge(&mut self, bridge: Box<dyn JsonBridge>) {
        self.capabilities.json = bridge;
    }

    pub fn set_native_vars(&mut self, source: Box<dyn NativeVars>) {
        self.capabilities.native_vars = Some(source);
    }

    pub fn set_date_presenter(&mut self, presenter: Box<dyn DatePresenter>) {
        self.capabilities.date = presenter;
    }

    pub fn states(&self) -> &RefCell<StateTable> {
        &self.states
    }

    pub fn infinity_symbol(&self) -> Option<&'static str> {
        self.infinity_symbol
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
