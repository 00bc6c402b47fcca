//! The debugger monitor: machine state plus the expression evaluator.

use cpu::State;
use expr::{Context, ExprError, Options};
use memory::{MapError, VirtualMemory};
use symbols::SymbolMap;

use std::u32;

/// Owns the inspected machine and evaluates expressions against it.
#[derive(Debug)]
pub struct Monitor<M: VirtualMemory> {
    state: State,
    mem: M,
    symbols: SymbolMap,
    options: Options,
}

impl<M: VirtualMemory> Monitor<M> {
    pub fn new(state: State, mem: M) -> Self {
        Self {
            state,
            mem,
            symbols: SymbolMap::new(),
            options: Options::default(),
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut State {
        &mut self.state
    }

    pub fn mem(&self) -> &M {
        &self.mem
    }

    pub fn mem_mut(&mut self) -> &mut M {
        &mut self.mem
    }

    pub fn symbols(&self) -> &SymbolMap {
        &self.symbols
    }

    pub fn symbols_mut(&mut self) -> &mut SymbolMap {
        &mut self.symbols
    }

    pub fn options(&self) -> Options {
        self.options
    }

    pub fn set_options(&mut self, options: Options) {
        self.options = options;
    }

    /// Maps `image` into guest memory at `base`.
    ///
    /// An image running past the end of the address space is truncated.
    pub fn load_image(&mut self, base: u32, image: &[u8], name: &str) -> Result<(), MapError> {
        if image.is_empty() {
            return Err(MapError::Empty);
        }

        let last = u64::from(base) + image.len() as u64 - 1;
        let end = if last > u64::from(u32::MAX) {
            warn!("image '{}' exceeds the address space, truncating", name);
            u32::MAX
        } else {
            last as u32
        };

        info!("mapping '{}' at {:#010x}..={:#010x}", name, base, end);
        self.mem.add_mapping(base..=end, image, name)
    }

    /// Evaluates `expr` against the current machine state.
    pub fn evaluate(&self, expr: &str) -> Result<u32, ExprError> {
        Context::new(&self.state, &self.mem, &self.symbols)
            .with_options(self.options)
            .evaluate(expr)
    }
}
