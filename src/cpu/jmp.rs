//! Relative near jumps (`jmp rel8`, `jmp rel16`, `jmp rel32`).
//!
//! The displacement is relative to the address of the *next* instruction, so
//! the target is `eip + len + displacement`, where `len` covers the opcode byte
//! and the displacement. All address arithmetic wraps at 4 GB.

use cpu::State;
use memory::{MemoryError, VirtualMemory};

use num_traits::{PrimInt, Signed};

use std::fmt;
use std::mem;

/// Signed displacement type of a relative jump.
pub trait Displacement: PrimInt + Signed + Into<i32> + fmt::Debug {
    /// Loads a displacement of this size from memory.
    fn load<M: VirtualMemory>(mem: &M, virt_addr: u32) -> Result<Self, MemoryError>;
}

impl Displacement for i8 {
    fn load<M: VirtualMemory>(mem: &M, virt_addr: u32) -> Result<Self, MemoryError> {
        Ok(mem.load(virt_addr)? as i8)
    }
}

impl Displacement for i16 {
    fn load<M: VirtualMemory>(mem: &M, virt_addr: u32) -> Result<Self, MemoryError> {
        mem.load_i16(virt_addr)
    }
}

impl Displacement for i32 {
    fn load<M: VirtualMemory>(mem: &M, virt_addr: u32) -> Result<Self, MemoryError> {
        mem.load_i32(virt_addr)
    }
}

/// An unconditional relative jump with a displacement of type `D`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct JumpRel<D: Displacement> {
    displacement: D,
}

impl<D: Displacement> JumpRel<D> {
    pub fn new(displacement: D) -> Self {
        Self { displacement }
    }

    /// Fetches the displacement of the jump whose opcode byte is at `eip`.
    pub fn fetch<M: VirtualMemory>(mem: &M, eip: u32) -> Result<Self, MemoryError> {
        D::load(mem, eip.wrapping_add(1)).map(Self::new)
    }

    pub fn displacement(&self) -> D {
        self.displacement
    }

    /// Length of the instruction in bytes (opcode plus displacement).
    pub fn len(&self) -> u32 {
        1 + mem::size_of::<D>() as u32
    }

    /// Whether this jump goes to a lower address than the next instruction.
    pub fn is_backward(&self) -> bool {
        self.displacement.is_negative()
    }

    /// Computes the jump target for a `jmp` located at `eip`.
    pub fn target(&self, eip: u32) -> u32 {
        let disp: i32 = self.displacement.into();
        eip.wrapping_add(self.len()).wrapping_add(disp as u32)
    }

    /// Performs the jump, assuming `state.eip()` points at its opcode byte.
    ///
    /// Returns the new `eip`.
    pub fn execute(&self, state: &mut State) -> u32 {
        let target = self.target(state.eip());
        trace!("jmp {:?} from {:#010x} to {:#010x}", self.displacement, state.eip(), target);
        state.set_eip(target);
        target
    }

    /// Disassembles the jump located at `eip`, printing the absolute target.
    pub fn disassemble(&self, eip: u32) -> String {
        format!("jmp {:x}", self.target(eip))
    }
}
