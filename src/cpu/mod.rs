//! Emulated i386 CPU state, as seen by the monitor.

mod flags;
mod state;
pub mod jmp;
pub mod reg;

pub use self::flags::Flags;
pub use self::reg::Register;
pub use self::state::State;

/// Trait for register files that can be queried by name.
///
/// Names are lowercase and carry no `$` sigil (`eax`, `ax`, `ah`, `eip`).
pub trait RegisterFile {
    /// Returns the zero-extended value of the register called `name`, or
    /// `None` if there is no such register.
    fn read_register(&self, name: &str) -> Option<u32>;
}
