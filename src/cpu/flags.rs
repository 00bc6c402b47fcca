//! x86 status flag (`EFLAGS`) structures and utilities.
//!
//! Note that we don't model all flags in the register. The monitor only
//! displays them and lets `$eflags` be used in expressions.

bitflags! {
    /// A bitmask carrying any combination of x86 status flags.
    ///
    /// Bit positions match those in `EFLAGS`.
    pub struct Flags: u32 {
        /// Carry flag.
        const CF = 1 << 0;
        /// Reserved, always reads as 1.
        const RESERVED = 1 << 1;
        /// Parity flag.
        const PF = 1 << 2;
        /// Adjust flag (or Auxiliary Carry Flag).
        const AF = 1 << 4;
        /// Zero flag.
        const ZF = 1 << 6;
        /// Sign flag.
        const SF = 1 << 7;
        /// Trap flag.
        const TF = 1 << 8;
        /// Interrupt enable flag.
        const IF = 1 << 9;
        /// Direction flag.
        const DF = 1 << 10;
        /// Overflow.
        const OF = 1 << 11;
    }
}

impl Flags {
    /// Converts a raw `EFLAGS` value, dropping bits we don't model.
    pub fn from_eflags(eflags: u32) -> Self {
        Flags::from_bits_truncate(eflags) | Flags::RESERVED
    }

    pub fn to_eflags(&self) -> u32 {
        self.bits()
    }
}

impl Default for Flags {
    fn default() -> Self {
        Flags::RESERVED
    }
}
