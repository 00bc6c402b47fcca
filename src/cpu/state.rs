//! x86 processor state.

use cpu::{Flags, Register, RegisterFile};

use std::fmt;

/// CPU state consisting of the emulated registers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    eax: u32,
    ebx: u32,
    ecx: u32,
    edx: u32,

    esi: u32,
    edi: u32,
    ebp: u32,
    esp: u32,

    eip: u32,
    flags: Flags,
}

impl State {
    /// Create a new state with all general purpose registers cleared.
    ///
    /// # Parameters
    ///
    /// * `eip`: Initial value for `eip` (address of the next instruction).
    /// * `esp`: Initial value for the stack pointer.
    pub fn new(eip: u32, esp: u32) -> Self {
        Self {
            eax: 0,
            ebx: 0,
            ecx: 0,
            edx: 0,
            esi: 0,
            edi: 0,
            ebp: 0,
            esp,
            eip,
            flags: Flags::default(),
        }
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn set_flags(&mut self, flags: Flags) {
        self.flags = flags;
    }

    /// Reads any register, zero-extended to 32 bits.
    pub fn get_register(&self, reg: Register) -> u32 {
        use cpu::Register::*;

        match reg {
            Eax => self.eax(),
            Ecx => self.ecx(),
            Edx => self.edx(),
            Ebx => self.ebx(),
            Esp => self.esp(),
            Ebp => self.ebp(),
            Esi => self.esi(),
            Edi => self.edi(),
            Ax => self.ax().into(),
            Cx => self.cx().into(),
            Dx => self.dx().into(),
            Bx => self.bx().into(),
            Sp => self.sp().into(),
            Bp => self.bp().into(),
            Si => self.si().into(),
            Di => self.di().into(),
            Al => self.al().into(),
            Cl => self.cl().into(),
            Dl => self.dl().into(),
            Bl => self.bl().into(),
            Ah => self.ah().into(),
            Ch => self.ch().into(),
            Dh => self.dh().into(),
            Bh => self.bh().into(),
            Eip => self.eip(),
            Eflags => self.flags.to_eflags(),
        }
    }

    /// Writes any register.
    ///
    /// `value` is truncated to the size of `reg`. Writing to a sub-register
    /// leaves the remaining bits of the containing register untouched.
    pub fn set_register(&mut self, reg: Register, value: u32) {
        use cpu::Register::*;

        match reg {
            Eax => self.set_eax(value),
            Ecx => self.set_ecx(value),
            Edx => self.set_edx(value),
            Ebx => self.set_ebx(value),
            Esp => self.set_esp(value),
            Ebp => self.set_ebp(value),
            Esi => self.set_esi(value),
            Edi => self.set_edi(value),
            Ax => self.set_ax(value as u16),
            Cx => self.set_cx(value as u16),
            Dx => self.set_dx(value as u16),
            Bx => self.set_bx(value as u16),
            Sp => self.set_sp(value as u16),
            Bp => self.set_bp(value as u16),
            Si => self.set_si(value as u16),
            Di => self.set_di(value as u16),
            Al => self.set_al(value as u8),
            Cl => self.set_cl(value as u8),
            Dl => self.set_dl(value as u8),
            Bl => self.set_bl(value as u8),
            Ah => self.set_ah(value as u8),
            Ch => self.set_ch(value as u8),
            Dh => self.set_dh(value as u8),
            Bh => self.set_bh(value as u8),
            Eip => self.set_eip(value),
            Eflags => self.set_flags(Flags::from_eflags(value)),
        }
    }
}

macro_rules! accessors {
    (
        $base:ident: [ $getter32:ident/$setter32:ident ]
    ) => {
        pub fn $getter32(&self) -> u32 { self.$base }
        pub fn $setter32(&mut self, value: u32) { self.$base = value; }
    };
    (
        $base:ident: [ $getter32:ident/$setter32:ident, $getter16:ident/$setter16:ident ]
    ) => {
        pub fn $getter32(&self) -> u32 { self.$base }
        pub fn $setter32(&mut self, value: u32) { self.$base = value; }
        pub fn $getter16(&self) -> u16 { self.$base as u16 }
        pub fn $setter16(&mut self, value: u16) { self.$base = (self.$base & 0xFFFF0000) | (value as u32); }
    };
    (
        $base:ident: [ $getter32:ident/$setter32:ident, $getter16:ident/$setter16:ident, $getter8h:ident/$setter8h:ident, $getter8l:ident/$setter8l:ident ]
    ) => {
        pub fn $getter32(&self) -> u32 { self.$base }
        pub fn $setter32(&mut self, value: u32) { self.$base = value; }
        pub fn $getter16(&self) -> u16 { self.$base as u16 }
        pub fn $setter16(&mut self, value: u16) { self.$base = (self.$base & 0xFFFF0000) | (value as u32); }
        pub fn $getter8h(&self) -> u8 { (self.$base >> 8) as u8 }
        pub fn $setter8h(&mut self, value: u8) { self.$base = (self.$base & 0xFFFF00FF) | (value as u32) << 8; }
        pub fn $getter8l(&self) -> u8 { self.$base as u8 }
        pub fn $setter8l(&mut self, value: u8) { self.$base = (self.$base & 0xFFFFFF00) | (value as u32); }
    };
}

impl State {
    accessors!(eax: [eax/set_eax, ax/set_ax, ah/set_ah, al/set_al]);
    accessors!(ebx: [ebx/set_ebx, bx/set_bx, bh/set_bh, bl/set_bl]);
    accessors!(ecx: [ecx/set_ecx, cx/set_cx, ch/set_ch, cl/set_cl]);
    accessors!(edx: [edx/set_edx, dx/set_dx, dh/set_dh, dl/set_dl]);
    accessors!(esi: [esi/set_esi, si/set_si]);
    accessors!(edi: [edi/set_edi, di/set_di]);
    accessors!(ebp: [ebp/set_ebp, bp/set_bp]);
    accessors!(esp: [esp/set_esp, sp/set_sp]);
    accessors!(eip: [eip/set_eip]);
}

/// Register lookup by name, as used by `$name` in expressions.
impl RegisterFile for State {
    fn read_register(&self, name: &str) -> Option<u32> {
        Register::from_name(name).map(|reg| self.get_register(reg))
    }
}

/// Prints the 32-bit registers, `eip` and `eflags`, one per line.
impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for reg in Register::all().filter(|reg| reg.size().bytes() == 4) {
            writeln!(f, "{:<8}{:#010x}  {}", reg.name(), self.get_register(reg), self.get_register(reg))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors() {
        let mut state = State::new(0, 0);
        assert_eq!(state.eax(), 0);
        assert_eq!(state.ax(), 0);
        assert_eq!(state.ah(), 0);
        assert_eq!(state.al(), 0);
        state.set_eax(!0);
        assert_eq!(state.eax(), !0);
        assert_eq!(state.ax(), !0);
        assert_eq!(state.ah(), !0);
        assert_eq!(state.al(), !0);
        state.set_al(0);
        assert_eq!(state.ah(), !0);
        assert_eq!(state.al(), 0);
        state.set_eax(!0);
        state.set_ah(0);
        assert_eq!(state.ah(), 0);
        assert_eq!(state.al(), !0);
    }

    #[test]
    fn register_views() {
        let mut state = State::new(0x0010_0000, 0x8000_0000);
        state.set_register(Register::Ecx, 0x1234_5678);
        assert_eq!(state.read_register("ecx"), Some(0x1234_5678));
        assert_eq!(state.read_register("cx"), Some(0x5678));
        assert_eq!(state.read_register("ch"), Some(0x56));
        assert_eq!(state.read_register("cl"), Some(0x78));
        assert_eq!(state.read_register("eip"), Some(0x0010_0000));
        assert_eq!(state.read_register("sp"), Some(0));
        assert_eq!(state.read_register("eflags"), Some(0x2));
        assert_eq!(state.read_register("xyz"), None);
    }

    #[test]
    fn partial_writes() {
        let mut state = State::new(0, 0);
        state.set_register(Register::Esi, 0xAAAA_BBBB);
        state.set_register(Register::Si, 0x1_2345);
        assert_eq!(state.esi(), 0xAAAA_2345);
        state.set_register(Register::Dh, 0xFF);
        assert_eq!(state.edx(), 0xFF00);
    }

    #[test]
    fn display() {
        let mut state = State::new(0x400000, 0);
        state.set_eax(10);
        let dump = state.to_string();
        assert!(dump.starts_with("eax     0x0000000a  10\n"));
        assert!(dump.contains("eip     0x00400000  4194304\n"));
        assert_eq!(dump.lines().count(), 10);
    }
}
