//! Register names and sizes.

use num_traits::FromPrimitive;

use std::fmt;

/// Size of a register.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum RegSize {
    Bits8,
    Bits16,
    Bits32,
}

impl RegSize {
    /// Returns the number of bytes in a value of this size.
    pub fn bytes(&self) -> u32 {
        match self {
            RegSize::Bits8 => 1,
            RegSize::Bits16 => 2,
            RegSize::Bits32 => 4,
        }
    }
}

/// A register that can be named in a debugger expression.
///
/// Within each size class, the variants are declared in i386 encoding order
/// (the order in which the `reg` field of a ModR/M byte selects them).
#[derive(Debug, PartialEq, Eq, Copy, Clone, FromPrimitive)]
pub enum Register {
    // 32 bit GP registers:
    Eax,
    Ecx,
    Edx,
    Ebx,
    Esp,
    Ebp,
    Esi,
    Edi,

    // 16 bit views of the above:
    Ax,
    Cx,
    Dx,
    Bx,
    Sp,
    Bp,
    Si,
    Di,

    // Low and high bytes of `ax` to `bx`:
    Al,
    Cl,
    Dl,
    Bl,
    Ah,
    Ch,
    Dh,
    Bh,

    /// Instruction pointer.
    Eip,
    /// Status flags.
    Eflags,
}

impl Register {
    /// Looks up a register by its lowercase name (without the `$` sigil).
    pub fn from_name(name: &str) -> Option<Self> {
        use self::Register::*;
        Some(match name {
            "eax" => Eax,
            "ecx" => Ecx,
            "edx" => Edx,
            "ebx" => Ebx,
            "esp" => Esp,
            "ebp" => Ebp,
            "esi" => Esi,
            "edi" => Edi,
            "ax" => Ax,
            "cx" => Cx,
            "dx" => Dx,
            "bx" => Bx,
            "sp" => Sp,
            "bp" => Bp,
            "si" => Si,
            "di" => Di,
            "al" => Al,
            "cl" => Cl,
            "dl" => Dl,
            "bl" => Bl,
            "ah" => Ah,
            "ch" => Ch,
            "dh" => Dh,
            "bh" => Bh,
            "eip" => Eip,
            "eflags" => Eflags,
            _ => return None,
        })
    }

    /// Returns an iterator over all registers, in declaration order.
    pub fn all() -> impl Iterator<Item=Register> {
        (0u8..).map(Register::from_u8).take_while(Option::is_some).filter_map(|reg| reg)
    }

    pub fn name(&self) -> &'static str {
        use self::Register::*;
        match self {
            Eax => "eax",
            Ecx => "ecx",
            Edx => "edx",
            Ebx => "ebx",
            Esp => "esp",
            Ebp => "ebp",
            Esi => "esi",
            Edi => "edi",
            Ax => "ax",
            Cx => "cx",
            Dx => "dx",
            Bx => "bx",
            Sp => "sp",
            Bp => "bp",
            Si => "si",
            Di => "di",
            Al => "al",
            Cl => "cl",
            Dl => "dl",
            Bl => "bl",
            Ah => "ah",
            Ch => "ch",
            Dh => "dh",
            Bh => "bh",
            Eip => "eip",
            Eflags => "eflags",
        }
    }

    pub fn size(&self) -> RegSize {
        use self::Register::*;
        match self {
            Al | Ah | Bl | Bh | Cl | Ch | Dl | Dh => RegSize::Bits8,
            Ax | Bx | Cx | Dx | Si | Di | Bp | Sp => RegSize::Bits16,
            Eax | Ebx | Ecx | Edx | Esi | Edi | Ebp | Esp | Eip | Eflags => RegSize::Bits32,
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}
