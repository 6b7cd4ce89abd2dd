use std::fmt;

use crate::memory::Byte;

/// Number of general purpose registers
pub const REGISTER_COUNT: usize = 8;
/// Register reserved as the stack pointer
pub const SP_INDEX: Byte = 7;
/// Initial value of the stack pointer. The stack grows down from here.
pub const STACK_TOP: Byte = 0xF4;

/// The general purpose registers R0-R7
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Registers {
    reg: [Byte; REGISTER_COUNT],
}

impl Default for Registers {
    fn default() -> Self {
        let mut reg = [0; REGISTER_COUNT];
        reg[SP_INDEX as usize] = STACK_TOP;
        Self { reg }
    }
}

impl Registers {
    /// Reads register `index`, or `None` if there is no such register
    pub fn get(&self, index: Byte) -> Option<Byte> {
        self.reg.get(index as usize).copied()
    }

    /// Writes register `index`. Returns `None` if there is no such register.
    pub fn set(&mut self, index: Byte, value: Byte) -> Option<()> {
        *self.reg.get_mut(index as usize)? = value;
        Some(())
    }

    /// Stack pointer
    pub fn sp(&self) -> Byte {
        self.reg[SP_INDEX as usize]
    }

    pub fn set_sp(&mut self, value: Byte) {
        self.reg[SP_INDEX as usize] = value;
    }

    pub fn as_slice(&self) -> &[Byte] {
        &self.reg
    }
}

/// The flags register. Only the low three bits are used.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Flags(Byte);

impl Flags {
    /// Equal
    pub const EQF: Byte = 0b0000_0001;
    /// Greater than
    pub const GTF: Byte = 0b0000_0010;
    /// Less than
    pub const LTF: Byte = 0b0000_0100;

    pub fn bits(self) -> Byte {
        self.0
    }

    pub fn contains(self, flag: Byte) -> bool {
        self.0 & flag != 0
    }

    /// Clears the register, then sets exactly one of EQF, GTF or LTF
    pub fn compare(&mut self, a: Byte, b: Byte) {
        self.0 = if a == b {
            Self::EQF
        } else if a > b {
            Self::GTF
        } else {
            Self::LTF
        };
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = |bit, c| if self.contains(bit) { c } else { '-' };
        write!(
            f,
            "{}{}{}",
            flag(Self::LTF, 'L'),
            flag(Self::GTF, 'G'),
            flag(Self::EQF, 'E')
        )
    }
}
