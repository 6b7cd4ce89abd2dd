use std::error;
use std::fmt;

use crate::memory::{Byte, Word};

/// A condition that stops the machine. Every fault is fatal to the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// No instruction is bound to the fetched opcode
    InvalidOpcode { opcode: Byte, pc: Word },
    /// An operand names a register outside R0-R7
    InvalidRegister { index: Byte, pc: Word },
    /// Memory was accessed outside of its backing store
    AddressOutOfRange { address: usize },
    /// A push would move SP below address 0
    StackOverflow { sp: Byte, pc: Word },
    /// A pop would move SP past the end of memory
    StackUnderflow { sp: Byte, pc: Word },
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::InvalidOpcode { opcode, pc } => {
                write!(f, "invalid opcode `0b{:08b}` at 0x{:02X}", opcode, pc)
            }
            Fault::InvalidRegister { index, pc } => {
                write!(f, "invalid register `R{}` at 0x{:02X}", index, pc)
            }
            Fault::AddressOutOfRange { address } => {
                write!(f, "memory has no address `0x{:x}`", address)
            }
            Fault::StackOverflow { sp, pc } => {
                write!(f, "stack overflow (SP = 0x{:02X}) at 0x{:02X}", sp, pc)
            }
            Fault::StackUnderflow { sp, pc } => {
                write!(f, "stack underflow (SP = 0x{:02X}) at 0x{:02X}", sp, pc)
            }
        }
    }
}

impl error::Error for Fault {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_opcode_names_opcode_and_pc() {
        let fault = Fault::InvalidOpcode {
            opcode: 0b1111_0000,
            pc: 0x12,
        };

        assert_eq!(fault.to_string(), "invalid opcode `0b11110000` at 0x12");
    }
}
