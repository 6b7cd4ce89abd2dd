use num_enum::IntoPrimitive;
use num_enum::TryFromPrimitive;

use crate::memory::{Byte, Word};

/// Number of operand bytes following `opcode`, encoded in its top two bits.
pub const fn operand_count(opcode: Byte) -> Byte {
    opcode >> 6
}

/// What the execution cycle does with the program counter after a handler ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Advance past the instruction and its operands
    Continue,
    /// Set the program counter to the given address
    Jump(Word),
}

macro_rules! instructions {
    ( $( $( #[doc = $doc:expr] )+ $name:ident = $repr:literal , )+ ) => {
        /// The LS-8 instruction set. Values are bit-exact opcodes.
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[derive(TryFromPrimitive, IntoPrimitive)]
        pub enum Instruction {
            $(
                $( #[doc = $doc] )+
                $name = $repr,
            )+
        }

        impl Instruction {
            pub const ALL: &'static [Self] = &[
                $( Self::$name , )+
            ];

            pub fn name(&self) -> &'static str {
                match self {
                    $( Self::$name => stringify!($name) , )+
                }
            }
        }

        impl ::std::fmt::Display for Instruction {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.name())
            }
        }
    }
}

instructions! {
    /// Halt the CPU
    HLT = 0b0000_0001,
    /// Set a register to an immediate value
    /// @param register
    /// @param value
    LDI = 0b1001_1001,
    /// Print the decimal value of a register
    /// @param register
    PRN = 0b0100_0011,
    /// Multiply two registers, storing the result in the first
    /// @param register A
    /// @param register B
    MUL = 0b1010_1010,
    /// Pop the top of the stack into a register
    /// @param register
    POP = 0b0100_1100,
    /// Push a register onto the stack
    /// @param register
    PUSH = 0b0100_1101,
    /// Push the return address and jump to the address in a register
    /// @param register
    CALL = 0b0100_1000,
    /// Pop the return address into the program counter
    RET = 0b0000_1001,
    /// Add two registers, storing the result in the first
    /// @param register A
    /// @param register B
    ADD = 0b1010_1000,
    /// Jump to the address in a register
    /// @param register
    JMP = 0b0101_0000,
    /// Jump to the address in a register if the equal flag is set
    /// @param register
    JEQ = 0b0101_0001,
    /// Jump to the address in a register if the equal flag is clear
    /// @param register
    JNE = 0b0101_0010,
    /// Compare two registers and set the flags
    /// @param register A
    /// @param register B
    CMP = 0b1010_0000,
}

impl Instruction {
    /// Operand bytes following this instruction
    pub fn operand_count(self) -> Byte {
        operand_count(self.into())
    }

    /// Total length in bytes, opcode included
    pub fn len(self) -> Word {
        self.operand_count() as Word + 1
    }
}

#[cfg(test)]
mod tests {
    use std::convert::TryFrom;

    use super::*;

    #[test]
    fn test_operand_count_from_high_bits() {
        assert_eq!(operand_count(0b1010_1010), 2);
        assert_eq!(operand_count(0b0000_0001), 0);
        assert_eq!(operand_count(0b0100_0011), 1);
        assert_eq!(operand_count(0b1111_1111), 3);
    }

    #[test]
    fn test_instruction_lengths() {
        assert_eq!(Instruction::MUL.len(), 3);
        assert_eq!(Instruction::HLT.len(), 1);
        assert_eq!(Instruction::RET.len(), 1);
        assert_eq!(Instruction::PUSH.len(), 2);
        assert_eq!(Instruction::LDI.operand_count(), 2);
    }

    #[test]
    fn test_decode_opcodes() {
        for instruction in Instruction::ALL {
            let opcode: Byte = (*instruction).into();
            assert_eq!(Instruction::try_from(opcode).ok(), Some(*instruction));
        }

        assert!(Instruction::try_from(0x00).is_err());
        assert!(Instruction::try_from(0xFF).is_err());
    }

    #[test]
    fn test_names() {
        assert_eq!(Instruction::JNE.to_string(), "JNE");
        assert_eq!(Instruction::ALL.len(), 13);
    }
}
