use crate::error::Fault;

pub mod parse;

pub type Byte = u8; // 1 byte
pub type Word = u16; // 2 bytes

/// Default memory, the full 8-bit address space
pub type StdMem = Memory<0x100>;

/// Emulates memory for use with the CPU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Memory<const S: usize> {
    /// The actual data of the memory
    pub data: [Byte; S],
}

impl<const S: usize> Default for Memory<S> {
    /// Initializes the memory
    fn default() -> Self {
        Memory { data: [0; S] }
    }
}

impl<const S: usize> Memory<S> {
    /// Reads a byte from the memory
    pub fn read_byte(&self, position: Word) -> Result<Byte, Fault> {
        self.data
            .get(position as usize)
            .copied()
            .ok_or(Fault::AddressOutOfRange {
                address: position as usize,
            })
    }

    /// Writes a byte to the memory
    pub fn write_byte(&mut self, position: Word, value: Byte) -> Result<(), Fault> {
        let cell = self
            .data
            .get_mut(position as usize)
            .ok_or(Fault::AddressOutOfRange {
                address: position as usize,
            })?;
        *cell = value;
        Ok(())
    }

    /// Writes an array of bytes to the memory
    pub fn write_array(&mut self, position: Word, data: &[Byte]) -> Result<(), Fault> {
        let start = position as usize;
        let end = start + data.len();
        self.data
            .get_mut(start..end)
            .ok_or(Fault::AddressOutOfRange {
                address: start.max(S),
            })?
            .copy_from_slice(data);
        Ok(())
    }

    /// Loads a raw program image at address 0
    pub fn load_bytes(data: &[Byte]) -> Result<Self, Fault> {
        let mut memory = Self::default();
        if !data.is_empty() {
            memory.write_array(0, data)?;
        }
        Ok(memory)
    }

    /// Logs the memory as rows of 16 bytes at `info`. Rows containing only
    /// zeroes are skipped.
    pub fn dump(&self) {
        for (row, chunk) in self.data.chunks(16).enumerate() {
            if chunk.iter().all(|byte| *byte == 0) {
                continue;
            }

            let bytes = chunk
                .iter()
                .map(|byte| format!("{:02X}", byte))
                .collect::<Vec<_>>()
                .join(" ");
            log::info!("{:04X}: {}", row * 16, bytes);
        }
    }
}

/// Writes a block of instructions directly into the memory
#[macro_export]
macro_rules! write_instructions {
    ( $mem:ident : $pos:expr => $( $byte:expr ),+ $(,)? ) => {
        $mem.write_array($pos, &[
            $(
                $byte as $crate::memory::Byte,
            )+
        ])
    };
}

#[cfg(test)]
mod tests {
    use crate::processor::Instruction;

    use super::*;
    use color_eyre::eyre::Result;

    #[test]
    fn test_read_byte() -> Result<()> {
        let mut mem = StdMem::default();
        mem.data[0x2] = 0x12;
        assert_eq!(mem.read_byte(0x2)?, 0x12);

        Ok(())
    }

    #[test]
    fn test_read_out_of_range() -> Result<()> {
        let mem = StdMem::default();
        assert_eq!(
            mem.read_byte(0x100),
            Err(Fault::AddressOutOfRange { address: 0x100 })
        );

        Ok(())
    }

    #[test]
    fn test_write_byte() -> Result<()> {
        let mut mem = StdMem::default();
        mem.write_byte(0x44, 12)?;
        assert_eq!(mem.data[0x44], 12);

        Ok(())
    }

    #[test]
    fn test_write_out_of_range() -> Result<()> {
        let mut mem = Memory::<4>::default();
        assert!(mem.write_byte(4, 1).is_err());
        assert_eq!(mem, Memory::<4>::default());

        Ok(())
    }

    #[test]
    fn test_write_array() -> Result<()> {
        let mut mem = StdMem::default();
        mem.write_array(0x44, &[0x12, 0x34, 0x56, 0x78])?;
        assert_eq!(mem.data[0x44], 0x12);
        assert_eq!(mem.data[0x45], 0x34);
        assert_eq!(mem.data[0x46], 0x56);
        assert_eq!(mem.data[0x47], 0x78);

        Ok(())
    }

    #[test]
    fn test_write_array_past_end() -> Result<()> {
        let mut mem = StdMem::default();
        assert_eq!(
            mem.write_array(0xFE, &[1, 2, 3]),
            Err(Fault::AddressOutOfRange { address: 0x100 })
        );

        Ok(())
    }

    #[test]
    fn test_write_array_reports_first_missing_address() -> Result<()> {
        let mut mem = Memory::<4>::default();
        assert_eq!(
            mem.write_array(2, &[1, 2, 3, 4, 5]),
            Err(Fault::AddressOutOfRange { address: 4 })
        );
        assert_eq!(
            mem.write_array(6, &[1]),
            Err(Fault::AddressOutOfRange { address: 6 })
        );
        assert_eq!(mem, Memory::<4>::default());

        Ok(())
    }

    #[test]
    fn test_load_bytes() -> Result<()> {
        let mem = StdMem::load_bytes(&[0b0000_0001, 7])?;
        assert_eq!(mem.read_byte(0)?, 0b0000_0001);
        assert_eq!(mem.read_byte(1)?, 7);
        assert_eq!(mem.read_byte(2)?, 0);

        assert!(Memory::<2>::load_bytes(&[1, 2, 3]).is_err());

        Ok(())
    }

    #[test]
    fn test_write_instructions() -> Result<()> {
        let mut mem = StdMem::default();

        mem.write_array(
            0x10,
            &[
                Instruction::LDI as Byte,
                0,
                8,
                Instruction::PRN as Byte,
                0,
                Instruction::HLT as Byte,
            ],
        )?;

        let mut mem2 = StdMem::default();
        use crate::processor::Instruction::*;
        write_instructions!(mem2 : 0x10 => LDI, 0, 8, PRN, 0, HLT)?;

        assert_eq!(mem, mem2);

        Ok(())
    }
}
