use crate::memory::Byte;

/// Receives the values printed by `PRN`
pub trait Output {
    fn emit(&mut self, value: Byte);
}

/// Prints each value on its own line to stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct Console;

impl Output for Console {
    fn emit(&mut self, value: Byte) {
        println!("{}", value);
    }
}

/// Collects printed values, mostly useful in tests
impl Output for Vec<Byte> {
    fn emit(&mut self, value: Byte) {
        self.push(value);
    }
}
