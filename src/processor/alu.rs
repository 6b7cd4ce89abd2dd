use crate::memory::Byte;

/// Operations understood by the ALU
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Mul,
}

/// Applies `op` to two register values. Results wrap modulo 256.
pub fn apply(op: AluOp, a: Byte, b: Byte) -> Byte {
    match op {
        AluOp::Add => a.wrapping_add(b),
        AluOp::Mul => a.wrapping_mul(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_wraps_for_all_pairs() {
        for a in 0..=255u16 {
            for b in 0..=255u16 {
                assert_eq!(
                    apply(AluOp::Add, a as Byte, b as Byte) as u16,
                    (a + b) % 256
                );
            }
        }
    }

    #[test]
    fn test_mul_wraps_for_all_pairs() {
        for a in 0..=255u16 {
            for b in 0..=255u16 {
                assert_eq!(
                    apply(AluOp::Mul, a as Byte, b as Byte) as u16,
                    (a * b) % 256
                );
            }
        }
    }

    #[test]
    fn test_mul() {
        assert_eq!(apply(AluOp::Mul, 8, 9), 72);
        assert_eq!(apply(AluOp::Mul, 16, 16), 0);
    }
}
