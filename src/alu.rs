use crate::opcode::Opcode;
use crate::register::Flags;
use crate::vm::Error;

/// Operations carried out by the arithmetic logic unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
  Add,
  Mul,
  Cmp,
}

/// What an ALU operation produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
  /// New value for the first operand register
  Register(u8),
  /// New flags, registers untouched
  Flags(Flags),
}

impl TryFrom<Opcode> for AluOp {
  type Error = Error;

  fn try_from(op: Opcode) -> Result<Self, Self::Error> {
    match op {
      Opcode::Add => Ok(Self::Add),
      Opcode::Multiply => Ok(Self::Mul),
      Opcode::Compare => Ok(Self::Cmp),
      other => Err(Error::UnsupportedOperation(other)),
    }
  }
}

/// Apply `op` to the values of two registers, wrapping at the byte width
pub fn apply(op: AluOp, a: u8, b: u8) -> Outcome {
  match op {
    AluOp::Add => Outcome::Register(a.wrapping_add(b)),
    AluOp::Mul => Outcome::Register(a.wrapping_mul(b)),
    AluOp::Cmp => Outcome::Flags(Flags::compare(a, b)),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn add_wraps() {
    assert_eq!(apply(AluOp::Add, 250, 10), Outcome::Register(4));
    assert_eq!(apply(AluOp::Add, 2, 3), Outcome::Register(5));
  }

  #[test]
  fn mul_wraps() {
    assert_eq!(apply(AluOp::Mul, 8, 9), Outcome::Register(72));
    assert_eq!(apply(AluOp::Mul, 16, 17), Outcome::Register(16));
  }

  #[test]
  fn add_and_mul_commute() {
    for (a, b) in [(0, 255), (13, 200), (128, 2), (99, 99)] {
      assert_eq!(apply(AluOp::Add, a, b), apply(AluOp::Add, b, a));
      assert_eq!(apply(AluOp::Mul, a, b), apply(AluOp::Mul, b, a));
    }
  }

  #[test]
  fn cmp_sets_flags() {
    assert_eq!(apply(AluOp::Cmp, 5, 10), Outcome::Flags(Flags::LessThan));
    assert_eq!(apply(AluOp::Cmp, 10, 5), Outcome::Flags(Flags::GreaterThan));
    assert_eq!(apply(AluOp::Cmp, 7, 7), Outcome::Flags(Flags::Equal));
  }

  #[test]
  fn from_opcode() {
    assert_eq!(AluOp::try_from(Opcode::Add).ok(), Some(AluOp::Add));
    assert_eq!(AluOp::try_from(Opcode::Multiply).ok(), Some(AluOp::Mul));
    assert_eq!(AluOp::try_from(Opcode::Compare).ok(), Some(AluOp::Cmp));
    assert!(matches!(
      AluOp::try_from(Opcode::Push),
      Err(Error::UnsupportedOperation(Opcode::Push))
    ));
  }
}
