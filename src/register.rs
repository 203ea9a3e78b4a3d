use std::cmp::Ordering;

use crate::vm::Error;

/// Number of general purpose registers
pub const REGISTER_COUNT: usize = 8;

/// Index of the register reserved as the stack pointer
pub const SP: u8 = 7;

/// Value the stack pointer takes when the machine starts
pub const STACK_BASE: u8 = 0xF4;

/// The register file
#[derive(Debug, Clone, Default)]
pub struct Registers {
  values: [u8; REGISTER_COUNT],
}

impl Registers {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get(&self, index: u8) -> Result<u8, Error> {
    self
      .values
      .get(index as usize)
      .copied()
      .ok_or(Error::RegisterOutOfRange(index))
  }

  pub fn set(&mut self, index: u8, value: u8) -> Result<(), Error> {
    let slot = self
      .values
      .get_mut(index as usize)
      .ok_or(Error::RegisterOutOfRange(index))?;
    *slot = value;
    Ok(())
  }

  pub fn sp(&self) -> u8 {
    self.values[SP as usize]
  }

  pub fn set_sp(&mut self, value: u8) {
    self.values[SP as usize] = value;
  }

  pub fn as_slice(&self) -> &[u8] {
    &self.values
  }
}

/// Condition flags, with discriminants matching the `00000LGE` status byte.
///
/// `None` is the reset state, before any `CMP` has run.
#[repr(u8)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Flags {
  #[default]
  None = 0b000,
  LessThan = 0b100,
  GreaterThan = 0b010,
  Equal = 0b001,
}

impl Flags {
  pub fn compare(a: u8, b: u8) -> Self {
    match a.cmp(&b) {
      Ordering::Less => Self::LessThan,
      Ordering::Greater => Self::GreaterThan,
      Ordering::Equal => Self::Equal,
    }
  }

  pub fn bits(self) -> u8 {
    self as u8
  }

  pub fn is_equal(self) -> bool {
    self == Self::Equal
  }
}
