use crate::loader::LoadError;
use crate::vm::Error;

/// Number of addressable bytes
pub const MEMORY_SIZE: usize = 256;

/// Flat, byte-addressable memory
#[derive(Debug, Clone)]
pub struct Memory {
  cells: [u8; MEMORY_SIZE],
}

impl Memory {
  pub fn new() -> Self {
    Self {
      cells: [0; MEMORY_SIZE],
    }
  }

  pub fn read(&self, address: usize) -> Result<u8, Error> {
    self
      .cells
      .get(address)
      .copied()
      .ok_or(Error::AddressOutOfRange(address))
  }

  pub fn write(&mut self, address: usize, value: u8) -> Result<(), Error> {
    let cell = self
      .cells
      .get_mut(address)
      .ok_or(Error::AddressOutOfRange(address))?;
    *cell = value;
    Ok(())
  }

  /// Copy `bytes` into memory starting at address zero
  pub fn fill(&mut self, bytes: &[u8]) -> Result<(), Error> {
    if bytes.len() > MEMORY_SIZE {
      return Err(Error::Load(LoadError::TooLarge {
        capacity: MEMORY_SIZE,
      }));
    }
    self.cells[..bytes.len()].copy_from_slice(bytes);
    Ok(())
  }

  pub fn as_slice(&self) -> &[u8] {
    &self.cells
  }
}

impl Default for Memory {
  fn default() -> Self {
    Self::new()
  }
}
