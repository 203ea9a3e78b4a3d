use std::fmt;

use crate::vm::Error;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
  /// Stops the machine.
  ///
  /// | Operation | Semantics/RTL      | Assembly |
  /// |-----------|--------------------|----------|
  /// | Halt      | `(stop execution)` | `HLT`    |
  Halt = 0b0000_0001,

  /// Loads an immediate value into a register.
  ///
  /// | Operation      | Semantics/RTL | Assembly       |
  /// |----------------|---------------|----------------|
  /// | Load Immediate | `r[a] ← vv`   | `LDI ra, vv`   |
  LoadImmediate = 0b1000_0010,

  /// Prints the decimal value of a register, followed by a newline.
  ///
  /// | Operation | Semantics/RTL    | Assembly |
  /// |-----------|------------------|----------|
  /// | Print     | `stdout ← r[a]`  | `PRN ra` |
  Print = 0b0100_0111,

  /// | Operation | Semantics/RTL        | Assembly     |
  /// |-----------|----------------------|--------------|
  /// | Multiply  | `r[a] ← r[a] × r[b]` | `MUL ra, rb` |
  Multiply = 0b1010_0010,

  /// | Operation | Semantics/RTL        | Assembly     |
  /// |-----------|----------------------|--------------|
  /// | Add       | `r[a] ← r[a] + r[b]` | `ADD ra, rb` |
  Add = 0b1010_0000,

  /// Compares two registers, setting exactly one of the `L`, `G` or `E` flags.
  ///
  /// | Operation | Semantics/RTL           | Assembly     |
  /// |-----------|-------------------------|--------------|
  /// | Compare   | `fl ← cmp(r[a], r[b])`  | `CMP ra, rb` |
  Compare = 0b1010_0111,

  /// | Operation | Semantics/RTL                  | Assembly  |
  /// |-----------|--------------------------------|-----------|
  /// | Push      | `sp ← sp − 1; m[sp] ← r[a]`    | `PUSH ra` |
  Push = 0b0100_0101,

  /// | Operation | Semantics/RTL                  | Assembly |
  /// |-----------|--------------------------------|----------|
  /// | Pop       | `r[a] ← m[sp]; sp ← sp + 1`    | `POP ra` |
  Pop = 0b0100_0110,

  /// Calls a subroutine at the address held in a register.
  ///
  /// | Operation | Semantics/RTL                              | Assembly  |
  /// |-----------|--------------------------------------------|-----------|
  /// | Call      | `sp ← sp − 1; m[sp] ← pc + 2; pc ← r[a]`   | `CALL ra` |
  Call = 0b0101_0000,

  /// | Operation | Semantics/RTL               | Assembly |
  /// |-----------|-----------------------------|----------|
  /// | Return    | `pc ← m[sp]; sp ← sp + 1`   | `RET`    |
  Return = 0b0001_0001,

  /// | Operation | Semantics/RTL | Assembly |
  /// |-----------|---------------|----------|
  /// | Jump      | `pc ← r[a]`   | `JMP ra` |
  Jump = 0b0101_0100,

  /// | Operation     | Semantics/RTL             | Assembly |
  /// |---------------|---------------------------|----------|
  /// | Jump If Equal | `if fl = E : pc ← r[a]`   | `JEQ ra` |
  JumpIfEqual = 0b0101_0101,

  /// | Operation         | Semantics/RTL             | Assembly |
  /// |-------------------|---------------------------|----------|
  /// | Jump If Not Equal | `if fl ≠ E : pc ← r[a]`   | `JNE ra` |
  JumpIfNotEqual = 0b0101_0110,
}

impl Opcode {
  /// Number of operand bytes that follow the opcode in memory
  pub fn operands(self) -> usize {
    match self {
      Self::Halt | Self::Return => 0,
      Self::Print
      | Self::Push
      | Self::Pop
      | Self::Call
      | Self::Jump
      | Self::JumpIfEqual
      | Self::JumpIfNotEqual => 1,
      Self::LoadImmediate | Self::Multiply | Self::Add | Self::Compare => 2,
    }
  }

  /// Distance to the next instruction when the opcode does not set the pc
  pub fn width(self) -> usize {
    1 + self.operands()
  }

  pub fn mnemonic(self) -> &'static str {
    match self {
      Self::Halt => "HLT",
      Self::LoadImmediate => "LDI",
      Self::Print => "PRN",
      Self::Multiply => "MUL",
      Self::Add => "ADD",
      Self::Compare => "CMP",
      Self::Push => "PUSH",
      Self::Pop => "POP",
      Self::Call => "CALL",
      Self::Return => "RET",
      Self::Jump => "JMP",
      Self::JumpIfEqual => "JEQ",
      Self::JumpIfNotEqual => "JNE",
    }
  }
}

impl fmt::Display for Opcode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.mnemonic())
  }
}

impl TryFrom<u8> for Opcode {
  type Error = Error;

  fn try_from(byte: u8) -> Result<Self, Self::Error> {
    let op = match byte {
      0b0000_0001 => Self::Halt,
      0b1000_0010 => Self::LoadImmediate,
      0b0100_0111 => Self::Print,
      0b1010_0010 => Self::Multiply,
      0b1010_0000 => Self::Add,
      0b1010_0111 => Self::Compare,
      0b0100_0101 => Self::Push,
      0b0100_0110 => Self::Pop,
      0b0101_0000 => Self::Call,
      0b0001_0001 => Self::Return,
      0b0101_0100 => Self::Jump,
      0b0101_0101 => Self::JumpIfEqual,
      0b0101_0110 => Self::JumpIfNotEqual,
      other => return Err(Error::UnknownOpcode(other)),
    };
    Ok(op)
  }
}
