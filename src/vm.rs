use std::fmt::Write as _;
use std::io::{self, Write};
use std::path::Path;

use tracing::{debug, trace};

use crate::alu::{self, AluOp, Outcome};
use crate::loader::{self, LoadError};
use crate::memory::Memory;
use crate::opcode::Opcode;
use crate::region::Region;
use crate::register::{Flags, Registers, STACK_BASE};

/// Lifecycle of a loaded program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
  NotStarted,
  Running,
  Halted,
  Failed,
}

/// A virtual machine for the LS-8 architecture.
///
/// 256 bytes of memory, eight byte-wide registers (`R7` doubles as the stack
/// pointer) and a three bit flags register written by `CMP`. The stack grows
/// down from `0xF4`, which is only set once the machine starts so that a
/// program loaded over that region is left intact until then.
#[derive(Debug)]
pub struct Vm {
  // address of the next opcode to fetch
  pc: usize,
  memory: Memory,
  registers: Registers,
  flags: Flags,
  state: State,
}

impl Vm {
  /// Create a new, empty virtual machine
  pub fn new() -> Self {
    Self {
      pc: 0,
      memory: Memory::new(),
      registers: Registers::new(),
      flags: Flags::None,
      state: State::NotStarted,
    }
  }

  /// Reset the machine and copy `region` into memory from address zero.
  ///
  /// The machine is left untouched if the region does not fit.
  pub fn load<R>(&mut self, region: &R) -> Result<(), Error>
  where
    R: Region + ?Sized,
  {
    let mut memory = Memory::new();
    memory.fill(region.bytes())?;
    *self = Self {
      memory,
      ..Self::new()
    };
    debug!(bytes = region.bytes().len(), "program loaded");
    Ok(())
  }

  /// Read the program at `path` and load it
  pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<(), Error> {
    let chunk = loader::load_file(path)?;
    self.load(&chunk)
  }

  /// Run until the program halts or fails, writing `PRN` output to `out`
  pub fn run<W>(&mut self, out: &mut W) -> Result<(), Error>
  where
    W: Write,
  {
    self.start()?;
    while self.state == State::Running {
      self.execute(out)?;
    }
    debug!(pc = self.pc, "machine halted");
    Ok(())
  }

  /// Execute a single instruction, starting the machine if needed
  pub fn step<W>(&mut self, out: &mut W) -> Result<(), Error>
  where
    W: Write,
  {
    self.start()?;
    self.execute(out)
  }

  /// Render the machine state as a single line:
  /// `TRACE: pc | fl | m[pc] m[pc+1] m[pc+2] | r0 .. r7`
  pub fn trace(&self) -> String {
    let mut line = format!("TRACE: {:02X} | {:02X} |", self.pc, self.flags.bits());
    for address in self.pc..self.pc + 3 {
      let _ = match self.memory.read(address) {
        Ok(byte) => write!(line, " {byte:02X}"),
        Err(_) => line.write_str(" --"),
      };
    }
    line.push_str(" |");
    for value in self.registers.as_slice() {
      let _ = write!(line, " {value:02X}");
    }
    line
  }

  pub fn ram_read(&self, address: usize) -> Result<u8, Error> {
    self.memory.read(address)
  }

  pub fn ram_write(&mut self, address: usize, value: u8) -> Result<(), Error> {
    self.memory.write(address, value)
  }

  pub fn register(&self, index: u8) -> Result<u8, Error> {
    self.registers.get(index)
  }

  pub fn sp(&self) -> u8 {
    self.registers.sp()
  }

  pub fn pc(&self) -> usize {
    self.pc
  }

  pub fn flags(&self) -> Flags {
    self.flags
  }

  pub fn state(&self) -> State {
    self.state
  }

  fn start(&mut self) -> Result<(), Error> {
    match self.state {
      State::NotStarted => {
        self.registers.set_sp(STACK_BASE);
        self.state = State::Running;
        debug!("machine started");
        Ok(())
      }
      State::Running => Ok(()),
      State::Halted => Err(Error::MachineHalted),
      State::Failed => Err(Error::MachineFailed),
    }
  }

  fn execute<W>(&mut self, out: &mut W) -> Result<(), Error>
  where
    W: Write,
  {
    trace!("{}", self.trace());
    let mut task = Task::new(self, out);
    let result = task.run();
    if let Err(ref error) = result {
      debug!(pc = self.pc, %error, "machine failed");
      self.state = State::Failed;
    }
    result
  }

  fn push(&mut self, value: u8) -> Result<(), Error> {
    let sp = self.registers.sp().wrapping_sub(1);
    self.registers.set_sp(sp);
    self.memory.write(sp as usize, value)
  }

  fn pop(&mut self) -> Result<u8, Error> {
    let sp = self.registers.sp();
    let value = self.memory.read(sp as usize)?;
    self.registers.set_sp(sp.wrapping_add(1));
    Ok(value)
  }
}

impl Default for Vm {
  fn default() -> Self {
    Self::new()
  }
}

/// An error that occurred while loading or executing a program
#[derive(thiserror::Error, Debug)]
pub enum Error {
  #[error("memory address {0:#04x} is out of range")]
  AddressOutOfRange(usize),

  #[error("register R{0} does not exist")]
  RegisterOutOfRange(u8),

  #[error("`{0}` is not an alu operation")]
  UnsupportedOperation(Opcode),

  #[error("unknown opcode {0:#010b}")]
  UnknownOpcode(u8),

  #[error(transparent)]
  Load(#[from] LoadError),

  #[error("could not write program output")]
  Output(#[from] io::Error),

  #[error("machine is halted")]
  MachineHalted,

  #[error("machine has failed")]
  MachineFailed,
}

/// Where execution continues after an instruction
enum Next {
  Advance,
  Jump(usize),
  Halt,
}

struct Task<'vm, 'out, W> {
  vm: &'vm mut Vm,
  out: &'out mut W,
}

impl<'vm, 'out, W> Task<'vm, 'out, W>
where
  W: Write,
{
  fn new(vm: &'vm mut Vm, out: &'out mut W) -> Self {
    Self { vm, out }
  }

  #[inline]
  fn operand(&self, n: usize) -> Result<u8, Error> {
    self.vm.memory.read(self.vm.pc + n)
  }

  // value of the register named by operand `n`
  fn register(&self, n: usize) -> Result<u8, Error> {
    let index = self.operand(n)?;
    self.vm.registers.get(index)
  }

  fn run(&mut self) -> Result<(), Error> {
    let op = Opcode::try_from(self.vm.memory.read(self.vm.pc)?)?;
    let equal = self.vm.flags.is_equal();
    let next = match op {
      Opcode::Halt => Next::Halt,
      Opcode::LoadImmediate => load_immediate(self)?,
      Opcode::Print => print(self)?,
      Opcode::Multiply | Opcode::Add | Opcode::Compare => arithmetic(self, op)?,
      Opcode::Push => push(self)?,
      Opcode::Pop => pop(self)?,
      Opcode::Call => call(self)?,
      Opcode::Return => ret(self)?,
      Opcode::Jump => jump(self)?,
      Opcode::JumpIfEqual => jump_if(self, equal)?,
      Opcode::JumpIfNotEqual => jump_if(self, !equal)?,
    };
    match next {
      Next::Advance => self.vm.pc += op.width(),
      Next::Jump(target) => self.vm.pc = target,
      Next::Halt => self.vm.state = State::Halted,
    }
    Ok(())
  }
}

// r[a] ← vv
fn load_immediate<W>(task: &mut Task<'_, '_, W>) -> Result<Next, Error>
where
  W: Write,
{
  let a = task.operand(1)?;
  let vv = task.operand(2)?;
  task.vm.registers.set(a, vv)?;
  Ok(Next::Advance)
}

// stdout ← r[a]
fn print<W>(task: &mut Task<'_, '_, W>) -> Result<Next, Error>
where
  W: Write,
{
  let ra = task.register(1)?;
  writeln!(task.out, "{ra}")?;
  Ok(Next::Advance)
}

// r[a] ← r[a] (+|×) r[b], or fl ← cmp(r[a], r[b])
fn arithmetic<W>(task: &mut Task<'_, '_, W>, op: Opcode) -> Result<Next, Error>
where
  W: Write,
{
  let op = AluOp::try_from(op)?;
  let a = task.operand(1)?;
  let ra = task.vm.registers.get(a)?;
  let rb = task.register(2)?;
  match alu::apply(op, ra, rb) {
    Outcome::Register(value) => task.vm.registers.set(a, value)?,
    Outcome::Flags(flags) => task.vm.flags = flags,
  }
  Ok(Next::Advance)
}

// sp ← sp − 1; m[sp] ← r[a]
fn push<W>(task: &mut Task<'_, '_, W>) -> Result<Next, Error>
where
  W: Write,
{
  let ra = task.register(1)?;
  task.vm.push(ra)?;
  Ok(Next::Advance)
}

// r[a] ← m[sp]; sp ← sp + 1
fn pop<W>(task: &mut Task<'_, '_, W>) -> Result<Next, Error>
where
  W: Write,
{
  let a = task.operand(1)?;
  // validate the destination before the stack moves
  task.vm.registers.get(a)?;
  let value = task.vm.pop()?;
  task.vm.registers.set(a, value)?;
  Ok(Next::Advance)
}

// sp ← sp − 1; m[sp] ← pc + 2; pc ← r[a]
fn call<W>(task: &mut Task<'_, '_, W>) -> Result<Next, Error>
where
  W: Write,
{
  let target = task.register(1)?;
  let next = task.vm.pc + Opcode::Call.width();
  let next = u8::try_from(next).map_err(|_| Error::AddressOutOfRange(next))?;
  task.vm.push(next)?;
  Ok(Next::Jump(target as usize))
}

// pc ← m[sp]; sp ← sp + 1
fn ret<W>(task: &mut Task<'_, '_, W>) -> Result<Next, Error>
where
  W: Write,
{
  let target = task.vm.pop()?;
  Ok(Next::Jump(target as usize))
}

// pc ← r[a]
fn jump<W>(task: &mut Task<'_, '_, W>) -> Result<Next, Error>
where
  W: Write,
{
  let target = task.register(1)?;
  Ok(Next::Jump(target as usize))
}

// if cond : pc ← r[a]
fn jump_if<W>(task: &mut Task<'_, '_, W>, cond: bool) -> Result<Next, Error>
where
  W: Write,
{
  let target = task.register(1)?;
  if cond {
    Ok(Next::Jump(target as usize))
  } else {
    Ok(Next::Advance)
  }
}
