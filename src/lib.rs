//! Bare-bones implementation of the LS-8, an 8-bit toy computer
//!
//! 256 bytes of memory, eight registers and a dozen or so opcodes. Programs
//! are written one binary literal per line and loaded from address zero.

pub mod alu;
pub mod loader;
pub mod memory;
pub mod opcode;
pub mod region;
pub mod register;
pub mod vm;
