//! Reads programs written as one binary literal per line.
//!
//! ```text
//! # print8
//! 10000010 # LDI R0,8
//! 00000000
//! 00001000
//! 01000111 # PRN R0
//! 00000000
//! 00000001 # HLT
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::memory::MEMORY_SIZE;
use crate::region::Chunk;

/// An error that occurred while reading a program
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
  #[error("could not read program `{path}`")]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("line {line}: expected an 8-digit binary literal, found `{text}`")]
  Malformed { line: usize, text: String },

  #[error("program does not fit in {capacity} bytes of memory")]
  TooLarge { capacity: usize },
}

/// Parse program text into a chunk
pub fn parse(source: &str) -> Result<Chunk, LoadError> {
  let mut bytes = Vec::new();
  for (index, line) in source.lines().enumerate() {
    // everything after a `#` is a comment
    let text = line.split('#').next().unwrap_or_default().trim();
    if text.is_empty() {
      continue;
    }
    let byte = parse_byte(text).ok_or_else(|| LoadError::Malformed {
      line: index + 1,
      text: text.to_owned(),
    })?;
    if bytes.len() == MEMORY_SIZE {
      return Err(LoadError::TooLarge {
        capacity: MEMORY_SIZE,
      });
    }
    bytes.push(byte);
  }
  Ok(bytes.into())
}

/// Read and parse the program at `path`
pub fn load_file(path: impl AsRef<Path>) -> Result<Chunk, LoadError> {
  let path = path.as_ref();
  let source = fs::read_to_string(path).map_err(|source| LoadError::Io {
    path: path.to_owned(),
    source,
  })?;
  let chunk = parse(&source)?;
  debug!(path = %path.display(), bytes = chunk.len(), "loaded program");
  Ok(chunk)
}

fn parse_byte(text: &str) -> Option<u8> {
  if text.len() != 8 || !text.bytes().all(|b| b == b'0' || b == b'1') {
    return None;
  }
  u8::from_str_radix(text, 2).ok()
}
