use std::fs;
use std::path::PathBuf;
use std::process::Command;

use emulator::loader::LoadError;
use emulator::vm::{Error, State, Vm};
use tempfile::tempdir;

fn demo(name: &str) -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    .join("demos")
    .join(name)
}

fn run_demo(name: &str) -> String {
  let mut vm = Vm::new();
  vm.load_file(demo(name)).unwrap();
  let mut out = Vec::new();
  vm.run(&mut out).unwrap();
  assert_eq!(vm.state(), State::Halted);
  String::from_utf8(out).unwrap()
}

#[test]
fn demos() {
  assert_eq!(run_demo("print8.ls8"), "8\n");
  assert_eq!(run_demo("mult.ls8"), "72\n");
  assert_eq!(run_demo("stack.ls8"), "2\n1\n");
  assert_eq!(run_demo("call.ls8"), "2\n4\n20\n40\n");
  assert_eq!(run_demo("cmp.ls8"), "1\n4\n");
}

#[test]
fn machines_run_in_parallel() {
  let handles: Vec<_> = ["print8.ls8", "mult.ls8", "call.ls8"]
    .into_iter()
    .map(|name| std::thread::spawn(move || run_demo(name)))
    .collect();
  let outputs: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
  assert_eq!(outputs, ["8\n", "72\n", "2\n4\n20\n40\n"]);
}

#[test]
fn load_malformed_program() {
  let temp_dir = tempdir().unwrap();
  let path = temp_dir.path().join("bad.ls8");
  fs::write(&path, "10000010 # LDI R0,8\n00000000\n0000100x\n").unwrap();

  let mut vm = Vm::new();
  let err = vm.load_file(&path).unwrap_err();
  assert!(matches!(
    err,
    Error::Load(LoadError::Malformed { line: 3, .. })
  ));
}

#[test]
fn load_missing_program() {
  let temp_dir = tempdir().unwrap();
  let mut vm = Vm::new();
  let err = vm.load_file(temp_dir.path().join("nope.ls8")).unwrap_err();
  assert!(matches!(err, Error::Load(LoadError::Io { .. })));
}

#[test]
fn test_cli_print8() {
  let output = Command::new(env!("CARGO_BIN_EXE_ls8"))
    .arg(demo("print8.ls8"))
    .output()
    .unwrap();

  assert!(output.status.success());
  assert_eq!(String::from_utf8_lossy(&output.stdout), "8\n");
}

#[test]
fn test_cli_unknown_opcode() {
  let temp_dir = tempdir().unwrap();
  let path = temp_dir.path().join("unknown.ls8");
  fs::write(&path, "10000010 # LDI R0,5\n00000000\n00000101\n01000111 # PRN R0\n00000000\n11111111\n").unwrap();

  let output = Command::new(env!("CARGO_BIN_EXE_ls8"))
    .arg(&path)
    .output()
    .unwrap();

  // output produced before the failure is kept
  assert!(!output.status.success());
  assert_eq!(String::from_utf8_lossy(&output.stdout), "5\n");
  assert!(String::from_utf8_lossy(&output.stderr).contains("unknown opcode"));
}

#[test]
fn test_cli_missing_program() {
  let temp_dir = tempdir().unwrap();
  let output = Command::new(env!("CARGO_BIN_EXE_ls8"))
    .arg(temp_dir.path().join("missing.ls8"))
    .output()
    .unwrap();

  assert!(!output.status.success());
  assert!(String::from_utf8_lossy(&output.stderr).contains("could not read program"));
}

#[test]
fn test_cli_trace() {
  let output = Command::new(env!("CARGO_BIN_EXE_ls8"))
    .arg("--trace")
    .arg(demo("print8.ls8"))
    .output()
    .unwrap();

  assert!(output.status.success());
  assert_eq!(String::from_utf8_lossy(&output.stdout), "8\n");
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("TRACE: 00 | 00 | 82 00 08 | 00 00 00 00 00 00 00 F4"));
  assert!(stderr.contains("TRACE: 05 | 00 | 01 00 00 |"));
}
