use std::{
  env, fs,
  path::{Path, PathBuf},
  process::{Command, Output},
};

use sha1::{Digest, Sha1};

const TMD_SIZE: usize = 0x208;

fn scratch(name: &str) -> PathBuf {
  let dir = env::temp_dir().join(format!("maketmd-{}-{name}", std::process::id()));
  let _ = fs::remove_dir_all(&dir);
  fs::create_dir_all(&dir).unwrap();
  dir
}

fn maketmd(dir: &Path, args: &[&Path]) -> Output {
  Command::new(env!("CARGO_BIN_EXE_maketmd"))
    .current_dir(dir)
    .args(args)
    .output()
    .unwrap()
}

fn application(len: usize) -> Vec<u8> {
  let mut image: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
  image[0x0C..0x10].copy_from_slice(b"KGDE");
  image[0x10..0x12].copy_from_slice(b"01");
  image[0x234..0x238].copy_from_slice(&[0x04, 0x00, 0x03, 0x00]);
  image
}

#[test]
fn writes_descriptor_to_destination() {
  let dir = scratch("destination");
  let app = dir.join("game.app");
  let tmd = dir.join("out.tmd");
  let image = application(0x1234);
  fs::write(&app, &image).unwrap();

  let output = maketmd(&dir, &[&app, &tmd]);
  assert!(output.status.success(), "{output:?}");
  assert!(String::from_utf8_lossy(&output.stdout).starts_with("TMD Creator for DSiWare Homebrew"));

  let data = fs::read(&tmd).unwrap();
  assert_eq!(data.len(), TMD_SIZE);
  assert_eq!(&data[0x18C..0x194], &[0x00, 0x03, 0x00, 0x04, b'K', b'G', b'D', b'E']);
  assert_eq!(&data[0x198..0x19A], b"01");
  assert!(data[0x1AA..0x1BA].iter().all(|byte| *byte == 0x80));
  assert_eq!(&data[0x1DE..0x1E0], &[0, 1]);
  assert_eq!(&data[0x1EA..0x1EC], &[0, 1]);
  assert_eq!(&data[0x1F0..0x1F4], &[0x00, 0x00, 0x12, 0x34]);
  assert_eq!(&data[0x1F4..], Sha1::digest(&image).as_slice());
  assert!(data[..0x18C].iter().all(|byte| *byte == 0));
}

#[test]
fn defaults_to_title_tmd() {
  let dir = scratch("default");
  let app = dir.join("game.app");
  fs::write(&app, application(0x238)).unwrap();

  let output = maketmd(&dir, &[&app]);
  assert!(output.status.success(), "{output:?}");
  assert_eq!(fs::read(dir.join("title.tmd")).unwrap().len(), TMD_SIZE);
}

#[test]
fn rerun_overwrites_identically() {
  let dir = scratch("rerun");
  let app = dir.join("game.app");
  let tmd = dir.join("title.tmd");
  fs::write(&app, application(0x800)).unwrap();
  fs::write(&tmd, vec![0xAA; 0x1000]).unwrap();

  assert!(maketmd(&dir, &[&app, &tmd]).status.success());
  let first = fs::read(&tmd).unwrap();
  assert!(maketmd(&dir, &[&app, &tmd]).status.success());
  let second = fs::read(&tmd).unwrap();

  assert_eq!(first.len(), TMD_SIZE);
  assert_eq!(first, second);
}

#[test]
fn missing_source_prints_usage() {
  let dir = scratch("usage");

  let output = maketmd(&dir, &[]);
  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stdout).contains("Usage"));
  assert!(!dir.join("title.tmd").exists());
}

#[test]
fn unreadable_source_writes_nothing() {
  let dir = scratch("unreadable");
  let app = dir.join("missing.app");

  let output = maketmd(&dir, &[&app]);
  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stdout).contains("for reading."));
  assert!(!dir.join("title.tmd").exists());
}

#[test]
fn truncated_source_writes_nothing() {
  let dir = scratch("truncated");
  let app = dir.join("short.app");
  fs::write(&app, vec![0u8; 0x100]).unwrap();

  let output = maketmd(&dir, &[&app]);
  assert_eq!(output.status.code(), Some(1));
  assert!(!dir.join("title.tmd").exists());
}

#[test]
fn unwritable_destination_fails() {
  let dir = scratch("unwritable");
  let app = dir.join("game.app");
  fs::write(&app, application(0x238)).unwrap();
  let tmd = dir.join("no-such-dir").join("title.tmd");

  let output = maketmd(&dir, &[&app, &tmd]);
  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stdout).contains("for writing."));
}

#[test]
fn help_succeeds() {
  let dir = scratch("help");

  let output = maketmd(&dir, &[Path::new("--help")]);
  assert!(output.status.success());
}
