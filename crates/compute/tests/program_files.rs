//! TOML program files: the shipped samples under `data/programs/` and
//! files written on the fly.

use std::io::Write;
use std::path::PathBuf;

use vliw_compute::{engine, ProgramFile};
use vliw_core::{Value, VliwError};

/// Integration tests run from the crate directory, so go up two levels.
fn programs_dir() -> PathBuf {
    let manifest = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest.join("../../data/programs")
}

fn run_sample(filename: &str, width: usize) -> vliw_compute::RegisterFile {
    let file = ProgramFile::from_path(programs_dir().join(filename))
        .unwrap_or_else(|e| panic!("Failed to load {}: {}", filename, e));
    let program = file.program().unwrap();
    engine::execute(&program, &file.inputs, width).unwrap()
}

#[test]
fn sum_product_sample() {
    for width in [1, 2, 4, 50] {
        assert_eq!(run_sample("sum_product.toml", width).output(), Some(Value::Int(80)));
    }
}

#[test]
fn latency_chain_sample() {
    let file = run_sample("latency_chain.toml", 2);
    assert_eq!(file.output(), Some(Value::Int(28)));
    assert_eq!(file.cycles(), 17);
}

#[test]
fn register_reuse_sample_keeps_hazards_apart() {
    for width in [1, 2, 4] {
        let file = run_sample("register_reuse.toml", width);
        assert_eq!(file.output_named("difference"), Some(Value::Int(6)), "width {}", width);
    }
}

#[test]
fn program_written_to_disk() {
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        tmp,
        r#"
[[instr]]
op = "load"
dest = "a"
src1 = "x"

[[instr]]
op = "DIV"
dest = "b"
src1 = "a"
src2 = "two"

[[instr]]
op = "STORE"
dest = "b"
src1 = "half"

[inputs]
x = 7
two = 2
"#
    )
    .unwrap();

    let file = ProgramFile::from_path(tmp.path()).unwrap();
    let program = file.program().unwrap();
    let out = engine::execute(&program, &file.inputs, 2).unwrap();
    assert_eq!(out.output_named("half"), Some(Value::Float(3.5)));
}

#[test]
fn unknown_operation_in_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[[instr]]\nop = \"FMA\"\ndest = \"R1\"\n").unwrap();

    let file = ProgramFile::from_path(&path).unwrap();
    assert!(matches!(file.program(), Err(VliwError::UnknownOperation(op)) if op == "FMA"));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ProgramFile::from_path(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, VliwError::Io(_)));
}
