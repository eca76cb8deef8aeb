//! `compile <schema-file> [<output-file>]`
//!
//! Small, std-only argument handling in the style of
//! `prost-build/src/bin/protoc-gen-rust.rs` (no `clap`): this binary has
//! exactly two positional arguments and one job. On success it writes the
//! generated Rust source to `<output-file>`, or to standard output if none
//! is given, and exits 0. On failure it prints a single diagnostic line of
//! the form `<path>:<line>:<column>: error: <message>` to standard error
//! and exits non-zero.

use std::fs;
use std::io::Write;
use std::process::ExitCode;

fn usage() -> ! {
    eprintln!("usage: compile <schema-file> [<output-file>]");
    std::process::exit(2);
}

fn run() -> Result<(), String> {
    let mut args = std::env::args().skip(1);
    let schema_path = args.next().unwrap_or_else(|| usage());
    let output_path = args.next();

    let source = fs::read_to_string(&schema_path)
        .map_err(|e| format!("{schema_path}: error: {e}"))?;

    let generated = protojson::compile_str(&source, &schema_path)
        .map_err(|e| e.diagnostic(&schema_path))?;

    match output_path {
        Some(path) => {
            fs::write(&path, generated).map_err(|e| format!("{path}: error: {e}"))?;
        }
        None => {
            std::io::stdout()
                .write_all(generated.as_bytes())
                .map_err(|e| format!("<stdout>: error: {e}"))?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(diagnostic) => {
            eprintln!("{diagnostic}");
            ExitCode::FAILURE
        }
    }
}
