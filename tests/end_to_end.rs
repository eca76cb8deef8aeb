//! Compiles real schema fixtures with the `compile` binary — the exact
//! artifact an end user of this crate gets — then compiles and *runs* the
//! result with `rustc`, asserting on the harness binary's exit status. This
//! exercises the round-trip property (`deserialize(serialize(x)) == x`) and
//! the literal end-to-end scenarios against genuinely compiled and executed
//! generated code, rather than the generated-source substring checks in
//! `tests/compile.rs`.
//!
//! Each generated artifact uses absolute `crate::`-rooted paths
//! (`crate::json_rt::...`), so it must sit at the root of whatever crate
//! compiles it. A fixture's harness is therefore built as its own
//! standalone `--crate-type bin`, with the generated artifact prepended and
//! a `fn main()` appended, rather than `include!`d into a `mod` of this
//! test binary (which would put it one level below `crate::`).

use std::io::Write;
use std::process::Command;

fn rustc_path() -> String {
    std::env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string())
}

/// Writes `schema` to a temp file, compiles it with the `compile` binary,
/// appends `harness` (a `fn main()` exercising the generated types) to the
/// result, compiles the combined source with `rustc`, and runs it. Panics
/// with the compiler's or rustc's own diagnostic output on any failure.
fn compile_and_run(name: &str, schema: &str, harness: &str) {
    let dir = tempfile::Builder::new().prefix("protojson-e2e").tempdir().unwrap();

    let schema_path = dir.path().join(format!("{name}.proto"));
    std::fs::write(&schema_path, schema).unwrap();

    let generated_path = dir.path().join(format!("{name}_generated.rs"));
    let status = Command::new(env!("CARGO_BIN_EXE_compile"))
        .arg(&schema_path)
        .arg(&generated_path)
        .status()
        .expect("failed to invoke the `compile` binary");
    assert!(status.success(), "`compile` failed for fixture '{name}'");

    let generated = std::fs::read_to_string(&generated_path).unwrap();

    let harness_path = dir.path().join(format!("{name}_harness.rs"));
    {
        let mut file = std::fs::File::create(&harness_path).unwrap();
        writeln!(file, "{generated}").unwrap();
        writeln!(file, "{harness}").unwrap();
    }

    let bin_path = dir.path().join(name);
    let output = Command::new(rustc_path())
        .arg("--edition=2021")
        .arg("-o")
        .arg(&bin_path)
        .arg(&harness_path)
        .output()
        .expect("failed to invoke rustc");
    assert!(
        output.status.success(),
        "rustc failed to compile fixture '{name}':\n{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let run = Command::new(&bin_path).output().expect("failed to run compiled fixture");
    assert!(
        run.status.success(),
        "fixture '{name}' panicked at runtime:\n{}",
        String::from_utf8_lossy(&run.stderr)
    );
}

#[test]
fn minimal_message_round_trips_through_real_json() {
    compile_and_run(
        "minimal",
        r#"syntax = "proto3";
           message Person {
               string name = 1;
               int32 age = 2;
           }"#,
        r#"
        fn main() {
            let params = json_rt::Parameters::default();
            let input = r#"{"name":"Ada","age":36}"#;
            let person = Person::deserialize(input, &params).unwrap();
            assert_eq!(person.name.as_deref(), Some("Ada"));
            assert_eq!(person.age, Some(36));
            assert_eq!(person.serialize(&params), input);

            let copy = Person::deserialize(&person.serialize(&params), &params).unwrap();
            assert!(person.equal(&copy));
        }
        "#,
    );
}

#[test]
fn repeated_field_round_trips_and_omits_absent_optional_field() {
    compile_and_run(
        "repeated",
        r#"message Person {
               string name = 1;
               int32 age = 2;
               repeated string friends = 3;
           }"#,
        r#"
        fn main() {
            let params = json_rt::Parameters::default();
            let input = r#"{"name":"Ada","friends":["Bob","Cy"]}"#;
            let person = Person::deserialize(input, &params).unwrap();
            assert_eq!(person.name.as_deref(), Some("Ada"));
            assert_eq!(person.age, None);
            assert_eq!(person.friends, vec!["Bob".to_string(), "Cy".to_string()]);
            assert_eq!(person.serialize(&params), input);
        }
        "#,
    );
}

#[test]
fn bytes_field_serializes_to_the_expected_base64_and_round_trips() {
    compile_and_run(
        "bytes",
        "message Blob { bytes data = 1; }",
        r#"
        fn main() {
            let params = json_rt::Parameters::default();
            let mut blob = Blob::default();
            blob.data = vec![0xDE, 0xAD, 0xBE, 0xEF];
            let out = blob.serialize(&params);
            assert_eq!(out, r#"{"data":"3q2+7w=="}"#);

            let copy = Blob::deserialize(&out, &params).unwrap();
            assert_eq!(copy.data, blob.data);
            assert!(copy.equal(&blob));
        }
        "#,
    );
}

#[test]
fn obfuscated_schema_still_deserializes_real_input() {
    compile_and_run(
        "obfuscated",
        r#"option obfuscate_strings = true;
           message Person { string name = 1; }"#,
        r#"
        fn main() {
            let params = json_rt::Parameters::default();
            let person = Person::deserialize(r#"{"name":"Grace"}"#, &params).unwrap();
            assert_eq!(person.name.as_deref(), Some("Grace"));
            assert_eq!(person.serialize(&params), r#"{"name":"Grace"}"#);
        }
        "#,
    );
}

#[test]
fn nested_message_field_round_trips_and_clear_empties_every_field() {
    compile_and_run(
        "nested",
        r#"message Address { string city = 1; }
           message Person {
               string name = 1;
               Address address = 2;
           }"#,
        r#"
        fn main() {
            let params = json_rt::Parameters::default();
            let input = r#"{"name":"Ada","address":{"city":"London"}}"#;
            let mut person = Person::deserialize(input, &params).unwrap();
            assert_eq!(person.address.as_ref().unwrap().city.as_deref(), Some("London"));
            assert!(!person.is_empty());

            let copy = Person::deserialize(&person.serialize(&params), &params).unwrap();
            assert!(person.equal(&copy));

            person.clear();
            assert!(person.is_empty());
            assert_eq!(person.serialize(&params), "{}");
        }
        "#,
    );
}
