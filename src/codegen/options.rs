//! Option validation against the recognized-option table and the
//! `OptionError` taxonomy.
//!
//! Grounded in `cppgen.cc`'s `get_option()` overloads: a recognized option
//! with the wrong value kind (e.g. `obfuscate_strings = "yes"` instead of a
//! boolean) throws; an option name the generator doesn't recognize is
//! silently accepted there. We keep that split but surface the unknown
//! case as a `log::warn!` instead of silence, matching this corpus's
//! preference for an observable pipeline over silent acceptance.

use crate::ast::{Field, Message, OptionKind, OptionMap, Schema};
use crate::error::{CompileError, CompileResult};

fn check_kind(options: &OptionMap, name: &str, want: OptionKind, scope: &str) -> CompileResult<()> {
    let Some(entry) = options.get(name) else {
        return Ok(());
    };
    if entry.kind != want {
        return Err(CompileError::option_error(
            entry.line,
            entry.column,
            format!("option '{name}' {scope} must be a {want:?} value"),
        ));
    }
    Ok(())
}

fn check_name_override(field: &Field) -> CompileResult<()> {
    let Some(entry) = field.options.get("name") else {
        return Ok(());
    };
    if entry.value.contains('\'') || entry.value.contains('"') {
        return Err(CompileError::option_error(
            entry.line,
            entry.column,
            format!("option 'name' on field '{}' must not contain quote characters", field.name),
        ));
    }
    Ok(())
}

fn warn_unknown(options: &OptionMap, recognized: &[&str], describe: impl Fn(&str) -> String) {
    for entry in options.iter() {
        if !recognized.contains(&entry.name.as_str()) {
            log::warn!("{}", describe(&entry.name));
        }
    }
}

fn validate_message(message: &Message) -> CompileResult<()> {
    warn_unknown(&message.options, &[], |name| {
        format!("unknown option '{name}' on message '{}'", message.name)
    });
    for field in &message.fields {
        check_kind(&field.options, "transient", OptionKind::Boolean, "on a field")?;
        check_kind(&field.options, "name", OptionKind::String, "on a field")?;
        check_name_override(field)?;
        warn_unknown(&field.options, &["transient", "name"], |name| {
            format!("unknown option '{name}' on field '{}' of message '{}'", field.name, message.name)
        });
    }
    Ok(())
}

pub fn validate(schema: &Schema) -> CompileResult<()> {
    check_kind(&schema.global_options, "obfuscate_strings", OptionKind::Boolean, "at schema scope")?;
    check_kind(&schema.global_options, "number_names", OptionKind::Boolean, "at schema scope")?;
    warn_unknown(&schema.global_options, &["obfuscate_strings", "number_names"], |name| {
        format!("unknown schema option '{name}'")
    });

    for message in &schema.messages {
        validate_message(message)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::resolver;

    fn compiled(src: &str) -> CompileResult<Schema> {
        let mut schema = Parser::new(src, "test.proto").parse()?;
        resolver::resolve(&mut schema)?;
        validate(&schema)?;
        Ok(schema)
    }

    #[test]
    fn rejects_non_boolean_obfuscate_strings() {
        let err = compiled(r#"option obfuscate_strings = "yes";"#).unwrap_err();
        assert!(matches!(err, CompileError::Option { .. }));
    }

    #[test]
    fn rejects_quoted_name_override() {
        let err =
            compiled(r#"message P { string s = 1 [name="bad\"name"]; }"#).unwrap_err();
        assert!(matches!(err, CompileError::Option { .. }));
    }

    #[test]
    fn accepts_well_formed_options() {
        compiled(
            r#"option number_names = true;
               message P { string s = 1 [name="pals", transient=false]; }"#,
        )
        .unwrap();
    }

    #[test]
    fn unrecognized_message_option_is_accepted_not_rejected() {
        // No message-scope option is recognized (§6's table only has schema-
        // and field-scope entries), so any message option is a warning, not
        // a compile error.
        compiled(r#"message P { option deprecated = true; string s = 1; }"#).unwrap();
    }
}
