//! Binds textual type names to message indices and orders messages for
//! emission.
//!
//! The topological order is produced by a hand-rolled DFS (active/done
//! sets) over each message's own `fields`, the same shape as `cppgen.cc`'s
//! `sort()` (`pending`/`output` sets): a message's referenced messages are
//! visited in field declaration order, so independent siblings keep their
//! source order in the output, per §4.3's tie-break rule. The
//! `CircularReference` diagnostic names the specific message where the
//! cycle was detected, which is why this is a hand-rolled DFS rather than
//! a library toposort.

use crate::ast::{FieldKind, Schema};
use crate::error::{CompileError, CompileResult};

pub fn resolve(schema: &mut Schema) -> CompileResult<()> {
    bind(schema)?;
    let order = order_messages(schema)?;

    // `order[new_pos] == old_index`; build the inverse so every `MessageRef`
    // carrying an old-array index can be rewritten to point at the same
    // message's new position once `messages` is permuted below.
    let mut old_to_new = vec![0usize; order.len()];
    for (new_pos, &old_index) in order.iter().enumerate() {
        old_to_new[old_index] = new_pos;
    }

    schema.messages = order.into_iter().map(|i| schema.messages[i].clone()).collect();
    for message in &mut schema.messages {
        for field in &mut message.fields {
            if let FieldKind::Message(r) = &mut field.kind {
                if let Some(old_index) = r.resolved {
                    r.resolved = Some(old_to_new[old_index]);
                }
            }
        }
    }

    check_field_limits(schema)?;
    Ok(())
}

fn bind(schema: &mut Schema) -> CompileResult<()> {
    for i in 0..schema.messages.len() {
        for j in 0..schema.messages[i].fields.len() {
            let (qualified_name, line, column) = match &schema.messages[i].fields[j].kind {
                FieldKind::Message(r) if r.resolved.is_none() => {
                    (r.qualified_name.clone(), r.line, r.column)
                }
                _ => continue,
            };
            log::debug!(
                "resolving field '{}' of message '{}' to '{qualified_name}'",
                schema.messages[i].fields[j].name,
                schema.messages[i].qualified_name(),
            );
            let target = schema.find_by_qualified_name(&qualified_name).ok_or_else(|| {
                CompileError::UnresolvedType { qualified_name: qualified_name.clone(), line, column }
            })?;
            if let FieldKind::Message(r) = &mut schema.messages[i].fields[j].kind {
                r.resolved = Some(target);
            }
        }
    }
    Ok(())
}

/// Depth-first ordering: a message is appended to the output only after
/// every message it references by owning field has been appended.
fn order_messages(schema: &Schema) -> CompileResult<Vec<usize>> {
    let mut active = vec![false; schema.messages.len()];
    let mut done = vec![false; schema.messages.len()];
    let mut output = Vec::with_capacity(schema.messages.len());

    fn visit(
        index: usize,
        schema: &Schema,
        active: &mut [bool],
        done: &mut [bool],
        output: &mut Vec<usize>,
    ) -> CompileResult<()> {
        if done[index] {
            return Ok(());
        }
        if active[index] {
            return Err(CompileError::CircularReference {
                message_name: schema.messages[index].qualified_name(),
                line: schema.messages[index].line,
                column: schema.messages[index].column,
            });
        }
        active[index] = true;
        for field in &schema.messages[index].fields {
            if let FieldKind::Message(r) = &field.kind {
                let target = r.resolved.expect("binding pass must run before ordering");
                visit(target, schema, active, done, output)?;
            }
        }
        active[index] = false;
        done[index] = true;
        output.push(index);
        Ok(())
    }

    for i in 0..schema.messages.len() {
        visit(i, schema, &mut active, &mut done, &mut output)?;
    }

    Ok(output)
}

fn check_field_limits(schema: &Schema) -> CompileResult<()> {
    for message in &schema.messages {
        if message.fields.len() > crate::ast::MAX_FIELDS {
            return Err(CompileError::LimitExceeded {
                message_name: message.qualified_name(),
                max: crate::ast::MAX_FIELDS,
                line: message.line,
                column: message.column,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn resolved(src: &str) -> CompileResult<Schema> {
        let mut schema = Parser::new(src, "test.proto").parse()?;
        resolve(&mut schema)?;
        Ok(schema)
    }

    #[test]
    fn orders_dependency_before_dependent() {
        let schema = resolved("message A { B b = 1; } message B { string s = 1; }").unwrap();
        let names: Vec<_> = schema.messages.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn resolved_handles_point_at_post_reorder_positions() {
        let schema = resolved("message A { B b = 1; } message B { string s = 1; }").unwrap();
        // A is now at index 1 (after B); its field's resolved handle must
        // follow B to index 0, not keep pointing at B's pre-reorder index.
        let a = schema.messages.iter().position(|m| m.name == "A").unwrap();
        match &schema.messages[a].fields[0].kind {
            FieldKind::Message(r) => assert_eq!(r.resolved, Some(0)),
            _ => panic!("expected message field"),
        }
    }

    #[test]
    fn independent_siblings_keep_source_declaration_order() {
        // Root references X then Y; neither depends on the other, so both
        // must be emitted in the order they were first referenced, not
        // reversed.
        let schema = resolved(
            "message Root { X x = 1; Y y = 2; } message X { string s = 1; } message Y { string s = 1; }",
        )
        .unwrap();
        let names: Vec<_> = schema.messages.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["X", "Y", "Root"]);
    }

    #[test]
    fn detects_direct_cycle() {
        let err = resolved("message A { B b = 1; } message B { A a = 1; }").unwrap_err();
        assert!(matches!(err, CompileError::CircularReference { .. }));
    }

    #[test]
    fn self_reference_is_not_a_cycle_error_when_unresolved() {
        let err = resolved("message A { Nope n = 1; }").unwrap_err();
        assert!(matches!(err, CompileError::UnresolvedType { .. }));
    }

    #[test]
    fn field_count_over_max_is_rejected() {
        let mut src = String::from("message P {");
        for i in 1..=25 {
            src.push_str(&format!("int32 f{i} = {i};"));
        }
        src.push('}');
        let err = resolved(&src).unwrap_err();
        assert!(matches!(err, CompileError::LimitExceeded { .. }));
    }

    #[test]
    fn field_count_at_max_compiles() {
        let mut src = String::from("message P {");
        for i in 1..=24 {
            src.push_str(&format!("int32 f{i} = {i};"));
        }
        src.push('}');
        assert!(resolved(&src).is_ok());
    }
}
