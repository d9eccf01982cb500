use std::collections::HashMap;

use apollo_compiler::Name;
use apollo_compiler::ast::FieldDefinition;

use super::levels::LevelIndex;
use crate::error::CompileError;
use crate::operation_path::OperationPath;
use crate::operation_path::SelectionSegment;
use crate::schema::SchemaDescriptor;

/// The schema field a selection path resolved to.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedField<'schema> {
    pub(crate) definition: &'schema FieldDefinition,
    /// The composite type of the field's value, `None` for leaf fields.
    pub(crate) implementing_type: Option<Name>,
}

pub(crate) type ResolvedFields<'schema> = HashMap<OperationPath, ResolvedField<'schema>>;

/// Resolves every indexed path to a field definition, from the root down.
///
/// Each level only looks at the implementing types recorded for the level above, so a path is
/// resolved against the type its parent selection actually returns.
pub(crate) fn resolve_fields<'schema, S: SchemaDescriptor + ?Sized>(
    schema: &'schema S,
    index: &LevelIndex,
) -> Result<ResolvedFields<'schema>, CompileError> {
    let Some(query_type) = schema.query_root_type() else {
        crate::bail!("Schema has no query root type");
    };
    let mut resolved = ResolvedFields::with_capacity(index.len());
    for (level, paths) in index.ascending() {
        tracing::trace!(level, paths = paths.len(), "resolving level");
        for path in paths {
            let Some(segment) = path.last_segment() else {
                crate::bail!("Level {level} contains the root path");
            };
            let parent = path.parent_path().unwrap_or_default();
            let parent_type = if parent.is_root() {
                query_type
            } else {
                let Some(parent_field) = resolved.get(&parent) else {
                    crate::bail!("Path `{path}` was indexed without its parent `{parent}`");
                };
                match &parent_field.implementing_type {
                    Some(parent_type) => parent_type,
                    // Leaf fields have no sub-selections.
                    None => {
                        return Err(CompileError::SchemaResolution {
                            path: path.clone(),
                            type_name: parent_field.definition.ty.inner_named_type().clone(),
                            field_name: segment.field_name().clone(),
                        });
                    }
                }
            };
            let Some(definition) = resolve_segment(schema, parent_type, segment) else {
                return Err(CompileError::SchemaResolution {
                    path: path.clone(),
                    type_name: parent_type.clone(),
                    field_name: segment.field_name().clone(),
                });
            };
            let implementing_type = schema.implementing_type(&definition.ty);
            resolved.insert(
                path.clone(),
                ResolvedField {
                    definition,
                    implementing_type,
                },
            );
        }
    }
    Ok(resolved)
}

/// Finds the definition of the field a segment selects under `parent_type`.
///
/// Fragment segments are looked up on their type condition first. Otherwise the field comes
/// from the parent type or, for abstract types, from the first implementation (in name order)
/// that declares it.
fn resolve_segment<'schema, S: SchemaDescriptor + ?Sized>(
    schema: &'schema S,
    parent_type: &Name,
    segment: &SelectionSegment,
) -> Option<&'schema FieldDefinition> {
    let field_name = segment.field_name();
    segment
        .type_condition()
        .and_then(|type_condition| schema.field(type_condition, field_name))
        .or_else(|| schema.field(parent_type, field_name))
        .or_else(|| {
            schema
                .implementations(parent_type)
                .iter()
                .find_map(|implementation| schema.field(implementation, field_name))
        })
}
