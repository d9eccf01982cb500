use apollo_compiler::Node;
use apollo_compiler::ast;
use apollo_compiler::ast::FieldDefinition;
use apollo_compiler::ast::InputValueDefinition;

use super::literal::is_list_type;
use super::literal::literal_to_value;
use super::variables::VariableDefinitions;
use crate::document_spec::DocumentSpec;
use crate::error::CompileError;
use crate::operation_path::OperationPath;
use crate::schema::SchemaDescriptor;

/// Builds the arguments of the field selected at `field_path`, one for every argument the
/// schema declares, in argument-name order.
///
/// Each argument takes the first value available out of:
/// 1. a variable bound to the argument path, declared in `variables` with the argument's type
///    and the explicit default (if any) as its default value; a variable bound to several
///    arguments takes the default of its first argument path,
/// 2. the explicit default of the argument path,
/// 3. the default declared by the schema,
/// 4. an empty list, for list arguments,
/// 5. `null`, for nullable arguments.
///
/// A required argument with none of these fails with [`CompileError::ArgumentBinding`].
pub(crate) fn synthesize_arguments<S: SchemaDescriptor + ?Sized>(
    schema: &S,
    spec: &DocumentSpec,
    field_path: &OperationPath,
    definition: &FieldDefinition,
    variables: &mut VariableDefinitions,
) -> Result<Vec<Node<ast::Argument>>, CompileError> {
    let mut argument_definitions = definition.arguments.iter().collect::<Vec<_>>();
    argument_definitions.sort_by(|left, right| left.name.cmp(&right.name));
    argument_definitions
        .into_iter()
        .map(|argument| {
            let argument_path = field_path.argument_path(argument.name.clone());
            let value = argument_value(schema, spec, &argument_path, argument, variables)?;
            Ok(Node::new(ast::Argument {
                name: argument.name.clone(),
                value: Node::new(value),
            }))
        })
        .collect()
}

fn argument_value<S: SchemaDescriptor + ?Sized>(
    schema: &S,
    spec: &DocumentSpec,
    argument_path: &OperationPath,
    argument: &InputValueDefinition,
    variables: &mut VariableDefinitions,
) -> Result<ast::Value, CompileError> {
    let explicit_default = spec
        .argument_default(argument_path)
        .map(|literal| literal_to_value(schema, literal, Some(&*argument.ty), argument_path))
        .transpose()?;

    if let Some(variable) = spec.variable_name(argument_path) {
        variables.add(
            argument_path,
            Node::new(ast::VariableDefinition {
                name: variable.clone(),
                ty: argument.ty.clone(),
                default_value: explicit_default.map(Node::new),
                directives: Default::default(),
            }),
        )?;
        return Ok(ast::Value::Variable(variable.clone()));
    }
    if let Some(value) = explicit_default {
        return Ok(value);
    }
    if let Some(value) = &argument.default_value {
        return Ok((**value).clone());
    }
    if is_list_type(&argument.ty) {
        return Ok(ast::Value::List(Vec::new()));
    }
    if !argument.ty.is_non_null() {
        return Ok(ast::Value::Null);
    }
    Err(CompileError::ArgumentBinding {
        path: argument_path.clone(),
        argument: argument.name.clone(),
        ty: (*argument.ty).clone(),
        message: "no variable, explicit value or schema default is available".to_owned(),
    })
}
