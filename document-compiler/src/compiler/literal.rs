use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::ast;
use apollo_compiler::ast::Type;
use itertools::Itertools;

use crate::document_spec::LiteralValue;
use crate::error::CompileError;
use crate::operation_path::OperationPath;
use crate::schema::SchemaDescriptor;

/// Converts an explicit argument value to a GraphQL value.
///
/// `ty` is the declared type of the value, when known. It is used to emit enum values for
/// strings given to enum-typed inputs, down through lists and input object fields. Input
/// object members are emitted sorted by key, whatever their order in `literal`.
pub(crate) fn literal_to_value<S: SchemaDescriptor + ?Sized>(
    schema: &S,
    literal: &LiteralValue,
    ty: Option<&Type>,
    path: &OperationPath,
) -> Result<ast::Value, CompileError> {
    convert(schema, literal, ty).map_err(|message| CompileError::InvalidLiteral {
        path: path.clone(),
        message,
    })
}

fn convert<S: SchemaDescriptor + ?Sized>(
    schema: &S,
    literal: &LiteralValue,
    ty: Option<&Type>,
) -> Result<ast::Value, String> {
    Ok(match literal {
        LiteralValue::Null => ast::Value::Null,
        LiteralValue::Bool(value) => ast::Value::Boolean(*value),
        LiteralValue::Number(number) => number_value(&number.to_string()),
        LiteralValue::String(value) => {
            let is_enum = ty.is_some_and(|ty| schema.is_enum(ty.inner_named_type()));
            match Name::new(value.as_str()) {
                Ok(enum_value) if is_enum => ast::Value::Enum(enum_value),
                _ => ast::Value::String(value.clone()),
            }
        }
        LiteralValue::Array(items) => {
            let item_type = ty.and_then(list_item_type);
            ast::Value::List(
                items
                    .iter()
                    .map(|item| convert(schema, item, item_type).map(Node::new))
                    .collect::<Result<_, _>>()?,
            )
        }
        LiteralValue::Object(members) => {
            let input_object = ty.map(Type::inner_named_type);
            // Members are emitted in key order: equal literals must print the same.
            ast::Value::Object(
                members
                    .iter()
                    .sorted_by(|(left, _), (right, _)| left.cmp(right))
                    .map(|(key, value)| {
                        let key = Name::new(key.as_str()).map_err(|_| {
                            format!("object key `{}` is not a valid GraphQL name", key.as_str())
                        })?;
                        let member_type = input_object
                            .and_then(|input_object| schema.input_field_type(input_object, &key));
                        let value = convert(schema, value, member_type)?;
                        Ok((key, Node::new(value)))
                    })
                    .collect::<Result<_, String>>()?,
            )
        }
    })
}

/// JSON numbers without a fraction or exponent are GraphQL integers, whatever their size.
fn number_value(text: &str) -> ast::Value {
    if text.contains(['.', 'e', 'E']) {
        ast::Value::Float(ast::FloatValue::new_parsed(text))
    } else {
        ast::Value::Int(ast::IntValue::new_parsed(text))
    }
}

fn list_item_type(ty: &Type) -> Option<&Type> {
    match ty {
        Type::List(item) | Type::NonNullList(item) => Some(item.as_ref()),
        Type::Named(_) | Type::NonNullNamed(_) => None,
    }
}

/// Whether `ty` is a list, ignoring non-null wrapping.
pub(crate) fn is_list_type(ty: &Type) -> bool {
    list_item_type(ty).is_some()
}
