//! Compiles a [`DocumentSpec`] into a GraphQL query document.
//!
//! Compilation happens in three passes over the selections of the spec, bucketed by depth:
//! 1. [`levels`] indexes every field path along with its ancestors,
//! 2. [`resolve`] walks the levels from the root down and resolves each path to a field of the
//!    schema, following interfaces and fragment type conditions,
//! 3. [`assemble`] walks the levels from the deepest up, synthesizing arguments and folding
//!    fields into their parents' selection sets.
//!
//! Any error aborts compilation: no partial document is ever returned.

use apollo_compiler::Node;
use apollo_compiler::ast;

use crate::document_spec::DocumentSpec;
use crate::error::CompileError;
use crate::schema::SchemaDescriptor;

mod arguments;
mod assemble;
mod levels;
mod literal;
mod resolve;
mod variables;

/// Compiles `spec` into a query document executable against `schema`.
///
/// The document contains one anonymous query operation followed by its fragment definitions.
/// The output only depends on the content of `schema` and `spec`: compiling the same spec twice
/// gives the same document.
#[tracing::instrument(
    name = "compile_document",
    level = "debug",
    skip_all,
    fields(
        field_paths = spec.field_paths().len(),
        variables = tracing::field::Empty,
    )
)]
pub fn compile<S: SchemaDescriptor + ?Sized>(
    schema: &S,
    spec: &DocumentSpec,
) -> Result<ast::Document, CompileError> {
    let result = compile_document(schema, spec);
    if let Err(error) = &result {
        tracing::debug!(code = error.code(), "failed to compile document: {error}");
    }
    result
}

fn compile_document<S: SchemaDescriptor + ?Sized>(
    schema: &S,
    spec: &DocumentSpec,
) -> Result<ast::Document, CompileError> {
    let index = levels::LevelIndex::new(spec.field_paths());
    let resolved = resolve::resolve_fields(schema, &index)?;
    let assembled = assemble::assemble(schema, spec, &index, &resolved)?;
    tracing::Span::current().record("variables", assembled.variables.len());

    let mut document = ast::Document::new();
    document
        .definitions
        .push(ast::Definition::OperationDefinition(Node::new(
            ast::OperationDefinition {
                operation_type: ast::OperationType::Query,
                name: None,
                variables: assembled.variables.into_vec(),
                directives: Default::default(),
                selection_set: assembled.selection_set,
            },
        )));
    document.definitions.extend(
        assembled
            .fragments
            .into_vec()
            .into_iter()
            .map(ast::Definition::FragmentDefinition),
    );
    Ok(document)
}
