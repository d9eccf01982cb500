use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::hash::Hash;
use std::hash::Hasher;

use apollo_compiler::Name;

use crate::error::CompileError;
use crate::operation_path::OperationPath;

/// An explicit argument value, in the JSON data model.
///
/// `serde_json` is built with `arbitrary_precision`, so numbers keep their exact text.
pub type LiteralValue = serde_json::Value;

/// What a query document must contain: the compiler's input.
///
/// - Field paths: every selection that must appear in the document. Their ancestors are
///   implied.
/// - Variable bindings: argument paths that take their value from a variable. An argument
///   path binds to at most one variable, while a variable may feed several arguments.
/// - Argument defaults: explicit literal values for argument paths. For a bound argument this
///   becomes the variable's default value.
///
/// Specs are immutable once built. Equality and hashing are structural, which makes a spec
/// usable as a cache key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentSpec {
    field_paths: BTreeSet<OperationPath>,
    argument_paths_by_variable_name: BTreeMap<Name, BTreeSet<OperationPath>>,
    variable_name_by_argument_path: BTreeMap<OperationPath, Name>,
    argument_default_literal_values_by_path: BTreeMap<OperationPath, LiteralValue>,
}

impl DocumentSpec {
    pub fn builder() -> DocumentSpecBuilder {
        DocumentSpecBuilder::default()
    }

    /// A builder pre-filled with the content of this spec.
    pub fn to_builder(&self) -> DocumentSpecBuilder {
        DocumentSpecBuilder { spec: self.clone() }
    }

    /// A derived copy of this spec with the edits made by `edit`.
    pub fn update(
        &self,
        edit: impl FnOnce(DocumentSpecBuilder) -> Result<DocumentSpecBuilder, CompileError>,
    ) -> Result<DocumentSpec, CompileError> {
        Ok(edit(self.to_builder())?.build())
    }

    pub fn field_paths(&self) -> &BTreeSet<OperationPath> {
        &self.field_paths
    }

    pub fn argument_paths_by_variable_name(&self) -> &BTreeMap<Name, BTreeSet<OperationPath>> {
        &self.argument_paths_by_variable_name
    }

    pub fn variable_name_by_argument_path(&self) -> &BTreeMap<OperationPath, Name> {
        &self.variable_name_by_argument_path
    }

    pub fn argument_default_literal_values_by_path(
        &self,
    ) -> &BTreeMap<OperationPath, LiteralValue> {
        &self.argument_default_literal_values_by_path
    }

    pub fn variable_name(&self, argument_path: &OperationPath) -> Option<&Name> {
        self.variable_name_by_argument_path.get(argument_path)
    }

    pub fn argument_default(&self, argument_path: &OperationPath) -> Option<&LiteralValue> {
        self.argument_default_literal_values_by_path
            .get(argument_path)
    }

    pub fn is_empty(&self) -> bool {
        self.field_paths.is_empty()
    }
}

impl Hash for DocumentSpec {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.field_paths.hash(state);
        // The inverse map is derived from this one, no need to hash both.
        self.argument_paths_by_variable_name.hash(state);
        self.argument_default_literal_values_by_path.len().hash(state);
        for (path, literal) in &self.argument_default_literal_values_by_path {
            path.hash(state);
            hash_literal(literal, state);
        }
    }
}

/// Hashes a literal consistently with its `Eq`: object members are hashed in key order, since
/// objects compare equal regardless of member order.
fn hash_literal<H: Hasher>(literal: &LiteralValue, state: &mut H) {
    std::mem::discriminant(literal).hash(state);
    match literal {
        LiteralValue::Null => {}
        LiteralValue::Bool(value) => value.hash(state),
        LiteralValue::Number(number) => number.to_string().hash(state),
        LiteralValue::String(value) => value.hash(state),
        LiteralValue::Array(items) => {
            items.len().hash(state);
            for item in items {
                hash_literal(item, state);
            }
        }
        LiteralValue::Object(object) => {
            let mut members = object.iter().collect::<Vec<_>>();
            members.sort_by(|(left, _), (right, _)| left.cmp(right));
            members.len().hash(state);
            for (key, value) in members {
                key.hash(state);
                hash_literal(value, state);
            }
        }
    }
}

/// Builds a [`DocumentSpec`]. Every call checks the mode of the path it is given and fails
/// immediately on a mismatch, so that a malformed spec is never built.
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct DocumentSpecBuilder {
    spec: DocumentSpec,
}

impl DocumentSpecBuilder {
    /// Adds a selection to the document. The path must refer to a selection.
    pub fn add_field_path(mut self, path: OperationPath) -> Result<Self, CompileError> {
        if !path.refers_to_selection() {
            return Err(CompileError::invariant(format!(
                "`{path}` is not a field path and cannot be selected"
            )));
        }
        self.spec.field_paths.insert(path);
        Ok(self)
    }

    pub fn add_field_paths(
        self,
        paths: impl IntoIterator<Item = OperationPath>,
    ) -> Result<Self, CompileError> {
        paths
            .into_iter()
            .try_fold(self, |builder, path| builder.add_field_path(path))
    }

    /// Binds the argument at `argument_path` to the variable `variable_name`.
    ///
    /// An argument path can only be bound to one variable; binding it again to the same
    /// variable is a no-op.
    pub fn bind_variable(
        mut self,
        variable_name: Name,
        argument_path: OperationPath,
    ) -> Result<Self, CompileError> {
        ensure_argument_path(&argument_path)?;
        if let Some(existing) = self
            .spec
            .variable_name_by_argument_path
            .get(&argument_path)
        {
            if *existing != variable_name {
                return Err(CompileError::invariant(format!(
                    "`{argument_path}` is already bound to `${existing}` and cannot also be bound to `${variable_name}`"
                )));
            }
            return Ok(self);
        }
        self.spec
            .argument_paths_by_variable_name
            .entry(variable_name.clone())
            .or_default()
            .insert(argument_path.clone());
        self.spec
            .variable_name_by_argument_path
            .insert(argument_path, variable_name);
        Ok(self)
    }

    /// Sets an explicit value for the argument at `argument_path`, replacing any previous one.
    pub fn set_argument_default(
        mut self,
        argument_path: OperationPath,
        literal: LiteralValue,
    ) -> Result<Self, CompileError> {
        ensure_argument_path(&argument_path)?;
        self.spec
            .argument_default_literal_values_by_path
            .insert(argument_path, literal);
        Ok(self)
    }

    pub fn build(self) -> DocumentSpec {
        self.spec
    }
}

fn ensure_argument_path(path: &OperationPath) -> Result<(), CompileError> {
    if path.refers_to_argument() {
        Ok(())
    } else {
        Err(CompileError::invariant(format!(
            "`{path}` does not refer to an argument"
        )))
    }
}
