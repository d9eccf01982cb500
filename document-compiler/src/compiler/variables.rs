use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::ast;

use crate::error::CompileError;
use crate::operation_path::OperationPath;

/// The variable definitions of the operation being compiled, one per variable name.
///
/// Arguments are visited deepest level first, so each definition remembers the argument path
/// it came from: the definition kept for a variable is the one of its first argument path in
/// `OperationPath` order, whatever the visiting order.
#[derive(Debug, Default)]
pub(crate) struct VariableDefinitions {
    definitions: BTreeMap<Name, (OperationPath, Node<ast::VariableDefinition>)>,
}

impl VariableDefinitions {
    /// Records the definition of a variable used by the argument at `argument_path`.
    ///
    /// A variable feeding several arguments is declared once, as long as every argument has
    /// the same type.
    pub(crate) fn add(
        &mut self,
        argument_path: &OperationPath,
        definition: Node<ast::VariableDefinition>,
    ) -> Result<(), CompileError> {
        match self.definitions.entry(definition.name.clone()) {
            Entry::Vacant(entry) => {
                entry.insert((argument_path.clone(), definition));
                Ok(())
            }
            Entry::Occupied(mut entry) => {
                let (existing_path, existing) = entry.get();
                let first_in_path_order = argument_path < existing_path;
                if existing.ty != definition.ty {
                    let (existing, conflicting) = if first_in_path_order {
                        (&definition.ty, &existing.ty)
                    } else {
                        (&existing.ty, &definition.ty)
                    };
                    return Err(CompileError::VariableRedefinition {
                        variable: definition.name.clone(),
                        existing: (**existing).clone(),
                        conflicting: (**conflicting).clone(),
                    });
                }
                if first_in_path_order {
                    entry.insert((argument_path.clone(), definition));
                }
                Ok(())
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.definitions.len()
    }

    /// The definitions in variable-name order.
    pub(crate) fn into_vec(self) -> Vec<Node<ast::VariableDefinition>> {
        self.definitions
            .into_values()
            .map(|(_, definition)| definition)
            .collect()
    }
}
