use std::collections::BTreeMap;
use std::collections::HashMap;
use std::collections::btree_map::Entry;

use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::ast;
use apollo_compiler::name;
use itertools::Itertools;

use super::arguments::synthesize_arguments;
use super::levels::LevelIndex;
use super::resolve::ResolvedFields;
use super::variables::VariableDefinitions;
use crate::document_spec::DocumentSpec;
use crate::error::CompileError;
use crate::operation_path::OperationPath;
use crate::operation_path::SelectionSegment;
use crate::schema::SchemaDescriptor;

/// The pieces of a query document, before they are put together.
#[derive(Debug)]
pub(crate) struct AssembledOperation {
    pub(crate) selection_set: Vec<ast::Selection>,
    pub(crate) variables: VariableDefinitions,
    pub(crate) fragments: FragmentDefinitions,
}

/// Builds the selection tree bottom-up, deepest level first.
///
/// Each level folds the selections built for the level below into the fields of its own
/// paths, then hands its fields to their parents. Siblings are visited in `OperationPath`
/// order, and siblings sharing a fragment context end up next to each other in that order.
pub(crate) fn assemble<S: SchemaDescriptor + ?Sized>(
    schema: &S,
    spec: &DocumentSpec,
    index: &LevelIndex,
    resolved: &ResolvedFields<'_>,
) -> Result<AssembledOperation, CompileError> {
    let mut assembler = Assembler {
        schema,
        spec,
        resolved,
        selection_sets: HashMap::new(),
        variables: VariableDefinitions::default(),
        fragments: FragmentDefinitions::default(),
    };
    for (level, paths) in index.descending() {
        tracing::trace!(level, paths = paths.len(), "assembling level");
        for (parent, siblings) in &paths.iter().chunk_by(|path| path.parent_path()) {
            let Some(parent) = parent else {
                crate::bail!("Level {level} contains the root path");
            };
            let selection_set = assembler.assemble_siblings(siblings)?;
            let previous = assembler.selection_sets.insert(parent, selection_set);
            crate::ensure!(
                previous.is_none(),
                "Selections of a parent were split across chunks at level {level}"
            );
        }
    }

    let mut selection_set = assembler
        .selection_sets
        .remove(&OperationPath::root())
        .unwrap_or_default();
    crate::ensure!(
        assembler.selection_sets.is_empty(),
        "Selections were assembled for paths that are not part of the tree: {:?}",
        assembler.selection_sets.keys().collect::<Vec<_>>()
    );
    if selection_set.is_empty() {
        selection_set.push(typename_selection());
    }
    Ok(AssembledOperation {
        selection_set,
        variables: assembler.variables,
        fragments: assembler.fragments,
    })
}

struct Assembler<'a, 'schema, S: ?Sized> {
    schema: &'schema S,
    spec: &'a DocumentSpec,
    resolved: &'a ResolvedFields<'schema>,
    /// The selection set assembled for each path of the level above the current one.
    selection_sets: HashMap<OperationPath, Vec<ast::Selection>>,
    variables: VariableDefinitions,
    fragments: FragmentDefinitions,
}

impl<S: SchemaDescriptor + ?Sized> Assembler<'_, '_, S> {
    /// Builds the selection set of a parent from its children, which must be sorted.
    fn assemble_siblings<'p>(
        &mut self,
        siblings: impl Iterator<Item = &'p OperationPath>,
    ) -> Result<Vec<ast::Selection>, CompileError> {
        let mut selection_set = Vec::new();
        let groups = siblings.chunk_by(|path: &&'p OperationPath| SelectionGroup::of(*path));
        for (group, members) in &groups {
            let mut fields = Vec::new();
            for path in members {
                fields.push(self.field(path)?);
            }
            match group {
                SelectionGroup::Plain => {
                    selection_set.extend(fields.into_iter().map(ast::Selection::Field));
                }
                SelectionGroup::Inline(type_condition) => {
                    selection_set.push(ast::Selection::InlineFragment(Node::new(
                        ast::InlineFragment {
                            type_condition: Some(type_condition.clone()),
                            directives: Default::default(),
                            selection_set: fields.into_iter().map(ast::Selection::Field).collect(),
                        },
                    )));
                }
                SelectionGroup::Spread {
                    fragment_name,
                    type_condition,
                } => {
                    self.fragments.add(Node::new(ast::FragmentDefinition {
                        name: fragment_name.clone(),
                        type_condition: type_condition.clone(),
                        directives: Default::default(),
                        selection_set: fields.into_iter().map(ast::Selection::Field).collect(),
                    }))?;
                    selection_set.push(ast::Selection::FragmentSpread(Node::new(
                        ast::FragmentSpread {
                            fragment_name: fragment_name.clone(),
                            directives: Default::default(),
                        },
                    )));
                }
            }
        }
        Ok(selection_set)
    }

    /// The field selected by `path`, with its arguments and the selections assembled for it.
    fn field(&mut self, path: &OperationPath) -> Result<Node<ast::Field>, CompileError> {
        let (Some(segment), Some(resolved)) = (path.last_segment(), self.resolved.get(path)) else {
            crate::bail!("Path `{path}` was not resolved before assembly");
        };
        let arguments = synthesize_arguments(
            self.schema,
            self.spec,
            path,
            resolved.definition,
            &mut self.variables,
        )?;
        let mut selection_set = self.selection_sets.remove(path).unwrap_or_default();
        // Composite fields need at least one selection.
        if selection_set.is_empty() && resolved.implementing_type.is_some() {
            selection_set.push(typename_selection());
        }
        Ok(Node::new(ast::Field {
            alias: segment.alias().cloned(),
            name: segment.field_name().clone(),
            arguments,
            directives: Default::default(),
            selection_set,
        }))
    }
}

/// The fragment context shared by consecutive siblings.
#[derive(Debug, PartialEq)]
enum SelectionGroup<'a> {
    Plain,
    Inline(&'a Name),
    Spread {
        fragment_name: &'a Name,
        type_condition: &'a Name,
    },
}

impl SelectionGroup<'_> {
    fn of(path: &OperationPath) -> SelectionGroup<'_> {
        match path.last_segment() {
            Some(SelectionSegment::InlineFragment { type_condition, .. }) => {
                SelectionGroup::Inline(type_condition)
            }
            Some(SelectionSegment::FragmentSpread {
                fragment_name,
                type_condition,
                ..
            }) => SelectionGroup::Spread {
                fragment_name,
                type_condition,
            },
            Some(SelectionSegment::Field(_) | SelectionSegment::AliasedField { .. }) | None => {
                SelectionGroup::Plain
            }
        }
    }
}

/// The fragment definitions of the document, one per fragment name.
#[derive(Debug, Default)]
pub(crate) struct FragmentDefinitions {
    definitions: BTreeMap<Name, Node<ast::FragmentDefinition>>,
}

impl FragmentDefinitions {
    /// Records a fragment definition. The same fragment can be spread under several parents,
    /// but every spread must produce the same definition.
    fn add(&mut self, definition: Node<ast::FragmentDefinition>) -> Result<(), CompileError> {
        match self.definitions.entry(definition.name.clone()) {
            Entry::Vacant(entry) => {
                entry.insert(definition);
                Ok(())
            }
            Entry::Occupied(entry) if *entry.get() == definition => Ok(()),
            Entry::Occupied(_) => Err(CompileError::FragmentRedefinition {
                fragment: definition.name.clone(),
            }),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.definitions.len()
    }

    /// The definitions in fragment-name order.
    pub(crate) fn into_vec(self) -> Vec<Node<ast::FragmentDefinition>> {
        self.definitions.into_values().collect()
    }
}

fn typename_selection() -> ast::Selection {
    ast::Selection::Field(Node::new(ast::Field {
        alias: None,
        name: name!("__typename"),
        arguments: Vec::new(),
        directives: Default::default(),
        selection_set: Vec::new(),
    }))
}
