//! Addresses for the pieces of a prospective GraphQL query.
//!
//! An [`OperationPath`] names a location independently of any particular document tree:
//! - a *selection*: the chain of fields and fragments leading to a field, e.g. `/user/name`,
//! - an *argument* of the field at the end of a selection, e.g. `/search?query`, optionally
//!   reaching into an input-object value, e.g. `/search?filter.author`,
//! - a *directive* occurrence on a selection, e.g. `/user@include`.
//!
//! Paths are plain values. They are never mutated in place; [`OperationPath::transform`]
//! derives new paths from existing ones.

use std::cmp::Ordering;
use std::fmt;

use apollo_compiler::Name;

mod parse;
#[cfg(test)]
mod tests;
mod transform;

pub use parse::PathParseError;
pub use transform::PathTransform;

/// The namespace tag of operation paths, printed by the alternate `Display` form (`{:#}`).
pub const SCHEME: &str = "gqlop";

/// One step of a selection chain.
///
/// Fragment segments carry the field selected inside the fragment, so that a path always ends
/// on a field. That field may be aliased like any other.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SelectionSegment {
    /// `name`
    Field(Name),
    /// `alias: name`
    AliasedField { alias: Name, name: Name },
    /// `... on TypeCondition { alias: field }`
    InlineFragment {
        type_condition: Name,
        alias: Option<Name>,
        field: Name,
    },
    /// `...FragmentName`, where `fragment FragmentName on TypeCondition { alias: field }`
    FragmentSpread {
        fragment_name: Name,
        type_condition: Name,
        alias: Option<Name>,
        field: Name,
    },
}

impl SelectionSegment {
    /// The name of the schema field this segment selects.
    pub fn field_name(&self) -> &Name {
        match self {
            Self::Field(name) => name,
            Self::AliasedField { name, .. } => name,
            Self::InlineFragment { field, .. } => field,
            Self::FragmentSpread { field, .. } => field,
        }
    }

    pub fn alias(&self) -> Option<&Name> {
        match self {
            Self::AliasedField { alias, .. } => Some(alias),
            Self::InlineFragment { alias, .. } | Self::FragmentSpread { alias, .. } => {
                alias.as_ref()
            }
            Self::Field(_) => None,
        }
    }

    /// The type condition of the fragment this segment goes through, if any.
    pub fn type_condition(&self) -> Option<&Name> {
        match self {
            Self::InlineFragment { type_condition, .. }
            | Self::FragmentSpread { type_condition, .. } => Some(type_condition),
            Self::Field(_) | Self::AliasedField { .. } => None,
        }
    }

    pub fn fragment_name(&self) -> Option<&Name> {
        match self {
            Self::FragmentSpread { fragment_name, .. } => Some(fragment_name),
            Self::Field(_) | Self::AliasedField { .. } | Self::InlineFragment { .. } => None,
        }
    }

    // Fields sort before inline fragments, which sort before fragment spreads.
    fn rank(&self) -> u8 {
        match self {
            Self::Field(_) | Self::AliasedField { .. } => 0,
            Self::InlineFragment { .. } => 1,
            Self::FragmentSpread { .. } => 2,
        }
    }
}

impl Ord for SelectionSegment {
    fn cmp(&self, other: &Self) -> Ordering {
        // Within a rank, fragment segments group by fragment context first. The selected
        // fields then sort by name, and an unaliased field sorts before its aliased selections.
        self.rank()
            .cmp(&other.rank())
            .then_with(|| self.fragment_name().cmp(&other.fragment_name()))
            .then_with(|| self.type_condition().cmp(&other.type_condition()))
            .then_with(|| self.field_name().cmp(other.field_name()))
            .then_with(|| self.alias().cmp(&other.alias()))
    }
}

impl PartialOrd for SelectionSegment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SelectionSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.fragment_name(), self.type_condition()) {
            (Some(fragment_name), Some(type_condition)) => {
                write!(f, "[{fragment_name}:{type_condition}]")?
            }
            (None, Some(type_condition)) => write!(f, "[{type_condition}]")?,
            _ => {}
        }
        if let Some(alias) = self.alias() {
            write!(f, "{alias}:")?;
        }
        write!(f, "{}", self.field_name())
    }
}

/// A named argument or directive hung off the end of a selection, with an optional path into
/// its (input object) value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PathAttachment {
    pub name: Name,
    pub sub_path: Vec<Name>,
}

impl PathAttachment {
    pub fn new(name: Name) -> Self {
        Self {
            name,
            sub_path: Vec::new(),
        }
    }
}

impl fmt::Display for PathAttachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for key in &self.sub_path {
            write!(f, ".{key}")?;
        }
        Ok(())
    }
}

/// See the [module documentation](self).
///
/// A path is in exactly one of three modes: a pure selection, an argument path, or a
/// directive path. [`PathTransform`] keeps the argument and directive states mutually
/// exclusive.
///
/// The derived ordering compares selections segment by segment (see [`SelectionSegment`]'s
/// ordering), so that sorting the children of a selection gives the order in which the
/// compiler emits them.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OperationPath {
    selection: Vec<SelectionSegment>,
    argument: Option<PathAttachment>,
    directive: Option<PathAttachment>,
}

impl OperationPath {
    /// The path of the query root type.
    pub fn root() -> Self {
        Self::default()
    }

    /// A selection path made of the given segments.
    pub fn selection_of(segments: impl IntoIterator<Item = SelectionSegment>) -> Self {
        Self {
            selection: segments.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Shorthand for a selection of plain, unaliased fields.
    pub fn fields(names: impl IntoIterator<Item = Name>) -> Self {
        Self::selection_of(names.into_iter().map(SelectionSegment::Field))
    }

    pub fn scheme(&self) -> &'static str {
        SCHEME
    }

    pub fn selection(&self) -> &[SelectionSegment] {
        &self.selection
    }

    pub fn last_segment(&self) -> Option<&SelectionSegment> {
        self.selection.last()
    }

    pub fn argument(&self) -> Option<&PathAttachment> {
        self.argument.as_ref()
    }

    pub fn directive(&self) -> Option<&PathAttachment> {
        self.directive.as_ref()
    }

    /// The depth of the selection this path points at (or hangs off of). The root is level 0.
    pub fn level(&self) -> usize {
        self.selection.len()
    }

    pub fn is_root(&self) -> bool {
        self.selection.is_empty() && self.refers_to_selection()
    }

    pub fn refers_to_selection(&self) -> bool {
        self.argument.is_none() && self.directive.is_none()
    }

    /// Whether this path names a whole argument (as opposed to a part of its value).
    pub fn refers_to_argument(&self) -> bool {
        self.argument
            .as_ref()
            .is_some_and(|argument| argument.sub_path.is_empty())
    }

    /// Whether this path names an argument or something nested in an argument's value.
    pub fn refers_to_part_of_argument(&self) -> bool {
        self.argument.is_some()
    }

    pub fn refers_to_part_of_directive(&self) -> bool {
        self.directive.is_some()
    }

    /// The selection this path points at, or hangs off of, without any argument or directive.
    pub fn selection_path(&self) -> OperationPath {
        Self::selection_of(self.selection.iter().cloned())
    }

    /// The path of the argument `name` of the field this path selects.
    pub fn argument_path(&self, name: Name) -> OperationPath {
        self.clone().transform().argument(name).build()
    }

    /// The path one step closer to the root.
    ///
    /// For argument and directive paths, this first walks back up the sub-path, then drops the
    /// argument or directive itself. The root has no parent.
    pub fn parent_path(&self) -> Option<OperationPath> {
        let transform = self.clone().transform();
        if let Some(argument) = &self.argument {
            return Some(if argument.sub_path.is_empty() {
                transform.clear_argument().build()
            } else {
                transform.drop_argument_segment().build()
            });
        }
        if let Some(directive) = &self.directive {
            return Some(if directive.sub_path.is_empty() {
                transform.clear_directive().build()
            } else {
                transform.drop_directive_segment().build()
            });
        }
        if self.selection.is_empty() {
            None
        } else {
            Some(transform.drop_last().build())
        }
    }

    /// Every path from this one up to (and including) the root, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = OperationPath> + use<> {
        std::iter::successors(self.parent_path(), OperationPath::parent_path)
    }

    /// Start deriving a new path from this one.
    pub fn transform(self) -> PathTransform {
        PathTransform::new(self)
    }
}

impl fmt::Display for OperationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "{SCHEME}:")?;
        }
        if self.selection.is_empty() {
            f.write_str("/")?;
        }
        for segment in &self.selection {
            write!(f, "/{segment}")?;
        }
        if let Some(argument) = &self.argument {
            write!(f, "?{argument}")?;
        }
        if let Some(directive) = &self.directive {
            write!(f, "@{directive}")?;
        }
        Ok(())
    }
}
