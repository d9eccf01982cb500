use apollo_compiler::Name;

use super::OperationPath;
use super::PathAttachment;
use super::SelectionSegment;

/// Derives a new [`OperationPath`] from an existing one.
///
/// Setting an argument clears any directive and setting a directive clears any argument, so
/// every path built here is in exactly one mode. Edits that do not apply (dropping a segment
/// from an empty selection, extending a sub-path that is not set) leave the path unchanged.
#[derive(Debug, Clone)]
#[must_use]
pub struct PathTransform {
    path: OperationPath,
}

impl PathTransform {
    pub(super) fn new(path: OperationPath) -> Self {
        Self { path }
    }

    pub fn append(mut self, segment: SelectionSegment) -> Self {
        self.path.selection.push(segment);
        self
    }

    pub fn append_field(self, name: Name) -> Self {
        self.append(SelectionSegment::Field(name))
    }

    pub fn prepend(mut self, segment: SelectionSegment) -> Self {
        self.path.selection.insert(0, segment);
        self
    }

    pub fn drop_last(mut self) -> Self {
        self.path.selection.pop();
        self
    }

    pub fn drop_first(mut self) -> Self {
        if !self.path.selection.is_empty() {
            self.path.selection.remove(0);
        }
        self
    }

    /// Replace the last selection segment, e.g. to alias a field or move it into a fragment.
    pub fn replace_last(self, segment: SelectionSegment) -> Self {
        self.drop_last().append(segment)
    }

    pub fn argument(self, name: Name) -> Self {
        self.argument_with_sub_path(name, [])
    }

    pub fn argument_with_sub_path(
        mut self,
        name: Name,
        sub_path: impl IntoIterator<Item = Name>,
    ) -> Self {
        self.path.directive = None;
        self.path.argument = Some(PathAttachment {
            name,
            sub_path: sub_path.into_iter().collect(),
        });
        self
    }

    pub fn append_argument_segment(mut self, key: Name) -> Self {
        if let Some(argument) = &mut self.path.argument {
            argument.sub_path.push(key);
        }
        self
    }

    pub fn drop_argument_segment(mut self) -> Self {
        if let Some(argument) = &mut self.path.argument {
            argument.sub_path.pop();
        }
        self
    }

    pub fn clear_argument(mut self) -> Self {
        self.path.argument = None;
        self
    }

    pub fn directive(self, name: Name) -> Self {
        self.directive_with_sub_path(name, [])
    }

    pub fn directive_with_sub_path(
        mut self,
        name: Name,
        sub_path: impl IntoIterator<Item = Name>,
    ) -> Self {
        self.path.argument = None;
        self.path.directive = Some(PathAttachment {
            name,
            sub_path: sub_path.into_iter().collect(),
        });
        self
    }

    pub fn append_directive_segment(mut self, key: Name) -> Self {
        if let Some(directive) = &mut self.path.directive {
            directive.sub_path.push(key);
        }
        self
    }

    pub fn drop_directive_segment(mut self) -> Self {
        if let Some(directive) = &mut self.path.directive {
            directive.sub_path.pop();
        }
        self
    }

    pub fn clear_directive(mut self) -> Self {
        self.path.directive = None;
        self
    }

    pub fn build(self) -> OperationPath {
        self.path
    }
}
