use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::operation_path::OperationPath;

/// Every selection of a document, bucketed by depth.
///
/// Adding a path also adds all of its ancestors, so callers can list leaves only. The root
/// itself is never indexed, and neither are argument or directive paths.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct LevelIndex {
    levels: BTreeMap<usize, BTreeSet<OperationPath>>,
}

impl LevelIndex {
    pub(crate) fn new<'a>(paths: impl IntoIterator<Item = &'a OperationPath>) -> Self {
        let mut index = Self::default();
        for path in paths {
            if path.refers_to_selection() {
                index.insert(path.clone());
            }
        }
        index
    }

    fn insert(&mut self, path: OperationPath) {
        let mut next = Some(path);
        while let Some(path) = next.take() {
            if path.is_root() {
                break;
            }
            let parent = path.parent_path();
            // An indexed path already brought its ancestors along.
            if !self.levels.entry(path.level()).or_default().insert(path) {
                break;
            }
            next = parent;
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.levels.values().map(BTreeSet::len).sum()
    }

    /// Levels from the root down, with their paths in `OperationPath` order.
    pub(crate) fn ascending(&self) -> impl Iterator<Item = (usize, &BTreeSet<OperationPath>)> {
        self.levels.iter().map(|(level, paths)| (*level, paths))
    }

    /// Levels from the deepest up, with their paths in `OperationPath` order.
    pub(crate) fn descending(&self) -> impl Iterator<Item = (usize, &BTreeSet<OperationPath>)> {
        self.levels.iter().rev().map(|(level, paths)| (*level, paths))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn path(text: &str) -> OperationPath {
        text.parse().unwrap()
    }

    fn level_strings(index: &LevelIndex) -> Vec<(usize, Vec<String>)> {
        index
            .ascending()
            .map(|(level, paths)| (level, paths.iter().map(ToString::to_string).collect()))
            .collect()
    }

    #[test]
    fn ancestors_are_implied() {
        let index = LevelIndex::new(&[path("/a/b/c"), path("/a/d")]);
        assert_eq!(
            level_strings(&index),
            vec![
                (1, vec!["/a".to_owned()]),
                (2, vec!["/a/b".to_owned(), "/a/d".to_owned()]),
                (3, vec!["/a/b/c".to_owned()]),
            ]
        );
        assert_eq!(index.len(), 4);
    }

    #[test]
    fn skips_the_root_and_non_selections() {
        let index = LevelIndex::new(&[
            OperationPath::root(),
            path("/search?query"),
            path("/user@include"),
        ]);
        assert!(index.is_empty());
    }

    #[test]
    fn descending_starts_at_the_deepest_level() {
        let index = LevelIndex::new(&[path("/a/[T]b"), path("/c")]);
        assert_eq!(
            index.descending().map(|(level, _)| level).collect::<Vec<_>>(),
            vec![2, 1]
        );
    }
}
