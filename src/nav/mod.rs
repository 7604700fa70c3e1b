//! Table of contents.
//!
//! One [`NavTree`] is built from the chapter list and rendered twice: as the
//! EPUB 3 navigation document ([`xhtml`]) and as the EPUB 2 NCX ([`ncx`]).
//! Both renderings come from the same tree, so they always agree.

pub mod ncx;
pub mod xhtml;

use crate::ids::PlayOrder;
use crate::model::{Chapter, HeadingLevel};

/// One entry of the table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavNode {
    pub title: String,
    /// Target document, relative to the content root.
    pub href: String,
    /// 1-based position in reading order.
    pub play_order: usize,
    pub children: Vec<NavNode>,
}

/// A flattened, pre-order view of a navigation tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavEntry {
    /// 0 for top-level entries, 1 for nested ones.
    pub depth: usize,
    pub title: String,
    pub href: String,
}

/// Two-level navigation tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavTree {
    roots: Vec<NavNode>,
}

impl NavTree {
    /// Build the tree from chapters in reading order.
    ///
    /// A primary chapter opens a new top-level entry. A secondary chapter is
    /// nested under the most recent primary one, or placed at top level if
    /// no primary chapter came before it.
    pub fn build(chapters: &[Chapter]) -> Self {
        let mut order = PlayOrder::new();
        let mut roots: Vec<NavNode> = Vec::new();
        let mut has_parent = false;

        for chapter in chapters {
            let node = NavNode {
                title: chapter.title.clone(),
                href: chapter.filename(),
                play_order: order.next_value(),
                children: Vec::new(),
            };

            match chapter.level {
                HeadingLevel::Primary => {
                    roots.push(node);
                    has_parent = true;
                }
                HeadingLevel::Secondary => match roots.last_mut() {
                    Some(parent) if has_parent => parent.children.push(node),
                    _ => roots.push(node),
                },
            }
        }

        Self { roots }
    }

    pub fn roots(&self) -> &[NavNode] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.roots.iter().map(|n| 1 + n.children.len()).sum()
    }

    /// Number of levels in use; at least 1.
    pub fn depth(&self) -> usize {
        if self.roots.iter().any(|n| !n.children.is_empty()) {
            2
        } else {
            1
        }
    }

    /// Pre-order walk.
    pub fn walk(&self) -> Vec<NavEntry> {
        fn visit(node: &NavNode, depth: usize, out: &mut Vec<NavEntry>) {
            out.push(NavEntry {
                depth,
                title: node.title.clone(),
                href: node.href.clone(),
            });
            for child in &node.children {
                visit(child, depth + 1, out);
            }
        }

        let mut out = Vec::with_capacity(self.len());
        for root in &self.roots {
            visit(root, 0, &mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapter(index: usize, title: &str, level: HeadingLevel) -> Chapter {
        Chapter::new(index, title, level, String::new())
    }

    #[test]
    fn test_secondary_nests_under_primary() {
        let chapters = [
            chapter(0, "Part 1", HeadingLevel::Primary),
            chapter(1, "Section A", HeadingLevel::Secondary),
            chapter(2, "Section B", HeadingLevel::Secondary),
            chapter(3, "Part 2", HeadingLevel::Primary),
        ];
        let tree = NavTree::build(&chapters);

        assert_eq!(tree.roots().len(), 2);
        assert_eq!(tree.roots()[0].children.len(), 2);
        assert_eq!(tree.roots()[0].children[1].href, "chapter3.xhtml");
        assert!(tree.roots()[1].children.is_empty());
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn test_leading_secondary_is_top_level() {
        let chapters = [
            chapter(0, "Intro", HeadingLevel::Secondary),
            chapter(1, "Aside", HeadingLevel::Secondary),
            chapter(2, "Part", HeadingLevel::Primary),
            chapter(3, "Sub", HeadingLevel::Secondary),
        ];
        let tree = NavTree::build(&chapters);

        let walk: Vec<_> = tree
            .walk()
            .into_iter()
            .map(|e| (e.depth, e.title))
            .collect();
        assert_eq!(
            walk,
            [
                (0, "Intro".to_string()),
                (0, "Aside".to_string()),
                (0, "Part".to_string()),
                (1, "Sub".to_string()),
            ]
        );
    }

    #[test]
    fn test_play_order_follows_chapters() {
        let chapters = [
            chapter(0, "A", HeadingLevel::Primary),
            chapter(1, "B", HeadingLevel::Secondary),
            chapter(2, "C", HeadingLevel::Primary),
        ];
        let tree = NavTree::build(&chapters);
        let roots = tree.roots();
        assert_eq!(roots[0].play_order, 1);
        assert_eq!(roots[0].children[0].play_order, 2);
        assert_eq!(roots[1].play_order, 3);
    }

    #[test]
    fn test_flat_tree_depth() {
        let tree = NavTree::build(&[chapter(0, "Only", HeadingLevel::Primary)]);
        assert_eq!(tree.depth(), 1);
        assert_eq!(NavTree::default().depth(), 1);
    }
}
