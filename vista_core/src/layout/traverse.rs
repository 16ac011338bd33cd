// Copyright 2026 the Vista Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use super::id::{INVALID, NodeId};
use super::tree::LayoutTree;

/// An iterator over the direct children of a node, in order.
///
/// Created by [`LayoutTree::children`].
#[derive(Debug)]
pub struct Children<'a> {
    tree: &'a LayoutTree,
    current: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(tree: &'a LayoutTree, first: u32) -> Self {
        Self {
            tree,
            current: first,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.tree.next_sibling[idx as usize];
        Some(self.tree.id_at(idx))
    }
}

/// An iterator over a node and all of its descendants, depth-first pre-order.
///
/// Created by [`LayoutTree::descendants`].
#[derive(Debug)]
pub struct Descendants<'a> {
    tree: &'a LayoutTree,
    top: u32,
    current: u32,
}

impl<'a> Descendants<'a> {
    pub(crate) fn new(tree: &'a LayoutTree, top: u32) -> Self {
        Self {
            tree,
            top,
            current: top,
        }
    }
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.tree.next_preorder(idx, self.top);
        Some(self.tree.id_at(idx))
    }
}
