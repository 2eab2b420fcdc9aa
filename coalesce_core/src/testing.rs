// Copyright 2026 the Coalesce Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal in-memory tree for unit tests.

use alloc::string::String;
use alloc::vec::Vec;

use understory_dirty::{Channel, CycleHandling, DirtyTracker};

use crate::id::AccessibleId;
use crate::tree::{AccessibleTree, EMBEDDED_CHAR, Role, StateFlags};

struct Node {
    parent: Option<AccessibleId>,
    children: Vec<AccessibleId>,
    index: Option<usize>,
    role: Role,
    text: String,
    flags: StateFlags,
}

/// Arena tree whose ids are plain slot indices with generation 0.
///
/// Slot 0 is the document. Insertion only sets the inserted child's cached
/// index, so siblings go stale until a scope renumbers them.
pub(crate) struct TestTree {
    nodes: Vec<Node>,
    dirty: DirtyTracker<u32>,
    pub(crate) shutdowns: Vec<(AccessibleId, AccessibleId)>,
}

impl TestTree {
    pub(crate) fn new() -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            shutdowns: Vec::new(),
        };
        tree.alloc(Role::Document, "");
        tree
    }

    pub(crate) fn doc(&self) -> AccessibleId {
        AccessibleId::new(0, 0)
    }

    fn alloc(&mut self, role: Role, text: &str) -> AccessibleId {
        #[expect(clippy::cast_possible_truncation, reason = "test trees are tiny")]
        let id = AccessibleId::new(self.nodes.len() as u32, 0);
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            index: None,
            role,
            text: String::from(text),
            flags: StateFlags::default(),
        });
        id
    }

    fn node(&self, id: AccessibleId) -> &Node {
        &self.nodes[id.index() as usize]
    }

    fn node_mut(&mut self, id: AccessibleId) -> &mut Node {
        &mut self.nodes[id.index() as usize]
    }

    /// Creates a detached accessible.
    pub(crate) fn create(&mut self, role: Role) -> AccessibleId {
        self.alloc(role, "")
    }

    /// Creates a detached text leaf.
    pub(crate) fn text(&mut self, text: &str) -> AccessibleId {
        self.alloc(Role::TextLeaf, text)
    }

    /// Links `child` at `index` under `parent`.
    pub(crate) fn insert(&mut self, parent: AccessibleId, index: usize, child: AccessibleId) {
        self.node_mut(parent).children.insert(index, child);
        let node = self.node_mut(child);
        node.parent = Some(parent);
        node.index = Some(index);
    }

    /// Links `child` as the last child of `parent`, with a correct index.
    pub(crate) fn append(&mut self, parent: AccessibleId, child: AccessibleId) -> AccessibleId {
        let index = self.node(parent).children.len();
        self.insert(parent, index, child);
        child
    }

    /// Unlinks `child` from its parent.
    pub(crate) fn unlink(&mut self, child: AccessibleId) {
        if let Some(parent) = self.node(child).parent {
            self.node_mut(parent).children.retain(|c| *c != child);
        }
        let node = self.node_mut(child);
        node.parent = None;
        node.index = None;
    }

    /// Drains the slot indices marked on `channel`, sorted.
    pub(crate) fn take_dirty(&mut self, channel: Channel) -> Vec<u32> {
        let mut marked: Vec<u32> = self.dirty.drain(channel).deterministic().run().collect();
        marked.sort_unstable();
        marked
    }

    fn position(&self, id: AccessibleId) -> Option<(AccessibleId, usize)> {
        let parent = self.node(id).parent?;
        let pos = self.node(parent).children.iter().position(|c| *c == id)?;
        Some((parent, pos))
    }
}

impl AccessibleTree for TestTree {
    fn parent(&self, id: AccessibleId) -> Option<AccessibleId> {
        self.node(id).parent
    }

    fn document(&self, _id: AccessibleId) -> AccessibleId {
        self.doc()
    }

    fn is_document(&self, id: AccessibleId) -> bool {
        self.node(id).role == Role::Document
    }

    fn child_count(&self, id: AccessibleId) -> usize {
        self.node(id).children.len()
    }

    fn child_at(&self, id: AccessibleId, index: usize) -> Option<AccessibleId> {
        self.node(id).children.get(index).copied()
    }

    fn index_in_parent(&self, id: AccessibleId) -> Option<usize> {
        self.node(id).index
    }

    fn set_index_in_parent(&mut self, id: AccessibleId, index: usize) {
        self.node_mut(id).index = Some(index);
    }

    fn prev_sibling(&self, id: AccessibleId) -> Option<AccessibleId> {
        let (parent, pos) = self.position(id)?;
        pos.checked_sub(1).and_then(|p| self.child_at(parent, p))
    }

    fn next_sibling(&self, id: AccessibleId) -> Option<AccessibleId> {
        let (parent, pos) = self.position(id)?;
        self.child_at(parent, pos + 1)
    }

    fn role(&self, id: AccessibleId) -> Role {
        self.node(id).role
    }

    fn is_hyper_text(&self, id: AccessibleId) -> bool {
        !matches!(self.node(id).role, Role::TextLeaf | Role::Image)
    }

    fn append_text_to(&self, id: AccessibleId, out: &mut String) {
        let node = self.node(id);
        if node.role == Role::TextLeaf {
            out.push_str(&node.text);
        } else {
            out.push(EMBEDDED_CHAR);
        }
    }

    fn child_offset(&self, container: AccessibleId, child: AccessibleId) -> Option<usize> {
        let mut offset = 0;
        for c in &self.node(container).children {
            if *c == child {
                return Some(offset);
            }
            let mut text = String::new();
            self.append_text_to(*c, &mut text);
            offset += text.chars().count();
        }
        None
    }

    fn state_flags(&self, id: AccessibleId) -> StateFlags {
        self.node(id).flags
    }

    fn set_state_flags(&mut self, id: AccessibleId, flags: StateFlags) {
        self.node_mut(id).flags = flags;
    }

    fn mark_dirty(&mut self, id: AccessibleId, channel: Channel) {
        self.dirty.mark(id.index(), channel);
    }

    fn shutdown_subtree(&mut self, document: AccessibleId, root: AccessibleId) {
        self.shutdowns.push((document, root));
    }
}
