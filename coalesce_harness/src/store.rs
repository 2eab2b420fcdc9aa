// Copyright 2026 the Coalesce Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays accessible storage with allocation, topology, and teardown.

use alloc::string::String;
use alloc::vec::Vec;

use understory_dirty::{Channel, CycleHandling, DirtyTracker};

use coalesce_core::id::{AccessibleId, INVALID};
use coalesce_core::tree::{AccessibleTree, EMBEDDED_CHAR, Role, StateFlags};

/// Struct-of-arrays storage for the accessibles of any number of documents.
///
/// Accessibles are addressed by [`AccessibleId`] handles. Torn-down
/// accessibles are recycled via a free list, and generation counters prevent
/// stale handle access.
///
/// Linking a child only sets that child's cached index. Siblings keep their
/// old cached values until a
/// [`MutationScope`](coalesce_core::scope::MutationScope) renumbers them.
#[derive(Debug)]
pub struct AccessibleStore {
    // -- Topology --
    parent: Vec<u32>,
    children: Vec<Vec<u32>>,
    index: Vec<Option<usize>>,
    document: Vec<u32>,

    // -- Content --
    role: Vec<Role>,
    text: Vec<String>,
    label: Vec<String>,
    flags: Vec<StateFlags>,

    // -- Allocation --
    generation: Vec<u32>,
    free_list: Vec<u32>,
    len: u32,

    // -- Dirty tracking --
    dirty: DirtyTracker<u32>,

    // -- Lifecycle tracking --
    shutdowns: Vec<AccessibleId>,
}

impl Default for AccessibleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AccessibleStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            children: Vec::new(),
            index: Vec::new(),
            document: Vec::new(),
            role: Vec::new(),
            text: Vec::new(),
            label: Vec::new(),
            flags: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            shutdowns: Vec::new(),
        }
    }

    // -- Allocation API --

    /// Creates a new document root.
    pub fn create_document(&mut self, label: &str) -> AccessibleId {
        let id = self.alloc(INVALID, Role::Document, "", label);
        self.document[id.index() as usize] = id.index();
        id
    }

    /// Creates a detached accessible owned by `document`.
    pub fn create(&mut self, document: AccessibleId, role: Role, label: &str) -> AccessibleId {
        self.validate(document);
        self.alloc(document.index(), role, "", label)
    }

    /// Creates a detached text leaf owned by `document`, labelled with its
    /// own text.
    pub fn create_text(&mut self, document: AccessibleId, text: &str) -> AccessibleId {
        self.validate(document);
        self.alloc(document.index(), Role::TextLeaf, text, text)
    }

    fn alloc(&mut self, document: u32, role: Role, text: &str, label: &str) -> AccessibleId {
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot; its generation moved on at teardown.
            let i = idx as usize;
            self.parent[i] = INVALID;
            self.children[i].clear();
            self.index[i] = None;
            self.document[i] = document;
            self.role[i] = role;
            self.text[i] = String::from(text);
            self.label[i] = String::from(label);
            self.flags[i] = StateFlags::default();
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.children.push(Vec::new());
            self.index.push(None);
            self.document.push(document);
            self.role.push(role);
            self.text.push(String::from(text));
            self.label.push(String::from(label));
            self.flags.push(StateFlags::default());
            self.generation.push(0);
            idx
        };
        AccessibleId::new(idx, self.generation[idx as usize])
    }

    /// Returns `true` if the handle refers to a live accessible.
    #[must_use]
    pub fn is_alive(&self, id: AccessibleId) -> bool {
        id.index() < self.len
            && self.generation[id.index() as usize] == id.generation()
            && !self.free_list.contains(&id.index())
    }

    // -- Topology API --

    /// Links the detached `child` at `index` in `parent`'s child list.
    ///
    /// Only `child`'s cached index is written.
    ///
    /// # Panics
    ///
    /// Panics if `child` is already linked, belongs to another document, or
    /// `index` is past the end of the child list.
    pub fn insert_child(&mut self, parent: AccessibleId, index: usize, child: AccessibleId) {
        self.validate(parent);
        self.validate(child);
        let (p, c) = (parent.index(), child.index());
        assert!(
            self.parent[c as usize] == INVALID,
            "{child:?} is already linked under {:?}",
            self.id(self.parent[c as usize])
        );
        assert_eq!(
            self.document[p as usize], self.document[c as usize],
            "{child:?} belongs to another document than {parent:?}"
        );
        assert!(
            index <= self.children[p as usize].len(),
            "index {index} out of range for {parent:?}"
        );
        self.children[p as usize].insert(index, c);
        self.parent[c as usize] = p;
        self.index[c as usize] = Some(index);
    }

    /// Links the detached `child` as the last child of `parent` and returns
    /// it.
    pub fn append_child(&mut self, parent: AccessibleId, child: AccessibleId) -> AccessibleId {
        self.validate(parent);
        let index = self.children[parent.index() as usize].len();
        self.insert_child(parent, index, child);
        child
    }

    /// Unlinks `child` from its parent, leaving its subtree intact.
    ///
    /// # Panics
    ///
    /// Panics if `child` is not linked.
    pub fn remove_child(&mut self, child: AccessibleId) {
        self.validate(child);
        let c = child.index();
        let p = self.parent[c as usize];
        assert!(p != INVALID, "{child:?} is not linked");
        self.children[p as usize].retain(|&k| k != c);
        self.parent[c as usize] = INVALID;
        self.index[c as usize] = None;
    }

    /// Returns the live children of `parent`, in order.
    pub fn children(&self, parent: AccessibleId) -> impl Iterator<Item = AccessibleId> + '_ {
        self.validate(parent);
        self.children[parent.index() as usize]
            .iter()
            .map(|&k| self.id(k))
    }

    // -- Inspection API --

    /// Returns the label last stored in `id`'s slot.
    ///
    /// Works for torn-down accessibles until their slot is reused, so
    /// delivered events can still be described after teardown.
    #[must_use]
    pub fn label(&self, id: AccessibleId) -> &str {
        self.label
            .get(id.index() as usize)
            .map_or("?", String::as_str)
    }

    /// Drains the accessibles marked on `channel`, ordered by slot.
    pub fn take_dirty(&mut self, channel: Channel) -> Vec<AccessibleId> {
        let mut marked: Vec<u32> = self.dirty.drain(channel).deterministic().run().collect();
        marked.sort_unstable();
        marked.into_iter().map(|k| self.id(k)).collect()
    }

    /// Returns the roots of every subtree torn down so far, in teardown order.
    #[must_use]
    pub fn shutdowns(&self) -> &[AccessibleId] {
        &self.shutdowns
    }

    // -- Internal helpers --

    fn id(&self, idx: u32) -> AccessibleId {
        AccessibleId::new(idx, self.generation[idx as usize])
    }

    fn link(&self, idx: u32) -> Option<AccessibleId> {
        (idx != INVALID).then(|| self.id(idx))
    }

    /// Panics if the handle is stale.
    fn validate(&self, id: AccessibleId) {
        assert!(
            self.is_alive(id),
            "stale AccessibleId: {id:?} (current gen: {})",
            if id.index() < self.len {
                self.generation[id.index() as usize]
            } else {
                u32::MAX
            }
        );
    }

    /// Returns `id`'s parent and its live position in the parent.
    fn position(&self, id: AccessibleId) -> Option<(u32, usize)> {
        self.validate(id);
        let p = self.parent[id.index() as usize];
        if p == INVALID {
            return None;
        }
        let pos = self.children[p as usize]
            .iter()
            .position(|&k| k == id.index())?;
        Some((p, pos))
    }

    fn contribution_len(&self, idx: u32) -> usize {
        if self.role[idx as usize] == Role::TextLeaf {
            self.text[idx as usize].chars().count()
        } else {
            1
        }
    }

    /// Frees `root` and everything under it.
    fn free_subtree(&mut self, root: u32) {
        let mut stack = alloc::vec![root];
        while let Some(idx) = stack.pop() {
            stack.append(&mut self.children[idx as usize]);
            self.dirty.remove_key(idx);
            self.parent[idx as usize] = INVALID;
            self.index[idx as usize] = None;
            self.generation[idx as usize] += 1;
            self.free_list.push(idx);
        }
    }
}

impl AccessibleTree for AccessibleStore {
    fn parent(&self, id: AccessibleId) -> Option<AccessibleId> {
        self.validate(id);
        self.link(self.parent[id.index() as usize])
    }

    fn document(&self, id: AccessibleId) -> AccessibleId {
        self.validate(id);
        self.id(self.document[id.index() as usize])
    }

    fn is_document(&self, id: AccessibleId) -> bool {
        self.validate(id);
        self.role[id.index() as usize] == Role::Document
    }

    fn child_count(&self, id: AccessibleId) -> usize {
        self.validate(id);
        self.children[id.index() as usize].len()
    }

    fn child_at(&self, id: AccessibleId, index: usize) -> Option<AccessibleId> {
        self.validate(id);
        self.children[id.index() as usize]
            .get(index)
            .map(|&k| self.id(k))
    }

    fn index_in_parent(&self, id: AccessibleId) -> Option<usize> {
        self.validate(id);
        self.index[id.index() as usize]
    }

    fn set_index_in_parent(&mut self, id: AccessibleId, index: usize) {
        self.validate(id);
        self.index[id.index() as usize] = Some(index);
    }

    fn prev_sibling(&self, id: AccessibleId) -> Option<AccessibleId> {
        let (p, pos) = self.position(id)?;
        let prev = pos.checked_sub(1)?;
        Some(self.id(self.children[p as usize][prev]))
    }

    fn next_sibling(&self, id: AccessibleId) -> Option<AccessibleId> {
        let (p, pos) = self.position(id)?;
        self.children[p as usize]
            .get(pos + 1)
            .map(|&k| self.id(k))
    }

    fn role(&self, id: AccessibleId) -> Role {
        self.validate(id);
        self.role[id.index() as usize]
    }

    fn is_hyper_text(&self, id: AccessibleId) -> bool {
        !matches!(self.role(id), Role::TextLeaf | Role::Image)
    }

    fn append_text_to(&self, id: AccessibleId, out: &mut String) {
        if self.role(id) == Role::TextLeaf {
            out.push_str(&self.text[id.index() as usize]);
        } else {
            out.push(EMBEDDED_CHAR);
        }
    }

    fn child_offset(&self, container: AccessibleId, child: AccessibleId) -> Option<usize> {
        self.validate(container);
        let mut offset = 0;
        for &k in &self.children[container.index() as usize] {
            if k == child.index() {
                return Some(offset);
            }
            offset += self.contribution_len(k);
        }
        None
    }

    fn state_flags(&self, id: AccessibleId) -> StateFlags {
        self.validate(id);
        self.flags[id.index() as usize]
    }

    fn set_state_flags(&mut self, id: AccessibleId, flags: StateFlags) {
        self.validate(id);
        self.flags[id.index() as usize] = flags;
    }

    fn mark_dirty(&mut self, id: AccessibleId, channel: Channel) {
        self.validate(id);
        self.dirty.mark(id.index(), channel);
    }

    fn shutdown_subtree(&mut self, document: AccessibleId, root: AccessibleId) {
        self.validate(root);
        assert_eq!(
            self.document(root),
            document,
            "{root:?} is not owned by {document:?}"
        );
        if self.parent[root.index() as usize] != INVALID {
            self.remove_child(root);
        }
        self.free_subtree(root.index());
        self.shutdowns.push(root);
    }
}
