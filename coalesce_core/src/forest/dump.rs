// Copyright 2026 the Coalesce Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable forest dump for tracing.

use core::fmt;

use crate::event::MutationKind;
use crate::id::{ForestNodeId, INVALID};

use super::store::EventForest;

/// Indented rendering of an [`EventForest`], one line per node and record.
///
/// The format is meant for people and has no stability guarantees.
#[derive(Debug)]
pub struct ForestDump<'a> {
    forest: &'a EventForest,
}

impl EventForest {
    /// Returns a [`Display`](fmt::Display) adapter that dumps the forest.
    #[must_use]
    pub fn dump(&self) -> ForestDump<'_> {
        ForestDump { forest: self }
    }
}

impl fmt::Display for ForestDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let forest = self.forest;
        if forest.is_empty() {
            return writeln!(f, "(empty)");
        }
        // (node, depth), pushed in reverse so siblings print left to right.
        let mut stack = alloc::vec::Vec::new();
        push_chain(forest, ForestNodeId::ROOT.0, 0, &mut stack);
        while let Some((node, depth)) = stack.pop() {
            let indent = depth * 2;
            write!(f, "{:indent$}container {:?}", "", forest.container_at(node))?;
            if !forest.fire_reorder[node as usize] {
                write!(f, " (no reorder)")?;
            }
            writeln!(f)?;
            for event in &forest.events[node as usize] {
                let verb = match event.kind {
                    MutationKind::Show => "shown",
                    MutationKind::Hide { .. } => "hidden",
                };
                write!(f, "{:indent$}  {verb} {:?}", "", event.target)?;
                if let Some(change) = &event.text_change {
                    write!(f, " text@{} {:?}", change.start, change.text)?;
                }
                writeln!(f)?;
            }
            push_chain(forest, node, depth + 1, &mut stack);
        }
        Ok(())
    }
}

fn push_chain(
    forest: &EventForest,
    owner: u32,
    depth: usize,
    stack: &mut alloc::vec::Vec<(u32, usize)>,
) {
    let mark = stack.len();
    let mut child = forest.first_child[owner as usize];
    while child != INVALID {
        stack.push((child, depth));
        child = forest.next_sibling[child as usize];
    }
    stack[mark..].reverse();
}
