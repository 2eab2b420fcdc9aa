// Copyright 2026 the Coalesce Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Delivering a batch of pending records.

use crate::event::{AccEvent, EventSink, MutationEvent, MutationKind};
use crate::trace::{ProcessSummary, Tracer};
use crate::tree::{AccessibleTree, Role};

use super::store::EventForest;

impl EventForest {
    /// Fires every pending notification, then leaves the forest empty.
    ///
    /// Nodes are visited depth-first with nested nodes before their owner and
    /// siblings left to right. Within a node each record fires in the order
    /// it was recorded:
    ///
    /// - a popup menu's hide is preceded by [`AccEvent::MenuPopupEnd`];
    /// - the show or hide itself;
    /// - its text change, if any;
    /// - for a hide that owes one, the removed subtree's teardown.
    ///
    /// A node whose reorder was not absorbed by an enclosing node finishes
    /// with a single [`AccEvent::Reorder`]. Teardowns owed by records that
    /// were discarded during the batch run last.
    pub fn process<T, S>(
        &mut self,
        tree: &mut T,
        sink: &mut S,
        tracer: &mut Tracer<'_>,
    ) -> ProcessSummary
    where
        T: AccessibleTree + ?Sized,
        S: EventSink + ?Sized,
    {
        let mut summary = ProcessSummary::default();
        let mut fire = |event: AccEvent, summary: &mut ProcessSummary| {
            tracer.fired(&event);
            sink.fire(event);
            summary.fired += 1;
        };

        for node in self.post_order() {
            summary.nodes += 1;
            let events = core::mem::take(&mut self.events[node as usize]);
            for event in events {
                let MutationEvent {
                    target,
                    container,
                    document,
                    kind,
                    from_user_input,
                    text_change,
                } = event;
                match kind {
                    MutationKind::Show => fire(
                        AccEvent::Show {
                            target,
                            container,
                            from_user_input,
                        },
                        &mut summary,
                    ),
                    MutationKind::Hide { .. } => {
                        if self.config.menu_popup_end && tree.role(target) == Role::MenuPopup {
                            fire(AccEvent::MenuPopupEnd { target }, &mut summary);
                        }
                        fire(
                            AccEvent::Hide {
                                target,
                                container,
                                from_user_input,
                            },
                            &mut summary,
                        );
                    }
                }
                if let Some(change) = text_change {
                    fire(AccEvent::TextChange(change), &mut summary);
                }
                if let MutationKind::Hide {
                    needs_shutdown: true,
                    ..
                } = kind
                {
                    tree.shutdown_subtree(document, target);
                    summary.shutdowns += 1;
                }
            }
            if self.fire_reorder[node as usize] {
                let container = self.container_at(node);
                fire(AccEvent::Reorder { container }, &mut summary);
            }
        }

        for (document, root) in self.orphaned_shutdowns.drain(..) {
            tree.shutdown_subtree(document, root);
            summary.shutdowns += 1;
        }
        self.reset();
        tracer.process(&summary);
        summary
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;
    use crate::config::BatchConfig;
    use crate::event::SiblingContext;
    use crate::id::{AccessibleId, ForestNodeId};
    use crate::testing::TestTree;

    fn record(
        tree: &TestTree,
        container: AccessibleId,
        target: AccessibleId,
        kind: MutationKind,
    ) -> MutationEvent {
        MutationEvent {
            target,
            container,
            document: tree.doc(),
            kind,
            from_user_input: false,
            text_change: None,
        }
    }

    fn hide(needs_shutdown: bool) -> MutationKind {
        MutationKind::Hide {
            needs_shutdown,
            siblings: SiblingContext::default(),
        }
    }

    fn place(forest: &mut EventForest, tree: &TestTree, container: AccessibleId) -> ForestNodeId {
        forest
            .find_or_insert(tree, container, &mut Tracer::none())
            .expect("container should be tracked")
    }

    #[test]
    fn shows_fire_before_their_container_reorder() {
        let mut tree = TestTree::new();
        let doc = tree.doc();
        let p = tree.create(Role::List);
        tree.append(doc, p);
        let x = tree.create(Role::ListItem);
        let y = tree.create(Role::ListItem);
        tree.append(p, x);
        tree.append(p, y);

        let mut forest = EventForest::with_config(BatchConfig::structural());
        let node = place(&mut forest, &tree, p);
        for target in [x, y] {
            let shown = record(&tree, p, target, MutationKind::Show);
            forest.mutated(&tree, node, shown, &mut Tracer::none());
        }

        let mut fired: Vec<AccEvent> = Vec::new();
        let summary = forest.process(&mut tree, &mut fired, &mut Tracer::none());
        assert_eq!(
            fired,
            [
                AccEvent::Show {
                    target: x,
                    container: p,
                    from_user_input: false
                },
                AccEvent::Show {
                    target: y,
                    container: p,
                    from_user_input: false
                },
                AccEvent::Reorder { container: p },
            ]
        );
        assert_eq!(summary.fired, 3);
        assert_eq!(summary.nodes, 1);
        assert!(forest.is_empty());
    }

    #[test]
    fn nested_nodes_fire_first_and_without_reorder() {
        let mut tree = TestTree::new();
        let doc = tree.doc();
        let [p, q, a, b] = [(); 4].map(|()| tree.create(Role::Section));
        tree.append(doc, p);
        tree.append(p, q);
        tree.append(q, b);
        tree.append(p, a);

        let mut forest = EventForest::with_config(BatchConfig::structural());
        let outer = place(&mut forest, &tree, p);
        let shown = record(&tree, p, a, MutationKind::Show);
        forest.mutated(&tree, outer, shown, &mut Tracer::none());
        let inner = place(&mut forest, &tree, q);
        let shown = record(&tree, q, b, MutationKind::Show);
        forest.mutated(&tree, inner, shown, &mut Tracer::none());

        let mut fired: Vec<AccEvent> = Vec::new();
        forest.process(&mut tree, &mut fired, &mut Tracer::none());
        let targets: Vec<_> = fired.iter().map(AccEvent::target).collect();
        assert_eq!(targets, [b, a, p]);
        assert!(matches!(fired[2], AccEvent::Reorder { .. }));
    }

    #[test]
    fn hide_fires_popup_end_text_then_teardown() {
        let mut tree = TestTree::new();
        let doc = tree.doc();
        let p = tree.create(Role::Section);
        let menu = tree.create(Role::MenuPopup);
        tree.append(doc, p);
        tree.append(p, menu);

        let mut forest = EventForest::new();
        let node = place(&mut forest, &tree, p);
        let hidden = record(&tree, p, menu, hide(true));
        forest.mutated(&tree, node, hidden, &mut Tracer::none());
        tree.unlink(menu);

        let mut fired: Vec<AccEvent> = Vec::new();
        let summary = forest.process(&mut tree, &mut fired, &mut Tracer::none());
        assert_eq!(fired.len(), 4);
        assert_eq!(fired[0], AccEvent::MenuPopupEnd { target: menu });
        assert!(matches!(fired[1], AccEvent::Hide { target, .. } if target == menu));
        assert!(matches!(&fired[2], AccEvent::TextChange(c) if !c.inserted && c.start == 0));
        assert_eq!(fired[3], AccEvent::Reorder { container: p });
        assert_eq!(tree.shutdowns, [(doc, menu)]);
        assert_eq!(summary.shutdowns, 1);
    }

    #[test]
    fn skipped_shutdown_is_not_performed() {
        let mut tree = TestTree::new();
        let doc = tree.doc();
        let p = tree.create(Role::Section);
        let child = tree.create(Role::Button);
        tree.append(doc, p);
        tree.append(p, child);

        let mut forest = EventForest::with_config(BatchConfig::structural());
        let node = place(&mut forest, &tree, p);
        let hidden = record(&tree, p, child, hide(false));
        forest.mutated(&tree, node, hidden, &mut Tracer::none());

        let mut fired: Vec<AccEvent> = Vec::new();
        forest.process(&mut tree, &mut fired, &mut Tracer::none());
        assert!(tree.shutdowns.is_empty());
    }

    #[test]
    fn popup_end_can_be_disabled() {
        let mut tree = TestTree::new();
        let doc = tree.doc();
        let p = tree.create(Role::Section);
        let menu = tree.create(Role::MenuPopup);
        tree.append(doc, p);
        tree.append(p, menu);

        let config = BatchConfig {
            menu_popup_end: false,
            ..BatchConfig::structural()
        };
        let mut forest = EventForest::with_config(config);
        let node = place(&mut forest, &tree, p);
        let hidden = record(&tree, p, menu, hide(true));
        forest.mutated(&tree, node, hidden, &mut Tracer::none());

        let mut fired: Vec<AccEvent> = Vec::new();
        forest.process(&mut tree, &mut fired, &mut Tracer::none());
        assert!(!fired.iter().any(|e| matches!(e, AccEvent::MenuPopupEnd { .. })));
    }

    #[test]
    fn clear_tears_down_pending_hides_without_firing() {
        let mut tree = TestTree::new();
        let doc = tree.doc();
        let p = tree.create(Role::Section);
        let child = tree.create(Role::Button);
        tree.append(doc, p);
        tree.append(p, child);

        let mut forest = EventForest::new();
        let node = place(&mut forest, &tree, p);
        let hidden = record(&tree, p, child, hide(true));
        forest.mutated(&tree, node, hidden, &mut Tracer::none());

        forest.clear(&mut tree);
        assert!(forest.is_empty());
        assert_eq!(tree.shutdowns, [(doc, child)]);

        forest.clear(&mut tree);
        assert_eq!(tree.shutdowns.len(), 1, "second clear has nothing to do");

        let mut fired: Vec<AccEvent> = Vec::new();
        forest.process(&mut tree, &mut fired, &mut Tracer::none());
        assert!(fired.is_empty());
    }
}
