// Copyright 2026 the Coalesce Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scripted mutations over an [`AccessibleStore`].
//!
//! [`Driver::mutate`] opens a [`MutationScope`] on a parent, hands the
//! closure a [`Mutation`] whose methods link, unlink, and register children
//! in the order the scope expects, and finishes the scope when the closure
//! returns.
//!
//! ```text
//!   driver.mutate(p, |m| {
//!       let x = m.create(Role::Button, "x");
//!       m.insert(1, x);
//!       m.remove(y);
//!   });
//!   let events = driver.process();
//! ```

use alloc::string::String;
use alloc::vec::Vec;

use coalesce_core::batch::MutationBatch;
use coalesce_core::config::BatchConfig;
use coalesce_core::event::{AccEvent, EventSink};
use coalesce_core::id::AccessibleId;
use coalesce_core::scope::MutationScope;
use coalesce_core::trace::{ProcessSummary, Tracer};
use coalesce_core::tree::{AccessibleTree, Role};

use crate::log;
use crate::store::AccessibleStore;

/// An accessible store and the batch collecting its notifications.
#[derive(Debug, Default)]
pub struct Driver<'t> {
    store: AccessibleStore,
    batch: MutationBatch<'t>,
}

impl<'t> Driver<'t> {
    /// Creates a driver with an empty store.
    #[must_use]
    pub fn new(config: BatchConfig) -> Self {
        Self::with_tracer(config, Tracer::none())
    }

    /// Creates a driver whose batch reports to `tracer`.
    #[must_use]
    pub fn with_tracer(config: BatchConfig, tracer: Tracer<'t>) -> Self {
        Self {
            store: AccessibleStore::new(),
            batch: MutationBatch::with_tracer(config, tracer),
        }
    }

    /// Returns the store.
    #[must_use]
    pub fn store(&self) -> &AccessibleStore {
        &self.store
    }

    /// Returns the store for edits made outside any scope, such as building
    /// the initial tree.
    pub fn store_mut(&mut self) -> &mut AccessibleStore {
        &mut self.store
    }

    /// Returns the batch.
    #[must_use]
    pub fn batch(&self) -> &MutationBatch<'t> {
        &self.batch
    }

    /// Returns the batch, e.g. to suppress it.
    pub fn batch_mut(&mut self) -> &mut MutationBatch<'t> {
        &mut self.batch
    }

    /// Runs `f` inside a scope on `parent`.
    pub fn mutate<R>(
        &mut self,
        parent: AccessibleId,
        f: impl FnOnce(&mut Mutation<'_, 't>) -> R,
    ) -> R {
        let scope = MutationScope::new(&mut self.store, &mut self.batch, parent);
        run(&mut self.store, &mut self.batch, scope, f)
    }

    /// Runs `f` inside a scope on `parent` whose changes are marked as caused
    /// by user input.
    pub fn mutate_from_user_input<R>(
        &mut self,
        parent: AccessibleId,
        f: impl FnOnce(&mut Mutation<'_, 't>) -> R,
    ) -> R {
        let scope =
            MutationScope::new(&mut self.store, &mut self.batch, parent).from_user_input(true);
        run(&mut self.store, &mut self.batch, scope, f)
    }

    /// Runs `f` inside a scope on `parent` that records no events.
    pub fn mutate_without_events<R>(
        &mut self,
        parent: AccessibleId,
        f: impl FnOnce(&mut Mutation<'_, 't>) -> R,
    ) -> R {
        let scope = MutationScope::without_events(&mut self.store, &mut self.batch, parent);
        run(&mut self.store, &mut self.batch, scope, f)
    }

    /// Fires everything pending and returns the delivered events.
    pub fn process(&mut self) -> Vec<AccEvent> {
        let mut events = Vec::new();
        self.batch.process(&mut self.store, &mut events);
        events
    }

    /// Fires everything pending into `sink`.
    pub fn process_into<S: EventSink + ?Sized>(&mut self, sink: &mut S) -> ProcessSummary {
        self.batch.process(&mut self.store, sink)
    }

    /// Fires everything pending and returns one labelled line per event.
    pub fn process_described(&mut self) -> Vec<String> {
        let events = self.process();
        self.describe(&events)
    }

    /// Drops everything pending without firing.
    pub fn clear(&mut self) {
        self.batch.clear(&mut self.store);
    }

    /// Returns one labelled line per event.
    #[must_use]
    pub fn describe(&self, events: &[AccEvent]) -> Vec<String> {
        log::describe_all(&self.store, events)
    }
}

/// Child changes on one parent, performed inside an open scope.
#[derive(Debug)]
pub struct Mutation<'a, 't> {
    store: &'a mut AccessibleStore,
    batch: &'a mut MutationBatch<'t>,
    scope: MutationScope,
}

fn run<'t, R>(
    store: &mut AccessibleStore,
    batch: &mut MutationBatch<'t>,
    scope: MutationScope,
    f: impl FnOnce(&mut Mutation<'_, 't>) -> R,
) -> R {
    let mut m = Mutation {
        store,
        batch,
        scope,
    };
    let result = f(&mut m);
    let Mutation {
        store,
        batch,
        scope,
    } = m;
    scope.finish(store, batch);
    result
}

impl<'t> Mutation<'_, 't> {
    /// Returns the parent whose children are changing.
    #[must_use]
    pub fn parent(&self) -> AccessibleId {
        self.scope.parent()
    }

    /// Returns the store.
    #[must_use]
    pub fn store(&self) -> &AccessibleStore {
        self.store
    }

    /// Returns the store for edits the scope is not told about.
    pub fn store_mut(&mut self) -> &mut AccessibleStore {
        self.store
    }

    /// Creates a detached accessible in the parent's document.
    pub fn create(&mut self, role: Role, label: &str) -> AccessibleId {
        let document = self.store.document(self.parent());
        self.store.create(document, role, label)
    }

    /// Creates a detached text leaf in the parent's document.
    pub fn create_text(&mut self, text: &str) -> AccessibleId {
        let document = self.store.document(self.parent());
        self.store.create_text(document, text)
    }

    /// Links `child` at `index` and registers the insertion.
    pub fn insert(&mut self, index: usize, child: AccessibleId) -> AccessibleId {
        self.store.insert_child(self.scope.parent(), index, child);
        self.scope.register_insertion(self.store, self.batch, child);
        child
    }

    /// Links `child` last and registers the insertion.
    pub fn append(&mut self, child: AccessibleId) -> AccessibleId {
        let index = self.store.child_count(self.scope.parent());
        self.insert(index, child)
    }

    /// Registers the removal of `child`, then unlinks it. Its subtree is torn
    /// down once the hide has fired.
    pub fn remove(&mut self, child: AccessibleId) {
        self.scope
            .register_removal(self.store, self.batch, child, false);
        self.store.remove_child(child);
    }

    /// Registers the removal of `child`, then unlinks it, keeping its subtree
    /// alive so it can be linked elsewhere.
    pub fn remove_keep(&mut self, child: AccessibleId) {
        self.scope
            .register_removal(self.store, self.batch, child, true);
        self.store.remove_child(child);
    }

    /// Runs `f` inside a nested scope on `parent`.
    pub fn mutate<R>(
        &mut self,
        parent: AccessibleId,
        f: impl FnOnce(&mut Mutation<'_, 't>) -> R,
    ) -> R {
        let scope = MutationScope::new(self.store, self.batch, parent);
        run(self.store, self.batch, scope, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coalesce_core::dirty;

    #[test]
    fn insert_renumbers_and_reports() {
        let mut driver = Driver::new(BatchConfig::structural());
        let store = driver.store_mut();
        let doc = store.create_document("doc");
        let p = store.create(doc, Role::Section, "p");
        store.append_child(doc, p);
        for label in ["a", "b", "c"] {
            let child = store.create(doc, Role::Button, label);
            store.append_child(p, child);
        }

        let x = driver.mutate(p, |m| {
            let x = m.create(Role::Button, "x");
            m.insert(1, x)
        });

        let indices: Vec<_> = driver
            .store()
            .children(p)
            .map(|c| driver.store().index_in_parent(c))
            .collect();
        assert_eq!(indices, [Some(0), Some(1), Some(2), Some(3)]);
        assert_eq!(driver.store().index_in_parent(x), Some(1));
        assert_eq!(driver.store_mut().take_dirty(dirty::NAME), [x]);
        assert_eq!(
            driver.process_described(),
            ["show x in p", "reorder p"]
        );
    }

    #[test]
    fn remove_keep_leaves_subtree_alive() {
        let mut driver = Driver::default();
        let store = driver.store_mut();
        let doc = store.create_document("doc");
        let p = store.create(doc, Role::Section, "p");
        store.append_child(doc, p);
        let a = store.create(doc, Role::Button, "a");
        store.append_child(p, a);
        let b = store.create(doc, Role::Button, "b");
        store.append_child(p, b);

        driver.mutate(p, |m| {
            m.remove_keep(a);
            m.remove(b);
        });
        driver.process();

        assert!(driver.store().is_alive(a));
        assert!(!driver.store().is_alive(b));
        assert_eq!(driver.store().shutdowns(), [b]);
    }
}
