// Copyright 2026 the Coalesce Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scripted document edits that exercise the tracing and diagnostics pipeline.
//!
//! Builds a small page, runs a few mutation passes through a
//! [`Driver`](coalesce_harness::driver::Driver), and records every step to
//! both a [`PrettyPrintSink`](coalesce_debug::pretty::PrettyPrintSink) (with
//! forest dumps) and a [`RecorderSink`](coalesce_debug::recorder::RecorderSink),
//! then exports a Chrome trace JSON file.

use std::fs::File;
use std::io::BufWriter;

use coalesce_core::config::BatchConfig;
use coalesce_core::event::AccEvent;
use coalesce_core::forest::EventForest;
use coalesce_core::id::AccessibleId;
use coalesce_core::trace::{
    CoalescedEvent, DiscardedEvent, IgnoredEvent, PlacementEvent, ProcessSummary,
    ScopeBeginEvent, ScopeEndEvent, TraceSink, Tracer,
};
use coalesce_core::tree::Role;
use coalesce_harness::driver::Driver;

use coalesce_debug::pretty::PrettyPrintSink;
use coalesce_debug::recorder::RecorderSink;

/// Forwards every trace event to both sinks.
struct Tee<'a> {
    pretty: &'a mut PrettyPrintSink,
    recorder: &'a mut RecorderSink,
}

impl TraceSink for Tee<'_> {
    fn on_scope_begin(&mut self, e: &ScopeBeginEvent, forest: &EventForest) {
        self.pretty.on_scope_begin(e, forest);
        self.recorder.on_scope_begin(e, forest);
    }

    fn on_scope_end(&mut self, e: &ScopeEndEvent, forest: &EventForest) {
        self.pretty.on_scope_end(e, forest);
        self.recorder.on_scope_end(e, forest);
    }

    fn on_placement(&mut self, e: &PlacementEvent) {
        self.pretty.on_placement(e);
        self.recorder.on_placement(e);
    }

    fn on_ignored(&mut self, e: &IgnoredEvent) {
        self.pretty.on_ignored(e);
        self.recorder.on_ignored(e);
    }

    fn on_discarded(&mut self, e: &DiscardedEvent) {
        self.pretty.on_discarded(e);
        self.recorder.on_discarded(e);
    }

    fn on_coalesced(&mut self, e: &CoalescedEvent) {
        self.pretty.on_coalesced(e);
        self.recorder.on_coalesced(e);
    }

    fn on_fired(&mut self, e: &AccEvent) {
        self.pretty.on_fired(e);
        self.recorder.on_fired(e);
    }

    fn on_process(&mut self, s: &ProcessSummary) {
        self.pretty.on_process(s);
        self.recorder.on_process(s);
    }
}

/// The page every pass edits.
struct Page {
    doc: AccessibleId,
    article: AccessibleId,
    para: AccessibleId,
    hello: AccessibleId,
    link: AccessibleId,
    world: AccessibleId,
    list: AccessibleId,
    menu: AccessibleId,
}

fn build(driver: &mut Driver<'_>) -> Page {
    let store = driver.store_mut();
    let doc = store.create_document("doc");

    let article = store.create(doc, Role::Section, "article");
    store.append_child(doc, article);
    let para = store.create(doc, Role::Paragraph, "para");
    store.append_child(article, para);
    let hello = store.create_text(doc, "Hello, ");
    store.append_child(para, hello);
    let link = store.create(doc, Role::Link, "link");
    store.append_child(para, link);
    let world = store.create_text(doc, "world");
    store.append_child(para, world);

    let list = store.create(doc, Role::List, "list");
    store.append_child(article, list);
    for label in ["one", "two", "three"] {
        let item = store.create(doc, Role::ListItem, label);
        store.append_child(list, item);
    }

    let menu = store.create(doc, Role::MenuPopup, "menu");
    store.append_child(doc, menu);
    let entry = store.create(doc, Role::MenuItem, "entry");
    store.append_child(menu, entry);

    Page {
        doc,
        article,
        para,
        hello,
        link,
        world,
        list,
        menu,
    }
}

fn deliver(driver: &mut Driver<'_>, pass: &str) {
    println!("== {pass} ==");
    for line in driver.process_described() {
        println!("  -> {line}");
    }
}

fn main() {
    // -- sinks -------------------------------------------------------------
    let mut pretty = PrettyPrintSink::new(Box::new(std::io::stdout())).with_forest_dumps(true);
    let mut recorder = RecorderSink::new();

    {
        let mut tee = Tee {
            pretty: &mut pretty,
            recorder: &mut recorder,
        };
        let mut driver = Driver::with_tracer(BatchConfig::new(), Tracer::new(&mut tee));
        let page = build(&mut driver);

        // 1. Rewrite the greeting and grow the list at the front.
        driver.mutate(page.para, |m| {
            m.remove(page.hello);
            m.remove(page.link);
            let bye = m.create_text("Goodbye, ");
            m.insert(0, bye);
        });
        driver.mutate_from_user_input(page.list, |m| {
            let zero = m.create(Role::ListItem, "zero");
            m.insert(0, zero);
        });
        deliver(&mut driver, "rewrite");

        // 2. Edit inside the paragraph, then drop the paragraph as a whole.
        driver.mutate(page.para, |m| m.remove(page.world));
        driver.mutate(page.article, |m| m.remove(page.para));
        driver.mutate(page.article, |m| {
            let note = m.create(Role::Section, "note");
            m.append(note);
        });
        deliver(&mut driver, "collapse");

        // 3. Close the popup and show a fresh section, then fill it in.
        driver.mutate(page.doc, |m| m.remove(page.menu));
        let section = driver.mutate(page.article, |m| {
            let section = m.create(Role::Section, "section");
            m.append(section)
        });
        driver.mutate(section, |m| {
            let filler = m.create(Role::Button, "filler");
            m.append(filler);
        });
        deliver(&mut driver, "popup");
    }

    // -- export Chrome trace -----------------------------------------------
    let path = "trace.json";
    let file = File::create(path).expect("failed to create trace.json");
    let mut writer = BufWriter::new(file);
    coalesce_debug::chrome::export(recorder.as_bytes(), &mut writer)
        .expect("failed to write Chrome trace");

    println!("Wrote {path} ({} bytes recorded)", recorder.as_bytes().len());
}
