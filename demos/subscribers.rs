//! Example demonstrating owner-scoped subscriptions.
//!
//! This example shows how to:
//! - Tie a subscription to the object that owns the callback
//! - Receive a reload notification per event
//! - Unsubscribe by dropping the owner
//!
//! Run with: cargo run --example subscribers

use hotswap_inject::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A view that redraws itself after every reload.
struct View {
    name: &'static str,
    redraws: Arc<AtomicUsize>,
    _reload: CancellationHandle,
}

impl View {
    fn attach(hub: &Hub, name: &'static str) -> Self {
        let redraws = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&redraws);
        let reload = hub.subscribe(move || {
            let count = counter.fetch_add(1, Ordering::SeqCst) + 1;
            println!("[{}] code reloaded, redraw #{}", name, count);
        });

        Self {
            name,
            redraws,
            _reload: reload,
        }
    }

    fn redraws(&self) -> usize {
        self.redraws.load(Ordering::SeqCst)
    }
}

fn main() {
    println!("=== Subscriber Example ===\n");

    let hub = Hub::builder().with_mode(BrokerMode::Live).build();
    hub.ensure_loaded();

    let sidebar = View::attach(&hub, "sidebar");
    let editor = View::attach(&hub, "editor");
    let preview = View::attach(&hub, "preview");
    println!("Attached {} views\n", hub.listener_count());

    println!("--- Reload 1 ---");
    hub.notify();

    println!("\n--- Closing the editor ---");
    let editor_redraws = editor.redraws();
    drop(editor);
    println!("{} listeners left", hub.listener_count());

    println!("\n--- Reload 2 ---");
    hub.notify();

    println!("\nReload events: {}", hub.current_count());
    for view in [&sidebar, &preview] {
        println!("  {}: {} redraws", view.name, view.redraws());
    }
    println!("  editor: {} redraws before closing", editor_redraws);

    drop(sidebar);
    drop(preview);
    println!("\nAll views closed, {} listeners left", hub.listener_count());
}
