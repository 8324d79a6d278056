//! Example demonstrating trigger-file driven reload notifications.
//!
//! This example shows how to:
//! - Watch a trigger file that an external reloader touches
//! - Forward each change into the hub
//! - React to reloads from a subscriber
//!
//! Run with: cargo run --example hot_reload
//!
//! While running, touch the printed trigger file to raise a reload signal.

use hotswap_inject::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    println!("=== Hot Reload Example ===\n");

    let trigger = std::env::temp_dir().join("hotswap-inject.trigger");
    if !trigger.exists() {
        std::fs::write(&trigger, "")?;
        println!("Created {}", trigger.display());
    }

    let settings = Settings {
        mode: BrokerMode::Live,
        watch_path: Some(trigger.clone()),
        debounce_ms: 250,
        ..Settings::default()
    };
    let hub = Hub::builder().with_settings(settings).build();
    hub.ensure_loaded();

    let reloads = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&reloads);
    let _subscription = hub.subscribe(move || {
        let count = counter.fetch_add(1, Ordering::SeqCst) + 1;
        println!("\n[Event] Code reloaded (reload #{})", count);
    });

    let Some(bridge) = hub.watch_configured().await? else {
        println!("Nothing to watch");
        return Ok(());
    };

    println!("Listening for '{}'", bridge.name());
    println!(
        "\n===> Run `touch {}` to raise a reload signal <===",
        trigger.display()
    );
    println!("\nPress Ctrl+C to exit\n");

    loop {
        tokio::time::sleep(tokio::time::Duration::from_secs(5)).await;

        println!(
            "[Status] events: {}, forwarded signals: {}, reloads seen: {}",
            hub.current_count(),
            bridge.signals_forwarded(),
            reloads.load(Ordering::SeqCst)
        );
    }
}
