//! Coordinated refresh and shutdown example
//!
//! Demonstrates swapping the active pattern while producers keep logging,
//! and the drain guarantee of a coordinated shutdown.
//!
//! Run with: cargo run --example refresh_and_shutdown

use logweave::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn main() -> Result<()> {
    let engine = DispatchEngine::builder()
        .pattern("{level} {message-and-error}")
        .queue_capacity(512)
        .build()?;

    let coordinator = LifecycleCoordinator::new();
    coordinator.register_refreshable(engine.clone());
    coordinator.register_stoppable(engine.clone());

    let running = Arc::new(AtomicBool::new(true));
    let producer = {
        let engine = engine.clone();
        let running = running.clone();
        std::thread::spawn(move || {
            let logger = Logger::attached(&engine, "demo::producer");
            let mut i = 0u64;
            while running.load(Ordering::Relaxed) {
                logger.log_args("tick {}", vec![Box::new(i)]);
                i += 1;
                std::thread::sleep(Duration::from_millis(10));
            }
        })
    };

    std::thread::sleep(Duration::from_millis(100));

    // Swap the pattern under live producers; in-flight events render against
    // exactly one snapshot, old or new, never a mix.
    let overrides = HashMap::from([(
        "pattern".to_string(),
        "{timestamp} [{thread:name}] {level} {message-and-error}".to_string(),
    )]);
    coordinator.refresh_all_with(&overrides);

    std::thread::sleep(Duration::from_millis(100));
    running.store(false, Ordering::Relaxed);
    producer.join().expect("producer finished");

    // Blocks until every accepted event reached the sink.
    coordinator.shutdown_all();
    println!(
        "delivered={} lost={}",
        engine.metrics().delivered(),
        engine.metrics().lost_events()
    );

    Ok(())
}
