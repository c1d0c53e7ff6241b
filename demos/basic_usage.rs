//! Basic engine usage example
//!
//! Demonstrates building a dispatch engine, logging at different levels, and
//! shutting down cleanly.
//!
//! Run with: cargo run --example basic_usage

use logweave::prelude::*;
use logweave::{info, warn};

fn main() -> Result<()> {
    println!("=== Logweave - Basic Usage Example ===\n");

    let engine = DispatchEngine::builder()
        .pattern("{timestamp} {level} {caller-class} - {message-and-error}")
        .min_level(Level::Trace)
        .build()?;

    let coordinator = LifecycleCoordinator::new();
    coordinator.register_stoppable(engine.clone());

    let logger = Logger::attached(&engine, "demo::basic");

    println!("1. Logging at different levels:");
    logger.at_trace().log("This is a trace message");
    logger.at_debug().log("This is a debug message");
    logger.at_info().log("This is an info message");
    logger.at_warn().log("This is a warning message");
    logger.at_error().log("This is an error message");

    println!("\n2. Template arguments are formatted off the calling thread:");
    info!(logger, "processed {} items in {} ms", 128, 42);
    warn!(logger, "retry attempt {} of {}", 1, 3);

    println!("\n3. Attaching an error:");
    let failure = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "backend down");
    logger
        .at_error()
        .log_error(failure, "request {} failed", vec![Box::new("GET /health")]);

    // Drains every accepted event before returning.
    coordinator.shutdown_all();
    println!("\n=== Example completed successfully! ===");

    Ok(())
}
