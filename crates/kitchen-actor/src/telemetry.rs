//! # Observability & Tracing
//!
//! [`setup_tracing`] installs the `tracing` subscriber used by every binary and by
//! tests that want to see actor logs.
//!
//! ## Configuration
//!
//! The format is compact and hides the module prefix (`with_target(false)`); actor logs
//! carry an `entity_type` field instead. Levels come from `RUST_LOG`:
//!
//! ```bash
//! RUST_LOG=info cargo run            # lifecycle, creates, admissions
//! RUST_LOG=debug cargo run           # every request with its payload
//! RUST_LOG=kitchen_flow=debug,kitchen_actor=info cargo run
//! ```
//!
//! ## What Gets Traced
//!
//! - **Actor lifecycle**: start, shutdown, final store size per shard
//! - **Entity operations**: Create, Ensure, Get, Update, Action with the entity key
//! - **Kitchen flow**: admissions, slot reservations, station moves, publication retries
//!
//! A typical admission at `info`:
//!
//! ```text
//! INFO submit{branch="main"}: Order accepted order_id=6f1c.. display_id=K7Q2MX slot_id=2024-05-01T12:15Z
//! INFO Created entity_type="ItemStatus" id=6f1c..#0 size=1
//! INFO Item advanced key=6f1c..#0 from=grill to=assembly index=1
//! ```

/// Initializes the global subscriber. Calling it again is a no-op.
pub fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // entity_type replaces module paths
        .compact()
        .try_init();
}
