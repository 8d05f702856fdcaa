//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing_subscriber` formatter filtered by `RUST_LOG`
//! (default `info`).
//!
//! ## What Gets Traced
//!
//! - **Actor lifecycle**: `Actor started` / `Shutdown` per shard, with the entity type.
//! - **Store requests**: `Create`, `Get`, `List`, `Action` at debug; commits at info;
//!   rejections at warn.
//! - **Transitions**: `Transition applied` (info) or `Transition rejected` (warn, with the
//!   reason `code`).
//! - **Collaborator failures**: `Internal failure` and `Notification failed` at error.
//!
//! ```bash
//! RUST_LOG=info cargo run                  # one line per commit
//! RUST_LOG=debug cargo run                 # every request and planned transition
//! RUST_LOG=courier_escrow=debug cargo run  # this crate only
//! ```
//!
//! With `RUST_LOG=info`, one order from placement to delivery reads roughly:
//!
//! ```text
//! INFO Stock reserved order_id=order_… order_number=GGM-LQ2J8Z3K-7F2Q remaining=3
//! INFO Created entity_type="OrderRecord" shard=5 id=order_…
//! INFO Order placed order_id=order_… total=115000
//! INFO Transition committed order_id=order_… from=pending to=confirmed
//! INFO Transition committed order_id=order_… from=confirmed to=confirmed
//! INFO Delivery code sent phone=+998901112233 order_number=GGM-LQ2J8Z3K-7F2Q
//! INFO Transition committed order_id=order_… from=confirmed to=picked_up
//! INFO Transition committed order_id=order_… from=picked_up to=delivered payment=completed entries=4
//! ```
//!
//! Proof tokens and delivery codes are never written to the log.

use tracing_subscriber::EnvFilter;

pub fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false) // entity_type and order_id say where a line came from
        .compact()
        .try_init();
    if installed.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}
