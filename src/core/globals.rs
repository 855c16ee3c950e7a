//! Process-wide shared state.

use lazy_static::lazy_static;
use tokio::runtime::Runtime;

lazy_static! {
    /// Shared multi-thread runtime for background tasks. Hosts without an
    /// ambient runtime drive async entry points through `block_on` on this.
    pub static ref TOKIO_RUNTIME: Runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("tracker-worker")
        .build()
        .expect("Failed to build tokio runtime");
}
