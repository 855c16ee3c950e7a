//! Foundations shared by every subsystem: the memory access capability,
//! the host memory layout config, and the process-wide runtime.

pub mod globals;
pub mod layout;
pub mod memory;

pub use globals::TOKIO_RUNTIME;
pub use layout::{ActorFieldLayout, TableLayout};
pub use memory::MemoryReader;
