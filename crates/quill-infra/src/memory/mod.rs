//! In-process storage backends.
//!
//! Durability only lasts as long as the process; nothing here touches disk.

pub mod checkpoint_store;

pub use checkpoint_store::InMemoryCheckpointStore;
