//! Repository trait definitions.
//!
//! These traits define the storage interface the engine depends on.
//! The infrastructure layer (quill-infra) provides implementations.

pub mod checkpoint;
