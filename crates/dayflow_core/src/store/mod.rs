//! Asynchronous task store with a live, push-updating list.
//!
//! # Responsibility
//! - Serialize all task writes through one writer thread.
//! - Publish a fresh snapshot to every observer after each mutation.
//!
//! # Invariants
//! - Mutations are applied in submission order.
//! - A snapshot is published before the mutation's handle resolves.

pub mod task_store;
