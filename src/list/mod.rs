//! List Module
//!
//! In-memory state: the named lists and the registry that owns them.
//!
//! ## Responsibilities
//! - Per-list reader/writer locking (operations on different lists never
//!   contend)
//! - Lazy, double-checked list creation
//! - Enumeration for the snapshot engine
//!
//! ## Data Structure Choice
//! `HashMap<String, Arc<ManagedList>>` behind an RwLock, each list a
//! `Vec<i64>` behind its own RwLock:
//! - Tail append/remove are O(1)
//! - `Arc` lets callers keep a list after releasing the registry lock

mod managed;
mod registry;

pub use managed::ManagedList;
pub use registry::ListRegistry;
