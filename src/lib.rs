//! # remotelist
//!
//! A network-accessible store of named integer lists with:
//! - Write-Ahead Logging (WAL) for durability, fsynced before every reply
//! - Periodic snapshots that compact the WAL
//! - Crash recovery from snapshot + WAL replay
//! - Per-list reader/writer locking
//! - TCP-based client protocol
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │              (one thread per connection)                     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Store                                  │
//! │          Append / Get / Remove / Size facade                 │
//! └──────┬──────────────────────┬───────────────────────┬───────┘
//!        │                      │                       │
//!        ▼                      ▼                       ▼
//!   ┌─────────────┐      ┌──────────────┐       ┌──────────────┐
//!   │     WAL     │      │ ListRegistry │       │   Snapshot   │
//!   │  (Mutex)    │      │   (RwLock)   │       │ (scheduler)  │
//!   └─────────────┘      └──────┬───────┘       └──────────────┘
//!                               │
//!                               ▼
//!                        ┌──────────────┐
//!                        │ ManagedList  │
//!                        │ (RwLock each)│
//!                        └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod wal;
pub mod list;
pub mod snapshot;
pub mod network;
pub mod protocol;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ListError, Result};
pub use config::Config;
pub use store::Store;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of remotelist
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
