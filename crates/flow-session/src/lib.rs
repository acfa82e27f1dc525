//! Session persistence for the Control Flow assistant.
//!
//! Provides:
//! - `SessionManager` - Create, touch and expire sessions
//! - Storage implementations (memory, SQLite)

pub mod manager;
pub mod storage;

pub use manager::SessionManager;
