//! Storage Adapters
//!
//! Implementations of the SessionStore port.
//!
//! - **FileSessionStore** - One YAML file per conversation
//! - **InMemorySessionStore** - Process memory (testing/development)

mod file_session_store;
mod in_memory_session_store;

pub use file_session_store::FileSessionStore;
pub use in_memory_session_store::InMemorySessionStore;
