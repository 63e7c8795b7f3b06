//! Domain layer containing the coaching dialogue logic.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (conversation IDs, the stage enum)
//! - `session` - Per-conversation state and collected data
//! - `stage` - Declarative stage catalog and registry
//! - `engine` - Gate, guard, composer and the turn orchestrator
//! - `text` - Word-level helpers shared by the engine

pub mod engine;
pub mod foundation;
pub mod session;
pub mod stage;
pub mod text;
