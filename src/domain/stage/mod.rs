//! Stage Registry
//!
//! Declarative catalog of the twelve stages: fields, completion rules, and
//! scripts. Holds no runtime state.

pub mod catalog;
mod definition;
mod registry;
mod template;

pub use definition::{
    CompletionPredicate, FallbackCheck, FieldKind, FieldSpec, GateStrategy, OpenerFormat,
    SemanticCheck, StageDefinition,
};
pub use registry::{RegistryError, StageRegistry, StageTuning, MIN_STUCK_THRESHOLD};
pub use template::ScriptTemplate;
