//! Coach Engine - Stage orchestration for reflective coaching dialogues
//!
//! Drives a conversation through twelve fixed stages, deciding on every
//! turn whether the human's answer satisfies the current stage, what to
//! remember from it, and what to say next.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
