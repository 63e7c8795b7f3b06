//! Session domain module.
//!
//! Per-conversation mutable record: current stage, collected data, loop
//! counters and the bounded windows used for anti-repetition.

mod collected_data;
mod recent_window;
mod state;

pub use collected_data::{CollectedData, FieldUpdate, FieldUpdates, FieldValue};
pub use recent_window::RecentWindow;
pub use state::{
    Exchange, IllegalTransition, SessionState, DEFAULT_HISTORY_WINDOW, DEFAULT_OPENER_WINDOW,
};
