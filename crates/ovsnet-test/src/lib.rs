//! Test infrastructure for ovsnet switch-control crates
//!
//! Provides:
//! - A recording switch fake implementing `SwitchControlPort`
//! - Port specification fixtures in the ingestion record shape

pub mod fixtures;
mod recording;

pub use fixtures::*;
pub use recording::{CommandFamily, RecordedCommand, RecordingSwitch};
