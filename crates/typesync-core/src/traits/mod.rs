//! Trait definitions for external collaborators
//!
//! The orchestrator only ever talks to the outside world through these
//! seams, so every one of them can be faked in tests.

pub mod spec_source;
pub mod trigger;
pub mod type_generator;

pub use spec_source::SpecSource;
pub use trigger::{Trigger, TriggerEvent};
pub use type_generator::TypeGenerator;
