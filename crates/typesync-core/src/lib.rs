// # typesync-core
//
// Core library for the TypeScript type synchronization orchestrator.
//
// ## Architecture Overview
//
// This library provides the core functionality for keeping a locally
// generated types file in sync with a remote OpenAPI specification:
// - **SpecSource**: Trait for fetching the OpenAPI document
// - **TypeGenerator**: Trait for turning a spec document into type declarations
// - **Trigger**: Trait for stimuli that request a regeneration (timer, file watcher)
// - **Pipeline**: One fetch-then-generate unit of work
// - **Coordinator**: Ensures at most one pipeline run is in flight
// - **SyncEngine**: Wires everything together and owns shutdown
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from integrations
// 2. **Event-Driven**: Triggers are async streams consumed by the engine
// 3. **Library-First**: All core functionality can be used as a library
// 4. **Lossy Triggers**: A request arriving while a run is active is dropped;
//    a later trigger will regenerate eventually

pub mod config;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod server;
pub mod traits;
pub mod trigger;

// Re-export core types for convenience
pub use config::{Config, Environment, LogLevel, TriggerMode};
pub use coordinator::{Coordinator, CoordinatorEvent};
pub use engine::SyncEngine;
pub use error::{Error, Result};
pub use pipeline::Pipeline;
pub use traits::{SpecSource, Trigger, TriggerEvent, TypeGenerator};
pub use trigger::{IntervalTrigger, WatchTrigger};
