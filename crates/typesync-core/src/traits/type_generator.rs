// # Type Generator Trait
//
// Defines the interface for converting an OpenAPI document into a source
// file of type declarations.
//
// ## Implementations
//
// - External `openapi-typescript` process: `typesync-generator-exec` crate
//
// Modeling the generator as a capability keeps the external tool out of
// the orchestrator's tests.

use async_trait::async_trait;
use std::path::Path;

/// Trait for type generator implementations
///
/// # Atomicity
///
/// The generator owns the output file. On failure it must not leave a
/// partial artifact observable as final; implementations either rely on the
/// external tool's own atomicity or write-to-temp-then-rename.
///
/// # Failure Semantics
///
/// A failed generation must surface as [`crate::Error::Generation`],
/// capturing the process stderr when available. Non-fatal warnings from the
/// generator are logged, never failed. No retries here; retry policy
/// belongs to the trigger layer.
#[async_trait]
pub trait TypeGenerator: Send + Sync {
    /// Generate type declarations from a serialized spec document
    ///
    /// # Parameters
    ///
    /// - `spec_path`: path to the serialized OpenAPI JSON document
    /// - `output_path`: path the type declarations are written to
    async fn generate(&self, spec_path: &Path, output_path: &Path) -> Result<(), crate::Error>;

    /// Get the generator name (for logging/debugging)
    fn generator_name(&self) -> &'static str;
}
