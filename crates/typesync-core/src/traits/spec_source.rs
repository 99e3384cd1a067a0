// # Spec Source Trait
//
// Defines the interface for fetching the remote OpenAPI document.
//
// ## Implementations
//
// - HTTP(S): `typesync-source-http` crate
//
// The core never inspects the document's content; it is an opaque JSON
// value handed to the type generator.

use async_trait::async_trait;

/// Trait for spec source implementations
///
/// # Failure Semantics
///
/// A failed fetch must surface as [`crate::Error::Fetch`], capturing the
/// response status and body when a response was received. The source never
/// retries; retry policy belongs to the trigger layer (a later trigger will
/// fetch again).
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait SpecSource: Send + Sync {
    /// Fetch the OpenAPI specification document
    ///
    /// # Returns
    ///
    /// - `Ok(Value)`: the parsed JSON document
    /// - `Err(Error::Fetch { .. })`: network failure or non-2xx response
    async fn fetch(&self) -> Result<serde_json::Value, crate::Error>;

    /// Get the source name (for logging/debugging)
    fn source_name(&self) -> &'static str;
}
