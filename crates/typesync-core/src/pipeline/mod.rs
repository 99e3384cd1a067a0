//! Fetch/Generate pipeline
//!
//! One idempotent unit of work: produce an up-to-date types file.
//!
//! ## Steps
//!
//! 1. Fetch the OpenAPI document from the spec source
//! 2. Serialize it to an intermediate `api.json` and hand that to the
//!    type generator together with the output path
//! 3. Remove the intermediate file regardless of outcome (best effort)
//!
//! Every failure propagates to the caller as a typed error; the pipeline
//! never retries. Retry policy belongs to the trigger layer: a failed run
//! simply waits for the next trigger.
//!
//! On failure the previously generated artifact is left untouched. The
//! pipeline itself never writes to the output path; the generator owns it.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::traits::{SpecSource, TypeGenerator};

/// Default file name for the intermediate serialized spec document
const INTERMEDIATE_SPEC_FILE: &str = "api.json";

/// One fetch-then-generate unit of work
pub struct Pipeline {
    /// Source of the OpenAPI document
    source: Box<dyn SpecSource>,

    /// Generator turning the document into type declarations
    generator: Box<dyn TypeGenerator>,

    /// Where the intermediate serialized spec is written
    spec_path: PathBuf,

    /// Where the generated type declarations land
    output_path: PathBuf,
}

impl Pipeline {
    /// Create a new pipeline
    ///
    /// The intermediate spec document is written next to the output
    /// artifact as `api.json` and removed after each run.
    pub fn new(
        source: Box<dyn SpecSource>,
        generator: Box<dyn TypeGenerator>,
        output_path: PathBuf,
    ) -> Self {
        let spec_path = match output_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                parent.join(INTERMEDIATE_SPEC_FILE)
            }
            _ => PathBuf::from(INTERMEDIATE_SPEC_FILE),
        };

        Self {
            source,
            generator,
            spec_path,
            output_path,
        }
    }

    /// Override the intermediate spec path (used by tests)
    pub fn with_spec_path(mut self, spec_path: PathBuf) -> Self {
        self.spec_path = spec_path;
        self
    }

    /// Path of the generated artifact
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Path of the intermediate serialized spec document
    ///
    /// The watch trigger needs it to tell the pipeline's own writes apart
    /// from external edits.
    pub fn spec_path(&self) -> &Path {
        &self.spec_path
    }

    /// Run the pipeline once
    ///
    /// Fetch always precedes generation, and generation always precedes
    /// cleanup of the intermediate document.
    pub async fn run(&self) -> Result<()> {
        let document = self.source.fetch().await?;
        debug!(
            source = self.source.source_name(),
            "Fetched OpenAPI specification document"
        );

        let serialized = serde_json::to_vec_pretty(&document)?;
        tokio::fs::write(&self.spec_path, &serialized).await?;
        debug!(
            spec_path = %self.spec_path.display(),
            spec_len = serialized.len(),
            "Wrote intermediate spec document"
        );

        let result = self
            .generator
            .generate(&self.spec_path, &self.output_path)
            .await;

        // Cleanup is best-effort and runs regardless of outcome
        if let Err(err) = tokio::fs::remove_file(&self.spec_path).await {
            warn!(
                spec_path = %self.spec_path.display(),
                "Failed to remove intermediate spec file: {err}"
            );
        }

        result?;

        info!(
            output_path = %self.output_path.display(),
            "Successfully generated TypeScript types"
        );
        Ok(())
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("source", &self.source.source_name())
            .field("generator", &self.generator.generator_name())
            .field("spec_path", &self.spec_path)
            .field("output_path", &self.output_path)
            .finish()
    }
}
