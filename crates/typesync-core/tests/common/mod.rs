//! Test doubles and common utilities for architecture contract tests
//!
//! This module provides minimal test doubles that verify architectural
//! constraints without fetching real OpenAPI documents or shelling out to
//! a real generator.

use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;
use typesync_core::error::{Error, Result};
use typesync_core::traits::{SpecSource, TypeGenerator};

/// A deterministic OpenAPI-shaped document for tests
pub fn sample_document() -> serde_json::Value {
    json!({
        "openapi": "3.0.0",
        "info": { "title": "Sample API", "version": "1.0.0" },
        "paths": {
            "/users": {
                "get": {
                    "responses": { "200": { "description": "OK" } }
                }
            }
        }
    })
}

/// A spec source that always returns the same document
pub struct StaticSpecSource {
    document: serde_json::Value,
    fetch_count: Arc<AtomicUsize>,
}

impl StaticSpecSource {
    pub fn new(document: serde_json::Value) -> Self {
        Self {
            document,
            fetch_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared handle to the fetch counter
    pub fn fetch_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.fetch_count)
    }
}

#[async_trait::async_trait]
impl SpecSource for StaticSpecSource {
    async fn fetch(&self) -> Result<serde_json::Value> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.document.clone())
    }

    fn source_name(&self) -> &'static str {
        "static"
    }
}

/// A spec source whose fetch always fails
pub struct FailingSpecSource;

#[async_trait::async_trait]
impl SpecSource for FailingSpecSource {
    async fn fetch(&self) -> Result<serde_json::Value> {
        Err(Error::fetch_response(
            "Upstream returned an error status",
            500,
            "internal server error",
        ))
    }

    fn source_name(&self) -> &'static str {
        "failing"
    }
}

/// A generator that writes a rendered form of the spec to the output path
///
/// Tests compute the expected artifact with [`CopyingGenerator::render`]
/// and compare bytes.
pub struct CopyingGenerator {
    generate_count: Arc<AtomicUsize>,
}

impl CopyingGenerator {
    pub fn new() -> Self {
        Self {
            generate_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared handle to the generate counter
    pub fn generate_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.generate_count)
    }

    /// The artifact this generator produces for a serialized spec
    pub fn render(spec_bytes: &[u8]) -> Vec<u8> {
        let mut artifact = b"// generated\n".to_vec();
        artifact.extend_from_slice(spec_bytes);
        artifact
    }
}

#[async_trait::async_trait]
impl TypeGenerator for CopyingGenerator {
    async fn generate(&self, spec_path: &Path, output_path: &Path) -> Result<()> {
        self.generate_count.fetch_add(1, Ordering::SeqCst);
        let spec_bytes = tokio::fs::read(spec_path).await?;
        tokio::fs::write(output_path, Self::render(&spec_bytes)).await?;
        Ok(())
    }

    fn generator_name(&self) -> &'static str {
        "copying"
    }
}

/// A generator that blocks until released, with concurrency probes
///
/// Used to hold the pipeline busy while tests issue further regeneration
/// requests and assert they coalesce.
pub struct BlockingGenerator {
    release: Arc<Notify>,
    entered: Arc<AtomicUsize>,
    concurrent: Arc<AtomicUsize>,
    max_concurrent: Arc<AtomicUsize>,
}

impl BlockingGenerator {
    pub fn new() -> (Self, Arc<Notify>) {
        let release = Arc::new(Notify::new());

        let generator = Self {
            release: Arc::clone(&release),
            entered: Arc::new(AtomicUsize::new(0)),
            concurrent: Arc::new(AtomicUsize::new(0)),
            max_concurrent: Arc::new(AtomicUsize::new(0)),
        };

        (generator, release)
    }

    /// Total number of generate() entries
    pub fn entered_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.entered)
    }

    /// Highest number of simultaneously active generate() calls observed
    pub fn max_concurrent_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.max_concurrent)
    }
}

#[async_trait::async_trait]
impl TypeGenerator for BlockingGenerator {
    async fn generate(&self, _spec_path: &Path, output_path: &Path) -> Result<()> {
        self.entered.fetch_add(1, Ordering::SeqCst);
        let active = self.concurrent.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_concurrent.fetch_max(active, Ordering::SeqCst);

        self.release.notified().await;

        self.concurrent.fetch_sub(1, Ordering::SeqCst);
        tokio::fs::write(output_path, b"// generated after release\n").await?;
        Ok(())
    }

    fn generator_name(&self) -> &'static str {
        "blocking"
    }
}

/// A generator that panics instead of returning
///
/// Models a faulty collaborator implementation; the coordinator must
/// recover rather than stay busy forever.
pub struct PanickingGenerator;

#[async_trait::async_trait]
impl TypeGenerator for PanickingGenerator {
    async fn generate(&self, _spec_path: &Path, _output_path: &Path) -> Result<()> {
        panic!("generator implementation fault");
    }

    fn generator_name(&self) -> &'static str {
        "panicking"
    }
}

/// A generator that always fails with captured stderr
pub struct FailingGenerator;

#[async_trait::async_trait]
impl TypeGenerator for FailingGenerator {
    async fn generate(&self, _spec_path: &Path, _output_path: &Path) -> Result<()> {
        Err(Error::generation_with_stderr(
            "Generator exited with a non-zero status",
            "error: invalid schema".to_string(),
        ))
    }

    fn generator_name(&self) -> &'static str {
        "failing"
    }
}
