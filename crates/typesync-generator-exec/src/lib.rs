// # Exec Type Generator
//
// This crate turns a serialized OpenAPI document into TypeScript type
// declarations by invoking the `openapi-typescript` CLI through `npx`.
//
// ## Behavior
//
// - The child process owns the output file; on failure the previous
//   artifact is left untouched
// - A non-zero exit status is a generation error carrying the captured
//   stderr
// - stderr output on a successful exit is logged as a warning, not
//   treated as failure (the CLI prints deprecation notices there)

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};
use typesync_core::error::{Error, Result};
use typesync_core::traits::TypeGenerator;

/// Type generator shelling out to an external CLI
pub struct ExecGenerator {
    /// Program to execute
    program: String,

    /// Arguments placed before the spec path
    leading_args: Vec<String>,
}

impl ExecGenerator {
    /// Create a generator invoking `npx openapi-typescript`
    pub fn new() -> Self {
        Self {
            program: "npx".to_string(),
            leading_args: vec!["openapi-typescript".to_string()],
        }
    }

    /// Create a generator invoking an arbitrary command (used by tests)
    pub fn with_command(program: impl Into<String>, leading_args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            leading_args,
        }
    }
}

impl Default for ExecGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TypeGenerator for ExecGenerator {
    async fn generate(&self, spec_path: &Path, output_path: &Path) -> Result<()> {
        debug!(
            program = %self.program,
            spec_path = %spec_path.display(),
            output_path = %output_path.display(),
            "Invoking type generator"
        );

        let output = Command::new(&self.program)
            .args(&self.leading_args)
            .arg(spec_path)
            .arg("--output")
            .arg(output_path)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|err| {
                Error::generation(format!("Failed to run {}: {}", self.program, err))
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            let message = format!(
                "{} exited with status {}",
                self.program,
                output
                    .status
                    .code()
                    .map(|code| code.to_string())
                    .unwrap_or_else(|| "unknown".to_string())
            );
            return if stderr.trim().is_empty() {
                Err(Error::generation(message))
            } else {
                Err(Error::generation_with_stderr(message, stderr.trim()))
            };
        }

        // The CLI writes progress and deprecation notices to stderr even
        // when it succeeds.
        if !stderr.trim().is_empty() {
            warn!("Warning during type generation: {}", stderr.trim());
        }
        if !output.stdout.is_empty() {
            debug!(
                "Generator output: {}",
                String::from_utf8_lossy(&output.stdout).trim()
            );
        }

        Ok(())
    }

    fn generator_name(&self) -> &'static str {
        "openapi-typescript"
    }
}

#[cfg(unix)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    /// Write an executable shell script into `dir` and return its path
    fn script(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }

    #[tokio::test]
    async fn successful_generation_writes_the_output() {
        let dir = tempfile::tempdir().unwrap();
        let spec_path = dir.path().join("api.json");
        let output_path = dir.path().join("types.ts");
        std::fs::write(&spec_path, "{\"openapi\":\"3.0.0\"}").unwrap();

        // Mimics `generator <spec> --output <out>` by copying $1 to $3
        let program = script(dir.path(), "fake-generator", r#"cp "$1" "$3""#);
        let generator = ExecGenerator::with_command(program.to_string_lossy(), vec![]);

        generator.generate(&spec_path, &output_path).await.unwrap();

        let artifact = std::fs::read_to_string(&output_path).unwrap();
        assert_eq!(artifact, "{\"openapi\":\"3.0.0\"}");
    }

    #[tokio::test]
    async fn nonzero_exit_carries_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let spec_path = dir.path().join("api.json");
        std::fs::write(&spec_path, "{}").unwrap();

        let program = script(dir.path(), "fake-generator", "echo 'boom' >&2\nexit 1");
        let generator = ExecGenerator::with_command(program.to_string_lossy(), vec![]);

        let err = generator
            .generate(&spec_path, &dir.path().join("types.ts"))
            .await
            .unwrap_err();

        match err {
            Error::Generation { stderr, .. } => {
                assert_eq!(stderr.as_deref(), Some("boom"));
            }
            other => panic!("expected generation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn stderr_on_success_is_not_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let spec_path = dir.path().join("api.json");
        let output_path = dir.path().join("types.ts");
        std::fs::write(&spec_path, "{}").unwrap();

        let program = script(
            dir.path(),
            "fake-generator",
            "echo 'deprecation notice' >&2\ncp \"$1\" \"$3\"",
        );
        let generator = ExecGenerator::with_command(program.to_string_lossy(), vec![]);

        generator.generate(&spec_path, &output_path).await.unwrap();
        assert!(output_path.exists());
    }

    #[tokio::test]
    async fn missing_program_is_a_generation_error() {
        let dir = tempfile::tempdir().unwrap();
        let spec_path = dir.path().join("api.json");
        std::fs::write(&spec_path, "{}").unwrap();

        let generator =
            ExecGenerator::with_command("/nonexistent/generator-binary", vec![]);
        let err = generator
            .generate(&spec_path, &dir.path().join("types.ts"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Generation { .. }), "{err:?}");
    }
}
