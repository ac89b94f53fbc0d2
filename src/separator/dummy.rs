//! Fake separation backend for tests and local development.
//!
//! Writes placeholder stem files straight to the output layout the real tool
//! would produce, or pretends the tool failed. Which stems appear is
//! configurable, so callers can exercise full, partial, and empty outcomes.

use std::path::Path;

use async_trait::async_trait;
use tokio::fs;

use super::{Separator, SeparatorError, StemKind};

pub struct DummySeparator {
    produce: Vec<StemKind>,
    fail: bool,
}

impl DummySeparator {
    pub fn new(produce: Vec<StemKind>, fail: bool) -> Self {
        Self { produce, fail }
    }

    /// Deterministic stand-in content for one stem file.
    pub fn placeholder_bytes(kind: StemKind) -> Vec<u8> {
        format!("RIFF placeholder for {}\n", kind.file_name()).into_bytes()
    }
}

#[async_trait]
impl Separator for DummySeparator {
    async fn separate(&self, _input: &Path, output_dir: &Path) -> Result<(), SeparatorError> {
        if self.fail {
            return Err(SeparatorError::Failed {
                code: 1,
                stderr: "dummy separator configured to fail".to_string(),
            });
        }

        for kind in &self.produce {
            let path = output_dir.join(kind.relative_path());
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).await?;
            }
            fs::write(&path, Self::placeholder_bytes(*kind)).await?;
        }

        Ok(())
    }
}
