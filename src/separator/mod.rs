//! Separation backend abstraction layer.
//!
//! This module defines the [`Separator`] trait which abstracts the external
//! audio-separation tool. The production backend ([`command::CommandSeparator`])
//! runs the tool as a child process; the [`dummy::DummySeparator`] backend
//! fabricates output files on disk so the service can be exercised without a
//! tool install.
//!
//! The two expected output files are a hard-coded contract with the tool's
//! two-stem invocation mode and are modeled by [`StemKind`]; which of them
//! actually exists after a run is decided by probing the filesystem
//! ([`probe_stems`]), never by inspecting the tool's output.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::config::SeparatorConfig;

pub mod command;
pub mod dummy;

pub use command::CommandSeparator;
pub use dummy::DummySeparator;

/// Create a separation backend from configuration.
///
/// This is the single point where config turns into backend instances.
/// Adding a new backend requires adding a match arm here.
pub fn create_separator(config: &SeparatorConfig) -> Arc<dyn Separator> {
    match config {
        SeparatorConfig::Command { program, model } => Arc::new(CommandSeparator::new(program.clone(), model.clone())),
        SeparatorConfig::Dummy { produce, fail } => Arc::new(DummySeparator::new(produce.clone(), *fail)),
    }
}

/// Errors that can occur while running the separation backend
#[derive(Debug, thiserror::Error)]
pub enum SeparatorError {
    #[error("failed to spawn separation tool '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("separation tool exited with code {code}: {stderr}")]
    Failed { code: i32, stderr: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// One isolated audio component the tool is expected to produce.
///
/// The directory and file names mirror the tool's two-stem output layout:
/// `vocals/vocals.wav` and `accompaniment/accompaniment.wav` under the job's
/// output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StemKind {
    Vocals,
    Accompaniment,
}

impl StemKind {
    pub const ALL: [StemKind; 2] = [StemKind::Vocals, StemKind::Accompaniment];

    pub fn dir_name(self) -> &'static str {
        match self {
            StemKind::Vocals => "vocals",
            StemKind::Accompaniment => "accompaniment",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            StemKind::Vocals => "vocals.wav",
            StemKind::Accompaniment => "accompaniment.wav",
        }
    }

    /// Path of this stem relative to the job's output directory.
    pub fn relative_path(self) -> PathBuf {
        Path::new(self.dir_name()).join(self.file_name())
    }

    /// Resolve a client-supplied download filename to a stem.
    pub fn from_file_name(name: &str) -> Option<Self> {
        StemKind::ALL.into_iter().find(|kind| kind.file_name() == name)
    }
}

/// Abstract separation backend interface
#[async_trait]
pub trait Separator: Send + Sync {
    /// Separate `input` into stems under `output_dir`.
    ///
    /// `output_dir` exists before this is called. Returning `Ok` means the
    /// backend finished without error; it does NOT guarantee any stems were
    /// produced - callers decide that with [`probe_stems`].
    async fn separate(&self, input: &Path, output_dir: &Path) -> Result<(), SeparatorError>;
}

/// Check which of the expected stems exist under `output_dir`.
pub async fn probe_stems(output_dir: &Path) -> Vec<StemKind> {
    let mut found = Vec::new();
    for kind in StemKind::ALL {
        if fs::metadata(output_dir.join(kind.relative_path())).await.is_ok() {
            found.push(kind);
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_paths_match_the_tool_contract() {
        assert_eq!(StemKind::Vocals.relative_path(), Path::new("vocals/vocals.wav"));
        assert_eq!(
            StemKind::Accompaniment.relative_path(),
            Path::new("accompaniment/accompaniment.wav")
        );
    }

    #[test]
    fn file_name_lookup_only_matches_known_stems() {
        assert_eq!(StemKind::from_file_name("vocals.wav"), Some(StemKind::Vocals));
        assert_eq!(StemKind::from_file_name("accompaniment.wav"), Some(StemKind::Accompaniment));
        assert_eq!(StemKind::from_file_name("vocals"), None);
        assert_eq!(StemKind::from_file_name("../vocals.wav"), None);
        assert_eq!(StemKind::from_file_name("passwd"), None);
    }

    #[tokio::test]
    async fn probe_reports_only_existing_stems() {
        let dir = tempfile::tempdir().unwrap();

        assert!(probe_stems(dir.path()).await.is_empty());

        let vocals = dir.path().join(StemKind::Vocals.relative_path());
        fs::create_dir_all(vocals.parent().unwrap()).await.unwrap();
        fs::write(&vocals, b"wav").await.unwrap();

        assert_eq!(probe_stems(dir.path()).await, vec![StemKind::Vocals]);
    }
}
