//! Child-process separation backend.
//!
//! Runs the external tool with a direct argument vector; no shell is ever
//! involved, so path or filename content can never be interpreted as command
//! syntax. The equivalent invocation is:
//!
//! ```text
//! spleeter separate -i <input> -p spleeter:2stems -o <output_dir>
//! ```

use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use super::{Separator, SeparatorError};

pub struct CommandSeparator {
    program: String,
    model: String,
}

impl CommandSeparator {
    pub fn new(program: String, model: String) -> Self {
        Self { program, model }
    }

    /// Argument vector for one run. Paths are passed through as single
    /// arguments, untouched.
    fn build_args(&self, input: &Path, output_dir: &Path) -> Vec<OsString> {
        vec![
            OsString::from("separate"),
            OsString::from("-i"),
            input.as_os_str().to_os_string(),
            OsString::from("-p"),
            OsString::from(self.model.as_str()),
            OsString::from("-o"),
            output_dir.as_os_str().to_os_string(),
        ]
    }
}

#[async_trait]
impl Separator for CommandSeparator {
    async fn separate(&self, input: &Path, output_dir: &Path) -> Result<(), SeparatorError> {
        let args = self.build_args(input, output_dir);
        debug!(program = %self.program, ?args, "Running separation tool");

        // stdout is noise here; stderr is kept for the failure report.
        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| SeparatorError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(program = %self.program, code = output.status.code(), "Separation tool failed");
            return Err(SeparatorError::Failed {
                code: output.status.code().unwrap_or(-1),
                stderr,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hostile_filenames_stay_single_arguments() {
        let sep = CommandSeparator::new("spleeter".into(), "spleeter:2stems".into());
        let input = Path::new("uploads/x\"; rm -rf ~; \".mp3");
        let args = sep.build_args(input, Path::new("output/x"));

        assert_eq!(args.len(), 7);
        assert_eq!(args[2], OsString::from("uploads/x\"; rm -rf ~; \".mp3"));
        assert_eq!(args[4], OsString::from("spleeter:2stems"));
        assert_eq!(args[6], OsString::from("output/x"));
    }

    #[tokio::test]
    async fn successful_exit_is_ok() {
        let sep = CommandSeparator::new("true".into(), "spleeter:2stems".into());
        let dir = tempfile::tempdir().unwrap();

        let result = sep.separate(Path::new("in.mp3"), dir.path()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn nonzero_exit_is_reported_with_code() {
        let sep = CommandSeparator::new("false".into(), "spleeter:2stems".into());
        let dir = tempfile::tempdir().unwrap();

        match sep.separate(Path::new("in.mp3"), dir.path()).await {
            Err(SeparatorError::Failed { code, .. }) => assert_eq!(code, 1),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_binary_is_a_spawn_error() {
        let sep = CommandSeparator::new("splitd-no-such-binary".into(), "spleeter:2stems".into());
        let dir = tempfile::tempdir().unwrap();

        match sep.separate(Path::new("in.mp3"), dir.path()).await {
            Err(SeparatorError::Spawn { program, .. }) => assert_eq!(program, "splitd-no-such-binary"),
            other => panic!("expected Spawn, got {other:?}"),
        }
    }
}
