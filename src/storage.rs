//! Upload persistence and the filesystem layout shared with the external tool.
//!
//! Uploads land at `uploads/<job-id>` while the multipart stream is read, then
//! get renamed to `uploads/<job-id>.<ext>` so the tool can infer the container
//! format. Each job owns `output/<job-id>/`, which must exist before the tool
//! runs. Nothing here is ever cleaned up; both directories grow without bound.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::config::StorageConfig;
use crate::separator::StemKind;
use crate::types::JobId;

#[derive(Debug, Clone)]
pub struct Storage {
    upload_dir: PathBuf,
    output_dir: PathBuf,
}

impl Storage {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            upload_dir: config.upload_dir.clone(),
            output_dir: config.output_dir.clone(),
        }
    }

    /// Create the upload and output directories if they are missing.
    pub async fn ensure_dirs(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.upload_dir).await?;
        fs::create_dir_all(&self.output_dir).await?;
        Ok(())
    }

    /// Path the raw upload is streamed to before normalization.
    pub fn upload_path(&self, job: JobId) -> PathBuf {
        self.upload_dir.join(job.to_string())
    }

    /// Rename the stored upload to carry the extension of the original
    /// filename. A missing or unusable extension leaves the stored path as-is;
    /// the tool then has to sniff the container itself.
    ///
    /// Returns the path the separation tool should read from.
    pub async fn normalize_upload(&self, job: JobId, original_name: Option<&str>) -> std::io::Result<PathBuf> {
        let stored = self.upload_path(job);
        let Some(ext) = original_name.and_then(sanitize_extension) else {
            return Ok(stored);
        };

        let normalized = stored.with_extension(&ext);
        fs::rename(&stored, &normalized).await?;
        Ok(normalized)
    }

    /// The per-job directory the tool writes its stems beneath.
    pub fn job_output_dir(&self, job: JobId) -> PathBuf {
        self.output_dir.join(job.to_string())
    }

    /// Create the per-job output directory, returning its path.
    pub async fn create_job_output_dir(&self, job: JobId) -> std::io::Result<PathBuf> {
        let dir = self.job_output_dir(job);
        fs::create_dir_all(&dir).await?;
        Ok(dir)
    }

    /// Where a given stem is expected after a successful run.
    pub fn stem_path(&self, job: JobId, stem: StemKind) -> PathBuf {
        self.job_output_dir(job).join(stem.relative_path())
    }
}

/// Extract a filesystem-safe extension from a client-supplied filename.
///
/// The original filename is attacker-controlled, so only short, lowercase,
/// purely alphanumeric extensions are accepted. Anything else is treated as
/// no extension at all.
pub fn sanitize_extension(name: &str) -> Option<String> {
    let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
    if ext.is_empty() || ext.len() > 8 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn storage_in(root: &Path) -> Storage {
        Storage::new(&StorageConfig {
            upload_dir: root.join("uploads"),
            output_dir: root.join("output"),
            ..StorageConfig::default()
        })
    }

    #[test]
    fn sanitize_accepts_common_extensions() {
        assert_eq!(sanitize_extension("song.mp3"), Some("mp3".to_string()));
        assert_eq!(sanitize_extension("SONG.FLAC"), Some("flac".to_string()));
        assert_eq!(sanitize_extension("mix.final.wav"), Some("wav".to_string()));
    }

    #[test]
    fn sanitize_rejects_hostile_or_missing_extensions() {
        assert_eq!(sanitize_extension("song"), None);
        assert_eq!(sanitize_extension("song."), None);
        assert_eq!(sanitize_extension("x.mp3; rm -rf ~"), None);
        assert_eq!(sanitize_extension("x.reallylongextension"), None);
        assert_eq!(sanitize_extension("x.mp 3"), None);
    }

    #[tokio::test]
    async fn normalize_renames_to_original_extension() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(dir.path());
        storage.ensure_dirs().await.unwrap();

        let job = Uuid::new_v4();
        fs::write(storage.upload_path(job), b"fake audio").await.unwrap();

        let input = storage.normalize_upload(job, Some("song.MP3")).await.unwrap();

        assert_eq!(input.extension().unwrap(), "mp3");
        assert_eq!(fs::read(&input).await.unwrap(), b"fake audio");
        assert!(fs::metadata(storage.upload_path(job)).await.is_err(), "bare path should be gone");
    }

    #[tokio::test]
    async fn normalize_keeps_bare_path_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(dir.path());
        storage.ensure_dirs().await.unwrap();

        let job = Uuid::new_v4();
        fs::write(storage.upload_path(job), b"fake audio").await.unwrap();

        let input = storage.normalize_upload(job, Some("trackname")).await.unwrap();

        assert_eq!(input, storage.upload_path(job));
        assert!(fs::metadata(&input).await.is_ok());
    }

    #[tokio::test]
    async fn normalize_fails_when_upload_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(dir.path());
        storage.ensure_dirs().await.unwrap();

        let result = storage.normalize_upload(Uuid::new_v4(), Some("song.mp3")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn stem_paths_follow_the_tool_layout() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(dir.path());

        let job = Uuid::new_v4();
        let out = storage.create_job_output_dir(job).await.unwrap();

        assert!(fs::metadata(&out).await.unwrap().is_dir());
        assert_eq!(storage.stem_path(job, StemKind::Vocals), out.join("vocals").join("vocals.wav"));
        assert_eq!(
            storage.stem_path(job, StemKind::Accompaniment),
            out.join("accompaniment").join("accompaniment.wav")
        );
    }
}
