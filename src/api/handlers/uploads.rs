use axum::{
    extract::{Multipart, State},
    response::Html,
};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::AppState;
use crate::api::models::stems::StemLink;
use crate::errors::{Error, Result};
use crate::separator::{self, StemKind};
use crate::types::{JobId, abbrev_uuid};

const UPLOAD_PAGE: &str = r#"<h1>Upload Audio File for Separation</h1>
<form action="/upload" method="post" enctype="multipart/form-data">
  <input type="file" name="audioFile" accept="audio/*" required>
  <button type="submit">Upload and Process</button>
</form>
"#;

// GET / - Upload form
pub async fn index() -> Html<&'static str> {
    Html(UPLOAD_PAGE)
}

// POST /upload - Run the whole pipeline: store, normalize, separate, probe
pub async fn separate(State(state): State<AppState>, mut multipart: Multipart) -> Result<Html<String>> {
    let job: JobId = Uuid::new_v4();
    let max_upload_bytes = state.config.storage.max_upload_bytes;

    let mut original_name: Option<String> = None;
    let mut received = false;
    let mut total_bytes = 0u64;

    // Stream the upload to disk chunk by chunk; the whole file is never held
    // in memory.
    while let Some(mut field) = multipart.next_field().await.map_err(|e| Error::BadRequest {
        message: format!("Failed to parse multipart data: {e}"),
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "audioFile" => {
                original_name = field.file_name().map(|s| s.to_string());

                let stored_path = state.storage.upload_path(job);
                let mut file = fs::File::create(&stored_path)
                    .await
                    .map_err(|e| Error::io("store uploaded file", e))?;

                while let Some(chunk) = field.chunk().await.map_err(|e| Error::BadRequest {
                    message: format!("Failed to read file chunk: {e}"),
                })? {
                    total_bytes += chunk.len() as u64;

                    // Check the limit incrementally to fail fast
                    if total_bytes > max_upload_bytes {
                        return Err(Error::PayloadTooLarge {
                            message: format!("File size exceeds maximum allowed size of {max_upload_bytes} bytes"),
                        });
                    }

                    file.write_all(&chunk).await.map_err(|e| Error::io("store uploaded file", e))?;
                }

                file.flush().await.map_err(|e| Error::io("store uploaded file", e))?;
                received = true;
            }
            _ => {
                // Ignore unknown fields (forward compatibility)
            }
        }
    }

    if !received || total_bytes == 0 {
        // A zero-byte file may have been created for an empty field; drop it.
        if received {
            let _ = fs::remove_file(state.storage.upload_path(job)).await;
        }
        return Err(Error::MissingUpload);
    }

    tracing::info!(
        job = %abbrev_uuid(&job),
        filename = ?original_name,
        bytes = total_bytes,
        "Upload stored"
    );

    let input = state
        .storage
        .normalize_upload(job, original_name.as_deref())
        .await
        .map_err(|e| Error::io("rename uploaded file", e))?;

    let output_dir = state
        .storage
        .create_job_output_dir(job)
        .await
        .map_err(|e| Error::io("create output directory", e))?;

    state.separator.separate(&input, &output_dir).await?;

    // Existence on disk decides the outcome, not the tool's exit payload.
    // One stem out of two still counts as success.
    let stems = separator::probe_stems(&output_dir).await;
    if stems.is_empty() {
        return Err(Error::NoStems { job });
    }

    tracing::info!(job = %abbrev_uuid(&job), stems = stems.len(), "Separation complete");

    Ok(Html(results_page(job, &stems)))
}

fn results_page(job: JobId, stems: &[StemKind]) -> String {
    let links = stems
        .iter()
        .map(|kind| {
            let link = StemLink::for_job(job, *kind);
            format!(r#"<a href="{}" target="_blank">{}</a>"#, link.href, link.name)
        })
        .collect::<Vec<_>>()
        .join("<br/>");

    format!("<h1>Download Processed Files</h1>\n{links}\n")
}
