use axum::{
    body::Body,
    extract::{Path as UrlPath, State},
    http::header,
    response::Response,
};
use tokio::fs;
use tokio_util::io::ReaderStream;

use crate::AppState;
use crate::errors::{Error, Result};
use crate::separator::StemKind;
use crate::types::JobId;

// GET /download/{job_id}/{stem} - Stream one produced stem
//
// Both segments are validated against what the pipeline can actually have
// produced: the job id must parse as a UUID and the stem must be one of the
// two fixed output filenames. Anything else is 404, so client-supplied path
// data never reaches the filesystem.
pub async fn download_stem(
    State(state): State<AppState>,
    UrlPath((job_id, stem)): UrlPath<(String, String)>,
) -> Result<Response> {
    let job: JobId = job_id.parse().map_err(|_| Error::NotFound {
        resource: "Job".to_string(),
        id: job_id.clone(),
    })?;

    let kind = StemKind::from_file_name(&stem).ok_or_else(|| Error::NotFound {
        resource: "Stem".to_string(),
        id: stem.clone(),
    })?;

    let path = state.storage.stem_path(job, kind);
    let file = fs::File::open(&path).await.map_err(|_| Error::NotFound {
        resource: "Stem".to_string(),
        id: stem.clone(),
    })?;

    let mime = mime_guess::from_path(kind.file_name()).first_or_octet_stream();
    let body = Body::from_stream(ReaderStream::new(file));

    let response = Response::builder()
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", kind.file_name()),
        )
        .body(body)
        .map_err(|e| Error::Other(e.into()))?;

    Ok(response)
}
