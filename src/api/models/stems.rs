//! Download link types for produced stems.

use crate::separator::StemKind;
use crate::types::JobId;

/// A download link for one stem a finished job produced.
///
/// The link carries the job id so each download resolves to the exact file
/// the results page advertised, independent of any other request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StemLink {
    pub name: &'static str,
    pub href: String,
}

impl StemLink {
    pub fn for_job(job: JobId, kind: StemKind) -> Self {
        Self {
            name: kind.file_name(),
            href: format!("/download/{job}/{}", kind.file_name()),
        }
    }
}
