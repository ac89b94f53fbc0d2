//! Common type definitions.
//!
//! A separation job is identified by a [`JobId`] generated when the upload is
//! received. The id names the stored upload (`uploads/<id>.<ext>`) and the
//! job's output directory (`output/<id>/`), so concurrent requests never
//! collide on the shared filesystem namespace.

use uuid::Uuid;

/// Identifier for one upload-and-separate job.
pub type JobId = Uuid;

/// Abbreviate a UUID to its first 8 characters for more readable logs.
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}
