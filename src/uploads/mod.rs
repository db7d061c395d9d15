//! Upload association.
//!
//! A file part is accepted only under a known field name. Each field maps to
//! a folder and a file kind, and the kind fixes the allowed extensions and
//! the size ceiling. Accepted files are written to the object store before
//! any record changes; the returned URLs are then written into the record.

mod form;

pub use form::{FormResource, FormSchema, ResourceForm};

use std::path::Path;

use chrono::Utc;
use futures::future::join_all;
use rand::{distributions::Alphanumeric, Rng};
use thiserror::Error;
use tracing::{debug, warn};

use crate::storage::{ObjectStore, StorageError};

const MB: usize = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Image,
    Document,
}

impl FileKind {
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            FileKind::Image => &["jpeg", "jpg", "png", "gif", "webp", "svg"],
            FileKind::Document => &["pdf", "doc", "docx"],
        }
    }

    pub fn max_bytes(&self) -> usize {
        match self {
            FileKind::Image => 5 * MB,
            FileKind::Document => 10 * MB,
        }
    }

    fn accepts_mime(&self, content_type: &str) -> bool {
        match self {
            FileKind::Image => content_type.starts_with("image/"),
            FileKind::Document => {
                content_type.starts_with("application/") || content_type.starts_with("document/")
            }
        }
    }

    fn rejection(&self) -> &'static str {
        match self {
            FileKind::Image => "Only image files are allowed!",
            FileKind::Document => "Only PDF, DOC, and DOCX files are allowed for resume!",
        }
    }
}

/// A multipart field that may carry a file, and where that file goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadField {
    pub name: &'static str,
    pub folder: &'static str,
    pub kind: FileKind,
}

pub const THUMBNAIL: UploadField = UploadField {
    name: "thumbnail",
    folder: "projects",
    kind: FileKind::Image,
};

pub const PROFILE_IMAGE: UploadField = UploadField {
    name: "profileImage",
    folder: "profiles",
    kind: FileKind::Image,
};

pub const COVER_IMAGE: UploadField = UploadField {
    name: "coverImage",
    folder: "profiles",
    kind: FileKind::Image,
};

pub const RESUME: UploadField = UploadField {
    name: "resume",
    folder: "resumes",
    kind: FileKind::Document,
};

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("{message}")]
    InvalidFileType { field: String, message: String },

    #[error("File too large: '{field}' accepts at most {max_mb}MB")]
    FileTooLarge { field: String, max_mb: usize },

    #[error("Unexpected file field '{0}'")]
    UnexpectedField(String),

    #[error("Malformed multipart body: {0}")]
    Multipart(String),

    #[error("Invalid JSON in field '{field}': {source}")]
    InvalidJsonField {
        field: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// A file part read from the request body.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field: UploadField,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
    }

    /// Checks extension and declared MIME type against the field's kind.
    pub fn validate(&self) -> Result<(), UploadError> {
        let kind = self.field.kind;
        let ext_ok = self
            .extension()
            .map_or(false, |ext| kind.extensions().contains(&ext.as_str()));
        let mime = self.content_type.to_ascii_lowercase();
        let mime_ok = mime.is_empty() || mime == "application/octet-stream" || kind.accepts_mime(&mime);

        if !(ext_ok && mime_ok) {
            return Err(UploadError::InvalidFileType {
                field: self.field.name.to_string(),
                message: kind.rejection().to_string(),
            });
        }
        if self.bytes.len() > kind.max_bytes() {
            return Err(too_large(&self.field));
        }
        Ok(())
    }

    pub fn object_key(&self) -> String {
        object_key(&self.field, &self.file_name)
    }
}

pub(crate) fn too_large(field: &UploadField) -> UploadError {
    UploadError::FileTooLarge {
        field: field.name.to_string(),
        max_mb: field.kind.max_bytes() / MB,
    }
}

/// `{folder}/{millis}-{random}-{sanitized-basename}{.ext}`
pub fn object_key(field: &UploadField, file_name: &str) -> String {
    let path = Path::new(file_name);
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default();
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("file");
    let disambiguator: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|c| char::from(c).to_ascii_lowercase())
        .collect();

    format!(
        "{}/{}-{}-{}{}",
        field.folder,
        Utc::now().timestamp_millis(),
        disambiguator,
        sanitize_basename(stem),
        ext
    )
}

fn sanitize_basename(stem: &str) -> String {
    let cleaned: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

/// A file that reached the object store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    pub field: &'static str,
    pub url: String,
}

/// Writes every file, or none: when any write fails the ones that succeeded
/// are removed again and the first error is returned.
pub async fn store_all(
    objects: &dyn ObjectStore,
    files: Vec<UploadedFile>,
) -> Result<Vec<StoredUpload>, UploadError> {
    let writes = files.into_iter().map(|file| async move {
        let key = file.object_key();
        let url = objects.put(&key, file.bytes, &file.content_type).await?;
        debug!(field = file.field.name, url = %url, "Stored upload");
        Ok::<_, StorageError>(StoredUpload {
            field: file.field.name,
            url,
        })
    });

    let mut stored = Vec::new();
    let mut failure = None;
    for result in join_all(writes).await {
        match result {
            Ok(upload) => stored.push(upload),
            Err(e) if failure.is_none() => failure = Some(e),
            Err(e) => warn!(error = %e, "Additional upload failure"),
        }
    }

    match failure {
        None => Ok(stored),
        Some(e) => {
            reclaim(objects, stored.into_iter().map(|s| s.url)).await;
            Err(UploadError::Storage(e))
        }
    }
}

/// Best-effort removal of blobs no record points at any more.
pub async fn reclaim<I>(objects: &dyn ObjectStore, urls: I)
where
    I: IntoIterator<Item = String>,
{
    for url in urls.into_iter().filter(|u| !u.is_empty()) {
        if !objects.owns(&url) {
            debug!(url = %url, "Skipping external link");
            continue;
        }
        match objects.delete(&url).await {
            Ok(()) => debug!(url = %url, "Reclaimed superseded upload"),
            Err(StorageError::NotFound(_)) => debug!(url = %url, "Superseded upload already gone"),
            Err(e) => warn!(url = %url, error = %e, "Failed to reclaim upload"),
        }
    }
}

/// Returns the URL stored for `field`, if a file was uploaded under it.
pub fn url_for<'a>(stored: &'a [StoredUpload], field: &UploadField) -> Option<&'a str> {
    stored
        .iter()
        .find(|s| s.field == field.name)
        .map(|s| s.url.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryObjectStore;

    fn file(field: UploadField, name: &str, mime: &str, size: usize) -> UploadedFile {
        UploadedFile {
            field,
            file_name: name.to_string(),
            content_type: mime.to_string(),
            bytes: vec![0; size],
        }
    }

    #[test]
    fn key_embeds_folder_and_sanitized_name() {
        let key = object_key(&PROFILE_IMAGE, "My Photo (1).PNG");
        assert!(key.starts_with("profiles/"), "{key}");
        assert!(key.ends_with("-my-photo--1-.png"), "{key}");
        let parts: Vec<_> = key["profiles/".len()..].splitn(3, '-').collect();
        assert!(parts[0].parse::<i64>().is_ok());
        assert_eq!(parts[1].len(), 6);
    }

    #[test]
    fn image_policy() {
        assert!(file(THUMBNAIL, "a.webp", "image/webp", 10).validate().is_ok());
        assert!(file(THUMBNAIL, "a.exe", "image/png", 10).validate().is_err());
        assert!(file(THUMBNAIL, "a.png", "video/mp4", 10).validate().is_err());

        let at_limit = file(THUMBNAIL, "a.png", "image/png", 5 * MB);
        assert!(at_limit.validate().is_ok());
        let over = file(THUMBNAIL, "a.png", "image/png", 5 * MB + 1);
        assert!(matches!(over.validate(), Err(UploadError::FileTooLarge { .. })));
    }

    #[test]
    fn resume_accepts_documents_only() {
        assert!(file(RESUME, "cv.pdf", "application/pdf", 10).validate().is_ok());
        assert!(file(RESUME, "cv.docx", "", 6 * MB).validate().is_ok());
        let err = file(RESUME, "cv.png", "image/png", 10).validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Only PDF, DOC, and DOCX files are allowed for resume!"
        );
    }

    #[tokio::test]
    async fn stores_every_file() {
        let objects = MemoryObjectStore::new("/uploads");
        let stored = store_all(
            &objects,
            vec![
                file(PROFILE_IMAGE, "me.jpg", "image/jpeg", 3),
                file(RESUME, "cv.pdf", "application/pdf", 3),
            ],
        )
        .await
        .unwrap();

        assert_eq!(objects.len().await, 2);
        let resume = url_for(&stored, &RESUME).unwrap();
        assert!(resume.starts_with("/uploads/resumes/"));
        assert!(url_for(&stored, &COVER_IMAGE).is_none());
    }

    #[tokio::test]
    async fn reclaim_tolerates_missing_blobs() {
        let objects = MemoryObjectStore::new("/uploads");
        reclaim(&objects, vec!["/uploads/projects/gone.png".to_string(), String::new()]).await;
    }

    #[tokio::test]
    async fn reclaim_leaves_external_links() {
        let objects = MemoryObjectStore::new("/uploads");
        objects.put("projects/a.png", vec![1], "image/png").await.unwrap();
        reclaim(
            &objects,
            vec![
                "https://images.example.com/projects/a.png".to_string(),
                "projects/a.png".to_string(),
            ],
        )
        .await;
        assert!(objects.contains("projects/a.png").await);

        reclaim(&objects, vec!["/uploads/projects/a.png".to_string()]).await;
        assert!(objects.is_empty().await);
    }
}
