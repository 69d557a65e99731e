//! Multipart intake
//!
//! The `file` part is spooled to a temp file that is deleted when the
//! `UploadForm` is dropped.

use std::path::Path;

use axum::extract::Multipart;
use tempfile::NamedTempFile;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::debug;

use super::error::ApiError;
use crate::config::parse_flag;
use crate::smb::TRANSFER_CHUNK_SIZE;

/// Uploaded file spooled to local disk
#[derive(Debug)]
pub struct StagedFile {
    temp: NamedTempFile,
    pub file_name: Option<String>,
    pub size: u64,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        self.temp.path()
    }
}

#[derive(Debug)]
pub struct UploadForm {
    pub file: StagedFile,
    pub remote_path: String,
    pub overwrite: bool,
}

impl UploadForm {
    /// Destination path as sent, falling back to the uploaded file name when
    /// it is empty after stripping leading slashes.
    pub fn requested_path(&self) -> Result<&str, ApiError> {
        let trimmed = self.remote_path.trim_start_matches('/');
        if !trimmed.is_empty() {
            return Ok(trimmed);
        }
        self.file
            .file_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| {
                ApiError::BadRequest("remote_path is empty and the file has no name".to_string())
            })
    }
}

async fn stage_field(mut field: axum::extract::multipart::Field<'_>) -> Result<StagedFile, ApiError> {
    let file_name = field.file_name().map(str::to_string);
    let temp = NamedTempFile::new()?;
    let mut out = BufWriter::with_capacity(
        TRANSFER_CHUNK_SIZE,
        tokio::fs::File::from_std(temp.reopen()?),
    );

    let mut size = 0u64;
    while let Some(chunk) = field.chunk().await? {
        out.write_all(&chunk).await?;
        size += chunk.len() as u64;
    }
    out.flush().await?;

    debug!(
        "Staged upload {:?} ({} bytes) at {}",
        file_name,
        size,
        temp.path().display()
    );
    Ok(StagedFile {
        temp,
        file_name,
        size,
    })
}

/// Read `file`, `remote_path` and `overwrite` from the request.
pub async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut file = None;
    let mut remote_path = None;
    let mut overwrite = false;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => file = Some(stage_field(field).await?),
            "remote_path" => remote_path = Some(field.text().await?),
            "overwrite" => {
                let text = field.text().await?;
                overwrite = parse_flag(&text).unwrap_or(false);
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| ApiError::BadRequest("Missing form field: file".to_string()))?;
    let remote_path = remote_path
        .ok_or_else(|| ApiError::BadRequest("Missing form field: remote_path".to_string()))?;

    Ok(UploadForm {
        file,
        remote_path,
        overwrite,
    })
}
