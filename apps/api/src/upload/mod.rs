//! Uploaded file → plain résumé text.
//!
//! PDFs go through `pdf-extract` on the blocking pool; plain-text files are decoded
//! as UTF-8. Anything else (DOCX, images) is rejected. A PDF that yields almost no
//! text is almost always a scanned image, which the extraction model cannot read.

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, warn};

/// Below this many characters the upload is treated as a scan or an empty file.
pub const MIN_TEXT_CHARS: usize = 100;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("unsupported file type '{0}'; upload a PDF or a text file")]
    UnsupportedFileType(String),

    #[error("the uploaded file is empty")]
    Empty,

    #[error("could not read PDF: {0}")]
    Pdf(String),

    #[error("text file is not valid UTF-8")]
    InvalidEncoding,

    #[error("only {chars} characters of text found; the PDF looks like a scanned image")]
    TooShort { chars: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    PlainText,
}

/// Classifies an upload by content type, then file extension, then PDF magic bytes.
pub fn detect_kind(
    file_name: Option<&str>,
    content_type: Option<&str>,
    data: &[u8],
) -> Result<FileKind, UploadError> {
    let extension = file_name
        .and_then(|n| n.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase());

    match (content_type, extension.as_deref()) {
        (Some("application/pdf"), _) | (_, Some("pdf")) => Ok(FileKind::Pdf),
        (Some(ct), _) if ct.starts_with("text/plain") => Ok(FileKind::PlainText),
        (_, Some("txt" | "md")) => Ok(FileKind::PlainText),
        _ if data.starts_with(b"%PDF-") => Ok(FileKind::Pdf),
        _ => Err(UploadError::UnsupportedFileType(
            content_type
                .map(str::to_string)
                .or_else(|| extension.clone())
                .unwrap_or_else(|| "unknown".to_string()),
        )),
    }
}

/// Extracts text from an uploaded file. CPU-bound PDF parsing runs on the blocking pool.
pub async fn extract_text(
    file_name: Option<&str>,
    content_type: Option<&str>,
    data: Bytes,
) -> Result<String, UploadError> {
    if data.is_empty() {
        return Err(UploadError::Empty);
    }
    let kind = detect_kind(file_name, content_type, &data)?;
    debug!(?kind, bytes = data.len(), "extracting upload text");

    let text = match kind {
        FileKind::PlainText => String::from_utf8(data.to_vec()).map_err(|_| UploadError::InvalidEncoding)?,
        FileKind::Pdf => tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&data))
            .await
            .map_err(|e| UploadError::Pdf(e.to_string()))?
            .map_err(|e| UploadError::Pdf(e.to_string()))?,
    };

    let text = normalize(&text);
    let chars = text.chars().count();
    if chars < MIN_TEXT_CHARS {
        warn!(chars, "upload yielded too little text");
        return Err(UploadError::TooShort { chars });
    }
    Ok(text)
}

/// Trims every line and collapses runs of blank lines left by PDF extraction.
fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut blank_run = 0;
    for line in raw.lines().map(str::trim) {
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }
    out.trim().to_string()
}
