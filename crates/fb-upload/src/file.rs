// file.rs — FileHandle: a file picked for upload.

use std::fs;
use std::path::Path;

use crate::error::UploadError;

pub const CSV_CONTENT_TYPE: &str = "text/csv";
const OCTET_STREAM: &str = "application/octet-stream";

/// A selected file: name, declared content type, and contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    pub name: String,
    pub content_type: String,
    pub contents: Vec<u8>,
}

impl FileHandle {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, contents: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            contents,
        }
    }

    /// Read a file from disk. The content type is `content_type` if given,
    /// otherwise guessed from the extension.
    pub fn from_path(path: &Path, content_type: Option<&str>) -> Result<Self, UploadError> {
        let contents = fs::read(path).map_err(|source| UploadError::IoError {
            path: path.display().to_string(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let content_type = content_type
            .map(str::to_string)
            .unwrap_or_else(|| guess_content_type(&name).to_string());
        Ok(Self::new(name, content_type, contents))
    }

    pub fn size(&self) -> u64 {
        self.contents.len() as u64
    }

    /// Only the declared content type counts; contents are never inspected.
    pub fn is_csv(&self) -> bool {
        self.content_type.eq_ignore_ascii_case(CSV_CONTENT_TYPE)
    }
}

fn guess_content_type(name: &str) -> &'static str {
    let is_csv = Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        CSV_CONTENT_TYPE
    } else {
        OCTET_STREAM
    }
}
