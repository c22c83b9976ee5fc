//! Byte sources feeding the sniffer and the decoder.
//!
//! A [`ByteSource`] pairs a declared filename with an asynchronous read of
//! the full content. Reads may fail (the platform could not read the file);
//! that failure surfaces unchanged as [`IngestError::FileRead`](super::IngestError::FileRead).

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Asynchronous access to an uploaded file's bytes.
pub trait ByteSource: Sync {
    /// Filename the user supplied. Used only for the GIF extension rule and
    /// for messages; never trusted for format detection beyond that.
    fn filename(&self) -> &str;

    /// Read the entire content.
    fn read_bytes(&self) -> impl Future<Output = io::Result<Arc<[u8]>>> + Send;
}

/// An in-memory upload: bytes, filename and the MIME type the host declared.
///
/// The declared MIME type is informational only; classification and decoding
/// re-derive the format from content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBytes {
    pub data: Arc<[u8]>,
    pub filename: String,
    pub declared_mime: Option<String>,
}

impl SourceBytes {
    pub fn new(data: impl Into<Arc<[u8]>>, filename: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            filename: filename.into(),
            declared_mime: None,
        }
    }

    pub fn with_declared_mime(mut self, mime: impl Into<String>) -> Self {
        self.declared_mime = Some(mime.into());
        self
    }
}

impl ByteSource for SourceBytes {
    fn filename(&self) -> &str {
        &self.filename
    }

    async fn read_bytes(&self) -> io::Result<Arc<[u8]>> {
        Ok(Arc::clone(&self.data))
    }
}

/// A file on disk, read lazily when the pipeline asks for it.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    filename: String,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, filename }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteSource for FileSource {
    fn filename(&self) -> &str {
        &self.filename
    }

    async fn read_bytes(&self) -> io::Result<Arc<[u8]>> {
        let data = tokio::fs::read(&self.path).await?;
        Ok(data.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn source_bytes_reads_its_buffer() {
        let source = SourceBytes::new(vec![1u8, 2, 3], "icon.png").with_declared_mime("image/png");
        assert_eq!(source.filename(), "icon.png");
        assert_eq!(&*source.read_bytes().await.unwrap(), &[1, 2, 3]);
        assert_eq!(source.declared_mime.as_deref(), Some("image/png"));
    }

    #[tokio::test]
    async fn file_source_reads_from_disk() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("logo.webp");
        std::fs::write(&path, b"RIFF").unwrap();

        let source = FileSource::new(&path);
        assert_eq!(source.filename(), "logo.webp");
        assert_eq!(&*source.read_bytes().await.unwrap(), b"RIFF");
    }

    #[tokio::test]
    async fn file_source_missing_file_errors() {
        let source = FileSource::new("/nonexistent/icon.png");
        let err = source.read_bytes().await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
