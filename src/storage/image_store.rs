// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! On-disk storage for uploaded and processed images
//!
//! Two flat directories are managed: one for the images clients send us and
//! one for the annotated copies produced by the detector. Every save creates a
//! new file under a UUID-based name, so concurrent requests never share a path.
//! Nothing is ever deleted from here.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use image::ImageFormat;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

/// Errors raised by [`ImageStore`]
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Unsupported image extension: {0}")]
    UnsupportedExtension(String),

    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Which of the two storage directories an image lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Folder {
    Uploads,
    Processed,
}

impl Folder {
    /// Path segment used in public URLs (`/api/uploads/...`)
    pub fn url_segment(&self) -> &'static str {
        match self {
            Folder::Uploads => "uploads",
            Folder::Processed => "processed",
        }
    }
}

impl fmt::Display for Folder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url_segment())
    }
}

/// File extensions accepted for upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageExtension {
    Png,
    Jpg,
    Jpeg,
}

impl ImageExtension {
    pub const ALL: [ImageExtension; 3] = [Self::Png, Self::Jpg, Self::Jpeg];

    /// Parse the extension of a client-supplied filename.
    ///
    /// Only the text after the last `.` counts, compared case-insensitively.
    /// A name without a dot has no extension.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;
        Self::parse(ext)
    }

    pub fn parse(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" => Some(Self::Jpg),
            "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::Jpeg => "jpeg",
        }
    }

    /// Encoder format for files carrying this extension
    pub fn image_format(&self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpg | Self::Jpeg => ImageFormat::Jpeg,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpg | Self::Jpeg => "image/jpeg",
        }
    }
}

impl fmt::Display for ImageExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An image that has been written to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// File name inside its folder, extension included
    pub id: String,
    pub folder: Folder,
    pub extension: ImageExtension,
    pub path: PathBuf,
}

impl StoredImage {
    /// Relative URL under which the image is served
    pub fn url(&self) -> String {
        ImageStore::url_for(self.folder, &self.id)
    }
}

/// Flat-directory image storage
#[derive(Debug, Clone)]
pub struct ImageStore {
    uploads_dir: PathBuf,
    processed_dir: PathBuf,
}

impl ImageStore {
    /// Open the store, creating both directories if they are missing
    pub async fn open(
        uploads_dir: impl Into<PathBuf>,
        processed_dir: impl Into<PathBuf>,
    ) -> Result<Self, StorageError> {
        let store = Self {
            uploads_dir: uploads_dir.into(),
            processed_dir: processed_dir.into(),
        };

        for dir in [&store.uploads_dir, &store.processed_dir] {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| StorageError::CreateDir {
                    path: dir.clone(),
                    source,
                })?;
        }

        info!(
            "Image store ready (uploads: {}, processed: {})",
            store.uploads_dir.display(),
            store.processed_dir.display()
        );

        Ok(store)
    }

    pub fn dir(&self, folder: Folder) -> &Path {
        match folder {
            Folder::Uploads => &self.uploads_dir,
            Folder::Processed => &self.processed_dir,
        }
    }

    /// Generate a fresh file name: `{prefix}{uuid}.{ext}`
    pub fn generate_id(prefix: &str, extension: ImageExtension) -> String {
        format!("{}{}.{}", prefix, Uuid::new_v4(), extension)
    }

    /// Write `bytes` under a newly generated name and return the stored image
    pub async fn save(
        &self,
        folder: Folder,
        bytes: &[u8],
        prefix: &str,
        extension: ImageExtension,
    ) -> Result<StoredImage, StorageError> {
        let id = Self::generate_id(prefix, extension);
        self.write(folder, id, extension, bytes).await
    }

    /// Write `bytes` under a fresh name that keeps the extension of
    /// `client_filename` exactly as the client spelled it
    /// (`Bottle.PNG` is stored as `<uuid>.PNG`).
    pub async fn save_upload(
        &self,
        folder: Folder,
        bytes: &[u8],
        client_filename: &str,
    ) -> Result<StoredImage, StorageError> {
        let (_, ext_text) = client_filename
            .rsplit_once('.')
            .ok_or_else(|| StorageError::UnsupportedExtension(client_filename.to_string()))?;
        let extension = ImageExtension::parse(ext_text)
            .ok_or_else(|| StorageError::UnsupportedExtension(client_filename.to_string()))?;

        let id = format!("{}.{}", Uuid::new_v4(), ext_text);
        self.write(folder, id, extension, bytes).await
    }

    /// Write `bytes` under a caller-chosen name.
    ///
    /// Used for processed images, whose name is derived from the original's.
    pub async fn save_as(
        &self,
        folder: Folder,
        id: &str,
        bytes: &[u8],
    ) -> Result<StoredImage, StorageError> {
        if !is_plain_file_name(id) {
            return Err(StorageError::NotFound(id.to_string()));
        }
        let extension = ImageExtension::from_filename(id)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        self.write(folder, id.to_string(), extension, bytes).await
    }

    /// Pure mapping from id to path; does not touch the filesystem
    pub fn path_for(&self, folder: Folder, id: &str) -> PathBuf {
        self.dir(folder).join(id)
    }

    /// Read a stored file back.
    ///
    /// Anything that is not a plain file name (separators, `..`, empty) is
    /// reported as missing rather than resolved.
    pub async fn serve(&self, folder: Folder, id: &str) -> Result<Vec<u8>, StorageError> {
        if !is_plain_file_name(id) {
            return Err(StorageError::NotFound(id.to_string()));
        }

        let path = self.path_for(folder, id);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound(id.to_string()))
            }
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    pub fn url_for(folder: Folder, id: &str) -> String {
        format!("/api/{}/{}", folder.url_segment(), id)
    }

    async fn write(
        &self,
        folder: Folder,
        id: String,
        extension: ImageExtension,
        bytes: &[u8],
    ) -> Result<StoredImage, StorageError> {
        let path = self.path_for(folder, &id);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| StorageError::Io {
                path: path.clone(),
                source,
            })?;

        debug!("Saved {} bytes to {}", bytes.len(), path.display());

        Ok(StoredImage {
            id,
            folder,
            extension,
            path,
        })
    }
}

fn is_plain_file_name(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && id != ".."
        && !id.contains('/')
        && !id.contains('\\')
        && !id.contains('\0')
}
