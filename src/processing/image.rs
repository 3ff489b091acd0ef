use std::io::Write;
use std::path::Path;

use base64::Engine as _;
use image::ImageFormat;
use log::{debug, warn};
use tempfile::NamedTempFile;

use crate::config::UploadConfig;
use crate::utils::ExtractionError;

/// An uploaded image as received from the caller.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        ImageUpload {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ExtractionError> {
        let bytes = std::fs::read(path).map_err(|e| {
            ExtractionError::InvalidUpload(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
            .to_string();
        Ok(Self::new(file_name, bytes))
    }

    pub fn from_base64(file_name: impl Into<String>, encoded: &str) -> Result<Self, ExtractionError> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| ExtractionError::InvalidUpload(format!("Invalid base64 payload: {}", e)))?;
        Ok(Self::new(file_name, bytes))
    }

    /// Reads a base64 payload from a text file. Without an explicit name the
    /// file name minus its last extension is used, so `card.png.b64` becomes
    /// `card.png`.
    pub fn from_base64_path(path: &Path, file_name: Option<&str>) -> Result<Self, ExtractionError> {
        let encoded = std::fs::read_to_string(path).map_err(|e| {
            ExtractionError::InvalidUpload(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let file_name = match file_name {
            Some(name) => name.to_string(),
            None => path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or_default()
                .to_string(),
        };
        Self::from_base64(file_name, &encoded)
    }

    /// Lowercased extension after the last dot, if any.
    pub fn extension(&self) -> Option<String> {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .filter(|ext| !ext.is_empty())
    }
}

pub struct ImageProcessor;

impl ImageProcessor {
    /// Checks the upload against the allow-list and size limit. Returns the
    /// accepted extension.
    pub fn validate(upload: &ImageUpload, config: &UploadConfig) -> Result<String, ExtractionError> {
        if upload.file_name.trim().is_empty() {
            return Err(ExtractionError::InvalidUpload("No file selected".to_string()));
        }
        if upload.bytes.is_empty() {
            return Err(ExtractionError::InvalidUpload(format!("{} is empty", upload.file_name)));
        }
        if upload.bytes.len() as u64 > config.max_bytes {
            return Err(ExtractionError::InvalidUpload(format!(
                "{} is {} bytes, limit is {}",
                upload.file_name,
                upload.bytes.len(),
                config.max_bytes
            )));
        }

        let extension = upload
            .extension()
            .filter(|ext| config.allowed_extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)))
            .ok_or_else(|| {
                ExtractionError::UnsupportedFormat(format!(
                    "Invalid file type for {}. Allowed types: {}",
                    upload.file_name,
                    config.allowed_extensions.join(", ")
                ))
            })?;

        // The extension decides; a disagreeing payload is only reported
        match (ImageFormat::from_extension(&extension), image::guess_format(&upload.bytes)) {
            (Some(declared), Ok(sniffed)) if declared != sniffed => {
                warn!("{} declares {:?} but looks like {:?}", upload.file_name, declared, sniffed);
            }
            (_, Err(e)) => debug!("Could not sniff format of {}: {}", upload.file_name, e),
            _ => {}
        }

        Ok(extension)
    }

    /// Writes the upload to a temporary file that is removed when dropped.
    pub fn stage(upload: &ImageUpload, extension: &str, config: &UploadConfig) -> Result<NamedTempFile, ExtractionError> {
        let suffix = format!(".{}", extension);
        let mut builder = tempfile::Builder::new();
        builder.prefix("idscan-").suffix(&suffix);
        let mut temp_file = match &config.staging_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(|e| ExtractionError::Io(format!("Failed to create temp file: {}", e)))?;

        temp_file
            .write_all(&upload.bytes)
            .map_err(|e| ExtractionError::Io(format!("Failed to write to temp file: {}", e)))?;
        temp_file
            .flush()
            .map_err(|e| ExtractionError::Io(format!("Failed to flush temp file: {}", e)))?;

        debug!("Staged {} at {}", upload.file_name, temp_file.path().display());
        Ok(temp_file)
    }
}
