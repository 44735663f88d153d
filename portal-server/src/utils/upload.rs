//! Image upload helpers
//!
//! Multipart form collection plus validated image persistence. Uploaded
//! images land under `<work_dir>/uploads/<category>/` and the stored
//! reference is the public `/uploads/...` path; raw bytes never reach the
//! database.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use axum::extract::Multipart;
use rand::Rng;

use crate::utils::AppError;

/// Maximum upload size (2MB)
pub const MAX_UPLOAD_SIZE: usize = 2 * 1024 * 1024;

/// Supported image formats
const SUPPORTED_FORMATS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Upload categories, one directory per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Profile,
    Qr,
    Payment,
}

impl UploadKind {
    pub fn subdir(&self) -> &'static str {
        match self {
            UploadKind::Profile => "profiles",
            UploadKind::Qr => "qr",
            UploadKind::Payment => "payments",
        }
    }

    /// Parse a public path segment back into a kind (for serving).
    pub fn from_subdir(subdir: &str) -> Option<Self> {
        match subdir {
            "profiles" => Some(UploadKind::Profile),
            "qr" => Some(UploadKind::Qr),
            "payments" => Some(UploadKind::Payment),
            _ => None,
        }
    }
}

/// A file field pulled out of a multipart form.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub field: String,
    pub filename: String,
    pub data: Vec<u8>,
}

/// Text fields + at most one file field from a multipart request.
#[derive(Debug, Default)]
pub struct MultipartForm {
    pub fields: HashMap<String, String>,
    pub file: Option<UploadedImage>,
}

impl MultipartForm {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|s| s.as_str())
    }

    pub fn require(&self, name: &str) -> Result<&str, AppError> {
        self.get(name)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| AppError::validation(format!("{name} is required")))
    }
}

/// Drain a multipart request into text fields and (at most) one file.
pub async fn collect_form(mut multipart: Multipart) -> Result<MultipartForm, AppError> {
    let mut form = MultipartForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if let Some(filename) = field.file_name().map(|s| s.to_string()) {
            let data = field.bytes().await?.to_vec();
            form.file = Some(UploadedImage {
                field: name,
                filename,
                data,
            });
        } else {
            let value = field.text().await?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

/// Validate and persist an uploaded image; returns the public reference path.
pub fn save_image(
    work_dir: &Path,
    kind: UploadKind,
    upload: &UploadedImage,
) -> Result<String, AppError> {
    if upload.data.is_empty() {
        return Err(AppError::validation("Empty file provided"));
    }
    if upload.data.len() > MAX_UPLOAD_SIZE {
        return Err(AppError::validation(format!(
            "File too large. Maximum size is {}MB",
            MAX_UPLOAD_SIZE / 1024 / 1024
        )));
    }

    let ext = PathBuf::from(&upload.filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .ok_or_else(|| {
            AppError::validation(format!("Invalid file extension for: {}", upload.filename))
        })?;

    if !SUPPORTED_FORMATS.contains(&ext.as_str()) {
        return Err(AppError::validation(format!(
            "Unsupported file format '{}'. Supported: {}",
            ext,
            SUPPORTED_FORMATS.join(", ")
        )));
    }

    // Verify it's actually an image by decoding it
    if let Err(e) = image::load_from_memory(&upload.data) {
        return Err(AppError::validation(format!(
            "Invalid image file ({}): {}",
            ext, e
        )));
    }

    let dir = work_dir.join("uploads").join(kind.subdir());
    fs::create_dir_all(&dir)
        .map_err(|e| AppError::internal(format!("Failed to create upload directory: {}", e)))?;

    let unique = format!(
        "{}-{}",
        shared::util::now_millis(),
        rand::thread_rng().gen_range(0..1_000_000_000u64)
    );
    let stored_name = format!("{unique}.{ext}");
    let file_path = dir.join(&stored_name);

    fs::write(&file_path, &upload.data)
        .map_err(|e| AppError::internal(format!("Failed to save file: {}", e)))?;

    tracing::info!(
        original_name = %upload.filename,
        stored = %stored_name,
        size = upload.data.len(),
        "Image uploaded"
    );

    Ok(format!("/uploads/{}/{}", kind.subdir(), stored_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbImage::new(2, 2);
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    fn upload(filename: &str, data: Vec<u8>) -> UploadedImage {
        UploadedImage {
            field: "file".into(),
            filename: filename.into(),
            data,
        }
    }

    #[test]
    fn test_save_image_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_image(dir.path(), UploadKind::Profile, &upload("me.png", png_bytes()))
            .unwrap();
        assert!(path.starts_with("/uploads/profiles/"));
        assert!(path.ends_with(".png"));

        // The stored file exists under the work dir
        let on_disk = dir.path().join(path.trim_start_matches('/'));
        assert!(on_disk.exists());
    }

    #[test]
    fn test_save_image_rejects_non_image() {
        let dir = tempfile::tempdir().unwrap();
        let err = save_image(
            dir.path(),
            UploadKind::Payment,
            &upload("fake.png", b"not an image".to_vec()),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_save_image_rejects_bad_extension() {
        let dir = tempfile::tempdir().unwrap();
        let err = save_image(dir.path(), UploadKind::Qr, &upload("qr.gif", png_bytes()))
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_save_image_rejects_oversize() {
        let dir = tempfile::tempdir().unwrap();
        let mut data = png_bytes();
        data.resize(MAX_UPLOAD_SIZE + 1, 0);
        let err = save_image(dir.path(), UploadKind::Profile, &upload("big.png", data))
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
