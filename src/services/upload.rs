use anyhow::Context;
use regex::Regex;
use std::path::PathBuf;
use std::sync::OnceLock;
use thiserror::Error;
use tokio::fs;
use tracing::info;

use crate::config::UploadConfig;

/// Public prefix under which stored profile images are addressable.
pub const UPLOADS_PREFIX: &str = "uploads";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("no file was supplied")]
    MissingFile,

    #[error("file extension is not an allowed image type")]
    InvalidExtension,

    #[error("file name contains no usable characters")]
    UnsafeFilename,

    #[error(transparent)]
    Io(#[from] anyhow::Error),
}

/// A file part lifted out of a multipart request body.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

pub struct UploadService {
    config: UploadConfig,
}

impl UploadService {
    #[must_use]
    pub const fn new(config: UploadConfig) -> Self {
        Self { config }
    }

    /// Whether the supplied file name carries an allowed image extension.
    /// The check runs on the name as sent by the client, before any
    /// sanitization.
    #[must_use]
    pub fn is_allowed(&self, file_name: &str) -> bool {
        file_name
            .rsplit_once('.')
            .is_some_and(|(_, ext)| self.has_allowed_extension(&ext.to_lowercase()))
    }

    fn has_allowed_extension(&self, extension: &str) -> bool {
        self.config
            .allowed_extensions
            .iter()
            .any(|allowed| allowed == extension)
    }

    /// Validate an uploaded file and write it into the upload directory.
    ///
    /// Returns the storage reference (`uploads/<sanitized name>`) that goes
    /// into the user record. Writing a name that already exists replaces the
    /// previous file.
    pub async fn validate_and_store(
        &self,
        file: Option<&UploadedFile>,
    ) -> Result<String, UploadError> {
        let file = file.ok_or(UploadError::MissingFile)?;

        let extension = file
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .ok_or(UploadError::InvalidExtension)?;
        if !self.has_allowed_extension(&extension) {
            return Err(UploadError::InvalidExtension);
        }

        let sanitized = sanitize_filename(&file.file_name).ok_or(UploadError::UnsafeFilename)?;

        let uploads_dir = PathBuf::from(&self.config.uploads_path);
        if !uploads_dir.exists() {
            fs::create_dir_all(&uploads_dir)
                .await
                .with_context(|| {
                    format!("Failed to create upload directory {}", uploads_dir.display())
                })?;
        }

        let file_path = uploads_dir.join(&sanitized);

        info!(path = %file_path.display(), size = file.bytes.len(), "Storing uploaded image");

        fs::write(&file_path, &file.bytes)
            .await
            .with_context(|| format!("Failed to write upload to {}", file_path.display()))?;

        Ok(format!("{UPLOADS_PREFIX}/{sanitized}"))
    }
}

/// Reduce a client-supplied file name to a safe flat name.
///
/// Keeps only the final path component, joins whitespace runs with `_`,
/// drops everything outside `[A-Za-z0-9_.-]`, and trims stray dots and
/// underscores from the ends. Returns `None` when nothing usable is left.
#[must_use]
pub fn sanitize_filename(name: &str) -> Option<String> {
    static STRIP: OnceLock<Regex> = OnceLock::new();
    let strip = STRIP.get_or_init(|| {
        Regex::new(r"[^A-Za-z0-9_.-]").expect("Invalid regex pattern defined in code")
    });

    let normalized = name.replace('\\', "/");
    let base = normalized.rsplit('/').next().unwrap_or("");

    let joined = base.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = strip.replace_all(&joined, "");
    let trimmed = cleaned.trim_matches(['.', '_']);

    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UploadConfig;

    fn service_with_dir(dir: &std::path::Path) -> UploadService {
        UploadService::new(UploadConfig {
            uploads_path: dir.to_string_lossy().into_owned(),
            ..UploadConfig::default()
        })
    }

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("registrarr_uploads_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn extension_policy() {
        let service = UploadService::new(UploadConfig::default());

        assert!(service.is_allowed("photo.png"));
        assert!(service.is_allowed("photo.JPG"));
        assert!(service.is_allowed("archive.tar.gif"));
        assert!(!service.is_allowed("photo"));
        assert!(!service.is_allowed("virus.exe"));
        assert!(!service.is_allowed(""));
    }

    #[test]
    fn sanitize_keeps_simple_names() {
        assert_eq!(sanitize_filename("photo.png").as_deref(), Some("photo.png"));
        assert_eq!(
            sanitize_filename("IMG_2024-01-01.jpeg").as_deref(),
            Some("IMG_2024-01-01.jpeg")
        );
    }

    #[test]
    fn sanitize_strips_directories() {
        assert_eq!(
            sanitize_filename("../../etc/passwd").as_deref(),
            Some("passwd")
        );
        assert_eq!(
            sanitize_filename("C:\\Users\\me\\photo.png").as_deref(),
            Some("photo.png")
        );
    }

    #[test]
    fn sanitize_replaces_whitespace_and_odd_characters() {
        assert_eq!(
            sanitize_filename("my holiday photo.png").as_deref(),
            Some("my_holiday_photo.png")
        );
        assert_eq!(
            sanitize_filename("na\u{ef}ve fu\u{df}ball.jpg").as_deref(),
            Some("nave_fuball.jpg")
        );
        assert_eq!(sanitize_filename("..hidden.png").as_deref(), Some("hidden.png"));
    }

    #[test]
    fn sanitize_rejects_names_with_nothing_left() {
        assert_eq!(sanitize_filename(""), None);
        assert_eq!(sanitize_filename("???"), None);
        assert_eq!(sanitize_filename("._."), None);
        assert_eq!(sanitize_filename("uploads/"), None);
    }

    #[tokio::test]
    async fn store_writes_file_and_returns_reference() {
        let dir = temp_dir();
        let service = service_with_dir(&dir);

        let file = UploadedFile {
            file_name: "photo.png".to_string(),
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
        };

        let reference = service.validate_and_store(Some(&file)).await.unwrap();
        assert_eq!(reference, "uploads/photo.png");

        let on_disk = std::fs::read(dir.join("photo.png")).unwrap();
        assert_eq!(on_disk, file.bytes);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn store_overwrites_existing_name() {
        let dir = temp_dir();
        let service = service_with_dir(&dir);

        let first = UploadedFile {
            file_name: "avatar.png".to_string(),
            bytes: b"old".to_vec(),
        };
        let second = UploadedFile {
            file_name: "avatar.png".to_string(),
            bytes: b"new".to_vec(),
        };

        service.validate_and_store(Some(&first)).await.unwrap();
        service.validate_and_store(Some(&second)).await.unwrap();

        let on_disk = std::fs::read(dir.join("avatar.png")).unwrap();
        assert_eq!(on_disk, b"new");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn store_rejects_missing_and_invalid_files() {
        let dir = temp_dir();
        let service = service_with_dir(&dir);

        assert!(matches!(
            service.validate_and_store(None).await,
            Err(UploadError::MissingFile)
        ));

        let no_extension = UploadedFile {
            file_name: "photo".to_string(),
            bytes: b"data".to_vec(),
        };
        assert!(matches!(
            service.validate_and_store(Some(&no_extension)).await,
            Err(UploadError::InvalidExtension)
        ));

        let wrong_extension = UploadedFile {
            file_name: "virus.exe".to_string(),
            bytes: b"data".to_vec(),
        };
        assert!(matches!(
            service.validate_and_store(Some(&wrong_extension)).await,
            Err(UploadError::InvalidExtension)
        ));

        // Empty file name behaves like a missing extension, not a missing file.
        let empty_name = UploadedFile {
            file_name: String::new(),
            bytes: b"data".to_vec(),
        };
        assert!(matches!(
            service.validate_and_store(Some(&empty_name)).await,
            Err(UploadError::InvalidExtension)
        ));

        std::fs::remove_dir_all(&dir).ok();
    }
}
