use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{AppError, AppResult};

pub const UNREADABLE_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";

const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MediaKind {
    PersonPhoto,
    Poster,
}

impl MediaKind {
    fn dir(self) -> &'static str {
        match self {
            MediaKind::PersonPhoto => "peoples",
            MediaKind::Poster => "posters",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Uploaded images on local disk, addressed by their path under `root`.
#[derive(Clone, Debug)]
pub struct MediaStore {
    root: PathBuf,
    max_dimension: u32,
}

impl MediaStore {
    pub fn new(root: PathBuf, max_dimension: u32) -> Self {
        Self { root, max_dimension }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes an upload and returns its path relative to the media root.
    pub async fn store(&self, kind: MediaKind, file_name: &str, bytes: &[u8]) -> AppResult<String> {
        let dir = self.root.join(kind.dir());
        tokio::fs::create_dir_all(&dir).await?;

        let name = sanitize_file_name(file_name);
        let mut candidate = name.clone();
        while tokio::fs::try_exists(dir.join(&candidate)).await? {
            let suffix = uuid::Uuid::new_v4().simple().to_string();
            candidate = with_suffix(&name, &suffix[..8]);
        }

        tokio::fs::write(dir.join(&candidate), bytes).await?;
        debug!(file = %candidate, kind = ?kind, bytes = bytes.len(), "stored upload");
        Ok(format!("{}/{}", kind.dir(), candidate))
    }

    /// Removes an upload whose row was never written.
    pub async fn discard(&self, relative: &str) {
        if let Err(err) = tokio::fs::remove_file(self.root.join(relative)).await {
            warn!(file = %relative, error = %err, "failed to discard upload");
        }
    }

    /// Downscales the image at `relative` to fit within the configured
    /// bounding box, keeping its aspect ratio. Returns whether the file was
    /// rewritten. Missing files (unset defaults) are left alone; a file that
    /// does not decode is `BadRequest`.
    pub async fn normalize(&self, relative: &str) -> AppResult<bool> {
        let path = self.root.join(relative);
        if !tokio::fs::try_exists(&path).await? {
            debug!(file = %relative, "image not on disk, skipping resize");
            return Ok(false);
        }

        let max = self.max_dimension;
        tokio::task::spawn_blocking(move || downscale_file(&path, max))
            .await
            .map_err(anyhow::Error::new)?
    }
}

pub fn is_supported_image(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

fn downscale_file(path: &Path, max: u32) -> AppResult<bool> {
    let img = image::open(path).map_err(|err| {
        debug!(file = %path.display(), error = %err, "upload does not decode");
        AppError::BadRequest(UNREADABLE_IMAGE.to_string())
    })?;
    if img.width() <= max && img.height() <= max {
        return Ok(false);
    }
    let resized = img.thumbnail(max, max);
    debug!(
        file = %path.display(),
        from = %format!("{}x{}", img.width(), img.height()),
        to = %format!("{}x{}", resized.width(), resized.height()),
        "downscaled image"
    );
    resized.save(path)?;
    Ok(true)
}

fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| match c {
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') => c,
            ' ' => '_',
            _ => '-',
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() { "upload".to_string() } else { cleaned.to_string() }
}

fn with_suffix(name: &str, suffix: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}_{suffix}.{ext}"),
        None => format!("{name}_{suffix}"),
    }
}
