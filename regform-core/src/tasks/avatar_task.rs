// regform-core/src/tasks/avatar_task.rs

//! Background avatar read: file -> `data:` URL for the preview image.

use std::path::{Path, PathBuf};
use std::time::Instant;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tokio::{
    io::{AsyncRead, AsyncReadExt},
    sync::mpsc,
    task::JoinHandle,
};
use tracing::{Instrument, info, info_span, warn};

use crate::AppError;
use crate::config::AvatarConfig;
use crate::controller::event_loop::TaskResult;
use crate::util::sequence::RequestToken;

fn mime_for(extension: &str) -> &'static str {
    match extension {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// Leading bytes that identify the format behind `extension`.
fn content_matches(extension: &str, bytes: &[u8]) -> bool {
    match extension {
        "png" => bytes.starts_with(&[0x89, b'P', b'N', b'G']),
        "jpg" | "jpeg" => bytes.starts_with(&[0xFF, 0xD8, 0xFF]),
        "gif" => bytes.starts_with(b"GIF8"),
        "webp" => bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP",
        "bmp" => bytes.starts_with(b"BM"),
        "svg" => {
            let text = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
            let text = text.trim_ascii_start();
            text.starts_with(b"<svg") || text.starts_with(b"<?xml")
        }
        _ => false,
    }
}

/// Reads at most `max_bytes + 1` bytes; `None` if the source is longer than
/// `max_bytes`.
async fn read_capped<R: AsyncRead + Unpin>(
    reader: R,
    max_bytes: u64,
) -> std::io::Result<Option<Vec<u8>>> {
    let mut bytes = Vec::new();
    reader
        .take(max_bytes.saturating_add(1))
        .read_to_end(&mut bytes)
        .await?;
    Ok((bytes.len() as u64 <= max_bytes).then_some(bytes))
}

/// Reads `path` and encodes it as a data URL, enforcing the configured
/// extension list, size cap and the file signature of that extension.
pub async fn read_avatar(path: &Path, config: &AvatarConfig) -> Result<String, AppError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if !config.extensions.iter().any(|e| e == &extension) {
        return Err(AppError::avatar_read(path, format!("unsupported file type {extension:?}")));
    }

    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| AppError::avatar_read(path, e.to_string()))?;

    if !metadata.is_file() {
        return Err(AppError::avatar_read(path, "not a regular file"));
    }
    if metadata.len() > config.max_bytes {
        return Err(AppError::avatar_read(
            path,
            format!("{} bytes exceeds limit of {}", metadata.len(), config.max_bytes),
        ));
    }

    // The file may grow after the metadata check; never read past the cap.
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| AppError::avatar_read(path, e.to_string()))?;
    let bytes = read_capped(file, config.max_bytes)
        .await
        .map_err(|e| AppError::avatar_read(path, e.to_string()))?
        .ok_or_else(|| {
            AppError::avatar_read(
                path,
                format!("file grew past the limit of {} bytes", config.max_bytes),
            )
        })?;

    if bytes.is_empty() {
        return Err(AppError::avatar_read(path, "file is empty"));
    }
    if !content_matches(&extension, &bytes) {
        return Err(AppError::avatar_read(
            path,
            format!("content does not match a {extension} image"),
        ));
    }

    Ok(format!("data:{};base64,{}", mime_for(&extension), STANDARD.encode(&bytes)))
}

pub fn spawn_avatar_read(
    token: RequestToken,
    path: PathBuf,
    config: AvatarConfig,
    task_tx: mpsc::UnboundedSender<TaskResult>,
) -> JoinHandle<()> {
    let span = info_span!("avatar_read", token = token.get(), path = %path.display());

    tokio::spawn(
        async move {
            let start = Instant::now();
            let result = read_avatar(&path, &config).await;

            match &result {
                Ok(url) => info!(
                    marker = "AVATAR_TASK",
                    operation_type = "read_complete",
                    encoded_len = url.len(),
                    duration_ms = start.elapsed().as_millis(),
                    "Avatar preview ready"
                ),
                Err(e) => warn!(
                    marker = "AVATAR_TASK",
                    operation_type = "read_failed",
                    error = %e,
                    "Avatar preview failed"
                ),
            }

            if task_tx
                .send(TaskResult::AvatarRead {
                    token,
                    path,
                    result,
                })
                .is_err()
            {
                warn!(
                    marker = "AVATAR_TASK",
                    operation_type = "result_dropped",
                    "Event loop gone; avatar read result dropped"
                );
            }
        }
        .instrument(span),
    )
}
