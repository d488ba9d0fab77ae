use std::{
    fs::OpenOptions,
    io::{Cursor, ErrorKind, Write},
    path::{Path, PathBuf},
};

use image::RgbaImage;

use super::{
    compositor::{self, ComposeError, CompositeOptions},
    slots::Photo,
};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("take at least one photo first")]
    NothingCaptured,
    #[error("failed to compose strip: {0}")]
    Compose(#[from] ComposeError),
    #[error("failed to encode strip: {0}")]
    Encode(#[from] image::ImageError),
    #[error("failed to save strip: {0}")]
    Io(#[from] std::io::Error),
    #[error("export task terminated unexpectedly: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// A finished strip, encoded and named, ready to be written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedStrip {
    pub filename: String,
    pub data: Vec<u8>,
}

pub fn strip_filename(timestamp_millis: i64) -> String {
    format!("photobooth-{}.png", timestamp_millis)
}

/// Encode the strip as PNG under a timestamped name.
pub fn encode_strip(raster: &RgbaImage) -> Result<EncodedStrip, ExportError> {
    let mut data = Vec::new();
    raster.write_to(&mut Cursor::new(&mut data), image::ImageFormat::Png)?;
    log::debug!("Encoded {}x{} strip ({} bytes)", raster.width(), raster.height(), data.len());
    Ok(EncodedStrip {
        filename: strip_filename(chrono::Utc::now().timestamp_millis()),
        data,
    })
}

/// Write the strip into `output_dir`, never overwriting an existing file.
///
/// If the timestamped name is taken, `-1`, `-2`, ... is appended to the stem.
pub async fn save(encoded: EncodedStrip, output_dir: &Path) -> Result<PathBuf, ExportError> {
    let output_dir = output_dir.to_path_buf();
    let path = tokio::task::spawn_blocking(move || -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(&output_dir)?;
        let stem = encoded.filename.trim_end_matches(".png");
        let mut attempt = 0u32;
        loop {
            let name = if attempt == 0 {
                encoded.filename.clone()
            } else {
                format!("{}-{}.png", stem, attempt)
            };
            let path = output_dir.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => {
                    write_or_discard(file, &encoded.data, &path)?;
                    return Ok(path);
                }
                Err(err) if err.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(err) => return Err(err),
            }
        }
    })
    .await??;

    log::info!("Saved strip to {}", path.display());
    Ok(path)
}

/// Write `data` through `writer` into the file at `path`. On failure the
/// file is removed so no truncated strip is left behind.
fn write_or_discard<W: Write>(mut writer: W, data: &[u8], path: &Path) -> std::io::Result<()> {
    let result = writer.write_all(data).and_then(|()| writer.flush());
    drop(writer);
    if let Err(err) = result {
        if let Err(remove_err) = std::fs::remove_file(path) {
            log::warn!("Could not remove partial strip {}: {}", path.display(), remove_err);
        }
        return Err(err);
    }
    Ok(())
}

/// Compose, encode and save a strip from a slot snapshot.
///
/// Rejected up front when no slot holds a photo; no rendering happens and no
/// file is written in that case.
pub async fn export_strip(
    slots: Vec<Option<Photo>>,
    options: CompositeOptions,
    output_dir: PathBuf,
) -> Result<PathBuf, ExportError> {
    if !slots.iter().any(Option::is_some) {
        log::warn!("Export requested with no photos captured");
        return Err(ExportError::NothingCaptured);
    }

    let raster = compositor::compose(&slots, &options).await?;
    let encoded = tokio::task::spawn_blocking(move || encode_strip(&raster)).await??;
    save(encoded, &output_dir).await
}
