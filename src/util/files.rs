use std::{
    fs,
    path::{Path, PathBuf},
};

use log::warn;

use crate::{error::RejectReason, structs::file_type::ImageKind, types::SourceImage};

pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;
pub const ACCEPTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Reads every path that passes the size and type checks.
///
/// Order of accepted files follows `paths`. Rejected paths are returned
/// alongside the reason instead of aborting the whole selection.
pub fn load_sources(paths: &[PathBuf]) -> (Vec<SourceImage>, Vec<(PathBuf, RejectReason)>) {
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();

    for path in paths {
        match load_source(path) {
            Ok(source) => accepted.push(source),
            Err(reason) => {
                warn!("Rejected '{}': {}", path.display(), reason);
                rejected.push((path.clone(), reason));
            }
        }
    }

    (accepted, rejected)
}

pub fn load_source(path: &Path) -> Result<SourceImage, RejectReason> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();

    let kind = ImageKind::from_extension(extension)
        .ok_or_else(|| RejectReason::UnsupportedType(extension.to_string()))?;

    let size = fs::metadata(path)?.len();
    if size > MAX_FILE_SIZE {
        return Err(RejectReason::TooLarge {
            size,
            limit: MAX_FILE_SIZE,
        });
    }

    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let data = fs::read(path)?;

    Ok(SourceImage::new(name, data, kind))
}
