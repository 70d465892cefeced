use std::{
    collections::HashSet,
    fs,
    io::{Seek, Write},
    path::Path,
};

use chrono::{DateTime, Utc};
use log::{info, warn};
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

use crate::{error::ExportError, types::ProcessedImage};

/// `resized-images-2024-05-01T12-30-45.zip`
pub fn archive_file_name(now: DateTime<Utc>) -> String {
    format!("resized-images-{}.zip", now.format("%Y-%m-%dT%H-%M-%S"))
}

/// Writes one zip entry per image, named after the image.
///
/// A name that already appeared gets a ` (2)`, ` (3)`, ... suffix before the
/// extension, so every image ends up in the archive.
pub fn write_archive<W: Write + Seek>(
    images: &[ProcessedImage],
    writer: W,
) -> Result<W, ExportError> {
    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut taken = HashSet::new();

    for image in images {
        let name = unique_entry_name(&image.name, &mut taken);
        if name != image.name {
            warn!("Duplicate archive entry '{}' renamed to '{}'", image.name, name);
        }
        zip.start_file(name.as_str(), options)?;
        zip.write_all(&image.data)?;
    }

    Ok(zip.finish()?)
}

/// Claims `name` in `taken`, or the first free `stem (n).ext` variant.
fn unique_entry_name(name: &str, taken: &mut HashSet<String>) -> String {
    if taken.insert(name.to_string()) {
        return name.to_string();
    }

    let (stem, extension) = match name.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() => (stem, Some(extension)),
        _ => (name, None),
    };

    let mut counter = 2;
    loop {
        let candidate = match extension {
            Some(extension) => format!("{} ({}).{}", stem, counter, extension),
            None => format!("{} ({})", stem, counter),
        };
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        counter += 1;
    }
}

pub fn save_archive(images: &[ProcessedImage], path: &Path) -> Result<(), ExportError> {
    let file = fs::File::create(path)?;
    let mut file = write_archive(images, file)?;
    file.flush()?;
    info!("Saved {} images to '{}'", images.len(), path.display());
    Ok(())
}

pub fn save_single(image: &ProcessedImage, path: &Path) -> Result<(), ExportError> {
    fs::write(path, &image.data)?;
    info!("Saved '{}'", path.display());
    Ok(())
}
