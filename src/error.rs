use std::io;

use thiserror::Error;

/// Why a single image could not be turned into a result.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("failed to encode image: {0}")]
    Encode(String),

    #[error("image has no pixels")]
    EmptyImage,
}

/// Why a file was kept out of the batch.
#[derive(Debug, Error)]
pub enum RejectReason {
    #[error("file is {size} bytes, limit is {limit} bytes")]
    TooLarge { size: u64, limit: u64 },

    #[error("unsupported file type '{0}'")]
    UnsupportedType(String),

    #[error("failed to read file: {0}")]
    Read(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write export: {0}")]
    Io(#[from] io::Error),

    #[error("failed to build archive: {0}")]
    Zip(#[from] zip::result::ZipError),
}
