/// Declared type of a source image, the way a browser reports a MIME type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    WebP,
}

impl ImageKind {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageKind::Jpeg),
            "png" => Some(ImageKind::Png),
            "webp" => Some(ImageKind::WebP),
            _ => None,
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Png => "image/png",
            ImageKind::WebP => "image/webp",
        }
    }

    /// PNG ignores quality; only effort changes.
    pub fn is_lossy(&self) -> bool {
        !matches!(self, ImageKind::Png)
    }
}

impl std::fmt::Display for ImageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageKind::Jpeg => write!(f, "JPEG"),
            ImageKind::Png => write!(f, "PNG"),
            ImageKind::WebP => write!(f, "WebP"),
        }
    }
}

/// Output format chosen by the user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Original,
    Jpeg,
    Png,
    WebP,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 4] = [
        OutputFormat::Original,
        OutputFormat::Jpeg,
        OutputFormat::Png,
        OutputFormat::WebP,
    ];

    /// Encoding to use for a source of the given declared type.
    pub fn resolve(&self, source: ImageKind) -> ImageKind {
        match self {
            OutputFormat::Original => source,
            OutputFormat::Jpeg => ImageKind::Jpeg,
            OutputFormat::Png => ImageKind::Png,
            OutputFormat::WebP => ImageKind::WebP,
        }
    }

    /// `None` keeps the source file's own extension.
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            OutputFormat::Original => None,
            OutputFormat::Jpeg => Some("jpg"),
            OutputFormat::Png => Some("png"),
            OutputFormat::WebP => Some("webp"),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Original => write!(f, "Original"),
            OutputFormat::Jpeg => write!(f, "JPEG"),
            OutputFormat::Png => write!(f, "PNG"),
            OutputFormat::WebP => write!(f, "WebP"),
        }
    }
}
