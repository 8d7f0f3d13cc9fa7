//! Extension allowlist used by the enumerator.

use std::collections::HashSet;
use std::path::Path;

/// Extensions accepted by default, lowercase and without the leading dot.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    // documents
    "txt", "md", "pdf", "docx", "odt", "rtf",
    // structured text
    "json", "csv", "xml", "yaml", "yml", "ini",
    // source code and scripts
    "py", "js", "html", "css", "java", "c", "cpp", "sh", "bat", "ts",
    // images
    "png", "jpg", "jpeg", "bmp", "gif", "webp", "tiff", "ico", "psd",
    // executables and packages
    "exe", "msi", "dll", "so", "app", "dmg", "deb", "rpm",
];

/// Extensions that get a perceptual hash in addition to the digest.
pub const RASTER_IMAGE_EXTENSIONS: &[&str] =
    &["png", "jpg", "jpeg", "bmp", "gif", "webp", "tiff", "ico", "psd"];

/// Lowercased extension of `path`, if any
fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// Whether the path names a raster image by extension
pub fn is_raster_image(path: &Path) -> bool {
    extension_of(path)
        .map(|ext| RASTER_IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Decides which files belong in a batch
#[derive(Debug, Clone)]
pub struct ExtensionFilter {
    extensions: HashSet<String>,
    include_hidden: bool,
}

impl ExtensionFilter {
    /// Filter with the default allowlist
    pub fn new() -> Self {
        Self {
            extensions: SUPPORTED_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            include_hidden: true,
        }
    }

    /// Include or drop dot-files
    pub fn with_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Replace the allowlist. Entries may carry a leading dot and any case.
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    /// Check if a file should be included
    pub fn should_include(&self, path: &Path) -> bool {
        if !self.include_hidden {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with('.') {
                    return false;
                }
            }
        }

        match extension_of(path) {
            Some(ext) => self.extensions.contains(&ext),
            None => false,
        }
    }
}

impl Default for ExtensionFilter {
    fn default() -> Self {
        Self::new()
    }
}
