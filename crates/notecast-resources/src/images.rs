//! Local image registry.
//!
//! Maps locally referenced images to canonical keys so multiple textual
//! references to one resource converge to one upload. The registry is
//! long-lived and explicitly reset on document switch: canonical keys are
//! path-derived, not content-hash-derived, so keys from different documents
//! must never mix.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{info, warn};

use notecast_pipeline::ImageSink;

use crate::uploader::ImageUploader;

/// Resolution state of one registered image.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Resolution {
    /// Registered, not uploaded yet.
    Pending,
    /// Uploaded; holds the remote locator.
    Uploaded(String),
    /// Local file could not be read; rendered as a "not found" note.
    Missing,
}

#[derive(Debug)]
struct Entry {
    resolution: Resolution,
}

/// Registry of locally referenced images for one document.
#[derive(Debug)]
pub struct ImageRegistry {
    base_dir: PathBuf,
    entries: BTreeMap<String, Entry>,
}

impl ImageRegistry {
    /// Create a registry resolving keys relative to `base_dir`.
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Number of registered entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remote locator for a canonical key, once uploaded.
    #[must_use]
    pub fn resolved_url(&self, key: &str) -> Option<&str> {
        match &self.entries.get(key)?.resolution {
            Resolution::Uploaded(url) => Some(url),
            _ => None,
        }
    }

    /// Upload every unresolved entry through the upload collaborator.
    ///
    /// Already-resolved entries are skipped, so calling this repeatedly
    /// performs each underlying upload exactly once. Per-entry failures are
    /// logged and leave the rest of the registry untouched.
    ///
    /// Returns the number of uploads performed.
    pub fn upload_all(&mut self, uploader: &dyn ImageUploader, token: &str) -> usize {
        let mut performed = 0;
        for (key, entry) in &mut self.entries {
            if entry.resolution != Resolution::Pending {
                continue;
            }
            let path = self.base_dir.join(key);
            let data = match std::fs::read(&path) {
                Ok(data) => data,
                Err(err) => {
                    warn!(key = %key, error = %err, "local image not found");
                    entry.resolution = Resolution::Missing;
                    continue;
                }
            };
            let filename = upload_filename(key, &data);
            match uploader.upload(&data, &filename, token) {
                Ok(url) => {
                    info!(key = %key, url = %url, "image uploaded");
                    performed += 1;
                    entry.resolution = Resolution::Uploaded(url);
                }
                Err(err) => {
                    // Left pending; a later upload_all may retry.
                    warn!(key = %key, error = %err, "image upload failed");
                }
            }
        }
        performed
    }

    /// Rewrite every local reference whose `src` matches a resolved key to
    /// the resolved locator. Missing images become an inline note;
    /// unresolved and non-local references are untouched.
    pub fn replace_all(&self, html: &mut String) {
        for (key, entry) in &self.entries {
            match &entry.resolution {
                Resolution::Uploaded(url) => {
                    let from = format!(r#"src="{key}""#);
                    let to = format!(r#"src="{url}""#);
                    *html = html.replace(&from, &to);
                }
                Resolution::Missing => {
                    replace_img_tag(
                        html,
                        key,
                        &format!(r#"<span class="nc-missing">image not found: {key}</span>"#),
                    );
                }
                Resolution::Pending => {}
            }
        }
    }

    /// Clear the registry. Must be called on document switch.
    pub fn cleanup(&mut self) {
        self.entries.clear();
    }
}

impl ImageSink for ImageRegistry {
    /// Register a reference under its canonical key. First registration
    /// wins; duplicates are no-ops.
    fn register(&mut self, origin: &str) -> String {
        let key = canonical_key(origin);
        self.entries.entry(key.clone()).or_insert(Entry {
            resolution: Resolution::Pending,
        });
        key
    }
}

/// Lexically normalize a local reference into its canonical key.
///
/// Handles `.` and `..` segments and backslash separators. Derived from the
/// path string only; two distinct files whose references normalize
/// identically share one entry.
#[must_use]
pub fn canonical_key(origin: &str) -> String {
    let normalized = origin.replace('\\', "/");
    let mut segments: Vec<&str> = Vec::new();
    for component in normalized.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(component),
        }
    }
    segments.join("/")
}

/// Content-hashed upload filename: sha256 prefix plus the original extension.
fn upload_filename(key: &str, data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let hash = hex::encode(hasher.finalize());
    match Path::new(key).extension().and_then(|ext| ext.to_str()) {
        Some(ext) => format!("{}.{ext}", &hash[..16]),
        None => hash[..16].to_owned(),
    }
}

/// Replace the whole `<img src="{key}" ...>` tag with `replacement`.
fn replace_img_tag(html: &mut String, key: &str, replacement: &str) {
    let needle = format!(r#"<img src="{key}""#);
    while let Some(start) = html.find(&needle) {
        let Some(end) = html[start..].find('>') else {
            return;
        };
        html.replace_range(start..start + end + 1, replacement);
    }
}
