//! Assets used by pages: stylesheets and scripts included in a page's `<head>`, and files referenced from Markdown content.
use std::fs;
use std::hash::Hasher;
use std::path::{Path, PathBuf};

use rustc_hash::{FxHashSet, FxHasher};

use crate::errors::ContentError;

/// Stylesheets and scripts a page asked to include. They are injected into the page's `<head>` once rendered.
///
/// ## Example
/// ```rust
/// use vitrina::route::prelude::*;
///
/// pub struct Map;
///
/// impl Route for Map {
///   fn render(&self, ctx: &mut PageContext) -> impl Into<RenderResult> {
///     ctx.assets.include_style("https://unpkg.com/leaflet@1.9.4/dist/leaflet.css");
///     "<html><head></head><body><div id=\"map\"></div></body></html>"
///   }
/// }
/// ```
#[derive(Default, Debug)]
pub struct PageAssets {
    styles: Vec<String>,
    scripts: Vec<String>,
}

impl PageAssets {
    /// Includes a stylesheet. Including the same URL twice has no effect.
    pub fn include_style<U: Into<String>>(&mut self, url: U) {
        let url = url.into();
        if !self.styles.contains(&url) {
            self.styles.push(url);
        }
    }

    /// Includes a module script. Including the same URL twice has no effect.
    pub fn include_script<U: Into<String>>(&mut self, url: U) {
        let url = url.into();
        if !self.scripts.contains(&url) {
            self.scripts.push(url);
        }
    }

    pub fn included_styles(&self) -> impl Iterator<Item = &str> {
        self.styles.iter().map(String::as_str)
    }

    pub fn included_scripts(&self) -> impl Iterator<Item = &str> {
        self.scripts.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty() && self.scripts.is_empty()
    }
}

/// A file referenced from Markdown content, copied to the assets directory under a fingerprinted name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentAsset {
    /// Path of the original file.
    pub path: PathBuf,
    pub(crate) filename: String,
    pub(crate) url: String,
}

impl ContentAsset {
    pub(crate) fn new(path: PathBuf, assets_dir: &Path) -> Result<Self, ContentError> {
        let content = fs::read(&path).map_err(|source| ContentError::ReadFailed {
            path: path.clone(),
            source,
        })?;

        let hash = calculate_hash(&content);
        let filename = make_filename(&path, &hash);
        let url = make_final_url(assets_dir, &filename);

        Ok(Self {
            path,
            filename,
            url,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }
}

/// Deduplicates assets referenced by several entries.
pub(crate) fn unique_assets<'a>(
    assets: impl Iterator<Item = &'a ContentAsset>,
) -> Vec<&'a ContentAsset> {
    let mut seen = FxHashSet::default();
    assets
        .filter(|asset| seen.insert(asset.filename.as_str()))
        .collect()
}

fn calculate_hash(content: &[u8]) -> String {
    let mut hasher = FxHasher::default();
    hasher.write(content);

    // 8 hex characters are plenty to bust caches for a handful of images
    format!("{:016x}", hasher.finish())[..8].to_string()
}

fn make_filename(path: &Path, hash: &str) -> String {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "asset".to_string());

    match path.extension() {
        Some(extension) => format!("{}.{}.{}", stem, hash, extension.to_string_lossy()),
        None => format!("{}.{}", stem, hash),
    }
}

fn make_final_url(assets_dir: &Path, filename: &str) -> String {
    let assets_dir = assets_dir.to_string_lossy().replace('\\', "/");
    let assets_dir = assets_dir.trim_matches('/');

    if assets_dir.is_empty() {
        format!("/{}", filename)
    } else {
        format!("/{}/{}", assets_dir, filename)
    }
}
