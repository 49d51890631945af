use std::path::Path;

use serde::Deserialize;
use vitrina::content::{ContentSources, glob_markdown};
use vitrina::content_sources;

/// Name of the content source holding the static pages.
pub const PAGES: &str = "pages";

#[derive(Debug, Deserialize)]
pub struct PageContent {
    pub title: Option<String>,
    pub description: Option<String>,
}

pub fn content_sources() -> ContentSources {
    content_sources_in(Path::new(env!("CARGO_MANIFEST_DIR")))
}

/// Content sources reading from `<root>/content`.
pub fn content_sources_in(root: &Path) -> ContentSources {
    let pattern = root.join("content").join("*.md");

    content_sources![
        PAGES => glob_markdown::<PageContent>(&pattern.to_string_lossy())
    ]
}
