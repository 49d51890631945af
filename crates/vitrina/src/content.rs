//! Core functions and structs to define the content sources of your website.
//!
//! Content sources are named collections of Markdown documents, compiled to HTML once at build time, before any
//! page is rendered. Pages reach a document through a [`ContentRef`], usually carried in their static props.
use std::any::Any;
use std::path::PathBuf;
use std::time::Instant;

use log::info;

use crate::assets::ContentAsset;
use crate::errors::ContentError;
use crate::logging::{FormatElapsedTimeOptions, format_elapsed_time};

pub mod markdown;
mod slugger;

pub use markdown::{
    CompiledMarkdown, MarkdownHeading, MarkdownLoader, UntypedMarkdownContent, glob_markdown,
    render_markdown,
};

/// Settings shared by every content source while loading.
#[derive(Debug, Clone)]
pub struct ContentContext {
    /// Directory (relative to the output directory) that referenced files are copied to, e.g. `_vitrina`.
    pub assets_dir: PathBuf,
}

impl Default for ContentContext {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("_vitrina"),
        }
    }
}

/// Loads the entries of a content source. Implemented by [`MarkdownLoader`], returned by [`glob_markdown`].
pub trait ContentLoader<T>: Send + Sync {
    fn load(&self, ctx: &ContentContext) -> Result<Vec<ContentEntry<T>>, ContentError>;
}

/// Points at one entry of one content source, e.g. the `about` entry of the `pages` source.
///
/// ## Example
/// ```rust
/// use vitrina::content::ContentRef;
///
/// let about = ContentRef::new("pages", "about");
/// assert_eq!(about.id(), "about");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentRef {
    source: String,
    id: String,
}

impl ContentRef {
    pub fn new<S: Into<String>, I: Into<String>>(source: S, id: I) -> Self {
        Self {
            source: source.into(),
            id: id.into(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Represents a single entry in a [`ContentSource`].
pub struct ContentEntry<T> {
    /// File stem of the source file, e.g. `about` for `content/about.md`.
    pub id: String,
    pub data: T,
    pub raw_content: String,
    pub compiled: CompiledMarkdown,
    pub file_path: Option<PathBuf>,
}

impl<T> ContentEntry<T> {
    pub fn data(&self) -> &T {
        &self.data
    }

    /// The HTML compiled from the Markdown body.
    pub fn render(&self) -> &str {
        &self.compiled.html
    }

    pub fn headings(&self) -> &[MarkdownHeading] {
        &self.compiled.headings
    }

    /// Text of the first top-level heading, if any.
    pub fn title(&self) -> Option<&str> {
        self.compiled.title()
    }
}

/// Represents a collection of content sources.
///
/// Mostly seen as the return type of [`content_sources!`](crate::content_sources).
pub struct ContentSources(pub Vec<Box<dyn ContentSourceInternal>>);

impl From<Vec<Box<dyn ContentSourceInternal>>> for ContentSources {
    fn from(content_sources: Vec<Box<dyn ContentSourceInternal>>) -> Self {
        Self(content_sources)
    }
}

impl ContentSources {
    pub fn new(content_sources: Vec<Box<dyn ContentSourceInternal>>) -> Self {
        Self(content_sources)
    }

    pub fn sources(&self) -> &[Box<dyn ContentSourceInternal>] {
        &self.0
    }

    pub fn get_source<T: 'static>(&self, name: &str) -> Result<&ContentSource<T>, ContentError> {
        self.0
            .iter()
            .find_map(
                |source| match source.as_any().downcast_ref::<ContentSource<T>>() {
                    Some(source) if source.name == name => Some(source),
                    _ => None,
                },
            )
            .ok_or_else(|| ContentError::SourceNotFound {
                name: name.to_string(),
            })
    }

    /// Resolves a [`ContentRef`] to its entry.
    pub fn resolve<T: 'static>(&self, content: &ContentRef) -> Result<&ContentEntry<T>, ContentError> {
        self.get_source::<T>(content.source())?
            .get_entry(content.id())
    }

    /// Loads every source. Called once by the build, before pages are rendered.
    pub(crate) fn init_all(&mut self, ctx: &ContentContext) -> Result<(), ContentError> {
        for source in self.0.iter_mut() {
            let source_start = Instant::now();
            source.init(ctx)?;

            info!(target: "content", "{} initialized with {} entries in {}", source.get_name(), source.len(), format_elapsed_time(source_start.elapsed(), &FormatElapsedTimeOptions::default()));
        }
        Ok(())
    }
}

/// A source of content such as pages, articles, etc.
pub struct ContentSource<T = UntypedMarkdownContent> {
    pub name: String,
    pub entries: Vec<ContentEntry<T>>,
    pub(crate) loader: Box<dyn ContentLoader<T>>,
}

impl<T> ContentSource<T> {
    pub fn new<P>(name: P, loader: impl ContentLoader<T> + 'static) -> Self
    where
        P: Into<String>,
    {
        Self {
            name: name.into(),
            entries: vec![],
            loader: Box::new(loader),
        }
    }

    pub fn get_entry(&self, id: &str) -> Result<&ContentEntry<T>, ContentError> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .ok_or_else(|| ContentError::EntryNotFound {
                source_name: self.name.clone(),
                id: id.to_string(),
            })
    }
}

#[doc(hidden)]
/// Used internally by Vitrina and should not be implemented by the user.
/// We expose it because it's implemented for [`ContentSource`], which is public.
pub trait ContentSourceInternal: Send + Sync {
    fn init(&mut self, ctx: &ContentContext) -> Result<(), ContentError>;
    fn get_name(&self) -> &str;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn assets(&self) -> Vec<&ContentAsset>;
    fn as_any(&self) -> &dyn Any; // Used for type checking at runtime
}

impl<T: 'static + Sync + Send> ContentSourceInternal for ContentSource<T> {
    fn init(&mut self, ctx: &ContentContext) -> Result<(), ContentError> {
        self.entries = self.loader.load(ctx)?;
        Ok(())
    }
    fn get_name(&self) -> &str {
        &self.name
    }
    fn len(&self) -> usize {
        self.entries.len()
    }
    fn assets(&self) -> Vec<&ContentAsset> {
        self.entries
            .iter()
            .flat_map(|entry| entry.compiled.assets.iter())
            .collect()
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::fs;
    use std::path::Path;

    #[derive(Deserialize, Debug)]
    struct PageContent {
        title: Option<String>,
    }

    fn write_pages(dir: &Path) {
        fs::write(dir.join("about.md"), "---\ntitle: About us\n---\n# About\n\nHello.").unwrap();
        fs::write(dir.join("team.md"), "# Team\n\n- Ana\n- Luka\n").unwrap();
        fs::write(dir.join("notes.txt"), "not markdown").unwrap();
    }

    fn sources(dir: &Path) -> ContentSources {
        let pattern = format!("{}/*", dir.display());
        crate::content_sources!["pages" => glob_markdown::<PageContent>(&pattern)]
    }

    #[test]
    fn test_sources_load_markdown_entries() {
        let dir = tempfile::tempdir().unwrap();
        write_pages(dir.path());

        let mut sources = sources(dir.path());
        sources.init_all(&ContentContext::default()).unwrap();

        let pages = sources.get_source::<PageContent>("pages").unwrap();
        let mut ids: Vec<_> = pages.entries.iter().map(|e| e.id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["about", "team"]);
        assert_eq!(sources.sources()[0].len(), 2);
    }

    #[test]
    fn test_resolve_content_ref() {
        let dir = tempfile::tempdir().unwrap();
        write_pages(dir.path());

        let mut sources = sources(dir.path());
        sources.init_all(&ContentContext::default()).unwrap();

        let about = sources
            .resolve::<PageContent>(&ContentRef::new("pages", "about"))
            .unwrap();
        assert_eq!(about.data().title.as_deref(), Some("About us"));
        assert!(about.render().contains("<h1 id=\"about\">About</h1>"));

        let team = sources
            .resolve::<PageContent>(&ContentRef::new("pages", "team"))
            .unwrap();
        assert_eq!(team.data().title, None);
        assert_eq!(team.title(), Some("Team"));
    }

    #[test]
    fn test_resolve_errors() {
        let dir = tempfile::tempdir().unwrap();
        write_pages(dir.path());

        let mut sources = sources(dir.path());
        sources.init_all(&ContentContext::default()).unwrap();

        assert!(matches!(
            sources.resolve::<PageContent>(&ContentRef::new("pages", "missing")),
            Err(ContentError::EntryNotFound { source_name, id }) if source_name == "pages" && id == "missing"
        ));
        assert!(matches!(
            sources.resolve::<PageContent>(&ContentRef::new("articles", "about")),
            Err(ContentError::SourceNotFound { .. })
        ));
        assert!(matches!(
            sources.resolve::<UntypedMarkdownContent>(&ContentRef::new("pages", "about")),
            Err(ContentError::SourceNotFound { .. })
        ));
    }

    #[test]
    fn test_entries_are_empty_before_init() {
        let dir = tempfile::tempdir().unwrap();
        write_pages(dir.path());

        let sources = sources(dir.path());
        assert!(sources.sources()[0].is_empty());
    }
}
