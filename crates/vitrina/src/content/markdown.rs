use std::fs;
use std::marker::PhantomData;
use std::path::Path;

use glob::glob as glob_fs;
use log::{debug, warn};
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use serde::de::DeserializeOwned;

use super::{ContentContext, ContentEntry, ContentLoader, slugger};
use crate::assets::ContentAsset;
use crate::errors::ContentError;

/// Represents a Markdown heading.
///
/// Can be used to generate a table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownHeading {
    pub title: String,
    pub id: String,
    pub level: u8,
}

/// Frontmatter type for Markdown content that doesn't need any. Unknown frontmatter keys are ignored.
///
/// ## Example
/// ```rs
/// use vitrina::content_sources;
/// use vitrina::content::{glob_markdown, UntypedMarkdownContent};
///
/// content_sources!["pages" => glob_markdown::<UntypedMarkdownContent>("content/*.md")];
/// ```
#[derive(serde::Deserialize, Debug, Clone, Default)]
pub struct UntypedMarkdownContent {}

/// Output of the Markdown compiler for one document.
#[derive(Debug, Clone, Default)]
pub struct CompiledMarkdown {
    pub html: String,
    pub headings: Vec<MarkdownHeading>,
    /// Files referenced by the document, rewritten to their fingerprinted URL in `html`.
    pub assets: Vec<ContentAsset>,
    pub(crate) frontmatter: String,
}

impl CompiledMarkdown {
    /// Text of the first `h1`.
    pub fn title(&self) -> Option<&str> {
        self.headings
            .iter()
            .find(|heading| heading.level == 1)
            .map(|heading| heading.title.as_str())
    }
}

/// Loader returned by [`glob_markdown`].
pub struct MarkdownLoader<T> {
    pattern: String,
    _marker: PhantomData<fn() -> T>,
}

/// Glob for Markdown files and load them as a content source. The id of each entry is the file stem.
///
/// The YAML frontmatter of each file, if any, is deserialized into `T`.
///
/// ## Example
/// ```rs
/// use vitrina::{coronate, content_sources, routes, BuildOptions, BuildOutput};
/// use vitrina::content::glob_markdown;
///
/// #[derive(serde::Deserialize)]
/// pub struct PageContent {
///   pub title: Option<String>,
/// }
///
/// fn main() -> Result<BuildOutput, Box<dyn std::error::Error>> {
///   coronate(
///     routes![],
///     content_sources!["pages" => glob_markdown::<PageContent>("content/*.md")],
///     BuildOptions::default(),
///   )
/// }
/// ```
pub fn glob_markdown<T>(pattern: &str) -> MarkdownLoader<T> {
    MarkdownLoader {
        pattern: pattern.to_string(),
        _marker: PhantomData,
    }
}

impl<T> ContentLoader<T> for MarkdownLoader<T>
where
    T: DeserializeOwned,
{
    fn load(&self, ctx: &ContentContext) -> Result<Vec<ContentEntry<T>>, ContentError> {
        let paths = glob_fs(&self.pattern).map_err(|source| ContentError::InvalidPattern {
            pattern: self.pattern.clone(),
            source,
        })?;

        let mut entries = vec![];

        for path in paths {
            let path = path.map_err(|err| ContentError::ReadFailed {
                path: err.path().to_path_buf(),
                source: err.into_error(),
            })?;

            if path.extension().is_none_or(|extension| extension != "md") {
                warn!(target: "content", "Skipping {}, only Markdown files are supported", path.display());
                continue;
            }

            let Some(id) = path.file_stem().map(|stem| stem.to_string_lossy().to_string()) else {
                continue;
            };

            let content = fs::read_to_string(&path).map_err(|source| ContentError::ReadFailed {
                path: path.clone(),
                source,
            })?;

            let compiled = compile_markdown(&content, Some(&path), ctx)?;
            let data = parse_frontmatter::<T>(&compiled.frontmatter, &path)?;

            debug!(target: "content", "{} compiled ({} headings, {} assets)", path.display(), compiled.headings.len(), compiled.assets.len());

            entries.push(ContentEntry {
                id,
                data,
                raw_content: content,
                compiled,
                file_path: Some(path),
            });
        }

        Ok(entries)
    }
}

fn parse_frontmatter<T: DeserializeOwned>(frontmatter: &str, path: &Path) -> Result<T, ContentError> {
    // An absent or empty frontmatter deserializes like an empty mapping
    let frontmatter = if frontmatter.trim().is_empty() {
        "{}"
    } else {
        frontmatter
    };

    serde_yaml::from_str::<T>(frontmatter).map_err(|source| ContentError::Frontmatter {
        path: path.to_path_buf(),
        source,
    })
}

fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(
        Options::ENABLE_YAML_STYLE_METADATA_BLOCKS
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_TABLES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_FOOTNOTES,
    );
    options
}

/// Render Markdown content to HTML.
///
/// Headings get an id derived from their text. Frontmatter is dropped and referenced files are left untouched,
/// use a content source to have them copied to the output.
///
/// ## Example
/// ```rust
/// use vitrina::content::render_markdown;
///
/// let html = render_markdown("# Hello, world!");
/// assert_eq!(html, "<h1 id=\"hello-world\">Hello, world!</h1>\n");
/// ```
pub fn render_markdown(content: &str) -> String {
    let (events, _) = parse_events(content);
    let (html, _) = render_events(&events);
    html
}

/// Compiles one Markdown document. When `file_path` is set, relative image references are resolved against it.
pub(crate) fn compile_markdown(
    content: &str,
    file_path: Option<&Path>,
    ctx: &ContentContext,
) -> Result<CompiledMarkdown, ContentError> {
    let (mut events, frontmatter) = parse_events(content);

    let assets = match file_path {
        Some(file_path) => resolve_image_references(&mut events, file_path, ctx)?,
        None => vec![],
    };

    let (html, headings) = render_events(&events);

    Ok(CompiledMarkdown {
        html,
        headings,
        assets,
        frontmatter,
    })
}

/// Splits the document into its body events and the raw text of its frontmatter.
fn parse_events(content: &str) -> (Vec<Event<'_>>, String) {
    let mut frontmatter = String::new();
    let mut in_frontmatter = false;
    let mut events = Vec::new();

    for event in Parser::new_ext(content, markdown_options()) {
        match event {
            Event::Start(Tag::MetadataBlock(_)) => in_frontmatter = true,
            Event::End(TagEnd::MetadataBlock(_)) => in_frontmatter = false,
            Event::Text(ref text) if in_frontmatter => frontmatter.push_str(text),
            _ => events.push(event),
        }
    }

    (events, frontmatter)
}

fn render_events(events: &[Event]) -> (String, Vec<MarkdownHeading>) {
    let mut slugger = slugger::Slugger::new();
    let mut headings = vec![];
    let mut transformed = Vec::with_capacity(events.len());

    for (i, event) in events.iter().enumerate() {
        match event {
            Event::Start(Tag::Heading {
                level, id, classes, ..
            }) => {
                let title = find_matching_heading_end(events, i)
                    .map(|end| get_text_from_events(&events[i + 1..end]))
                    .unwrap_or_default();

                let heading_id = match id {
                    Some(id) => {
                        slugger.reserve(id);
                        id.to_string()
                    }
                    None => slugger.slugify(&title),
                };

                let level = heading_level(*level);
                let class_attr = if classes.is_empty() {
                    String::new()
                } else {
                    let classes: Vec<&str> = classes.iter().map(|c| c.as_ref()).collect();
                    format!(" class=\"{}\"", escape_attribute(&classes.join(" ")))
                };

                transformed.push(Event::Html(
                    format!(
                        "<h{} id=\"{}\"{}>",
                        level,
                        escape_attribute(&heading_id),
                        class_attr
                    )
                    .into(),
                ));

                headings.push(MarkdownHeading {
                    title,
                    id: heading_id,
                    level,
                });
            }
            _ => transformed.push(event.clone()),
        }
    }

    let mut html_output = String::new();
    pulldown_cmark::html::push_html(&mut html_output, transformed.into_iter());

    (html_output, headings)
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn find_matching_heading_end(events: &[Event], start_index: usize) -> Option<usize> {
    events
        .iter()
        .enumerate()
        .skip(start_index + 1)
        .find(|(_, event)| matches!(event, Event::End(TagEnd::Heading(_))))
        .map(|(i, _)| i)
}

fn get_text_from_events(events: &[Event]) -> String {
    let mut title = String::new();

    for event in events.iter() {
        match event {
            Event::Text(text) | Event::Code(text) => title += text,
            _ => continue,
        }
    }

    title
}

pub(crate) fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn is_local_reference(src: &str) -> bool {
    let src = src.trim();
    !(src.is_empty()
        || src.starts_with('/')
        || src.starts_with('#')
        || src.starts_with("data:")
        || src.starts_with("mailto:")
        || src.contains("://"))
}

/// Path of the file an image destination points to, relative to the Markdown file.
fn local_asset_path(dest_url: &str) -> String {
    let relative = dest_url.split(['?', '#']).next().unwrap_or_default();

    urlencoding::decode(relative)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| relative.to_string())
}

/// Fingerprints the files referenced by relative images, like an HTML loader would, and points the images at
/// their final URL.
fn resolve_image_references(
    events: &mut [Event],
    file_path: &Path,
    ctx: &ContentContext,
) -> Result<Vec<ContentAsset>, ContentError> {
    let base_dir = file_path.parent().unwrap_or_else(|| Path::new("."));
    let mut assets: Vec<ContentAsset> = vec![];

    for event in events.iter_mut() {
        let Event::Start(Tag::Image { dest_url, .. }) = event else {
            continue;
        };

        if !is_local_reference(dest_url) {
            continue;
        }

        let asset_path = base_dir.join(local_asset_path(dest_url));
        if !asset_path.is_file() {
            return Err(ContentError::MissingAsset {
                asset: asset_path,
                referenced_from: file_path.to_path_buf(),
            });
        }

        let asset = ContentAsset::new(asset_path, &ctx.assets_dir)?;
        *dest_url = asset.url().to_string().into();

        if !assets.contains(&asset) {
            assets.push(asset);
        }
    }

    Ok(assets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(serde::Deserialize, Debug)]
    struct PageContent {
        title: String,
        #[serde(default)]
        draft: bool,
    }

    #[test]
    fn test_render_markdown_heading_ids() {
        let html = render_markdown("# Hello, world!\n\n## Data\n\n## Data\n");

        assert!(html.contains("<h1 id=\"hello-world\">Hello, world!</h1>"));
        assert!(html.contains("<h2 id=\"data\">Data</h2>"));
        assert!(html.contains("<h2 id=\"data-1\">Data</h2>"));
    }

    #[test]
    fn test_render_markdown_explicit_heading_attributes() {
        let html = render_markdown("# Sources {#sources .lead}\n\n# Sources\n");

        assert!(html.contains("<h1 id=\"sources\" class=\"lead\">Sources</h1>"));
        assert!(html.contains("<h1 id=\"sources-1\">Sources</h1>"));
    }

    #[test]
    fn test_render_markdown_github_flavour() {
        let markdown = r#"| Region | Cases |
|--------|-------|
| East   | 12    |

~~old~~ new

- [x] done
"#;
        let html = render_markdown(markdown);

        assert!(html.contains("<table>"));
        assert!(html.contains("<td>East</td>"));
        assert!(html.contains("<del>old</del>"));
        assert!(html.contains("type=\"checkbox\""));
    }

    #[test]
    fn test_render_markdown_drops_frontmatter() {
        let html = render_markdown("---\ntitle: Hidden\n---\n\nVisible");

        assert!(!html.contains("Hidden"));
        assert!(html.contains("<p>Visible</p>"));
    }

    #[test]
    fn test_compile_collects_headings_and_frontmatter() {
        let compiled = compile_markdown(
            "---\ntitle: Team\n---\n# Our team\n\n## Developers\n\n### `core`\n",
            None,
            &ContentContext::default(),
        )
        .unwrap();

        assert_eq!(compiled.title(), Some("Our team"));
        assert_eq!(
            compiled.headings,
            vec![
                MarkdownHeading {
                    title: "Our team".to_string(),
                    id: "our-team".to_string(),
                    level: 1
                },
                MarkdownHeading {
                    title: "Developers".to_string(),
                    id: "developers".to_string(),
                    level: 2
                },
                MarkdownHeading {
                    title: "core".to_string(),
                    id: "core".to_string(),
                    level: 3
                },
            ]
        );

        let data = parse_frontmatter::<PageContent>(&compiled.frontmatter, Path::new("team.md")).unwrap();
        assert_eq!(data.title, "Team");
        assert!(!data.draft);
    }

    #[test]
    fn test_empty_frontmatter_is_an_empty_mapping() {
        let data = parse_frontmatter::<UntypedMarkdownContent>("", Path::new("a.md"));
        assert!(data.is_ok());
    }

    #[test]
    fn test_invalid_frontmatter() {
        let result = parse_frontmatter::<PageContent>("draft: true\n", Path::new("links.md"));
        assert!(matches!(result, Err(ContentError::Frontmatter { path, .. }) if path == Path::new("links.md")));
    }

    #[test]
    fn test_local_references() {
        assert!(is_local_reference("img/team.png"));
        assert!(is_local_reference("./team.png"));
        assert!(!is_local_reference("/static/team.png"));
        assert!(!is_local_reference("https://example.com/team.png"));
        assert!(!is_local_reference("data:image/png;base64,AAAA"));
    }

    #[test]
    fn test_local_asset_path_decodes_destination() {
        assert_eq!(local_asset_path("img/team%20photo.png"), "img/team photo.png");
        assert_eq!(local_asset_path("ob%C4%8Dine.png?v=2#top"), "občine.png");
        assert_eq!(local_asset_path("100%.png"), "100%.png");
    }

    #[test]
    fn test_compile_rewrites_image_references() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("img")).unwrap();
        std::fs::write(dir.path().join("img/team photo.png"), b"png").unwrap();
        let file = dir.path().join("team.md");

        let compiled = compile_markdown(
            "![The team](img/team%20photo.png)\n\n![Again](img/team%20photo.png)\n\n![Logo](https://example.com/logo.png)\n",
            Some(&file),
            &ContentContext::default(),
        )
        .unwrap();

        assert_eq!(compiled.assets.len(), 1);
        let asset = &compiled.assets[0];
        assert_eq!(asset.path, dir.path().join("img/team photo.png"));
        assert!(asset.url().starts_with("/_vitrina/team photo."));
        assert!(compiled.html.contains("src=\"/_vitrina/team%20photo."));
        assert!(compiled.html.contains("src=\"https://example.com/logo.png\""));
    }

    #[test]
    fn test_compile_resolves_non_ascii_file_names() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("občine.png"), b"png").unwrap();
        let file = dir.path().join("map.md");

        let compiled =
            compile_markdown("![Zemljevid](občine.png)", Some(&file), &ContentContext::default()).unwrap();

        assert_eq!(compiled.assets.len(), 1);
        assert_eq!(compiled.assets[0].path, dir.path().join("občine.png"));
        assert!(compiled.html.contains("src=\"/_vitrina/ob%C4%8Dine."));
    }

    #[test]
    fn test_compile_resolves_file_names_with_ampersands() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a&b.png"), b"png").unwrap();
        let file = dir.path().join("data.md");

        let compiled = compile_markdown("![x](a&b.png)", Some(&file), &ContentContext::default()).unwrap();

        assert_eq!(compiled.assets[0].path, dir.path().join("a&b.png"));
        assert!(compiled.html.contains("src=\"/_vitrina/a&amp;b."));
    }

    #[test]
    fn test_compile_fails_on_missing_image() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("about.md");

        let result = compile_markdown("![Logo](logo.png)", Some(&file), &ContentContext::default());

        assert!(matches!(
            result,
            Err(ContentError::MissingAsset { asset, referenced_from })
                if asset == dir.path().join("logo.png") && referenced_from == file
        ));
    }
}
