//! Error types for Vitrina.
use std::fmt::{self, Debug, Formatter};
use std::path::PathBuf;
use thiserror::Error;

macro_rules! impl_debug_for_error {
    ($($t:ty),*) => {
        $(
            impl Debug for $t {
                fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                    // Errors returned from main are printed with Debug, thiserror only implements Display.
                    write!(f, "{}", self)?;

                    let mut source = std::error::Error::source(self);
                    if source.is_some() {
                        write!(f, "\n\nCaused by:")?;
                    }
                    while let Some(cause) = source {
                        write!(f, "\n    {}", cause)?;
                        source = cause.source();
                    }
                    Ok(())
                }
            }
        )*
    };
}

/// Boxed error that page components may return from their render method.
pub type RenderError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error)]
pub enum RouteError {
    #[error("Route path `{path}` must start with `/`")]
    InvalidPath { path: String },

    #[error("Route `{path}` is declared more than once (paths are compared case-insensitively)")]
    DuplicatePath { path: String },

    #[error("Redirect loop while resolving `{path}`: {}", .chain.join(" -> "))]
    RedirectLoop { path: String, chain: Vec<String> },

    #[error("Route `{path}` was registered without props, but the page asked for `{expected}`")]
    MissingProps { path: String, expected: &'static str },

    #[error("Props of route `{path}` are not of type `{expected}`")]
    PropsMismatch { path: String, expected: &'static str },
}

#[derive(Error)]
pub enum ContentError {
    #[error("Content source `{name}` not found, or it holds a different entry type")]
    SourceNotFound { name: String },

    #[error("Entry `{id}` not found in content source `{source_name}`")]
    EntryNotFound { source_name: String, id: String },

    #[error("Invalid glob pattern `{pattern}`")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Failed to read content file: {path}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid frontmatter in {path}")]
    Frontmatter {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{referenced_from} references `{asset}`, but no such file exists")]
    MissingAsset {
        asset: PathBuf,
        referenced_from: PathBuf,
    },
}

#[derive(Error)]
pub enum BuildError {
    #[error(
        "`{route}` returns `RenderResult::Raw`, but includes styles or scripts, which can only be included in HTML. If you meant to return HTML, use `RenderResult::Text` instead."
    )]
    InvalidRenderResult { route: String },

    #[error("Failed to render `{route}`")]
    Render {
        route: String,
        #[source]
        source: RenderError,
    },

    #[error("Failed to inject assets into `{route}`")]
    Rewrite {
        route: String,
        #[source]
        source: lol_html::errors::RewritingError,
    },

    #[error("Failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error(transparent)]
    Content(#[from] ContentError),
}

impl_debug_for_error!(RouteError, ContentError, BuildError);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_lists_causes() {
        let error = BuildError::Render {
            route: "/about".to_string(),
            source: Box::new(ContentError::EntryNotFound {
                source_name: "pages".to_string(),
                id: "about".to_string(),
            }),
        };

        assert_eq!(
            format!("{:?}", error),
            "Failed to render `/about`\n\nCaused by:\n    Entry `about` not found in content source `pages`"
        );
    }

    #[test]
    fn test_debug_follows_transparent_variants() {
        let error = BuildError::Content(ContentError::ReadFailed {
            path: PathBuf::from("content/about.md"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        });

        let debug = format!("{:?}", error);
        assert!(debug.starts_with("Failed to read content file: content/about.md"));
        assert!(debug.ends_with("Caused by:\n    no such file"));
    }

    #[test]
    fn test_debug_without_source_is_display() {
        let error = RouteError::InvalidPath {
            path: "about".to_string(),
        };
        assert_eq!(format!("{:?}", error), error.to_string());
    }
}
