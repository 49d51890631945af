use std::path::PathBuf;

use chrono::Locale;

use crate::content::ContentContext;

/// Vitrina build options. Should be passed to [`coronate()`](crate::coronate()).
///
/// ## Examples
/// Default values:
/// ```rust,no_run
/// use vitrina::{content_sources, coronate, routes, BuildOptions, BuildOutput};
///
/// fn main() -> Result<BuildOutput, Box<dyn std::error::Error>> {
///   coronate(routes![], content_sources![], BuildOptions::default())
/// }
/// ```
/// Custom values:
/// ```rust,no_run
/// use vitrina::{content_sources, coronate, routes, BuildOptions, BuildOutput, Locale};
///
/// fn main() -> Result<BuildOutput, Box<dyn std::error::Error>> {
///   coronate(
///     routes![],
///     content_sources![],
///     BuildOptions {
///       output_dir: "public".into(),
///       locale: Locale::sl_SI,
///       ..Default::default()
///     },
///   )
/// }
/// ```
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Base URL for the site, e.g. `https://example.com`.
    /// Used to generate canonical URLs, see [`PageContext::canonical_url`](crate::route::PageContext::canonical_url).
    pub base_url: Option<String>,

    pub output_dir: PathBuf,

    /// Directory copied as-is into the output directory, if it exists.
    pub static_dir: PathBuf,

    /// Directory inside the output directory to place files referenced by content in.
    /// Defaults to `_vitrina`.
    pub assets_dir: PathBuf,

    /// Whether to clean the output directory before building.
    pub clean_output_dir: bool,

    /// Locale used by [`PageContext::format_date`](crate::route::PageContext::format_date).
    pub locale: Locale,
}

impl BuildOptions {
    /// The directory content assets are written to, e.g. `dist/_vitrina`.
    pub fn output_assets_dir(&self) -> PathBuf {
        self.output_dir.join(&self.assets_dir)
    }

    pub(crate) fn content_context(&self) -> ContentContext {
        ContentContext {
            assets_dir: self.assets_dir.clone(),
        }
    }
}

/// Provides default values for [`crate::coronate()`]. Designed to work for most projects.
impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            base_url: None,
            output_dir: "dist".into(),
            static_dir: "static".into(),
            assets_dir: "_vitrina".into(),
            clean_output_dir: true,
            locale: Locale::en_US,
        }
    }
}
