#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Modules the end-user will interact directly or indirectly with
pub mod assets;
pub mod content;
pub mod errors;
pub mod route;

mod routing;

// Exports for end-users
pub use build::metadata::{BuildOutput, ContentAssetOutput, PageOutput, StaticAssetOutput};
pub use build::options::BuildOptions;

// Re-export the locale type so that sites can configure date formatting without depending on chrono directly.
pub use chrono::Locale;

mod build;
mod templating;

#[cfg(feature = "maud")]
#[cfg_attr(docsrs, doc(cfg(feature = "maud")))]
pub mod maud {
    //! Traits and methods for [Maud](https://maud.lambda.xyz), a macro for writing HTML templates.
    //!
    //! ## Example
    //! ```rs
    //! use vitrina::route::prelude::*;
    //! use maud::{html, Markup};
    //!
    //! pub struct Index;
    //!
    //! impl Route for Index {
    //!   fn render(&self, ctx: &mut PageContext) -> impl Into<RenderResult> {
    //!     html! {
    //!       h1 { "Hello, world!" }
    //!     }
    //!   }
    //! }
    //! ```
    pub use crate::templating::maud_ext::*;
}

// Internal modules
mod logging;

use std::env;

use content::ContentSources;
use logging::init_logging;
use route::{RouteRecord, RouteTable};

/// Returns whether Vitrina is running in development mode (`VITRINA_DEV=true`).
pub fn is_dev() -> bool {
    if option_env!("VITRINA_DEV") == Some("true") {
        return true;
    }

    env::var("VITRINA_DEV").map(|v| v == "true").unwrap_or(false)
}

/// Collects the route records passed to [`coronate()`], keeping their declaration order.
///
/// Order matters: when two records could match the same request, the first one wins.
///
/// ## Example
/// ```rs
/// use vitrina::{content_sources, coronate, routes, BuildOptions, BuildOutput};
/// use vitrina::route::RouteRecord;
///
/// fn main() -> Result<BuildOutput, Box<dyn std::error::Error>> {
///     coronate(
///         routes![
///             RouteRecord::redirect("/", "/about"),
///             RouteRecord::page("/about", pages::About),
///         ],
///         content_sources![],
///         BuildOptions::default(),
///     )
/// }
/// ```
#[macro_export]
macro_rules! routes {
    [$($route:expr),* $(,)?] => {
        ::std::vec![$(::std::convert::Into::<$crate::route::RouteRecord>::into($route)),*]
    };
}

/// Helps to define all sources of content that should be loaded by [`coronate()`].
///
/// ## Example
/// ```rs
/// use vitrina::content_sources;
/// use vitrina::content::{glob_markdown, UntypedMarkdownContent};
///
/// content_sources![
///     "pages" => glob_markdown::<UntypedMarkdownContent>("content/*.md")
/// ];
/// ```
/// expands to
/// ```rs
/// vitrina::content::ContentSources::new(vec![
///     Box::new(vitrina::content::ContentSource::new("pages", glob_markdown::<UntypedMarkdownContent>("content/*.md")))
/// ]);
/// ```
#[macro_export]
macro_rules! content_sources {
    ($($name:expr => $loader:expr),* $(,)?) => {
        $crate::content::ContentSources::new(::std::vec![$(::std::boxed::Box::new($crate::content::ContentSource::new($name, $loader))),*])
    };
}

/// The version of Vitrina being used.
///
/// Can be used to create a generator tag in the output HTML.
pub const GENERATOR: &str = concat!("Vitrina v", env!("CARGO_PKG_VERSION"));

/// Vitrina entrypoint. Validates the route table, loads content and writes the site to [`BuildOptions::output_dir`].
///
/// ## Example
/// Should be called from the main function of the binary crate.
/// ```rs
/// use vitrina::{content_sources, coronate, routes, BuildOptions, BuildOutput};
///
/// fn main() -> Result<BuildOutput, Box<dyn std::error::Error>> {
///   coronate(routes![], content_sources![], BuildOptions::default())
/// }
/// ```
pub fn coronate(
    routes: Vec<RouteRecord>,
    mut content_sources: ContentSources,
    options: BuildOptions,
) -> Result<BuildOutput, Box<dyn std::error::Error>> {
    init_logging();

    let table = RouteTable::new(routes)?;

    Ok(build(&table, &mut content_sources, &options)?)
}

/// Runs a build without touching the global logger. [`coronate()`] is the usual entrypoint, this is mostly useful in tests.
pub fn build(
    table: &RouteTable,
    content_sources: &mut ContentSources,
    options: &BuildOptions,
) -> Result<BuildOutput, errors::BuildError> {
    build::execute_build(table, content_sources, options)
}
