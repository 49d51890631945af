//! Core traits and structs to define the route table and the pages of your website.
//!
//! A website is an ordered list of [`RouteRecord`]s. Each record maps a path to a page component (any type
//! implementing [`Route`]) with optional static props, or redirects to another path. Records are passed to
//! [`coronate()`](crate::coronate) through the [`routes!`](crate::routes) macro.
use crate::assets::PageAssets;
use crate::content::ContentSources;
use crate::errors::{RenderError, RouteError};
use crate::routing::{match_key, normalize_path};
use chrono::{DateTime, Local, Locale, TimeZone};
use rustc_hash::FxHashSet;
use std::any::Any;
use std::fmt;

/// The result of a page render, can be either text, raw bytes, or an error.
///
/// Typically used through the [`Into<RenderResult>`](std::convert::Into) implementations for common types.
/// End users should rarely need to interact with this enum directly.
pub enum RenderResult {
    Text(String),
    Raw(Vec<u8>),
    Err(RenderError),
}

impl<T> From<Result<T, RenderError>> for RenderResult
where
    T: Into<RenderResult>,
{
    fn from(val: Result<T, RenderError>) -> Self {
        match val {
            Ok(s) => s.into(),
            Err(e) => RenderResult::Err(e),
        }
    }
}

impl From<RenderResult> for Result<RenderResult, RenderError> {
    fn from(val: RenderResult) -> Self {
        match val {
            RenderResult::Err(e) => Err(e),
            _ => Ok(val),
        }
    }
}

impl From<String> for RenderResult {
    fn from(val: String) -> Self {
        RenderResult::Text(val)
    }
}

impl From<&str> for RenderResult {
    fn from(val: &str) -> Self {
        RenderResult::Text(val.to_string())
    }
}

impl From<Vec<u8>> for RenderResult {
    fn from(val: Vec<u8>) -> Self {
        RenderResult::Raw(val)
    }
}

impl From<&[u8]> for RenderResult {
    fn from(val: &[u8]) -> Self {
        RenderResult::Raw(val.to_vec())
    }
}

/// Type-erased static props attached to a route record.
pub type RouteProps = Box<dyn Any + Send + Sync>;

/// Must be implemented for every page component of your website.
///
/// ## Example
/// ```rust
/// use vitrina::route::prelude::*;
///
/// pub struct Index;
///
/// impl Route for Index {
///    fn render(&self, ctx: &mut PageContext) -> impl Into<RenderResult> {
///       "<h1>Hello, world!</h1>"
///   }
/// }
/// ```
pub trait Route {
    fn render(&self, ctx: &mut PageContext) -> impl Into<RenderResult>;
}

#[doc(hidden)]
/// Object-safe view of a [`Route`], implemented for every route automatically.
pub trait FullRoute: Send + Sync {
    /// Short type name of the component, e.g. `StaticPage`.
    fn component_name(&self) -> &'static str;

    fn render_internal(&self, ctx: &mut PageContext) -> RenderResult;
}

impl<R> FullRoute for R
where
    R: Route + Send + Sync + 'static,
{
    fn component_name(&self) -> &'static str {
        let full_name = std::any::type_name::<R>();
        full_name.rsplit("::").next().unwrap_or(full_name)
    }

    fn render_internal(&self, ctx: &mut PageContext) -> RenderResult {
        self.render(ctx).into()
    }
}

pub(crate) enum RouteTarget {
    Page {
        component: Box<dyn FullRoute>,
        props: Option<RouteProps>,
    },
    Redirect {
        to: String,
    },
}

/// A single entry of the route table: a path and what it leads to.
pub struct RouteRecord {
    pub(crate) path: String,
    pub(crate) target: RouteTarget,
}

impl RouteRecord {
    /// A page without props.
    pub fn page<P: Into<String>>(path: P, component: impl FullRoute + 'static) -> Self {
        Self {
            path: path.into(),
            target: RouteTarget::Page {
                component: Box::new(component),
                props: None,
            },
        }
    }

    /// A page receiving static props, which can be read back with [`PageContext::props`].
    pub fn page_with_props<P, Props>(
        path: P,
        component: impl FullRoute + 'static,
        props: Props,
    ) -> Self
    where
        P: Into<String>,
        Props: Any + Send + Sync,
    {
        Self {
            path: path.into(),
            target: RouteTarget::Page {
                component: Box::new(component),
                props: Some(Box::new(props)),
            },
        }
    }

    /// A path that sends the visitor to another path.
    pub fn redirect<P: Into<String>, T: Into<String>>(path: P, to: T) -> Self {
        Self {
            path: path.into(),
            target: RouteTarget::Redirect { to: to.into() },
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self.target, RouteTarget::Redirect { .. })
    }

    /// Target of a redirect record, as declared.
    pub fn redirect_target(&self) -> Option<&str> {
        match &self.target {
            RouteTarget::Redirect { to } => Some(to),
            RouteTarget::Page { .. } => None,
        }
    }

    pub fn component_name(&self) -> Option<&'static str> {
        match &self.target {
            RouteTarget::Page { component, .. } => Some(component.component_name()),
            RouteTarget::Redirect { .. } => None,
        }
    }
}

impl fmt::Debug for RouteRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            RouteTarget::Page { component, props } => f
                .debug_struct("RouteRecord")
                .field("path", &self.path)
                .field("component", &component.component_name())
                .field("has_props", &props.is_some())
                .finish(),
            RouteTarget::Redirect { to } => f
                .debug_struct("RouteRecord")
                .field("path", &self.path)
                .field("redirect", to)
                .finish(),
        }
    }
}

/// The validated, immutable route table.
#[derive(Debug)]
pub struct RouteTable {
    records: Vec<RouteRecord>,
}

impl RouteTable {
    /// Validates the records and builds the table. Declaration order is kept.
    pub fn new(records: Vec<RouteRecord>) -> Result<Self, RouteError> {
        let mut seen = FxHashSet::default();

        for record in &records {
            if !record.path.starts_with('/') {
                return Err(RouteError::InvalidPath {
                    path: record.path.clone(),
                });
            }

            if !seen.insert(match_key(&record.path)) {
                return Err(RouteError::DuplicatePath {
                    path: record.path.clone(),
                });
            }
        }

        Ok(Self { records })
    }

    pub fn records(&self) -> &[RouteRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn find(&self, key: &str) -> Option<&RouteRecord> {
        self.records
            .iter()
            .find(|record| match_key(&record.path) == key)
    }

    /// Selects the page a request path leads to, following redirects.
    ///
    /// ## Example
    /// ```rust
    /// use vitrina::route::{RouteRecord, RouteTable, Resolution};
    /// # use vitrina::route::prelude::*;
    /// # struct About;
    /// # impl Route for About {
    /// #   fn render(&self, _: &mut PageContext) -> impl Into<RenderResult> { "" }
    /// # }
    ///
    /// let table = RouteTable::new(vec![
    ///     RouteRecord::redirect("/", "/about"),
    ///     RouteRecord::page("/about", About),
    /// ]).unwrap();
    ///
    /// let resolution = table.resolve("/").unwrap();
    /// assert_eq!(resolution.page().unwrap().path(), "/about");
    /// ```
    pub fn resolve(&self, path: &str) -> Result<Resolution<'_>, RouteError> {
        let requested = normalize_path(path);
        let mut current = requested.clone();
        let mut redirected_from = Vec::new();
        let mut visited = FxHashSet::default();

        loop {
            let key = current.to_lowercase();

            if !visited.insert(key.clone()) {
                redirected_from.push(current);
                return Err(RouteError::RedirectLoop {
                    path: requested,
                    chain: redirected_from,
                });
            }

            let Some(record) = self.find(&key) else {
                return Ok(Resolution::NotFound {
                    path: current,
                    redirected_from,
                });
            };

            match &record.target {
                RouteTarget::Redirect { to } => {
                    redirected_from.push(record.path.clone());
                    current = normalize_path(to);
                }
                RouteTarget::Page { .. } => {
                    return Ok(Resolution::Page(ResolvedPage {
                        record,
                        redirected_from,
                    }));
                }
            }
        }
    }

    /// Returns the declared path of the record matching `path`, e.g. `/viz` -> `/Viz`.
    pub fn url_for(&self, path: &str) -> Option<&str> {
        self.find(&match_key(path)).map(|record| record.path.as_str())
    }
}

/// Outcome of [`RouteTable::resolve`].
#[derive(Debug)]
pub enum Resolution<'a> {
    Page(ResolvedPage<'a>),
    /// No record matches. Rendering falls through to the site's 404 page, if any.
    NotFound {
        path: String,
        redirected_from: Vec<String>,
    },
}

impl<'a> Resolution<'a> {
    pub fn page(&self) -> Option<&ResolvedPage<'a>> {
        match self {
            Resolution::Page(page) => Some(page),
            Resolution::NotFound { .. } => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Resolution::NotFound { .. })
    }
}

/// A page selected by the dispatcher, together with its static props.
#[derive(Debug)]
pub struct ResolvedPage<'a> {
    record: &'a RouteRecord,
    /// Paths of the redirects followed to get here, in order.
    pub redirected_from: Vec<String>,
}

impl<'a> ResolvedPage<'a> {
    pub fn path(&self) -> &'a str {
        &self.record.path
    }

    pub fn record(&self) -> &'a RouteRecord {
        self.record
    }

    pub fn component(&self) -> &'a dyn FullRoute {
        match &self.record.target {
            RouteTarget::Page { component, .. } => component.as_ref(),
            RouteTarget::Redirect { .. } => unreachable!("redirects are followed during resolution"),
        }
    }

    pub fn component_name(&self) -> &'static str {
        self.component().component_name()
    }

    pub(crate) fn raw_props(&self) -> Option<&'a (dyn Any + Send + Sync)> {
        match &self.record.target {
            RouteTarget::Page { props, .. } => props.as_deref(),
            RouteTarget::Redirect { .. } => None,
        }
    }

    /// Typed access to the static props. Returns `None` if there are none or if they are of another type.
    pub fn props<T: 'static>(&self) -> Option<&'a T> {
        self.raw_props().and_then(|props| props.downcast_ref::<T>())
    }

    pub fn is_redirected(&self) -> bool {
        !self.redirected_from.is_empty()
    }
}

/// Allows to access props, content and assets in a [`Route`] implementation.
///
/// ## Example
/// ```rust
/// use vitrina::route::prelude::*;
///
/// #[derive(Debug)]
/// pub struct Greeting {
///     pub name: &'static str,
/// }
///
/// pub struct Hello;
///
/// impl Route for Hello {
///   fn render(&self, ctx: &mut PageContext) -> impl Into<RenderResult> {
///     render_hello(ctx)
///   }
/// }
///
/// fn render_hello(ctx: &mut PageContext) -> Result<String, RenderError> {
///   let greeting = ctx.props::<Greeting>()?;
///   Ok(format!("<h1>Hello, {}!</h1>", greeting.name))
/// }
/// ```
pub struct PageContext<'a> {
    pub props: Option<&'a (dyn Any + Send + Sync)>,
    pub content: &'a ContentSources,
    pub assets: &'a mut PageAssets,
    pub routes: &'a RouteTable,
    /// The path being rendered, as declared in the route table, e.g. `/about`.
    pub current_path: &'a str,
    /// The base URL as defined in [`BuildOptions::base_url`](crate::BuildOptions::base_url)
    pub base_url: &'a Option<String>,
    pub locale: Locale,
    /// Moment the build started. Shared by every page of a build.
    pub built_at: &'a DateTime<Local>,
}

impl<'a> PageContext<'a> {
    pub fn props<T: 'static>(&self) -> Result<&'a T, RouteError> {
        let props = self.props.ok_or_else(|| RouteError::MissingProps {
            path: self.current_path.to_string(),
            expected: std::any::type_name::<T>(),
        })?;

        props
            .downcast_ref::<T>()
            .ok_or_else(|| RouteError::PropsMismatch {
                path: self.current_path.to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    /// Returns the canonical URL for the current page. If [`BuildOptions::base_url`](crate::BuildOptions::base_url) is not set, this will return `None`.
    pub fn canonical_url(&self) -> Option<String> {
        self.base_url
            .as_ref()
            .map(|base| format!("{}{}", base.trim_end_matches('/'), self.current_path))
    }

    /// Whether `path` leads to the page being rendered. Useful to highlight the active navigation link.
    pub fn is_active(&self, path: &str) -> bool {
        match self.routes.resolve(path) {
            Ok(Resolution::Page(page)) => match_key(page.path()) == match_key(self.current_path),
            _ => false,
        }
    }

    /// Formats a date with the locale configured in [`BuildOptions::locale`](crate::BuildOptions::locale).
    pub fn format_date<Tz>(&self, date: &DateTime<Tz>, format: &str) -> String
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        date.format_localized(format, self.locale).to_string()
    }
}

pub mod prelude {
    //! Re-exports of the most commonly used types and traits for defining pages.
    //!
    //! This module is meant to be glob imported in your page files.
    //!
    //! ## Example
    //! ```rust
    //! use vitrina::route::prelude::*;
    //! ```
    pub use super::{FullRoute, PageContext, RenderResult, Route, RouteRecord};
    pub use crate::content::{ContentEntry, ContentRef, MarkdownHeading, UntypedMarkdownContent};
    pub use crate::errors::RenderError;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Home;

    impl Route for Home {
        fn render(&self, _ctx: &mut PageContext) -> impl Into<RenderResult> {
            "<h1>Home</h1>"
        }
    }

    struct Article;

    impl Route for Article {
        fn render(&self, ctx: &mut PageContext) -> impl Into<RenderResult> {
            render_article(ctx)
        }
    }

    fn render_article(ctx: &mut PageContext) -> Result<String, RenderError> {
        let slug = ctx.props::<ArticleProps>()?;
        Ok(format!("<h1>{}</h1>", slug.0))
    }

    #[derive(Debug, PartialEq)]
    struct ArticleProps(&'static str);

    fn table() -> RouteTable {
        RouteTable::new(vec![
            RouteRecord::redirect("/", "/home"),
            RouteRecord::page("/home", Home),
            RouteRecord::page_with_props("/Article", Article, ArticleProps("first")),
            RouteRecord::redirect("/old-home", "/"),
            RouteRecord::redirect("/gone", "/nowhere"),
        ])
        .unwrap()
    }

    #[test]
    fn test_table_keeps_declaration_order() {
        let table = table();
        let paths: Vec<_> = table.records().iter().map(|r| r.path()).collect();
        assert_eq!(paths, vec!["/", "/home", "/Article", "/old-home", "/gone"]);
    }

    #[test]
    fn test_table_rejects_relative_paths() {
        let result = RouteTable::new(vec![RouteRecord::page("home", Home)]);
        assert!(matches!(result, Err(RouteError::InvalidPath { path }) if path == "home"));
    }

    #[test]
    fn test_table_rejects_duplicates_case_insensitively() {
        let result = RouteTable::new(vec![
            RouteRecord::page("/Viz", Home),
            RouteRecord::page("/viz/", Home),
        ]);
        assert!(matches!(result, Err(RouteError::DuplicatePath { path }) if path == "/viz/"));
    }

    #[test]
    fn test_resolve_direct_page() {
        let table = table();
        let resolution = table.resolve("/home").unwrap();
        let page = resolution.page().unwrap();

        assert_eq!(page.path(), "/home");
        assert_eq!(page.component_name(), "Home");
        assert!(!page.is_redirected());
        assert!(page.props::<ArticleProps>().is_none());
    }

    #[test]
    fn test_resolve_follows_redirect() {
        let table = table();
        let resolution = table.resolve("/").unwrap();
        let page = resolution.page().unwrap();

        assert_eq!(page.path(), "/home");
        assert_eq!(page.redirected_from, vec!["/".to_string()]);
    }

    #[test]
    fn test_resolve_follows_redirect_chain() {
        let table = table();
        let resolution = table.resolve("/old-home").unwrap();
        let page = resolution.page().unwrap();

        assert_eq!(page.path(), "/home");
        assert_eq!(
            page.redirected_from,
            vec!["/old-home".to_string(), "/".to_string()]
        );
    }

    #[test]
    fn test_resolve_is_case_and_slash_insensitive() {
        let table = table();

        for path in ["/article", "/ARTICLE/", "/#/article", "/Article?ref=nav"] {
            let resolution = table.resolve(path).unwrap();
            assert_eq!(resolution.page().unwrap().path(), "/Article", "{path}");
        }
    }

    #[test]
    fn test_resolve_passes_props() {
        let table = table();
        let resolution = table.resolve("/article").unwrap();
        let page = resolution.page().unwrap();

        assert_eq!(page.props::<ArticleProps>(), Some(&ArticleProps("first")));
        assert!(page.props::<String>().is_none());
    }

    #[test]
    fn test_resolve_unmatched_path() {
        let table = table();
        let resolution = table.resolve("/missing").unwrap();

        assert!(resolution.is_not_found());
        assert!(matches!(
            resolution,
            Resolution::NotFound { path, redirected_from } if path == "/missing" && redirected_from.is_empty()
        ));
    }

    #[test]
    fn test_resolve_redirect_to_unmatched_path() {
        let table = table();
        let resolution = table.resolve("/gone").unwrap();

        assert!(matches!(
            resolution,
            Resolution::NotFound { path, redirected_from } if path == "/nowhere" && redirected_from == vec!["/gone".to_string()]
        ));
    }

    #[test]
    fn test_resolve_detects_redirect_loops() {
        let table = RouteTable::new(vec![
            RouteRecord::redirect("/a", "/b"),
            RouteRecord::redirect("/b", "/A/"),
        ])
        .unwrap();

        let error = table.resolve("/a").unwrap_err();
        assert!(matches!(
            &error,
            RouteError::RedirectLoop { path, chain } if path == "/a" && chain.len() == 3
        ));
        assert_eq!(
            error.to_string(),
            "Redirect loop while resolving `/a`: /a -> /b -> /A"
        );
    }

    #[test]
    fn test_url_for_returns_declared_path() {
        let table = table();
        assert_eq!(table.url_for("/article/"), Some("/Article"));
        assert_eq!(table.url_for("/missing"), None);
    }

    #[test]
    fn test_page_context_props() {
        let table = table();
        let content = ContentSources::new(vec![]);
        let mut assets = PageAssets::default();
        let built_at = Local::now();
        let resolution = table.resolve("/article").unwrap();
        let page = resolution.page().unwrap();

        let mut ctx = PageContext {
            props: page.raw_props(),
            content: &content,
            assets: &mut assets,
            routes: &table,
            current_path: page.path(),
            base_url: &Some("https://example.com/".to_string()),
            locale: Locale::sl_SI,
            built_at: &built_at,
        };

        assert_eq!(ctx.props::<ArticleProps>().unwrap().0, "first");
        assert!(matches!(
            ctx.props::<String>(),
            Err(RouteError::PropsMismatch { .. })
        ));
        assert_eq!(
            ctx.canonical_url().as_deref(),
            Some("https://example.com/Article")
        );
        assert!(ctx.is_active("/article"));
        assert!(!ctx.is_active("/home"));

        let rendered = page.component().render_internal(&mut ctx);
        assert!(matches!(rendered, RenderResult::Text(html) if html == "<h1>first</h1>"));
    }

    #[test]
    fn test_page_context_missing_props() {
        let table = table();
        let content = ContentSources::new(vec![]);
        let mut assets = PageAssets::default();
        let built_at = Local::now();

        let ctx = PageContext {
            props: None,
            content: &content,
            assets: &mut assets,
            routes: &table,
            current_path: "/home",
            base_url: &None,
            locale: Locale::sl_SI,
            built_at: &built_at,
        };

        assert!(matches!(
            ctx.props::<ArticleProps>(),
            Err(RouteError::MissingProps { path, .. }) if path == "/home"
        ));
        assert_eq!(ctx.canonical_url(), None);
    }

    #[test]
    fn test_format_date_uses_locale() {
        let table = table();
        let content = ContentSources::new(vec![]);
        let mut assets = PageAssets::default();
        let built_at = Local::now();

        let ctx = PageContext {
            props: None,
            content: &content,
            assets: &mut assets,
            routes: &table,
            current_path: "/home",
            base_url: &None,
            locale: Locale::sl_SI,
            built_at: &built_at,
        };

        let date = chrono::Utc.with_ymd_and_hms(2020, 3, 12, 10, 0, 0).unwrap();
        assert_eq!(ctx.format_date(&date, "%B"), "marec");
    }
}
