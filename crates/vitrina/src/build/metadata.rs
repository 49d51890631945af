use std::{path::PathBuf, process::Termination, time::Instant};

/// Metadata returned by [`coronate()`](crate::coronate) for a single route after a successful build.
#[derive(Debug)]
pub struct PageOutput {
    /// Path of the route, as declared in the route table.
    pub route: String,
    pub file_path: PathBuf,
    /// Component that rendered the page, `None` for redirects.
    pub component: Option<&'static str>,
    /// Final path a redirect leads to.
    pub redirect_to: Option<String>,
}

/// Metadata returned by [`coronate()`](crate::coronate) for a file referenced by content.
#[derive(Debug)]
pub struct ContentAssetOutput {
    pub file_path: PathBuf,
    pub original_path: PathBuf,
}

/// Metadata returned by [`coronate()`](crate::coronate) for a single static asset after a successful build.
///
/// A static asset is a file that is copied to the output directory without any processing.
#[derive(Debug)]
pub struct StaticAssetOutput {
    pub file_path: PathBuf,
    pub original_path: PathBuf,
}

/// Metadata returned by [`coronate()`](crate::coronate) after a successful build.
#[derive(Debug)]
pub struct BuildOutput {
    pub start_time: Instant,
    pub pages: Vec<PageOutput>,
    /// Lower-cased copies of mixed-case routes, redirecting to the declared path.
    pub aliases: Vec<PageOutput>,
    pub assets: Vec<ContentAssetOutput>,
    pub static_files: Vec<StaticAssetOutput>,
}

impl BuildOutput {
    pub fn new(start_time: Instant) -> Self {
        Self {
            start_time,
            pages: Vec::new(),
            aliases: Vec::new(),
            assets: Vec::new(),
            static_files: Vec::new(),
        }
    }

    pub(crate) fn add_page(&mut self, page: PageOutput) {
        self.pages.push(page);
    }

    pub(crate) fn add_alias(&mut self, alias: PageOutput) {
        self.aliases.push(alias);
    }

    pub(crate) fn add_asset(&mut self, file_path: PathBuf, original_path: PathBuf) {
        self.assets.push(ContentAssetOutput {
            file_path,
            original_path,
        });
    }

    pub(crate) fn add_static_file(&mut self, file_path: PathBuf, original_path: PathBuf) {
        self.static_files.push(StaticAssetOutput {
            file_path,
            original_path,
        });
    }

    /// Returns the output of the route declared at `route`.
    pub fn page(&self, route: &str) -> Option<&PageOutput> {
        self.pages.iter().find(|page| page.route == route)
    }
}

impl Default for BuildOutput {
    fn default() -> Self {
        Self::new(Instant::now())
    }
}

impl Termination for BuildOutput {
    fn report(self) -> std::process::ExitCode {
        0.into()
    }
}
