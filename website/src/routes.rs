use vitrina::content::ContentRef;
use vitrina::route::RouteRecord;
use vitrina::routes;

use crate::content::PAGES;

mod data;
mod map;
mod not_found;
mod static_page;
mod stats;
mod viz;

pub use data::DataPage;
pub use map::MapPage;
pub use not_found::NotFound;
pub use static_page::{StaticPage, StaticPageProps};
pub use stats::StatsPage;
pub use viz::VizPage;

fn static_page(path: &'static str, name: &'static str) -> RouteRecord {
    RouteRecord::page_with_props(
        path,
        StaticPage,
        StaticPageProps {
            name,
            content: ContentRef::new(PAGES, name),
        },
    )
}

/// The site's route table. The first matching record wins.
pub fn route_table() -> Vec<RouteRecord> {
    routes![
        RouteRecord::redirect("/", "/about"),
        static_page("/about", "about"),
        RouteRecord::page("/stats", StatsPage),
        RouteRecord::page("/Viz", VizPage),
        RouteRecord::page("/data", DataPage),
        RouteRecord::page("/map", MapPage),
        static_page("/links", "links"),
        static_page("/team", "team"),
        RouteRecord::page("/404.html", NotFound),
    ]
}
