use vitrina::route::prelude::*;

use crate::layout::{SeoMeta, layout, mount_point};

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.7.1/dist/leaflet.css";

pub struct MapPage;

impl Route for MapPage {
    fn render(&self, ctx: &mut PageContext) -> impl Into<RenderResult> {
        // Tiles and markers are drawn client-side
        ctx.assets.include_style(LEAFLET_CSS);

        layout(mount_point("MapPage"), ctx, SeoMeta::new("Zemljevid"))
    }
}
