use vitrina::route::prelude::*;

use crate::layout::{SeoMeta, layout, mount_point};

pub struct StatsPage;

impl Route for StatsPage {
    fn render(&self, ctx: &mut PageContext) -> impl Into<RenderResult> {
        let seo = SeoMeta {
            description: Some("Pregled zbranih številk.".to_string()),
            ..SeoMeta::new("Statistika")
        };

        layout(mount_point("StatsPage"), ctx, seo)
    }
}
