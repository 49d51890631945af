use vitrina::route::prelude::*;

use crate::layout::{SeoMeta, layout, mount_point};

pub struct VizPage;

impl Route for VizPage {
    fn render(&self, ctx: &mut PageContext) -> impl Into<RenderResult> {
        layout(mount_point("VizPage"), ctx, SeoMeta::new("Vizualizacije"))
    }
}
