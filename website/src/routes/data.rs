use vitrina::route::prelude::*;

use crate::layout::{SeoMeta, layout, mount_point};

pub struct DataPage;

impl Route for DataPage {
    fn render(&self, ctx: &mut PageContext) -> impl Into<RenderResult> {
        layout(mount_point("DataPage"), ctx, SeoMeta::new("Podatki"))
    }
}
