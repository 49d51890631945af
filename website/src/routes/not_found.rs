use maud::html;
use vitrina::route::prelude::*;

use crate::layout::{SeoMeta, layout};

pub struct NotFound;

impl Route for NotFound {
    fn render(&self, ctx: &mut PageContext) -> impl Into<RenderResult> {
        layout(
            html! {
                div.container.text-center {
                    h1.display-4 { "404" }
                    p.lead { "Strani, ki jo iščete, ni mogoče najti." }
                    a.btn.btn-primary href="/" { "Na prvo stran" }
                }
            },
            ctx,
            SeoMeta::new("Stran ne obstaja"),
        )
    }
}
