use maud::{Markup, html};
use vitrina::route::prelude::*;

use crate::content::PageContent;
use crate::layout::{SeoMeta, layout};

/// Props of a page whose body comes from a Markdown document.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticPageProps {
    /// Page name, also used as the class of the content container.
    pub name: &'static str,
    pub content: ContentRef,
}

pub struct StaticPage;

impl Route for StaticPage {
    fn render(&self, ctx: &mut PageContext) -> impl Into<RenderResult> {
        render_static_page(ctx)
    }
}

fn render_static_page(ctx: &mut PageContext) -> Result<Markup, RenderError> {
    let props = ctx.props::<StaticPageProps>()?;
    let entry = ctx.content.resolve::<PageContent>(&props.content)?;

    let title = entry
        .data
        .title
        .as_deref()
        .or_else(|| entry.title())
        .unwrap_or(props.name);

    let seo = SeoMeta {
        title: title.to_string(),
        description: entry.data.description.clone(),
    };

    Ok(layout(
        html! {
            div.container.static-page.(props.name) {
                (entry)
            }
        },
        ctx,
        seo,
    ))
}
