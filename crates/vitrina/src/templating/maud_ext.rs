use maud::{Markup, PreEscaped, Render, html};

use crate::{
    GENERATOR,
    content::{CompiledMarkdown, ContentEntry},
    route::RenderResult,
};

/// Can be used to create a generator tag in the output HTML. See [`GENERATOR`](crate::GENERATOR).
pub fn generator() -> Markup {
    html! {
        meta name="generator" content=(GENERATOR);
    }
}

impl Render for CompiledMarkdown {
    fn render(&self) -> Markup {
        PreEscaped(self.html.clone())
    }
}

impl<T> Render for ContentEntry<T> {
    fn render(&self) -> Markup {
        self.compiled.render()
    }
}

impl From<maud::Markup> for RenderResult {
    fn from(val: maud::Markup) -> Self {
        RenderResult::Text(val.into_string())
    }
}
