use maud::{DOCTYPE, Markup, html};
use vitrina::maud::generator;
use vitrina::route::PageContext;

mod navbar;

use navbar::navbar;

pub const SITE_NAME: &str = "Vitrina";

const BOOTSTRAP_CSS: &str = "https://cdn.jsdelivr.net/npm/bootstrap@4.5.3/dist/css/bootstrap.min.css";
const BOOTSTRAP_VUE_CSS: &str =
    "https://cdn.jsdelivr.net/npm/bootstrap-vue@2.21.2/dist/bootstrap-vue.min.css";

pub struct SeoMeta {
    pub title: String,
    pub description: Option<String>,
}

impl SeoMeta {
    pub fn new<T: Into<String>>(title: T) -> Self {
        Self {
            title: title.into(),
            description: None,
        }
    }

    fn render(&self, canonical_url: Option<String>) -> Markup {
        let formatted_title = format!("{} - {}", self.title, SITE_NAME);

        html! {
            title { (formatted_title) }
            @if let Some(description) = &self.description {
                meta name="description" content=(description);
            }
            @if let Some(canonical_url) = canonical_url {
                link rel="canonical" href=(canonical_url);
            }
        }
    }
}

/// Root view shared by every page: navigation, the page itself and the footer.
pub fn layout(main: Markup, ctx: &mut PageContext, seo: SeoMeta) -> Markup {
    ctx.assets.include_style(BOOTSTRAP_CSS);
    ctx.assets.include_style(BOOTSTRAP_VUE_CSS);

    let updated = ctx.format_date(ctx.built_at, "%-d. %B %Y");

    html! {
        (DOCTYPE)
        html lang="sl" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                (generator())
                (seo.render(ctx.canonical_url()))
            }
            body {
                div #app {
                    (navbar(ctx))
                    main.py-4 {
                        (main)
                    }
                    footer.border-top.py-3.text-muted {
                        div.container {
                            small { "Posodobljeno " time { (updated) } }
                        }
                    }
                }
            }
        }
    }
}

/// Empty element a client-side component mounts itself on.
pub fn mount_point(component: &str) -> Markup {
    html! {
        div.container {
            div data-component=(component) {
                noscript { "Za prikaz te strani je potreben JavaScript." }
            }
        }
    }
}
