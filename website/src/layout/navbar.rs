use maud::{Markup, html};
use vitrina::route::PageContext;

use super::SITE_NAME;

/// Navigation entries, in display order.
const NAV_LINKS: [(&str, &str); 7] = [
    ("/about", "O projektu"),
    ("/stats", "Statistika"),
    ("/Viz", "Vizualizacije"),
    ("/data", "Podatki"),
    ("/map", "Zemljevid"),
    ("/links", "Povezave"),
    ("/team", "Ekipa"),
];

pub fn navbar(ctx: &PageContext) -> Markup {
    html! {
        nav.navbar.navbar-expand-lg.navbar-light.bg-light {
            div.container {
                a.navbar-brand href="/" { (SITE_NAME) }
                ul.navbar-nav.mr-auto {
                    @for (path, label) in NAV_LINKS {
                        @let active = ctx.is_active(path);
                        li.nav-item.active[active] {
                            a.nav-link href=(path) aria-current=[active.then_some("page")] { (label) }
                        }
                    }
                }
            }
        }
    }
}
