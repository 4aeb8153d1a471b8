//! HTML pages rendered with maud.
//!
//! Every page shares [`layout`]: header with the navigation (links built from
//! the route table by name), the page body, and a footer. The gallery page
//! embeds one JSON image list per [`GallerySection`] and a small script that
//! turns each list into `<img>` elements.

use maud::{html, Markup, PreEscaped, DOCTYPE};

use super::handlers::AppState;
use super::routes::{reverse, Page, ROUTES};
use crate::gallery::images_in;

/// Site name shown in titles and the header.
pub const SITE_NAME: &str = "École Biblique";

/// Stylesheet path inside the static storage.
pub const STYLESHEET: &str = "css/style.css";

/// Navigation entries: route name and label.
const NAV: &[(&str, &str)] = &[
    ("index", "Accueil"),
    ("about", "À propos"),
    ("gallery", "Galerie"),
    ("ministeres", "Ministères"),
    ("evenements", "Événements"),
    ("contact", "Contact"),
];

/// A block of the gallery page fed by one static prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GallerySection {
    pub slug: &'static str,
    pub title: &'static str,
    pub prefix: &'static str,
}

/// Sections shown on the gallery page, in display order.
pub const GALLERY_SECTIONS: &[GallerySection] = &[
    GallerySection {
        slug: "ecole-primaire",
        title: "École primaire",
        prefix: "images/ecolePrimaire",
    },
    GallerySection {
        slug: "college",
        title: "Collège",
        prefix: "images/college",
    },
    GallerySection {
        slug: "vie-communautaire",
        title: "Vie communautaire",
        prefix: "images/gallery",
    },
];

const GALLERY_JS: &str = r#"
document.querySelectorAll('script[data-gallery-source]').forEach(function (source) {
  var grid = document.getElementById(source.dataset.gallerySource);
  if (!grid) { return; }
  JSON.parse(source.textContent).forEach(function (url) {
    var img = document.createElement('img');
    img.src = url;
    img.alt = '';
    img.loading = 'lazy';
    grid.appendChild(img);
  });
});
"#;

fn title_of(page: Page) -> &'static str {
    match page {
        Page::Index => "Accueil",
        Page::About => "À propos",
        Page::Gallery => "Galerie",
        Page::Ministeres => "Ministères",
        Page::Contact => "Contact",
        Page::Evenements => "Événements",
    }
}

fn route_name_of(page: Page) -> &'static str {
    ROUTES
        .iter()
        .find(|r| r.page == page)
        .map(|r| r.name)
        .unwrap_or("index")
}

/// Render the full HTML document for `page`.
pub fn render_page(page: Page, state: &AppState) -> Markup {
    let body = match page {
        Page::Index => index_body(),
        Page::About => about_body(),
        Page::Gallery => gallery_body(state),
        Page::Ministeres => ministeres_body(),
        Page::Contact => contact_body(),
        Page::Evenements => evenements_body(),
    };
    layout(state, title_of(page), Some(route_name_of(page)), body)
}

/// 404 page; in debug mode it also lists the known routes.
pub fn not_found(path: &str, state: &AppState) -> Markup {
    let body = html! {
        section.not-found {
            h1 { "Page introuvable" }
            p { "La page " code { (path) } " n'existe pas." }
            @if state.settings.debug {
                p { "Routes connues :" }
                ul.route-list {
                    @for route in ROUTES {
                        li { code { (route.path) } " [name='" (route.name) "']" }
                    }
                }
            }
        }
    };
    layout(state, "Page introuvable", None, body)
}

fn layout(state: &AppState, title: &str, active: Option<&str>, content: Markup) -> Markup {
    let stylesheet = state.storage.url(STYLESHEET);
    let home = reverse("index").unwrap_or("/");

    html! {
        (DOCTYPE)
        html lang="fr" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " | " (SITE_NAME) }
                link rel="stylesheet" href=(stylesheet);
            }
            body {
                header.site-header {
                    a.brand href=(home) { (SITE_NAME) }
                    nav {
                        ul {
                            @for (name, label) in NAV {
                                li {
                                    a.active[active == Some(*name)] href=(reverse(name).unwrap_or("/")) { (label) }
                                }
                            }
                        }
                    }
                }
                main { (content) }
                footer.site-footer {
                    p { "© " (SITE_NAME) }
                }
            }
        }
    }
}

fn index_body() -> Markup {
    html! {
        section.hero {
            h1 { "Bienvenue à l'" (SITE_NAME) }
            p { "Une école et une communauté au service des familles, fondées sur l'enseignement biblique." }
            a.button href=(reverse("about").unwrap_or("/")) { "Découvrir l'école" }
        }
    }
}

fn about_body() -> Markup {
    html! {
        section {
            h1 { "À propos" }
            p { "L'" (SITE_NAME) " accueille les élèves de l'école primaire et du collège dans un cadre bienveillant." }
            p { "Notre équipe pédagogique accompagne chaque enfant dans sa croissance scolaire, humaine et spirituelle." }
        }
    }
}

fn gallery_body(state: &AppState) -> Markup {
    let storage = state.storage.as_ref();
    html! {
        h1 { "Galerie" }
        @for section in GALLERY_SECTIONS {
            section.gallery-section {
                h2 { (section.title) }
                div.gallery-grid id=(section.slug) {}
                script type="application/json" data-gallery-source=(section.slug) {
                    (images_in(storage, section.prefix))
                }
            }
        }
        script { (PreEscaped(GALLERY_JS)) }
    }
}

fn ministeres_body() -> Markup {
    html! {
        section {
            h1 { "Ministères" }
            ul.ministries {
                li { h2 { "Enfance" } p { "Clubs bibliques et activités pour les plus jeunes." } }
                li { h2 { "Jeunesse" } p { "Rencontres, camps et accompagnement des adolescents." } }
                li { h2 { "Familles" } p { "Soutien aux parents et temps de partage." } }
            }
        }
    }
}

fn contact_body() -> Markup {
    html! {
        section {
            h1 { "Contact" }
            p { "Pour toute question sur les inscriptions ou la vie de l'école, écrivez-nous ou passez nous voir." }
            address {
                (SITE_NAME) br;
                "Secrétariat ouvert du lundi au vendredi, de 8h30 à 16h30."
            }
        }
    }
}

fn evenements_body() -> Markup {
    html! {
        section {
            h1 { "Événements" }
            p { "Retrouvez ici les fêtes de l'école, les cultes et les rencontres à venir." }
        }
    }
}
