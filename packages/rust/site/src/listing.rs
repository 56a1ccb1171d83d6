//! Listing page markup.

use gazette_shared::{BasePath, IndexedDocument};
use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::PER_PAGE_OPTIONS;
use crate::paths::listing_href;

/// Navigates to the `data-href` of the chosen page-size option.
const PER_PAGE_SCRIPT: &str = r#"
document.getElementById('perPage').addEventListener('change', (e) => {
    const option = e.target.selectedOptions[0];
    if (option) window.location.href = option.dataset.href;
});
"#;

/// Everything one listing page needs.
pub(crate) struct ListingPage<'a> {
    pub base: &'a BasePath,
    pub title: &'a str,
    pub lang: &'a str,
    pub documents: &'a [IndexedDocument],
    pub per_page: usize,
    pub current_page: usize,
    pub total_pages: usize,
}

pub(crate) fn render(page: &ListingPage<'_>) -> String {
    let base = page.base;

    html! {
        (DOCTYPE)
        html lang=(page.lang) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (page.title) }
                link rel="stylesheet" href=(base.join("styles.css"));
            }
            body {
                div class="controls" {
                    input type="text" id="search" class="search-box"
                        placeholder="Search titles and content (separate keywords with spaces)";
                    label {
                        "Per page: "
                        select id="perPage" class="per-page" {
                            @for size in PER_PAGE_OPTIONS {
                                option value=(size)
                                    data-href=(listing_href(base, size, 1))
                                    selected[size == page.per_page] { (size) }
                            }
                        }
                    }
                }

                div class="articles" id="articleList" {
                    @for doc in page.documents {
                        (article_entry(base, doc))
                    }
                }

                div class="pagination" {
                    (pagination(page))
                }

                script src=(base.join("search.js")) {}
                script { (PreEscaped(PER_PAGE_SCRIPT)) }
            }
        }
    }
    .into_string()
}

fn article_entry(base: &BasePath, doc: &IndexedDocument) -> Markup {
    html! {
        div class="article" {
            a href=(base.join(&doc.url)) { (doc.title) }
            div class="date" { (doc.date) }
        }
    }
}

fn pagination(page: &ListingPage<'_>) -> Markup {
    let prev = (page.current_page > 1)
        .then(|| listing_href(page.base, page.per_page, page.current_page - 1));
    let next = (page.current_page < page.total_pages)
        .then(|| listing_href(page.base, page.per_page, page.current_page + 1));

    html! {
        (nav_link(prev.as_deref(), "prev", "Previous"))
        span class="page-status" {
            "Page " (page.current_page) " of " (page.total_pages)
        }
        (nav_link(next.as_deref(), "next", "Next"))
    }
}

fn nav_link(href: Option<&str>, rel: &str, label: &str) -> Markup {
    html! {
        @match href {
            Some(href) => a class="page-link" rel=(rel) href=(href) { (label) },
            None => span class="page-link disabled" aria-disabled="true" { (label) },
        }
    }
}
