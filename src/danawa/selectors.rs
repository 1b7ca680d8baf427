//! CSS selectors for Danawa HTML parsing.
//!
//! All selectors used against the search results page live here.
//! Update this file when Danawa changes their HTML structure.
//!
//! **Update process**: When extraction starts returning the sentinel for a
//! field on every record, capture an HTML sample, update the selector, and
//! refresh `tests/fixtures/search_result.html`.

use scraper::Selector;
use std::sync::LazyLock;

/// Selectors for the search results list.
pub mod search {
    use super::*;

    /// Product container - one per result.
    pub static RESULT: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("div.prod_main_info").unwrap());

    /// Product title ("vendor + product name").
    pub static TITLE: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "div.prod_info > p > a, \
             p.prod_name > a",
        )
        .unwrap()
    });

    /// Lowest listed price.
    pub static PRICE: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "div.prod_pricelist > ul > li > p.price_sect > a > strong, \
             p.price_sect strong",
        )
        .unwrap()
    });

    /// Thumbnail image (lazy-loaded).
    pub static IMAGE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("div.thumb_image > a > img").unwrap());

    /// Image attributes in lookup order. `src` is usually a 1px placeholder
    /// until the lazy loader runs, so it comes last.
    pub static IMAGE_ATTRS: &[&str] = &["data-src", "data-original", "src"];

    /// Spec summary.
    pub static SPEC_INFO: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("div.spec_list").unwrap());

    /// Detail page link.
    pub static LINK: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "a.thumb_link, \
             div.prod_info > p > a",
        )
        .unwrap()
    });

    pub static LINK_ATTRS: &[&str] = &["href"];

    /// Registration month.
    pub static REGISTERED: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "div.prod_sub_info > div.prod_sub_meta > dl.meta_item.mt_date > dd, \
             dl.meta_item.mt_date > dd",
        )
        .unwrap()
    });

    /// Average rating.
    pub static RATING: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "dl.meta_item.mt_comment > dd > div.cnt_star > div.point_num > strong, \
             dl.meta_item.mt_comment div.point_num strong",
        )
        .unwrap()
    });

    /// Review count.
    pub static REVIEW_COUNT: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "dl.meta_item.mt_comment > dd > div.cnt_opinion > a > strong, \
             dl.meta_item.mt_comment div.cnt_opinion strong",
        )
        .unwrap()
    });
}

/// Selectors for the pagination block under the result list.
pub mod pagination {
    use super::*;

    /// Numbered page links.
    pub static PAGE_NUMBER: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "div.number_wrap a.num, \
             div.paging_number_wrap a.num, \
             div.number_wrap a",
        )
        .unwrap()
    });

    /// The "last page" shortcut, which carries the page in an attribute.
    /// The "next block" arrow (`a.nav_next`) also has a `data-page`, but it
    /// points at the first page of the next block and must not match here.
    pub static LAST_PAGE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("a.num_nav_last[data-page]").unwrap());
}

/// Selectors for detecting pages that are not result lists.
pub mod errors {
    use super::*;

    /// Captcha or bot-check form.
    pub static CAPTCHA: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "form[action*='captcha'], \
             img[src*='captcha'], \
             #captcha",
        )
        .unwrap()
    });

    /// Access-denied notice.
    pub static ACCESS_DENIED: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "div.access_denied, \
             div#errorPage",
        )
        .unwrap()
    });
}
