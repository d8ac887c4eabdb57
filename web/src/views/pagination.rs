//! Shared pagination control.
//!
//! Given the backend's pagination metadata, computes the truncated page-number
//! sequence and renders it as links that keep the current query string.

use crate::backend::models::Pagination;
use crate::utils::{escape_html, with_query_param};

/// Up to this many pages are shown without truncation.
const MAX_UNTRUNCATED: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(u32),
    Ellipsis,
}

/// First page, ellipsis, a window around `current`, ellipsis, last page.
pub fn page_sequence(current: u32, total: u32) -> Vec<PageItem> {
    if total == 0 {
        return Vec::new();
    }
    if total <= MAX_UNTRUNCATED {
        return (1..=total).map(PageItem::Page).collect();
    }

    let current = current.clamp(1, total);
    let mut items = vec![PageItem::Page(1)];

    if current <= 3 {
        items.extend((2..=4).map(PageItem::Page));
        items.push(PageItem::Ellipsis);
    } else if current >= total - 2 {
        items.push(PageItem::Ellipsis);
        items.extend((total - 3..total).map(PageItem::Page));
    } else {
        items.push(PageItem::Ellipsis);
        items.extend((current - 1..=current + 1).map(PageItem::Page));
        items.push(PageItem::Ellipsis);
    }

    items.push(PageItem::Page(total));
    items
}

/// Renders the control. `current_url` is the page's path and query; links only
/// change its `page` parameter.
pub fn render_pagination(meta: &Pagination, current_url: &str) -> String {
    if meta.total_pages <= 1 {
        return String::new();
    }

    let link = |page: u32, label: &str, enabled: bool, active: bool| -> String {
        if !enabled {
            return format!(r#"<span class="page-link disabled">{}</span>"#, label);
        }
        let href = escape_html(&with_query_param(current_url, "page", &page.to_string()));
        let class = if active { "page-link active" } else { "page-link" };
        format!(r#"<a class="{}" href="{}">{}</a>"#, class, href, label)
    };

    let mut html = String::from(r#"<nav class="pagination" aria-label="Pagination">"#);
    html.push_str(&link(
        meta.page.saturating_sub(1),
        "&laquo; Prev",
        meta.has_previous_page,
        false,
    ));

    for item in page_sequence(meta.page, meta.total_pages) {
        match item {
            PageItem::Page(n) => html.push_str(&link(n, &n.to_string(), true, n == meta.page)),
            PageItem::Ellipsis => html.push_str(r#"<span class="page-ellipsis">&hellip;</span>"#),
        }
    }

    html.push_str(&link(meta.page + 1, "Next &raquo;", meta.has_next_page, false));

    let (start, end) = meta.showing_range();
    html.push_str(&format!(
        r#"<span class="page-summary">Showing {}&ndash;{} of {}</span></nav>"#,
        start, end, meta.item_count
    ));
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use PageItem::{Ellipsis, Page};

    #[test]
    fn test_middle_page_has_window_and_both_ellipses() {
        assert_eq!(
            page_sequence(5, 10),
            vec![Page(1), Ellipsis, Page(4), Page(5), Page(6), Ellipsis, Page(10)]
        );
    }

    #[test]
    fn test_edges() {
        assert_eq!(
            page_sequence(1, 10),
            vec![Page(1), Page(2), Page(3), Page(4), Ellipsis, Page(10)]
        );
        assert_eq!(
            page_sequence(10, 10),
            vec![Page(1), Ellipsis, Page(7), Page(8), Page(9), Page(10)]
        );
        assert_eq!(
            page_sequence(8, 10),
            vec![Page(1), Ellipsis, Page(7), Page(8), Page(9), Page(10)]
        );
    }

    #[test]
    fn test_short_ranges_are_not_truncated() {
        assert_eq!(page_sequence(2, 3), vec![Page(1), Page(2), Page(3)]);
        assert_eq!(page_sequence(1, 7).len(), 7);
        assert!(page_sequence(1, 0).is_empty());
    }

    #[test]
    fn test_out_of_range_current_is_clamped() {
        assert_eq!(page_sequence(99, 10), page_sequence(10, 10));
    }

    #[test]
    fn test_render_keeps_query_and_marks_current_page() {
        let meta = Pagination {
            page: 2,
            limit: 10,
            item_count: 30,
            total_pages: 3,
            has_next_page: true,
            has_previous_page: true,
        };
        let html = render_pagination(&meta, "/?search=lekki&page=2");

        assert!(html.contains(r#"<a class="page-link active" href="/?search=lekki&amp;page=2">2</a>"#));
        assert!(html.contains(r#"href="/?search=lekki&amp;page=3">Next"#));
        assert!(html.contains("Showing 11&ndash;20 of 30"));
    }

    #[test]
    fn test_single_page_renders_nothing() {
        let meta = Pagination {
            page: 1,
            limit: 10,
            item_count: 4,
            total_pages: 1,
            has_next_page: false,
            has_previous_page: false,
        };
        assert!(render_pagination(&meta, "/").is_empty());
    }
}
