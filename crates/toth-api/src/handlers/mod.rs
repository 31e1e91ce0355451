//! HTTP handlers for toth-api.

pub mod ccps;
pub mod documents;
pub mod evaluations;
pub mod health;

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

use toth_core::Page;

pub const X_TOTAL_COUNT: HeaderName = HeaderName::from_static("x-total-count");

/// Pagination headers for a list response: `X-Total-Count` plus an RFC 5988
/// `Link` header with `next`, `prev`, `last` and `first` relations.
pub fn pagination_headers<T>(base_path: &str, page: &Page<T>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(X_TOTAL_COUNT, HeaderValue::from(page.total));

    let link = |index: i64, rel: &str| {
        format!(
            "<{}?page={}&size={}>; rel=\"{}\"",
            base_path, index, page.size, rel
        )
    };

    let last_page = page.total_pages() - 1;
    let mut links = Vec::with_capacity(4);
    if page.has_next() {
        links.push(link(page.page + 1, "next"));
    }
    if page.page > 0 {
        links.push(link(page.page - 1, "prev"));
    }
    links.push(link(last_page, "last"));
    links.push(link(0, "first"));

    if let Ok(value) = HeaderValue::from_str(&links.join(",")) {
        headers.insert(header::LINK, value);
    }
    headers
}

/// `Location` header for a newly created resource.
pub fn location_header(base_path: &str, id: i64) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&format!("{}/{}", base_path, id)) {
        headers.insert(header::LOCATION, value);
    }
    headers
}
