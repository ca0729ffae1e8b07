//! Response headers for alerts and pagination
//!
//! Alert headers tell a client which entity changed:
//! `X-a5App-alert: a5App.blog.created` plus `X-a5App-params: 42`.
//!
//! Pagination headers carry the total and RFC 5988 links:
//! `X-Total-Count: 41` and
//! `Link: <...?page=1&size=20>; rel="next",<...>; rel="last",<...>; rel="first"`.

use axum::http::header::LINK;
use axum::http::{HeaderMap, HeaderName, HeaderValue};

use crate::models::Page;

/// Prefix of every alert key
pub const APPLICATION_NAME: &str = "a5App";

pub const ALERT: HeaderName = HeaderName::from_static("x-a5app-alert");
pub const ERROR: HeaderName = HeaderName::from_static("x-a5app-error");
pub const PARAMS: HeaderName = HeaderName::from_static("x-a5app-params");
pub const TOTAL_COUNT: HeaderName = HeaderName::from_static("x-total-count");

fn insert(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(_) => tracing::warn!(header = %name, "Dropping header with invalid value"),
    }
}

fn alert(message: &str, param: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    insert(&mut headers, ALERT, message);
    insert(&mut headers, PARAMS, param);
    headers
}

pub fn entity_creation_alert(entity: &str, param: &str) -> HeaderMap {
    alert(&format!("{APPLICATION_NAME}.{entity}.created"), param)
}

pub fn entity_update_alert(entity: &str, param: &str) -> HeaderMap {
    alert(&format!("{APPLICATION_NAME}.{entity}.updated"), param)
}

pub fn entity_deletion_alert(entity: &str, param: &str) -> HeaderMap {
    alert(&format!("{APPLICATION_NAME}.{entity}.deleted"), param)
}

pub fn failure_alert(entity: &str, error_key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    insert(&mut headers, ERROR, &format!("error.{error_key}"));
    insert(&mut headers, PARAMS, entity);
    headers
}

fn page_uri(base_url: &str, page: u64, size: u32, suffix: &str) -> String {
    format!("{base_url}?page={page}&size={size}{suffix}")
}

/// Links in the order next, prev, last, first.
fn link_header<T>(page: &Page<T>, base_url: &str, suffix: &str) -> String {
    let current = u64::from(page.page);
    let mut links = Vec::with_capacity(4);

    if page.has_next() {
        links.push(format!(
            "<{}>; rel=\"next\"",
            page_uri(base_url, current + 1, page.size, suffix)
        ));
    }
    if page.has_prev() {
        links.push(format!(
            "<{}>; rel=\"prev\"",
            page_uri(base_url, current - 1, page.size, suffix)
        ));
    }
    links.push(format!(
        "<{}>; rel=\"last\"",
        page_uri(base_url, page.last_page(), page.size, suffix)
    ));
    links.push(format!(
        "<{}>; rel=\"first\"",
        page_uri(base_url, 0, page.size, suffix)
    ));

    links.join(",")
}

fn pagination<T>(page: &Page<T>, base_url: &str, suffix: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(TOTAL_COUNT, HeaderValue::from(page.total_elements));
    insert(&mut headers, LINK, &link_header(page, base_url, suffix));
    headers
}

pub fn pagination_headers<T>(page: &Page<T>, base_url: &str) -> HeaderMap {
    pagination(page, base_url, "")
}

/// Same as [`pagination_headers`], with the URL-encoded query on every link.
pub fn search_pagination_headers<T>(query: &str, page: &Page<T>, base_url: &str) -> HeaderMap {
    let suffix = format!("&query={}", urlencoding::encode(query));
    pagination(page, base_url, &suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(total: u64, page: u32, size: u32) -> Page<()> {
        Page {
            content: vec![],
            total_elements: total,
            page,
            size,
        }
    }

    #[test]
    fn creation_alert() {
        let headers = entity_creation_alert("entry", "12");
        assert_eq!(headers[ALERT], "a5App.entry.created");
        assert_eq!(headers[PARAMS], "12");
    }

    #[test]
    fn update_and_deletion_alerts() {
        assert_eq!(entity_update_alert("blog", "1")[ALERT], "a5App.blog.updated");
        assert_eq!(entity_deletion_alert("blog", "1")[ALERT], "a5App.blog.deleted");
    }

    #[test]
    fn middle_page_links() {
        let headers = pagination_headers(&page(50, 1, 20), "/api/entries");
        assert_eq!(headers[TOTAL_COUNT], "50");
        assert_eq!(
            headers[LINK],
            "</api/entries?page=2&size=20>; rel=\"next\",\
             </api/entries?page=0&size=20>; rel=\"prev\",\
             </api/entries?page=2&size=20>; rel=\"last\",\
             </api/entries?page=0&size=20>; rel=\"first\""
        );
    }

    #[test]
    fn empty_result_links() {
        let headers = pagination_headers(&page(0, 0, 20), "/api/entries");
        assert_eq!(headers[TOTAL_COUNT], "0");
        assert_eq!(
            headers[LINK],
            "</api/entries?page=0&size=20>; rel=\"last\",\
             </api/entries?page=0&size=20>; rel=\"first\""
        );
    }

    #[test]
    fn search_links_carry_encoded_query() {
        let headers = search_pagination_headers("title:rust AND tags:async", &page(3, 0, 2), "/api/_search/entries");
        let link = headers[LINK].to_str().unwrap();
        assert!(link.starts_with(
            "</api/_search/entries?page=1&size=2&query=title%3Arust%20AND%20tags%3Aasync>; rel=\"next\""
        ));
        assert!(link.ends_with(
            "</api/_search/entries?page=0&size=2&query=title%3Arust%20AND%20tags%3Aasync>; rel=\"first\""
        ));
    }
}
