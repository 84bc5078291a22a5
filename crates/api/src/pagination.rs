//! Pagination envelopes and query parsing.
//!
//! Two styles are served: page-number pagination for recipe listings
//! (`page` + `limit`) and limit/offset pagination for user listings
//! (`limit` + `offset`). Both produce the same `{count, next, previous,
//! results}` envelope with absolute link URLs.

use axum::http::Uri;
use ladle_common::{AppError, AppResult};
use serde::Serialize;
use url::Url;

/// Page size applied when the client does not send a valid `limit`.
pub const DEFAULT_PAGE_SIZE: u64 = 6;

/// Paginated response envelope.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    /// Total number of items across all pages.
    pub count: u64,
    /// Absolute URL of the next page, if any.
    pub next: Option<String>,
    /// Absolute URL of the previous page, if any.
    pub previous: Option<String>,
    /// Items of the current page.
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    /// Build a page-number envelope.
    ///
    /// The first page is 1 and may be empty; any page past the last one
    /// is a 404. The previous link of page 2 drops the `page` parameter
    /// instead of spelling out `page=1`.
    pub fn by_page(
        url: &Url,
        count: u64,
        page: u64,
        page_size: u64,
        results: Vec<T>,
    ) -> AppResult<Self> {
        let last_page = count.div_ceil(page_size).max(1);
        if page == 0 || page > last_page {
            return Err(AppError::NotFound(format!(
                "page {page} of {last_page}"
            )));
        }

        let next = (page < last_page)
            .then(|| with_query_param(url, "page", &(page + 1).to_string()).into());
        let previous = (page > 1).then(|| {
            if page == 2 {
                without_query_param(url, "page").into()
            } else {
                with_query_param(url, "page", &(page - 1).to_string()).into()
            }
        });

        Ok(Self {
            count,
            next,
            previous,
            results,
        })
    }

    /// Build a limit/offset envelope.
    ///
    /// Out-of-range offsets are not an error, they yield an empty page.
    /// A previous link that would land on offset 0 drops the `offset`
    /// parameter.
    #[must_use]
    pub fn by_slice(url: &Url, count: u64, limit: u64, offset: u64, results: Vec<T>) -> Self {
        let limited = with_query_param(url, "limit", &limit.to_string());

        let next = (offset + limit < count)
            .then(|| with_query_param(&limited, "offset", &(offset + limit).to_string()).into());
        let previous = (offset > 0).then(|| {
            if offset > limit {
                with_query_param(&limited, "offset", &(offset - limit).to_string()).into()
            } else {
                without_query_param(&limited, "offset").into()
            }
        });

        Self {
            count,
            next,
            previous,
            results,
        }
    }
}

/// Absolute URL of the current request, built from the configured
/// public server URL and the request's path and query.
pub fn request_url(server_url: &str, uri: &Uri) -> AppResult<Url> {
    let mut url = Url::parse(server_url)
        .map_err(|e| AppError::Config(format!("invalid server url {server_url}: {e}")))?;
    url.set_path(uri.path());
    url.set_query(uri.query());
    Ok(url)
}

/// Parse the 1-based `page` parameter. A missing parameter means page 1;
/// anything that is not a positive integer is a 404 like any other page
/// that does not exist.
pub fn page_param(raw: Option<&str>) -> AppResult<u64> {
    match raw {
        None => Ok(1),
        Some(s) => match s.parse::<u64>() {
            Ok(n) if n >= 1 => Ok(n),
            _ => Err(AppError::NotFound(format!("invalid page {s:?}"))),
        },
    }
}

/// Parse the `limit` parameter, falling back to [`DEFAULT_PAGE_SIZE`]
/// when absent or not a positive integer.
#[must_use]
pub fn limit_param(raw: Option<&str>) -> u64 {
    raw.and_then(|s| s.parse::<u64>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_PAGE_SIZE)
}

/// Parse the `offset` parameter, defaulting to 0.
#[must_use]
pub fn offset_param(raw: Option<&str>) -> u64 {
    raw.and_then(|s| s.parse::<u64>().ok()).unwrap_or(0)
}

/// Rewrite `key` to `value` in the URL's query string, appending it when
/// absent.
fn with_query_param(url: &Url, key: &str, value: &str) -> Url {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != key)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut out = url.clone();
    {
        let mut pairs = out.query_pairs_mut();
        pairs.clear();
        for (k, v) in &kept {
            pairs.append_pair(k, v);
        }
        pairs.append_pair(key, value);
    }
    out
}

/// Drop `key` from the URL's query string, removing the `?` entirely when
/// nothing else remains.
fn without_query_param(url: &Url, key: &str) -> Url {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != key)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut out = url.clone();
    if kept.is_empty() {
        out.set_query(None);
    } else {
        let mut pairs = out.query_pairs_mut();
        pairs.clear();
        for (k, v) in &kept {
            pairs.append_pair(k, v);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_first_page_links() {
        let page = Paginated::by_page(
            &url("http://localhost:3000/api/recipes/"),
            13,
            1,
            6,
            vec![1, 2, 3, 4, 5, 6],
        )
        .unwrap();

        assert_eq!(page.count, 13);
        assert_eq!(
            page.next.as_deref(),
            Some("http://localhost:3000/api/recipes/?page=2")
        );
        assert_eq!(page.previous, None);
    }

    #[test]
    fn test_second_page_previous_drops_page_param() {
        let page = Paginated::by_page(
            &url("http://localhost:3000/api/recipes/?page=2"),
            13,
            2,
            6,
            vec![7, 8, 9, 10, 11, 12],
        )
        .unwrap();

        assert_eq!(
            page.next.as_deref(),
            Some("http://localhost:3000/api/recipes/?page=3")
        );
        assert_eq!(
            page.previous.as_deref(),
            Some("http://localhost:3000/api/recipes/")
        );
    }

    #[test]
    fn test_page_links_keep_filter_params() {
        let page = Paginated::by_page(
            &url("http://localhost:3000/api/recipes/?author=u1&page=2"),
            20,
            2,
            6,
            vec![0; 6],
        )
        .unwrap();

        assert_eq!(
            page.next.as_deref(),
            Some("http://localhost:3000/api/recipes/?author=u1&page=3")
        );
        assert_eq!(
            page.previous.as_deref(),
            Some("http://localhost:3000/api/recipes/?author=u1")
        );
    }

    #[test]
    fn test_page_past_the_end_is_not_found() {
        let err = Paginated::by_page(
            &url("http://localhost:3000/api/recipes/?page=9"),
            13,
            9,
            6,
            Vec::<i32>::new(),
        )
        .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_empty_first_page_is_valid() {
        let page = Paginated::by_page(
            &url("http://localhost:3000/api/recipes/"),
            0,
            1,
            6,
            Vec::<i32>::new(),
        )
        .unwrap();

        assert_eq!(page.count, 0);
        assert_eq!(page.next, None);
        assert_eq!(page.previous, None);
    }

    #[test]
    fn test_slice_first_window() {
        let page = Paginated::by_slice(&url("http://localhost:3000/api/users/"), 10, 6, 0, vec![0; 6]);

        assert_eq!(
            page.next.as_deref(),
            Some("http://localhost:3000/api/users/?limit=6&offset=6")
        );
        assert_eq!(page.previous, None);
    }

    #[test]
    fn test_slice_previous_drops_offset_at_start() {
        let page = Paginated::by_slice(&url("http://localhost:3000/api/users/?limit=6&offset=6"), 10, 6, 6, vec![0; 4]);

        assert_eq!(page.next, None);
        assert_eq!(
            page.previous.as_deref(),
            Some("http://localhost:3000/api/users/?limit=6")
        );
    }

    #[test]
    fn test_slice_middle_window() {
        let page = Paginated::by_slice(
            &url("http://localhost:3000/api/users/?limit=5&offset=10"),
            20,
            5,
            10,
            vec![0; 5],
        );

        assert_eq!(
            page.next.as_deref(),
            Some("http://localhost:3000/api/users/?limit=5&offset=15")
        );
        assert_eq!(
            page.previous.as_deref(),
            Some("http://localhost:3000/api/users/?limit=5&offset=5")
        );
    }

    #[test]
    fn test_page_param_parsing() {
        assert_eq!(page_param(None).unwrap(), 1);
        assert_eq!(page_param(Some("3")).unwrap(), 3);
        assert!(page_param(Some("0")).is_err());
        assert!(page_param(Some("abc")).is_err());
    }

    #[test]
    fn test_limit_and_offset_params() {
        assert_eq!(limit_param(None), DEFAULT_PAGE_SIZE);
        assert_eq!(limit_param(Some("10")), 10);
        assert_eq!(limit_param(Some("0")), DEFAULT_PAGE_SIZE);
        assert_eq!(limit_param(Some("abc")), DEFAULT_PAGE_SIZE);
        assert_eq!(offset_param(None), 0);
        assert_eq!(offset_param(Some("12")), 12);
        assert_eq!(offset_param(Some("-3")), 0);
    }

    #[test]
    fn test_request_url_joins_path_and_query() {
        let uri: Uri = "/api/users/?limit=2&offset=4".parse().unwrap();
        let built = request_url("http://localhost:3000", &uri).unwrap();

        assert_eq!(
            built.as_str(),
            "http://localhost:3000/api/users/?limit=2&offset=4"
        );
    }
}
