//! Navigable location and the query-string rewrite applied on search

use std::sync::Mutex;
use url::Url;
use url::form_urlencoded;

/// Query parameter carrying the search term
pub const QUERY_PARAM: &str = "query";

/// Query parameter carrying the current page
pub const PAGE_PARAM: &str = "page";

/// The current navigable location
///
/// `replace` swaps the current history entry; it never pushes a new one.
pub trait Location: Send + Sync {
    fn path(&self) -> String;

    fn query_pairs(&self) -> Vec<(String, String)>;

    fn replace(&self, path_with_query: &str);
}

/// Set `key` to `value`, keeping its position if present
fn set_param(pairs: &mut Vec<(String, String)>, key: &str, value: &str) {
    match pairs.iter().position(|(k, _)| k == key) {
        Some(first) => {
            pairs[first].1 = value.to_string();
            let mut index = 0;
            pairs.retain(|(k, _)| {
                let keep = index <= first || k != key;
                index += 1;
                keep
            });
        }
        None => pairs.push((key.to_string(), value.to_string())),
    }
}

/// Query string for `term`, derived from the current parameters
///
/// `page` is always reset to `1`. An empty term drops `query` entirely;
/// every other parameter is carried over in order.
pub fn reflect(pairs: &[(String, String)], term: &str) -> String {
    let mut pairs = pairs.to_vec();
    set_param(&mut pairs, PAGE_PARAM, "1");

    if term.is_empty() {
        pairs.retain(|(k, _)| k != QUERY_PARAM);
    } else {
        set_param(&mut pairs, QUERY_PARAM, term);
    }

    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter())
        .finish()
}

/// In-memory [`Location`] backed by a [`Url`]
///
/// Every replace is recorded, so callers can inspect what navigations
/// happened and in which order.
#[derive(Debug)]
pub struct UrlLocation {
    url: Mutex<Url>,
    history: Mutex<Vec<String>>,
}

impl UrlLocation {
    /// Parse an absolute URL, or a path resolved against `http://localhost`
    pub fn parse(input: &str) -> Result<Self, url::ParseError> {
        let url = match Url::parse(input) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                Url::parse("http://localhost")?.join(input)?
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            url: Mutex::new(url),
            history: Mutex::new(Vec::new()),
        })
    }

    /// Path plus query of the current location
    pub fn current(&self) -> String {
        let url = self.url.lock().unwrap_or_else(|e| e.into_inner());
        match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        }
    }

    /// Every `path?query` replaced so far, oldest first
    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Location for UrlLocation {
    fn path(&self) -> String {
        self.url
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .path()
            .to_string()
    }

    fn query_pairs(&self) -> Vec<(String, String)> {
        self.url
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .query_pairs()
            .into_owned()
            .collect()
    }

    fn replace(&self, path_with_query: &str) {
        let mut url = self.url.lock().unwrap_or_else(|e| e.into_inner());
        match url.join(path_with_query) {
            Ok(next) => {
                *url = next;
                self.history
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .push(path_with_query.to_string());
            }
            Err(e) => {
                tracing::warn!(target = %path_with_query, error = %e, "ignoring unparseable location");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_reflect_sets_query_and_resets_page() {
        let current = pairs(&[("page", "5"), ("query", "old")]);
        assert_eq!(reflect(&current, "lee"), "page=1&query=lee");
    }

    #[test]
    fn test_reflect_empty_term_removes_query() {
        let current = pairs(&[("query", "lee"), ("page", "3")]);
        assert_eq!(reflect(&current, ""), "page=1");
    }

    #[test]
    fn test_reflect_keeps_other_params_in_order() {
        let current = pairs(&[("sort", "date"), ("page", "2")]);
        assert_eq!(reflect(&current, "paid"), "sort=date&page=1&query=paid");
    }

    #[test]
    fn test_reflect_encodes_term() {
        assert_eq!(reflect(&[], "a b&c"), "page=1&query=a+b%26c");
    }

    #[test]
    fn test_reflect_collapses_duplicate_keys() {
        let current = pairs(&[("page", "2"), ("query", "a"), ("page", "9")]);
        assert_eq!(reflect(&current, "b"), "page=1&query=b");
    }

    #[test]
    fn test_url_location_replace_records_history() {
        let location = UrlLocation::parse("/dashboard/invoices?page=2").unwrap();
        assert_eq!(location.path(), "/dashboard/invoices");
        assert_eq!(location.query_pairs(), pairs(&[("page", "2")]));

        location.replace("/dashboard/invoices?page=1&query=lee");

        assert_eq!(location.current(), "/dashboard/invoices?page=1&query=lee");
        assert_eq!(
            location.history(),
            vec!["/dashboard/invoices?page=1&query=lee".to_string()]
        );
    }
}
