// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the portal-session project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! # Pagination
//!
//! Page position of a list view lives only in the page URL, as
//! `{namespace}_page` and `{namespace}_per_page` query parameters. An empty
//! namespace uses the bare `page` / `per_page` names. Several lists on one
//! screen use different namespaces and never disturb each other.
//!
//! ```
//! use portal_session::pagination::PaginationQuery;
//!
//! let query = PaginationQuery::decode_query("tasks_page=3&tasks_per_page=5&page=9", "tasks", 50);
//! assert_eq!((query.page(), query.per_page()), (3, 5));
//! assert_eq!(
//!     query.api_path("/tasks/for-my-open-processes"),
//!     "/tasks/for-my-open-processes?per_page=5&page=3"
//! );
//! ```

use std::collections::BTreeMap;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Page and page size of one list view
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PaginationQuery {
    namespace: String,
    page: NonZeroU32,
    per_page: NonZeroU32,
}

impl PaginationQuery {
    /// `None` when `page` or `per_page` is zero
    pub fn new(namespace: impl Into<String>, page: u32, per_page: u32) -> Option<Self> {
        Some(Self {
            namespace: namespace.into(),
            page: NonZeroU32::new(page)?,
            per_page: NonZeroU32::new(per_page)?,
        })
    }

    /// Read the namespaced parameters from query pairs
    ///
    /// Missing, zero, negative or otherwise unparsable values fall back to
    /// page 1 and `default_per_page` (itself raised to 1 if zero). When a
    /// parameter is repeated the first occurrence is used. Never fails.
    pub fn decode<I, K, V>(params: I, namespace: &str, default_per_page: u32) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Self::decode_with_defaults(params, namespace, 1, default_per_page)
    }

    /// Like [`decode`](Self::decode) with an explicit default page
    pub fn decode_with_defaults<I, K, V>(
        params: I,
        namespace: &str,
        default_page: u32,
        default_per_page: u32,
    ) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let page_key = param_name(namespace, "page");
        let per_page_key = param_name(namespace, "per_page");
        let mut page = None;
        let mut per_page = None;

        for (key, value) in params {
            let key = key.as_ref();
            if page.is_none() && key == page_key {
                page = Some(parse_positive(value.as_ref()));
            } else if per_page.is_none() && key == per_page_key {
                per_page = Some(parse_positive(value.as_ref()));
            }
        }

        Self {
            namespace: namespace.to_string(),
            page: page.flatten().unwrap_or_else(|| at_least_one(default_page)),
            per_page: per_page
                .flatten()
                .unwrap_or_else(|| at_least_one(default_per_page)),
        }
    }

    /// Decode from a raw query string, with or without its leading `?`
    pub fn decode_query(query: &str, namespace: &str, default_per_page: u32) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self::decode(
            url::form_urlencoded::parse(query.as_bytes()),
            namespace,
            default_per_page,
        )
    }

    /// Query parameters representing this position
    pub fn encode(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (self.page_param(), self.page.to_string()),
            (self.per_page_param(), self.per_page.to_string()),
        ])
    }

    /// Rewrite `query` so it carries this position
    ///
    /// Parameters of other namespaces and unrelated parameters are kept in
    /// order; this namespace's parameters are replaced and appended.
    pub fn merge_into(&self, query: &str) -> String {
        let query = query.strip_prefix('?').unwrap_or(query);
        let page_key = self.page_param();
        let per_page_key = self.per_page_param();

        let mut pairs: Vec<(String, String)> = url::form_urlencoded::parse(query.as_bytes())
            .filter(|(key, _)| *key != page_key && *key != per_page_key)
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        pairs.push((page_key, self.page.to_string()));
        pairs.push((per_page_key, self.per_page.to_string()));

        serde_urlencoded::to_string(&pairs).unwrap_or_default()
    }

    /// Backend list path for this page: `{base_path}?per_page=N&page=P`
    pub fn api_path(&self, base_path: &str) -> String {
        let separator = if base_path.contains('?') { '&' } else { '?' };
        format!(
            "{}{}per_page={}&page={}",
            base_path, separator, self.per_page, self.page
        )
    }

    /// Same namespace and page size at another page
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page: at_least_one(page),
            ..self.clone()
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn page(&self) -> u32 {
        self.page.get()
    }

    pub fn per_page(&self) -> u32 {
        self.per_page.get()
    }

    pub fn page_param(&self) -> String {
        param_name(&self.namespace, "page")
    }

    pub fn per_page_param(&self) -> String {
        param_name(&self.namespace, "per_page")
    }
}

/// Pagination metadata returned by list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pagination {
    /// Items on this page
    pub count: u64,
    /// Items across all pages
    pub total: u64,
    pub pages: u64,
}

impl Pagination {
    /// True when the list has no item at all
    pub fn is_empty(&self) -> bool {
        self.total < 1
    }
}

/// One page of a list endpoint response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListPage<T> {
    pub results: Vec<T>,
    pub pagination: Pagination,
}

fn param_name(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}_{}", namespace, name)
    }
}

fn parse_positive(value: &str) -> Option<NonZeroU32> {
    value.parse::<NonZeroU32>().ok()
}

fn at_least_one(value: u32) -> NonZeroU32 {
    NonZeroU32::new(value).unwrap_or(NonZeroU32::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_defaults() {
        let query = PaginationQuery::decode(Vec::<(String, String)>::new(), "tasks", 5);
        assert_eq!((query.page(), query.per_page()), (1, 5));

        let query = PaginationQuery::decode_query("?page=x&per_page=-3", "", 50);
        assert_eq!((query.page(), query.per_page()), (1, 50));

        let query = PaginationQuery::decode_query("page=0&per_page=2.5", "", 0);
        assert_eq!((query.page(), query.per_page()), (1, 1));
    }

    #[test]
    fn test_namespaces_are_independent() {
        let raw = "page=4&per_page=20&tasks_page=2&tasks_per_page=5";
        let plain = PaginationQuery::decode_query(raw, "", 50);
        let tasks = PaginationQuery::decode_query(raw, "tasks", 50);
        let other = PaginationQuery::decode_query(raw, "groups", 50);

        assert_eq!((plain.page(), plain.per_page()), (4, 20));
        assert_eq!((tasks.page(), tasks.per_page()), (2, 5));
        assert_eq!((other.page(), other.per_page()), (1, 50));
    }

    #[test]
    fn test_first_occurrence_wins() {
        let query = PaginationQuery::decode_query("page=2&page=7", "", 10);
        assert_eq!(query.page(), 2);
    }

    #[test]
    fn test_encode_names() {
        let query = PaginationQuery::new("tasks", 3, 25).unwrap();
        let encoded = query.encode();
        assert_eq!(encoded.get("tasks_page").map(String::as_str), Some("3"));
        assert_eq!(encoded.get("tasks_per_page").map(String::as_str), Some("25"));

        let plain = PaginationQuery::new("", 1, 10).unwrap().encode();
        assert!(plain.contains_key("page") && plain.contains_key("per_page"));
    }

    #[test]
    fn test_round_trip() {
        for namespace in ["", "tasks", "tasks_for_my_open_processes", "a b"] {
            for (page, per_page) in [(1, 1), (2, 5), (17, 100), (u32::MAX, u32::MAX)] {
                let query = PaginationQuery::new(namespace, page, per_page).unwrap();
                let decoded = PaginationQuery::decode(query.encode(), namespace, 7);
                assert_eq!(decoded, query);
            }
        }
    }

    #[test]
    fn test_merge_into_keeps_other_parameters() {
        let query = PaginationQuery::new("tasks", 3, 5).unwrap();
        assert_eq!(
            query.merge_into("?page=2&tasks_page=1&filter=open"),
            "page=2&filter=open&tasks_page=3&tasks_per_page=5"
        );
        assert_eq!(query.merge_into(""), "tasks_page=3&tasks_per_page=5");
    }

    #[test]
    fn test_api_path_and_with_page() {
        let query = PaginationQuery::new("", 2, 10).unwrap();
        assert_eq!(query.api_path("/process-groups"), "/process-groups?per_page=10&page=2");
        assert_eq!(
            query.with_page(0).api_path("/process-models?status=open"),
            "/process-models?status=open&per_page=10&page=1"
        );
    }

    #[test]
    fn test_list_page_deserialization() {
        let page: ListPage<serde_json::Value> = serde_json::from_str(
            r#"{"results": [{"id": 1}], "pagination": {"count": 1, "total": 1, "pages": 1}}"#,
        )
        .unwrap();
        assert_eq!(page.results.len(), 1);
        assert!(!page.pagination.is_empty());
        assert!(Pagination::default().is_empty());
    }
}
