use serde::{Deserialize, Serialize};

/// One page of a paginated list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// List endpoints answer with a bare array when pagination is off and with
/// a `Page` when it is on.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Plain(Vec<T>),
    Page(Page<T>),
}

impl<T> Listing<T> {
    /// URL of the following page, if any
    pub fn next(&self) -> Option<&str> {
        match self {
            Listing::Page(page) => page.next.as_deref(),
            Listing::Plain(_) => None,
        }
    }

    pub fn into_items(self) -> Vec<T> {
        match self {
            Listing::Page(page) => page.results,
            Listing::Plain(items) => items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_array() {
        let listing: Listing<i32> = serde_json::from_str("[1, 2, 3]").unwrap();
        assert_eq!(listing.next(), None);
        assert_eq!(listing.into_items(), vec![1, 2, 3]);
    }

    #[test]
    fn test_paginated_envelope() {
        let json = r#"{"count": 3, "next": "http://host/api/references/?page=2",
            "previous": null, "results": [1, 2]}"#;
        let listing: Listing<i32> = serde_json::from_str(json).unwrap();
        assert_eq!(listing.next(), Some("http://host/api/references/?page=2"));
        assert_eq!(listing.into_items(), vec![1, 2]);
    }
}
