//! Shared pieces of the list views: query parsing and page navigation.

use serde::Deserialize;

use taxi_core::{Page, PageRequest, PageSelector};

use crate::config::ListingConfig;

/// Query parameters accepted by every list view.
///
/// Each list reads one extra filter parameter; unknown parameters are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub name: Option<String>,
    pub model: Option<String>,
    pub username: Option<String>,
}

impl ListQuery {
    /// The page request for this query under the configured page size.
    #[must_use]
    pub fn page_request(&self, listing: &ListingConfig) -> PageRequest {
        PageRequest::new(
            PageSelector::from_param(self.page.as_deref()),
            listing.page_size,
        )
    }
}

/// Page navigation for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    pub number: u32,
    pub num_pages: u32,
    pub total: u64,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous_number: Option<u32>,
    pub next_number: Option<u32>,
    /// `&key=value` pairs for active filters, appended to page links.
    pub query_suffix: String,
}

impl PageView {
    /// Describe `page`, carrying the given filters into its links.
    #[must_use]
    pub fn new<T>(page: &Page<T>, filters: &[(&str, Option<&str>)]) -> Self {
        let window = page.window();
        let query_suffix = filters
            .iter()
            .filter_map(|(key, value)| value.map(|v| (key, v)))
            .map(|(key, value)| format!("&{key}={}", urlencoding::encode(value)))
            .collect();

        Self {
            number: window.number(),
            num_pages: window.num_pages(),
            total: window.total(),
            has_previous: page.has_previous(),
            has_next: page.has_next(),
            previous_number: page.previous_number(),
            next_number: page.next_number(),
            query_suffix,
        }
    }

    /// Whether there is more than one page (navigation is shown).
    #[must_use]
    pub const fn is_paginated(&self) -> bool {
        self.num_pages > 1
    }
}
