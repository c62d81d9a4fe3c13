//! Page selection for list views.
//!
//! A [`PageRequest`] combines the page the client asked for with the
//! configured page size. Once the total number of matching records is known,
//! [`PageRequest::resolve`] produces a [`PageWindow`]: the page actually
//! served (requests past the end are clamped to the last page) and the
//! offset/limit to fetch.
//!
//! ```
//! use std::num::NonZeroU32;
//! use taxi_core::{PageRequest, PageSelector};
//!
//! let size = NonZeroU32::new(5).unwrap();
//! let window = PageRequest::new(PageSelector::Number(NonZeroU32::new(9).unwrap()), size).resolve(12);
//!
//! assert_eq!(window.number(), 3); // clamped: 12 records fill 3 pages
//! assert_eq!(window.offset(), 10);
//! ```

use std::num::NonZeroU32;

use serde::Serialize;

/// Which page the client asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSelector {
    /// A 1-based page number.
    Number(NonZeroU32),
    /// The last page, whatever its number.
    Last,
}

impl PageSelector {
    /// The first page.
    pub const FIRST: Self = Self::Number(NonZeroU32::MIN);

    /// Interpret a `?page=` query value.
    ///
    /// `"last"` selects the last page. Anything that is not a positive
    /// integer (missing, zero, negative, garbage) selects the first page.
    #[must_use]
    pub fn from_param(param: Option<&str>) -> Self {
        match param.map(str::trim) {
            Some("last") => Self::Last,
            Some(value) => value
                .parse::<NonZeroU32>()
                .map_or(Self::FIRST, Self::Number),
            None => Self::FIRST,
        }
    }
}

impl Default for PageSelector {
    fn default() -> Self {
        Self::FIRST
    }
}

/// A page selection plus the page size to paginate with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    selector: PageSelector,
    size: NonZeroU32,
}

impl PageRequest {
    /// Page size used when none is configured.
    pub const DEFAULT_SIZE: NonZeroU32 = match NonZeroU32::new(5) {
        Some(size) => size,
        None => NonZeroU32::MIN,
    };

    /// Create a page request.
    #[must_use]
    pub const fn new(selector: PageSelector, size: NonZeroU32) -> Self {
        Self { selector, size }
    }

    /// Request the first page with the given size.
    #[must_use]
    pub const fn first(size: NonZeroU32) -> Self {
        Self::new(PageSelector::FIRST, size)
    }

    /// The requested selector.
    #[must_use]
    pub const fn selector(&self) -> PageSelector {
        self.selector
    }

    /// The page size.
    #[must_use]
    pub const fn size(&self) -> NonZeroU32 {
        self.size
    }

    /// Resolve this request against the number of matching records.
    ///
    /// An empty collection still has one (empty) page. Page numbers past the
    /// last page are clamped to the last page.
    #[must_use]
    pub fn resolve(&self, total: u64) -> PageWindow {
        let size = u64::from(self.size.get());
        let num_pages = u32::try_from(total.div_ceil(size).max(1)).unwrap_or(u32::MAX);

        let number = match self.selector {
            PageSelector::Number(n) => n.get().min(num_pages),
            PageSelector::Last => num_pages,
        };

        PageWindow {
            number,
            num_pages,
            size: self.size.get(),
            total,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(Self::DEFAULT_SIZE)
    }
}

/// A resolved page: which page is served and which records it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    number: u32,
    num_pages: u32,
    size: u32,
    total: u64,
}

impl PageWindow {
    /// The 1-based page number being served.
    #[must_use]
    pub const fn number(&self) -> u32 {
        self.number
    }

    /// Total number of pages (at least 1).
    #[must_use]
    pub const fn num_pages(&self) -> u32 {
        self.num_pages
    }

    /// Total number of matching records across all pages.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Number of records to skip.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.number as u64 - 1) * self.size as u64
    }

    /// Maximum number of records on this page.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.size
    }
}

/// One page of records plus its position in the full result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    items: Vec<T>,
    window: PageWindow,
}

impl<T> Page<T> {
    /// Create a page from the fetched records and the window they were fetched for.
    #[must_use]
    pub const fn new(items: Vec<T>, window: PageWindow) -> Self {
        Self { items, window }
    }

    /// Slice an already-materialised, ordered collection.
    #[must_use]
    pub fn from_all(all: Vec<T>, request: PageRequest) -> Self {
        let window = request.resolve(all.len() as u64);
        let skip = usize::try_from(window.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(window.limit()).unwrap_or(usize::MAX);
        let items = all.into_iter().skip(skip).take(take).collect();
        Self { items, window }
    }

    /// Records on this page.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consume the page and return its records.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// The window this page covers.
    #[must_use]
    pub const fn window(&self) -> PageWindow {
        self.window
    }

    /// Whether a later page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.window.number < self.window.num_pages
    }

    /// Whether an earlier page exists.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.window.number > 1
    }

    /// Number of the next page, if any.
    #[must_use]
    pub const fn next_number(&self) -> Option<u32> {
        if self.has_next() {
            Some(self.window.number + 1)
        } else {
            None
        }
    }

    /// Number of the previous page, if any.
    #[must_use]
    pub const fn previous_number(&self) -> Option<u32> {
        if self.has_previous() {
            Some(self.window.number - 1)
        } else {
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn size(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    fn page(n: u32) -> PageSelector {
        PageSelector::Number(NonZeroU32::new(n).unwrap())
    }

    #[test]
    fn test_selector_from_param() {
        assert_eq!(PageSelector::from_param(None), PageSelector::FIRST);
        assert_eq!(PageSelector::from_param(Some("2")), page(2));
        assert_eq!(PageSelector::from_param(Some(" 3 ")), page(3));
        assert_eq!(PageSelector::from_param(Some("last")), PageSelector::Last);
        assert_eq!(PageSelector::from_param(Some("0")), PageSelector::FIRST);
        assert_eq!(PageSelector::from_param(Some("-1")), PageSelector::FIRST);
        assert_eq!(PageSelector::from_param(Some("two")), PageSelector::FIRST);
        assert_eq!(PageSelector::from_param(Some("")), PageSelector::FIRST);
    }

    #[test]
    fn test_two_records_fit_on_first_page() {
        let window = PageRequest::default().resolve(2);
        assert_eq!(window.number(), 1);
        assert_eq!(window.num_pages(), 1);
        assert_eq!(window.offset(), 0);
        assert_eq!(window.limit(), 5);
    }

    #[test]
    fn test_empty_collection_has_one_page() {
        let window = PageRequest::new(page(4), size(5)).resolve(0);
        assert_eq!(window.number(), 1);
        assert_eq!(window.num_pages(), 1);
        assert_eq!(window.total(), 0);
    }

    #[test]
    fn test_page_past_end_is_clamped() {
        let window = PageRequest::new(page(100), size(5)).resolve(11);
        assert_eq!(window.num_pages(), 3);
        assert_eq!(window.number(), 3);
        assert_eq!(window.offset(), 10);
    }

    #[test]
    fn test_last_selector() {
        let window = PageRequest::new(PageSelector::Last, size(4)).resolve(8);
        assert_eq!(window.number(), 2);
        assert_eq!(window.offset(), 4);
    }

    #[test]
    fn test_exact_multiple_of_page_size() {
        let window = PageRequest::new(page(2), size(5)).resolve(10);
        assert_eq!(window.num_pages(), 2);
        assert_eq!(window.number(), 2);
    }

    #[test]
    fn test_from_all_slices_and_navigates() {
        let all: Vec<u32> = (1..=7).collect();

        let first = Page::from_all(all.clone(), PageRequest::new(page(1), size(3)));
        assert_eq!(first.items(), &[1, 2, 3]);
        assert!(!first.has_previous());
        assert_eq!(first.next_number(), Some(2));

        let last = Page::from_all(all, PageRequest::new(PageSelector::Last, size(3)));
        assert_eq!(last.items(), &[7]);
        assert_eq!(last.previous_number(), Some(2));
        assert!(!last.has_next());
        assert_eq!(last.next_number(), None);
    }
}
