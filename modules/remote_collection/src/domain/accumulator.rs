use std::collections::HashSet;

use paging_core::{Page, FIRST_PAGE};

use crate::contract::model::Identified;

/// Flat, ordered list built from the pages of one query.
///
/// Pages are appended verbatim: no reordering and no deduplication. Repeated
/// identities are only reported, since they point at unstable server paging.
pub struct Accumulator<T: Identified> {
    items: Vec<T>,
    next_page: u32,
    has_next_page: bool,
    next_cursor: Option<String>,
    pages_loaded: u32,
    seen: HashSet<T::Id>,
}

impl<T: Identified> Default for Accumulator<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            next_page: FIRST_PAGE,
            has_next_page: true,
            next_cursor: None,
            pages_loaded: 0,
            seen: HashSet::new(),
        }
    }
}

impl<T: Identified> Accumulator<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.items.clear();
        self.seen.clear();
        self.next_page = FIRST_PAGE;
        self.has_next_page = true;
        self.next_cursor = None;
        self.pages_loaded = 0;
    }

    /// Append one page in server order and advance to the next page index.
    /// Returns the number of items appended.
    pub fn append_page(&mut self, page: Page<T>) -> usize {
        let Page { items, page_info } = page;
        let count = items.len();

        for item in &items {
            let id = item.id();
            if !self.seen.insert(id.clone()) {
                tracing::warn!(?id, page = self.next_page, "row repeated across pages");
            }
        }

        self.items.extend(items);
        self.pages_loaded += 1;
        self.next_page += 1;
        self.has_next_page = page_info.has_next_page && count > 0;
        self.next_cursor = page_info.next_cursor;
        count
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn next_page(&self) -> u32 {
        self.next_page
    }

    /// Unknown (true) until the first page arrives.
    pub fn has_next_page(&self) -> bool {
        self.has_next_page
    }

    pub fn next_cursor(&self) -> Option<&str> {
        self.next_cursor.as_deref()
    }

    pub fn pages_loaded(&self) -> u32 {
        self.pages_loaded
    }
}
