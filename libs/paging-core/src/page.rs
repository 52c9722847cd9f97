use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub page: u32,
    pub page_size: u32,
    pub has_next_page: bool,
    pub next_cursor: Option<String>,
    pub total: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_info: PageInfo,
}

impl<T> Page<T> {
    /// Create a new page with items and page info
    pub fn new(items: Vec<T>, page_info: PageInfo) -> Self {
        Self { items, page_info }
    }

    /// Page that reports whether more pages follow, without cursor or total.
    pub fn with_continuation(items: Vec<T>, page: u32, page_size: u32, has_next_page: bool) -> Self {
        Self {
            items,
            page_info: PageInfo {
                page,
                page_size,
                has_next_page,
                next_cursor: None,
                total: None,
            },
        }
    }

    /// Create an empty, final page
    pub fn empty(page: u32, page_size: u32) -> Self {
        Self::with_continuation(Vec::new(), page, page_size, false)
    }

    pub fn has_next_page(&self) -> bool {
        self.page_info.has_next_page
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Map items while preserving page_info (wire->domain mapping convenience)
    pub fn map_items<U>(self, mut f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(&mut f).collect(),
            page_info: self.page_info,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct WirePageInfo {
    #[serde(default, alias = "nextCursor")]
    pub next_cursor: Option<String>,
    #[serde(default, alias = "hasNextPage")]
    pub has_next_page: Option<bool>,
}

/// List response body as the console endpoints send it.
///
/// Accepts `items`/`data`/`results` for the rows and any of an explicit
/// continuation flag, a next cursor (top level or under `page_info`) or a total
/// count as continuation metadata.
#[derive(Clone, Debug, Deserialize)]
pub struct PageEnvelope<T> {
    #[serde(alias = "data", alias = "results")]
    pub items: Vec<T>,
    #[serde(default, alias = "hasNextPage")]
    pub has_next_page: Option<bool>,
    #[serde(default, alias = "nextCursor")]
    pub next_cursor: Option<String>,
    #[serde(default, alias = "totalCount", alias = "total_count")]
    pub total: Option<u64>,
    #[serde(default, alias = "pageInfo")]
    pub page_info: Option<WirePageInfo>,
}

impl<T> PageEnvelope<T> {
    fn cursor(&self) -> Option<&str> {
        self.next_cursor
            .as_deref()
            .or_else(|| self.page_info.as_ref()?.next_cursor.as_deref())
            .filter(|c| !c.is_empty())
    }

    fn explicit_flag(&self) -> Option<bool> {
        self.has_next_page
            .or_else(|| self.page_info.as_ref()?.has_next_page)
    }

    /// Continuation precedence: explicit flag, next cursor, total count, full page.
    pub fn derive_has_next(&self, page: u32, page_size: u32) -> bool {
        if self.items.is_empty() {
            return false;
        }
        if let Some(flag) = self.explicit_flag() {
            return flag;
        }
        if self.cursor().is_some() {
            return true;
        }
        if let Some(total) = self.total {
            return u64::from(page) * u64::from(page_size) < total;
        }
        self.items.len() >= page_size as usize
    }

    pub fn into_page(self, page: u32, page_size: u32) -> Page<T> {
        let has_next_page = self.derive_has_next(page, page_size);
        let next_cursor = self.cursor().map(str::to_string);
        Page {
            page_info: PageInfo {
                page,
                page_size,
                has_next_page,
                next_cursor,
                total: self.total,
            },
            items: self.items,
        }
    }
}
