//! Transport-agnostic paging types shared by the console list pages.
//!
//! A list page is addressed by a [`QueryKey`] (endpoint + single sort key +
//! single search key). Advancing through pages never changes the key; any
//! change to sort or search does.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub mod page;
pub use page::{Page, PageEnvelope, PageInfo};

/// Upper bound accepted for a list page size.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// First page index; pages are 1-based.
pub const FIRST_PAGE: u32 = 1;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("page index must start at 1 (got {0})")]
    InvalidPage(u32),

    #[error("page size must be between 1 and {max} (got {got})")]
    InvalidPageSize { got: u32, max: u32 },

    #[error("endpoint must not be empty")]
    EmptyEndpoint,

    #[error("field name must not be empty")]
    EmptyField,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    pub fn reverse(self) -> Self {
        match self {
            SortDir::Asc => SortDir::Desc,
            SortDir::Desc => SortDir::Asc,
        }
    }

    /// Wire form used in the `sortDirection` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            SortDir::Asc => "asc",
            SortDir::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The one active sort column of a list.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub dir: SortDir,
}

impl SortSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            dir: SortDir::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            dir: SortDir::Desc,
        }
    }
}

/// The one active search filter of a list.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchSpec {
    pub field: String,
    pub value: String,
}

impl SearchSpec {
    /// Returns `None` when the value is empty: an empty search is no filter.
    pub fn normalized(field: impl Into<String>, value: impl Into<String>) -> Option<Self> {
        let field = field.into();
        let value = value.into();
        if field.trim().is_empty() || value.is_empty() {
            return None;
        }
        Some(Self { field, value })
    }
}

/// Identity of a logical result set. Page index is deliberately not part of it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryKey {
    pub endpoint: String,
    pub sort: Option<SortSpec>,
    pub search: Option<SearchSpec>,
}

impl QueryKey {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            sort: None,
            search: None,
        }
    }

    /// Build a key from raw list state.
    /// - empty search value (or field) collapses to no search
    /// - a direction without a sort field collapses to no sort
    pub fn build(
        endpoint: impl Into<String>,
        search_field: Option<&str>,
        search_value: Option<&str>,
        sort_field: Option<&str>,
        sort_dir: SortDir,
    ) -> Self {
        let search = match (search_field, search_value) {
            (Some(f), Some(v)) => SearchSpec::normalized(f, v),
            _ => None,
        };
        let sort = sort_field
            .filter(|f| !f.trim().is_empty())
            .map(|f| SortSpec {
                field: f.to_string(),
                dir: sort_dir,
            });
        Self {
            endpoint: endpoint.into(),
            sort,
            search,
        }
    }

    pub fn with_sort(mut self, sort: Option<SortSpec>) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_search(mut self, search: Option<SearchSpec>) -> Self {
        self.search = search;
        self
    }

    /// Stable textual form of the key, the input of [`QueryKey::fingerprint`].
    ///
    /// Free-form parts are length-prefixed (`<len>:<text>`), so separators
    /// inside field names or values cannot make two keys collide.
    pub fn normalized(&self) -> String {
        let sort = match &self.sort {
            Some(s) => format!("SORT({},{})", framed(&s.field), s.dir),
            None => "SORT()".to_string(),
        };
        let search = match &self.search {
            Some(s) => format!("SEARCH({},{})", framed(&s.field), framed(&s.value)),
            None => "SEARCH()".to_string(),
        };
        format!("EP({})|{}|{}", framed(&self.endpoint), sort, search)
    }

    /// Short 64-bit hex digest of the normalized key, used in spans and logs.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.normalized().as_bytes());
        let bytes = hasher.finalize();
        hex::encode(&bytes[..8])
    }
}

fn framed(part: &str) -> String {
    format!("{}:{}", part.len(), part)
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.endpoint)?;
        match &self.sort {
            Some(s) => write!(f, " sort={} {}", s.field, s.dir)?,
            None => write!(f, " sort=(none)")?,
        }
        match &self.search {
            Some(s) => write!(f, " search={}:{:?}", s.field, s.value),
            None => write!(f, " search=(none)"),
        }
    }
}

/// One page request of a logical query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub key: QueryKey,
    pub page: u32,
    pub page_size: u32,
    pub cursor: Option<String>,
}

impl PageRequest {
    pub fn new(key: QueryKey, page: u32, page_size: u32) -> Result<Self, Error> {
        validate_page_size(page_size)?;
        if page < FIRST_PAGE {
            return Err(Error::InvalidPage(page));
        }
        if key.endpoint.trim().is_empty() {
            return Err(Error::EmptyEndpoint);
        }
        Ok(Self {
            key,
            page,
            page_size,
            cursor: None,
        })
    }

    pub fn with_cursor(mut self, cursor: Option<String>) -> Self {
        self.cursor = cursor.filter(|c| !c.is_empty());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.key.endpoint
    }

    /// Query parameters in the order the console sends them.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("pageSize", self.page_size.to_string()),
        ];
        if let Some(sort) = &self.key.sort {
            pairs.push(("sortField", sort.field.clone()));
            pairs.push(("sortDirection", sort.dir.as_str().to_string()));
        }
        if let Some(search) = &self.key.search {
            pairs.push(("searchField", search.field.clone()));
            pairs.push(("searchValue", search.value.clone()));
        }
        if let Some(cursor) = &self.cursor {
            pairs.push(("cursor", cursor.clone()));
        }
        pairs
    }
}

pub fn validate_page_size(page_size: u32) -> Result<(), Error> {
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(Error::InvalidPageSize {
            got: page_size,
            max: MAX_PAGE_SIZE,
        });
    }
    Ok(())
}
