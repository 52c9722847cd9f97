use paging_core::{Error, QueryKey, SearchSpec, SortDir, SortSpec};

/// The single active sort column and the single active search filter of a list.
///
/// The raw search field is remembered even when its value is empty (the UI
/// keeps the field selected), but an empty value contributes nothing to the
/// [`QueryKey`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SortSearchState {
    sort: Option<SortSpec>,
    search_field: Option<String>,
    search_value: String,
}

impl SortSearchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same field toggles direction; a new field starts ascending.
    /// Every successful call changes the query key.
    pub fn set_sort(&mut self, field: &str) -> Result<(), Error> {
        if field.trim().is_empty() {
            return Err(Error::EmptyField);
        }
        self.sort = Some(match self.sort.take() {
            Some(current) if current.field == field => SortSpec {
                field: current.field,
                dir: current.dir.reverse(),
            },
            _ => SortSpec::asc(field),
        });
        Ok(())
    }

    /// Back to the server's default order. Returns whether anything changed.
    pub fn clear_sort(&mut self) -> bool {
        self.sort.take().is_some()
    }

    /// Replace field and value together. Returns whether the effective filter changed.
    pub fn set_search(&mut self, field: &str, value: &str) -> bool {
        let before = self.search_spec();
        self.search_field = (!field.trim().is_empty()).then(|| field.to_string());
        self.search_value = value.to_string();
        before != self.search_spec()
    }

    /// Drop the search value, keeping the selected field.
    pub fn clear_search(&mut self) -> bool {
        let before = self.search_spec();
        self.search_value.clear();
        before.is_some()
    }

    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    pub fn sort_field(&self) -> Option<&str> {
        self.sort.as_ref().map(|s| s.field.as_str())
    }

    pub fn sort_direction(&self) -> SortDir {
        self.sort.as_ref().map(|s| s.dir).unwrap_or_default()
    }

    pub fn search_field(&self) -> Option<&str> {
        self.search_field.as_deref()
    }

    pub fn search_value(&self) -> &str {
        &self.search_value
    }

    pub fn search_spec(&self) -> Option<SearchSpec> {
        let field = self.search_field.as_deref()?;
        SearchSpec::normalized(field, self.search_value.as_str())
    }

    pub fn key(&self, endpoint: &str) -> QueryKey {
        QueryKey::build(
            endpoint,
            self.search_field.as_deref(),
            Some(self.search_value.as_str()),
            self.sort_field(),
            self.sort_direction(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_toggles_on_same_field() {
        let mut s = SortSearchState::new();
        s.set_sort("name").unwrap();
        assert_eq!(s.sort(), Some(&SortSpec::asc("name")));
        s.set_sort("name").unwrap();
        assert_eq!(s.sort(), Some(&SortSpec::desc("name")));
        s.set_sort("name").unwrap();
        assert_eq!(s.sort_direction(), SortDir::Asc);
    }

    #[test]
    fn new_sort_field_starts_ascending() {
        let mut s = SortSearchState::new();
        s.set_sort("name").unwrap();
        s.set_sort("name").unwrap();
        s.set_sort("createdAt").unwrap();
        assert_eq!(s.sort(), Some(&SortSpec::asc("createdAt")));
    }

    #[test]
    fn empty_sort_field_is_rejected() {
        let mut s = SortSearchState::new();
        assert_eq!(s.set_sort(" "), Err(Error::EmptyField));
        assert!(s.sort().is_none());
    }

    #[test]
    fn search_replaces_field_and_value() {
        let mut s = SortSearchState::new();
        assert!(s.set_search("name", "Ann"));
        assert!(s.set_search("group", "CS-101"));
        assert_eq!(s.search_field(), Some("group"));
        assert_eq!(s.search_value(), "CS-101");
        assert_eq!(
            s.key("/students").search,
            Some(SearchSpec {
                field: "group".into(),
                value: "CS-101".into()
            })
        );
    }

    #[test]
    fn identical_search_is_a_no_op() {
        let mut s = SortSearchState::new();
        assert!(s.set_search("name", "Ann"));
        assert!(!s.set_search("name", "Ann"));
    }

    #[test]
    fn empty_search_matches_no_search() {
        let mut s = SortSearchState::new();
        let before = s.key("/groups");
        assert!(!s.set_search("name", ""));
        assert_eq!(s.search_field(), Some("name"));
        assert_eq!(s.key("/groups"), before);
    }

    #[test]
    fn switching_field_with_empty_value_drops_filter() {
        let mut s = SortSearchState::new();
        s.set_search("name", "Ann");
        assert!(s.set_search("email", ""));
        assert!(s.search_spec().is_none());
    }

    #[test]
    fn clear_operations_report_changes() {
        let mut s = SortSearchState::new();
        assert!(!s.clear_sort());
        assert!(!s.clear_search());
        s.set_sort("id").unwrap();
        s.set_search("name", "x");
        assert!(s.clear_sort());
        assert!(s.clear_search());
        assert_eq!(s.search_field(), Some("name"));
        assert_eq!(s.key("/rooms"), QueryKey::new("/rooms"));
    }
}
