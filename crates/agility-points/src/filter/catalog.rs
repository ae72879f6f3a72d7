use std::collections::BTreeMap;

use super::VisibilityFilterState;

/// Reserved name for the unfiltered view.
pub const ALL_FILTER: &str = "All";

/// Saved filters with one current selection.
#[derive(Debug, Clone, Default)]
pub struct FilterCatalog {
    filters: BTreeMap<String, VisibilityFilterState>,
    current: Option<String>,
    default_state: VisibilityFilterState,
}

impl FilterCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Saves `state` under `name` and selects it. Returns true when the name
    /// was new; the reserved name is refused.
    pub fn add(&mut self, name: &str, state: VisibilityFilterState) -> bool {
        if name == ALL_FILTER {
            return false;
        }
        let added = self.filters.insert(name.to_string(), state).is_none();
        self.current = Some(name.to_string());
        added
    }

    pub fn delete(&mut self, name: &str) -> bool {
        if self.filters.remove(name).is_none() {
            return false;
        }
        if self.current.as_deref() == Some(name) {
            self.current = None;
        }
        true
    }

    pub fn set_current(&mut self, name: &str) -> bool {
        if name.is_empty() || name == ALL_FILTER {
            self.current = None;
            return true;
        }
        if self.filters.contains_key(name) {
            self.current = Some(name.to_string());
            return true;
        }
        false
    }

    pub fn current_name(&self) -> &str {
        self.current.as_deref().unwrap_or(ALL_FILTER)
    }

    pub fn current(&self) -> &VisibilityFilterState {
        self.current
            .as_deref()
            .and_then(|name| self.filters.get(name))
            .unwrap_or(&self.default_state)
    }

    pub fn get(&self, name: &str) -> Option<&VisibilityFilterState> {
        self.filters.get(name)
    }

    pub fn names(&self) -> Vec<String> {
        if self.filters.is_empty() {
            return Vec::new();
        }
        let mut names: Vec<String> = self.filters.keys().cloned().collect();
        names.sort_by_key(|name| name.to_lowercase());
        names.insert(0, ALL_FILTER.to_string());
        names
    }
}

impl FromIterator<(String, VisibilityFilterState)> for FilterCatalog {
    fn from_iter<I: IntoIterator<Item = (String, VisibilityFilterState)>>(iter: I) -> Self {
        let filters = iter
            .into_iter()
            .filter(|(name, _)| name != ALL_FILTER)
            .collect();
        Self {
            filters,
            current: None,
            default_state: VisibilityFilterState::default(),
        }
    }
}
