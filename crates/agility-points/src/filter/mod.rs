//! Visibility filtering over dogs, trials, runs, titles and log entries.

mod catalog;
mod visibility;

pub use catalog::{FilterCatalog, ALL_FILTER};
pub use visibility::{RunVisibility, VisibilityFilter};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

fn enabled() -> bool {
    true
}

/// Which runs the list views show once date and venue checks pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunsView {
    #[default]
    All,
    QualifyingOnly,
    NonQualifyingOnly,
}

impl RunsView {
    pub const fn ordered() -> [Self; 3] {
        [Self::All, Self::QualifyingOnly, Self::NonQualifyingOnly]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All runs",
            Self::QualifyingOnly => "Qualifying runs",
            Self::NonQualifyingOnly => "Non-qualifying runs",
        }
    }
}

/// One allow-list entry. An absent division or level matches any value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AllowedVenue {
    pub venue: String,
    #[serde(default)]
    pub division: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
}

impl AllowedVenue {
    pub fn venue(venue: impl Into<String>) -> Self {
        Self {
            venue: venue.into(),
            division: None,
            level: None,
        }
    }

    pub fn division(venue: impl Into<String>, division: impl Into<String>) -> Self {
        Self {
            division: Some(division.into()),
            ..Self::venue(venue)
        }
    }

    pub fn level(
        venue: impl Into<String>,
        division: impl Into<String>,
        level: impl Into<String>,
    ) -> Self {
        Self {
            level: Some(level.into()),
            ..Self::division(venue, division)
        }
    }

    /// Division and level agree with a run's, wildcards included.
    pub(crate) fn covers(&self, division: &str, level: &str) -> bool {
        self.division.as_deref().map_or(true, |d| d == division)
            && self.level.as_deref().map_or(true, |l| l == level)
    }
}

/// Calendar entry statuses to show. Pending entries follow `entered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarView {
    #[serde(default = "enabled")]
    pub not_entered: bool,
    #[serde(default = "enabled")]
    pub planning: bool,
    #[serde(default = "enabled")]
    pub entered: bool,
}

impl Default for CalendarView {
    fn default() -> Self {
        Self {
            not_entered: true,
            planning: true,
            entered: true,
        }
    }
}

/// Read-only filter snapshot consulted by every visibility decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibilityFilterState {
    #[serde(default = "enabled")]
    pub all_dates: bool,
    /// Lower bound, enforced when set and `all_dates` is off.
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,
    #[serde(default = "enabled")]
    pub all_venues: bool,
    #[serde(default)]
    pub venues: Vec<AllowedVenue>,
    #[serde(default)]
    pub runs_view: RunsView,
    #[serde(default)]
    pub show_hidden_titles: bool,
    #[serde(default)]
    pub calendar: CalendarView,
    #[serde(default = "enabled")]
    pub all_training_names: bool,
    #[serde(default)]
    pub training_names: BTreeSet<String>,
}

impl Default for VisibilityFilterState {
    fn default() -> Self {
        Self {
            all_dates: true,
            start: None,
            end: None,
            all_venues: true,
            venues: Vec::new(),
            runs_view: RunsView::All,
            show_hidden_titles: false,
            calendar: CalendarView::default(),
            all_training_names: true,
            training_names: BTreeSet::new(),
        }
    }
}

impl VisibilityFilterState {
    /// True when anything narrows the views.
    pub fn is_enabled(&self) -> bool {
        !(self.all_dates && self.all_venues && self.runs_view == RunsView::All)
    }

    pub fn filter(&self) -> VisibilityFilter<'_> {
        VisibilityFilter::new(self)
    }
}
