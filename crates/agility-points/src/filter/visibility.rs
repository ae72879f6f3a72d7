use chrono::NaiveDate;
use serde::Serialize;

use super::{AllowedVenue, RunsView, VisibilityFilterState};
use crate::scoring::domain::{CalendarEntry, EntryStatus, Run, Title, TrainingEntry, Trial};

/// Run visibility split into the Q-independent and Q-narrowed decisions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunVisibility {
    /// Date and venue checks pass; ignores the runs view.
    pub eligible: bool,
    /// Eligible and kept by the qualifying/non-qualifying view.
    pub listed: bool,
}

impl RunVisibility {
    const HIDDEN: Self = Self {
        eligible: false,
        listed: false,
    };
}

/// Predicates over a borrowed filter state.
#[derive(Debug, Clone, Copy)]
pub struct VisibilityFilter<'a> {
    state: &'a VisibilityFilterState,
}

impl<'a> VisibilityFilter<'a> {
    pub fn new(state: &'a VisibilityFilterState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &'a VisibilityFilterState {
        self.state
    }

    /// Date bounds as an inclusive window; `None` ends are open.
    pub fn date_bounds(&self) -> (Option<NaiveDate>, Option<NaiveDate>) {
        if self.state.all_dates {
            (None, None)
        } else {
            (self.state.start, self.state.end)
        }
    }

    /// Overlap test between `[start, end]` and the filter window.
    pub fn is_date_visible(&self, start: NaiveDate, end: NaiveDate) -> bool {
        if self.state.all_dates {
            return true;
        }
        if self.state.start.is_some_and(|bound| end < bound) {
            return false;
        }
        if self.state.end.is_some_and(|bound| start > bound) {
            return false;
        }
        true
    }

    fn entries(&self) -> impl Iterator<Item = &'a AllowedVenue> {
        self.state.venues.iter()
    }

    /// Matches only venue-wide entries.
    pub fn is_venue_visible(&self, venue: &str) -> bool {
        self.state.all_venues
            || self
                .entries()
                .any(|e| e.venue == venue && e.division.is_none() && e.level.is_none())
    }

    pub fn is_venue_division_visible(&self, venue: &str, division: &str) -> bool {
        self.state.all_venues
            || self.entries().any(|e| {
                e.venue == venue
                    && e.division.as_deref().map_or(true, |d| d == division)
                    && e.level.is_none()
            })
    }

    pub fn is_venue_level_visible(&self, venue: &str, division: &str, level: &str) -> bool {
        self.state.all_venues
            || self
                .entries()
                .any(|e| e.venue == venue && e.covers(division, level))
    }

    /// Any entry naming the venue, at whatever specificity.
    pub fn is_venue_in_scope(&self, venue: &str) -> bool {
        self.state.all_venues || self.entries().any(|e| e.venue == venue)
    }

    pub fn is_trial_visible(&self, trial: &Trial) -> bool {
        if let Some((start, end)) = trial.date_range() {
            if !self.is_date_visible(start, end) {
                return false;
            }
        }
        self.state.all_venues
            || trial
                .clubs
                .iter()
                .any(|club| self.is_venue_in_scope(&club.venue))
    }

    pub fn is_run_visible(&self, trial: &Trial, run: &Run) -> RunVisibility {
        if !self.is_date_visible(run.date, run.date) {
            return RunVisibility::HIDDEN;
        }

        if !self.state.all_venues {
            let trial_dates = trial
                .date_range()
                .map_or(true, |(start, end)| self.is_date_visible(start, end));
            let matched = trial_dates
                && self.entries().any(|entry| {
                    trial.has_venue(&entry.venue) && entry.covers(&run.division, &run.level)
                });
            if !matched {
                return RunVisibility::HIDDEN;
            }
        }

        let listed = match self.state.runs_view {
            RunsView::All => true,
            RunsView::QualifyingOnly => run.q.qualified(),
            RunsView::NonQualifyingOnly => !run.q.qualified(),
        };
        RunVisibility {
            eligible: true,
            listed,
        }
    }

    /// Narrows a co-hosted trial's run to the venue being reported, so a
    /// division/level shared by two venues does not leak across them.
    pub fn is_run_visible_in_venue(&self, venue: &str, trial: &Trial, run: &Run) -> bool {
        if trial.clubs.len() <= 1 || self.state.all_venues {
            return true;
        }
        trial.has_venue(venue)
            && self
                .entries()
                .any(|entry| entry.venue == venue && entry.covers(&run.division, &run.level))
    }

    pub fn is_title_visible(&self, title: &Title) -> bool {
        if title.hidden && !self.state.show_hidden_titles {
            return false;
        }
        let Some(date) = title.date else {
            return false;
        };
        self.is_date_visible(date, date) && self.is_venue_in_scope(&title.venue)
    }

    pub fn is_calendar_visible(&self, entry: &CalendarEntry) -> bool {
        let view = &self.state.calendar;
        let status_shown = match entry.status {
            EntryStatus::NotEntered => view.not_entered,
            EntryStatus::Planning => view.planning,
            EntryStatus::Pending | EntryStatus::Entered => view.entered,
        };
        status_shown
            && self.is_date_visible(entry.start, entry.end)
            && self.is_venue_in_scope(&entry.venue)
    }

    pub fn is_training_visible(&self, entry: &TrainingEntry) -> bool {
        self.is_date_visible(entry.date, entry.date)
            && (self.state.all_training_names || self.state.training_names.contains(&entry.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::domain::{Club, QStatus};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).expect("valid date")
    }

    fn club(name: &str, venue: &str) -> Club {
        Club {
            name: name.to_string(),
            venue: venue.to_string(),
        }
    }

    fn novice_a(day: u32, q: QStatus) -> Run {
        let mut run = Run::new(date(day), "Novice", "A", "Standard");
        run.q = q;
        run
    }

    fn co_hosted() -> Trial {
        Trial {
            location: String::new(),
            notes: String::new(),
            clubs: vec![club("Alpha", "VenueA"), club("Beta", "VenueB")],
            runs: vec![
                novice_a(8, QStatus::Qualified),
                novice_a(9, QStatus::NotQualified),
            ],
        }
    }

    fn restricted(venues: Vec<AllowedVenue>) -> VisibilityFilterState {
        VisibilityFilterState {
            all_venues: false,
            venues,
            ..VisibilityFilterState::default()
        }
    }

    #[test]
    fn everything_visible_when_all_flags_set_despite_allow_list() {
        let state = VisibilityFilterState {
            start: Some(date(20)),
            end: Some(date(21)),
            venues: vec![AllowedVenue::level("Elsewhere", "Nope", "Never")],
            ..VisibilityFilterState::default()
        };
        let filter = state.filter();
        let trial = co_hosted();
        let run = &trial.runs[0];

        assert!(filter.is_date_visible(date(1), date(2)));
        assert!(filter.is_venue_visible("VenueA"));
        assert!(filter.is_venue_division_visible("VenueA", "Novice"));
        assert!(filter.is_venue_level_visible("VenueA", "Novice", "A"));
        assert!(filter.is_trial_visible(&trial));
        assert_eq!(
            filter.is_run_visible(&trial, run),
            RunVisibility {
                eligible: true,
                listed: true
            }
        );
        assert!(filter.is_run_visible_in_venue("VenueB", &trial, run));
    }

    #[test]
    fn date_window_uses_overlap() {
        let state = VisibilityFilterState {
            all_dates: false,
            start: Some(date(10)),
            end: Some(date(20)),
            ..VisibilityFilterState::default()
        };
        let filter = state.filter();
        assert!(filter.is_date_visible(date(5), date(10)));
        assert!(filter.is_date_visible(date(20), date(25)));
        assert!(!filter.is_date_visible(date(1), date(9)));
        assert!(!filter.is_date_visible(date(21), date(22)));
        assert_eq!(filter.date_bounds(), (Some(date(10)), Some(date(20))));
    }

    #[test]
    fn coarse_queries_ignore_more_specific_entries() {
        let state = restricted(vec![AllowedVenue::level("VenueA", "Novice", "A")]);
        let filter = state.filter();
        assert!(!filter.is_venue_visible("VenueA"));
        assert!(!filter.is_venue_division_visible("VenueA", "Novice"));
        assert!(filter.is_venue_level_visible("VenueA", "Novice", "A"));
        assert!(!filter.is_venue_level_visible("VenueA", "Novice", "B"));
        assert!(filter.is_venue_in_scope("VenueA"));

        let broad = restricted(vec![AllowedVenue::venue("VenueA")]);
        let filter = broad.filter();
        assert!(filter.is_venue_visible("VenueA"));
        assert!(filter.is_venue_level_visible("VenueA", "Open", "C"));
    }

    #[test]
    fn empty_allow_list_hides_everything() {
        let state = restricted(Vec::new());
        let filter = state.filter();
        let trial = co_hosted();
        assert!(!filter.is_venue_visible("VenueA"));
        assert!(!filter.is_trial_visible(&trial));
        assert_eq!(
            filter.is_run_visible(&trial, &trial.runs[0]),
            RunVisibility::HIDDEN
        );
    }

    #[test]
    fn runs_view_narrows_only_the_listed_bit() {
        let state = VisibilityFilterState {
            runs_view: RunsView::QualifyingOnly,
            ..VisibilityFilterState::default()
        };
        let filter = state.filter();
        let trial = co_hosted();

        let q = filter.is_run_visible(&trial, &trial.runs[0]);
        assert!(q.eligible && q.listed);
        let nq = filter.is_run_visible(&trial, &trial.runs[1]);
        assert!(nq.eligible);
        assert!(!nq.listed);
    }

    #[test]
    fn hidden_and_undated_titles() {
        let mut title = Title {
            venue: "VenueA".to_string(),
            name: "NA".to_string(),
            date: Some(date(3)),
            hidden: true,
            received: false,
        };
        let mut state = VisibilityFilterState::default();
        assert!(!state.filter().is_title_visible(&title));
        state.show_hidden_titles = true;
        assert!(state.filter().is_title_visible(&title));
        title.date = None;
        assert!(!state.filter().is_title_visible(&title));
    }

    #[test]
    fn calendar_status_and_training_names() {
        let mut state = VisibilityFilterState::default();
        state.calendar.entered = false;
        let pending = CalendarEntry {
            start: date(1),
            end: date(2),
            venue: "VenueA".to_string(),
            club: String::new(),
            location: String::new(),
            status: EntryStatus::Pending,
        };
        assert!(!state.filter().is_calendar_visible(&pending));
        let planning = CalendarEntry {
            status: EntryStatus::Planning,
            ..pending
        };
        assert!(state.filter().is_calendar_visible(&planning));

        state.all_training_names = false;
        state.training_names.insert("Weaves".to_string());
        let weaves = TrainingEntry {
            date: date(4),
            name: "Weaves".to_string(),
            notes: String::new(),
        };
        let contacts = TrainingEntry {
            name: "Contacts".to_string(),
            ..weaves.clone()
        };
        assert!(state.filter().is_training_visible(&weaves));
        assert!(!state.filter().is_training_visible(&contacts));
    }
}
