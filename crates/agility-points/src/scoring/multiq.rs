use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

use super::domain::{ExistingPointKind, ExistingPoints, Run, Trial};
use super::rules::{MultiQDefinition, MultiQItem, VenueConfig};
use crate::filter::VisibilityFilter;

/// One achieved multi-Q, keyed by the date and the trial's index in the dog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MultiQOccurrence {
    pub date: NaiveDate,
    pub trial: usize,
}

/// Computed occurrences for one definition plus imported counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiQSummary<'c> {
    #[serde(skip)]
    pub definition: &'c MultiQDefinition,
    pub occurrences: BTreeSet<MultiQOccurrence>,
    pub existing: f64,
}

impl MultiQSummary<'_> {
    pub fn total(&self) -> f64 {
        self.occurrences.len() as f64 + self.existing
    }

    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty() && self.existing == 0.0
    }

    pub fn label(&self) -> String {
        format!("{} {}", self.total(), self.definition.short_name)
    }
}

fn item_covers(venue: &VenueConfig, item: &MultiQItem, run: &Run) -> bool {
    run.event == item.event
        && run.division == item.division
        && venue.level_matches(&item.division, &item.level, &run.level)
}

/// Positions of the definitions whose every item is covered by a counted,
/// qualified run of `trial` on `date`.
fn met_on(
    venue: &VenueConfig,
    trial: &Trial,
    date: NaiveDate,
    counts: impl Fn(&Run) -> bool,
) -> Vec<usize> {
    let qualified: Vec<&Run> = trial
        .runs
        .iter()
        .filter(|run| run.date == date && run.q.qualified() && counts(run))
        .collect();
    if qualified.is_empty() {
        return Vec::new();
    }
    venue
        .multi_qs
        .iter()
        .enumerate()
        .filter(|(_, definition)| definition.is_valid_on(date) && !definition.items.is_empty())
        .filter(|(_, definition)| {
            definition
                .items
                .iter()
                .all(|item| qualified.iter().any(|run| item_covers(venue, item, run)))
        })
        .map(|(index, _)| index)
        .collect()
}

pub fn definitions_met_on<'c>(
    venue: &'c VenueConfig,
    trial: &Trial,
    date: NaiveDate,
    counts: impl Fn(&Run) -> bool,
) -> Vec<&'c MultiQDefinition> {
    met_on(venue, trial, date, counts)
        .into_iter()
        .map(|index| &venue.multi_qs[index])
        .collect()
}

/// Multi-Qs a single run took part in, ignoring any filter.
pub fn run_multi_qs<'c>(
    venue: &'c VenueConfig,
    trial: &Trial,
    run: &Run,
) -> Vec<&'c MultiQDefinition> {
    if !run.q.qualified() {
        return Vec::new();
    }
    definitions_met_on(venue, trial, run.date, |_| true)
        .into_iter()
        .filter(|definition| {
            definition
                .items
                .iter()
                .any(|item| item_covers(venue, item, run))
        })
        .collect()
}

/// Collects multi-Q occurrences across a dog's visible trials.
#[derive(Debug, Clone, Copy)]
pub struct MultiQTracker<'f> {
    filter: VisibilityFilter<'f>,
}

impl<'f> MultiQTracker<'f> {
    pub fn new(filter: VisibilityFilter<'f>) -> Self {
        Self { filter }
    }

    pub fn accumulate<'c>(
        &self,
        venue: &'c VenueConfig,
        trials: &[Trial],
        existing: &[ExistingPoints],
    ) -> Vec<MultiQSummary<'c>> {
        let mut occurrences: Vec<BTreeSet<MultiQOccurrence>> =
            vec![BTreeSet::new(); venue.multi_qs.len()];

        for (index, trial) in trials.iter().enumerate() {
            if !trial.has_venue(&venue.name) || !self.filter.is_trial_visible(trial) {
                continue;
            }
            let dates: BTreeSet<NaiveDate> = trial.runs.iter().map(|run| run.date).collect();
            for date in dates {
                let met = met_on(venue, trial, date, |run| {
                    run.q.allows_tally()
                        && self.filter.is_run_visible(trial, run).eligible
                        && self.filter.is_run_visible_in_venue(&venue.name, trial, run)
                });
                for position in met {
                    occurrences[position].insert(MultiQOccurrence {
                        date,
                        trial: index,
                    });
                }
            }
        }

        venue
            .multi_qs
            .iter()
            .zip(occurrences)
            .map(|(definition, occurrences)| MultiQSummary {
                definition,
                occurrences,
                existing: self.existing_for(venue, definition, existing),
            })
            .collect()
    }

    fn existing_for(
        &self,
        venue: &VenueConfig,
        definition: &MultiQDefinition,
        existing: &[ExistingPoints],
    ) -> f64 {
        if !self.filter.is_venue_in_scope(&venue.name) {
            return 0.0;
        }
        existing
            .iter()
            .filter(|pts| pts.kind == ExistingPointKind::MultiQ)
            .filter(|pts| pts.venue == venue.name && pts.multi_q == definition.name)
            .filter(|pts| definition.is_valid_on(pts.date))
            .filter(|pts| self.filter.is_date_visible(pts.date, pts.date))
            .map(|pts| pts.points)
            .sum()
    }
}
